pub mod changes;
pub mod context;
pub mod locate;
pub mod reconcile;
pub mod report;
pub mod schema_diff;

pub use changes::{ChangeSummary, SchemaDiffReport};
pub use context::RunContext;
pub use reconcile::{ReconcileAction, Reconciler};
pub use schema_diff::SdlDiffProvider;
