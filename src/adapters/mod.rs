pub mod github;
pub mod store;

pub use github::GitHubStore;
pub use store::{CommentStore, RemoteComment};
