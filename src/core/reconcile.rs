use anyhow::Result;
use tracing::{debug, info};

use crate::adapters::store::CommentStore;
use crate::core::changes::SchemaDiffReport;
use crate::core::context::RunContext;
use crate::core::locate::find_managed;
use crate::core::report::render_report;

/// The single mutating action a reconcile pass performed, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileAction {
    Created { comment_id: u64 },
    Updated { comment_id: u64 },
    Deleted { comment_id: u64 },
    Noop,
}

#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub action: ReconcileAction,
    /// Rendered comment body, present whenever a diff report was rendered.
    pub body: Option<String>,
}

/// Drives the managed comment towards the current diff state. Stateless: each
/// pass re-fetches the comment list, locates the managed comment by header
/// prefix and then issues at most one mutation, which makes re-running with
/// unchanged inputs converge without duplicate side effects.
pub struct Reconciler<'a> {
    store: &'a dyn CommentStore,
    header: &'a str,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn CommentStore, header: &'a str) -> Self {
        Self { store, header }
    }

    pub async fn reconcile(
        &self,
        ctx: &RunContext,
        report: Option<&SchemaDiffReport>,
    ) -> Result<ReconcileOutcome> {
        let comments = self.store.list_comments(ctx).await?;
        debug!(
            "Fetched {} comments for {}/{}#{}",
            comments.len(),
            ctx.owner,
            ctx.repo,
            ctx.issue_number
        );
        let existing = find_managed(&comments, self.header);

        match (report, existing) {
            (Some(report), Some(existing)) => {
                let body = render_report(report, self.header);
                self.store.update_comment(ctx, existing.id, &body).await?;
                info!("Updated comment {}", existing.id);
                Ok(ReconcileOutcome {
                    action: ReconcileAction::Updated {
                        comment_id: existing.id,
                    },
                    body: Some(body),
                })
            }
            (Some(report), None) => {
                let body = render_report(report, self.header);
                let created = self.store.create_comment(ctx, &body).await?;
                info!("Created comment {}", created.id);
                Ok(ReconcileOutcome {
                    action: ReconcileAction::Created {
                        comment_id: created.id,
                    },
                    body: Some(body),
                })
            }
            (None, Some(existing)) => {
                info!("No schema changes.");
                self.store.delete_comment(ctx, existing.id).await?;
                info!("Deleted comment {}", existing.id);
                Ok(ReconcileOutcome {
                    action: ReconcileAction::Deleted {
                        comment_id: existing.id,
                    },
                    body: None,
                })
            }
            (None, None) => {
                info!("No schema changes.");
                Ok(ReconcileOutcome {
                    action: ReconcileAction::Noop,
                    body: None,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::RemoteComment;
    use crate::core::changes::SchemaChange;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum StoreCall {
        List,
        Create(String),
        Update(u64, String),
        Delete(u64),
    }

    struct RecordingStore {
        comments: Vec<RemoteComment>,
        calls: Mutex<Vec<StoreCall>>,
    }

    impl RecordingStore {
        fn with_comments(comments: Vec<RemoteComment>) -> Self {
            Self {
                comments,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<StoreCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommentStore for RecordingStore {
        async fn list_comments(&self, _ctx: &RunContext) -> Result<Vec<RemoteComment>> {
            self.calls.lock().unwrap().push(StoreCall::List);
            Ok(self.comments.clone())
        }

        async fn create_comment(&self, _ctx: &RunContext, body: &str) -> Result<RemoteComment> {
            self.calls
                .lock()
                .unwrap()
                .push(StoreCall::Create(body.to_string()));
            Ok(RemoteComment {
                id: 100,
                body: body.to_string(),
            })
        }

        async fn update_comment(
            &self,
            _ctx: &RunContext,
            comment_id: u64,
            body: &str,
        ) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(StoreCall::Update(comment_id, body.to_string()));
            Ok(())
        }

        async fn delete_comment(&self, _ctx: &RunContext, comment_id: u64) -> Result<()> {
            self.calls.lock().unwrap().push(StoreCall::Delete(comment_id));
            Ok(())
        }
    }

    fn ctx() -> RunContext {
        RunContext {
            owner: "octocat".to_string(),
            repo: "hello-world".to_string(),
            issue_number: 1,
        }
    }

    fn report() -> SchemaDiffReport {
        SchemaDiffReport {
            breaking_changes: vec![SchemaChange::new("Field `x` was removed from type `Query`")],
            dangerous_changes: vec![],
            diff: String::new(),
            diff_no_color: "--- old\n+++ new\n-x: Int\n".to_string(),
        }
    }

    fn managed(id: u64) -> RemoteComment {
        RemoteComment {
            id,
            body: "## Schema Diff\n\nstale body".to_string(),
        }
    }

    #[tokio::test]
    async fn diff_without_existing_comment_creates() {
        let store = RecordingStore::with_comments(vec![RemoteComment {
            id: 5,
            body: "unrelated".to_string(),
        }]);
        let outcome = Reconciler::new(&store, "## Schema Diff")
            .reconcile(&ctx(), Some(&report()))
            .await
            .unwrap();

        assert_eq!(outcome.action, ReconcileAction::Created { comment_id: 100 });
        let calls = store.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], StoreCall::List);
        match &calls[1] {
            StoreCall::Create(body) => assert!(body.starts_with("## Schema Diff\n")),
            other => panic!("unexpected call {other:?}"),
        }
        assert!(outcome.body.unwrap().starts_with("## Schema Diff"));
    }

    #[tokio::test]
    async fn diff_with_existing_comment_updates_in_place() {
        let store = RecordingStore::with_comments(vec![
            RemoteComment {
                id: 3,
                body: "unrelated".to_string(),
            },
            managed(9),
        ]);
        let outcome = Reconciler::new(&store, "## Schema Diff")
            .reconcile(&ctx(), Some(&report()))
            .await
            .unwrap();

        assert_eq!(outcome.action, ReconcileAction::Updated { comment_id: 9 });
        let calls = store.calls();
        assert_eq!(calls.len(), 2);
        match &calls[1] {
            StoreCall::Update(9, body) => assert!(body.starts_with("## Schema Diff\n")),
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_diff_with_existing_comment_deletes_it() {
        let store = RecordingStore::with_comments(vec![managed(42)]);
        let outcome = Reconciler::new(&store, "## Schema Diff")
            .reconcile(&ctx(), None)
            .await
            .unwrap();

        assert_eq!(outcome.action, ReconcileAction::Deleted { comment_id: 42 });
        assert!(outcome.body.is_none());
        assert_eq!(store.calls(), vec![StoreCall::List, StoreCall::Delete(42)]);
    }

    #[tokio::test]
    async fn no_diff_without_comment_is_a_noop() {
        let store = RecordingStore::with_comments(vec![RemoteComment {
            id: 1,
            body: "unrelated".to_string(),
        }]);
        let outcome = Reconciler::new(&store, "## Schema Diff")
            .reconcile(&ctx(), None)
            .await
            .unwrap();

        assert_eq!(outcome.action, ReconcileAction::Noop);
        assert!(outcome.body.is_none());
        assert_eq!(store.calls(), vec![StoreCall::List]);
    }

    #[tokio::test]
    async fn headers_keep_independent_reports_apart() {
        let store = RecordingStore::with_comments(vec![
            RemoteComment {
                id: 7,
                body: "## Admin Schema\n\nother report".to_string(),
            },
            managed(8),
        ]);
        let outcome = Reconciler::new(&store, "## Admin Schema")
            .reconcile(&ctx(), Some(&report()))
            .await
            .unwrap();

        assert_eq!(outcome.action, ReconcileAction::Updated { comment_id: 7 });
    }
}
