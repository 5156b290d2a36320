use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::context::RunContext;

/// A comment as reported by the remote store. Only the identifier and body
/// matter here; everything else the API returns is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteComment {
    pub id: u64,
    pub body: String,
}

/// Remote storage for pull request comments. Listing preserves the store's
/// reporting order. Every call may fail (auth, not-found, rate limit); errors
/// propagate to the caller without retries.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn list_comments(&self, ctx: &RunContext) -> Result<Vec<RemoteComment>>;
    async fn create_comment(&self, ctx: &RunContext, body: &str) -> Result<RemoteComment>;
    async fn update_comment(&self, ctx: &RunContext, comment_id: u64, body: &str) -> Result<()>;
    async fn delete_comment(&self, ctx: &RunContext, comment_id: u64) -> Result<()>;
}
