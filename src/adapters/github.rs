use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::adapters::store::{CommentStore, RemoteComment};
use crate::core::context::RunContext;

const USER_AGENT: &str = concat!("schemabot/", env!("CARGO_PKG_VERSION"));
const PAGE_SIZE: usize = 100;

/// Comment store backed by the GitHub REST issues API.
pub struct GitHubStore {
    client: Client,
    token: String,
    base_url: String,
}

#[derive(Deserialize)]
struct CommentDto {
    id: u64,
    body: Option<String>,
}

impl From<CommentDto> for RemoteComment {
    fn from(dto: CommentDto) -> Self {
        RemoteComment {
            id: dto.id,
            body: dto.body.unwrap_or_default(),
        }
    }
}

impl GitHubStore {
    pub fn new(token: String, base_url: Option<String>) -> Result<Self> {
        let base_url = base_url.unwrap_or_else(|| "https://api.github.com".to_string());

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            token,
            base_url,
        })
    }

    fn issue_comments_url(&self, ctx: &RunContext) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.base_url, ctx.owner, ctx.repo, ctx.issue_number
        )
    }

    fn comment_url(&self, ctx: &RunContext, comment_id: u64) -> String {
        format!(
            "{}/repos/{}/{}/issues/comments/{}",
            self.base_url, ctx.owner, ctx.repo, comment_id
        )
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
    }
}

async fn ensure_success(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    anyhow::bail!("GitHub API error while {what} ({status}): {body}")
}

#[async_trait]
impl CommentStore for GitHubStore {
    async fn list_comments(&self, ctx: &RunContext) -> Result<Vec<RemoteComment>> {
        let url = self.issue_comments_url(ctx);
        let mut comments = Vec::new();
        let mut page = 1usize;

        loop {
            let response = self
                .request(self.client.get(&url))
                .query(&[("per_page", PAGE_SIZE.to_string()), ("page", page.to_string())])
                .send()
                .await
                .context("Failed to list pull request comments")?;
            let response = ensure_success(response, "listing comments").await?;

            let batch: Vec<CommentDto> = response
                .json()
                .await
                .context("Failed to parse comment list")?;
            let batch_len = batch.len();
            comments.extend(batch.into_iter().map(RemoteComment::from));

            if batch_len < PAGE_SIZE {
                break;
            }
            page += 1;
        }

        debug!("Listed {} comments from {}", comments.len(), url);
        Ok(comments)
    }

    async fn create_comment(&self, ctx: &RunContext, body: &str) -> Result<RemoteComment> {
        let response = self
            .request(self.client.post(self.issue_comments_url(ctx)))
            .json(&json!({ "body": body }))
            .send()
            .await
            .context("Failed to create pull request comment")?;
        let response = ensure_success(response, "creating comment").await?;

        let dto: CommentDto = response
            .json()
            .await
            .context("Failed to parse created comment")?;
        Ok(dto.into())
    }

    async fn update_comment(&self, ctx: &RunContext, comment_id: u64, body: &str) -> Result<()> {
        let response = self
            .request(self.client.patch(self.comment_url(ctx, comment_id)))
            .json(&json!({ "body": body }))
            .send()
            .await
            .context("Failed to update pull request comment")?;
        ensure_success(response, "updating comment").await?;
        Ok(())
    }

    async fn delete_comment(&self, ctx: &RunContext, comment_id: u64) -> Result<()> {
        let response = self
            .request(self.client.delete(self.comment_url(ctx, comment_id)))
            .send()
            .await
            .context("Failed to delete pull request comment")?;
        ensure_success(response, "deleting comment").await?;
        Ok(())
    }
}
