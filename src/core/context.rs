use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static PULL_REF_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^refs/pull/(\d+)/").unwrap());

/// Identifies the pull request a run operates on. Always passed explicitly;
/// nothing downstream reads the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub owner: String,
    pub repo: String,
    pub issue_number: u64,
}

impl RunContext {
    /// Resolves the context from CLI flags, falling back to the CI
    /// environment (`GITHUB_REPOSITORY` and `GITHUB_REF`).
    pub fn resolve(owner: Option<String>, repo: Option<String>, pr: Option<u64>) -> Result<Self> {
        let (owner, repo) = match (owner, repo) {
            (Some(owner), Some(repo)) => (owner, repo),
            (owner, repo) => {
                let env_repo = std::env::var("GITHUB_REPOSITORY").context(
                    "Repository not specified. Pass --owner/--repo or set GITHUB_REPOSITORY",
                )?;
                let (env_owner, env_name) = split_repository(&env_repo)?;
                (owner.unwrap_or(env_owner), repo.unwrap_or(env_name))
            }
        };

        let issue_number = match pr {
            Some(number) => number,
            None => {
                let git_ref = std::env::var("GITHUB_REF").context(
                    "Pull request not specified. Pass --pr or run in a pull_request workflow",
                )?;
                pull_number_from_ref(&git_ref).with_context(|| {
                    format!("GITHUB_REF {git_ref:?} does not point at a pull request")
                })?
            }
        };

        Ok(Self {
            owner,
            repo,
            issue_number,
        })
    }
}

fn split_repository(value: &str) -> Result<(String, String)> {
    let (owner, repo) = value
        .split_once('/')
        .with_context(|| format!("Invalid repository {value:?}, expected owner/repo"))?;
    if owner.is_empty() || repo.is_empty() {
        anyhow::bail!("Invalid repository {value:?}, expected owner/repo");
    }
    Ok((owner.to_string(), repo.to_string()))
}

fn pull_number_from_ref(value: &str) -> Option<u64> {
    PULL_REF_PATTERN
        .captures(value)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
