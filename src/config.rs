use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub header: Option<String>,
    pub old_schema: Option<String>,
    pub new_schema: Option<String>,
    pub token: Option<String>,
    pub output_path: Option<PathBuf>,
    pub api_url: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Try to load from .schemabot.yml in current directory
        let config_path = PathBuf::from(".schemabot.yml");
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        let alt_config_path = PathBuf::from(".schemabot.yaml");
        if alt_config_path.exists() {
            let content = std::fs::read_to_string(&alt_config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        // Try in home directory
        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".schemabot.yml");
            if home_config.exists() {
                let content = std::fs::read_to_string(&home_config)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Config::default())
    }

    /// CLI flags take precedence over file values.
    pub fn merge_with_cli(
        &mut self,
        header: Option<String>,
        old_schema: Option<String>,
        new_schema: Option<String>,
        token: Option<String>,
        output_path: Option<PathBuf>,
        api_url: Option<String>,
    ) {
        if header.is_some() {
            self.header = header;
        }
        if old_schema.is_some() {
            self.old_schema = old_schema;
        }
        if new_schema.is_some() {
            self.new_schema = new_schema;
        }
        if token.is_some() {
            self.token = token;
        }
        if output_path.is_some() {
            self.output_path = output_path;
        }
        if api_url.is_some() {
            self.api_url = api_url;
        }
    }

    pub fn require_header(&self) -> Result<&str> {
        let header = self
            .header
            .as_deref()
            .context("Missing header. Pass --header or set it in .schemabot.yml")?;
        if header.trim().is_empty() {
            anyhow::bail!("Header must be non-empty");
        }
        Ok(header)
    }

    pub fn require_schema_paths(&self) -> Result<(PathBuf, PathBuf)> {
        let old = self
            .old_schema
            .as_deref()
            .context("Missing old schema. Pass --old-schema or set it in .schemabot.yml")?;
        let new = self
            .new_schema
            .as_deref()
            .context("Missing new schema. Pass --new-schema or set it in .schemabot.yml")?;
        Ok((resolve_home(old), resolve_home(new)))
    }

    pub fn require_token(&self) -> Result<String> {
        self.token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .context("GitHub token not found. Pass --token or set GITHUB_TOKEN")
    }
}

/// Expands a leading `~` against the invoking user's home directory.
pub fn resolve_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            let rest = rest.strip_prefix('/').unwrap_or(rest);
            if rest.is_empty() {
                return home;
            }
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
