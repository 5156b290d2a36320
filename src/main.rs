mod adapters;
mod config;
mod core;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schemabot")]
#[command(about = "Diffs two GraphQL schemas and keeps a single summary comment on a pull request", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Diff the schemas and reconcile the managed comment on the pull request")]
    Run {
        #[arg(long, help = "Path to the baseline schema")]
        old_schema: Option<String>,

        #[arg(long, help = "Path to the proposed schema")]
        new_schema: Option<String>,

        #[arg(long, help = "First line of the managed comment, also its ownership marker")]
        header: Option<String>,

        #[arg(long, help = "GitHub token (defaults to GITHUB_TOKEN)")]
        token: Option<String>,

        #[arg(long, help = "Repository owner (defaults to GITHUB_REPOSITORY)")]
        owner: Option<String>,

        #[arg(long, help = "Repository name (defaults to GITHUB_REPOSITORY)")]
        repo: Option<String>,

        #[arg(long, help = "Pull request number (defaults to GITHUB_REF)")]
        pr: Option<u64>,

        #[arg(long, help = "Also write the rendered comment body to this file")]
        output_path: Option<PathBuf>,

        #[arg(long, help = "GitHub API base URL (for GitHub Enterprise)")]
        api_url: Option<String>,
    },
    #[command(about = "Diff the schemas and print the rendered comment body without touching the remote")]
    Render {
        #[arg(long, help = "Path to the baseline schema")]
        old_schema: Option<String>,

        #[arg(long, help = "Path to the proposed schema")]
        new_schema: Option<String>,

        #[arg(long, help = "First line of the rendered body")]
        header: Option<String>,

        #[arg(short, long, help = "Output file path (prints to stdout if not provided)")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Run {
            old_schema,
            new_schema,
            header,
            token,
            owner,
            repo,
            pr,
            output_path,
            api_url,
        } => {
            run_command(
                old_schema,
                new_schema,
                header,
                token,
                owner,
                repo,
                pr,
                output_path,
                api_url,
            )
            .await
        }
        Commands::Render {
            old_schema,
            new_schema,
            header,
            output,
        } => render_command(old_schema, new_schema, header, output).await,
    };

    if let Err(err) = result {
        error!("{err:#}");
        debug!("{}", err.backtrace());
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_command(
    old_schema: Option<String>,
    new_schema: Option<String>,
    header: Option<String>,
    token: Option<String>,
    owner: Option<String>,
    repo: Option<String>,
    pr: Option<u64>,
    output_path: Option<PathBuf>,
    api_url: Option<String>,
) -> Result<()> {
    let mut config = config::Config::load().unwrap_or_default();
    config.merge_with_cli(header, old_schema, new_schema, token, output_path, api_url);

    let header = config.require_header()?.to_string();
    let (old_path, new_path) = config.require_schema_paths()?;
    let token = config.require_token()?;
    let ctx = core::RunContext::resolve(owner, repo, pr)?;

    info!(
        "Diffing {} against {}",
        old_path.display(),
        new_path.display()
    );
    let report = core::SdlDiffProvider::diff(&old_path, &new_path).await?;

    let summary = core::ChangeSummary::new(report.as_ref());
    if summary.has_changes() {
        info!(
            "Schema changed: {} breaking, {} dangerous",
            summary.breaking_count(),
            summary.dangerous_count()
        );
        if let Some(report) = report.as_ref() {
            debug!("\n{}", report.diff);
        }
    }

    let store = adapters::GitHubStore::new(token, config.api_url.clone())?;
    let reconciler = core::Reconciler::new(&store, &header);
    let outcome = reconciler.reconcile(&ctx, report.as_ref()).await?;

    match &outcome.action {
        core::ReconcileAction::Created { comment_id } => {
            info!(
                "Posted schema diff comment {} on {}/{}#{}",
                comment_id, ctx.owner, ctx.repo, ctx.issue_number
            );
        }
        core::ReconcileAction::Updated { comment_id } => {
            info!("Refreshed schema diff comment {comment_id}");
        }
        core::ReconcileAction::Deleted { comment_id } => {
            info!("Removed stale schema diff comment {comment_id}");
        }
        core::ReconcileAction::Noop => {
            info!("Nothing to do");
        }
    }

    // The output file is fed regardless of which action ran; empty when there
    // was no diff to render.
    if let Some(path) = &config.output_path {
        tokio::fs::write(path, outcome.body.as_deref().unwrap_or("")).await?;
        info!("Wrote rendered body to {}", path.display());
    }

    Ok(())
}

async fn render_command(
    old_schema: Option<String>,
    new_schema: Option<String>,
    header: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut config = config::Config::load().unwrap_or_default();
    config.merge_with_cli(header, old_schema, new_schema, None, None, None);

    let header = config.require_header()?.to_string();
    let (old_path, new_path) = config.require_schema_paths()?;

    let report = match core::SdlDiffProvider::diff(&old_path, &new_path).await? {
        Some(report) => report,
        None => {
            println!("No schema changes.");
            return Ok(());
        }
    };

    let body = core::report::render_report(&report, &header);
    if let Some(path) = output {
        tokio::fs::write(path, body).await?;
    } else {
        println!("{}", body);
    }

    Ok(())
}
