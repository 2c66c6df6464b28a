use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::staging::StagingStore;
use api_rest::{router, AppState};
use gitdrop_core::config::{
    timeout_from_env_value, DEFAULT_GIT_TIMEOUT, DEFAULT_HTTP_TIMEOUT,
};
use gitdrop_core::{CoreConfig, GithubClient, SyncService, SystemGit};

/// Main entry point for the Gitdrop server
///
/// Starts the REST API server on the configured address (default: 0.0.0.0:3000)
/// and wires it to the sync engine: GitHub Contents API client, git subprocess
/// runner and the upload staging area.
///
/// # Environment Variables
/// - `GITHUB_TOKEN`: access token for the remote repository (required)
/// - `GITHUB_REPO_OWNER`: repository owner (required)
/// - `GITHUB_REPO_NAME`: repository name (required)
/// - `GITHUB_DEFAULT_BRANCH`: branch to read and write (default: "main")
/// - `GITHUB_API_BASE`: contents API base URL (default: "https://api.github.com")
/// - `GITHUB_LOCAL_REPO_PATH`: scratch root for ephemeral clones (default: system temp dir)
/// - `GITDROP_STAGING_DIR`: staging area for uploads (default: "uploads")
/// - `GITDROP_REST_ADDR`: server address (default: "0.0.0.0:3000")
/// - `GITDROP_COMMIT_NAME` / `GITDROP_COMMIT_EMAIL`: commit identity
/// - `GITDROP_GIT_TIMEOUT_SECS` / `GITDROP_HTTP_TIMEOUT_SECS`: deadlines in seconds
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - a required environment variable is missing or invalid,
/// - the staging directory cannot be created, or
/// - the server address cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gitdrop_core=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("gitdrop_run=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let token = require_env("GITHUB_TOKEN")?;
    let repo_owner = require_env("GITHUB_REPO_OWNER")?;
    let repo_name = require_env("GITHUB_REPO_NAME")?;

    let scratch_dir = std::env::var("GITHUB_LOCAL_REPO_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir().join("gitdrop-scratch"));
    let staging_dir =
        std::env::var("GITDROP_STAGING_DIR").unwrap_or_else(|_| "uploads".to_string());
    let addr = std::env::var("GITDROP_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let git_timeout = timeout_from_env_value(
        std::env::var("GITDROP_GIT_TIMEOUT_SECS").ok(),
        DEFAULT_GIT_TIMEOUT,
    )?;
    let http_timeout = timeout_from_env_value(
        std::env::var("GITDROP_HTTP_TIMEOUT_SECS").ok(),
        DEFAULT_HTTP_TIMEOUT,
    )?;

    let mut cfg = CoreConfig::new(token, repo_owner, repo_name, scratch_dir)?
        .with_git_timeout(git_timeout)
        .with_http_timeout(http_timeout);
    if let Ok(branch) = std::env::var("GITHUB_DEFAULT_BRANCH") {
        cfg = cfg.with_default_branch(branch);
    }
    if let Ok(api_base) = std::env::var("GITHUB_API_BASE") {
        cfg = cfg.with_api_base(api_base);
    }
    if let (Ok(name), Ok(email)) = (
        std::env::var("GITDROP_COMMIT_NAME"),
        std::env::var("GITDROP_COMMIT_EMAIL"),
    ) {
        cfg = cfg.with_commit_identity(name, email);
    }

    tracing::info!(
        "++ Starting Gitdrop REST on {} (repository {}/{}, branch {})",
        addr,
        cfg.repo_owner(),
        cfg.repo_name(),
        cfg.default_branch()
    );

    let remote = Arc::new(GithubClient::new(&cfg));
    let git = Arc::new(SystemGit::new(&cfg));
    let sync = Arc::new(SyncService::new(cfg, remote, git));
    let staging = Arc::new(StagingStore::new(staging_dir)?);

    let app = router(AppState { sync, staging });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn require_env(name: &str) -> anyhow::Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => anyhow::bail!("{name} must be set"),
    }
}
