//! Static site publishing to the pages branch.

use anyhow::{Context, Result};
use releasekit_config::Secrets;
use releasekit_core::toolchain::{BuildKind, BuildRequest};
use releasekit_publisher::{GitHubClient, TreePublisher, collect_site_files, find_web_root};
use std::path::Path;

use super::{context, load};

/// Publish `project`, then commit its `wwwroot` to the pages branch.
pub async fn publish(config_path: &Path, project: &str, branch: Option<String>) -> Result<()> {
    let config = load(config_path)?;
    let secrets = Secrets::from_env();

    let project = config
        .project(project)
        .with_context(|| format!("Unknown project: {}", project))?;
    let github = config
        .github
        .as_ref()
        .context("Pages publishing needs a `github` section in the configuration")?;
    let token = secrets
        .github_token
        .clone()
        .context("GITHUB_TOKEN is not set")?;
    let branch = branch.unwrap_or_else(|| github.pages_branch.clone());

    project.validate().await?;

    let publish_dir = tempfile::tempdir().context("Failed to create publish directory")?;
    let ctx = context(&config);
    let request = BuildRequest::new(
        BuildKind::Publish,
        &project.path,
        &ctx.configuration,
        publish_dir.path(),
    );
    ctx.build_tool()
        .build(&request)
        .await
        .with_context(|| format!("Failed to publish {}", project.name))?;

    let web_root = find_web_root(publish_dir.path()).await?;
    let files = collect_site_files(&web_root).await?;
    println!("Publishing {} files from {}", files.len(), web_root.display());

    let publisher = TreePublisher::new(GitHubClient::new(&github.owner, &github.repo, token));
    let commit = publisher
        .publish(files, &branch)
        .await
        .with_context(|| format!("Failed to publish to {}", branch))?;

    println!("Branch {} now at {}", branch, commit.commit);
    Ok(())
}
