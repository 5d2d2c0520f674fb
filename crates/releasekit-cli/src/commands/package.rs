//! Packaging and release commands.

use anyhow::{Context, Result};
use releasekit_config::{Secrets, TargetKind};
use releasekit_core::{Artifact, combine_all};
use releasekit_packaging::{DotnetCli, PackageFeed};
use releasekit_plan::DeploymentPlan;
use releasekit_publisher::{ArtifactPublisher, GitHubClient};
use std::path::Path;
use std::sync::Arc;

use super::{FeedMode, load, parse_kinds, plans};

/// Build the configured targets and list the produced artifacts.
pub async fn package(config_path: &Path, targets: &[String]) -> Result<()> {
    let config = load(config_path)?;
    let kinds = parse_kinds(targets)?;
    let secrets = Secrets::from_env();

    let plans = plans(&config, &secrets, kinds.as_deref(), FeedMode::AsConfigured)?;
    if plans.is_empty() {
        anyhow::bail!("No targets selected");
    }

    let artifacts = run(plans).await?;
    print_artifacts(&artifacts);
    Ok(())
}

/// Build every target, then publish a GitHub release carrying the artifacts.
pub async fn release(config_path: &Path) -> Result<()> {
    let config = load(config_path)?;
    let secrets = Secrets::from_env();

    let github = config
        .github
        .as_ref()
        .context("Releases need a `github` section in the configuration")?;
    let token = secrets
        .github_token
        .clone()
        .context("GITHUB_TOKEN is not set")?;

    let plans = plans(&config, &secrets, None, FeedMode::AsConfigured)?;
    let artifacts = run(plans).await?;
    print_artifacts(&artifacts);

    let client = GitHubClient::new(&github.owner, &github.repo, token);
    let publisher = ArtifactPublisher::new().with_release_host(Arc::new(client));
    let release = publisher
        .create_release(&config.version, &artifacts)
        .await
        .context("Failed to publish release")?;

    println!("Published release {} with {} assets", release.tag, artifacts.len());
    Ok(())
}

/// Pack library targets and push the packages to the configured feed.
pub async fn push_packages(config_path: &Path) -> Result<()> {
    let config = load(config_path)?;
    let secrets = Secrets::from_env();

    let plans = plans(&config, &secrets, Some(&[TargetKind::Library][..]), FeedMode::Never)?;
    if plans.is_empty() {
        anyhow::bail!("No library targets configured");
    }

    let artifacts = run(plans).await?;
    let feed = PackageFeed::new(&config.feed.url, secrets.nuget_api_key.clone());
    let publisher = ArtifactPublisher::new().with_registry(Arc::new(DotnetCli::new()));
    let pushed = publisher
        .push_packages(&artifacts, &feed)
        .await
        .context("Failed to push packages")?;

    println!("Pushed {} packages to {}", pushed.len(), feed.url);
    Ok(())
}

/// Run all plans; every project is attempted even if another fails.
async fn run(plans: Vec<DeploymentPlan>) -> Result<Vec<Artifact>> {
    let ops = plans
        .into_iter()
        .map(|plan| (plan.project().name.clone(), plan.build()));

    let artifacts = combine_all(ops)
        .await
        .context("Packaging failed")?
        .into_iter()
        .flatten()
        .collect();
    Ok(artifacts)
}

fn print_artifacts(artifacts: &[Artifact]) {
    println!("Produced {} artifacts:", artifacts.len());
    for artifact in artifacts {
        println!("  {}", artifact.path.display());
    }
}
