//! Package feed pushes and GitHub releases.

use releasekit_core::hosting::{Release, ReleaseHost};
use releasekit_core::toolchain::PackageRegistry;
use releasekit_core::{Artifact, Error, Outcome, VersionInfo, combine_all, combine_in_order};
use releasekit_packaging::PackageFeed;
use std::sync::Arc;
use tracing::info;

const PACKAGE_EXTENSION: &str = "nupkg";

/// Publishes produced artifacts to their destinations.
#[derive(Default)]
pub struct ArtifactPublisher {
    registry: Option<Arc<dyn PackageRegistry>>,
    host: Option<Arc<dyn ReleaseHost>>,
}

impl ArtifactPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(mut self, registry: Arc<dyn PackageRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_release_host(mut self, host: Arc<dyn ReleaseHost>) -> Self {
        self.host = Some(host);
        self
    }

    /// Push every library package among `artifacts` to `feed`.
    ///
    /// Packages are independent: all pushes are attempted and every failure
    /// is reported. Returns the pushed packages.
    pub async fn push_packages(
        &self,
        artifacts: &[Artifact],
        feed: &PackageFeed,
    ) -> Outcome<Vec<Artifact>> {
        let registry = self
            .registry
            .as_deref()
            .ok_or_else(|| Error::missing("package registry"))?;
        let api_key = feed.require_api_key()?;

        let packages: Vec<&Artifact> = artifacts
            .iter()
            .filter(|a| a.extension() == Some(PACKAGE_EXTENSION))
            .collect();

        let ops = packages.iter().map(|package| {
            let push = async move {
                registry.push(&package.path, api_key, &feed.url).await?;
                Ok::<_, Error>((*package).clone())
            };
            (package.name.as_str(), push)
        });

        let pushed = combine_all(ops).await?;
        info!(count = pushed.len(), feed = %feed.url, "Packages pushed");
        Ok(pushed)
    }

    /// Create the release for `version` and attach every artifact.
    ///
    /// The tag is created at `version.sha`, which must be set. Uploads stop
    /// at the first failure.
    pub async fn create_release(
        &self,
        version: &VersionInfo,
        artifacts: &[Artifact],
    ) -> Outcome<Release> {
        if artifacts.is_empty() {
            return Err(Error::ArtifactNotFound(
                "no artifacts to attach to the release".to_string(),
            ));
        }
        if version.sha.trim().is_empty() {
            return Err(Error::missing("release commit sha"));
        }

        let host = self
            .host
            .as_deref()
            .ok_or_else(|| Error::missing("release host"))?;

        let tag = version.release_tag();
        let release = host.create_release(&tag, &version.sha).await?;

        let uploads = artifacts
            .iter()
            .map(|artifact| (artifact.name.as_str(), host.upload_asset(&release, artifact)));
        combine_in_order(uploads).await?;

        info!(tag = %tag, assets = artifacts.len(), "Release published");
        Ok(release)
    }
}
