//! Library packages.

use releasekit_core::toolchain::{BuildKind, BuildRequest};
use releasekit_core::{Artifact, Error, Outcome, Project};
use std::fmt;
use tracing::info;

use crate::context::BuildContext;

/// Where packed libraries are pushed.
#[derive(Clone, PartialEq, Eq)]
pub struct PackageFeed {
    pub url: String,
    pub api_key: Option<String>,
}

impl PackageFeed {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            url: url.into(),
            api_key,
        }
    }

    /// The API key, or `MissingParameter` when absent or blank.
    pub fn require_api_key(&self) -> Outcome<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::missing("package feed API key"))
    }
}

impl fmt::Debug for PackageFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageFeed")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Packs a library and optionally pushes it right away.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryPackage {
    pub feed: Option<PackageFeed>,
}

impl LibraryPackage {
    pub fn new(feed: Option<PackageFeed>) -> Self {
        Self { feed }
    }

    pub async fn produce(&self, project: &Project, ctx: &BuildContext) -> Outcome<Vec<Artifact>> {
        project.validate().await?;
        let api_key = match &self.feed {
            Some(feed) => Some(feed.require_api_key()?),
            None => None,
        };

        let version = &ctx.version.package_version;
        let request = BuildRequest::new(
            BuildKind::Pack,
            &project.path,
            &ctx.configuration,
            ctx.output_dir(),
        )
        .version(version);

        info!(project = %project.name, version = %version, "Packing library");
        let output = ctx.build_tool().build(&request).await?;

        let package = output.join(format!("{}.{}.nupkg", project.package_id(), version));
        if !tokio::fs::try_exists(&package).await? {
            return Err(Error::ArtifactNotFound(package.display().to_string()));
        }

        if let (Some(feed), Some(api_key)) = (&self.feed, api_key) {
            ctx.registry().push(&package, api_key, &feed.url).await?;
            info!(package = %package.display(), feed = %feed.url, "Package pushed");
        }

        Ok(vec![Artifact::from_path(package)])
    }
}
