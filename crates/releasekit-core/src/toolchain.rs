//! Build tool, image assembler and package registry traits.
//!
//! These are the boundary collaborators packaging tasks drive. Each call
//! blocks until the external tool exits; a non-zero exit is reported as
//! [`Error::ExternalTool`](crate::Error::ExternalTool).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::Outcome;

/// What the build tool is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildKind {
    /// Compile and lay out a runnable application.
    Publish,
    /// Produce a versioned library package.
    Pack,
}

/// One invocation of the build tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub kind: BuildKind,
    /// Project file to build.
    pub project: PathBuf,
    /// Build configuration (e.g. `Release`).
    pub configuration: String,
    /// Runtime identifier, if platform specific.
    pub runtime: Option<String>,
    pub self_contained: bool,
    pub single_file: bool,
    /// Version stamped on the output.
    pub version: Option<String>,
    /// Extra build properties.
    pub properties: BTreeMap<String, String>,
    /// Output directory.
    pub output: PathBuf,
}

impl BuildRequest {
    pub fn new(
        kind: BuildKind,
        project: impl Into<PathBuf>,
        configuration: impl Into<String>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            kind,
            project: project.into(),
            configuration: configuration.into(),
            runtime: None,
            self_contained: false,
            single_file: false,
            version: None,
            properties: BTreeMap::new(),
            output: output.into(),
        }
    }

    pub fn runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = Some(runtime.into());
        self
    }

    pub fn self_contained(mut self, single_file: bool) -> Self {
        self.self_contained = true;
        self.single_file = single_file;
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// External build invocation capability.
#[async_trait]
pub trait BuildTool: Send + Sync {
    /// Name of this tool, used in logs and failures.
    fn name(&self) -> &'static str;

    /// Run the build and return the output directory.
    async fn build(&self, request: &BuildRequest) -> Outcome<PathBuf>;
}

/// Desktop integration metadata for Linux application images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppImageOptions {
    /// Human readable application name.
    pub app_name: Option<String>,
    /// Reverse-DNS application id.
    pub app_id: Option<String>,
    /// Icon file copied into the image.
    pub icon: Option<PathBuf>,
    /// Freedesktop main category.
    pub main_category: Option<String>,
    pub comment: Option<String>,
    /// Executable inside the published tree; defaults to the project name.
    pub executable: Option<String>,
}

/// External image packaging capability.
#[async_trait]
pub trait ImageAssembler: Send + Sync {
    fn name(&self) -> &'static str;

    /// Assemble the published tree at `source` into one image at `destination`.
    async fn assemble(
        &self,
        source: &Path,
        options: &AppImageOptions,
        arch_label: &str,
        destination: &Path,
    ) -> Outcome<()>;
}

/// Package registry push capability.
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    fn name(&self) -> &'static str;

    /// Push one package. Safe to retry at the transport level; never retried here.
    async fn push(&self, package: &Path, api_key: &str, feed_url: &str) -> Outcome<()>;
}
