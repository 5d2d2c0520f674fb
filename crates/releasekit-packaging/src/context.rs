//! Shared state handed to every packaging task.

use releasekit_core::toolchain::{BuildTool, ImageAssembler, PackageRegistry};
use releasekit_core::{Error, Outcome, PlatformSpec, PlatformTable, PlatformTarget, VersionInfo};
use std::path::PathBuf;
use std::sync::Arc;

use crate::appimage::AppImageTool;
use crate::dotnet::DotnetCli;

/// Release-wide settings and the external tools tasks invoke.
///
/// Read-only once built; tasks running concurrently share it by reference.
#[derive(Clone)]
pub struct BuildContext {
    /// Release (solution) name.
    pub solution: String,
    /// Root directory of the release.
    pub root: PathBuf,
    /// Build configuration.
    pub configuration: String,
    pub version: VersionInfo,
    pub platforms: PlatformTable,
    build_tool: Arc<dyn BuildTool>,
    assembler: Arc<dyn ImageAssembler>,
    registry: Arc<dyn PackageRegistry>,
}

impl BuildContext {
    /// Context backed by the `dotnet` CLI and `appimagetool`.
    pub fn dotnet(solution: impl Into<String>, root: impl Into<PathBuf>, version: VersionInfo) -> Self {
        let dotnet = Arc::new(DotnetCli::new());
        Self::new(solution, root, version, dotnet.clone())
            .with_registry(dotnet)
            .with_assembler(Arc::new(AppImageTool::new()))
    }

    pub fn new(
        solution: impl Into<String>,
        root: impl Into<PathBuf>,
        version: VersionInfo,
        build_tool: Arc<dyn BuildTool>,
    ) -> Self {
        Self {
            solution: solution.into(),
            root: root.into(),
            configuration: "Release".to_string(),
            version,
            platforms: PlatformTable::default(),
            build_tool,
            assembler: Arc::new(AppImageTool::new()),
            registry: Arc::new(DotnetCli::new()),
        }
    }

    pub fn with_configuration(mut self, configuration: impl Into<String>) -> Self {
        self.configuration = configuration.into();
        self
    }

    pub fn with_platforms(mut self, platforms: PlatformTable) -> Self {
        self.platforms = platforms;
        self
    }

    pub fn with_assembler(mut self, assembler: Arc<dyn ImageAssembler>) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn with_registry(mut self, registry: Arc<dyn PackageRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn build_tool(&self) -> &dyn BuildTool {
        self.build_tool.as_ref()
    }

    pub fn assembler(&self) -> &dyn ImageAssembler {
        self.assembler.as_ref()
    }

    pub fn registry(&self) -> &dyn PackageRegistry {
        self.registry.as_ref()
    }

    /// Runtime identifier and architecture label for `target`.
    pub fn platform(&self, target: PlatformTarget) -> Outcome<&PlatformSpec> {
        self.platforms
            .get(target)
            .ok_or_else(|| Error::Internal(format!("no platform entry for {}", target)))
    }

    /// Final artifacts land here.
    pub fn output_dir(&self) -> PathBuf {
        self.root.join("output")
    }

    /// Intermediate publish trees, one subdirectory per runtime.
    pub fn publish_dir(&self) -> PathBuf {
        self.output_dir().join("publish")
    }
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("solution", &self.solution)
            .field("root", &self.root)
            .field("configuration", &self.configuration)
            .field("version", &self.version)
            .field("build_tool", &self.build_tool.name())
            .field("assembler", &self.assembler.name())
            .field("registry", &self.registry.name())
            .finish()
    }
}
