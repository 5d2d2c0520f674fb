//! Self-contained Windows executables.

use releasekit_core::toolchain::{BuildKind, BuildRequest};
use releasekit_core::{Artifact, Error, Outcome, PlatformTarget, Project, combine_all};
use tracing::info;

use crate::context::BuildContext;

/// One single-file executable per requested architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowsExecutable {
    pub architectures: Vec<PlatformTarget>,
}

impl WindowsExecutable {
    pub fn new(architectures: Vec<PlatformTarget>) -> Self {
        Self { architectures }
    }

    pub async fn produce(&self, project: &Project, ctx: &BuildContext) -> Outcome<Vec<Artifact>> {
        project.validate().await?;

        let ops = self
            .architectures
            .iter()
            .map(|target| (*target, self.produce_one(project, ctx, *target)));

        combine_all(ops).await
    }

    async fn produce_one(
        &self,
        project: &Project,
        ctx: &BuildContext,
        target: PlatformTarget,
    ) -> Outcome<Artifact> {
        if !target.is_windows() {
            return Err(Error::Internal(format!("{} is not a Windows target", target)));
        }

        let platform = ctx.platform(target)?;
        let runtime = platform.runtime.as_str();
        let suffix = platform.arch_label.as_str();

        let request = BuildRequest::new(
            BuildKind::Publish,
            &project.path,
            &ctx.configuration,
            ctx.publish_dir().join(runtime),
        )
        .runtime(runtime)
        .self_contained(true)
        .version(&ctx.version.major_minor_patch)
        .property("IncludeNativeLibrariesForSelfExtract", "true")
        .property("IncludeAllContentForSelfExtract", "true")
        .property("DebugType", "embedded");

        info!(project = %project.name, runtime = %runtime, "Publishing Windows executable");
        let published = ctx.build_tool().build(&request).await?;

        let executable = published.join(format!("{}.exe", project.name));
        if !tokio::fs::try_exists(&executable).await? {
            return Err(Error::ArtifactNotFound(executable.display().to_string()));
        }

        let destination = ctx
            .output_dir()
            .join(format!("{}_{}.exe", project.name, suffix));
        tokio::fs::rename(&executable, &destination).await?;

        info!(artifact = %destination.display(), "Windows executable produced");
        Ok(Artifact::from_path(destination))
    }
}

impl Default for WindowsExecutable {
    fn default() -> Self {
        Self::new(vec![PlatformTarget::WindowsX64])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBuildTool, fixture};
    use releasekit_core::{ErrorKind, VersionInfo};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_renames_executable_with_arch_suffix() {
        let (dir, project) = fixture("Sample.Desktop");
        let tool = Arc::new(FakeBuildTool::producing(&["Sample.Desktop.exe"]));
        let ctx = BuildContext::new("Sample", dir.path(), VersionInfo::new("1.4.2"), tool.clone());

        let artifacts = WindowsExecutable::default()
            .produce(&project, &ctx)
            .await
            .unwrap();

        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].name, "Sample.Desktop_x64.exe");
        assert!(ctx.output_dir().join("Sample.Desktop_x64.exe").exists());

        let request = tool.requests().pop().unwrap();
        assert_eq!(request.runtime.as_deref(), Some("win-x64"));
        assert!(request.single_file);
        assert_eq!(request.version.as_deref(), Some("1.4.2"));
        assert_eq!(request.output, ctx.publish_dir().join("win-x64"));
        assert_eq!(request.properties.get("DebugType").unwrap(), "embedded");
    }

    #[tokio::test]
    async fn test_missing_executable_is_artifact_not_found() {
        let (dir, project) = fixture("Sample.Desktop");
        let tool = Arc::new(FakeBuildTool::producing(&["Other.exe"]));
        let ctx = BuildContext::new("Sample", dir.path(), VersionInfo::new("1.0.0"), tool);

        let err = WindowsExecutable::default()
            .produce(&project, &ctx)
            .await
            .unwrap_err();

        assert!(err.contains_kind(ErrorKind::ArtifactNotFound));
        assert!(err.to_string().contains("[windows-x64]"));
    }

    #[tokio::test]
    async fn test_missing_project_fails_before_build() {
        let dir = tempfile::tempdir().unwrap();
        let tool = Arc::new(FakeBuildTool::producing(&["Ghost.exe"]));
        let ctx = BuildContext::new("Sample", dir.path(), VersionInfo::new("1.0.0"), tool.clone());
        let project = Project::new("Ghost", dir.path().join("Ghost.csproj"));

        let err = WindowsExecutable::default()
            .produce(&project, &ctx)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MissingParameter);
        assert_eq!(tool.calls(), 0);
    }

    #[tokio::test]
    async fn test_non_windows_target_rejected() {
        let (dir, project) = fixture("Sample.Desktop");
        let tool = Arc::new(FakeBuildTool::producing(&["Sample.Desktop.exe"]));
        let ctx = BuildContext::new("Sample", dir.path(), VersionInfo::new("1.0.0"), tool.clone());

        let err = WindowsExecutable::new(vec![PlatformTarget::LinuxX64])
            .produce(&project, &ctx)
            .await
            .unwrap_err();

        assert!(err.contains_kind(ErrorKind::Internal));
        assert_eq!(tool.calls(), 0);
    }
}
