//! Linux AppImages.

use releasekit_core::toolchain::{AppImageOptions, BuildKind, BuildRequest};
use releasekit_core::{Artifact, Error, Outcome, PlatformTarget, Project, combine_all};
use tracing::info;

use crate::context::BuildContext;

/// One AppImage per requested architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxAppImage {
    pub architectures: Vec<PlatformTarget>,
    pub options: AppImageOptions,
}

impl LinuxAppImage {
    pub fn new(options: AppImageOptions) -> Self {
        Self {
            architectures: vec![PlatformTarget::LinuxArm64, PlatformTarget::LinuxX64],
            options,
        }
    }

    pub fn with_architectures(mut self, architectures: Vec<PlatformTarget>) -> Self {
        self.architectures = architectures;
        self
    }

    /// Options with the executable and application name filled in.
    fn resolved_options(&self, project: &Project, ctx: &BuildContext) -> AppImageOptions {
        let mut options = self.options.clone();
        options
            .executable
            .get_or_insert_with(|| project.name.clone());
        options.app_name.get_or_insert_with(|| ctx.solution.clone());
        options
    }

    pub async fn produce(&self, project: &Project, ctx: &BuildContext) -> Outcome<Vec<Artifact>> {
        project.validate().await?;

        let options = self.resolved_options(project, ctx);
        let ops = self
            .architectures
            .iter()
            .map(|target| (*target, Self::produce_one(project, ctx, &options, *target)));

        combine_all(ops).await
    }

    async fn produce_one(
        project: &Project,
        ctx: &BuildContext,
        options: &AppImageOptions,
        target: PlatformTarget,
    ) -> Outcome<Artifact> {
        if !target.is_linux() {
            return Err(Error::Internal(format!("{} is not a Linux target", target)));
        }

        let platform = ctx.platform(target)?;
        let publish_dir = project
            .directory()
            .join("bin")
            .join("publish")
            .join(&platform.runtime);

        let request = BuildRequest::new(
            BuildKind::Publish,
            &project.path,
            &ctx.configuration,
            &publish_dir,
        )
        .runtime(&platform.runtime)
        .self_contained(false)
        .version(&ctx.version.major_minor_patch);

        info!(project = %project.name, runtime = %platform.runtime, "Publishing Linux tree");
        let published = ctx.build_tool().build(&request).await?;

        let destination = ctx.output_dir().join(format!(
            "{}-{}-{}.AppImage",
            ctx.solution, ctx.version.major_minor_patch, platform.arch_label
        ));
        ctx.assembler()
            .assemble(&published, options, &platform.arch_label, &destination)
            .await?;

        if !tokio::fs::try_exists(&destination).await? {
            return Err(Error::ArtifactNotFound(destination.display().to_string()));
        }

        info!(artifact = %destination.display(), "AppImage produced");
        Ok(Artifact::from_path(destination))
    }
}
