//! The closed set of packaging tasks.

use derive_more::From;
use releasekit_core::{Artifact, Outcome, PlatformTarget, Project};
use tracing::{info, warn};

use crate::android::AndroidPackage;
use crate::context::BuildContext;
use crate::library::LibraryPackage;
use crate::linux::LinuxAppImage;
use crate::windows::WindowsExecutable;

/// A unit of work producing artifacts for one platform family.
#[derive(Debug, Clone, From)]
pub enum PackagingTask {
    Android(AndroidPackage),
    Windows(WindowsExecutable),
    LinuxAppImage(LinuxAppImage),
    Library(LibraryPackage),
}

impl PackagingTask {
    /// Produce this task's artifacts for `project`.
    pub async fn produce(&self, project: &Project, ctx: &BuildContext) -> Outcome<Vec<Artifact>> {
        info!(task = %self.describe(), project = %project.name, "Packaging");

        let result = match self {
            PackagingTask::Android(task) => task.produce(project, ctx).await,
            PackagingTask::Windows(task) => task.produce(project, ctx).await,
            PackagingTask::LinuxAppImage(task) => task.produce(project, ctx).await,
            PackagingTask::Library(task) => task.produce(project, ctx).await,
        };

        if let Err(e) = &result {
            warn!(task = %self.describe(), project = %project.name, error = %e, "Packaging failed");
        }
        result
    }

    /// Short label used in logs and failure messages.
    pub fn describe(&self) -> &'static str {
        match self {
            PackagingTask::Android(_) => "android",
            PackagingTask::Windows(_) => "windows",
            PackagingTask::LinuxAppImage(_) => "linux",
            PackagingTask::Library(_) => "library",
        }
    }

    /// Platforms this task builds for. Empty for platform-neutral packages.
    pub fn platforms(&self) -> Vec<PlatformTarget> {
        match self {
            PackagingTask::Android(_) => vec![PlatformTarget::Android],
            PackagingTask::Windows(task) => task.architectures.clone(),
            PackagingTask::LinuxAppImage(task) => task.architectures.clone(),
            PackagingTask::Library(_) => Vec::new(),
        }
    }
}
