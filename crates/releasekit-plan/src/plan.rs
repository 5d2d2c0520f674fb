//! Deployment plans: the packaging tasks of one project, run together.

use releasekit_core::toolchain::AppImageOptions;
use releasekit_core::{Artifact, Error, Outcome, Project, combine_all};
use releasekit_packaging::{
    AndroidPackage, AndroidSigning, BuildContext, LibraryPackage, LinuxAppImage, PackageFeed,
    PackagingTask, WindowsExecutable,
};
use std::sync::Arc;
use tracing::{error, info};

/// The packaging tasks for one project, run together.
///
/// Tasks are held by identity: adding the same `Arc` twice keeps one entry,
/// while two separately constructed equal tasks are both kept.
#[derive(Debug)]
pub struct DeploymentPlan {
    project: Project,
    ctx: BuildContext,
    tasks: Vec<Arc<PackagingTask>>,
}

impl DeploymentPlan {
    pub fn new(project: Project, ctx: BuildContext) -> Self {
        Self {
            project,
            ctx,
            tasks: Vec::new(),
        }
    }

    /// Add a task. Adding a task already in the plan does nothing.
    pub fn add(&mut self, task: Arc<PackagingTask>) -> &mut Self {
        if !self.tasks.iter().any(|t| Arc::ptr_eq(t, &task)) {
            self.tasks.push(task);
        }
        self
    }

    pub fn for_windows(mut self) -> Self {
        self.add(Arc::new(WindowsExecutable::default().into()));
        self
    }

    pub fn for_linux(mut self, options: AppImageOptions) -> Self {
        self.add(Arc::new(LinuxAppImage::new(options).into()));
        self
    }

    pub fn for_android(mut self, signing: AndroidSigning) -> Self {
        self.add(Arc::new(AndroidPackage::new(signing).into()));
        self
    }

    pub fn for_library(mut self, feed: Option<PackageFeed>) -> Self {
        self.add(Arc::new(LibraryPackage::new(feed).into()));
        self
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Run every task and return all produced artifacts.
    ///
    /// Every task runs even when others fail. On failure the error aggregates
    /// each failed task's message, labeled `{description}#{index}`.
    ///
    /// Two tasks of the same kind write to the same output paths, so a plan
    /// holding them fails before anything runs.
    pub async fn build(self) -> Outcome<Vec<Artifact>> {
        self.check_distinct_kinds()?;

        info!(
            project = %self.project.name,
            tasks = self.tasks.len(),
            "Running deployment plan"
        );

        let ops = self.tasks.iter().enumerate().map(|(index, task)| {
            (
                format!("{}#{}", task.describe(), index),
                task.produce(&self.project, &self.ctx),
            )
        });

        match combine_all(ops).await {
            Ok(per_task) => {
                let artifacts: Vec<Artifact> = per_task.into_iter().flatten().collect();
                info!(
                    project = %self.project.name,
                    artifacts = artifacts.len(),
                    "Deployment plan completed"
                );
                Ok(artifacts)
            }
            Err(e) => {
                error!(project = %self.project.name, error = %e, "Deployment plan failed");
                Err(e)
            }
        }
    }

    fn check_distinct_kinds(&self) -> Outcome<()> {
        for (index, task) in self.tasks.iter().enumerate() {
            if let Some(first) = self.tasks[..index]
                .iter()
                .position(|t| t.describe() == task.describe())
            {
                error!(
                    project = %self.project.name,
                    kind = task.describe(),
                    "Deployment plan holds conflicting tasks"
                );
                return Err(Error::Internal(format!(
                    "{} packaging for {} added twice (tasks #{} and #{})",
                    task.describe(),
                    self.project.name,
                    first,
                    index
                )));
            }
        }
        Ok(())
    }
}
