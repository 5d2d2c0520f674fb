//! In-memory stand-ins for the external tools.

use async_trait::async_trait;
use releasekit_core::toolchain::{
    AppImageOptions, BuildRequest, BuildTool, ImageAssembler, PackageRegistry,
};
use releasekit_core::{Error, Outcome, Project};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Records requests and writes the configured files into the output directory.
pub struct FakeBuildTool {
    files: Vec<String>,
    fail_status: Option<i32>,
    fail_runtime: Option<String>,
    requests: Mutex<Vec<BuildRequest>>,
    keystore_seen: AtomicBool,
}

impl FakeBuildTool {
    pub fn producing(files: &[&str]) -> Self {
        Self {
            files: files.iter().map(|f| f.to_string()).collect(),
            fail_status: None,
            fail_runtime: None,
            requests: Mutex::new(Vec::new()),
            keystore_seen: AtomicBool::new(false),
        }
    }

    pub fn failing(status: i32) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::producing(&[])
        }
    }

    /// Fail only requests for `runtime`.
    pub fn failing_runtime(mut self, runtime: &str) -> Self {
        self.fail_runtime = Some(runtime.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<BuildRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn keystore_seen(&self) -> bool {
        self.keystore_seen.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BuildTool for FakeBuildTool {
    fn name(&self) -> &'static str {
        "fake-build"
    }

    async fn build(&self, request: &BuildRequest) -> Outcome<PathBuf> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(keystore) = request.properties.get("AndroidSigningKeyStore") {
            if Path::new(keystore).exists() {
                self.keystore_seen.store(true, Ordering::SeqCst);
            }
        }

        let runtime_fails = match (&self.fail_runtime, &request.runtime) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => false,
        };
        if self.fail_status.is_some() || runtime_fails {
            return Err(Error::ExternalTool {
                tool: self.name().to_string(),
                status: Some(self.fail_status.unwrap_or(1)),
                stderr: "build failed".to_string(),
            });
        }

        tokio::fs::create_dir_all(&request.output).await?;
        for file in &self.files {
            tokio::fs::write(request.output.join(file), b"built").await?;
        }
        Ok(request.output.clone())
    }
}

/// Writes an empty image to the destination.
#[derive(Default)]
pub struct FakeAssembler {
    pub calls: Mutex<Vec<(PathBuf, String, PathBuf)>>,
    pub fail_arch: Option<String>,
}

#[async_trait]
impl ImageAssembler for FakeAssembler {
    fn name(&self) -> &'static str {
        "fake-assembler"
    }

    async fn assemble(
        &self,
        source: &Path,
        _options: &AppImageOptions,
        arch_label: &str,
        destination: &Path,
    ) -> Outcome<()> {
        self.calls.lock().unwrap().push((
            source.to_path_buf(),
            arch_label.to_string(),
            destination.to_path_buf(),
        ));

        if self.fail_arch.as_deref() == Some(arch_label) {
            return Err(Error::missing("AppImage icon"));
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(destination, b"image").await?;
        Ok(())
    }
}

/// Records pushes; optionally rejects them.
#[derive(Default)]
pub struct FakeRegistry {
    pub pushed: Mutex<Vec<(PathBuf, String)>>,
    pub reject: bool,
}

#[async_trait]
impl PackageRegistry for FakeRegistry {
    fn name(&self) -> &'static str {
        "fake-registry"
    }

    async fn push(&self, package: &Path, _api_key: &str, feed_url: &str) -> Outcome<()> {
        if self.reject {
            return Err(Error::Transport("feed rejected package".into()));
        }
        self.pushed
            .lock()
            .unwrap()
            .push((package.to_path_buf(), feed_url.to_string()));
        Ok(())
    }
}

/// A temporary release root with one project file on disk.
pub fn fixture(name: &str) -> (tempfile::TempDir, Project) {
    let dir = tempfile::tempdir().unwrap();
    let project_dir = dir.path().join("src").join(name);
    std::fs::create_dir_all(&project_dir).unwrap();
    let path = project_dir.join(format!("{}.csproj", name));
    std::fs::write(&path, "<Project />").unwrap();
    (dir, Project::new(name, path))
}
