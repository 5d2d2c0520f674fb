//! Projects, produced artifacts and version information.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Outcome};

/// A buildable project inside the release root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project name, also the default executable and package name.
    pub name: String,
    /// Path to the project file.
    pub path: PathBuf,
    /// Package identifier when it differs from the name.
    pub package_id: Option<String>,
}

impl Project {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            package_id: None,
        }
    }

    pub fn with_package_id(mut self, package_id: impl Into<String>) -> Self {
        self.package_id = Some(package_id.into());
        self
    }

    /// Directory holding the project file.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn package_id(&self) -> &str {
        self.package_id.as_deref().unwrap_or(&self.name)
    }

    /// Check that the project reference is usable before any tool runs.
    pub async fn validate(&self) -> Outcome<()> {
        if self.name.trim().is_empty() {
            return Err(Error::missing("project name"));
        }

        match tokio::fs::try_exists(&self.path).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(Error::missing(format!(
                "project file {} for '{}'",
                self.path.display(),
                self.name
            ))),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

/// A produced file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Artifact {
    pub path: PathBuf,
    pub name: String,
}

impl Artifact {
    /// Create an artifact named after the file it points to.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self { path, name }
    }

    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }
}

/// Version numbers derived from source control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// `major.minor.patch`, used for display versions and artifact names.
    pub major_minor_patch: String,
    /// Version stamped on library packages (may carry a prerelease suffix).
    pub package_version: String,
    /// Monotonic build number.
    pub commits_since_version_source: u32,
    /// Commit the release is cut from.
    pub sha: String,
}

impl VersionInfo {
    pub fn new(major_minor_patch: impl Into<String>) -> Self {
        let major_minor_patch = major_minor_patch.into();
        Self {
            package_version: major_minor_patch.clone(),
            major_minor_patch,
            commits_since_version_source: 0,
            sha: String::new(),
        }
    }

    pub fn release_tag(&self) -> String {
        format!("v{}", self.major_minor_patch)
    }
}
