//! Platform targets and their runtime identifiers.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A platform artifacts can be produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
pub enum PlatformTarget {
    #[display("android")]
    Android,
    #[display("windows-x64")]
    WindowsX64,
    #[display("linux-x64")]
    LinuxX64,
    #[display("linux-arm64")]
    LinuxArm64,
}

impl PlatformTarget {
    pub const ALL: [PlatformTarget; 4] = [
        PlatformTarget::Android,
        PlatformTarget::WindowsX64,
        PlatformTarget::LinuxX64,
        PlatformTarget::LinuxArm64,
    ];

    pub fn is_linux(&self) -> bool {
        matches!(self, PlatformTarget::LinuxX64 | PlatformTarget::LinuxArm64)
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, PlatformTarget::WindowsX64)
    }
}

/// Build-tool facing data for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSpec {
    pub target: PlatformTarget,
    /// Runtime identifier passed to the build tool (e.g. `linux-x64`).
    pub runtime: String,
    /// Architecture label used in artifact names (e.g. `x86_64`).
    pub arch_label: String,
}

/// Fixed mapping from platform to runtime identifier and architecture label.
///
/// Built once and handed to whoever needs it; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformTable {
    entries: Vec<PlatformSpec>,
}

impl PlatformTable {
    pub fn new(entries: Vec<PlatformSpec>) -> Self {
        Self { entries }
    }

    pub fn get(&self, target: PlatformTarget) -> Option<&PlatformSpec> {
        self.entries.iter().find(|e| e.target == target)
    }

    pub fn runtime(&self, target: PlatformTarget) -> Option<&str> {
        self.get(target).map(|e| e.runtime.as_str())
    }

    pub fn arch_label(&self, target: PlatformTarget) -> Option<&str> {
        self.get(target).map(|e| e.arch_label.as_str())
    }

    pub fn entries(&self) -> &[PlatformSpec] {
        &self.entries
    }
}

impl Default for PlatformTable {
    fn default() -> Self {
        let spec = |target, runtime: &str, arch_label: &str| PlatformSpec {
            target,
            runtime: runtime.to_string(),
            arch_label: arch_label.to_string(),
        };

        Self::new(vec![
            spec(PlatformTarget::Android, "android", "android"),
            spec(PlatformTarget::WindowsX64, "win-x64", "x64"),
            spec(PlatformTarget::LinuxX64, "linux-x64", "x86_64"),
            spec(PlatformTarget::LinuxArm64, "linux-arm64", "arm64"),
        ])
    }
}
