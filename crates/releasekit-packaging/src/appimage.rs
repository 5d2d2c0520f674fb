//! AppImage assembly through `appimagetool`.
//!
//! The published tree is turned into an AppDir in place (launcher script,
//! desktop entry, icon) and handed to `appimagetool`.

use async_trait::async_trait;
use releasekit_core::toolchain::{AppImageOptions, ImageAssembler};
use releasekit_core::{Error, Outcome};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::info;

use crate::process::run_tool;

/// Assembles application images with the `appimagetool` command.
#[derive(Debug, Clone)]
pub struct AppImageTool {
    program: PathBuf,
}

impl AppImageTool {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("appimagetool"),
        }
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Launcher placed at the AppDir root.
    pub fn app_run(executable: &str) -> String {
        format!(
            "#!/bin/sh\nHERE=\"$(dirname \"$(readlink -f \"$0\")\")\"\nexec \"$HERE/{}\" \"$@\"\n",
            executable
        )
    }

    /// Freedesktop entry for the image.
    pub fn desktop_entry(options: &AppImageOptions, executable: &str, icon_name: &str) -> String {
        let name = options.app_name.as_deref().unwrap_or(executable);
        let category = options.main_category.as_deref().unwrap_or("Utility");

        let mut entry = format!(
            "[Desktop Entry]\nType=Application\nName={}\nExec={}\nIcon={}\nCategories={};\nTerminal=false\n",
            name, executable, icon_name, category
        );
        if let Some(comment) = &options.comment {
            entry.push_str(&format!("Comment={}\n", comment));
        }
        entry
    }

    async fn prepare_app_dir(
        source: &Path,
        options: &AppImageOptions,
        executable: &str,
    ) -> Outcome<()> {
        let icon = options
            .icon
            .as_ref()
            .ok_or_else(|| Error::missing("AppImage icon"))?;
        let icon_name = options.app_id.as_deref().unwrap_or(executable);
        let extension = icon.extension().and_then(|e| e.to_str()).unwrap_or("png");

        if !tokio::fs::try_exists(source.join(executable)).await? {
            return Err(Error::ArtifactNotFound(format!(
                "{} in {}",
                executable,
                source.display()
            )));
        }

        let app_run = source.join("AppRun");
        tokio::fs::write(&app_run, Self::app_run(executable)).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&app_run, std::fs::Permissions::from_mode(0o755)).await?;
        }

        tokio::fs::write(
            source.join(format!("{}.desktop", icon_name)),
            Self::desktop_entry(options, executable, icon_name),
        )
        .await?;
        tokio::fs::copy(icon, source.join(format!("{}.{}", icon_name, extension))).await?;

        Ok(())
    }
}

impl Default for AppImageTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageAssembler for AppImageTool {
    fn name(&self) -> &'static str {
        "appimagetool"
    }

    async fn assemble(
        &self,
        source: &Path,
        options: &AppImageOptions,
        arch_label: &str,
        destination: &Path,
    ) -> Outcome<()> {
        let executable = options
            .executable
            .as_deref()
            .ok_or_else(|| Error::missing("AppImage executable"))?;

        Self::prepare_app_dir(source, options, executable).await?;

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        info!(
            source = %source.display(),
            destination = %destination.display(),
            arch = %arch_label,
            "Assembling AppImage"
        );

        let mut command = Command::new(&self.program);
        command.env("ARCH", arch_label);
        let args = [
            OsStr::new("--no-appstream"),
            source.as_os_str(),
            destination.as_os_str(),
        ];
        run_tool(self.name(), command, args, &[]).await?;

        Ok(())
    }
}
