//! `dotnet` CLI backend.

use async_trait::async_trait;
use releasekit_core::toolchain::{BuildKind, BuildRequest, BuildTool, PackageRegistry};
use releasekit_core::{Error, Outcome};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::info;

use crate::process::run_tool;

/// Property names whose values never appear in logs.
const SECRET_PROPERTY_MARKERS: [&str; 2] = ["Pass", "Token"];

/// Builds, packs and pushes with the `dotnet` command line.
#[derive(Debug, Clone)]
pub struct DotnetCli {
    program: PathBuf,
}

impl DotnetCli {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("dotnet"),
        }
    }

    /// Use a specific `dotnet` executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command-line arguments for a build request.
    pub fn arguments(request: &BuildRequest) -> Vec<String> {
        let verb = match request.kind {
            BuildKind::Publish => "publish",
            BuildKind::Pack => "pack",
        };

        let mut args = vec![
            verb.to_string(),
            request.project.to_string_lossy().to_string(),
            "--configuration".to_string(),
            request.configuration.clone(),
            "--output".to_string(),
            request.output.to_string_lossy().to_string(),
        ];

        if let Some(runtime) = &request.runtime {
            args.push("--runtime".to_string());
            args.push(runtime.clone());
        }

        if request.self_contained {
            args.push("--self-contained".to_string());
            args.push("true".to_string());
        }

        if request.single_file {
            args.push("-p:PublishSingleFile=true".to_string());
        }

        if let Some(version) = &request.version {
            args.push(format!("-p:Version={}", version));
        }

        for (key, value) in &request.properties {
            args.push(format!("-p:{}={}", key, value));
        }

        args
    }

    fn secret_values(request: &BuildRequest) -> Vec<&str> {
        request
            .properties
            .iter()
            .filter(|(key, _)| SECRET_PROPERTY_MARKERS.iter().any(|m| key.contains(m)))
            .map(|(_, value)| value.as_str())
            .collect()
    }
}

impl Default for DotnetCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BuildTool for DotnetCli {
    fn name(&self) -> &'static str {
        "dotnet"
    }

    async fn build(&self, request: &BuildRequest) -> Outcome<PathBuf> {
        tokio::fs::create_dir_all(&request.output).await?;

        let args = Self::arguments(request);
        info!(
            project = %request.project.display(),
            kind = ?request.kind,
            runtime = ?request.runtime,
            output = %request.output.display(),
            "Running dotnet"
        );

        let secrets = Self::secret_values(request);
        run_tool(BuildTool::name(self), Command::new(&self.program), &args, &secrets).await?;

        Ok(request.output.clone())
    }
}

#[async_trait]
impl PackageRegistry for DotnetCli {
    fn name(&self) -> &'static str {
        "dotnet nuget"
    }

    async fn push(&self, package: &Path, api_key: &str, feed_url: &str) -> Outcome<()> {
        if api_key.trim().is_empty() {
            return Err(Error::missing("package feed API key"));
        }

        info!(package = %package.display(), feed = %feed_url, "Pushing package");

        let args = [
            "nuget".to_string(),
            "push".to_string(),
            package.to_string_lossy().to_string(),
            "--api-key".to_string(),
            api_key.to_string(),
            "--source".to_string(),
            feed_url.to_string(),
        ];

        run_tool(
            PackageRegistry::name(self),
            Command::new(&self.program),
            &args,
            &[api_key],
        )
        .await
        .map_err(|e| match e {
            // A rejected push is a transport problem from the caller's view.
            Error::ExternalTool { tool, status, stderr } => Error::Transport(format!(
                "{} exited with {:?}: {}",
                tool, status, stderr
            )),
            other => other,
        })?;

        Ok(())
    }
}
