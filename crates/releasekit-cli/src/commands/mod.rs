//! CLI command implementations.

pub mod package;
pub mod pages;

use anyhow::{Context, Result};
use releasekit_config::{ReleaseConfig, Secrets, TargetConfig, TargetKind, load_release};
use releasekit_packaging::{
    AndroidPackage, AndroidSigning, BuildContext, LibraryPackage, LinuxAppImage, PackageFeed,
    PackagingTask, WindowsExecutable,
};
use releasekit_plan::DeploymentPlan;
use std::path::Path;
use std::sync::Arc;

pub fn validate(path: &Path) -> Result<()> {
    let config = load(path)?;
    println!("Configuration is valid");
    println!("Release: {} {}", config.name, config.version.major_minor_patch);
    println!("Projects: {}", config.projects.len());
    println!("Targets: {}", config.targets.len());
    Ok(())
}

pub(crate) fn load(path: &Path) -> Result<ReleaseConfig> {
    load_release(path).with_context(|| format!("Failed to load release config: {}", path.display()))
}

pub(crate) fn context(config: &ReleaseConfig) -> BuildContext {
    BuildContext::dotnet(&config.name, &config.root, config.version.clone())
        .with_configuration(&config.configuration)
}

/// How library targets treat the package feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FeedMode {
    /// Push only targets marked `push=#true`.
    AsConfigured,
    /// Pack only; pushing happens afterwards.
    Never,
}

/// One deployment plan per project, holding the tasks of every selected target.
pub(crate) fn plans(
    config: &ReleaseConfig,
    secrets: &Secrets,
    kinds: Option<&[TargetKind]>,
    feed_mode: FeedMode,
) -> Result<Vec<DeploymentPlan>> {
    let ctx = context(config);
    let mut plans: Vec<DeploymentPlan> = Vec::new();

    let selected = config
        .targets
        .iter()
        .filter(|t| kinds.is_none_or(|k| k.contains(&t.kind)));

    for target in selected {
        let project = config
            .project(&target.project)
            .with_context(|| format!("Unknown project: {}", target.project))?;

        let index = match plans.iter().position(|p| p.project().name == project.name) {
            Some(index) => index,
            None => {
                plans.push(DeploymentPlan::new(project.clone(), ctx.clone()));
                plans.len() - 1
            }
        };
        plans[index].add(Arc::new(task(config, secrets, target, feed_mode)));
    }

    Ok(plans)
}

fn task(
    config: &ReleaseConfig,
    secrets: &Secrets,
    target: &TargetConfig,
    feed_mode: FeedMode,
) -> PackagingTask {
    match target.kind {
        TargetKind::Windows => {
            if target.architectures.is_empty() {
                WindowsExecutable::default().into()
            } else {
                WindowsExecutable::new(target.architectures.clone()).into()
            }
        }
        TargetKind::Linux => {
            let task = LinuxAppImage::new(target.appimage.clone());
            if target.architectures.is_empty() {
                task.into()
            } else {
                task.with_architectures(target.architectures.clone()).into()
            }
        }
        TargetKind::Android => AndroidPackage::new(AndroidSigning {
            keystore_base64: secrets.android_keystore_base64.clone(),
            key_alias: secrets.android_key_alias.clone(),
            key_pass: secrets.android_key_pass.clone(),
            store_pass: secrets.android_store_pass.clone(),
        })
        .into(),
        TargetKind::Library => {
            let feed = (target.push && feed_mode == FeedMode::AsConfigured)
                .then(|| PackageFeed::new(&config.feed.url, secrets.nuget_api_key.clone()));
            LibraryPackage::new(feed).into()
        }
    }
}

pub(crate) fn parse_kinds(names: &[String]) -> Result<Option<Vec<TargetKind>>> {
    if names.is_empty() {
        return Ok(None);
    }
    names
        .iter()
        .map(|n| n.parse::<TargetKind>().map_err(anyhow::Error::from))
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use releasekit_config::parse_release;

    const CONFIG: &str = r#"
        release "Sample" {
            version "1.4.2"
        }
        project "Sample.Desktop" path="src/Sample.Desktop/Sample.Desktop.csproj"
        project "Sample.Core" path="src/Sample.Core/Sample.Core.csproj"
        target "windows" project="Sample.Desktop"
        target "linux" project="Sample.Desktop"
        target "library" project="Sample.Core" push=#true
    "#;

    #[test]
    fn test_plans_group_targets_by_project() {
        let config = parse_release(CONFIG).unwrap();
        let plans = plans(&config, &Secrets::default(), None, FeedMode::AsConfigured).unwrap();

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].project().name, "Sample.Desktop");
        assert_eq!(plans[0].len(), 2);
        assert_eq!(plans[1].project().name, "Sample.Core");
        assert_eq!(plans[1].len(), 1);
    }

    #[test]
    fn test_plans_filter_by_kind() {
        let config = parse_release(CONFIG).unwrap();
        let kinds = [TargetKind::Linux];
        let plans = plans(&config, &Secrets::default(), Some(&kinds[..]), FeedMode::Never).unwrap();

        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].len(), 1);
    }

    #[test]
    fn test_library_feed_follows_mode() {
        let config = parse_release(CONFIG).unwrap();
        let target = &config.targets[2];

        let pushing = task(&config, &Secrets::default(), target, FeedMode::AsConfigured);
        assert!(matches!(pushing, PackagingTask::Library(LibraryPackage { feed: Some(_) })));

        let packing = task(&config, &Secrets::default(), target, FeedMode::Never);
        assert!(matches!(packing, PackagingTask::Library(LibraryPackage { feed: None })));
    }

    #[test]
    fn test_android_signing_comes_from_environment() {
        temp_env::with_vars(
            [
                ("ANDROID_SIGNING_KEY_ALIAS", Some("release")),
                ("ANDROID_KEYSTORE_BASE64", None),
            ],
            || {
                let config = parse_release(
                    r#"
                    release "Sample" { version "1.0.0"; }
                    project "Sample.Android" path="a.csproj"
                    target "android" project="Sample.Android"
                    "#,
                )
                .unwrap();
                let secrets = Secrets::from_env();
                match task(&config, &secrets, &config.targets[0], FeedMode::Never) {
                    PackagingTask::Android(android) => {
                        assert_eq!(android.signing.key_alias.as_deref(), Some("release"));
                        assert!(android.signing.keystore_base64.is_none());
                    }
                    other => panic!("unexpected task: {:?}", other),
                }
            },
        );
    }

    #[test]
    fn test_parse_kinds() {
        assert_eq!(parse_kinds(&[]).unwrap(), None);
        assert_eq!(
            parse_kinds(&["windows".to_string(), "appimage".to_string()]).unwrap(),
            Some(vec![TargetKind::Windows, TargetKind::Linux])
        );
        assert!(parse_kinds(&["ios".to_string()]).is_err());
    }
}
