//! Release configuration parsing.

use crate::{ConfigError, ConfigResult};
use kdl::{KdlDocument, KdlNode};
use releasekit_core::toolchain::AppImageOptions;
use releasekit_core::{PlatformTarget, Project, VersionInfo};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use url::Url;

/// Default NuGet feed packages are pushed to.
pub const DEFAULT_FEED_URL: &str = "https://api.nuget.org/v3/index.json";

/// Everything needed to package and publish one release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// Release (solution) name, used in artifact names.
    pub name: String,
    /// Root directory; the output tree lives under `{root}/output`.
    pub root: PathBuf,
    /// Build configuration.
    pub configuration: String,
    pub version: VersionInfo,
    pub projects: Vec<Project>,
    pub targets: Vec<TargetConfig>,
    pub github: Option<GitHubSettings>,
    pub feed: FeedSettings,
}

impl ReleaseConfig {
    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name == name)
    }

    pub fn targets_of(&self, kind: TargetKind) -> impl Iterator<Item = &TargetConfig> {
        self.targets.iter().filter(move |t| t.kind == kind)
    }
}

/// Kind of packaging target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    Windows,
    Linux,
    Android,
    Library,
}

impl std::str::FromStr for TargetKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s {
            "windows" => Ok(TargetKind::Windows),
            "linux" | "appimage" => Ok(TargetKind::Linux),
            "android" => Ok(TargetKind::Android),
            "library" | "nuget" => Ok(TargetKind::Library),
            other => Err(ConfigError::InvalidValue {
                field: "target kind".to_string(),
                message: format!("unknown target kind: {}", other),
            }),
        }
    }
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Windows => "windows",
            TargetKind::Linux => "linux",
            TargetKind::Android => "android",
            TargetKind::Library => "library",
        }
    }
}

/// One packaging target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub kind: TargetKind,
    /// Name of the project to package.
    pub project: String,
    /// Architectures to build; empty means the target's defaults.
    pub architectures: Vec<PlatformTarget>,
    /// AppImage metadata (Linux targets only).
    pub appimage: AppImageOptions,
    /// Push the package after packing (library targets only).
    pub push: bool,
}

/// Hosting repository used for releases and pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSettings {
    pub owner: String,
    pub repo: String,
    pub pages_branch: String,
}

/// Package feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSettings {
    pub url: String,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
        }
    }
}

/// Read and parse a release configuration file.
///
/// Relative project paths and the root are resolved against the directory
/// containing the file.
pub fn load_release(path: &Path) -> ConfigResult<ReleaseConfig> {
    let content = std::fs::read_to_string(path)?;
    let mut config = parse_release(&content)?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    if config.root.is_relative() {
        config.root = base.join(&config.root);
    }
    for project in &mut config.projects {
        if project.path.is_relative() {
            project.path = config.root.join(&project.path);
        }
    }
    for target in &mut config.targets {
        if let Some(icon) = target.appimage.icon.as_mut().filter(|i| i.is_relative()) {
            *icon = config.root.join(&*icon);
        }
    }

    Ok(config)
}

/// Parse a release configuration from KDL text.
pub fn parse_release(kdl: &str) -> ConfigResult<ReleaseConfig> {
    let doc: KdlDocument = kdl.parse()?;

    let mut name = String::new();
    let mut root = PathBuf::from(".");
    let mut configuration = "Release".to_string();
    let mut version = None;
    let mut projects: Vec<Project> = Vec::new();
    let mut targets = Vec::new();
    let mut github = None;
    let mut feed = FeedSettings::default();

    for node in doc.nodes() {
        match node.name().value() {
            "release" => {
                name = get_first_string_arg(node)
                    .ok_or_else(|| ConfigError::missing("release", "name"))?;
                if let Some(children) = node.children() {
                    for child in children.nodes() {
                        match child.name().value() {
                            "root" => {
                                if let Some(r) = get_first_string_arg(child) {
                                    root = PathBuf::from(r);
                                }
                            }
                            "configuration" => {
                                if let Some(c) = get_first_string_arg(child) {
                                    configuration = c;
                                }
                            }
                            "version" => {
                                version = Some(parse_version(child)?);
                            }
                            _ => {}
                        }
                    }
                }
            }
            "project" => {
                let project = parse_project(node)?;
                if projects.iter().any(|p| p.name == project.name) {
                    return Err(ConfigError::Duplicate(format!("project '{}'", project.name)));
                }
                projects.push(project);
            }
            "target" => {
                let target = parse_target(node)?;
                check_target_outputs(&targets, &target)?;
                targets.push(target);
            }
            "github" => {
                github = Some(parse_github(node)?);
            }
            "feed" => {
                let url = get_string_prop(node, "url")
                    .ok_or_else(|| ConfigError::missing("feed", "url"))?;
                Url::parse(&url).map_err(|e| ConfigError::InvalidValue {
                    field: "feed url".to_string(),
                    message: e.to_string(),
                })?;
                feed = FeedSettings { url };
            }
            _ => {} // Ignore unknown nodes
        }
    }

    if name.is_empty() {
        return Err(ConfigError::missing("release", "name"));
    }

    let version = version.ok_or_else(|| ConfigError::missing("release", "version"))?;

    for target in &targets {
        if !projects.iter().any(|p| p.name == target.project) {
            return Err(ConfigError::UnknownProject {
                kind: target.kind.as_str().to_string(),
                project: target.project.clone(),
            });
        }
    }

    Ok(ReleaseConfig {
        name,
        root,
        configuration,
        version,
        projects,
        targets,
        github,
        feed,
    })
}

fn parse_version(node: &KdlNode) -> ConfigResult<VersionInfo> {
    let major_minor_patch = get_first_string_arg(node)
        .ok_or_else(|| ConfigError::missing("version", "number"))?;

    let mut version = VersionInfo::new(major_minor_patch);
    if let Some(package) = get_string_prop(node, "package") {
        version.package_version = package;
    }
    if let Some(sha) = get_string_prop(node, "sha") {
        version.sha = sha;
    }
    if let Some(commits) = node.get("commits").and_then(|v| v.as_integer()) {
        version.commits_since_version_source =
            u32::try_from(commits).map_err(|_| ConfigError::InvalidValue {
                field: "version commits".to_string(),
                message: format!("{} is out of range", commits),
            })?;
    }

    Ok(version)
}

fn parse_project(node: &KdlNode) -> ConfigResult<Project> {
    let name = get_first_string_arg(node)
        .ok_or_else(|| ConfigError::missing("project", "name"))?;
    let path = get_string_prop(node, "path")
        .ok_or_else(|| ConfigError::missing("project", format!("path for '{}'", name)))?;

    let project = Project::new(name, path);
    Ok(match get_string_prop(node, "package-id") {
        Some(id) => project.with_package_id(id),
        None => project,
    })
}

fn parse_target(node: &KdlNode) -> ConfigResult<TargetConfig> {
    let kind: TargetKind = get_first_string_arg(node)
        .ok_or_else(|| ConfigError::missing("target", "kind"))?
        .parse()?;
    let project = get_string_prop(node, "project")
        .ok_or_else(|| ConfigError::missing("target", format!("project for the {} target", kind.as_str())))?;
    let push = get_bool_prop(node, "push").unwrap_or(false);

    let mut architectures = Vec::new();
    let mut appimage = AppImageOptions::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "arch" => {
                    for arch in get_all_string_args(child) {
                        architectures.push(parse_architecture(kind, &arch)?);
                    }
                }
                "app-name" => appimage.app_name = get_first_string_arg(child),
                "app-id" => appimage.app_id = get_first_string_arg(child),
                "icon" => appimage.icon = get_first_string_arg(child).map(PathBuf::from),
                "category" => appimage.main_category = get_first_string_arg(child),
                "comment" => appimage.comment = get_first_string_arg(child),
                "executable" => appimage.executable = get_first_string_arg(child),
                _ => {}
            }
        }
    }

    let mut seen = HashSet::new();
    if let Some(dup) = architectures.iter().find(|a| !seen.insert(**a)) {
        return Err(ConfigError::Duplicate(format!(
            "architecture {} for project '{}'",
            dup, project
        )));
    }

    Ok(TargetConfig {
        kind,
        project,
        architectures,
        appimage,
        push,
    })
}

/// Reject a target whose outputs would overwrite those of an earlier one.
///
/// Each (kind, project) pair may appear once. AppImage names carry only the
/// release name, version and architecture, so a release has at most one
/// Linux target.
fn check_target_outputs(existing: &[TargetConfig], target: &TargetConfig) -> ConfigResult<()> {
    for earlier in existing.iter().filter(|t| t.kind == target.kind) {
        if earlier.project == target.project {
            return Err(ConfigError::Duplicate(format!(
                "{} target for project '{}'",
                target.kind.as_str(),
                target.project
            )));
        }
        if target.kind == TargetKind::Linux {
            return Err(ConfigError::Duplicate(format!(
                "linux target (already declared for '{}', now for '{}')",
                earlier.project, target.project
            )));
        }
    }
    Ok(())
}

fn parse_architecture(kind: TargetKind, arch: &str) -> ConfigResult<PlatformTarget> {
    match (kind, arch) {
        (TargetKind::Windows, "x64") => Ok(PlatformTarget::WindowsX64),
        (TargetKind::Linux, "x64" | "x86_64") => Ok(PlatformTarget::LinuxX64),
        (TargetKind::Linux, "arm64" | "aarch64") => Ok(PlatformTarget::LinuxArm64),
        _ => Err(ConfigError::InvalidValue {
            field: "arch".to_string(),
            message: format!("{} is not supported for {} targets", arch, kind.as_str()),
        }),
    }
}

fn parse_github(node: &KdlNode) -> ConfigResult<GitHubSettings> {
    let owner = get_string_prop(node, "owner")
        .ok_or_else(|| ConfigError::missing("github", "owner"))?;
    let repo = get_string_prop(node, "repo")
        .ok_or_else(|| ConfigError::missing("github", "repo"))?;
    let pages_branch = get_string_prop(node, "pages-branch").unwrap_or_else(|| "master".to_string());

    Ok(GitHubSettings {
        owner,
        repo,
        pages_branch,
    })
}

// Helper functions for extracting values from KDL nodes

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_all_string_args(node: &KdlNode) -> Vec<String> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string())
        .map(|s| s.to_string())
        .collect()
}

fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

fn get_bool_prop(node: &KdlNode, name: &str) -> Option<bool> {
    node.get(name).and_then(|v| v.as_bool())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
        release "Sample" {
            root "."
            configuration "Release"
            version "1.4.2" package="1.4.2-beta.1" commits=17 sha="abc123"
        }

        project "Sample.Desktop" path="src/Sample.Desktop/Sample.Desktop.csproj"
        project "Sample.Core" path="src/Sample.Core/Sample.Core.csproj" package-id="Acme.Sample.Core"

        target "windows" project="Sample.Desktop"
        target "linux" project="Sample.Desktop" {
            arch "x64"
            app-name "Sample"
            app-id "io.acme.Sample"
            category "Utility"
        }
        target "library" project="Sample.Core" push=#true

        github owner="acme" repo="sample" pages-branch="gh-pages"
    "#;

    #[test]
    fn test_parse_full_release() {
        let config = parse_release(FULL).unwrap();

        assert_eq!(config.name, "Sample");
        assert_eq!(config.configuration, "Release");
        assert_eq!(config.version.major_minor_patch, "1.4.2");
        assert_eq!(config.version.package_version, "1.4.2-beta.1");
        assert_eq!(config.version.commits_since_version_source, 17);
        assert_eq!(config.version.sha, "abc123");
        assert_eq!(config.projects.len(), 2);
        assert_eq!(
            config.project("Sample.Core").map(|p| p.package_id()),
            Some("Acme.Sample.Core")
        );
        assert_eq!(config.targets.len(), 3);
        assert_eq!(config.feed.url, DEFAULT_FEED_URL);

        let linux = config.targets_of(TargetKind::Linux).next().unwrap();
        assert_eq!(linux.architectures, vec![PlatformTarget::LinuxX64]);
        assert_eq!(linux.appimage.app_id.as_deref(), Some("io.acme.Sample"));
        assert_eq!(linux.appimage.main_category.as_deref(), Some("Utility"));

        let library = config.targets_of(TargetKind::Library).next().unwrap();
        assert!(library.push);

        let github = config.github.unwrap();
        assert_eq!(github.owner, "acme");
        assert_eq!(github.pages_branch, "gh-pages");
    }

    #[test]
    fn test_missing_version() {
        let kdl = r#"
            release "NoVersion"
        "#;

        let result = parse_release(kdl);
        assert!(matches!(result, Err(ConfigError::MissingField { .. })));
    }

    #[test]
    fn test_target_references_unknown_project() {
        let kdl = r#"
            release "Bad" {
                version "1.0.0"
            }
            target "windows" project="Nope"
        "#;

        let result = parse_release(kdl);
        assert!(matches!(result, Err(ConfigError::UnknownProject { .. })));
    }

    #[test]
    fn test_unknown_target_kind() {
        let kdl = r#"
            release "Bad" {
                version "1.0.0"
            }
            project "App" path="App.csproj"
            target "solaris" project="App"
        "#;

        let result = parse_release(kdl);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_duplicate_project() {
        let kdl = r#"
            release "Dup" {
                version "1.0.0"
            }
            project "App" path="a/App.csproj"
            project "App" path="b/App.csproj"
        "#;

        let result = parse_release(kdl);
        assert!(matches!(result, Err(ConfigError::Duplicate(_))));
    }

    #[test]
    fn test_duplicate_target_for_project() {
        let kdl = r#"
            release "Dup" {
                version "1.0.0"
            }
            project "App" path="App.csproj"
            target "windows" project="App"
            target "windows" project="App" {
                arch "x64"
            }
        "#;

        match parse_release(kdl) {
            Err(ConfigError::Duplicate(what)) => {
                assert_eq!(what, "windows target for project 'App'")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_second_linux_target_rejected() {
        let kdl = r#"
            release "Images" {
                version "1.0.0"
            }
            project "App.Gtk" path="gtk/App.Gtk.csproj"
            project "App.Qt" path="qt/App.Qt.csproj"
            target "linux" project="App.Gtk"
            target "appimage" project="App.Qt"
        "#;

        let result = parse_release(kdl);
        assert!(matches!(result, Err(ConfigError::Duplicate(_))));
    }

    #[test]
    fn test_same_kind_for_different_projects_allowed() {
        let kdl = r#"
            release "Libs" {
                version "1.0.0"
            }
            project "Lib.A" path="a/Lib.A.csproj"
            project "Lib.B" path="b/Lib.B.csproj"
            target "library" project="Lib.A"
            target "library" project="Lib.B"
        "#;

        let config = parse_release(kdl).unwrap();
        assert_eq!(config.targets_of(TargetKind::Library).count(), 2);
    }

    #[test]
    fn test_architecture_must_match_target_kind() {
        let kdl = r#"
            release "Arch" {
                version "1.0.0"
            }
            project "App" path="App.csproj"
            target "windows" project="App" {
                arch "arm64"
            }
        "#;

        let result = parse_release(kdl);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_invalid_feed_url() {
        let kdl = r#"
            release "Feed" {
                version "1.0.0"
            }
            feed url="not a url"
        "#;

        let result = parse_release(kdl);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_load_resolves_paths_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("release.kdl");
        std::fs::write(
            &file,
            r#"
            release "Paths" {
                version "0.1.0"
            }
            project "App" path="src/App/App.csproj"
            target "linux" project="App" {
                icon "assets/icon.png"
            }
            "#,
        )
        .unwrap();

        let config = load_release(&file).unwrap();
        assert_eq!(config.root, dir.path().join("."));
        assert_eq!(
            config.projects[0].path,
            dir.path().join(".").join("src/App/App.csproj")
        );
        assert_eq!(
            config.targets[0].appimage.icon,
            Some(dir.path().join(".").join("assets/icon.png"))
        );
    }
}
