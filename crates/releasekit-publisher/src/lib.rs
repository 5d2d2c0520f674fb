//! Publishing for releasekit: package feeds, GitHub releases and pages.

pub mod artifacts;
pub mod github;
pub mod site;
pub mod tree;

pub use artifacts::ArtifactPublisher;
pub use github::{GitHubClient, GitHubError};
pub use site::{SiteFile, collect_site_files, find_web_root};
pub use tree::{CommitRef, TreePublisher};
