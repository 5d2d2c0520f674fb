//! KDL configuration parsing for releasekit.
//!
//! This crate handles:
//! - Release definitions (release.kdl)
//! - Secrets read from the environment

pub mod error;
pub mod release;
pub mod secrets;

pub use error::{ConfigError, ConfigResult};
pub use release::{
    FeedSettings, GitHubSettings, ReleaseConfig, TargetConfig, TargetKind, load_release,
    parse_release,
};
pub use secrets::Secrets;
