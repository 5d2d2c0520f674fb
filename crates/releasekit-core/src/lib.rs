//! Core domain types and traits for releasekit.
//!
//! This crate contains:
//! - The error taxonomy and the `Outcome` result type
//! - Combinators for independent and ordered operations
//! - Platform targets and their runtime identifiers
//! - Project, artifact and version types
//! - Boundary traits (build tool, image assembler, package registry, git hosting)

pub mod error;
pub mod hosting;
pub mod outcome;
pub mod platform;
pub mod project;
pub mod toolchain;

pub use error::{Error, ErrorKind, Outcome};
pub use outcome::{collect_all, combine_all, combine_in_order};
pub use platform::{PlatformSpec, PlatformTable, PlatformTarget};
pub use project::{Artifact, Project, VersionInfo};
