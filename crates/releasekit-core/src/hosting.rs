//! Source-control hosting primitives.
//!
//! Git objects (blob, tree, commit) are content addressed: identical blob
//! content always yields the same sha. Only [`GitObjects::update_ref`] has a
//! visible effect; everything before it can be abandoned safely.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{Artifact, Outcome};

/// File mode for regular, non-executable blobs.
pub const BLOB_MODE: &str = "100644";

/// One entry of a tree object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeItem {
    pub path: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
}

impl TreeItem {
    pub fn blob(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: BLOB_MODE.to_string(),
            kind: "blob".to_string(),
            sha: sha.into(),
        }
    }
}

/// Commit to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCommit {
    pub message: String,
    pub tree: String,
    pub parents: Vec<String>,
}

/// Blob, tree, commit and reference primitives of a hosted repository.
#[async_trait]
pub trait GitObjects: Send + Sync {
    /// Resolve a reference such as `heads/main` to a commit sha.
    async fn get_ref(&self, reference: &str) -> Outcome<String>;

    /// Upload file content and return its blob sha.
    async fn create_blob(&self, content: Bytes) -> Outcome<String>;

    /// Create a tree from the given entries and return its sha.
    async fn create_tree(&self, items: &[TreeItem]) -> Outcome<String>;

    /// Create a commit and return its sha.
    async fn create_commit(&self, commit: &NewCommit) -> Outcome<String>;

    /// Point `reference` at `sha`.
    async fn update_ref(&self, reference: &str, sha: &str, force: bool) -> Outcome<()>;
}

/// A created release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag: String,
    /// Endpoint assets are uploaded to.
    pub upload_url: String,
}

/// Release-creation primitives of the hosting service.
#[async_trait]
pub trait ReleaseHost: Send + Sync {
    async fn create_release(&self, tag: &str, commit_sha: &str) -> Outcome<Release>;

    async fn upload_asset(&self, release: &Release, artifact: &Artifact) -> Outcome<()>;
}
