//! Publishing a set of files as one commit on a branch.
//!
//! The sequence is blob uploads, one tree, one commit, then a forced
//! reference update. Each step depends on the previous one, so the first
//! failure ends the run. Objects created before a failure are unreachable
//! and harmless; the branch only moves at the final step.

use bytes::Bytes;
use releasekit_core::hosting::{GitObjects, NewCommit, TreeItem};
use releasekit_core::{Outcome, combine_in_order};
use tracing::info;

use crate::site::SiteFile;

/// Marker file that turns off Jekyll processing on GitHub Pages.
pub const META_FILE_PATH: &str = ".nojekyll";
const META_FILE_CONTENT: &str = "No Jekyll";
const COMMIT_MESSAGE: &str = "Site update";

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRef {
    /// Reference that was moved, e.g. `heads/gh-pages`.
    pub reference: String,
    pub commit: String,
    pub tree: String,
    /// Commit the reference pointed at before.
    pub parent: String,
}

/// Replaces a branch's content with a new set of files.
pub struct TreePublisher<G> {
    objects: G,
}

impl<G: GitObjects> TreePublisher<G> {
    pub fn new(objects: G) -> Self {
        Self { objects }
    }

    pub async fn publish(&self, files: Vec<SiteFile>, branch: &str) -> Outcome<CommitRef> {
        let reference = format!("heads/{}", branch);
        let parent = self.objects.get_ref(&reference).await?;

        let mut files = files;
        if !files.iter().any(|f| f.path == META_FILE_PATH) {
            files.push(SiteFile::new(
                META_FILE_PATH,
                Bytes::from_static(META_FILE_CONTENT.as_bytes()),
            ));
        }

        info!(reference = %reference, files = files.len(), "Uploading blobs");
        let uploads = files.into_iter().map(|file| {
            let label = file.path.clone();
            (label, self.upload(file))
        });
        let items = combine_in_order(uploads).await?;

        let tree = self.objects.create_tree(&items).await?;
        let commit = self
            .objects
            .create_commit(&NewCommit {
                message: COMMIT_MESSAGE.to_string(),
                tree: tree.clone(),
                parents: vec![parent.clone()],
            })
            .await?;

        self.objects.update_ref(&reference, &commit, true).await?;
        info!(reference = %reference, commit = %commit, "Branch advanced");

        Ok(CommitRef {
            reference,
            commit,
            tree,
            parent,
        })
    }

    async fn upload(&self, file: SiteFile) -> Outcome<TreeItem> {
        let sha = self.objects.create_blob(file.content).await?;
        Ok(TreeItem::blob(file.path, sha))
    }
}
