//! Static site directories.

use async_recursion::async_recursion;
use bytes::Bytes;
use releasekit_core::{Error, Outcome};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory holding the static site inside a web project's publish output.
pub const WEB_ROOT_DIR: &str = "wwwroot";

/// A file destined for the pages branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteFile {
    /// Path relative to the site root, `/` separated.
    pub path: String,
    pub content: Bytes,
}

impl SiteFile {
    pub fn new(path: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Read every file below `root`, sorted by path.
pub async fn collect_site_files(root: &Path) -> Outcome<Vec<SiteFile>> {
    let mut files = Vec::new();
    walk(root, root, &mut files).await?;
    files.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(root = %root.display(), count = files.len(), "Collected site files");
    Ok(files)
}

#[async_recursion]
async fn walk(base: &Path, current: &Path, files: &mut Vec<SiteFile>) -> Outcome<()> {
    let mut entries = tokio::fs::read_dir(current).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let file_type = entry.file_type().await?;

        if file_type.is_dir() {
            walk(base, &path, files).await?;
        } else if file_type.is_file() {
            let relative = path
                .strip_prefix(base)
                .map_err(|e| Error::Internal(e.to_string()))?;
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let content = tokio::fs::read(&path).await?;
            files.push(SiteFile::new(relative, content));
        }
    }

    Ok(())
}

/// Locate the `wwwroot` directory below `publish_dir`, nearest first.
pub async fn find_web_root(publish_dir: &Path) -> Outcome<PathBuf> {
    let mut queue = VecDeque::from([publish_dir.to_path_buf()]);

    while let Some(dir) = queue.pop_front() {
        let mut entries = tokio::fs::read_dir(&dir).await?;
        let mut children = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                if entry.file_name() == WEB_ROOT_DIR {
                    return Ok(entry.path());
                }
                children.push(entry.path());
            }
        }

        children.sort();
        queue.extend(children);
    }

    Err(Error::ArtifactNotFound(format!(
        "{} directory in {}",
        WEB_ROOT_DIR,
        publish_dir.display()
    )))
}
