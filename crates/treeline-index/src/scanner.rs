//! Recursive workspace scan producing the file list for bootstrap.

use crate::error::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use treeline_watch::PathFilter;

/// Walks a workspace root and collects the relative paths of all files
/// that pass the ignore filter.
pub struct WorkspaceScanner {
    root: PathBuf,
    filter: Arc<dyn PathFilter>,
}

impl WorkspaceScanner {
    /// Create a scanner for the given root and filter.
    pub fn new(root: PathBuf, filter: Arc<dyn PathFilter>) -> Self {
        Self { root, filter }
    }

    /// Scan the workspace and return slash-delimited relative file paths,
    /// sorted lexicographically.
    ///
    /// Symlinks are not followed. Entries whose names are not valid UTF-8
    /// are skipped with a warning.
    pub async fn scan(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        self.walk(self.root.clone(), &mut files).await?;
        files.sort();
        debug!("Scanned {} files under {}", files.len(), self.root.display());
        Ok(files)
    }

    fn walk<'a>(
        &'a self,
        dir: PathBuf,
        files: &'a mut Vec<String>,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let relative = match relative_of(&self.root, &path) {
                    Some(relative) => relative,
                    None => {
                        warn!("Skipping non-UTF-8 path under {}", dir.display());
                        continue;
                    }
                };
                if self.filter.is_ignored(&relative) {
                    continue;
                }

                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    self.walk(path, files).await?;
                } else if file_type.is_file() {
                    files.push(relative);
                }
            }
            Ok(())
        }
        .boxed()
    }
}

fn relative_of(root: &Path, path: &Path) -> Option<String> {
    let stripped = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in stripped.components() {
        parts.push(component.as_os_str().to_str()?);
    }
    Some(parts.join("/"))
}
