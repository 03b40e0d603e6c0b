//! File event types and conversion from the notify backend.

use chrono::{DateTime, Utc};
use notify::event::{ModifyKind, RenameMode};
use notify::EventKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::trace;

/// A single file-level change observed under the workspace root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileEvent {
    /// Kind of change.
    pub kind: FileEventKind,

    /// Absolute path to the file.
    pub path: PathBuf,

    /// Timestamp when the event was observed.
    pub timestamp: DateTime<Utc>,
}

impl FileEvent {
    /// Create a new file event stamped with the current time.
    pub fn new(kind: FileEventKind, path: PathBuf) -> Self {
        Self {
            kind,
            path,
            timestamp: Utc::now(),
        }
    }
}

/// Kinds of file change the watcher recognizes.
///
/// Directories are never tracked as first-class events; directory summaries
/// are derived from file-level changes during reconciliation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FileEventKind {
    /// File appeared.
    Added,
    /// File content changed.
    Changed,
    /// File was deleted.
    Removed,
}

impl FileEventKind {
    /// Whether this event requires re-summarization of the file.
    pub fn affects_content(&self) -> bool {
        matches!(self, Self::Added | Self::Changed)
    }

    /// String form for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Changed => "changed",
            Self::Removed => "removed",
        }
    }
}

/// Convert a raw notify event into zero or more file events.
///
/// Renames decompose into a removal of the old path and an addition of the
/// new one. Access events and unclassified kinds are dropped.
pub fn convert_notify_event(event: notify::Event) -> Vec<FileEvent> {
    match event.kind {
        EventKind::Create(_) => event
            .paths
            .into_iter()
            .map(|p| FileEvent::new(FileEventKind::Added, p))
            .collect(),
        EventKind::Remove(_) => event
            .paths
            .into_iter()
            .map(|p| FileEvent::new(FileEventKind::Removed, p))
            .collect(),
        EventKind::Modify(ModifyKind::Name(mode)) => convert_rename(mode, event.paths),
        EventKind::Modify(_) => event
            .paths
            .into_iter()
            .map(|p| FileEvent::new(FileEventKind::Changed, p))
            .collect(),
        other => {
            trace!("Dropping unclassified notify event: {:?}", other);
            Vec::new()
        }
    }
}

fn convert_rename(mode: RenameMode, paths: Vec<PathBuf>) -> Vec<FileEvent> {
    match mode {
        RenameMode::Both => {
            let mut iter = paths.into_iter();
            let mut out = Vec::new();
            if let Some(from) = iter.next() {
                out.push(FileEvent::new(FileEventKind::Removed, from));
            }
            if let Some(to) = iter.next() {
                out.push(FileEvent::new(FileEventKind::Added, to));
            }
            out
        }
        RenameMode::From => paths
            .into_iter()
            .map(|p| FileEvent::new(FileEventKind::Removed, p))
            .collect(),
        RenameMode::To => paths
            .into_iter()
            .map(|p| FileEvent::new(FileEventKind::Added, p))
            .collect(),
        // The backend could not tell which side of the rename this is;
        // resolve from the current state of the filesystem.
        _ => paths
            .into_iter()
            .map(|p| {
                let kind = if p.exists() {
                    FileEventKind::Changed
                } else {
                    FileEventKind::Removed
                };
                FileEvent::new(kind, p)
            })
            .collect(),
    }
}

/// Slash-delimited path of `path` relative to `root`.
///
/// Returns `None` for paths outside the root and for the root itself, which
/// keeps the workspace root out of ignore checks and change tracking.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let stripped = path.strip_prefix(root).ok()?;
    let mut segments = Vec::new();
    for component in stripped.components() {
        segments.push(component.as_os_str().to_str()?);
    }
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}
