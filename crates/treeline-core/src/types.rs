//! Document and tree types for the hierarchical summary index.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Path of the workspace root, relative to itself.
///
/// Every other path in the index is slash-delimited and relative to the
/// workspace root, e.g. `src/lib.rs`.
pub const ROOT_PATH: &str = "";

/// Namespace for deriving document ids from paths (UUIDv5).
///
/// Fixed so that the same relative path always maps to the same id across
/// processes, which makes upsert and delete idempotent.
const DOCUMENT_NAMESPACE: Uuid = Uuid::from_u128(0x7f1f9f04_3c52_4a6e_9d87_55b1c0a8e2d1);

/// Derive the deterministic document id for a workspace-relative path.
pub fn document_id(path: &str) -> Uuid {
    Uuid::new_v5(&DOCUMENT_NAMESPACE, path.as_bytes())
}

/// Parent of a workspace-relative path, or `None` for top-level entries
/// whose parent is the workspace root itself.
pub fn parent_of(path: &str) -> Option<&str> {
    match path.rsplit_once('/') {
        Some((parent, _)) => Some(parent),
        None => {
            if path.is_empty() {
                None
            } else {
                Some(ROOT_PATH)
            }
        }
    }
}

/// All ancestor directories of a path, nearest first, excluding the
/// workspace root.
pub fn ancestors_of(path: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = path;
    while let Some((parent, _)) = current.rsplit_once('/') {
        out.push(parent.to_string());
        current = parent;
    }
    out
}

/// Kind of entry a document summarizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// A regular file.
    File,
    /// A directory, summarized from its children.
    Directory,
}

impl DocumentKind {
    /// String form used in prompts and store metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

/// The persisted summary unit for one file or directory path.
///
/// Exactly one record exists per live path. The id is derived from the path
/// alone, so re-deriving it always yields the same identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Deterministic id, `document_id(path)`.
    pub id: Uuid,
    /// Slash-delimited path relative to the workspace root. The root
    /// directory itself uses [`ROOT_PATH`].
    pub path: String,
    /// Parent directory path; `None` only for the workspace root record.
    pub parent_path: Option<String>,
    /// Whether this record describes a file or a directory.
    pub kind: DocumentKind,
    /// Natural-language summary produced by the oracle (or a placeholder).
    pub summary: String,
}

impl DocumentRecord {
    /// Build a file record for a workspace-relative path.
    pub fn file(path: impl Into<String>, summary: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            id: document_id(&path),
            parent_path: parent_of(&path).map(str::to_string),
            path,
            kind: DocumentKind::File,
            summary: summary.into(),
        }
    }

    /// Build a directory record for a workspace-relative path.
    pub fn directory(path: impl Into<String>, summary: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            id: document_id(&path),
            parent_path: parent_of(&path).map(str::to_string),
            path,
            kind: DocumentKind::Directory,
            summary: summary.into(),
        }
    }

    /// Whether this is the workspace root record.
    pub fn is_root(&self) -> bool {
        self.path == ROOT_PATH
    }
}

/// In-memory directory/file tree used to drive the bootstrap traversal.
///
/// Built once per bootstrap pass and discarded afterwards; it is never
/// persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    /// Leaf file node.
    File {
        /// Workspace-relative path of the file.
        path: String,
    },
    /// Directory node with children in first-seen order.
    Directory {
        /// Workspace-relative path; [`ROOT_PATH`] for the root.
        path: String,
        /// Child nodes, ordered by first appearance in the input.
        children: Vec<TreeNode>,
    },
}

impl TreeNode {
    /// Workspace-relative path of this node.
    pub fn path(&self) -> &str {
        match self {
            Self::File { path } => path,
            Self::Directory { path, .. } => path,
        }
    }

    /// Whether this node is a directory.
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }
}
