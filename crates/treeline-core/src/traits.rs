//! Trait seams for the external collaborators of the index.
//!
//! The oracle and the document store are consumed through these traits so
//! that real providers (model-backed summarization, a vector database) can
//! be injected by higher-level crates, and tests can substitute in-memory
//! implementations.

use crate::error::Result;
use crate::types::{DocumentKind, DocumentRecord};
use async_trait::async_trait;
use uuid::Uuid;

/// External text-summarization capability.
///
/// Slow, fallible, and rate-sensitive; callers are expected to route
/// requests through a [`crate::queue::SerialTaskQueue`] so the oracle never
/// sees more than one concurrent request from this process.
#[async_trait]
pub trait SummaryOracle: Send + Sync {
    /// Produce a natural-language summary for the given prompt.
    ///
    /// An empty result is treated by callers as a failure and substituted
    /// with a placeholder summary.
    async fn summarize(&self, prompt: &str) -> Result<String>;
}

/// Field a [`DocumentFilter`] matches against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterField {
    /// Match on the record path.
    Path,
    /// Match on the parent directory path.
    ParentPath,
    /// Match on the record kind.
    Kind,
}

/// Equality filter over document metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentFilter {
    /// Field to compare.
    pub field: FilterField,
    /// Value the field must equal.
    pub value: String,
}

impl DocumentFilter {
    /// Records whose `parent_path` equals the given directory path.
    pub fn parent_path(path: impl Into<String>) -> Self {
        Self {
            field: FilterField::ParentPath,
            value: path.into(),
        }
    }

    /// The record with exactly this path.
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            field: FilterField::Path,
            value: path.into(),
        }
    }

    /// Records of the given kind.
    pub fn kind(kind: DocumentKind) -> Self {
        Self {
            field: FilterField::Kind,
            value: kind.as_str().to_string(),
        }
    }

    /// Whether a record matches this filter.
    pub fn matches(&self, record: &DocumentRecord) -> bool {
        match self.field {
            FilterField::Path => record.path == self.value,
            FilterField::ParentPath => {
                record.parent_path.as_deref() == Some(self.value.as_str())
            }
            FilterField::Kind => record.kind.as_str() == self.value,
        }
    }
}

/// Persistent document store keyed by deterministic ids.
///
/// All operations are at-least-once idempotent when keyed by
/// [`crate::types::document_id`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Whether the workspace collection exists and holds any records.
    async fn exists(&self) -> Result<bool>;

    /// Insert or overwrite a single record.
    async fn upsert_one(&self, record: DocumentRecord) -> Result<()>;

    /// Insert or overwrite a batch of records.
    async fn upsert_many(&self, records: Vec<DocumentRecord>) -> Result<()>;

    /// Delete the record with the given id. Deleting a missing id is a
    /// no-op.
    async fn delete_by_id(&self, id: Uuid) -> Result<()>;

    /// All records matching a metadata filter.
    async fn query_by_filter(&self, filter: DocumentFilter) -> Result<Vec<DocumentRecord>>;

    /// Ranked retrieval over summary text.
    async fn query_text(&self, text: &str) -> Result<Vec<DocumentRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matches_parent_path() {
        let rec = DocumentRecord::file("src/a.js", "s");
        assert!(DocumentFilter::parent_path("src").matches(&rec));
        assert!(!DocumentFilter::parent_path("lib").matches(&rec));
    }

    #[test]
    fn filter_matches_kind() {
        let file = DocumentRecord::file("a.txt", "s");
        let dir = DocumentRecord::directory("src", "s");
        assert!(DocumentFilter::kind(DocumentKind::File).matches(&file));
        assert!(!DocumentFilter::kind(DocumentKind::File).matches(&dir));
    }

    #[test]
    fn filter_matches_exact_path() {
        let rec = DocumentRecord::file("src/a.js", "s");
        assert!(DocumentFilter::path("src/a.js").matches(&rec));
        assert!(!DocumentFilter::path("src").matches(&rec));
    }
}
