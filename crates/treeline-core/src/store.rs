//! In-memory reference implementation of the document store.
//!
//! Used by tests and as the fallback store when no vector database is
//! configured. Ranking in `query_text` is a simple term-overlap score;
//! real deployments inject a vector-backed [`DocumentStore`] instead.

use crate::error::Result;
use crate::traits::{DocumentFilter, DocumentStore};
use crate::types::DocumentRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Thread-safe in-memory document store.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Uuid, DocumentRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Snapshot of all records, ordered by path.
    pub async fn all(&self) -> Vec<DocumentRecord> {
        let mut records: Vec<_> = self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.path.cmp(&b.path));
        records
    }

    /// Look up a record by path.
    pub async fn get_by_path(&self, path: &str) -> Option<DocumentRecord> {
        let id = crate::types::document_id(path);
        self.records.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn exists(&self) -> Result<bool> {
        Ok(!self.records.read().await.is_empty())
    }

    async fn upsert_one(&self, record: DocumentRecord) -> Result<()> {
        self.records.write().await.insert(record.id, record);
        Ok(())
    }

    async fn upsert_many(&self, records: Vec<DocumentRecord>) -> Result<()> {
        let mut map = self.records.write().await;
        for record in records {
            map.insert(record.id, record);
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<()> {
        self.records.write().await.remove(&id);
        Ok(())
    }

    async fn query_by_filter(&self, filter: DocumentFilter) -> Result<Vec<DocumentRecord>> {
        let mut matches: Vec<_> = self
            .records
            .read()
            .await
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(matches)
    }

    async fn query_text(&self, text: &str) -> Result<Vec<DocumentRecord>> {
        let terms: Vec<String> = text
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();

        let mut scored: Vec<(usize, DocumentRecord)> = self
            .records
            .read()
            .await
            .values()
            .filter_map(|record| {
                let haystack =
                    format!("{} {}", record.path, record.summary).to_lowercase();
                let score = terms.iter().filter(|t| haystack.contains(t.as_str())).count();
                if score > 0 {
                    Some((score, record.clone()))
                } else {
                    None
                }
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.path.cmp(&b.1.path)));
        Ok(scored.into_iter().map(|(_, record)| record).collect())
    }
}
