//! Applies debounced change batches to the document store.
//!
//! For each flush: re-summarize added and changed files, delete records of
//! removed files, then recompute every affected ancestor directory from the
//! child records currently in the store, deepest first so parent summaries
//! always see fresh child summaries.

use crate::error::{Error, Result};
use crate::summarizer::SummaryContext;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};
use treeline_core::{document_id, DocumentFilter, DocumentRecord, DocumentStore};
use treeline_watch::{FlushSink, PendingChanges};

/// Outcome counts for one applied flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// File records written (added plus changed).
    pub files_upserted: usize,
    /// File records deleted.
    pub files_deleted: usize,
    /// Directory records recomputed.
    pub directories_recomputed: usize,
    /// Directory records deleted because they ended up with no children.
    pub directories_deleted: usize,
}

/// Keeps the store consistent with the workspace as changes flush in.
pub struct Reconciler {
    store: Arc<dyn DocumentStore>,
    ctx: SummaryContext,
}

impl Reconciler {
    /// Create a reconciler writing to the given store.
    pub fn new(store: Arc<dyn DocumentStore>, ctx: SummaryContext) -> Self {
        Self { store, ctx }
    }

    /// Apply one batch of changes and return what was done.
    ///
    /// Summarization failures degrade to placeholder summaries inside the
    /// context; only store failures propagate.
    pub async fn apply(&self, changes: &PendingChanges) -> Result<FlushStats> {
        if changes.is_empty() {
            return Ok(FlushStats::default());
        }

        let mut stats = FlushStats::default();

        for path in changes.paths_to_summarize() {
            let summary = self.ctx.summarize_file(path).await;
            self.store
                .upsert_one(DocumentRecord::file(path, summary))
                .await?;
            stats.files_upserted += 1;
        }

        for path in &changes.removed {
            self.store.delete_by_id(document_id(path)).await?;
            stats.files_deleted += 1;
        }

        for dir in affected_directories(changes) {
            if self.recompute_directory(&dir).await? {
                stats.directories_recomputed += 1;
            } else {
                stats.directories_deleted += 1;
            }
        }

        info!(
            "Flush applied: {} upserted, {} deleted, {} directories recomputed, {} removed",
            stats.files_upserted,
            stats.files_deleted,
            stats.directories_recomputed,
            stats.directories_deleted
        );
        Ok(stats)
    }

    /// Recompute one directory's summary from its current child records.
    ///
    /// Returns `false` if the directory had no remaining children and its
    /// record was deleted instead.
    async fn recompute_directory(&self, dir: &str) -> Result<bool> {
        let children = self
            .store
            .query_by_filter(DocumentFilter::parent_path(dir))
            .await?;

        if children.is_empty() {
            debug!("Directory {:?} emptied; dropping its record", dir);
            self.store.delete_by_id(document_id(dir)).await?;
            return Ok(false);
        }

        let child_summaries: Vec<String> =
            children.into_iter().map(|r| r.summary).collect();
        let summary = self.ctx.summarize_directory(&child_summaries).await;
        self.store
            .upsert_one(DocumentRecord::directory(dir, summary))
            .await?;
        Ok(true)
    }
}

#[async_trait]
impl FlushSink for Reconciler {
    async fn flush(&self, changes: PendingChanges) -> treeline_core::Result<()> {
        match self.apply(&changes).await {
            Ok(_) => Ok(()),
            Err(Error::Core(e)) => Err(e),
            Err(e) => Err(treeline_core::Error::Internal(e.to_string())),
        }
    }
}

/// All directories whose summaries a batch invalidates: the ancestors of
/// every touched path, excluding the workspace root, deduplicated and
/// ordered deepest first so child recomputation completes before the
/// parent reads it.
pub fn affected_directories(changes: &PendingChanges) -> Vec<String> {
    let mut set = BTreeSet::new();
    for path in changes.touched_paths() {
        for ancestor in treeline_core::ancestors_of(path) {
            set.insert(ancestor);
        }
    }

    let mut dirs: Vec<String> = set.into_iter().collect();
    dirs.sort_by(|a, b| {
        let depth = |p: &str| p.split('/').filter(|s| !s.is_empty()).count();
        depth(b).cmp(&depth(a)).then_with(|| a.cmp(b))
    });
    dirs
}
