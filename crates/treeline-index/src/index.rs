//! Facade tying bootstrap, watching, and reconciliation together.

use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::reconciler::Reconciler;
use crate::scanner::WorkspaceScanner;
use crate::summarizer::{BottomUpSummarizer, IndexingVisitor, SummaryContext};
use crate::tree::TreeBuilder;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use treeline_core::{
    DocumentFilter, DocumentRecord, DocumentStore, SerialTaskQueue, SummaryOracle,
};
use treeline_watch::{IgnoreFilter, PathFilter, WorkspaceWatcher};

/// A live hierarchical summary index over one workspace root.
///
/// Opening the index bootstraps the store if it is empty, then starts a
/// watcher that keeps the store consistent with the workspace until
/// [`shutdown`](Self::shutdown).
pub struct WorkspaceIndex {
    root: PathBuf,
    store: Arc<dyn DocumentStore>,
    queue: SerialTaskQueue,
    watcher: WorkspaceWatcher,
}

impl WorkspaceIndex {
    /// Open the index for a workspace root.
    ///
    /// If the store already holds records, the bootstrap pass is skipped
    /// and the existing index is reused as-is; the watcher then converges
    /// it on subsequent changes.
    pub async fn open(
        root: PathBuf,
        oracle: Arc<dyn SummaryOracle>,
        store: Arc<dyn DocumentStore>,
        config: IndexConfig,
    ) -> Result<Self> {
        config.validate()?;
        let metadata = tokio::fs::metadata(&root).await?;
        if !metadata.is_dir() {
            return Err(Error::Config(format!(
                "workspace root is not a directory: {}",
                root.display()
            )));
        }

        let filter: Arc<dyn PathFilter> = Arc::new(IgnoreFilter::for_workspace(&root)?);
        let queue = SerialTaskQueue::new();
        let ctx = SummaryContext::new(
            root.clone(),
            oracle,
            queue.clone(),
            config.max_summary_input_chars,
        );

        if !store.exists().await? {
            bootstrap(&root, Arc::clone(&filter), &ctx, store.as_ref()).await?;
        } else {
            info!("Index already populated for {}; skipping bootstrap", root.display());
        }

        let reconciler = Arc::new(Reconciler::new(Arc::clone(&store), ctx));
        let mut watcher =
            WorkspaceWatcher::new(root.clone(), config.watch.clone(), filter, reconciler);
        watcher.start()?;

        Ok(Self {
            root,
            store,
            queue,
            watcher,
        })
    }

    /// Workspace root this index covers.
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Whether the watcher is running.
    pub fn is_watching(&self) -> bool {
        self.watcher.is_running()
    }

    /// Ranked retrieval over summary text.
    pub async fn query(&self, text: &str) -> Result<Vec<DocumentRecord>> {
        Ok(self.store.query_text(text).await?)
    }

    /// Records of a directory's direct children.
    pub async fn read_directory(&self, dir: &str) -> Result<Vec<DocumentRecord>> {
        Ok(self
            .store
            .query_by_filter(DocumentFilter::parent_path(dir))
            .await?)
    }

    /// Record for one exact path, if indexed.
    pub async fn summary_of(&self, path: &str) -> Result<Option<DocumentRecord>> {
        let mut matches = self
            .store
            .query_by_filter(DocumentFilter::path(path))
            .await?;
        Ok(matches.pop())
    }

    /// Stop watching and release the oracle queue.
    ///
    /// A flush already in progress runs to completion; queued oracle calls
    /// that have not started are discarded.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.watcher.shutdown().await?;
        self.queue.dispose();
        Ok(())
    }
}

/// Full scan-and-summarize pass populating an empty store.
async fn bootstrap(
    root: &PathBuf,
    filter: Arc<dyn PathFilter>,
    ctx: &SummaryContext,
    store: &dyn DocumentStore,
) -> Result<()> {
    let files = WorkspaceScanner::new(root.clone(), filter).scan().await?;
    info!(
        "Bootstrapping index for {} ({} files)",
        root.display(),
        files.len()
    );

    let tree = TreeBuilder::build(&files);
    let visitor = IndexingVisitor::new(ctx.clone());
    BottomUpSummarizer::traverse(&tree, &visitor).await?;

    let records = visitor.into_records();
    let count = records.len();
    store.upsert_many(records).await?;
    info!("Bootstrap complete: {} records written", count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use treeline_core::{MemoryStore, MockOracle, ROOT_PATH};
    use treeline_watch::WatchConfig;

    fn fast_config() -> IndexConfig {
        IndexConfig {
            watch: WatchConfig::default().with_quiet_window(Duration::from_millis(100)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn open_bootstraps_an_empty_store() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("src")).unwrap();
        std::fs::write(tmp.path().join("src/a.js"), "alpha").unwrap();
        std::fs::write(tmp.path().join("readme.md"), "docs").unwrap();

        let store = Arc::new(MemoryStore::new());
        let mut index = WorkspaceIndex::open(
            tmp.path().to_path_buf(),
            Arc::new(MockOracle::new()),
            Arc::clone(&store) as Arc<dyn DocumentStore>,
            fast_config(),
        )
        .await
        .unwrap();

        let paths: Vec<String> =
            store.all().await.into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["", "readme.md", "src", "src/a.js"]);
        assert!(index.is_watching());

        index.shutdown().await.unwrap();
        assert!(!index.is_watching());
    }

    #[tokio::test]
    async fn open_skips_bootstrap_when_store_is_populated() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.txt"), "content").unwrap();

        let store = Arc::new(MemoryStore::new());
        store
            .upsert_one(DocumentRecord::directory(ROOT_PATH, "existing root"))
            .await
            .unwrap();

        let oracle = Arc::new(MockOracle::new());
        let mut index = WorkspaceIndex::open(
            tmp.path().to_path_buf(),
            Arc::clone(&oracle) as Arc<dyn SummaryOracle>,
            Arc::clone(&store) as Arc<dyn DocumentStore>,
            fast_config(),
        )
        .await
        .unwrap();

        assert_eq!(oracle.call_count(), 0);
        assert_eq!(
            index.summary_of(ROOT_PATH).await.unwrap().unwrap().summary,
            "existing root"
        );
        index.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn missing_root_is_rejected() {
        let result = WorkspaceIndex::open(
            PathBuf::from("/definitely/not/here"),
            Arc::new(MockOracle::new()),
            Arc::new(MemoryStore::new()),
            fast_config(),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn read_directory_lists_direct_children() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("src")).unwrap();
        std::fs::write(tmp.path().join("src/a.js"), "alpha").unwrap();
        std::fs::write(tmp.path().join("src/b.js"), "beta").unwrap();
        std::fs::write(tmp.path().join("readme.md"), "docs").unwrap();

        let mut index = WorkspaceIndex::open(
            tmp.path().to_path_buf(),
            Arc::new(MockOracle::new()),
            Arc::new(MemoryStore::new()),
            fast_config(),
        )
        .await
        .unwrap();

        let children = index.read_directory("src").await.unwrap();
        let paths: Vec<_> = children.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["src/a.js", "src/b.js"]);

        let top = index.read_directory(ROOT_PATH).await.unwrap();
        let paths: Vec<_> = top.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["readme.md", "src"]);

        index.shutdown().await.unwrap();
    }
}
