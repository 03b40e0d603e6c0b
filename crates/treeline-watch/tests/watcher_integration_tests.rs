//! End-to-end watcher tests against a real filesystem and notify backend.
//!
//! These use generous timeouts because backend delivery latency varies by
//! platform.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use treeline_watch::{
    FlushSink, IgnoreFilter, PendingChanges, WatchConfig, WorkspaceWatcher,
};

struct CollectingSink {
    flushes: Mutex<Vec<PendingChanges>>,
}

impl CollectingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            flushes: Mutex::new(Vec::new()),
        })
    }

    fn flushes(&self) -> Vec<PendingChanges> {
        self.flushes.lock().clone()
    }
}

#[async_trait]
impl FlushSink for CollectingSink {
    async fn flush(&self, changes: PendingChanges) -> treeline_core::Result<()> {
        self.flushes.lock().push(changes);
        Ok(())
    }
}

async fn wait_for_flush(sink: &CollectingSink, count: usize) -> bool {
    for _ in 0..100 {
        if sink.flushes().len() >= count {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    false
}

fn watcher_for(root: PathBuf, sink: Arc<CollectingSink>) -> WorkspaceWatcher {
    let config = WatchConfig::default().with_quiet_window(Duration::from_millis(300));
    let filter = Arc::new(IgnoreFilter::with_defaults().expect("default filter"));
    WorkspaceWatcher::new(root, config, filter, sink)
}

#[tokio::test]
async fn file_write_triggers_a_flush() {
    let tmp = TempDir::new().unwrap();
    let sink = CollectingSink::new();
    let mut watcher = watcher_for(tmp.path().to_path_buf(), Arc::clone(&sink));
    watcher.start().unwrap();

    // Let the backend settle before generating events.
    tokio::time::sleep(Duration::from_millis(200)).await;
    std::fs::write(tmp.path().join("note.md"), "hello").unwrap();

    assert!(wait_for_flush(&sink, 1).await, "no flush observed");
    let flushes = sink.flushes();
    let first = &flushes[0];
    assert!(
        first.added.contains("note.md") || first.changed.contains("note.md"),
        "note.md not in flushed changes: {first:?}"
    );

    watcher.shutdown().await.unwrap();
    assert!(!watcher.is_running());
}

#[tokio::test]
async fn ignored_paths_do_not_trigger_flushes() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("node_modules/pkg")).unwrap();

    let sink = CollectingSink::new();
    let mut watcher = watcher_for(tmp.path().to_path_buf(), Arc::clone(&sink));
    watcher.start().unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    std::fs::write(tmp.path().join("node_modules/pkg/index.js"), "x").unwrap();

    // The quiet window is 300ms; wait well past it.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(sink.flushes().is_empty());

    watcher.shutdown().await.unwrap();
}

#[tokio::test]
async fn start_twice_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let sink = CollectingSink::new();
    let mut watcher = watcher_for(tmp.path().to_path_buf(), Arc::clone(&sink));

    watcher.start().unwrap();
    assert!(watcher.start().is_err());
    watcher.shutdown().await.unwrap();
}
