//! Notify-backed workspace watcher with debounced flushing.
//!
//! Events flow from the notify backend through an unbounded channel into a
//! single event-loop task. The loop filters and relativizes each event,
//! folds it into the [`ChangeAccumulator`], and arms a single-shot quiet
//! window timer. When the window elapses with no further events, the
//! accumulated batch is drained atomically and handed to the
//! [`FlushSink`].

use crate::accumulator::{ChangeAccumulator, FlushSink};
use crate::config::WatchConfig;
use crate::error::{Error, Result};
use crate::events::{convert_notify_event, relative_path, FileEvent, FileEventKind};
use crate::filter::PathFilter;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, trace, warn};

/// Watches one workspace root and drives debounced reconciliation.
pub struct WorkspaceWatcher {
    root: PathBuf,
    config: WatchConfig,
    filter: Arc<dyn PathFilter>,
    sink: Arc<dyn FlushSink>,
    backend: Option<RecommendedWatcher>,
    loop_task: Option<JoinHandle<()>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl WorkspaceWatcher {
    /// Create a watcher for the given workspace root.
    ///
    /// Nothing happens until [`start`](Self::start) is called.
    pub fn new(
        root: PathBuf,
        config: WatchConfig,
        filter: Arc<dyn PathFilter>,
        sink: Arc<dyn FlushSink>,
    ) -> Self {
        Self {
            root,
            config,
            filter,
            sink,
            backend: None,
            loop_task: None,
            shutdown_tx: None,
        }
    }

    /// Start watching the workspace root.
    pub fn start(&mut self) -> Result<()> {
        if self.loop_task.is_some() {
            return Err(Error::AlreadyRunning);
        }
        self.config.validate()?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let sender = event_tx.clone();
        let mut backend = RecommendedWatcher::new(
            move |result: notify::Result<notify::Event>| match result {
                Ok(event) => {
                    for file_event in convert_notify_event(event) {
                        if sender.send(file_event).is_err() {
                            // Event loop is gone; the backend is about to
                            // be dropped as well.
                            return;
                        }
                    }
                }
                Err(e) => warn!("Notify backend error: {}", e),
            },
            notify::Config::default(),
        )?;

        let mode = if self.config.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        backend.watch(&self.root, mode)?;
        self.backend = Some(backend);

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        self.shutdown_tx = Some(shutdown_tx);

        let loop_ctx = EventLoop {
            root: self.root.clone(),
            filter: Arc::clone(&self.filter),
            sink: Arc::clone(&self.sink),
            quiet_window: self.config.quiet_window(),
        };
        self.loop_task = Some(tokio::spawn(loop_ctx.run(event_rx, shutdown_rx)));

        info!("Watching workspace: {}", self.root.display());
        Ok(())
    }

    /// Whether the watcher is currently running.
    pub fn is_running(&self) -> bool {
        self.loop_task.is_some()
    }

    /// Stop watching.
    ///
    /// No further events are observed after this returns; a flush already
    /// in progress runs to completion. Changes accumulated but not yet
    /// flushed are discarded.
    pub async fn shutdown(&mut self) -> Result<()> {
        // Dropping the backend stops event delivery.
        self.backend = None;

        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
        if let Some(task) = self.loop_task.take() {
            task.await
                .map_err(|e| Error::Channel(format!("event loop panicked: {e}")))?;
        }

        info!("Stopped watching workspace: {}", self.root.display());
        Ok(())
    }
}

/// State owned by the spawned event-loop task.
struct EventLoop {
    root: PathBuf,
    filter: Arc<dyn PathFilter>,
    sink: Arc<dyn FlushSink>,
    quiet_window: Duration,
}

impl EventLoop {
    async fn run(
        self,
        mut events: mpsc::UnboundedReceiver<FileEvent>,
        mut shutdown: mpsc::Receiver<()>,
    ) {
        let mut accumulator = ChangeAccumulator::new();
        // Single-shot deadline; rearmed on every accepted event, never
        // stacked.
        let mut deadline: Option<Instant> = None;

        loop {
            let quiet_elapsed = async {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                _ = shutdown.recv() => break,
                maybe_event = events.recv() => {
                    match maybe_event {
                        Some(event) => {
                            if let Some((kind, path)) = self.accept(&event) {
                                trace!("Accepted {} event for {}", kind.as_str(), path);
                                accumulator.record(kind, path);
                                deadline = Some(Instant::now() + self.quiet_window);
                            }
                        }
                        None => break,
                    }
                }
                _ = quiet_elapsed => {
                    deadline = None;
                    let changes = accumulator.take();
                    if changes.is_empty() {
                        continue;
                    }
                    debug!("Quiet window closed; flushing {} changed paths", changes.len());
                    if let Err(e) = self.sink.flush(changes).await {
                        // The drained batch is not re-queued; the affected
                        // paths are picked up again only if they change.
                        error!("Reconciliation flush failed: {}", e);
                    }
                }
            }
        }
    }

    /// Filter one raw event down to a workspace-relative file change.
    ///
    /// Drops events for the root itself, ignored paths, and directories.
    /// Removal events pass through without a directory check since the
    /// entry no longer exists; deleting an unknown id downstream is a
    /// no-op.
    fn accept(&self, event: &FileEvent) -> Option<(FileEventKind, String)> {
        let relative = relative_path(&self.root, &event.path)?;
        if self.filter.is_ignored(&relative) {
            return None;
        }
        if event.kind.affects_content() && event.path.is_dir() {
            return None;
        }
        Some((event.kind, relative))
    }
}
