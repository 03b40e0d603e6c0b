//! # Treeline Watch
//!
//! Filesystem change tracking for the treeline index. Wraps the `notify`
//! backend, applies gitignore-style filtering, coalesces event bursts in a
//! [`ChangeAccumulator`], and triggers debounced reconciliation through the
//! [`FlushSink`] seam:
//!
//! ```text
//! notify backend ──▶ event loop ──▶ ChangeAccumulator
//!                        │               │ (quiet window elapses)
//!                   IgnoreFilter         ▼
//!                                    FlushSink (Reconciler)
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod accumulator;
pub mod config;
pub mod error;
mod events;
pub mod filter;
mod watcher;

pub use accumulator::{ChangeAccumulator, FlushSink, PendingChanges};
pub use config::WatchConfig;
pub use error::{Error, Result};
pub use events::{convert_notify_event, relative_path, FileEvent, FileEventKind};
pub use filter::{IgnoreFilter, PathFilter, DEFAULT_IGNORES};
pub use watcher::WorkspaceWatcher;
