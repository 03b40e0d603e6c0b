//! # Treeline Index
//!
//! Incremental hierarchical summarization of a workspace. Every file gets
//! a natural-language summary from an external oracle; every directory
//! gets a summary synthesized from its children's summaries, up to a
//! single root summary. After a one-time bootstrap, a filesystem watcher
//! keeps the store consistent:
//!
//! ```text
//! bootstrap:   scan ──▶ TreeBuilder ──▶ BottomUpSummarizer ──▶ store
//! steady state: WorkspaceWatcher ──▶ Reconciler ──▶ store
//! ```
//!
//! [`WorkspaceIndex`] is the entry point; everything else is exposed for
//! callers that need to compose the pieces differently.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
mod index;
pub mod prompt;
mod reconciler;
mod scanner;
mod summarizer;
mod tree;

pub use config::IndexConfig;
pub use error::{Error, Result};
pub use index::WorkspaceIndex;
pub use prompt::{MISSING_SUMMARY, TOO_LARGE_SUMMARY};
pub use reconciler::{affected_directories, FlushStats, Reconciler};
pub use scanner::WorkspaceScanner;
pub use summarizer::{
    BottomUpSummarizer, IndexingVisitor, NodeSummary, SummaryContext, TreeVisitor,
};
pub use tree::TreeBuilder;
