//! # Treeline Core
//!
//! Data model and foundational primitives for the treeline hierarchical
//! summary index:
//!
//! - [`types`]: tree nodes, document records, and deterministic path-based
//!   document identity.
//! - [`traits`]: the [`SummaryOracle`] and [`DocumentStore`] seams through
//!   which external model and storage providers are injected.
//! - [`queue`]: the [`SerialTaskQueue`] single-flight executor that
//!   rate-limits oracle calls.
//! - [`store`]: an in-memory [`DocumentStore`] used by tests and as a
//!   fallback.
//! - [`oracle_mock`]: a deterministic oracle for tests.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod oracle_mock;
pub mod queue;
pub mod store;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use oracle_mock::MockOracle;
pub use queue::{QueueError, QueueState, SerialTaskQueue, TaskHandle};
pub use store::MemoryStore;
pub use traits::{DocumentFilter, DocumentStore, FilterField, SummaryOracle};
pub use types::{
    ancestors_of, document_id, parent_of, DocumentKind, DocumentRecord, TreeNode, ROOT_PATH,
};
