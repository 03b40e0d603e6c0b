//! Bottom-up summarization of the workspace tree.
//!
//! The traversal is structurally concurrent: all children of a directory
//! are summarized through a fanned-out `join`, and the directory's own
//! summary is synthesized only after every child has settled. Actual oracle
//! execution is serialized by the [`SerialTaskQueue`] inside
//! [`SummaryContext`], so the fan-out never overwhelms the oracle.

use crate::error::Result;
use crate::prompt::{directory_prompt, file_prompt, MISSING_SUMMARY, TOO_LARGE_SUMMARY};
use async_trait::async_trait;
use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};
use treeline_core::{DocumentRecord, SerialTaskQueue, SummaryOracle, TreeNode};

/// Path and computed summary of one visited node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSummary {
    /// Workspace-relative path of the node.
    pub path: String,
    /// Summary text computed for the node.
    pub summary: String,
}

/// Callbacks invoked by the traversal.
///
/// `visit_directory` for a node is called strictly after the calls for all
/// of that directory's descendants have returned.
#[async_trait]
pub trait TreeVisitor: Send + Sync {
    /// Summarize one file.
    async fn visit_file(&self, path: &str) -> Result<String>;

    /// Summarize one directory from its children's summaries.
    async fn visit_directory(&self, path: &str, children: &[NodeSummary]) -> Result<String>;
}

/// Post-order traversal driver.
pub struct BottomUpSummarizer;

impl BottomUpSummarizer {
    /// Traverse the tree, summarizing leaves first, and return the root's
    /// summary.
    pub async fn traverse(root: &TreeNode, visitor: &dyn TreeVisitor) -> Result<NodeSummary> {
        visit_node(root, visitor).await
    }
}

fn visit_node<'a>(
    node: &'a TreeNode,
    visitor: &'a dyn TreeVisitor,
) -> BoxFuture<'a, Result<NodeSummary>> {
    async move {
        match node {
            TreeNode::File { path } => Ok(NodeSummary {
                path: path.clone(),
                summary: visitor.visit_file(path).await?,
            }),
            TreeNode::Directory { path, children } => {
                let results =
                    try_join_all(children.iter().map(|child| visit_node(child, visitor)))
                        .await?;
                let summary = visitor.visit_directory(path, &results).await?;
                Ok(NodeSummary {
                    path: path.clone(),
                    summary,
                })
            }
        }
    }
    .boxed()
}

/// Shared summarization policy: prompt construction, size threshold,
/// placeholder fallback, and oracle serialization.
///
/// Used by the bootstrap visitor and by the reconciler so both paths apply
/// identical policy.
#[derive(Clone)]
pub struct SummaryContext {
    root: PathBuf,
    oracle: Arc<dyn SummaryOracle>,
    queue: SerialTaskQueue,
    max_input_chars: usize,
}

impl SummaryContext {
    /// Create a context rooted at the given workspace path.
    pub fn new(
        root: PathBuf,
        oracle: Arc<dyn SummaryOracle>,
        queue: SerialTaskQueue,
        max_input_chars: usize,
    ) -> Self {
        Self {
            root,
            oracle,
            queue,
            max_input_chars,
        }
    }

    /// Summarize the current content of a workspace-relative file.
    ///
    /// Never fails: an unreadable file (e.g. deleted between the change
    /// event and this read), an oversized file, and an oracle failure all
    /// degrade to placeholder summaries.
    pub async fn summarize_file(&self, relative_path: &str) -> String {
        let absolute = self.root.join(relative_path);
        let content = match tokio::fs::read_to_string(&absolute).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Could not read {}: {}", absolute.display(), e);
                return MISSING_SUMMARY.to_string();
            }
        };

        if content.chars().count() > self.max_input_chars {
            debug!(
                "{} exceeds {} chars; using placeholder",
                relative_path, self.max_input_chars
            );
            return TOO_LARGE_SUMMARY.to_string();
        }

        self.request(file_prompt(&content)).await
    }

    /// Summarize a directory from its children's summary texts.
    pub async fn summarize_directory(&self, child_summaries: &[String]) -> String {
        self.request(directory_prompt(child_summaries)).await
    }

    /// Route one prompt through the serial queue to the oracle.
    async fn request(&self, prompt: String) -> String {
        let oracle = Arc::clone(&self.oracle);
        let handle = match self
            .queue
            .add(move || async move { oracle.summarize(&prompt).await })
        {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Summarization queue rejected task: {}", e);
                return MISSING_SUMMARY.to_string();
            }
        };

        match handle.join().await {
            Ok(Ok(summary)) if !summary.trim().is_empty() => summary,
            Ok(Ok(_)) => {
                warn!("Oracle returned an empty summary");
                MISSING_SUMMARY.to_string()
            }
            Ok(Err(e)) => {
                warn!("Oracle call failed: {}", e);
                MISSING_SUMMARY.to_string()
            }
            Err(e) => {
                warn!("Summarization task abandoned: {}", e);
                MISSING_SUMMARY.to_string()
            }
        }
    }
}

/// Visitor that summarizes real files through a [`SummaryContext`] and
/// collects a [`DocumentRecord`] for every node it visits.
pub struct IndexingVisitor {
    ctx: SummaryContext,
    records: Mutex<Vec<DocumentRecord>>,
}

impl IndexingVisitor {
    /// Create a visitor backed by the given summarization context.
    pub fn new(ctx: SummaryContext) -> Self {
        Self {
            ctx,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Consume the visitor and return all collected records.
    pub fn into_records(self) -> Vec<DocumentRecord> {
        self.records.into_inner()
    }
}

#[async_trait]
impl TreeVisitor for IndexingVisitor {
    async fn visit_file(&self, path: &str) -> Result<String> {
        let summary = self.ctx.summarize_file(path).await;
        self.records
            .lock()
            .push(DocumentRecord::file(path, summary.clone()));
        Ok(summary)
    }

    async fn visit_directory(&self, path: &str, children: &[NodeSummary]) -> Result<String> {
        let child_summaries: Vec<String> =
            children.iter().map(|c| c.summary.clone()).collect();
        let summary = self.ctx.summarize_directory(&child_summaries).await;
        self.records
            .lock()
            .push(DocumentRecord::directory(path, summary.clone()));
        Ok(summary)
    }
}
