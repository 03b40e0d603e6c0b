//! Per-flush-window accumulation of file changes.
//!
//! Raw watcher events are folded into three disjoint path sets. When the
//! debounce window closes, [`ChangeAccumulator::take`] hands the whole
//! batch to the reconciler in one atomic swap, so events arriving during a
//! flush land in a fresh accumulator for the next window.

use crate::events::FileEventKind;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// One debounce window's worth of deduplicated file changes.
///
/// The sets are disjoint: for every path only the most recent event kind is
/// retained (removal wins over a prior add/change, and vice versa).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingChanges {
    /// Files that appeared during the window.
    pub added: BTreeSet<String>,
    /// Files whose content changed during the window.
    pub changed: BTreeSet<String>,
    /// Files deleted during the window.
    pub removed: BTreeSet<String>,
}

impl PendingChanges {
    /// Whether the window recorded no changes.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }

    /// Total number of distinct paths touched.
    pub fn len(&self) -> usize {
        self.added.len() + self.changed.len() + self.removed.len()
    }

    /// Paths needing re-summarization: added and changed are treated
    /// identically downstream.
    pub fn paths_to_summarize(&self) -> impl Iterator<Item = &str> {
        self.added
            .iter()
            .chain(self.changed.iter())
            .map(String::as_str)
    }

    /// Every path touched in this window, across all three sets.
    pub fn touched_paths(&self) -> impl Iterator<Item = &str> {
        self.added
            .iter()
            .chain(self.changed.iter())
            .chain(self.removed.iter())
            .map(String::as_str)
    }
}

/// Mutable accumulator the watcher's event loop records into.
#[derive(Debug, Default)]
pub struct ChangeAccumulator {
    pending: PendingChanges,
}

impl ChangeAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one event, enforcing last-event-wins precedence per path.
    pub fn record(&mut self, kind: FileEventKind, path: String) {
        match kind {
            FileEventKind::Added => {
                self.pending.changed.remove(&path);
                self.pending.removed.remove(&path);
                self.pending.added.insert(path);
            }
            FileEventKind::Changed => {
                self.pending.removed.remove(&path);
                // A change to a file added in this same window stays in
                // `added`; both sets are re-summarized identically.
                if !self.pending.added.contains(&path) {
                    self.pending.changed.insert(path);
                }
            }
            FileEventKind::Removed => {
                self.pending.added.remove(&path);
                self.pending.changed.remove(&path);
                self.pending.removed.insert(path);
            }
        }
    }

    /// Whether any changes are pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Swap out the accumulated changes and reset to empty, as one atomic
    /// step.
    pub fn take(&mut self) -> PendingChanges {
        std::mem::take(&mut self.pending)
    }
}

/// Consumer of one debounced batch of changes.
///
/// The reconciler implements this; the watcher invokes it once per flush.
#[async_trait]
pub trait FlushSink: Send + Sync {
    /// Apply one window's changes to the index.
    async fn flush(&self, changes: PendingChanges) -> treeline_core::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(set: &BTreeSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn events_deduplicate_by_path() {
        let mut acc = ChangeAccumulator::new();
        acc.record(FileEventKind::Changed, "a.txt".into());
        acc.record(FileEventKind::Changed, "a.txt".into());

        let pending = acc.take();
        assert_eq!(paths(&pending.changed), vec!["a.txt"]);
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn removal_wins_over_earlier_change() {
        let mut acc = ChangeAccumulator::new();
        acc.record(FileEventKind::Changed, "a.txt".into());
        acc.record(FileEventKind::Removed, "a.txt".into());

        let pending = acc.take();
        assert!(pending.changed.is_empty());
        assert_eq!(paths(&pending.removed), vec!["a.txt"]);
    }

    #[test]
    fn re_add_wins_over_earlier_removal() {
        let mut acc = ChangeAccumulator::new();
        acc.record(FileEventKind::Removed, "a.txt".into());
        acc.record(FileEventKind::Added, "a.txt".into());

        let pending = acc.take();
        assert!(pending.removed.is_empty());
        assert_eq!(paths(&pending.added), vec!["a.txt"]);
    }

    #[test]
    fn change_after_add_stays_in_added() {
        let mut acc = ChangeAccumulator::new();
        acc.record(FileEventKind::Added, "a.txt".into());
        acc.record(FileEventKind::Changed, "a.txt".into());

        let pending = acc.take();
        assert_eq!(paths(&pending.added), vec!["a.txt"]);
        assert!(pending.changed.is_empty());
    }

    #[test]
    fn take_clears_the_accumulator() {
        let mut acc = ChangeAccumulator::new();
        acc.record(FileEventKind::Added, "a.txt".into());

        let first = acc.take();
        assert_eq!(first.len(), 1);
        assert!(acc.is_empty());
        assert!(acc.take().is_empty());
    }

    #[test]
    fn summarize_paths_union_added_and_changed() {
        let mut acc = ChangeAccumulator::new();
        acc.record(FileEventKind::Added, "new.txt".into());
        acc.record(FileEventKind::Changed, "old.txt".into());
        acc.record(FileEventKind::Removed, "gone.txt".into());

        let pending = acc.take();
        let to_summarize: Vec<_> = pending.paths_to_summarize().collect();
        assert_eq!(to_summarize, vec!["new.txt", "old.txt"]);
        let touched: Vec<_> = pending.touched_paths().collect();
        assert_eq!(touched, vec!["new.txt", "old.txt", "gone.txt"]);
    }
}
