//! Construction of the in-memory directory tree from a flat path list.

use treeline_core::{TreeNode, ROOT_PATH};

/// Builds a [`TreeNode`] tree from workspace-relative file paths.
pub struct TreeBuilder;

impl TreeBuilder {
    /// Build the tree for the given file paths.
    ///
    /// Directory nodes are created for every path prefix and deduplicated
    /// by exact path; children keep first-seen order. An empty input
    /// yields a childless root.
    pub fn build<I, S>(paths: I) -> TreeNode
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root = DirBuilder {
            path: ROOT_PATH.to_string(),
            entries: Vec::new(),
        };

        for path in paths {
            let path = path.as_ref();
            if path.is_empty() {
                continue;
            }
            root.insert(path);
        }

        root.into_node()
    }
}

struct DirBuilder {
    path: String,
    entries: Vec<Entry>,
}

enum Entry {
    File(String),
    Dir(DirBuilder),
}

impl DirBuilder {
    fn insert(&mut self, path: &str) {
        let parts: Vec<&str> = path.split('/').collect();
        let mut current = self;

        for depth in 0..parts.len() {
            if depth == parts.len() - 1 {
                let exists = current
                    .entries
                    .iter()
                    .any(|e| matches!(e, Entry::File(p) if p == path));
                if !exists {
                    current.entries.push(Entry::File(path.to_string()));
                }
            } else {
                let prefix = parts[..=depth].join("/");
                let idx = current
                    .entries
                    .iter()
                    .position(|e| matches!(e, Entry::Dir(d) if d.path == prefix))
                    .unwrap_or_else(|| {
                        current.entries.push(Entry::Dir(DirBuilder {
                            path: prefix,
                            entries: Vec::new(),
                        }));
                        current.entries.len() - 1
                    });
                match &mut current.entries[idx] {
                    Entry::Dir(dir) => current = dir,
                    // The position above only matches Dir entries.
                    Entry::File(_) => unreachable!("directory index points at a file"),
                }
            }
        }
    }

    fn into_node(self) -> TreeNode {
        TreeNode::Directory {
            path: self.path,
            children: self
                .entries
                .into_iter()
                .map(|entry| match entry {
                    Entry::File(path) => TreeNode::File { path },
                    Entry::Dir(dir) => dir.into_node(),
                })
                .collect(),
        }
    }
}
