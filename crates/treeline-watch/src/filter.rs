//! Gitignore-style path filtering for watch events and workspace scans.

use crate::error::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use tracing::debug;

/// Predicate deciding whether a workspace-relative path is excluded from
/// the index.
///
/// The workspace root itself is never passed to this predicate; callers
/// filter it out before consulting the ignore rules.
pub trait PathFilter: Send + Sync {
    /// Whether the given slash-delimited relative path should be ignored.
    fn is_ignored(&self, relative_path: &str) -> bool;
}

/// Patterns excluded by default: build output, dependency trees, VCS
/// metadata, and churn-heavy artifacts like lock and log files.
pub const DEFAULT_IGNORES: &[&str] = &[
    "**/.git/**",
    "**/node_modules/**",
    "**/target/**",
    "dist/**",
    "**/*.log",
    "**/*.lock",
    "**/*-lock.json",
    "**/*.timestamp-*",
];

/// Globset-backed [`PathFilter`].
pub struct IgnoreFilter {
    set: GlobSet,
    pattern_count: usize,
}

impl IgnoreFilter {
    /// Build a filter from explicit glob patterns.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        let mut pattern_count = 0;
        for pattern in patterns {
            builder.add(Glob::new(pattern.as_ref())?);
            pattern_count += 1;
        }
        Ok(Self {
            set: builder.build()?,
            pattern_count,
        })
    }

    /// Build a filter from the default ignore set.
    pub fn with_defaults() -> Result<Self> {
        Self::new(DEFAULT_IGNORES.iter().copied())
    }

    /// Build a filter from the defaults plus the workspace `.gitignore`,
    /// if one exists. Unsupported gitignore features (negations) are
    /// skipped.
    pub fn for_workspace(root: &Path) -> Result<Self> {
        let mut patterns: Vec<String> =
            DEFAULT_IGNORES.iter().map(|p| p.to_string()).collect();

        let gitignore = root.join(".gitignore");
        if let Ok(contents) = std::fs::read_to_string(&gitignore) {
            let before = patterns.len();
            for line in contents.lines() {
                patterns.extend(gitignore_line_to_globs(line));
            }
            debug!(
                "Loaded {} ignore patterns from {}",
                patterns.len() - before,
                gitignore.display()
            );
        }

        Self::new(patterns)
    }

    /// Number of compiled patterns.
    pub fn pattern_count(&self) -> usize {
        self.pattern_count
    }
}

impl PathFilter for IgnoreFilter {
    fn is_ignored(&self, relative_path: &str) -> bool {
        self.set.is_match(relative_path)
    }
}

/// Translate one `.gitignore` line into glob patterns.
///
/// Handles the common cases: comments and blanks are dropped, negations are
/// skipped, a trailing slash marks a directory, and a leading slash anchors
/// the pattern at the workspace root.
fn gitignore_line_to_globs(line: &str) -> Vec<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
        return Vec::new();
    }

    let (anchored, body) = match line.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (line.contains('/') && !line.ends_with('/'), line),
    };
    let body = body.strip_suffix('/').unwrap_or(body);
    if body.is_empty() {
        return Vec::new();
    }

    if anchored {
        vec![body.to_string(), format!("{body}/**")]
    } else {
        vec![
            format!("**/{body}"),
            format!("**/{body}/**"),
            body.to_string(),
            format!("{body}/**"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_ignore_vcs_and_dependency_trees() {
        let filter = IgnoreFilter::with_defaults().unwrap();
        assert!(filter.is_ignored(".git/config"));
        assert!(filter.is_ignored("web/node_modules/react/index.js"));
        assert!(filter.is_ignored("target/debug/build.log"));
        assert!(filter.is_ignored("package-lock.json"));
        assert!(!filter.is_ignored("src/lib.rs"));
        assert!(!filter.is_ignored("readme.md"));
    }

    #[test]
    fn explicit_patterns_match_relative_paths() {
        let filter = IgnoreFilter::new(["docs/**", "**/*.tmp"]).unwrap();
        assert!(filter.is_ignored("docs/guide.md"));
        assert!(filter.is_ignored("src/scratch.tmp"));
        assert!(!filter.is_ignored("src/main.rs"));
    }

    #[test]
    fn gitignore_lines_translate_to_globs() {
        assert!(gitignore_line_to_globs("# comment").is_empty());
        assert!(gitignore_line_to_globs("").is_empty());
        assert!(gitignore_line_to_globs("!keep.me").is_empty());

        let dir = gitignore_line_to_globs("build/");
        assert!(dir.contains(&"**/build/**".to_string()));

        let anchored = gitignore_line_to_globs("/out");
        assert_eq!(anchored, vec!["out".to_string(), "out/**".to_string()]);
    }

    #[test]
    fn for_workspace_reads_gitignore() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join(".gitignore"), "secret/\n*.bak\n").unwrap();

        let filter = IgnoreFilter::for_workspace(tmp.path()).unwrap();
        assert!(filter.is_ignored("secret/key.pem"));
        assert!(filter.is_ignored("notes/draft.bak"));
        assert!(!filter.is_ignored("src/lib.rs"));
    }

    #[test]
    fn missing_gitignore_falls_back_to_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let filter = IgnoreFilter::for_workspace(tmp.path()).unwrap();
        assert_eq!(filter.pattern_count(), DEFAULT_IGNORES.len());
    }
}
