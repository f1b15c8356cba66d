//! Glob pattern utilities
//!
//! This module provides glob detection and expansion for file discovery.
//! Expansion walks from the pattern's literal prefix so that patterns like
//! `reports/2024/*.csv` do not scan the whole tree.

use anyhow::{Context, Result};
use globset::Glob;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Check if a string contains glob pattern characters
pub fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?') || pattern.contains('[')
}

/// Expand a single glob pattern to matching file paths, in walk order.
///
/// Symlinks are followed; walk errors (cycles, unreadable directories) are
/// logged and skipped. A pattern that matches nothing yields an empty list.
pub fn expand_glob_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let glob = Glob::new(pattern)
        .with_context(|| format!("invalid glob pattern: {pattern}"))?;
    let matcher = glob.compile_matcher();

    let root = literal_prefix(Path::new(pattern));
    let mut matching_paths = Vec::new();

    for entry in WalkDir::new(&root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                if e.loop_ancestor().is_some() {
                    tracing::warn!(pattern, "symlink cycle detected while expanding glob: {e}");
                } else {
                    tracing::warn!(pattern, "walk error while expanding glob: {e}");
                }
                continue;
            }
        };
        let path = entry.path();
        if entry.file_type().is_file() && matcher.is_match(path) {
            matching_paths.push(path.to_path_buf());
        }
    }

    Ok(matching_paths)
}

/// The longest leading part of a pattern that contains no glob characters.
/// Falls back to `.` when the pattern globs from its first component.
fn literal_prefix(pattern: &Path) -> PathBuf {
    let mut prefix = PathBuf::new();
    for component in pattern.components() {
        match component {
            Component::Normal(part) if is_glob_pattern(&part.to_string_lossy()) => break,
            other => prefix.push(other.as_os_str()),
        }
    }
    if prefix.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_glob_characters() {
        assert!(is_glob_pattern("*.txt"));
        assert!(is_glob_pattern("file?.log"));
        assert!(is_glob_pattern("data/[ab]/x"));
        assert!(!is_glob_pattern("plain/path.txt"));
    }

    #[test]
    fn literal_prefix_stops_at_first_glob_component() {
        assert_eq!(literal_prefix(Path::new("a/b/*.txt")), PathBuf::from("a/b"));
        assert_eq!(literal_prefix(Path::new("*.txt")), PathBuf::from("."));
        assert_eq!(literal_prefix(Path::new("a/*/c.txt")), PathBuf::from("a"));
    }
}
