//! Input specification resolution
//!
//! Expands what the caller handed us (explicit paths, directories, glob
//! patterns) into a concrete, deduplicated, ordered list of files. This is
//! the only place a batch can fail before any file is processed, and the
//! orchestrator converts that failure into a fatal batch result instead of
//! propagating it.

use anyhow::{Result, bail};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::shared::glob::{expand_glob_pattern, is_glob_pattern};

/// What to process: an explicit list of paths and/or glob patterns, or a
/// single directory walked recursively.
#[derive(Debug, Clone)]
pub enum InputSpec {
    Paths(Vec<String>),
    Directory(PathBuf),
}

impl From<Vec<String>> for InputSpec {
    fn from(paths: Vec<String>) -> Self {
        InputSpec::Paths(paths)
    }
}

impl From<&[&str]> for InputSpec {
    fn from(paths: &[&str]) -> Self {
        InputSpec::Paths(paths.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&Path> for InputSpec {
    fn from(dir: &Path) -> Self {
        InputSpec::Directory(dir.to_path_buf())
    }
}

impl From<PathBuf> for InputSpec {
    fn from(dir: PathBuf) -> Self {
        InputSpec::Directory(dir)
    }
}

/// Expand an input spec into the ordered list of files to process.
///
/// Literal paths must exist; a glob pattern that matches nothing is fine.
/// Duplicates (same file reached through different spellings or symlinks)
/// are dropped, keeping the first occurrence.
pub fn resolve_inputs(spec: &InputSpec) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    match spec {
        InputSpec::Paths(entries) => {
            for entry in entries {
                if is_glob_pattern(entry) {
                    for path in expand_glob_pattern(entry)? {
                        push_unique(&mut files, &mut seen, path);
                    }
                    continue;
                }
                let path = PathBuf::from(entry);
                if path.is_dir() {
                    walk_directory(&path, &mut files, &mut seen);
                } else if path.is_file() {
                    push_unique(&mut files, &mut seen, path);
                } else {
                    bail!("no such file or directory: {}", path.display());
                }
            }
        }
        InputSpec::Directory(dir) => {
            if !dir.is_dir() {
                bail!("no such file or directory: {}", dir.display());
            }
            walk_directory(dir, &mut files, &mut seen);
        }
    }

    Ok(files)
}

/// Recursively collect regular files, following symlinks. Symlink cycles
/// are reported once and skipped; other walk errors (unreadable entries)
/// are likewise non-fatal.
fn walk_directory(dir: &Path, files: &mut Vec<PathBuf>, seen: &mut HashSet<PathBuf>) {
    for entry in WalkDir::new(dir).follow_links(true) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() {
                    push_unique(files, seen, entry.path().to_path_buf());
                }
            }
            Err(e) => {
                if let Some(ancestor) = e.loop_ancestor() {
                    tracing::warn!(
                        dir = %dir.display(),
                        "symlink cycle detected at {}, skipping", ancestor.display()
                    );
                } else {
                    tracing::warn!(dir = %dir.display(), "walk error: {e}");
                }
            }
        }
    }
}

fn push_unique(files: &mut Vec<PathBuf>, seen: &mut HashSet<PathBuf>, path: PathBuf) {
    // Dedup on the real path so symlinked spellings collapse together.
    let key = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
    if seen.insert(key) {
        files.push(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, name).unwrap();
        path
    }

    #[test]
    fn missing_literal_path_is_an_error() {
        let err = resolve_inputs(&InputSpec::Paths(vec!["definitely/not/here.txt".into()]))
            .unwrap_err();
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn directory_spec_walks_recursively() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.txt");
        fs::create_dir(tmp.path().join("sub")).unwrap();
        touch(&tmp.path().join("sub"), "b.txt");

        let files = resolve_inputs(&InputSpec::from(tmp.path())).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn duplicate_spellings_collapse_to_first_occurrence() {
        let tmp = TempDir::new().unwrap();
        let a = touch(tmp.path(), "a.txt");
        let spelled_twice = format!("{}/./a.txt", tmp.path().display());

        let files = resolve_inputs(&InputSpec::Paths(vec![
            a.display().to_string(),
            spelled_twice,
        ]))
        .unwrap();
        assert_eq!(files, vec![a]);
    }

    #[test]
    fn glob_pattern_with_no_matches_is_empty_not_an_error() {
        let tmp = TempDir::new().unwrap();
        let pattern = format!("{}/*.nope", tmp.path().display());
        let files = resolve_inputs(&InputSpec::Paths(vec![pattern])).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn glob_pattern_expands_to_matching_files_only() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "x.csv");
        touch(tmp.path(), "y.csv");
        touch(tmp.path(), "z.txt");

        let pattern = format!("{}/*.csv", tmp.path().display());
        let files = resolve_inputs(&InputSpec::Paths(vec![pattern])).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "csv"));
    }
}
