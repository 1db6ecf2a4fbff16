//! Filesystem discovery of subject directories and image files
//!
//! Patterns are relative paths whose segments may use shell wildcards:
//! `*`, `?` and bracket classes such as `[0-9]` or `[IJ]`. Names starting
//! with a dot only match segments that start with a dot.

use std::path::{Path, PathBuf};

use anyhow::Context;
use itertools::Itertools;

use crate::common::traits::FileDiscovery;
use crate::error::Result;
use crate::utils::logging::log_warning;

/// Whether `name` matches the wildcard `pattern`
#[must_use]
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    if name.starts_with('.') && !pattern.starts_with('.') {
        return false;
    }
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    match_from(&pattern, &name)
}

fn match_from(pattern: &[char], name: &[char]) -> bool {
    let (mut p, mut n) = (0, 0);
    // Position after the last `*` and the name position it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        if p < pattern.len() {
            match pattern[p] {
                '*' => {
                    backtrack = Some((p + 1, n));
                    p += 1;
                    continue;
                }
                '?' => {
                    p += 1;
                    n += 1;
                    continue;
                }
                '[' => {
                    if let Some((matched, next)) = match_class(&pattern[p..], name[n]) {
                        if matched {
                            p += next;
                            n += 1;
                            continue;
                        }
                    } else if name[n] == '[' {
                        p += 1;
                        n += 1;
                        continue;
                    }
                }
                c if c == name[n] => {
                    p += 1;
                    n += 1;
                    continue;
                }
                _ => {}
            }
        }
        match backtrack {
            Some((star_p, star_n)) => {
                backtrack = Some((star_p, star_n + 1));
                p = star_p;
                n = star_n + 1;
            }
            None => return false,
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

/// Match one character against a bracket class such as `[0-9]` at the
/// start of `pattern`
///
/// Returns whether it matched and the length of the class, or `None` when
/// the bracket is not closed.
fn match_class(pattern: &[char], c: char) -> Option<(bool, usize)> {
    let close = pattern.iter().position(|&p| p == ']')?;
    let class = &pattern[1..close];

    let mut matched = false;
    let mut i = 0;
    while i < class.len() {
        if i + 2 < class.len() && class[i + 1] == '-' {
            matched |= class[i] <= c && c <= class[i + 2];
            i += 3;
        } else {
            matched |= class[i] == c;
            i += 1;
        }
    }
    Some((matched, close + 1))
}

fn has_wildcard(segment: &str) -> bool {
    segment.contains(['*', '?', '['])
}

/// Entries of `dir` whose names match `segment`, sorted
fn matching_entries(dir: &Path, segment: &str) -> Result<Vec<PathBuf>> {
    if !has_wildcard(segment) {
        let path = dir.join(segment);
        return Ok(if path.exists() { vec![path] } else { Vec::new() });
    }

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;
    let mut matches = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("Failed to read entry of {}", dir.display()))?;
        let name = entry.file_name();
        if name.to_str().is_some_and(|name| wildcard_match(segment, name)) {
            matches.push(entry.path());
        }
    }
    Ok(matches.into_iter().sorted().collect())
}

/// Paths under `root` matching a `/`-separated wildcard pattern, sorted
///
/// Intermediate directories that do not exist produce no matches.
pub fn glob_relative(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let mut current = vec![root.to_path_buf()];
    for segment in pattern.split('/').filter(|s| !s.is_empty()) {
        let mut next = Vec::new();
        for dir in current.iter().filter(|d| d.is_dir()) {
            next.extend(matching_entries(dir, segment)?);
        }
        current = next;
    }
    Ok(current.into_iter().sorted().collect())
}

/// File discovery over the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDiscovery;

impl FsDiscovery {
    /// Create a filesystem discovery
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FileDiscovery for FsDiscovery {
    fn subject_dirs(&self, root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(anyhow::anyhow!("Directory does not exist: {}", root.display()).into());
        }
        let dirs: Vec<PathBuf> = glob_relative(root, pattern)?
            .into_iter()
            .filter(|p| p.is_dir())
            .collect();
        if dirs.is_empty() {
            log_warning(&format!("No directory matching {pattern}"), Some(root));
        }
        Ok(dirs)
    }

    fn find_files(&self, subject_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        Ok(glob_relative(subject_dir, pattern)?
            .into_iter()
            .filter(|p| p.is_file())
            .collect())
    }
}
