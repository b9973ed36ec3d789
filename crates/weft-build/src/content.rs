//! Content-file gathering for the utility scan.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Glob patterns are compiled to anchored regexes and matched against
//! paths relative to the base directory. Matched files are returned in
//! lexicographic path order so the utility scan is deterministic, and read
//! eagerly (the pipeline never streams). Unreadable files are skipped with
//! a warning; the scan is best-effort by contract.

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::Result;

/// Find and read every file under `base` matching any of the glob patterns.
///
/// Returns `(path, text)` pairs sorted by path. Files are read lossily:
/// stray non-UTF-8 bytes can't invalidate a best-effort token scan.
pub fn gather_content_files(globs: &[String], base: &Path) -> Result<Vec<(PathBuf, String)>> {
    let patterns: Vec<Regex> = globs
        .iter()
        .filter_map(|glob| match Regex::new(&glob_to_regex(glob)) {
            Ok(re) => Some(re),
            Err(err) => {
                warn!(glob, %err, "skipping unusable content glob");
                None
            }
        })
        .collect();
    if patterns.is_empty() {
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(base).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!(%err, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(base).unwrap_or(entry.path());
        let candidate = unix_path(relative);
        if patterns.iter().any(|p| p.is_match(&candidate)) {
            paths.push(entry.path().to_path_buf());
        }
    }
    paths.sort();
    paths.dedup();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match std::fs::read(&path) {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                files.push((path, text));
            }
            Err(err) => warn!(path = %path.display(), %err, "skipping unreadable content file"),
        }
    }
    debug!(count = files.len(), "gathered content files");
    Ok(files)
}

/// Translate a glob pattern into an anchored regex over `/`-separated paths.
///
/// `**/` matches zero or more directories, `*` matches within one path
/// segment, `?` matches one character within a segment.
fn glob_to_regex(glob: &str) -> String {
    let mut regex = String::from("^");
    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        regex.push_str("(?:.*/)?");
                    } else {
                        regex.push_str(".*");
                    }
                } else {
                    regex.push_str("[^/]*");
                }
            }
            '?' => regex.push_str("[^/]"),
            c if "\\.+()|[]{}^$".contains(c) => {
                regex.push('\\');
                regex.push(c);
            }
            c => regex.push(c),
        }
    }
    regex.push('$');
    regex
}

fn unix_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
