//! Import resolution: inline `@import` directives against the search roots.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Resolution is depth-first and pre-order: an imported file's own imports
//! are inlined before anything that follows the import site. Each root in
//! the search-root list is tried in order and the first match wins. The
//! same file imported from two different sites is inlined twice; only a
//! file importing itself (directly or transitively) is an error, detected
//! with a visited set scoped to the current resolution chain.

use std::path::{Path, PathBuf};

use tracing::debug;
use weft_css::{Node, StyleSheet, parse_stylesheet};

use crate::error::{BuildError, Result};

/// Read, parse, and fully resolve the entry stylesheet.
///
/// `search_roots` should already include the entry file's own directory
/// first (the pipeline prepends it).
pub fn resolve_entry(entry: &Path, search_roots: &[PathBuf]) -> Result<StyleSheet> {
    let mut chain = Vec::new();
    let nodes = resolve_file(entry, search_roots, &mut chain)?;
    Ok(StyleSheet::new(nodes))
}

/// Resolve one file into a flat node list with all imports inlined.
fn resolve_file(
    path: &Path,
    search_roots: &[PathBuf],
    chain: &mut Vec<PathBuf>,
) -> Result<Vec<Node>> {
    let canonical = canonical_path(path);
    if chain.contains(&canonical) {
        return Err(BuildError::CircularImport {
            path: canonical,
            chain: chain.clone(),
        });
    }

    let source = std::fs::read_to_string(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let sheet = parse_stylesheet(&source, Some(path))?;

    chain.push(canonical);
    let result = splice_imports(sheet.nodes, path, search_roots, chain);
    chain.pop();
    result
}

fn splice_imports(
    nodes: Vec<Node>,
    from: &Path,
    search_roots: &[PathBuf],
    chain: &mut Vec<PathBuf>,
) -> Result<Vec<Node>> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Import(import) => {
                let resolved = find_import(&import.target, search_roots).ok_or_else(|| {
                    BuildError::ImportNotFound {
                        target: import.target.clone(),
                        from: from.to_path_buf(),
                        line: import.line,
                    }
                })?;
                debug!(target = %import.target, file = %resolved.display(), "inlining import");
                out.extend(resolve_file(&resolved, search_roots, chain)?);
            }
            Node::AtRule(mut at) => {
                at.body = splice_imports(at.body, from, search_roots, chain)?;
                out.push(Node::AtRule(at));
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Try each search root in order; first existing file wins.
///
/// Per root, the target is tried verbatim and then with a `.css` extension
/// appended (so `@import "base"` finds `base.css`).
fn find_import(target: &str, search_roots: &[PathBuf]) -> Option<PathBuf> {
    for root in search_roots {
        let verbatim = root.join(target);
        if verbatim.is_file() {
            return Some(verbatim);
        }
        if Path::new(target).extension().is_none() {
            let with_ext = root.join(format!("{target}.css"));
            if with_ext.is_file() {
                return Some(with_ext);
            }
        }
    }
    None
}

/// Canonicalize for cycle detection; falls back to the path as given when
/// canonicalization fails (the subsequent read will report the real error).
fn canonical_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
