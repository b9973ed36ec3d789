//! Build orchestration: the fixed four-stage pipeline.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! One build invocation runs, in order: import resolution, nesting
//! flattening, utility generation, vendor prefixing, then serialization.
//! Stages never overlap and never re-run; every stage consumes the whole
//! output of the previous one. The output file is written only after the
//! final stage succeeds, so an aborted build leaves nothing behind —
//! there is no partial state to roll back.
//!
//! Builds share no mutable state: each constructs its own stylesheet from
//! scratch, so independent invocations (e.g. from a file watcher) can run
//! concurrently as long as they write distinct outputs.

use std::path::{Path, PathBuf};

use tracing::{debug_span, info};
use weft_config::BuildConfig;
use weft_css::{StyleSheet, emit};

use crate::content::gather_content_files;
use crate::error::{BuildError, Result};
use crate::nest::flatten_nesting;
use crate::prefix::apply_vendor_prefixes;
use crate::resolve::resolve_entry;
use crate::utility::generate_utilities;

/// What a completed build produced, for logging and callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    /// Rules in the final sheet, including inside `@media` blocks
    pub rule_count: usize,
    /// Utility rules synthesized from content tokens
    pub utility_count: usize,
    /// Size of the written artifact
    pub bytes_written: usize,
}

/// Run the full pipeline and return the final CSS text without writing it.
pub fn build_stylesheet(entry: &Path, config: &BuildConfig) -> Result<String> {
    let (sheet, _) = build_sheet(entry, config)?;
    Ok(emit(&sheet))
}

/// Run the full pipeline and write the artifact to `output`.
pub fn run_build(entry: &Path, output: &Path, config: &BuildConfig) -> Result<BuildSummary> {
    let (sheet, utility_count) = build_sheet(entry, config)?;
    let css = emit(&sheet);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| BuildError::Write {
            path: output.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(output, &css).map_err(|source| BuildError::Write {
        path: output.to_path_buf(),
        source,
    })?;

    let summary = BuildSummary {
        rule_count: sheet.rules().count(),
        utility_count,
        bytes_written: css.len(),
    };
    info!(
        output = %output.display(),
        rules = summary.rule_count,
        utilities = summary.utility_count,
        bytes = summary.bytes_written,
        "build complete"
    );
    Ok(summary)
}

fn build_sheet(entry: &Path, config: &BuildConfig) -> Result<(StyleSheet, usize)> {
    let matrix = config.browser_matrix()?;
    let search_roots = effective_search_roots(entry, config);

    let resolved = {
        let _span = debug_span!("resolve_imports", entry = %entry.display()).entered();
        resolve_entry(entry, &search_roots)?
    };

    let flattened = {
        let _span = debug_span!("flatten_nesting").entered();
        flatten_nesting(resolved)?
    };

    let (generated, utility_count) = {
        let _span = debug_span!("generate_utilities").entered();
        let base = config
            .base_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let content = gather_content_files(&config.content_globs, &base)?;
        generate_utilities(flattened, &content, &config.design_tokens)
    };

    let prefixed = {
        let _span = debug_span!("apply_prefixes").entered();
        apply_vendor_prefixes(generated, &matrix)
    };

    Ok((prefixed, utility_count))
}

/// The entry file's own directory is always the first search root (the
/// theme root), followed by the configured roots (library roots).
fn effective_search_roots(entry: &Path, config: &BuildConfig) -> Vec<PathBuf> {
    let mut roots = Vec::with_capacity(config.search_roots.len() + 1);
    if let Some(dir) = entry.parent().filter(|p| !p.as_os_str().is_empty()) {
        roots.push(dir.to_path_buf());
    }
    for root in &config.search_roots {
        if !roots.contains(root) {
            roots.push(root.clone());
        }
    }
    roots
}
