//! Error types for the build pipeline.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Every variant is fatal: the build aborts and nothing is written. There
//! is no retry and no partial-output mode. Unmatched utility tokens are
//! not errors (the scan is best-effort by contract) and so have no variant
//! here.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors that abort a build invocation.
#[derive(Debug, Error)]
pub enum BuildError {
    /// An `@import` target matched no file in any search root
    #[error("cannot resolve @import \"{target}\" (line {line} of {})", .from.display())]
    ImportNotFound {
        target: String,
        from: PathBuf,
        line: usize,
    },

    /// A file transitively imports itself
    #[error("circular @import of {} (import chain: {})", .path.display(), format_chain(.chain))]
    CircularImport {
        path: PathBuf,
        chain: Vec<PathBuf>,
    },

    /// Malformed CSS in the entry file or an imported file
    #[error(transparent)]
    Parse(#[from] weft_css::ParseError),

    /// Invalid configuration (e.g. an unparseable browser target)
    #[error(transparent)]
    Config(#[from] weft_config::ConfigError),

    /// Nested rules exceeded the flattener's depth cap
    #[error("selector nesting deeper than {limit} levels at '{selector}'")]
    NestingTooDeep { selector: String, limit: usize },

    /// The final artifact could not be written
    #[error("failed to write output {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
