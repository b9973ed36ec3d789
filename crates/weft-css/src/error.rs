//! Parse error type for CSS sources.
//!
//! Copyright (c) 2025 Posit, PBC

use std::path::PathBuf;

use thiserror::Error;

/// A fatal syntax error in a CSS source, with the position it occurred at.
///
/// The `file` is filled in by callers that know which file the text came
/// from (the parser itself only sees a string plus an optional file label).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}:{line}:{column}: {message}", .file.as_ref().map(|f| f.display().to_string()).unwrap_or_else(|| "<input>".to_string()))]
pub struct ParseError {
    /// Source file the error was found in, when known
    pub file: Option<PathBuf>,
    /// 1-based line number
    pub line: usize,
    /// 1-based column number
    pub column: usize,
    /// Human-readable description of what went wrong
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            file: None,
            line,
            column,
            message: message.into(),
        }
    }

    /// Attach a file path to an error produced from an anonymous string.
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_file() {
        let err = ParseError::new(3, 7, "expected ':' in declaration");
        assert_eq!(err.to_string(), "<input>:3:7: expected ':' in declaration");
    }

    #[test]
    fn test_display_with_file() {
        let err = ParseError::new(1, 1, "unexpected '}'").with_file("theme/main.css");
        assert_eq!(err.to_string(), "theme/main.css:1:1: unexpected '}'");
    }
}
