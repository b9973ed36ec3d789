//! Error type for configuration loading.
//!
//! Copyright (c) 2025 Posit, PBC

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a build configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown browser in target '{target}' (expected chrome, firefox, safari, edge, ie, or opera)")]
    UnknownBrowser { target: String },

    #[error("missing or invalid version in browser target '{target}'")]
    InvalidBrowserVersion { target: String },
}
