//! Build configuration for the Weft asset pipeline.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Configuration is loaded once per build from a YAML file (`weft.yml` by
//! convention) and passed by reference into every pipeline stage. There is
//! no ambient global state: two builds with different configs can run in
//! the same process without interfering.

mod error;
mod types;

pub use error::ConfigError;
pub use types::{Breakpoint, Browser, BrowserTargets, BuildConfig, DesignTokens};
