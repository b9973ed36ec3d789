//! Command implementations for the Weft CLI
//!
//! Each command module handles the CLI interface and delegates to
//! weft-build for actual implementation.

pub mod build;
