//! Build command implementation.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Loads the build config (if present), resolves the entry and output
//! paths from CLI arguments with config fallbacks, and runs the pipeline.
//! Exit code is 0 only when the artifact was fully written; any pipeline
//! failure surfaces as a non-zero exit with a message naming the offending
//! file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

use weft_build::run_build;
use weft_config::BuildConfig;

/// Arguments for the build command
#[derive(Debug)]
pub struct BuildArgs {
    /// Entry CSS file
    pub entry: Option<String>,
    /// Output file path
    pub output: Option<String>,
    /// Config file path
    pub config: String,
    /// Suppress console output
    pub quiet: bool,
}

/// Execute the build command
pub fn execute(args: BuildArgs) -> Result<()> {
    let config = load_config(&args.config)?;

    let entry = args
        .entry
        .map(PathBuf::from)
        .or_else(|| config.entry.clone());
    let Some(entry) = entry else {
        bail!(
            "no entry file given (pass one on the command line or set `entry` in {})",
            args.config
        );
    };
    if !entry.is_file() {
        bail!("entry file does not exist: {}", entry.display());
    }

    let output = args
        .output
        .map(PathBuf::from)
        .or_else(|| config.output.clone());
    let Some(output) = output else {
        bail!("no output path given (pass --output or set `output` in {})", args.config);
    };

    let summary = run_build(&entry, &output, &config)
        .with_context(|| format!("building {}", entry.display()))?;

    if !args.quiet {
        println!(
            "wrote {} ({} rules, {} generated utilities, {} bytes)",
            output.display(),
            summary.rule_count,
            summary.utility_count,
            summary.bytes_written
        );
    }
    Ok(())
}

/// Load the config file when it exists; a missing file at the default
/// location just means defaults, but an explicitly named missing file is
/// an error the user should hear about.
fn load_config(path: &str) -> Result<BuildConfig> {
    if Path::new(path).is_file() {
        let config = BuildConfig::load(Path::new(path))
            .with_context(|| format!("loading config {path}"))?;
        debug!(config = path, "loaded build config");
        Ok(config)
    } else if path == "weft.yml" {
        debug!("no config file, using defaults");
        Ok(BuildConfig::default())
    } else {
        bail!("config file does not exist: {path}");
    }
}
