//! Pipeline stages for the Weft asset build.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! A build is a fixed linear sequence over one stylesheet:
//!
//! ```text
//! entry file → resolve imports → flatten nesting → generate utilities → prefix → emit
//! ```
//!
//! Each stage consumes the previous stage's full output; there is no
//! streaming, branching, or stage re-entry. A build either completes and
//! writes one artifact, or fails and writes nothing.
//!
//! # Example
//!
//! ```rust,ignore
//! use weft_build::run_build;
//! use weft_config::BuildConfig;
//! use std::path::Path;
//!
//! let config = BuildConfig::load(Path::new("weft.yml"))?;
//! let summary = run_build(
//!     Path::new("theme/main.css"),
//!     Path::new("public/css/site.css"),
//!     &config,
//! )?;
//! println!("{} rules written", summary.rule_count);
//! ```

mod content;
mod error;
mod nest;
mod pipeline;
mod prefix;
mod resolve;
mod utility;

pub use content::gather_content_files;
pub use error::{BuildError, Result};
pub use nest::flatten_nesting;
pub use pipeline::{BuildSummary, build_stylesheet, run_build};
pub use prefix::apply_vendor_prefixes;
pub use resolve::resolve_entry;
pub use utility::{generate_utilities, scan_utility_tokens};
