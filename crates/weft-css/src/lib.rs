//! CSS parsing, AST, and serialization for the Weft asset pipeline.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! This crate provides:
//! - Core AST types (StyleSheet, Node, Rule, Declaration, at-rules)
//! - A tokenizing recursive-descent parser with line/column tracking
//! - A serializer producing expanded, deterministic CSS text
//!
//! The crate never touches the filesystem; import resolution and all other
//! pipeline stages live in `weft-build`.

mod ast;
mod emit;
mod error;
mod parser;

pub use ast::{AtRule, Declaration, ImportDirective, Node, Rule, StyleSheet};
pub use emit::emit;
pub use error::ParseError;
pub use parser::parse_stylesheet;
