//! Stylesheet serialization.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Emits expanded CSS with two-space indentation and one blank line between
//! top-level constructs. Output is fully determined by the tree, so repeated
//! builds over identical inputs are byte-identical.

use crate::ast::{Node, Rule, StyleSheet};

/// Serialize a stylesheet to CSS text.
pub fn emit(sheet: &StyleSheet) -> String {
    let mut out = String::new();
    for (i, node) in sheet.nodes.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        emit_node(node, 0, &mut out);
    }
    out
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

fn emit_node(node: &Node, level: usize, out: &mut String) {
    match node {
        Node::Rule(rule) => emit_rule(rule, level, out),
        Node::Import(import) => {
            indent(out, level);
            out.push_str("@import \"");
            out.push_str(&import.target);
            out.push_str("\";\n");
        }
        Node::AtRule(at) => {
            indent(out, level);
            out.push('@');
            out.push_str(&at.name);
            if !at.prelude.is_empty() {
                out.push(' ');
                out.push_str(&at.prelude);
            }
            out.push_str(" {\n");
            for (i, child) in at.body.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                emit_node(child, level + 1, out);
            }
            indent(out, level);
            out.push_str("}\n");
        }
        Node::AtStatement { name, prelude } => {
            indent(out, level);
            out.push('@');
            out.push_str(name);
            if !prelude.is_empty() {
                out.push(' ');
                out.push_str(prelude);
            }
            out.push_str(";\n");
        }
        Node::Declaration(decl) => {
            indent(out, level);
            out.push_str(&decl.property);
            out.push_str(": ");
            out.push_str(&decl.value);
            out.push_str(";\n");
        }
    }
}

fn emit_rule(rule: &Rule, level: usize, out: &mut String) {
    indent(out, level);
    out.push_str(&rule.selector);
    out.push_str(" {\n");
    for node in &rule.body {
        emit_node(node, level + 1, out);
    }
    indent(out, level);
    out.push_str("}\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_stylesheet;

    fn roundtrip(src: &str) -> String {
        emit(&parse_stylesheet(src, None).expect("should parse"))
    }

    #[test]
    fn test_emit_simple_rule() {
        insta::assert_snapshot!(roundtrip(".a{color:red}"), @r"
        .a {
          color: red;
        }
        ");
    }

    #[test]
    fn test_emit_media_block() {
        insta::assert_snapshot!(roundtrip("@media (min-width: 640px){.a{margin:0}}"), @r"
        @media (min-width: 640px) {
          .a {
            margin: 0;
          }
        }
        ");
    }

    #[test]
    fn test_emit_is_stable_on_its_own_output() {
        let once = roundtrip(".a { color: red; }\n.b { margin: 0; }");
        let twice = roundtrip(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_emit_import_directive() {
        assert_eq!(roundtrip("@import \"base\";"), "@import \"base\";\n");
    }
}
