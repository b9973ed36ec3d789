//! Nesting flattening: unwrap nested selector blocks into flat rules.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! A nested selector containing `&` has every `&` replaced by the ancestor
//! selector; a nested selector without `&` is prefixed with the ancestor
//! selector and a descendant combinator. Comma-separated selector lists on
//! either side combine pairwise. Output order is a strict top-down
//! depth-first traversal of the input tree, so flattening already-flat
//! input is the identity.
//!
//! A block at-rule nested inside a rule (e.g. `@media` inside `.a`) is
//! bubbled to the rule's position with its inner declarations re-wrapped
//! under the combined selector.

use weft_css::{AtRule, Declaration, Node, Rule, StyleSheet};

use crate::error::{BuildError, Result};

/// Maximum selector nesting depth before the flattener refuses the input.
/// Realistic hand-written CSS stays in single digits; the cap only exists
/// to bound recursion on hostile input.
const MAX_NESTING_DEPTH: usize = 64;

/// Flatten all nested rules in the sheet.
///
/// Invariant on success: no rule's body contains another rule.
pub fn flatten_nesting(sheet: StyleSheet) -> Result<StyleSheet> {
    let mut out = Vec::with_capacity(sheet.nodes.len());
    for node in sheet.nodes {
        flatten_node(node, None, 0, &mut out)?;
    }
    Ok(StyleSheet::new(out))
}

fn flatten_node(
    node: Node,
    ancestor: Option<&str>,
    depth: usize,
    out: &mut Vec<Node>,
) -> Result<()> {
    match node {
        Node::Rule(rule) => flatten_rule(rule, ancestor, depth, out),
        Node::AtRule(at) => {
            let mut body = Vec::with_capacity(at.body.len());
            let mut pending_declarations: Vec<Declaration> = Vec::new();
            for child in at.body {
                match child {
                    // Declarations directly inside an at-rule body belong to
                    // the enclosing rule's selector (bubbled @media case)
                    Node::Declaration(decl) if ancestor.is_some() => {
                        pending_declarations.push(decl);
                    }
                    other => flatten_node(other, ancestor, depth, &mut body)?,
                }
            }
            if !pending_declarations.is_empty() {
                let selector = ancestor.unwrap_or_default().to_string();
                let wrapped = Rule {
                    selector,
                    body: pending_declarations
                        .into_iter()
                        .map(Node::Declaration)
                        .collect(),
                };
                body.insert(0, Node::Rule(wrapped));
            }
            out.push(Node::AtRule(AtRule {
                name: at.name,
                prelude: at.prelude,
                body,
            }));
            Ok(())
        }
        other => {
            out.push(other);
            Ok(())
        }
    }
}

fn flatten_rule(
    rule: Rule,
    ancestor: Option<&str>,
    depth: usize,
    out: &mut Vec<Node>,
) -> Result<()> {
    if depth >= MAX_NESTING_DEPTH {
        return Err(BuildError::NestingTooDeep {
            selector: rule.selector,
            limit: MAX_NESTING_DEPTH,
        });
    }

    let combined = match ancestor {
        Some(parent) => combine_selectors(parent, &rule.selector),
        None => rule.selector,
    };

    let mut declarations = Vec::new();
    let mut nested = Vec::new();
    for node in rule.body {
        match node {
            Node::Declaration(_) => declarations.push(node),
            other => nested.push(other),
        }
    }

    // Emit the rule itself when it has declarations; keep authored empty
    // leaf rules so flat input passes through unchanged.
    if !declarations.is_empty() || nested.is_empty() {
        out.push(Node::Rule(Rule {
            selector: combined.clone(),
            body: declarations,
        }));
    }

    for node in nested {
        flatten_node(node, Some(&combined), depth + 1, out)?;
    }
    Ok(())
}

/// Combine an ancestor selector list with a nested selector list, pairwise.
fn combine_selectors(ancestor: &str, child: &str) -> String {
    let mut combined = Vec::new();
    for a in split_selector_list(ancestor) {
        for c in split_selector_list(child) {
            if c.contains('&') {
                combined.push(c.replace('&', a));
            } else {
                combined.push(format!("{a} {c}"));
            }
        }
    }
    combined.join(", ")
}

/// Split a selector list on top-level commas (commas inside parentheses,
/// brackets, or strings don't count).
fn split_selector_list(selector: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in selector.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    parts.push(selector[start..i].trim());
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    parts.push(selector[start..].trim());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_css::{emit, parse_stylesheet};

    fn flatten_str(src: &str) -> String {
        let sheet = parse_stylesheet(src, None).unwrap();
        emit(&flatten_nesting(sheet).unwrap())
    }

    #[test]
    fn test_flat_input_is_identity() {
        let src = ".a {\n  color: red;\n}\n\n.b {\n  margin: 0;\n}\n";
        assert_eq!(flatten_str(src), src);
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let src = ".b { color: blue; &:hover { color: red; } .c { margin: 0; } }";
        let once = flatten_str(src);
        let twice = flatten_str(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_ampersand_composes_with_ancestor() {
        insta::assert_snapshot!(flatten_str(".b { &:hover { color: blue; } }"), @r"
        .b:hover {
          color: blue;
        }
        ");
    }

    #[test]
    fn test_no_ampersand_gets_descendant_combinator() {
        insta::assert_snapshot!(flatten_str(".nav { a { color: blue; } }"), @r"
        .nav a {
          color: blue;
        }
        ");
    }

    #[test]
    fn test_parent_declarations_precede_children() {
        let out = flatten_str(".b { color: blue; &:hover { color: red; } }");
        let b = out.find(".b {").unwrap();
        let hover = out.find(".b:hover {").unwrap();
        assert!(b < hover);
    }

    #[test]
    fn test_declaration_free_wrapper_is_dropped() {
        let out = flatten_str(".b { &:hover { color: blue; } }");
        assert!(!out.contains(".b {\n}"));
        assert!(out.contains(".b:hover"));
    }

    #[test]
    fn test_selector_lists_combine_pairwise() {
        let out = flatten_str(".a, .b { .c, .d { margin: 0; } }");
        assert!(out.contains(".a .c, .a .d, .b .c, .b .d {"));
    }

    #[test]
    fn test_deep_nesting_order_is_depth_first() {
        let out = flatten_str(".a { color: red; .b { color: green; .c { color: blue; } } }");
        let a = out.find(".a {").unwrap();
        let b = out.find(".a .b {").unwrap();
        let c = out.find(".a .b .c {").unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_rules_inside_media_flatten_in_place() {
        insta::assert_snapshot!(
            flatten_str("@media (min-width: 640px) { .a { &:hover { color: red; } } }"),
            @r"
        @media (min-width: 640px) {
          .a:hover {
            color: red;
          }
        }
        "
        );
    }

    #[test]
    fn test_media_nested_in_rule_bubbles() {
        insta::assert_snapshot!(
            flatten_str(".a { color: red; @media (min-width: 640px) { color: blue; } }"),
            @r"
        .a {
          color: red;
        }

        @media (min-width: 640px) {
          .a {
            color: blue;
          }
        }
        "
        );
    }

    #[test]
    fn test_nesting_depth_cap() {
        let mut src = String::new();
        for _ in 0..70 {
            src.push_str(".x { ");
        }
        src.push_str("color: red;");
        for _ in 0..70 {
            src.push_str(" }");
        }
        let sheet = parse_stylesheet(&src, None).unwrap();
        let err = flatten_nesting(sheet).unwrap_err();
        assert!(matches!(err, BuildError::NestingTooDeep { .. }));
    }

    #[test]
    fn test_split_selector_list_respects_parens() {
        assert_eq!(
            split_selector_list(".a:is(.b, .c), .d"),
            [".a:is(.b, .c)", ".d"]
        );
    }

    #[test]
    fn test_mixed_flat_and_nested_rules() {
        let out = flatten_str(".a { color: red; }\n.b { &:hover { color: blue; } }");
        assert!(out.contains(".a {\n  color: red;\n}"));
        assert!(out.contains(".b:hover {\n  color: blue;\n}"));
        assert!(!out.contains(".b {\n}"));
    }
}
