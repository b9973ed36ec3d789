//! CSS AST types.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! The tree is deliberately string-based: selectors, properties, and values
//! are kept as trimmed text rather than structured sub-ASTs. The pipeline
//! stages (import resolution, nesting flattening, utility generation,
//! prefixing) only need block structure, not value-level grammar.
//!
//! Lifecycle invariants maintained by the pipeline, in stage order:
//! - after import resolution no `Node::Import` remains anywhere in the tree
//! - after nesting flattening no `Rule` body contains another `Rule`

use std::fmt;

/// An entire parsed stylesheet: the root artifact of a build.
///
/// Created fresh per build invocation and never shared across builds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    pub nodes: Vec<Node>,
}

impl StyleSheet {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Iterate over every rule in the sheet, including rules nested inside
    /// block at-rules (but not rules nested inside other rules).
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.nodes.iter().flat_map(Node::top_level_rules)
    }
}

/// A single top-level or nested construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A selector block, possibly containing nested rules before flattening
    Rule(Rule),
    /// An `@import "target";` directive, present only before resolution
    Import(ImportDirective),
    /// A block at-rule such as `@media` or `@supports`
    AtRule(AtRule),
    /// A statement at-rule such as `@charset "utf-8";`, passed through verbatim
    AtStatement { name: String, prelude: String },
    /// A property declaration; only valid inside a rule or at-rule body
    Declaration(Declaration),
}

impl Node {
    fn top_level_rules(&self) -> Vec<&Rule> {
        match self {
            Node::Rule(rule) => vec![rule],
            Node::AtRule(at) => at.body.iter().flat_map(Node::top_level_rules).collect(),
            _ => vec![],
        }
    }
}

/// A selector plus its body.
///
/// Before flattening the body may interleave declarations and nested child
/// rules; afterwards it holds declarations only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub selector: String,
    pub body: Vec<Node>,
}

impl Rule {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            body: Vec::new(),
        }
    }

    /// The rule's declarations, in source order.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.body.iter().filter_map(|n| match n {
            Node::Declaration(d) => Some(d),
            _ => None,
        })
    }

    /// Child rules nested directly inside this rule's body.
    pub fn child_rules(&self) -> impl Iterator<Item = &Rule> {
        self.body.iter().filter_map(|n| match n {
            Node::Rule(r) => Some(r),
            _ => None,
        })
    }

    pub fn has_declarations(&self) -> bool {
        self.declarations().next().is_some()
    }

    pub fn has_child_rules(&self) -> bool {
        self.child_rules().next().is_some()
    }
}

/// A single `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.value)
    }
}

/// An unresolved `@import "target";` reference.
///
/// The target is the quoted string (or bare token) as written; resolution
/// against the search roots happens in `weft-build`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDirective {
    pub target: String,
    /// 1-based line the directive appeared on, for error reporting
    pub line: usize,
}

/// A block at-rule (`@media`, `@supports`, ...) with a nested body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    /// Name without the leading `@`, e.g. `media`
    pub name: String,
    /// Everything between the name and the opening brace, trimmed
    pub prelude: String,
    pub body: Vec<Node>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_declaration_iteration() {
        let rule = Rule {
            selector: ".a".to_string(),
            body: vec![
                Node::Declaration(Declaration::new("color", "red")),
                Node::Rule(Rule::new("&:hover")),
                Node::Declaration(Declaration::new("margin", "0")),
            ],
        };
        let props: Vec<_> = rule.declarations().map(|d| d.property.as_str()).collect();
        assert_eq!(props, ["color", "margin"]);
        assert!(rule.has_child_rules());
    }

    #[test]
    fn test_sheet_rules_descends_into_at_rules() {
        let sheet = StyleSheet::new(vec![
            Node::Rule(Rule::new(".a")),
            Node::AtRule(AtRule {
                name: "media".to_string(),
                prelude: "(min-width: 640px)".to_string(),
                body: vec![Node::Rule(Rule::new(".b"))],
            }),
        ]);
        let selectors: Vec<_> = sheet.rules().map(|r| r.selector.as_str()).collect();
        assert_eq!(selectors, [".a", ".b"]);
    }
}
