//! Utility-class generation from scanned content tokens.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Content files are scanned for class-name tokens of the form
//! `<prefix>-<value>` with an optional trailing `-<breakpoint>` segment
//! (breakpoint names come from the design-token config, so `mt-4-sm` is a
//! responsive variant of `mt-4` when `sm` is configured). Each distinct
//! recognized token produces exactly one rule; duplicates across files
//! collapse to the first sighting. Tokens that match the grammar shape but
//! name no configured scale step (`mt-999`) are dropped silently: the scan
//! is best-effort, not a validator.
//!
//! Determinism: files are scanned in the (sorted) order the caller
//! provides, tokens keep first-seen order, and generated `@media` blocks
//! follow the configured breakpoint order. Two runs over the same inputs
//! produce byte-identical output.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use weft_config::DesignTokens;
use weft_css::{AtRule, Declaration, Node, Rule, StyleSheet};

/// Grammar shape for a candidate utility token. Validation against the
/// configured scales happens separately in [`utility_for_token`].
static TOKEN_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(m|mt|mr|mb|ml|mx|my|p|pt|pr|pb|pl|px|py|gap|w|h|text|bg)-([0-9a-z][0-9a-z-]*)$",
    )
    .unwrap()
});

/// Scan text for candidate utility tokens, in order of appearance.
///
/// Pure function over the text; no deduplication and no scale validation.
/// Words are runs of `[A-Za-z0-9_-]`, so class attributes, Markdown, and
/// template source all scan the same way.
pub fn scan_utility_tokens(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .filter(|word| TOKEN_SHAPE.is_match(word))
        .collect()
}

/// A recognized token mapped to its generated rule parts.
struct Utility {
    selector: String,
    declarations: Vec<Declaration>,
    /// Index into the configured breakpoint list, for responsive variants
    breakpoint: Option<usize>,
}

/// Map one candidate token to a utility rule, or `None` when the token
/// names no configured scale entry.
fn utility_for_token(token: &str, tokens: &DesignTokens) -> Option<Utility> {
    let captures = TOKEN_SHAPE.captures(token)?;
    let prefix = captures.get(1)?.as_str();
    let rest = captures.get(2)?.as_str();

    // A trailing segment naming a configured breakpoint selects the
    // responsive variant; otherwise the whole rest is the value key.
    let (key, breakpoint) = match rest.rsplit_once('-') {
        Some((head, tail)) => match tokens.breakpoints.iter().position(|b| b.name == tail) {
            Some(index) => (head, Some(index)),
            None => (rest, None),
        },
        None => (rest, None),
    };

    let (properties, value): (&[&str], &String) = match prefix {
        "m" => (&["margin"], tokens.spacing.get(key)?),
        "mt" => (&["margin-top"], tokens.spacing.get(key)?),
        "mr" => (&["margin-right"], tokens.spacing.get(key)?),
        "mb" => (&["margin-bottom"], tokens.spacing.get(key)?),
        "ml" => (&["margin-left"], tokens.spacing.get(key)?),
        "mx" => (&["margin-left", "margin-right"], tokens.spacing.get(key)?),
        "my" => (&["margin-top", "margin-bottom"], tokens.spacing.get(key)?),
        "p" => (&["padding"], tokens.spacing.get(key)?),
        "pt" => (&["padding-top"], tokens.spacing.get(key)?),
        "pr" => (&["padding-right"], tokens.spacing.get(key)?),
        "pb" => (&["padding-bottom"], tokens.spacing.get(key)?),
        "pl" => (&["padding-left"], tokens.spacing.get(key)?),
        "px" => (&["padding-left", "padding-right"], tokens.spacing.get(key)?),
        "py" => (&["padding-top", "padding-bottom"], tokens.spacing.get(key)?),
        "gap" => (&["gap"], tokens.spacing.get(key)?),
        "w" => (&["width"], tokens.spacing.get(key)?),
        "h" => (&["height"], tokens.spacing.get(key)?),
        "text" => (&["color"], tokens.colors.get(key)?),
        "bg" => (&["background-color"], tokens.colors.get(key)?),
        _ => return None,
    };

    Some(Utility {
        selector: format!(".{token}"),
        declarations: properties
            .iter()
            .map(|p| Declaration::new(*p, value.clone()))
            .collect(),
        breakpoint,
    })
}

/// Append generated utility rules to the (already flattened) sheet.
///
/// `content` must be sorted by path (see `gather_content_files`). Returns
/// the extended sheet and the number of rules generated. A token whose
/// selector exactly matches an authored rule's selector is suppressed:
/// author-written rules take precedence.
pub fn generate_utilities(
    sheet: StyleSheet,
    content: &[(std::path::PathBuf, String)],
    tokens: &DesignTokens,
) -> (StyleSheet, usize) {
    let authored: HashSet<String> = sheet.rules().map(|r| r.selector.clone()).collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut base_rules: Vec<Node> = Vec::new();
    let mut by_breakpoint: Vec<Vec<Node>> = vec![Vec::new(); tokens.breakpoints.len()];
    let mut generated = 0usize;

    for (_path, text) in content {
        for token in scan_utility_tokens(text) {
            if !seen.insert(token.to_string()) {
                continue;
            }
            let Some(utility) = utility_for_token(token, tokens) else {
                continue;
            };
            if authored.contains(&utility.selector) {
                debug!(selector = %utility.selector, "authored rule suppresses generated utility");
                continue;
            }
            let rule = Node::Rule(Rule {
                selector: utility.selector,
                body: utility
                    .declarations
                    .into_iter()
                    .map(Node::Declaration)
                    .collect(),
            });
            generated += 1;
            match utility.breakpoint {
                None => base_rules.push(rule),
                Some(index) => by_breakpoint[index].push(rule),
            }
        }
    }

    let mut nodes = sheet.nodes;
    nodes.extend(base_rules);
    for (breakpoint, rules) in tokens.breakpoints.iter().zip(by_breakpoint) {
        if rules.is_empty() {
            continue;
        }
        nodes.push(Node::AtRule(AtRule {
            name: "media".to_string(),
            prelude: format!("(min-width: {})", breakpoint.min_width),
            body: rules,
        }));
    }

    debug!(generated, "utility generation complete");
    (StyleSheet::new(nodes), generated)
}
