//! Vendor prefixing against a browser-support matrix.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! A small built-in support table records, per property (or per
//! property/value pair, for cases like `display: flex`), which vendor
//! prefix is required up to which browser version. For every declaration
//! needing variants under the configured matrix, the prefixed declarations
//! are inserted immediately before the standard one, in canonical vendor
//! order (`-webkit-`, `-moz-`, `-ms-`, `-o-`).
//!
//! The pass is idempotent: declarations whose property already carries a
//! vendor prefix are passed through untouched, and a variant is never
//! inserted when an identical declaration (author-written or previously
//! inserted) already exists in the same rule.

use std::collections::HashSet;

use tracing::debug;
use weft_config::{Browser, BrowserTargets};
use weft_css::{Declaration, Node, Rule, StyleSheet};

/// Canonical vendor order for inserted variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Vendor {
    Webkit,
    Moz,
    Ms,
    O,
}

impl Vendor {
    const ALL: [Vendor; 4] = [Vendor::Webkit, Vendor::Moz, Vendor::Ms, Vendor::O];

    fn prefix(self) -> &'static str {
        match self {
            Vendor::Webkit => "-webkit-",
            Vendor::Moz => "-moz-",
            Vendor::Ms => "-ms-",
            Vendor::O => "-o-",
        }
    }
}

/// A property needs `vendor`'s prefix for `browser` versions `..= until`.
struct PropertyPrefix {
    property: &'static str,
    vendor: Vendor,
    browser: Browser,
    until: u32,
}

const EVERGREEN: u32 = 999; // still required in current releases

static PROPERTY_PREFIXES: &[PropertyPrefix] = &[
    p("user-select", Vendor::Webkit, Browser::Safari, EVERGREEN),
    p("user-select", Vendor::Moz, Browser::Firefox, 68),
    p("user-select", Vendor::Ms, Browser::Ie, 11),
    p("appearance", Vendor::Webkit, Browser::Safari, 15),
    p("appearance", Vendor::Webkit, Browser::Chrome, 83),
    p("appearance", Vendor::Moz, Browser::Firefox, 79),
    p("backdrop-filter", Vendor::Webkit, Browser::Safari, EVERGREEN),
    p("transform", Vendor::Webkit, Browser::Safari, 8),
    p("transform", Vendor::Webkit, Browser::Chrome, 35),
    p("transform", Vendor::Ms, Browser::Ie, 9),
    p("transition", Vendor::Webkit, Browser::Safari, 6),
    p("transition", Vendor::Webkit, Browser::Chrome, 25),
    p("transition", Vendor::O, Browser::Opera, 12),
    p("box-shadow", Vendor::Webkit, Browser::Safari, 5),
    p("box-shadow", Vendor::Webkit, Browser::Chrome, 9),
    p("box-shadow", Vendor::Moz, Browser::Firefox, 3),
    p("box-sizing", Vendor::Webkit, Browser::Safari, 5),
    p("box-sizing", Vendor::Moz, Browser::Firefox, 28),
    p("flex", Vendor::Webkit, Browser::Safari, 8),
    p("flex-direction", Vendor::Webkit, Browser::Safari, 8),
    p("flex-wrap", Vendor::Webkit, Browser::Safari, 8),
    p("align-items", Vendor::Webkit, Browser::Safari, 8),
    p("justify-content", Vendor::Webkit, Browser::Safari, 8),
];

const fn p(property: &'static str, vendor: Vendor, browser: Browser, until: u32) -> PropertyPrefix {
    PropertyPrefix {
        property,
        vendor,
        browser,
        until,
    }
}

/// A property/value pair rewritten to a vendor-specific value.
struct ValuePrefix {
    property: &'static str,
    value: &'static str,
    prefixed_value: &'static str,
    vendor: Vendor,
    browser: Browser,
    until: u32,
}

static VALUE_PREFIXES: &[ValuePrefix] = &[
    v("display", "flex", "-webkit-flex", Vendor::Webkit, Browser::Safari, 8),
    v("display", "flex", "-webkit-flex", Vendor::Webkit, Browser::Chrome, 28),
    v("display", "flex", "-ms-flexbox", Vendor::Ms, Browser::Ie, 10),
    v("display", "inline-flex", "-webkit-inline-flex", Vendor::Webkit, Browser::Safari, 8),
    v("display", "inline-flex", "-ms-inline-flexbox", Vendor::Ms, Browser::Ie, 10),
    v("position", "sticky", "-webkit-sticky", Vendor::Webkit, Browser::Safari, 12),
];

const fn v(
    property: &'static str,
    value: &'static str,
    prefixed_value: &'static str,
    vendor: Vendor,
    browser: Browser,
    until: u32,
) -> ValuePrefix {
    ValuePrefix {
        property,
        value,
        prefixed_value,
        vendor,
        browser,
        until,
    }
}

/// Add vendor-prefixed declaration variants required by the matrix.
pub fn apply_vendor_prefixes(sheet: StyleSheet, matrix: &BrowserTargets) -> StyleSheet {
    if matrix.is_empty() {
        return sheet;
    }
    let nodes = sheet
        .nodes
        .into_iter()
        .map(|node| prefix_node(node, matrix))
        .collect();
    StyleSheet::new(nodes)
}

fn prefix_node(node: Node, matrix: &BrowserTargets) -> Node {
    match node {
        Node::Rule(rule) => Node::Rule(prefix_rule(rule, matrix)),
        Node::AtRule(mut at) => {
            at.body = at
                .body
                .into_iter()
                .map(|child| prefix_node(child, matrix))
                .collect();
            Node::AtRule(at)
        }
        other => other,
    }
}

fn prefix_rule(rule: Rule, matrix: &BrowserTargets) -> Rule {
    // Everything already present suppresses identical inserted variants,
    // including author-written prefixed declarations.
    let mut present: HashSet<(String, String)> = rule
        .declarations()
        .map(|d| (d.property.clone(), d.value.clone()))
        .collect();

    let mut body = Vec::with_capacity(rule.body.len());
    for node in rule.body {
        let Node::Declaration(decl) = node else {
            body.push(node);
            continue;
        };
        if decl.property.starts_with('-') {
            // Author-written vendor variant; never re-prefix
            body.push(Node::Declaration(decl));
            continue;
        }
        for variant in variants_for(&decl, matrix) {
            let key = (variant.property.clone(), variant.value.clone());
            if present.insert(key) {
                debug!(declaration = %variant, "inserting vendor variant");
                body.push(Node::Declaration(variant));
            }
        }
        body.push(Node::Declaration(decl));
    }

    Rule {
        selector: rule.selector,
        body,
    }
}

/// Vendor variants required for one declaration, in canonical vendor order.
fn variants_for(decl: &Declaration, matrix: &BrowserTargets) -> Vec<Declaration> {
    let mut variants = Vec::new();
    for vendor in Vendor::ALL {
        let property_needed = PROPERTY_PREFIXES.iter().any(|entry| {
            entry.vendor == vendor
                && entry.property == decl.property
                && matrix.supports_at_or_below(entry.browser, entry.until)
        });
        if property_needed {
            variants.push(Declaration::new(
                format!("{}{}", vendor.prefix(), decl.property),
                decl.value.clone(),
            ));
        }

        if let Some(entry) = VALUE_PREFIXES.iter().find(|entry| {
            entry.vendor == vendor
                && entry.property == decl.property
                && entry.value == decl.value
                && matrix.supports_at_or_below(entry.browser, entry.until)
        }) {
            variants.push(Declaration::new(decl.property.clone(), entry.prefixed_value));
        }
    }
    variants
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_css::{emit, parse_stylesheet};

    fn matrix(targets: &[&str]) -> BrowserTargets {
        let owned: Vec<String> = targets.iter().map(|t| (*t).to_string()).collect();
        BrowserTargets::parse(&owned).unwrap()
    }

    fn prefix_str(src: &str, targets: &[&str]) -> String {
        let sheet = parse_stylesheet(src, None).unwrap();
        emit(&apply_vendor_prefixes(sheet, &matrix(targets)))
    }

    #[test]
    fn test_display_flex_gets_legacy_variant_before_standard() {
        insta::assert_snapshot!(prefix_str(".a { display: flex; }", &["safari 8"]), @r"
        .a {
          display: -webkit-flex;
          display: flex;
        }
        ");
    }

    #[test]
    fn test_vendor_order_is_canonical() {
        let out = prefix_str(".a { display: flex; }", &["safari 8", "ie 10"]);
        let webkit = out.find("-webkit-flex").unwrap();
        let ms = out.find("-ms-flexbox").unwrap();
        let standard = out.find("display: flex;").unwrap();
        assert!(webkit < ms && ms < standard);
    }

    #[test]
    fn test_property_prefix_inserted_before_standard() {
        let out = prefix_str(".a { transform: scale(2); }", &["ie 9"]);
        insta::assert_snapshot!(out, @r"
        .a {
          -ms-transform: scale(2);
          transform: scale(2);
        }
        ");
    }

    #[test]
    fn test_modern_targets_need_no_prefixes() {
        let src = ".a { display: flex; transform: none; }";
        let out = prefix_str(src, &["chrome 120", "firefox 120"]);
        assert!(!out.contains("-webkit-"));
        assert!(!out.contains("-ms-"));
    }

    #[test]
    fn test_empty_matrix_is_identity() {
        let sheet = parse_stylesheet(".a { display: flex; }", None).unwrap();
        let out = apply_vendor_prefixes(sheet.clone(), &BrowserTargets::default());
        assert_eq!(out, sheet);
    }

    #[test]
    fn test_prefixing_is_idempotent() {
        let targets = ["safari 8", "ie 10", "firefox 28"];
        let once = prefix_str(
            ".a { display: flex; box-sizing: border-box; user-select: none; }",
            &targets,
        );
        let twice = prefix_str(&once, &targets);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_author_written_prefix_is_not_duplicated() {
        let out = prefix_str(
            ".a { -webkit-box-sizing: border-box; box-sizing: border-box; }",
            &["safari 5"],
        );
        assert_eq!(out.matches("-webkit-box-sizing").count(), 1);
    }

    #[test]
    fn test_rules_inside_media_are_prefixed() {
        let out = prefix_str(
            "@media (min-width: 640px) { .a { display: flex; } }",
            &["safari 8"],
        );
        assert!(out.contains("display: -webkit-flex;"));
    }

    #[test]
    fn test_position_sticky_value_variant() {
        let out = prefix_str(".a { position: sticky; }", &["safari 12"]);
        let prefixed = out.find("position: -webkit-sticky;").unwrap();
        let standard = out.find("position: sticky;").unwrap();
        assert!(prefixed < standard);
    }
}
