//! Recursive-descent parser for the CSS superset accepted by the pipeline.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Accepted grammar, beyond plain CSS:
//! - rules may be nested inside other rules' bodies (flattened later)
//! - `@import "target";` directives, resolved later against search roots
//!
//! Selectors, at-rule preludes, and declaration values are kept as trimmed
//! text. The parser distinguishes a declaration from a nested rule by
//! scanning ahead to the first top-level `{`, `;`, or `}`: a `{` means the
//! scanned text was a selector, anything else means it was a declaration.

use crate::ast::{AtRule, Declaration, ImportDirective, Node, Rule, StyleSheet};
use crate::error::ParseError;

/// Parse a complete stylesheet from source text.
///
/// `file` is only used to label errors; the parser performs no I/O.
pub fn parse_stylesheet(
    source: &str,
    file: Option<&std::path::Path>,
) -> Result<StyleSheet, ParseError> {
    let mut parser = Parser::new(source);
    let nodes = parser.parse_nodes(false).map_err(|e| match file {
        Some(f) => e.with_file(f),
        None => e,
    })?;
    Ok(StyleSheet::new(nodes))
}

/// Maximum block nesting depth. Parsing is recursive, so the cap bounds
/// stack use on hostile input; real stylesheets stay in single digits.
const MAX_BLOCK_DEPTH: usize = 128;

struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    depth: usize,
}

/// What terminated a prelude scan.
enum Terminator {
    OpenBrace,
    Semicolon,
    BlockEnd,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            depth: 0,
        }
    }

    fn err(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.line, self.column, message)
    }

    fn err_at(&self, line: usize, column: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(line, column, message)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Skip whitespace and `/* ... */` comments.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.chars.get(self.pos + 1) == Some(&'*') => {
                    let (line, column) = (self.line, self.column);
                    self.advance();
                    self.advance();
                    loop {
                        match self.advance() {
                            Some('*') if self.peek() == Some('/') => {
                                self.advance();
                                break;
                            }
                            Some(_) => {}
                            None => return Err(self.err_at(line, column, "unterminated comment")),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Parse a sequence of nodes. When `in_block` is set, consumes the
    /// closing `}` and returns; otherwise runs to end of input.
    fn parse_nodes(&mut self, in_block: bool) -> Result<Vec<Node>, ParseError> {
        if in_block {
            self.depth += 1;
            if self.depth > MAX_BLOCK_DEPTH {
                return Err(self.err(format!(
                    "blocks nested deeper than {MAX_BLOCK_DEPTH} levels"
                )));
            }
        }
        let nodes = self.parse_node_list(in_block)?;
        if in_block {
            self.depth -= 1;
        }
        Ok(nodes)
    }

    fn parse_node_list(&mut self, in_block: bool) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                None => {
                    if in_block {
                        return Err(self.err("unexpected end of input, expected '}'"));
                    }
                    return Ok(nodes);
                }
                Some('}') => {
                    if in_block {
                        self.advance();
                        return Ok(nodes);
                    }
                    return Err(self.err("unexpected '}'"));
                }
                Some('@') => nodes.push(self.parse_at_rule()?),
                Some(_) => {
                    if let Some(node) = self.parse_rule_or_declaration()? {
                        nodes.push(node);
                    }
                }
            }
        }
    }

    fn parse_at_rule(&mut self) -> Result<Node, ParseError> {
        self.advance(); // '@'
        let name = self.consume_ident();
        if name.is_empty() {
            return Err(self.err("expected at-rule name after '@'"));
        }
        if name == "import" {
            return self.parse_import();
        }

        let start = (self.line, self.column);
        let (prelude, terminator) = self.scan_prelude()?;
        match terminator {
            Terminator::OpenBrace => {
                let body = self.parse_nodes(true)?;
                Ok(Node::AtRule(AtRule {
                    name,
                    prelude,
                    body,
                }))
            }
            Terminator::Semicolon => Ok(Node::AtStatement { name, prelude }),
            Terminator::BlockEnd => {
                if prelude.is_empty() {
                    Err(self.err_at(start.0, start.1, format!("incomplete @{name} rule")))
                } else {
                    // Trailing statement at-rule without a semicolon
                    Ok(Node::AtStatement { name, prelude })
                }
            }
        }
    }

    fn parse_import(&mut self) -> Result<Node, ParseError> {
        let line = self.line;
        self.skip_trivia()?;
        let target = match self.peek() {
            Some(q @ ('"' | '\'')) => unescape(&self.consume_string(q)?),
            Some(_) => {
                // Bare or url(...) form
                let (text, terminator) = self.scan_prelude()?;
                if !matches!(terminator, Terminator::Semicolon) {
                    return Err(self.err("expected ';' after @import"));
                }
                return Ok(Node::Import(ImportDirective {
                    target: unwrap_url(&text),
                    line,
                }));
            }
            None => return Err(self.err("expected import target after @import")),
        };
        self.skip_trivia()?;
        match self.peek() {
            Some(';') => {
                self.advance();
            }
            _ => return Err(self.err("expected ';' after @import")),
        }
        Ok(Node::Import(ImportDirective { target, line }))
    }

    fn parse_rule_or_declaration(&mut self) -> Result<Option<Node>, ParseError> {
        let start = (self.line, self.column);
        let (text, terminator) = self.scan_prelude()?;
        match terminator {
            Terminator::OpenBrace => {
                if text.is_empty() {
                    return Err(self.err_at(start.0, start.1, "expected selector before '{'"));
                }
                let body = self.parse_nodes(true)?;
                Ok(Some(Node::Rule(Rule {
                    selector: text,
                    body,
                })))
            }
            Terminator::Semicolon | Terminator::BlockEnd => {
                if text.is_empty() {
                    // Stray semicolon
                    return Ok(None);
                }
                let Some((property, value)) = text.split_once(':') else {
                    return Err(self.err_at(start.0, start.1, "expected ':' in declaration"));
                };
                let property = property.trim();
                let value = value.trim();
                if property.is_empty() {
                    return Err(self.err_at(start.0, start.1, "empty property name"));
                }
                Ok(Some(Node::Declaration(Declaration::new(property, value))))
            }
        }
    }

    /// Scan text up to the next top-level `{`, `;`, or `}`.
    ///
    /// `{` and `;` are consumed; `}` is left for the caller. Comments inside
    /// the scanned region are dropped; strings and parenthesized groups are
    /// passed through opaquely. Runs of whitespace collapse to one space.
    fn scan_prelude(&mut self) -> Result<(String, Terminator), ParseError> {
        let mut text = String::new();
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None | Some('}') if depth == 0 => {
                    return Ok((text.trim().to_string(), Terminator::BlockEnd));
                }
                None => return Err(self.err("unexpected end of input")),
                Some('{') if depth == 0 => {
                    self.advance();
                    return Ok((text.trim().to_string(), Terminator::OpenBrace));
                }
                Some(';') if depth == 0 => {
                    self.advance();
                    return Ok((text.trim().to_string(), Terminator::Semicolon));
                }
                Some(q @ ('"' | '\'')) => {
                    let s = self.consume_string(q)?;
                    text.push(q);
                    text.push_str(&s);
                    text.push(q);
                }
                Some('/') if self.chars.get(self.pos + 1) == Some(&'*') => {
                    self.skip_trivia()?;
                }
                Some(c) => {
                    if c == '(' || c == '[' {
                        depth += 1;
                    } else if c == ')' || c == ']' {
                        depth = depth.saturating_sub(1);
                    }
                    if c.is_whitespace() {
                        if !text.ends_with(' ') && !text.is_empty() {
                            text.push(' ');
                        }
                        self.advance();
                    } else {
                        text.push(c);
                        self.advance();
                    }
                }
            }
        }
    }

    /// Consume a quoted string, returning its contents without the quotes.
    ///
    /// Backslash escapes are kept verbatim (backslash included) so emitted
    /// values round-trip byte-for-byte; callers that need the unescaped
    /// text (import targets) strip them separately.
    fn consume_string(&mut self, quote: char) -> Result<String, ParseError> {
        let (line, column) = (self.line, self.column);
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.advance() {
                Some(c) if c == quote => return Ok(value),
                Some('\\') => {
                    value.push('\\');
                    if let Some(escaped) = self.advance() {
                        value.push(escaped);
                    }
                }
                Some('\n') | None => {
                    return Err(self.err_at(line, column, "unterminated string"));
                }
                Some(c) => value.push(c),
            }
        }
    }

    fn consume_ident(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }
        ident
    }
}

/// Strip an optional `url(...)` wrapper and quotes from an import target.
fn unwrap_url(text: &str) -> String {
    let inner = text
        .strip_prefix("url(")
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(text)
        .trim();
    unescape(inner.trim_matches(|c| c == '"' || c == '\''))
}

/// Drop backslashes from an import target so `"a\"b"` names the file `a"b`.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}
