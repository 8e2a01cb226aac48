//! Fault-tolerant parser for JSON with comments (tasks files, workspace files).
//!
//! Unlike `serde_json`, the parser keeps going after errors and returns a
//! syntax tree with byte offsets, so callers can both decode values and map
//! a declaration back to a line in the source document.

mod scanner;
mod tree;

pub use tree::{Node, NodeKind, Segment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidCharacter,
    InvalidSymbol,
    InvalidNumber,
    InvalidEscape,
    UnterminatedString,
    UnterminatedComment,
    ValueExpected,
    PropertyNameExpected,
    ColonExpected,
    CommaExpected,
    CloseBraceExpected,
    CloseBracketExpected,
    EndOfFileExpected,
    NestingTooDeep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub offset: usize,
    pub length: usize,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} at offset {}", self.kind, self.offset)
    }
}

#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub root: Option<Node>,
    pub errors: Vec<ParseError>,
}

impl ParsedDocument {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub fn parse_tree(text: &str) -> ParsedDocument {
    let (root, errors) = tree::Parser::new(text).parse_document();
    ParsedDocument { root, errors }
}

/// Zero-based line of a byte offset: the number of `\n` before it.
pub fn line_at(text: &str, offset: usize) -> u32 {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() as u32
}

/// JavaScript-style truthiness, used for flags like `"hide"`.
pub fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
