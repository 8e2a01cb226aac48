use serde_json::{Map, Number, Value};

use super::scanner::{Scanned, Scanner, Token};
use super::{ParseError, ParseErrorKind};

/// Deepest object/array nesting the parser descends into. Anything below is
/// skipped as one empty container.
pub const MAX_NESTING: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Array,
    /// Children: the key string, then the value when one was parsed.
    Property,
    String,
    Number,
    Boolean,
    Null,
}

/// A syntax tree node with byte offsets into the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub offset: usize,
    pub length: usize,
    /// Set for literals.
    pub value: Option<Value>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

impl Node {
    fn literal(kind: NodeKind, scanned: &Scanned, value: Value) -> Self {
        Self {
            kind,
            offset: scanned.offset,
            length: scanned.length,
            value: Some(value),
            children: Vec::new(),
        }
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Key of a property node.
    pub fn property_key(&self) -> Option<&str> {
        if self.kind != NodeKind::Property {
            return None;
        }
        self.children.first()?.value.as_ref()?.as_str()
    }

    /// Value child of a property node.
    pub fn property_value(&self) -> Option<&Node> {
        if self.kind != NodeKind::Property {
            return None;
        }
        self.children.get(1)
    }

    /// The property node named `key` in an object. Duplicate keys resolve to
    /// the last occurrence, matching how the decoded value behaves.
    pub fn property(&self, key: &str) -> Option<&Node> {
        if self.kind != NodeKind::Object {
            return None;
        }
        self.children
            .iter()
            .rev()
            .find(|child| child.property_key() == Some(key))
    }

    pub fn find(&self, path: &[Segment<'_>]) -> Option<&Node> {
        let mut node = self;
        for segment in path {
            node = match *segment {
                Segment::Key(key) => node.property(key)?.property_value()?,
                Segment::Index(idx) => {
                    if node.kind != NodeKind::Array {
                        return None;
                    }
                    node.children.get(idx)?
                }
            };
        }
        Some(node)
    }

    /// Decode the subtree into a value. Properties without a value are dropped.
    pub fn to_value(&self) -> Value {
        match self.kind {
            NodeKind::Object => {
                let mut map = Map::new();
                for prop in &self.children {
                    if let (Some(key), Some(value)) = (prop.property_key(), prop.property_value()) {
                        map.insert(key.to_string(), value.to_value());
                    }
                }
                Value::Object(map)
            }
            NodeKind::Array => Value::Array(self.children.iter().map(Node::to_value).collect()),
            NodeKind::Property => self
                .property_value()
                .map(Node::to_value)
                .unwrap_or(Value::Null),
            _ => self.value.clone().unwrap_or(Value::Null),
        }
    }
}

pub(super) struct Parser<'a> {
    scanner: Scanner<'a>,
    current: Scanned,
    errors: Vec<ParseError>,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub(super) fn new(text: &'a str) -> Self {
        let mut scanner = Scanner::new(text);
        let current = scanner.scan();
        let mut parser = Self {
            scanner,
            current,
            errors: Vec::new(),
            depth: 0,
        };
        parser.collect_scan_errors();
        parser
    }

    pub(super) fn parse_document(mut self) -> (Option<Node>, Vec<ParseError>) {
        if self.current.token == Token::Eof {
            self.error(ParseErrorKind::ValueExpected);
            return (None, self.errors);
        }
        let root = self.parse_value();
        if root.is_none() {
            self.error(ParseErrorKind::ValueExpected);
        } else if self.current.token != Token::Eof {
            self.error(ParseErrorKind::EndOfFileExpected);
        }
        (root, self.errors)
    }

    fn advance(&mut self) {
        self.current = self.scanner.scan();
        self.collect_scan_errors();
    }

    fn collect_scan_errors(&mut self) {
        for (kind, offset, length) in self.scanner.take_errors() {
            self.errors.push(ParseError {
                kind,
                offset,
                length,
            });
        }
    }

    fn error(&mut self, kind: ParseErrorKind) {
        self.errors.push(ParseError {
            kind,
            offset: self.current.offset,
            length: self.current.length,
        });
    }

    fn parse_value(&mut self) -> Option<Node> {
        let node = match &self.current.token {
            Token::OpenBrace | Token::OpenBracket if self.depth >= MAX_NESTING => {
                return Some(self.skip_nested());
            }
            Token::OpenBrace => {
                self.depth += 1;
                let node = self.parse_object();
                self.depth -= 1;
                return Some(node);
            }
            Token::OpenBracket => {
                self.depth += 1;
                let node = self.parse_array();
                self.depth -= 1;
                return Some(node);
            }
            Token::String(s) => {
                Node::literal(NodeKind::String, &self.current, Value::String(s.clone()))
            }
            Token::Number(text) => {
                let value = parse_number(text);
                Node::literal(NodeKind::Number, &self.current, value)
            }
            Token::True => Node::literal(NodeKind::Boolean, &self.current, Value::Bool(true)),
            Token::False => Node::literal(NodeKind::Boolean, &self.current, Value::Bool(false)),
            Token::Null => Node::literal(NodeKind::Null, &self.current, Value::Null),
            _ => return None,
        };
        self.advance();
        Some(node)
    }

    /// Step over the container at the current token without building it.
    fn skip_nested(&mut self) -> Node {
        let kind = if self.current.token == Token::OpenBrace {
            NodeKind::Object
        } else {
            NodeKind::Array
        };
        let start = self.current.offset;
        self.error(ParseErrorKind::NestingTooDeep);

        let mut open = 0usize;
        let end = loop {
            match &self.current.token {
                Token::OpenBrace | Token::OpenBracket => open += 1,
                Token::CloseBrace | Token::CloseBracket => {
                    open -= 1;
                    if open == 0 {
                        let end = self.current.end();
                        self.advance();
                        break end;
                    }
                }
                Token::Eof => break self.current.offset,
                _ => {}
            }
            self.advance();
        };

        Node {
            kind,
            offset: start,
            length: end.saturating_sub(start),
            value: None,
            children: Vec::new(),
        }
    }

    fn parse_object(&mut self) -> Node {
        let start = self.current.offset;
        self.advance();
        let mut children = Vec::new();
        let mut need_comma = false;

        let end = loop {
            match &self.current.token {
                Token::CloseBrace => {
                    let end = self.current.end();
                    self.advance();
                    break end;
                }
                Token::Eof | Token::CloseBracket => {
                    self.error(ParseErrorKind::CloseBraceExpected);
                    break self.current.offset;
                }
                Token::Comma => {
                    if !need_comma {
                        self.error(ParseErrorKind::PropertyNameExpected);
                    }
                    need_comma = false;
                    self.advance();
                }
                Token::String(s) => {
                    let key =
                        Node::literal(NodeKind::String, &self.current, Value::String(s.clone()));
                    if need_comma {
                        self.error(ParseErrorKind::CommaExpected);
                    }
                    children.push(self.parse_property(key));
                    need_comma = true;
                }
                _ => {
                    self.error(ParseErrorKind::PropertyNameExpected);
                    self.advance();
                }
            }
        };

        Node {
            kind: NodeKind::Object,
            offset: start,
            length: end.saturating_sub(start),
            value: None,
            children,
        }
    }

    /// `key` is the already-built node for the current string token.
    fn parse_property(&mut self, key: Node) -> Node {
        self.advance();

        let mut children = vec![key];
        if self.current.token == Token::Colon {
            self.advance();
            match self.parse_value() {
                Some(value) => children.push(value),
                None => {
                    self.error(ParseErrorKind::ValueExpected);
                    if matches!(self.current.token, Token::Colon | Token::Unknown) {
                        self.advance();
                    }
                }
            }
        } else {
            self.error(ParseErrorKind::ColonExpected);
        }

        let offset = children[0].offset;
        let end = children.last().map_or(offset, Node::end);
        Node {
            kind: NodeKind::Property,
            offset,
            length: end - offset,
            value: None,
            children,
        }
    }

    fn parse_array(&mut self) -> Node {
        let start = self.current.offset;
        self.advance();
        let mut children = Vec::new();
        let mut need_comma = false;

        let end = loop {
            match &self.current.token {
                Token::CloseBracket => {
                    let end = self.current.end();
                    self.advance();
                    break end;
                }
                Token::Eof | Token::CloseBrace => {
                    self.error(ParseErrorKind::CloseBracketExpected);
                    break self.current.offset;
                }
                Token::Comma => {
                    if !need_comma {
                        self.error(ParseErrorKind::ValueExpected);
                    }
                    need_comma = false;
                    self.advance();
                }
                _ => {
                    if need_comma {
                        self.error(ParseErrorKind::CommaExpected);
                    }
                    match self.parse_value() {
                        Some(value) => {
                            children.push(value);
                            need_comma = true;
                        }
                        None => {
                            self.error(ParseErrorKind::ValueExpected);
                            self.advance();
                        }
                    }
                }
            }
        };

        Node {
            kind: NodeKind::Array,
            offset: start,
            length: end.saturating_sub(start),
            value: None,
            children,
        }
    }
}

fn parse_number(text: &str) -> Value {
    if let Ok(i) = text.parse::<i64>() {
        return Value::Number(i.into());
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
