use super::ParseErrorKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Comma,
    Colon,
    String(String),
    Number(String),
    True,
    False,
    Null,
    Unknown,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scanned {
    pub token: Token,
    pub offset: usize,
    pub length: usize,
}

impl Scanned {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Tokenizer for JSON with `//` and `/* */` comments. Comments and
/// whitespace are skipped; problems are collected instead of aborting.
pub struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    errors: Vec<(ParseErrorKind, usize, usize)>,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            errors: Vec::new(),
        }
    }

    pub fn take_errors(&mut self) -> Vec<(ParseErrorKind, usize, usize)> {
        std::mem::take(&mut self.errors)
    }

    pub fn scan(&mut self) -> Scanned {
        self.skip_trivia();

        let start = self.pos;
        let Some(&b) = self.bytes.get(start) else {
            return Scanned {
                token: Token::Eof,
                offset: start,
                length: 0,
            };
        };

        let token = match b {
            b'{' => self.single(Token::OpenBrace),
            b'}' => self.single(Token::CloseBrace),
            b'[' => self.single(Token::OpenBracket),
            b']' => self.single(Token::CloseBracket),
            b',' => self.single(Token::Comma),
            b':' => self.single(Token::Colon),
            b'"' => self.scan_string(),
            b'-' | b'0'..=b'9' => self.scan_number(),
            b if is_word_byte(b) => self.scan_word(),
            _ => {
                // Step over a whole UTF-8 character.
                let width = self.text[start..].chars().next().map_or(1, char::len_utf8);
                self.pos += width;
                self.errors
                    .push((ParseErrorKind::InvalidCharacter, start, width));
                Token::Unknown
            }
        };

        Scanned {
            token,
            offset: start,
            length: self.pos - start,
        }
    }

    fn single(&mut self, token: Token) -> Token {
        self.pos += 1;
        token
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.bytes.get(self.pos) {
                Some(b' ' | b'\t' | b'\r' | b'\n') => self.pos += 1,
                // BOM
                Some(0xEF)
                    if self.bytes.get(self.pos + 1) == Some(&0xBB)
                        && self.bytes.get(self.pos + 2) == Some(&0xBF) =>
                {
                    self.pos += 3
                }
                Some(b'/') => match self.bytes.get(self.pos + 1) {
                    Some(b'/') => {
                        while let Some(&c) = self.bytes.get(self.pos) {
                            if c == b'\n' {
                                break;
                            }
                            self.pos += 1;
                        }
                    }
                    Some(b'*') => {
                        let start = self.pos;
                        self.pos += 2;
                        loop {
                            match self.bytes.get(self.pos) {
                                None => {
                                    self.errors.push((
                                        ParseErrorKind::UnterminatedComment,
                                        start,
                                        self.pos - start,
                                    ));
                                    break;
                                }
                                Some(b'*') if self.bytes.get(self.pos + 1) == Some(&b'/') => {
                                    self.pos += 2;
                                    break;
                                }
                                Some(_) => self.pos += 1,
                            }
                        }
                    }
                    _ => return,
                },
                _ => return,
            }
        }
    }

    fn scan_string(&mut self) -> Token {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        let mut chunk_start = self.pos;

        loop {
            let Some(&b) = self.bytes.get(self.pos) else {
                out.push_str(&self.text[chunk_start..self.pos]);
                self.errors.push((
                    ParseErrorKind::UnterminatedString,
                    start,
                    self.pos - start,
                ));
                return Token::String(out);
            };
            match b {
                b'"' => {
                    out.push_str(&self.text[chunk_start..self.pos]);
                    self.pos += 1;
                    return Token::String(out);
                }
                b'\n' | b'\r' => {
                    out.push_str(&self.text[chunk_start..self.pos]);
                    self.errors.push((
                        ParseErrorKind::UnterminatedString,
                        start,
                        self.pos - start,
                    ));
                    return Token::String(out);
                }
                b'\\' => {
                    out.push_str(&self.text[chunk_start..self.pos]);
                    self.pos += 1;
                    self.scan_escape(&mut out);
                    chunk_start = self.pos;
                }
                _ => self.pos += 1,
            }
        }
    }

    fn scan_escape(&mut self, out: &mut String) {
        let escape_start = self.pos - 1;
        let Some(&b) = self.bytes.get(self.pos) else {
            return;
        };
        self.pos += 1;
        match b {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{08}'),
            b'f' => out.push('\u{0C}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => match self.read_hex4() {
                Some(high @ 0xD800..=0xDBFF) => {
                    let low = if self.bytes.get(self.pos) == Some(&b'\\')
                        && self.bytes.get(self.pos + 1) == Some(&b'u')
                    {
                        let save = self.pos;
                        self.pos += 2;
                        match self.read_hex4() {
                            Some(low @ 0xDC00..=0xDFFF) => Some(low),
                            _ => {
                                self.pos = save;
                                None
                            }
                        }
                    } else {
                        None
                    };
                    let ch = low
                        .map(|low| 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
                        .and_then(char::from_u32)
                        .unwrap_or(char::REPLACEMENT_CHARACTER);
                    out.push(ch);
                }
                Some(code) => out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)),
                None => {
                    self.errors.push((
                        ParseErrorKind::InvalidEscape,
                        escape_start,
                        self.pos - escape_start,
                    ));
                }
            },
            _ => {
                // Keep the character, flag the escape.
                if let Some(ch) = self.text[self.pos - 1..].chars().next() {
                    self.pos += ch.len_utf8() - 1;
                    out.push(ch);
                }
                self.errors.push((
                    ParseErrorKind::InvalidEscape,
                    escape_start,
                    self.pos - escape_start,
                ));
            }
        }
    }

    fn read_hex4(&mut self) -> Option<u32> {
        let digits = self.text.get(self.pos..self.pos + 4)?;
        let code = u32::from_str_radix(digits, 16).ok()?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        self.pos += 4;
        Some(code)
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;
        if self.bytes.get(self.pos) == Some(&b'-') {
            self.pos += 1;
        }
        let int_digits = self.eat_digits();
        let mut valid = int_digits > 0;
        if self.bytes.get(self.pos) == Some(&b'.') {
            self.pos += 1;
            valid &= self.eat_digits() > 0;
        }
        if matches!(self.bytes.get(self.pos), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.bytes.get(self.pos), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            valid &= self.eat_digits() > 0;
        }
        if !valid {
            self.errors
                .push((ParseErrorKind::InvalidNumber, start, self.pos - start));
            return Token::Unknown;
        }
        Token::Number(self.text[start..self.pos].to_string())
    }

    fn eat_digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.bytes.get(self.pos), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn scan_word(&mut self) -> Token {
        let start = self.pos;
        while self.bytes.get(self.pos).is_some_and(|&b| is_word_byte(b)) {
            self.pos += 1;
        }
        match &self.text[start..self.pos] {
            "true" => Token::True,
            "false" => Token::False,
            "null" => Token::Null,
            _ => {
                self.errors
                    .push((ParseErrorKind::InvalidSymbol, start, self.pos - start));
                Token::Unknown
            }
        }
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}
