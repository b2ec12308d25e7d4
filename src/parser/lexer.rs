//! A forgiving tokenizer for the ECMAScript family (JS, TS, JSX, TSX).
//!
//! Only enough structure is recovered to find literal module specifiers:
//! identifiers, punctuation, and string/template literals. Comments, regex
//! literals and numbers are consumed so that their contents never look like
//! code.

use crate::parser::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Punct(char),
    /// Quoted string; `text` holds the unescaped contents.
    Str,
    /// Template literal chunk; `complete` only for a whole template without `${`.
    Template { complete: bool },
    Number,
    Regex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: std::borrow::Cow<'a, str>,
    pub line: usize,
    pub column: usize,
}

impl Token<'_> {
    pub fn is_ident(&self, name: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == name
    }

    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }

    /// A literal usable as a module specifier.
    pub fn literal(&self) -> Option<&str> {
        match self.kind {
            TokenKind::Str | TokenKind::Template { complete: true } => Some(&self.text),
            _ => None,
        }
    }
}

/// Keywords after which a `/` starts a regex rather than a division.
const REGEX_PRECEDING_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

pub fn tokenize(source: &str, jsx: bool) -> Result<Vec<Token<'_>>, ParseError> {
    Lexer::new(source, jsx).run()
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
    jsx: bool,
    /// Open `{` count inside each active `${ ... }` template substitution.
    template_depths: Vec<usize>,
    tokens: Vec<Token<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str, jsx: bool) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            jsx,
            template_depths: Vec::new(),
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token<'a>>, ParseError> {
        if self.src.starts_with("#!") {
            self.skip_line();
        }

        while let Some(b) = self.peek() {
            let (line, column) = (self.line, self.column);
            match b {
                b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c => self.bump(),
                b'/' if self.peek_at(1) == Some(b'/') => self.skip_line(),
                b'/' if self.peek_at(1) == Some(b'*') => self.skip_block_comment(line, column)?,
                b'\'' | b'"' => self.string(b, line, column)?,
                b'`' => {
                    self.bump();
                    self.template_chunk(true, line, column)?;
                }
                b'/' if self.regex_allowed() => self.regex_or_slash(line, column),
                b'0'..=b'9' => self.number(line, column),
                b'.' if matches!(self.peek_at(1), Some(b'0'..=b'9')) => self.number(line, column),
                b'{' => {
                    if let Some(depth) = self.template_depths.last_mut() {
                        *depth += 1;
                    }
                    self.punct(line, column);
                }
                b'}' => match self.template_depths.last_mut() {
                    Some(0) => {
                        self.template_depths.pop();
                        self.bump();
                        self.template_chunk(false, line, column)?;
                    }
                    Some(depth) => {
                        *depth -= 1;
                        self.punct(line, column);
                    }
                    None => self.punct(line, column),
                },
                b if is_ident_start(b) => self.ident(line, column),
                _ => self.punct(line, column),
            }
        }

        if !self.template_depths.is_empty() {
            return Err(ParseError::Unterminated {
                what: "template literal",
                line: self.line,
                column: self.column,
            });
        }

        Ok(self.tokens)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// Advance one byte, keeping line and (character) column current.
    fn bump(&mut self) {
        if let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'\n' {
                self.line += 1;
                self.column = 1;
            } else if b & 0xC0 != 0x80 {
                self.column += 1;
            }
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize, line: usize, column: usize) {
        self.tokens.push(Token {
            kind,
            text: std::borrow::Cow::Borrowed(&self.src[start..end]),
            line,
            column,
        });
    }

    fn skip_line(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self, line: usize, column: usize) -> Result<(), ParseError> {
        self.bump();
        self.bump();
        loop {
            match self.peek() {
                None => {
                    return Err(ParseError::Unterminated {
                        what: "block comment",
                        line,
                        column,
                    });
                }
                Some(b'*') if self.peek_at(1) == Some(b'/') => {
                    self.bump();
                    self.bump();
                    return Ok(());
                }
                Some(_) => self.bump(),
            }
        }
    }

    fn string(&mut self, quote: u8, line: usize, column: usize) -> Result<(), ParseError> {
        let (start_pos, start_line, start_column) = (self.pos, self.line, self.column);
        self.bump();
        let mut value = String::new();
        let mut segment_start = self.pos;

        loop {
            match self.peek() {
                Some(b) if b == quote => {
                    value.push_str(&self.src[segment_start..self.pos]);
                    self.bump();
                    self.tokens.push(Token {
                        kind: TokenKind::Str,
                        text: std::borrow::Cow::Owned(value),
                        line,
                        column,
                    });
                    return Ok(());
                }
                Some(b'\\') => {
                    value.push_str(&self.src[segment_start..self.pos]);
                    self.bump();
                    if let Some(escaped) = self.peek() {
                        let char_len = utf8_len(escaped);
                        let end = (self.pos + char_len).min(self.bytes.len());
                        match escaped {
                            b'\n' => {}
                            b'n' => value.push('\n'),
                            b't' => value.push('\t'),
                            _ => value.push_str(&self.src[self.pos..end]),
                        }
                        for _ in 0..char_len {
                            self.bump();
                        }
                    }
                    segment_start = self.pos;
                }
                Some(b'\n') | None => {
                    if self.jsx {
                        // Quote inside JSX text: rewind and treat it as punctuation.
                        self.pos = start_pos;
                        self.line = start_line;
                        self.column = start_column;
                        self.punct(line, column);
                        return Ok(());
                    }
                    return Err(ParseError::Unterminated {
                        what: "string literal",
                        line,
                        column,
                    });
                }
                Some(_) => self.bump(),
            }
        }
    }

    /// Scan template text after an opening backtick (`head`) or the `}` closing a substitution.
    fn template_chunk(&mut self, head: bool, line: usize, column: usize) -> Result<(), ParseError> {
        let start = self.pos;
        loop {
            match self.peek() {
                None => {
                    return Err(ParseError::Unterminated {
                        what: "template literal",
                        line,
                        column,
                    });
                }
                Some(b'\\') => {
                    self.bump();
                    self.bump();
                }
                Some(b'`') => {
                    let end = self.pos;
                    self.bump();
                    self.push(TokenKind::Template { complete: head }, start, end, line, column);
                    return Ok(());
                }
                Some(b'$') if self.peek_at(1) == Some(b'{') => {
                    let end = self.pos;
                    self.bump();
                    self.bump();
                    self.push(TokenKind::Template { complete: false }, start, end, line, column);
                    self.template_depths.push(0);
                    return Ok(());
                }
                Some(_) => self.bump(),
            }
        }
    }

    fn regex_allowed(&self) -> bool {
        match self.tokens.last() {
            None => true,
            Some(tok) => match tok.kind {
                TokenKind::Punct(c) => !matches!(c, ')' | ']' | '}'),
                TokenKind::Ident => REGEX_PRECEDING_KEYWORDS.contains(&&*tok.text),
                _ => false,
            },
        }
    }

    /// Try to read a regex literal; fall back to a plain `/` if it never closes on this line.
    fn regex_or_slash(&mut self, line: usize, column: usize) {
        let (start_pos, start_line, start_column) = (self.pos, self.line, self.column);
        self.bump();
        let mut in_class = false;
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    self.pos = start_pos;
                    self.line = start_line;
                    self.column = start_column;
                    self.punct(line, column);
                    return;
                }
                Some(b'\\') => {
                    self.bump();
                    if self.peek() != Some(b'\n') {
                        self.bump();
                    }
                }
                Some(b'[') => {
                    in_class = true;
                    self.bump();
                }
                Some(b']') => {
                    in_class = false;
                    self.bump();
                }
                Some(b'/') if !in_class => {
                    self.bump();
                    while self.peek().is_some_and(is_ident_continue) {
                        self.bump();
                    }
                    self.push(TokenKind::Regex, start_pos, self.pos, line, column);
                    return;
                }
                Some(_) => self.bump(),
            }
        }
    }

    fn number(&mut self, line: usize, column: usize) {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_')
        {
            self.bump();
        }
        self.push(TokenKind::Number, start, self.pos, line, column);
    }

    fn ident(&mut self, line: usize, column: usize) {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.bump();
        }
        self.push(TokenKind::Ident, start, self.pos, line, column);
    }

    fn punct(&mut self, line: usize, column: usize) {
        let start = self.pos;
        let c = self.src[start..].chars().next().unwrap_or('\0');
        for _ in 0..c.len_utf8() {
            self.bump();
        }
        self.push(TokenKind::Punct(c), start, self.pos, line, column);
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

fn utf8_len(first: u8) -> usize {
    match first {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    }
}
