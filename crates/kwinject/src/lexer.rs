//! Tokenizer for call expressions and Python literal syntax.
//!
//! Produces the small token set the call parser needs. String and number
//! tokens are decoded here, so the parser only ever sees finished values.

use std::fmt;

use num_bigint::BigInt;

use crate::{
    literal::Literal,
    parse::{CodeRange, ParseError},
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Name(String),
    Number(Literal),
    Str(String),
    Bytes(Vec<u8>),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Equals,
    Dot,
    Ellipsis,
    Star,
    DoubleStar,
    Plus,
    Minus,
    /// Any other Python operator. Never valid inside a literal.
    Operator(&'static str),
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "`{name}`"),
            Self::Number(value) => write!(f, "`{}`", value.py_repr()),
            Self::Str(_) => f.write_str("string literal"),
            Self::Bytes(_) => f.write_str("bytes literal"),
            Self::LParen => f.write_str("`(`"),
            Self::RParen => f.write_str("`)`"),
            Self::LBracket => f.write_str("`[`"),
            Self::RBracket => f.write_str("`]`"),
            Self::LBrace => f.write_str("`{`"),
            Self::RBrace => f.write_str("`}`"),
            Self::Comma => f.write_str("`,`"),
            Self::Colon => f.write_str("`:`"),
            Self::Equals => f.write_str("`=`"),
            Self::Dot => f.write_str("`.`"),
            Self::Ellipsis => f.write_str("`...`"),
            Self::Star => f.write_str("`*`"),
            Self::DoubleStar => f.write_str("`**`"),
            Self::Plus => f.write_str("`+`"),
            Self::Minus => f.write_str("`-`"),
            Self::Operator(op) => write!(f, "`{op}`"),
            Self::Eof => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub range: CodeRange,
}

/// Tokenizes `source`. The returned vector always ends with an `Eof` token.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer { source, pos: 0 };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

struct Lexer<'a> {
    source: &'a str,
    /// Byte offset of the next unread character.
    pos: usize,
}

/// Two-character operators, checked before single characters.
const OPERATORS_2: [&str; 13] = ["**", "==", "!=", "<=", ">=", "//", "<<", ">>", "->", ":=", "+=", "-=", "*="];

const OPERATORS_1: [&str; 9] = ["/", "%", "@", "&", "|", "^", "~", "<", ">"];

impl Lexer<'_> {
    fn rest(&self) -> &str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn range_from(&self, start: usize) -> CodeRange {
        CodeRange::new(start, self.pos)
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '#' {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.bump();
                }
            } else if c == '\\' && matches!(self.peek_nth(1), Some('\n' | '\r')) {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_trivia();
        let start = self.pos;
        let Some(c) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                range: self.range_from(start),
            });
        };

        if is_identifier_start(c) {
            while self.peek().is_some_and(is_identifier_char) {
                self.bump();
            }
            let word = &self.source[start..self.pos];
            if is_string_prefix(word) && matches!(self.peek(), Some('\'' | '"')) {
                return self.string(start, word.to_ascii_lowercase());
            }
            return Ok(Token {
                kind: TokenKind::Name(word.to_owned()),
                range: self.range_from(start),
            });
        }
        if c == '\'' || c == '"' {
            return self.string(start, String::new());
        }
        if c.is_ascii_digit() || (c == '.' && self.peek_nth(1).is_some_and(|n| n.is_ascii_digit())) {
            return self.number(start);
        }
        if self.rest().starts_with("...") {
            self.pos += 3;
            return Ok(Token {
                kind: TokenKind::Ellipsis,
                range: self.range_from(start),
            });
        }
        if let Some(op) = OPERATORS_2.iter().find(|op| self.rest().starts_with(**op)) {
            self.pos += op.len();
            let kind = if *op == "**" {
                TokenKind::DoubleStar
            } else {
                TokenKind::Operator(*op)
            };
            return Ok(Token {
                kind,
                range: self.range_from(start),
            });
        }

        self.bump();
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '=' => TokenKind::Equals,
            '.' => TokenKind::Dot,
            '*' => TokenKind::Star,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            _ => match OPERATORS_1.iter().find(|op| op.starts_with(c)) {
                Some(op) => TokenKind::Operator(*op),
                None => {
                    return Err(ParseError::syntax(
                        format!("invalid character `{c}`"),
                        self.range_from(start),
                    ));
                }
            },
        };
        Ok(Token {
            kind,
            range: self.range_from(start),
        })
    }

    /// Lexes a string or bytes literal. `prefix` is already consumed and lowercased.
    fn string(&mut self, start: usize, prefix: String) -> Result<Token, ParseError> {
        let Some(quote) = self.bump() else {
            return Err(ParseError::syntax("unterminated string literal", self.range_from(start)));
        };
        if prefix.contains('f') {
            self.skip_string_body(quote);
            return Err(ParseError::not_supported(
                "f-strings are evaluated at runtime and are not literals",
                self.range_from(start),
            ));
        }
        let raw = prefix.contains('r');
        let mut buf = if prefix.contains('b') {
            StrBuf::Bytes(Vec::new())
        } else {
            StrBuf::Text(String::new())
        };
        let closing: String = [quote; 3].iter().collect();
        let triple = self.rest().starts_with(&closing[..2]);
        if triple {
            self.pos += 2;
        }

        loop {
            let Some(c) = self.peek() else {
                return Err(ParseError::syntax("unterminated string literal", self.range_from(start)));
            };
            if c == quote {
                if !triple {
                    self.bump();
                    break;
                }
                if self.rest().starts_with(&closing) {
                    self.pos += 3;
                    break;
                }
            }
            if c == '\n' && !triple {
                return Err(ParseError::syntax("unterminated string literal", self.range_from(start)));
            }
            self.bump();
            if c == '\\' {
                let Some(next) = self.bump() else {
                    return Err(ParseError::syntax("unterminated string literal", self.range_from(start)));
                };
                if raw {
                    buf.push_char('\\');
                    if !buf.push_char(next) {
                        return Err(non_ascii_bytes(self.range_from(start)));
                    }
                } else {
                    self.escape(next, &mut buf, start)?;
                }
            } else if !buf.push_char(c) {
                return Err(non_ascii_bytes(self.range_from(start)));
            }
        }

        let kind = match buf {
            StrBuf::Text(s) => TokenKind::Str(s),
            StrBuf::Bytes(b) => TokenKind::Bytes(b),
        };
        Ok(Token {
            kind,
            range: self.range_from(start),
        })
    }

    /// Decodes one backslash escape; `c` is the character after the backslash.
    fn escape(&mut self, c: char, buf: &mut StrBuf, start: usize) -> Result<(), ParseError> {
        let is_bytes = matches!(buf, StrBuf::Bytes(_));
        let simple = match c {
            '\n' => return Ok(()),
            '\\' | '\'' | '"' => Some(c),
            'a' => Some('\x07'),
            'b' => Some('\x08'),
            'f' => Some('\x0c'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'v' => Some('\x0b'),
            _ => None,
        };
        if let Some(decoded) = simple {
            buf.push_char(decoded);
            return Ok(());
        }

        match c {
            '0'..='7' => {
                let mut code = c.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            self.bump();
                        }
                        None => break,
                    }
                }
                if !buf.push_code(code) {
                    return Err(ParseError::syntax(
                        format!("octal escape `\\{code:o}` is out of range for bytes"),
                        self.range_from(start),
                    ));
                }
            }
            'x' => {
                let code = self.hex_digits(2, start, "truncated \\xXX escape")?;
                buf.push_code(code);
            }
            'u' | 'U' if !is_bytes => {
                let (count, msg) = if c == 'u' {
                    (4, "truncated \\uXXXX escape")
                } else {
                    (8, "truncated \\UXXXXXXXX escape")
                };
                let code = self.hex_digits(count, start, msg)?;
                if !buf.push_code(code) {
                    return Err(ParseError::syntax("illegal Unicode character", self.range_from(start)));
                }
            }
            'N' if !is_bytes => {
                return Err(ParseError::not_supported(
                    "named unicode escapes (`\\N{...}`)",
                    self.range_from(start),
                ));
            }
            other => {
                buf.push_char('\\');
                if !buf.push_char(other) {
                    return Err(non_ascii_bytes(self.range_from(start)));
                }
            }
        }
        Ok(())
    }

    fn hex_digits(&mut self, count: usize, start: usize, msg: &'static str) -> Result<u32, ParseError> {
        let mut code = 0u32;
        for _ in 0..count {
            let Some(digit) = self.peek().and_then(|d| d.to_digit(16)) else {
                return Err(ParseError::syntax(msg, self.range_from(start)));
            };
            self.bump();
            code = code * 16 + digit;
        }
        Ok(code)
    }

    /// Consumes the rest of a single-line string so an error can span all of it.
    fn skip_string_body(&mut self, quote: char) {
        while let Some(c) = self.bump() {
            if c == '\\' {
                self.bump();
            } else if c == quote || c == '\n' {
                break;
            }
        }
    }

    fn number(&mut self, start: usize) -> Result<Token, ParseError> {
        let radix_prefix = self
            .rest()
            .get(..2)
            .is_some_and(|p| matches!(p.to_ascii_lowercase().as_str(), "0x" | "0o" | "0b"));
        if radix_prefix {
            self.pos += 2;
            while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
                self.bump();
            }
            let text = &self.source[start..self.pos];
            let value = parse_int_literal(text)
                .filter(|_| valid_radix_underscores(&text[2..]))
                .ok_or_else(|| {
                    ParseError::syntax(format!("invalid integer literal `{text}`"), self.range_from(start))
                })?;
            return Ok(Token {
                kind: TokenKind::Number(Literal::int(value)),
                range: self.range_from(start),
            });
        }

        let mut is_float = false;
        self.eat_digits();
        if self.peek() == Some('.') {
            is_float = true;
            self.bump();
            self.eat_digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_nth(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.pos += digit_at;
                self.eat_digits();
            }
        }
        if matches!(self.peek(), Some('j' | 'J')) {
            self.bump();
            return Err(ParseError::not_supported("complex literals", self.range_from(start)));
        }
        if self.peek().is_some_and(is_identifier_char) {
            while self.peek().is_some_and(is_identifier_char) {
                self.bump();
            }
            return Err(ParseError::syntax("invalid decimal literal", self.range_from(start)));
        }

        let text = &self.source[start..self.pos];
        if !valid_underscores(text) {
            return Err(ParseError::syntax("invalid decimal literal", self.range_from(start)));
        }
        let cleaned: String = text.chars().filter(|c| *c != '_').collect();
        let value = if is_float {
            let f: f64 = cleaned
                .parse()
                .map_err(|_| ParseError::syntax("invalid float literal", self.range_from(start)))?;
            Literal::Float(f)
        } else {
            if cleaned.len() > 1 && cleaned.starts_with('0') && cleaned.chars().any(|c| c != '0') {
                return Err(ParseError::syntax(
                    "leading zeros in decimal integer literals are not permitted",
                    self.range_from(start),
                ));
            }
            let value = parse_int_literal(&cleaned)
                .ok_or_else(|| ParseError::syntax("invalid decimal literal", self.range_from(start)))?;
            Literal::int(value)
        };
        Ok(Token {
            kind: TokenKind::Number(value),
            range: self.range_from(start),
        })
    }

    fn eat_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.bump();
        }
    }
}

/// Accumulates decoded string contents.
enum StrBuf {
    Text(String),
    Bytes(Vec<u8>),
}

impl StrBuf {
    /// Returns false if `c` cannot appear in a bytes literal.
    fn push_char(&mut self, c: char) -> bool {
        match self {
            Self::Text(s) => {
                s.push(c);
                true
            }
            Self::Bytes(b) => match u8::try_from(c) {
                Ok(byte) if byte.is_ascii() => {
                    b.push(byte);
                    true
                }
                _ => false,
            },
        }
    }

    /// Pushes a code point (str) or byte value (bytes). Returns false when out of range.
    fn push_code(&mut self, code: u32) -> bool {
        match self {
            Self::Text(s) => match char::from_u32(code) {
                Some(c) => {
                    s.push(c);
                    true
                }
                None => false,
            },
            Self::Bytes(b) => match u8::try_from(code) {
                Ok(byte) => {
                    b.push(byte);
                    true
                }
                Err(_) => false,
            },
        }
    }
}

fn non_ascii_bytes(position: CodeRange) -> ParseError {
    ParseError::syntax("bytes can only contain ASCII literal characters", position)
}

pub(crate) fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

pub(crate) fn is_identifier_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Hard keywords, which can never name an argument. Soft keywords such as
/// `match` and `type` are ordinary identifiers here.
pub(crate) fn is_python_keyword(word: &str) -> bool {
    matches!(
        word,
        "False"
            | "None"
            | "True"
            | "and"
            | "as"
            | "assert"
            | "async"
            | "await"
            | "break"
            | "class"
            | "continue"
            | "def"
            | "del"
            | "elif"
            | "else"
            | "except"
            | "finally"
            | "for"
            | "from"
            | "global"
            | "if"
            | "import"
            | "in"
            | "is"
            | "lambda"
            | "nonlocal"
            | "not"
            | "or"
            | "pass"
            | "raise"
            | "return"
            | "try"
            | "while"
            | "with"
            | "yield"
    )
}

fn is_string_prefix(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "r" | "u" | "b" | "br" | "rb" | "f" | "fr" | "rf"
    )
}

/// Underscores may only separate digits: no doubles, no leading/trailing ones,
/// none next to `.` or an exponent marker.
fn valid_underscores(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    !(lower.starts_with('_')
        || lower.ends_with('_')
        || ["__", "_.", "._", "_e", "e_"].iter().any(|bad| lower.contains(bad)))
}

/// Radix digits may start with one `_` (`0x_ff`) and may contain `e`.
fn valid_radix_underscores(digits: &str) -> bool {
    let digits = digits.strip_prefix('_').unwrap_or(digits);
    !(digits.starts_with('_') || digits.ends_with('_') || digits.contains("__"))
}

/// Parses an integer literal string into a `BigInt`, handling radix prefixes and underscores.
///
/// Supports decimal (`1_000`), hexadecimal (`0x1f`), octal (`0o17`) and binary (`0b101`).
/// Returns `None` if the string cannot be parsed.
fn parse_int_literal(s: &str) -> Option<BigInt> {
    let cleaned: String = s.chars().filter(|c| *c != '_').collect();
    let cleaned = cleaned.as_str();

    if cleaned.len() >= 2 {
        let digits = &cleaned[2..];
        match cleaned[..2].to_ascii_lowercase().as_str() {
            "0x" => return BigInt::parse_bytes(digits.as_bytes(), 16),
            "0o" => return BigInt::parse_bytes(digits.as_bytes(), 8),
            "0b" => return BigInt::parse_bytes(digits.as_bytes(), 2),
            _ => {}
        }
    }

    cleaned.parse::<BigInt>().ok()
}
