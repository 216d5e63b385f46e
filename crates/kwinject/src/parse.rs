use std::{borrow::Cow, fmt};

use ahash::AHashSet;
use num_bigint::BigInt;

use crate::{
    lexer::{Token, TokenKind, is_python_keyword, tokenize},
    literal::{DictPairs, Literal},
};

/// Maximum nesting depth of containers inside a literal.
/// Matches CPython's limit of ~200 for nested parentheses.
/// This prevents stack overflow from deeply nested structures like `[[[[1]]]]`.
pub const MAX_NESTING_DEPTH: u16 = 200;

/// One argument of a parsed call site.
#[derive(Debug, Clone, PartialEq)]
pub enum CallArg {
    /// A bare positional identifier, e.g. `x` in `f(x)`.
    Positional(String),
    /// A keyword argument with its literal value, e.g. `lr=0.1`.
    Keyword { name: String, value: Literal },
}

impl CallArg {
    pub fn positional(name: impl Into<String>) -> Self {
        Self::Positional(name.into())
    }

    pub fn keyword(name: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::Keyword {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The identifier for positional arguments, the keyword for keyword arguments.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Positional(name) | Self::Keyword { name, .. } => name,
        }
    }
}

/// Parses an isolated call expression such as `f(x, lr=0.1, layers=[64, 64])`.
///
/// Returns positional identifiers followed by keyword arguments, in source
/// order. Positional arguments must be simple identifiers and keyword values
/// must be literals; anything else is rejected with [`ParseError::NotSupported`].
pub fn parse_call(call: &str) -> Result<Vec<CallArg>, ParseError> {
    parse_call_with_limit(call, MAX_NESTING_DEPTH)
}

pub(crate) fn parse_call_with_limit(call: &str, max_depth: u16) -> Result<Vec<CallArg>, ParseError> {
    let mut parser = Parser::new(call, max_depth)?;
    let args = parser.call()?;
    let trailing = parser.advance();
    if trailing.kind != TokenKind::Eof {
        return Err(ParseError::syntax(
            format!("unexpected {} after the closing `)` of the call", trailing.kind),
            trailing.range,
        ));
    }
    Ok(args)
}

/// Parses a Python literal expression (the subset accepted by `ast.literal_eval`).
///
/// Nothing is evaluated: names other than `True`, `False` and `None`, calls
/// other than `set()`, and operators other than a unary sign on a number are
/// rejected.
pub fn parse_literal(text: &str) -> Result<Literal, ParseError> {
    parse_literal_with_limit(text, MAX_NESTING_DEPTH)
}

pub(crate) fn parse_literal_with_limit(text: &str, max_depth: u16) -> Result<Literal, ParseError> {
    let mut parser = Parser::new(text, max_depth)?;
    let value = parser.literal()?;
    parser.expect_end("after the literal")?;
    Ok(value)
}

/// Recursive-descent parser over a token vector.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: u16,
    max_depth: u16,
}

impl Parser {
    fn new(source: &str, max_depth: u16) -> Result<Self, ParseError> {
        Ok(Self {
            tokens: tokenize(source)?,
            pos: 0,
            depth: 0,
            max_depth,
        })
    }

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    /// Looks `offset` tokens ahead, saturating at the trailing `Eof`.
    fn peek_at(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<(), ParseError> {
        let token = self.advance();
        if &token.kind == kind {
            Ok(())
        } else {
            Err(unexpected(&token, expected))
        }
    }

    fn expect_end(&mut self, context: &str) -> Result<(), ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Eof => Ok(()),
            _ => Err(unexpected(&token, &format!("end of input {context}"))),
        }
    }

    /// Range from `start` up to the end of the last consumed token.
    fn range_since(&self, start: usize) -> CodeRange {
        let end = self.tokens[..self.pos].last().map_or(start, |t| t.range.end());
        CodeRange::new(start, end.max(start))
    }

    fn enter(&mut self, position: CodeRange) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::NestingTooDeep {
                limit: self.max_depth,
                position,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn call(&mut self) -> Result<Vec<CallArg>, ParseError> {
        let callee = self.advance();
        if !matches!(callee.kind, TokenKind::Name(_)) {
            return Err(ParseError::syntax(
                format!("expected a function name, found {}", callee.kind),
                callee.range,
            ));
        }
        while self.eat(&TokenKind::Dot) {
            let attr = self.advance();
            if !matches!(attr.kind, TokenKind::Name(_)) {
                return Err(unexpected(&attr, "an attribute name"));
            }
        }
        self.expect(&TokenKind::LParen, "`(`")?;

        let mut args: Vec<CallArg> = Vec::new();
        let mut keywords: AHashSet<String> = AHashSet::new();
        loop {
            if self.eat(&TokenKind::RParen) {
                break;
            }
            let start = self.peek().range;
            let arg = self.argument(!keywords.is_empty())?;
            if let CallArg::Keyword { name, .. } = &arg
                && !keywords.insert(name.clone())
            {
                return Err(ParseError::syntax(
                    format!("keyword argument repeated: `{name}`"),
                    self.range_since(start.start()),
                ));
            }
            args.push(arg);
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            self.expect(&TokenKind::RParen, "`,` or `)`")?;
            break;
        }
        Ok(args)
    }

    fn argument(&mut self, after_keyword: bool) -> Result<CallArg, ParseError> {
        let token = self.peek().clone();
        let next = &self.peek_at(1).kind;
        match &token.kind {
            TokenKind::Name(name) if next == &TokenKind::Equals => {
                if is_python_keyword(name) {
                    return Err(ParseError::syntax(
                        format!("cannot assign to {name}"),
                        token.range,
                    ));
                }
                self.advance();
                self.advance();
                let value = self.literal()?;
                Ok(CallArg::Keyword {
                    name: name.clone(),
                    value,
                })
            }
            TokenKind::Name(name)
                if matches!(next, TokenKind::Comma | TokenKind::RParen) && !is_python_keyword(name) =>
            {
                if after_keyword {
                    return Err(ParseError::syntax(
                        "positional argument follows keyword argument",
                        token.range,
                    ));
                }
                self.advance();
                Ok(CallArg::Positional(name.clone()))
            }
            TokenKind::Star => Err(ParseError::not_supported(
                "`*` unpacking of positional arguments",
                token.range,
            )),
            TokenKind::DoubleStar => Err(ParseError::not_supported(
                "`**` unpacking of keyword arguments",
                token.range,
            )),
            TokenKind::Name(name) if is_python_keyword(name) && !is_reserved_constant(name) => Err(
                ParseError::syntax(format!("`{name}` is a keyword, not an argument"), token.range),
            ),
            TokenKind::Eof | TokenKind::Comma => Err(unexpected(&token, "an argument")),
            _ => Err(ParseError::not_supported(
                format!("positional arguments must be simple identifiers, found {}", token.kind),
                token.range,
            )),
        }
    }

    /// literal := ('+' | '-') atom | atom
    fn literal(&mut self) -> Result<Literal, ParseError> {
        let sign = self.peek().clone();
        let negate = match sign.kind {
            TokenKind::Minus => true,
            TokenKind::Plus => false,
            _ => return self.atom(),
        };
        self.advance();
        let value = self.atom()?;
        let position = self.range_since(sign.range.start());
        match value {
            Literal::Int(i) if negate => Ok(i
                .checked_neg()
                .map_or_else(|| Literal::int(-BigInt::from(i)), Literal::Int)),
            Literal::BigInt(bi) if negate => Ok(Literal::int(-bi)),
            Literal::Float(f) if negate => Ok(Literal::Float(-f)),
            number @ (Literal::Int(_) | Literal::BigInt(_) | Literal::Float(_)) => Ok(number),
            other => Err(ParseError::not_supported(
                format!("unary {} applied to {}", sign.kind, other.type_name()),
                position,
            )),
        }
    }

    fn atom(&mut self) -> Result<Literal, ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(value) => Ok(value),
            TokenKind::Str(mut s) => {
                loop {
                    match &self.peek().kind {
                        TokenKind::Str(next) => {
                            s.push_str(next);
                            self.advance();
                        }
                        TokenKind::Bytes(_) => return Err(mixed_bytes(self.peek().range)),
                        _ => break,
                    }
                }
                Ok(Literal::String(s))
            }
            TokenKind::Bytes(mut b) => {
                loop {
                    match &self.peek().kind {
                        TokenKind::Bytes(next) => {
                            b.extend_from_slice(next);
                            self.advance();
                        }
                        TokenKind::Str(_) => return Err(mixed_bytes(self.peek().range)),
                        _ => break,
                    }
                }
                Ok(Literal::Bytes(b))
            }
            TokenKind::Ellipsis => Ok(Literal::Ellipsis),
            TokenKind::Name(name) => self.name(&name, token.range),
            TokenKind::LBracket => self.list(token.range),
            TokenKind::LParen => self.paren_or_tuple(token.range),
            TokenKind::LBrace => self.dict_or_set(token.range),
            _ => Err(unexpected(&token, "a literal")),
        }
    }

    fn name(&mut self, name: &str, position: CodeRange) -> Result<Literal, ParseError> {
        match name {
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            "None" => Ok(Literal::None),
            "set" if self.peek().kind == TokenKind::LParen && self.peek_at(1).kind == TokenKind::RParen => {
                self.advance();
                self.advance();
                Ok(Literal::Set(Vec::new()))
            }
            _ if self.peek().kind == TokenKind::LParen => Err(ParseError::not_supported(
                format!("function calls such as `{name}(...)` are not literals"),
                position,
            )),
            _ => Err(ParseError::not_supported(
                format!("name `{name}` is not a literal"),
                position,
            )),
        }
    }

    fn list(&mut self, open: CodeRange) -> Result<Literal, ParseError> {
        self.enter(open)?;
        let mut items = Vec::new();
        loop {
            if self.eat(&TokenKind::RBracket) {
                break;
            }
            items.push(self.literal()?);
            if !self.eat(&TokenKind::Comma) {
                self.expect(&TokenKind::RBracket, "`,` or `]`")?;
                break;
            }
        }
        self.leave();
        Ok(Literal::List(items))
    }

    /// `()` is the empty tuple, `(x)` is just `x`, and a comma makes a tuple.
    fn paren_or_tuple(&mut self, open: CodeRange) -> Result<Literal, ParseError> {
        self.enter(open)?;
        if self.eat(&TokenKind::RParen) {
            self.leave();
            return Ok(Literal::Tuple(Vec::new()));
        }
        let first = self.literal()?;
        if self.eat(&TokenKind::RParen) {
            self.leave();
            return Ok(first);
        }
        self.expect(&TokenKind::Comma, "`,` or `)`")?;
        let mut items = vec![first];
        loop {
            if self.eat(&TokenKind::RParen) {
                break;
            }
            items.push(self.literal()?);
            if !self.eat(&TokenKind::Comma) {
                self.expect(&TokenKind::RParen, "`,` or `)`")?;
                break;
            }
        }
        self.leave();
        Ok(Literal::Tuple(items))
    }

    /// `{}` is an empty dict; a `:` after the first item selects dict syntax,
    /// otherwise the braces hold a set.
    fn dict_or_set(&mut self, open: CodeRange) -> Result<Literal, ParseError> {
        self.enter(open)?;
        if self.eat(&TokenKind::RBrace) {
            self.leave();
            return Ok(Literal::Dict(DictPairs::default()));
        }
        let first = self.hashable_item()?;
        let value = if self.eat(&TokenKind::Colon) {
            let mut pairs = DictPairs::default();
            let value = self.literal()?;
            pairs.insert(first, value);
            loop {
                if !self.eat(&TokenKind::Comma) {
                    self.expect(&TokenKind::RBrace, "`,` or `}`")?;
                    break;
                }
                if self.eat(&TokenKind::RBrace) {
                    break;
                }
                let key = self.hashable_item()?;
                self.expect(&TokenKind::Colon, "`:`")?;
                let value = self.literal()?;
                pairs.insert(key, value);
            }
            Literal::Dict(pairs)
        } else {
            let mut members = vec![first];
            loop {
                if !self.eat(&TokenKind::Comma) {
                    self.expect(&TokenKind::RBrace, "`,` or `}`")?;
                    break;
                }
                if self.eat(&TokenKind::RBrace) {
                    break;
                }
                let member = self.hashable_item()?;
                if !members.iter().any(|m| m.key_eq(&member)) {
                    members.push(member);
                }
            }
            Literal::Set(members)
        };
        self.leave();
        Ok(value)
    }

    /// Parses a dict key or set member and checks it is hashable.
    fn hashable_item(&mut self) -> Result<Literal, ParseError> {
        let token = self.peek().clone();
        if token.kind == TokenKind::DoubleStar {
            return Err(ParseError::not_supported("`**` unpacking inside a dict", token.range));
        }
        let item = self.literal()?;
        let position = self.range_since(token.range.start());
        if !item.is_hashable() {
            return Err(ParseError::Unhashable {
                type_name: item.type_name(),
                position,
            });
        }
        Ok(item)
    }
}

fn is_reserved_constant(name: &str) -> bool {
    matches!(name, "True" | "False" | "None")
}

fn mixed_bytes(position: CodeRange) -> ParseError {
    ParseError::syntax("cannot mix bytes and nonbytes literals", position)
}

/// Builds the error for a token the grammar did not expect.
///
/// Operators and postfix syntax (calls, subscripts, attribute access) mean the
/// input is a valid expression that just is not a literal, so those are
/// reported as unsupported rather than as syntax errors.
fn unexpected(token: &Token, expected: &str) -> ParseError {
    match token.kind {
        TokenKind::Plus
        | TokenKind::Minus
        | TokenKind::Star
        | TokenKind::DoubleStar
        | TokenKind::Operator(_)
        | TokenKind::Dot
        | TokenKind::LParen
        | TokenKind::LBracket => ParseError::not_supported(
            format!("{} in a literal expression", token.kind),
            token.range,
        ),
        _ => ParseError::syntax(format!("expected {expected}, found {}", token.kind), token.range),
    }
}

/// A byte range into the text handed to the parser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CodeRange {
    start: usize,
    end: usize,
}

impl CodeRange {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the start offset.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the end offset (exclusive).
    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }
}

impl fmt::Display for CodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Errors that can occur while parsing a call site or a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Input that is not valid Python.
    Syntax {
        msg: Cow<'static, str>,
        position: CodeRange,
    },
    /// Valid Python that is outside the supported argument forms: non-literal
    /// keyword values, non-identifier positional arguments, unpacking.
    NotSupported {
        msg: Cow<'static, str>,
        position: CodeRange,
    },
    /// A list, dict or set used as a dict key or set member.
    Unhashable {
        type_name: &'static str,
        position: CodeRange,
    },
    /// Containers nested deeper than the configured limit.
    NestingTooDeep { limit: u16, position: CodeRange },
}

impl ParseError {
    pub(crate) fn syntax(msg: impl Into<Cow<'static, str>>, position: CodeRange) -> Self {
        Self::Syntax {
            msg: msg.into(),
            position,
        }
    }

    pub(crate) fn not_supported(msg: impl Into<Cow<'static, str>>, position: CodeRange) -> Self {
        Self::NotSupported {
            msg: msg.into(),
            position,
        }
    }

    /// Where in the parsed text the error was detected.
    #[must_use]
    pub fn position(&self) -> CodeRange {
        match self {
            Self::Syntax { position, .. }
            | Self::NotSupported { position, .. }
            | Self::Unhashable { position, .. }
            | Self::NestingTooDeep { position, .. } => *position,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { msg, position } => write!(f, "invalid syntax at {position}: {msg}"),
            Self::NotSupported { msg, position } => {
                write!(f, "unsupported argument form at {position}: {msg}")
            }
            Self::Unhashable { type_name, position } => {
                write!(f, "unhashable type '{type_name}' at {position}")
            }
            Self::NestingTooDeep { limit, position } => {
                write!(f, "literal nested more than {limit} levels deep at {position}")
            }
        }
    }
}

impl std::error::Error for ParseError {}
