//! Matching of paired delimiters within a single line of source.

use std::fmt;

/// A delimiter pair that [`match_delimiter`] knows how to balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Delimiter {
    Paren,
    Brace,
    Bracket,
    SingleQuote,
    DoubleQuote,
}

impl Delimiter {
    #[must_use]
    pub fn open(self) -> u8 {
        match self {
            Self::Paren => b'(',
            Self::Brace => b'{',
            Self::Bracket => b'[',
            Self::SingleQuote => b'\'',
            Self::DoubleQuote => b'"',
        }
    }

    #[must_use]
    pub fn close(self) -> u8 {
        match self {
            Self::Paren => b')',
            Self::Brace => b'}',
            Self::Bracket => b']',
            Self::SingleQuote => b'\'',
            Self::DoubleQuote => b'"',
        }
    }

    /// Quotes open and close with the same character and do not nest.
    #[must_use]
    pub fn is_quote(self) -> bool {
        self.open() == self.close()
    }
}

impl TryFrom<char> for Delimiter {
    type Error = DelimiterError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '(' => Ok(Self::Paren),
            '{' => Ok(Self::Brace),
            '[' => Ok(Self::Bracket),
            '\'' => Ok(Self::SingleQuote),
            '"' => Ok(Self::DoubleQuote),
            other => Err(DelimiterError::Unsupported(other)),
        }
    }
}

/// Returns the byte index of the delimiter that closes the one at `start`.
///
/// `line[start]` must be the opening character of `delimiter`. Nested
/// occurrences of the same pair are counted; other delimiter kinds are
/// ignored. A quote is closed by its next occurrence.
///
/// ```
/// assert_eq!(kwinject::match_delimiter("f(a,b)", 1, '('), Ok(5));
/// assert_eq!(kwinject::match_delimiter("g(h(1), 2) + 3", 1, '('), Ok(9));
/// ```
pub fn match_delimiter(line: &str, start: usize, delimiter: char) -> Result<usize, DelimiterError> {
    let delimiter = Delimiter::try_from(delimiter)?;
    let bytes = line.as_bytes();
    if bytes.get(start) != Some(&delimiter.open()) {
        return Err(DelimiterError::NotAtDelimiter { delimiter, index: start });
    }

    let (open, close) = (delimiter.open(), delimiter.close());
    let mut depth = 1usize;
    for (index, &b) in bytes.iter().enumerate().skip(start + 1) {
        if b == close {
            depth -= 1;
            if depth == 0 {
                return Ok(index);
            }
        } else if b == open {
            depth += 1;
        }
    }
    Err(DelimiterError::Unmatched { delimiter, start })
}

/// Errors from [`match_delimiter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterError {
    /// The character at `index` is not the opening delimiter (or `index` is
    /// past the end of the line).
    NotAtDelimiter { delimiter: Delimiter, index: usize },
    /// The scan reached the end of the line with the delimiter still open.
    Unmatched { delimiter: Delimiter, start: usize },
    /// The requested character is not a supported opening delimiter.
    Unsupported(char),
}

impl fmt::Display for DelimiterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAtDelimiter { delimiter, index } => write!(
                f,
                "expected `{}` at index {index}",
                char::from(delimiter.open())
            ),
            Self::Unmatched { delimiter, start } => {
                let name: &'static str = delimiter.into();
                write!(f, "unmatched {name} opened at index {start}")
            }
            Self::Unsupported(c) => write!(f, "unsupported delimiter {c:?}"),
        }
    }
}

impl std::error::Error for DelimiterError {}
