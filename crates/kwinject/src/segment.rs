//! Joins physical source lines into logical statements.
//!
//! A statement ends on the first line where the running `(`/`)` balance
//! returns to zero, so a call spread over several lines comes out as one
//! string. Only round parentheses are counted.

use std::{fmt, sync::LazyLock};

use fancy_regex::Regex;

/// Whitespace before `? , . ! "`, or the text between an opening `(`/`[` and
/// the next closing `)`/`]`. Each match is replaced by its trimmed self.
static NORMALIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\s[?,.!"])|(?<=[\[(])(.*?)(?=[\])])"#).expect("normalization pattern is a valid regex")
});

/// Splits `code` into logical statements, normalizing whitespace on each line.
///
/// A final trailing newline does not produce an extra empty statement; empty
/// lines between statements are kept as empty statements.
pub fn segment(code: &str) -> Result<Vec<String>, SegmentError> {
    segment_with(code, true)
}

pub(crate) fn segment_with(code: &str, normalize: bool) -> Result<Vec<String>, SegmentError> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut depth: i64 = 0;
    let mut start_line = 1;

    for (index, line) in code.lines().enumerate() {
        let line_no = index + 1;
        if depth == 0 {
            start_line = line_no;
        }
        depth += paren_delta(line);
        if depth < 0 {
            return Err(SegmentError::NegativeDepth {
                line: line_no,
                text: line.to_owned(),
            });
        }
        if normalize {
            current.push_str(&normalize_line(line, line_no)?);
        } else {
            current.push_str(line);
        }
        if depth == 0 {
            statements.push(std::mem::take(&mut current));
        }
    }

    if depth != 0 {
        return Err(SegmentError::Unclosed { depth, start_line });
    }
    Ok(statements)
}

fn paren_delta(line: &str) -> i64 {
    line.bytes().fold(0, |acc, b| match b {
        b'(' => acc + 1,
        b')' => acc - 1,
        _ => acc,
    })
}

fn normalize_line(line: &str, line_no: usize) -> Result<String, SegmentError> {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for captures in NORMALIZE_RE.captures_iter(line) {
        let captures = captures.map_err(|err| SegmentError::Normalize {
            line: line_no,
            message: err.to_string(),
        })?;
        let Some(m) = captures.get(0) else { continue };
        out.push_str(&line[last..m.start()]);
        out.push_str(m.as_str().trim());
        last = m.end();
    }
    out.push_str(&line[last..]);
    Ok(out)
}

/// Malformed parenthesis nesting, or a failure of the normalization regex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    /// More `)` than `(` so far; `line` is 1-based.
    NegativeDepth { line: usize, text: String },
    /// Input ended with `depth` parentheses still open, in the statement that
    /// began on `start_line`.
    Unclosed { depth: i64, start_line: usize },
    /// The regex engine gave up on a line (backtrack limit).
    Normalize { line: usize, message: String },
}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeDepth { line, text } => {
                write!(f, "unbalanced `)` on line {line}: {text}")
            }
            Self::Unclosed { depth, start_line } => write!(
                f,
                "statement starting on line {start_line} leaves {depth} parenthes{} open at end of input",
                if *depth == 1 { "is" } else { "es" }
            ),
            Self::Normalize { line, message } => {
                write!(f, "could not normalize line {line}: {message}")
            }
        }
    }
}

impl std::error::Error for SegmentError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_space_before_punctuation() {
        assert_eq!(normalize_line("x = a , b", 1).unwrap(), "x = a, b");
        assert_eq!(normalize_line("x = 'hi' !", 1).unwrap(), "x = 'hi'!");
    }

    #[test]
    fn normalize_trims_inside_brackets() {
        assert_eq!(normalize_line("f( a, b )", 1).unwrap(), "f(a, b)");
        assert_eq!(normalize_line("xs = [ 1, 2 ]", 1).unwrap(), "xs = [1, 2]");
    }

    #[test]
    fn normalize_leaves_unbracketed_text_alone() {
        assert_eq!(normalize_line("  model = build(", 1).unwrap(), "  model = build(");
    }

    #[test]
    fn paren_delta_counts_round_parens_only() {
        assert_eq!(paren_delta("f(a, [b], {c})"), 0);
        assert_eq!(paren_delta("f(g("), 2);
        assert_eq!(paren_delta("))"), -2);
    }
}
