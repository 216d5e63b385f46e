//! CPython-compatible `repr()` formatting for the scalar literal types.
//!
//! Container formatting lives on [`Literal`](crate::Literal); this module only
//! covers the leaf values whose textual form has non-trivial rules.

use std::fmt::{self, Write};

/// Writes the Python `repr()` of a string.
///
/// Uses single quotes unless the string contains a single quote and no double
/// quote, matching CPython's quote selection.
pub(crate) fn string_repr_fmt(s: &str, f: &mut impl Write) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    f.write_char(quote)?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\t' => f.write_str("\\t")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            c if c == quote => {
                f.write_char('\\')?;
                f.write_char(c)?;
            }
            ' ' => f.write_char(' ')?,
            c if is_printable(c) => f.write_char(c)?,
            c => {
                let code = u32::from(c);
                if code <= 0xff {
                    write!(f, "\\x{code:02x}")?;
                } else if code <= 0xffff {
                    write!(f, "\\u{code:04x}")?;
                } else {
                    write!(f, "\\U{code:08x}")?;
                }
            }
        }
    }
    f.write_char(quote)
}

/// Returns the Python `repr()` of a bytes value, e.g. `b'\x00ab'`.
pub(crate) fn bytes_repr(bytes: &[u8]) -> String {
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(quote);
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b if char::from(b) == quote => {
                out.push('\\');
                out.push(quote);
            }
            0x20..=0x7e => out.push(char::from(b)),
            b => {
                let _ = write!(out, "\\x{b:02x}");
            }
        }
    }
    out.push(quote);
    out
}

/// Returns the Python `repr()` of a float.
///
/// Digits are the shortest string that round-trips to the same `f64`; the
/// layout follows CPython: positional notation when the decimal exponent is in
/// `-4..16`, otherwise scientific with a signed, at-least-two-digit exponent.
/// Non-finite values have no literal form and render as `float('inf')` and
/// friends, since a bare `inf` would be read as a name.
pub(crate) fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "float('nan')".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "float('inf')" } else { "float('-inf')" }.to_owned();
    }

    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let mut out = String::from(sign);
    if (-4..16).contains(&exponent) {
        if exponent < 0 {
            out.push_str("0.");
            for _ in 0..(-exponent - 1) {
                out.push('0');
            }
            out.push_str(&digits);
        } else {
            let int_len = exponent.unsigned_abs() as usize + 1;
            if digits.len() <= int_len {
                out.push_str(&digits);
                for _ in digits.len()..int_len {
                    out.push('0');
                }
                out.push_str(".0");
            } else {
                out.push_str(&digits[..int_len]);
                out.push('.');
                out.push_str(&digits[int_len..]);
            }
        }
    } else {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        let _ = write!(out, "e{exp_sign}{:02}", exponent.unsigned_abs());
    }
    out
}

/// Approximation of `str.isprintable()` for a single character.
fn is_printable(c: char) -> bool {
    !(c.is_control() || c.is_whitespace() || matches!(c, '\u{ad}' | '\u{200b}'..='\u{200f}' | '\u{feff}'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_repr(s: &str) -> String {
        let mut out = String::new();
        string_repr_fmt(s, &mut out).unwrap();
        out
    }

    #[test]
    fn float_repr_positional_range() {
        assert_eq!(float_repr(0.0), "0.0");
        assert_eq!(float_repr(-0.0), "-0.0");
        assert_eq!(float_repr(1.0), "1.0");
        assert_eq!(float_repr(0.01), "0.01");
        assert_eq!(float_repr(0.1), "0.1");
        assert_eq!(float_repr(0.0001), "0.0001");
        assert_eq!(float_repr(123.456), "123.456");
        assert_eq!(float_repr(-2.5), "-2.5");
        assert_eq!(float_repr(1e15), "1000000000000000.0");
    }

    #[test]
    fn float_repr_scientific_range() {
        assert_eq!(float_repr(1e-5), "1e-05");
        assert_eq!(float_repr(3.5e-7), "3.5e-07");
        assert_eq!(float_repr(1e16), "1e+16");
        assert_eq!(float_repr(-1.5e300), "-1.5e+300");
    }

    #[test]
    fn float_repr_non_finite() {
        assert_eq!(float_repr(f64::NAN), "float('nan')");
        assert_eq!(float_repr(f64::INFINITY), "float('inf')");
        assert_eq!(float_repr(f64::NEG_INFINITY), "float('-inf')");
    }

    #[test]
    fn string_repr_quote_selection() {
        assert_eq!(string_repr("adam"), "'adam'");
        assert_eq!(string_repr("it's"), "\"it's\"");
        assert_eq!(string_repr("say \"hi\""), "'say \"hi\"'");
        assert_eq!(string_repr("both ' and \""), "'both \\' and \"'");
    }

    #[test]
    fn string_repr_escapes() {
        assert_eq!(string_repr("a\nb\tc\\"), "'a\\nb\\tc\\\\'");
        assert_eq!(string_repr("\u{0}"), "'\\x00'");
        assert_eq!(string_repr("caf\u{e9}"), "'caf\u{e9}'");
        assert_eq!(string_repr("\u{a0}"), "'\\xa0'");
    }

    #[test]
    fn bytes_repr_escapes() {
        assert_eq!(bytes_repr(b"ab"), "b'ab'");
        assert_eq!(bytes_repr(b"\x00\xff"), "b'\\x00\\xff'");
        assert_eq!(bytes_repr(b"it's"), "b\"it's\"");
        assert_eq!(bytes_repr(b"a\nb"), "b'a\\nb'");
    }
}
