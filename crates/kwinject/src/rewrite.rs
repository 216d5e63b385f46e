use ahash::AHashSet;

use crate::{parse::CallArg, space::Overrides};

/// Renders an argument list with `overrides` applied.
///
/// Arguments keep their original order. A keyword present in `overrides`
/// takes the override value in place; overrides that match no existing
/// keyword are appended in their own order. Values render as Python literals.
///
/// ```
/// use kwinject::{CallArg, Literal, Overrides, rewrite_args};
///
/// let args = [CallArg::positional("x"), CallArg::keyword("lr", 0.1)];
/// let overrides = Overrides::from([
///     ("lr".to_owned(), Literal::Float(0.01)),
///     ("momentum".to_owned(), Literal::Float(0.9)),
/// ]);
/// assert_eq!(rewrite_args(&args, &overrides), "x, lr=0.01, momentum=0.9");
/// ```
#[must_use]
pub fn rewrite_args(args: &[CallArg], overrides: &Overrides) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(args.len() + overrides.len());
    let mut seen: AHashSet<&str> = AHashSet::new();

    for arg in args {
        match arg {
            CallArg::Positional(name) => parts.push(name.clone()),
            CallArg::Keyword { name, value } => {
                let value = match overrides.get(name) {
                    Some(value) => {
                        seen.insert(name);
                        value
                    }
                    None => value,
                };
                parts.push(format!("{name}={}", value.py_repr()));
            }
        }
    }
    for (name, value) in overrides {
        if !seen.contains(name.as_str()) {
            parts.push(format!("{name}={}", value.py_repr()));
        }
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Literal;

    #[test]
    fn no_args_no_overrides_is_empty() {
        assert_eq!(rewrite_args(&[], &Overrides::new()), "");
    }

    #[test]
    fn overrides_only() {
        let overrides = Overrides::from([("a".to_owned(), Literal::Int(1)), ("b".to_owned(), Literal::from("s"))]);
        assert_eq!(rewrite_args(&[], &overrides), "a=1, b='s'");
    }
}
