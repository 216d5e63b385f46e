//! Statement-by-statement keyword injection.

use std::fmt;

use crate::{
    delimiter::{DelimiterError, match_delimiter},
    lexer::is_identifier_char,
    options::InjectOptions,
    parse::{ParseError, parse_call_with_limit},
    rewrite::rewrite_args,
    segment::{SegmentError, segment_with},
    space::{Overrides, ParamSpace},
    tracer::{InjectTracer, NoopTracer},
};

/// Rewrites calls to the functions of `space` inside `code`.
///
/// Shorthand for `Injector::new(space).inject(code)`.
///
/// ```
/// use kwinject::{Literal, ParamSpace, inject};
///
/// let space = ParamSpace::new()
///     .with("build", "lr", Literal::Float(0.01))
///     .with("build", "momentum", Literal::Float(0.9));
/// let out = inject("model = build(lr=0.1)\n", &space).unwrap();
/// assert_eq!(out, "model = build(lr=0.01, momentum=0.9)\n");
/// ```
pub fn inject(code: &str, space: &ParamSpace) -> Result<String, InjectError> {
    Injector::new(space).inject(code)
}

/// Keyword injector with configurable options and tracing.
///
/// The tracer is a type parameter so the default [`NoopTracer`] costs nothing.
#[derive(Debug)]
pub struct Injector<'s, Tr: InjectTracer = NoopTracer> {
    space: &'s ParamSpace,
    options: InjectOptions,
    tracer: Tr,
}

impl<'s> Injector<'s> {
    #[must_use]
    pub fn new(space: &'s ParamSpace) -> Self {
        Self {
            space,
            options: InjectOptions::default(),
            tracer: NoopTracer,
        }
    }
}

impl<'s, Tr: InjectTracer> Injector<'s, Tr> {
    #[must_use]
    pub fn with_options(mut self, options: InjectOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the tracer, changing the injector's tracer type.
    #[must_use]
    pub fn with_tracer<T: InjectTracer>(self, tracer: T) -> Injector<'s, T> {
        Injector {
            space: self.space,
            options: self.options,
            tracer,
        }
    }

    #[must_use]
    pub fn options(&self) -> &InjectOptions {
        &self.options
    }

    #[must_use]
    pub fn tracer(&self) -> &Tr {
        &self.tracer
    }

    #[must_use]
    pub fn into_tracer(self) -> Tr {
        self.tracer
    }

    /// Segments `code` into logical statements and rewrites, in each, the
    /// first call to every function of the space.
    ///
    /// Functions are applied in space order, each pass working on the output
    /// of the previous one. Every output statement ends with a newline.
    pub fn inject(&mut self, code: &str) -> Result<String, InjectError> {
        let statements = segment_with(code, self.options.normalize_whitespace)?;
        let mut out = String::with_capacity(code.len());
        for (index, statement) in statements.into_iter().enumerate() {
            self.tracer.on_statement(index, &statement);
            let mut statement = statement;
            let space = self.space;
            for (function, overrides) in space.iter() {
                if let Some(rewritten) = self.rewrite_call(index, &statement, function, overrides)? {
                    statement = rewritten;
                }
            }
            out.push_str(&statement);
            out.push('\n');
        }
        Ok(out)
    }

    /// Rewrites the first call to `function` in `statement`, if any.
    fn rewrite_call(
        &mut self,
        index: usize,
        statement: &str,
        function: &str,
        overrides: &Overrides,
    ) -> Result<Option<String>, InjectError> {
        let Some(start) = find_call(statement, function) else {
            return Ok(None);
        };
        let open = start + function.len();
        let close = match_delimiter(statement, open, '(')?;
        self.tracer.on_call_site(function, index, open, close);

        let args = parse_call_with_limit(&statement[start..=close], self.options.nesting_limit()).map_err(|source| {
            InjectError::Parse {
                function: function.to_owned(),
                statement: statement.to_owned(),
                source,
            }
        })?;
        let rewritten = rewrite_args(&args, overrides);
        self.tracer.on_rewrite(function, &statement[open + 1..close], &rewritten);

        Ok(Some(format!(
            "{}({rewritten}{}",
            &statement[..open],
            &statement[close..]
        )))
    }
}

/// Byte index of the first `function(` in `statement` not preceded by an
/// identifier character, so `rebuild(` does not match `build`.
fn find_call(statement: &str, function: &str) -> Option<usize> {
    let pattern = format!("{function}(");
    let mut from = 0;
    while let Some(offset) = statement[from..].find(&pattern) {
        let index = from + offset;
        let preceded = statement[..index].chars().next_back().is_some_and(is_identifier_char);
        if !preceded {
            return Some(index);
        }
        from = index + pattern.len();
    }
    None
}

/// Errors from [`inject`] and [`Injector::inject`].
#[derive(Debug, Clone, PartialEq)]
pub enum InjectError {
    /// The code could not be split into balanced statements.
    Segment(SegmentError),
    /// A call's closing parenthesis could not be found.
    Delimiter(DelimiterError),
    /// A call to a target function has arguments that cannot be rewritten.
    Parse {
        function: String,
        statement: String,
        source: ParseError,
    },
}

impl fmt::Display for InjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Segment(err) => write!(f, "{err}"),
            Self::Delimiter(err) => write!(f, "{err}"),
            Self::Parse {
                function,
                statement,
                source,
            } => write!(f, "cannot rewrite call to `{function}` in `{statement}`: {source}"),
        }
    }
}

impl std::error::Error for InjectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Segment(err) => Some(err),
            Self::Delimiter(err) => Some(err),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

impl From<SegmentError> for InjectError {
    fn from(err: SegmentError) -> Self {
        Self::Segment(err)
    }
}

impl From<DelimiterError> for InjectError {
    fn from(err: DelimiterError) -> Self {
        Self::Delimiter(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_call_checks_identifier_boundary() {
        assert_eq!(find_call("x = rebuild(1)", "build"), None);
        assert_eq!(find_call("x = rebuild(1) + build(2)", "build"), Some(17));
        assert_eq!(find_call("m = model.build(a)", "build"), Some(10));
        assert_eq!(find_call("build(a)", "build"), Some(0));
    }

    #[test]
    fn find_call_requires_open_paren() {
        assert_eq!(find_call("f = build", "build"), None);
        assert_eq!(find_call("f = build (1)", "build"), None);
    }
}
