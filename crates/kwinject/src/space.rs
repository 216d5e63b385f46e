//! The parameter space: which keyword values to inject into which functions.

use std::{borrow::Cow, fmt};

use indexmap::IndexMap;

use crate::{
    lexer::{is_identifier_char, is_identifier_start, is_python_keyword},
    literal::Literal,
    parse::{ParseError, parse_literal},
};

/// Override values for one function, keyed by parameter name in insertion order.
pub type Overrides = IndexMap<String, Literal>;

/// Ordered mapping of function name to its [`Overrides`].
///
/// Function order decides the order of rewrite passes over each statement;
/// parameter order decides where new keywords are appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSpace {
    functions: IndexMap<String, Overrides>,
}

impl ParamSpace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `function`'s override for `param`, returning any previous value.
    pub fn insert(
        &mut self,
        function: impl Into<String>,
        param: impl Into<String>,
        value: impl Into<Literal>,
    ) -> Option<Literal> {
        self.functions
            .entry(function.into())
            .or_default()
            .insert(param.into(), value.into())
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, function: impl Into<String>, param: impl Into<String>, value: impl Into<Literal>) -> Self {
        self.insert(function, param, value);
        self
    }

    #[must_use]
    pub fn get(&self, function: &str) -> Option<&Overrides> {
        self.functions.get(function)
    }

    /// Function names in injection order.
    pub fn functions(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Overrides)> {
        self.functions.iter().map(|(name, overrides)| (name.as_str(), overrides))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Loads a space from a JSON object of objects, e.g.
    /// `{"build": {"lr": 0.01, "layers": [64, 64]}}`.
    ///
    /// Object order is kept. Values map onto [`Literal`] through
    /// [`Literal::from_json_value`].
    pub fn from_json_str(json: &str) -> Result<Self, SpaceError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_json_value(value)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, SpaceError> {
        let serde_json::Value::Object(functions) = value else {
            return Err(SpaceError::shape("top level must be an object of functions"));
        };
        let mut space = Self::new();
        for (function, params) in functions {
            check_function_name(&function)?;
            let serde_json::Value::Object(params) = params else {
                return Err(SpaceError::shape(format!("parameters of `{function}` must be an object")));
            };
            let overrides = space.functions.entry(function).or_default();
            for (param, value) in params {
                check_param_name(&param)?;
                overrides.insert(param, Literal::from_json_value(value));
            }
        }
        Ok(space)
    }

    /// Loads a space from a Python dict literal, e.g.
    /// `{'build': {'lr': 0.01, 'optimizer': 'adam'}}`.
    ///
    /// Unlike JSON this can express tuples, sets, bytes and non-string keys
    /// inside values.
    pub fn from_literal(text: &str) -> Result<Self, SpaceError> {
        let Literal::Dict(functions) = parse_literal(text)? else {
            return Err(SpaceError::shape("top level must be a dict of functions"));
        };
        let mut space = Self::new();
        for (function, params) in functions {
            let Literal::String(function) = function else {
                return Err(SpaceError::shape(format!(
                    "function names must be strings, found {}",
                    function.type_name()
                )));
            };
            check_function_name(&function)?;
            let Literal::Dict(params) = params else {
                return Err(SpaceError::shape(format!("parameters of `{function}` must be a dict")));
            };
            let overrides = space.functions.entry(function).or_default();
            for (param, value) in params {
                let Literal::String(param) = param else {
                    return Err(SpaceError::shape(format!(
                        "parameter names must be strings, found {}",
                        param.type_name()
                    )));
                };
                check_param_name(&param)?;
                overrides.insert(param, value);
            }
        }
        Ok(space)
    }

    /// Returns a space with the same keys whose values are free variables
    /// named `<function>__<param>`, with the function name lowercased and
    /// dots replaced by underscores.
    ///
    /// Injecting it turns literal hyperparameters into names that a search
    /// driver can bind later.
    ///
    /// ```
    /// use kwinject::{Literal, ParamSpace, inject};
    ///
    /// let space = ParamSpace::new().with("SGD", "lr", Literal::Float(0.1));
    /// let out = inject("opt = SGD(params, lr=1.0)\n", &space.placeholders()).unwrap();
    /// assert_eq!(out, "opt = SGD(params, lr=sgd__lr)\n");
    /// ```
    #[must_use]
    pub fn placeholders(&self) -> Self {
        self.iter()
            .map(|(function, overrides)| {
                let prefix = function.to_lowercase().replace('.', "_");
                let overrides = overrides
                    .keys()
                    .map(|param| (param.clone(), Literal::Repr(format!("{prefix}__{param}"))))
                    .collect();
                (function.to_owned(), overrides)
            })
            .collect()
    }
}

impl FromIterator<(String, Overrides)> for ParamSpace {
    fn from_iter<I: IntoIterator<Item = (String, Overrides)>>(iter: I) -> Self {
        Self {
            functions: iter.into_iter().collect(),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_identifier_start) && chars.all(is_identifier_char)
}

/// Function names may be dotted (`nn.Linear`), each part an identifier.
fn check_function_name(name: &str) -> Result<(), SpaceError> {
    if name.split('.').all(is_identifier) {
        Ok(())
    } else {
        Err(SpaceError::shape(format!("`{name}` is not a valid function name")))
    }
}

fn check_param_name(name: &str) -> Result<(), SpaceError> {
    if is_python_keyword(name) {
        Err(SpaceError::shape(format!("`{name}` is a keyword and cannot name a parameter")))
    } else if is_identifier(name) {
        Ok(())
    } else {
        Err(SpaceError::shape(format!("`{name}` is not a valid keyword name")))
    }
}

/// Errors from loading a [`ParamSpace`].
#[derive(Debug)]
pub enum SpaceError {
    /// The input is not valid JSON.
    Json(serde_json::Error),
    /// The input is not a valid Python literal.
    Literal(ParseError),
    /// The input parsed but is not a mapping of functions to parameter mappings.
    Shape(Cow<'static, str>),
}

impl SpaceError {
    fn shape(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Shape(msg.into())
    }
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid parameter space JSON: {err}"),
            Self::Literal(err) => write!(f, "invalid parameter space literal: {err}"),
            Self::Shape(msg) => write!(f, "invalid parameter space: {msg}"),
        }
    }
}

impl std::error::Error for SpaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Literal(err) => Some(err),
            Self::Shape(_) => None,
        }
    }
}

impl From<serde_json::Error> for SpaceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<ParseError> for SpaceError {
    fn from(err: ParseError) -> Self {
        Self::Literal(err)
    }
}
