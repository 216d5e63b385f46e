use std::{
    fmt::{self, Write},
    hash::{Hash, Hasher},
};

use indexmap::IndexMap;
use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};

use crate::repr::{bytes_repr, float_repr, string_repr_fmt};

/// A Python literal value: anything `ast.literal_eval` could produce, plus a
/// verbatim source fragment.
///
/// Keyword values parsed out of a call site and override values supplied in a
/// [`ParamSpace`](crate::ParamSpace) are both `Literal`s. Every variant renders
/// back to valid Python source through [`Literal::py_repr`].
///
/// # Input vs Output Variants
///
/// All variants except `Repr` can be produced by the literal parser. `Repr` is
/// output-only: it holds source text that is emitted as-is, which is how
/// placeholder identifiers (e.g. `sgd__lr`) are injected.
///
/// # JSON Serialization
///
/// `Literal` derives serde with externally tagged variants (`{"Int": 3}`), and
/// accepts Python-style aliases (`{"int": 3}`, `"NoneType"`). The natural JSON
/// mapping used for parameter-space files is [`Literal::from_json_value`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Literal {
    /// Python's `None` singleton.
    #[serde(alias = "none", alias = "NoneType")]
    None,
    /// Python's `Ellipsis` singleton (`...`).
    #[serde(alias = "ellipsis")]
    Ellipsis,
    /// Python boolean (`True` or `False`).
    #[serde(alias = "bool")]
    Bool(bool),
    /// Python integer that fits in 64 bits.
    #[serde(alias = "int")]
    Int(i64),
    /// Python integer outside the `i64` range.
    BigInt(BigInt),
    /// Python float (64-bit IEEE 754).
    #[serde(alias = "float")]
    Float(f64),
    /// Python string.
    #[serde(alias = "str")]
    String(String),
    /// Python bytes.
    #[serde(alias = "bytes")]
    Bytes(Vec<u8>),
    /// Python list.
    #[serde(alias = "list")]
    List(Vec<Self>),
    /// Python tuple.
    #[serde(alias = "tuple")]
    Tuple(Vec<Self>),
    /// Python dict, insertion-ordered.
    #[serde(alias = "dict")]
    Dict(DictPairs),
    /// Python set, in source order with duplicates removed.
    #[serde(alias = "set")]
    Set(Vec<Self>),
    /// Verbatim source text, emitted unchanged by `py_repr`.
    Repr(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            _ => self.repr_fmt(f),
        }
    }
}

impl Literal {
    /// Creates a new `Literal::Dict` from something that can be converted into `DictPairs`.
    pub fn dict(dict: impl Into<DictPairs>) -> Self {
        Self::Dict(dict.into())
    }

    /// Normalizes an arbitrary-precision integer, using `Int` whenever it fits.
    #[must_use]
    pub fn int(value: BigInt) -> Self {
        match value.to_i64() {
            Some(i) => Self::Int(i),
            None => Self::BigInt(value),
        }
    }

    /// Returns the Python `repr()` string for this value.
    ///
    /// The result is valid Python source; parsing it back with
    /// [`parse_literal`](crate::parse_literal) yields an equal value for every
    /// variant except `Repr` and non-finite floats, which render as
    /// `float('inf')` style calls. `Ellipsis` renders as `...` rather than the
    /// builtin name so the output stays a literal.
    #[must_use]
    pub fn py_repr(&self) -> String {
        let mut s = String::new();
        // writing into a String cannot fail
        let _ = self.repr_fmt(&mut s);
        s
    }

    /// Converts a JSON value to a `Literal` using the natural mapping:
    ///
    /// - `null` → `None`
    /// - `true`/`false` → `Bool`
    /// - integer → `Int` (`BigInt` for unsigned values beyond `i64`)
    /// - float → `Float`
    /// - string → `String`
    /// - array → `List`
    /// - object → `Dict` with string keys, in document order
    #[must_use]
    pub fn from_json_value(value: serde_json::Value) -> Self {
        use serde_json::Value as JV;
        match value {
            JV::Null => Self::None,
            JV::Bool(b) => Self::Bool(b),
            JV::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::BigInt(BigInt::from(u))
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JV::String(s) => Self::String(s),
            JV::Array(arr) => Self::List(arr.into_iter().map(Self::from_json_value).collect()),
            JV::Object(map) => Self::Dict(
                map.into_iter()
                    .map(|(k, v)| (Self::String(k), Self::from_json_value(v)))
                    .collect(),
            ),
        }
    }

    fn repr_fmt(&self, f: &mut impl Write) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Ellipsis => f.write_str("..."),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(v) => write!(f, "{v}"),
            Self::BigInt(v) => write!(f, "{v}"),
            Self::Float(v) => f.write_str(&float_repr(*v)),
            Self::String(s) => string_repr_fmt(s, f),
            Self::Bytes(b) => f.write_str(&bytes_repr(b)),
            Self::List(items) => {
                f.write_char('[')?;
                write_items(items, f)?;
                f.write_char(']')
            }
            Self::Tuple(items) => {
                f.write_char('(')?;
                write_items(items, f)?;
                if items.len() == 1 {
                    f.write_char(',')?;
                }
                f.write_char(')')
            }
            Self::Dict(d) => {
                f.write_char('{')?;
                let mut iter = d.iter();
                if let Some((k, v)) = iter.next() {
                    k.repr_fmt(f)?;
                    f.write_str(": ")?;
                    v.repr_fmt(f)?;
                    for (k, v) in iter {
                        f.write_str(", ")?;
                        k.repr_fmt(f)?;
                        f.write_str(": ")?;
                        v.repr_fmt(f)?;
                    }
                }
                f.write_char('}')
            }
            Self::Set(items) => {
                if items.is_empty() {
                    f.write_str("set()")
                } else {
                    f.write_char('{')?;
                    write_items(items, f)?;
                    f.write_char('}')
                }
            }
            Self::Repr(s) => f.write_str(s),
        }
    }

    /// Returns `true` if the value could be a dict key or set member in Python.
    #[must_use]
    pub fn is_hashable(&self) -> bool {
        match self {
            Self::None
            | Self::Ellipsis
            | Self::Bool(_)
            | Self::Int(_)
            | Self::BigInt(_)
            | Self::Float(_)
            | Self::String(_)
            | Self::Bytes(_) => true,
            Self::Tuple(items) => items.iter().all(Self::is_hashable),
            Self::List(_) | Self::Dict(_) | Self::Set(_) | Self::Repr(_) => false,
        }
    }

    /// Python equality as used for dict keys and set members.
    ///
    /// Differs from `==` in that numerically equal values of different numeric
    /// types compare equal (`1 == 1.0 == True`).
    #[must_use]
    pub fn key_eq(&self, other: &Self) -> bool {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a == b,
            (Some(_), None) | (None, Some(_)) => false,
            (None, None) => match (self, other) {
                (Self::Tuple(a), Self::Tuple(b)) => a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.key_eq(y)),
                _ => self == other,
            },
        }
    }

    fn as_number(&self) -> Option<Number> {
        match self {
            Self::Bool(b) => Some(Number::Int(BigInt::from(u8::from(*b)))),
            Self::Int(i) => Some(Number::Int(BigInt::from(*i))),
            Self::BigInt(bi) => Some(Number::Int(bi.clone())),
            Self::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    /// Returns the Python type name for this value (e.g., `"int"`, `"str"`, `"list"`).
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Ellipsis => "ellipsis",
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::BigInt(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
            Self::Dict(_) => "dict",
            Self::Set(_) => "set",
            Self::Repr(_) => "repr",
        }
    }
}

fn write_items(items: &[Literal], f: &mut impl Write) -> fmt::Result {
    let mut iter = items.iter();
    if let Some(first) = iter.next() {
        first.repr_fmt(f)?;
        for item in iter {
            f.write_str(", ")?;
            item.repr_fmt(f)?;
        }
    }
    Ok(())
}

/// Numeric view used by [`Literal::key_eq`].
enum Number {
    Int(BigInt),
    Float(f64),
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(i), Self::Float(f)) | (Self::Float(f), Self::Int(i)) => {
                f.fract() == 0.0 && BigInt::from_f64(*f).is_some_and(|fi| &fi == i)
            }
        }
    }
}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Int and BigInt share a discriminant since they compare equal
        match self {
            Self::Int(_) | Self::BigInt(_) => std::mem::discriminant(&Self::Int(0)).hash(state),
            _ => std::mem::discriminant(self).hash(state),
        }

        match self {
            Self::None | Self::Ellipsis => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(i) => i.hash(state),
            Self::BigInt(bi) => match bi.to_i64() {
                Some(i) => i.hash(state),
                None => bi.to_signed_bytes_le().hash(state),
            },
            Self::Float(f) => f.to_bits().hash(state),
            Self::String(s) | Self::Repr(s) => s.hash(state),
            Self::Bytes(b) => b.hash(state),
            Self::List(items) | Self::Tuple(items) => items.hash(state),
            // sets compare without regard to order
            Self::Set(items) => items.len().hash(state),
            Self::Dict(pairs) => {
                for (k, v) in pairs {
                    k.hash(state);
                    v.hash(state);
                }
            }
        }
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) | (Self::Ellipsis, Self::Ellipsis) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            (Self::Int(a), Self::BigInt(b)) | (Self::BigInt(b), Self::Int(a)) => BigInt::from(*a) == *b,
            // to_bits() keeps Eq consistent with Hash
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) | (Self::Repr(a), Self::Repr(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::List(a), Self::List(b)) | (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::Dict(a), Self::Dict(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => a.len() == b.len() && a.iter().all(|item| b.contains(item)),
            _ => false,
        }
    }
}

impl Eq for Literal {}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<Self>> for Literal {
    fn from(value: Vec<Self>) -> Self {
        Self::List(value)
    }
}

/// Error returned when a `Literal` cannot be converted to the requested Rust type.
#[derive(Debug)]
pub struct ConversionError {
    /// The type name that was expected (e.g., "int", "str").
    pub expected: &'static str,
    /// The actual type name of the `Literal` (e.g., "list", "NoneType").
    pub actual: &'static str,
}

impl ConversionError {
    #[must_use]
    pub fn new(expected: &'static str, actual: &'static str) -> Self {
        Self { expected, actual }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}, got {}", self.expected, self.actual)
    }
}

impl std::error::Error for ConversionError {}

impl TryFrom<&Literal> for i64 {
    type Error = ConversionError;

    fn try_from(value: &Literal) -> Result<Self, Self::Error> {
        match value {
            Literal::Int(i) => Ok(*i),
            _ => Err(ConversionError::new("int", value.type_name())),
        }
    }
}

/// Int values are widened to f64, matching Python's numeric tower.
impl TryFrom<&Literal> for f64 {
    type Error = ConversionError;

    fn try_from(value: &Literal) -> Result<Self, Self::Error> {
        match value {
            Literal::Float(f) => Ok(*f),
            Literal::Int(i) => Ok(*i as Self),
            _ => Err(ConversionError::new("float", value.type_name())),
        }
    }
}

impl TryFrom<&Literal> for String {
    type Error = ConversionError;

    fn try_from(value: &Literal) -> Result<Self, Self::Error> {
        if let Literal::String(s) = value {
            Ok(s.clone())
        } else {
            Err(ConversionError::new("str", value.type_name()))
        }
    }
}

/// Does NOT apply Python truthiness; only `True`/`False` convert.
impl TryFrom<&Literal> for bool {
    type Error = ConversionError;

    fn try_from(value: &Literal) -> Result<Self, Self::Error> {
        match value {
            Literal::Bool(b) => Ok(*b),
            _ => Err(ConversionError::new("bool", value.type_name())),
        }
    }
}

/// Key-value pairs of a Python dict, in insertion order.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct DictPairs(Vec<(Literal, Literal)>);

impl From<Vec<(Literal, Literal)>> for DictPairs {
    fn from(pairs: Vec<(Literal, Literal)>) -> Self {
        Self(pairs)
    }
}

impl From<IndexMap<Literal, Literal>> for DictPairs {
    fn from(map: IndexMap<Literal, Literal>) -> Self {
        Self(map.into_iter().collect())
    }
}

impl From<DictPairs> for IndexMap<Literal, Literal> {
    fn from(pairs: DictPairs) -> Self {
        pairs.into_iter().collect()
    }
}

impl IntoIterator for DictPairs {
    type Item = (Literal, Literal);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a DictPairs {
    type Item = &'a (Literal, Literal);
    type IntoIter = std::slice::Iter<'a, (Literal, Literal)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(Literal, Literal)> for DictPairs {
    fn from_iter<T: IntoIterator<Item = (Literal, Literal)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl DictPairs {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Literal, Literal)> {
        self.0.iter()
    }

    /// Looks up a key with Python dict-key equality.
    #[must_use]
    pub fn get(&self, key: &Literal) -> Option<&Literal> {
        self.0.iter().find(|(k, _)| k.key_eq(key)).map(|(_, v)| v)
    }

    /// Inserts with Python dict-literal semantics: a repeated key keeps its
    /// first position and original key object, and takes the new value.
    pub(crate) fn insert(&mut self, key: Literal, value: Literal) {
        match self.0.iter_mut().find(|(k, _)| k.key_eq(&key)) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((key, value)),
        }
    }
}
