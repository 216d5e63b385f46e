//! Tests for Python-style serde aliases on `Literal` variants.

use kwinject::{InjectOptions, Literal};
use pretty_assertions::assert_eq;

#[test]
fn json_deserialize_python_style_primitive_aliases() {
    let string: Literal = serde_json::from_str(r#"{"str":"hello"}"#).unwrap();
    let bool_val: Literal = serde_json::from_str(r#"{"bool":true}"#).unwrap();
    let int: Literal = serde_json::from_str(r#"{"int":42}"#).unwrap();
    let float: Literal = serde_json::from_str(r#"{"float":2.5}"#).unwrap();
    let none: Literal = serde_json::from_str(r#""NoneType""#).unwrap();

    assert_eq!(string, Literal::String("hello".to_owned()));
    assert_eq!(bool_val, Literal::Bool(true));
    assert_eq!(int, Literal::Int(42));
    assert_eq!(float, Literal::Float(2.5));
    assert_eq!(none, Literal::None);
}

#[test]
fn json_deserialize_python_style_container_aliases() {
    let list: Literal = serde_json::from_str(r#"{"list":[{"int":1},{"str":"two"}]}"#).unwrap();
    assert_eq!(
        list,
        Literal::List(vec![Literal::Int(1), Literal::String("two".to_owned())])
    );

    let tuple: Literal = serde_json::from_str(r#"{"tuple":[{"bool":false}]}"#).unwrap();
    assert_eq!(tuple, Literal::Tuple(vec![Literal::Bool(false)]));

    let dict: Literal = serde_json::from_str(r#"{"dict":[[{"str":"k"},{"int":3}]]}"#).unwrap();
    assert_eq!(dict.py_repr(), "{'k': 3}");
}

#[test]
fn json_serialize_uses_variant_names() {
    let value = Literal::List(vec![Literal::Int(1), Literal::None]);
    let json = serde_json::to_string(&value).unwrap();
    assert_eq!(json, r#"{"List":[{"Int":1},"None"]}"#);
    let back: Literal = serde_json::from_str(&json).unwrap();
    assert_eq!(back, value);
}

#[test]
fn options_load_with_defaults() {
    let options: InjectOptions = serde_json::from_str(r#"{"max_nesting_depth": 8}"#).unwrap();
    assert_eq!(options, InjectOptions::new().max_nesting_depth(Some(8)));
    assert!(options.normalize_whitespace);
    assert_eq!(options.nesting_limit(), 8);

    let options: InjectOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(options, InjectOptions::default());
    assert_eq!(options.nesting_limit(), kwinject::MAX_NESTING_DEPTH);
}
