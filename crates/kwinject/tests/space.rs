use kwinject::{Literal, ParamSpace, SpaceError, inject};
use pretty_assertions::assert_eq;

#[test]
fn json_object_order_is_kept() {
    let space = ParamSpace::from_json_str(r#"{"zeta": {"b": 1, "a": 2.5}, "alpha": {"opt": "adam"}}"#).unwrap();
    assert_eq!(space.functions().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    let zeta = space.get("zeta").unwrap();
    assert_eq!(zeta.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    assert_eq!(zeta["a"], Literal::Float(2.5));
    assert_eq!(space.get("alpha").unwrap()["opt"], Literal::from("adam"));
}

#[test]
fn json_values_map_to_literals() {
    let space = ParamSpace::from_json_str(r#"{"f": {"xs": [1, null, true], "cfg": {"k": "v"}}}"#).unwrap();
    let f = space.get("f").unwrap();
    assert_eq!(f["xs"].py_repr(), "[1, None, True]");
    assert_eq!(f["cfg"].py_repr(), "{'k': 'v'}");
}

#[test]
fn python_literal_space() {
    let space =
        ParamSpace::from_literal("{'nn.Linear': {'bias': False, 'shape': (3, 4)}, 'SGD': {'lr': 1e-3}}").unwrap();
    assert_eq!(space.len(), 2);
    assert_eq!(space.get("nn.Linear").unwrap()["shape"].py_repr(), "(3, 4)");
    assert_eq!(space.get("SGD").unwrap()["lr"], Literal::Float(0.001));
}

#[test]
fn bad_shapes_are_rejected() {
    assert!(matches!(ParamSpace::from_json_str("[1, 2]"), Err(SpaceError::Shape(_))));
    assert!(matches!(ParamSpace::from_json_str(r#"{"f": 1}"#), Err(SpaceError::Shape(_))));
    assert!(matches!(ParamSpace::from_json_str(r#"{"f(": {}}"#), Err(SpaceError::Shape(_))));
    assert!(matches!(ParamSpace::from_json_str(r#"{"f": {"not a name": 1}}"#), Err(SpaceError::Shape(_))));
    assert!(matches!(ParamSpace::from_json_str("{"), Err(SpaceError::Json(_))));
    assert!(matches!(ParamSpace::from_literal("{'f': {1: 2}}"), Err(SpaceError::Shape(_))));
    assert!(matches!(ParamSpace::from_literal("{'f': x}"), Err(SpaceError::Literal(_))));
}

#[test]
fn keyword_parameter_names_are_rejected() {
    let err = ParamSpace::from_json_str(r#"{"build": {"class": 1, "lambda": 2}}"#).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid parameter space: `class` is a keyword and cannot name a parameter"
    );
    assert!(matches!(ParamSpace::from_literal("{'f': {'if': 1}}"), Err(SpaceError::Shape(_))));
    assert!(matches!(ParamSpace::from_literal("{'f': {'None': 1}}"), Err(SpaceError::Shape(_))));
    assert!(ParamSpace::from_json_str(r#"{"f": {"match": 1}}"#).is_ok());
}

#[test]
fn shape_errors_explain_themselves() {
    let err = ParamSpace::from_json_str(r#"{"f": 1}"#).unwrap_err();
    assert_eq!(err.to_string(), "invalid parameter space: parameters of `f` must be an object");
}

#[test]
fn insert_replaces_and_returns_previous() {
    let mut space = ParamSpace::new();
    assert_eq!(space.insert("f", "a", 1_i64), None);
    assert_eq!(space.insert("f", "a", 2_i64), Some(Literal::Int(1)));
    assert_eq!(space.get("f").unwrap().len(), 1);
    assert!(space.get("g").is_none());
    assert!(!space.is_empty());
}

#[test]
fn placeholders_name_every_parameter() {
    let space = ParamSpace::new()
        .with("SGD", "lr", Literal::Float(0.1))
        .with("SGD", "momentum", Literal::Float(0.9))
        .with("nn.Dropout", "p", Literal::Float(0.5));
    let placeholders = space.placeholders();
    assert_eq!(placeholders.get("SGD").unwrap()["lr"].py_repr(), "sgd__lr");
    assert_eq!(placeholders.get("nn.Dropout").unwrap()["p"].py_repr(), "nn_dropout__p");

    let code = "opt = SGD(params, lr=1.0)\ndrop = nn.Dropout(p=0.1)\n";
    assert_eq!(
        inject(code, &placeholders).unwrap(),
        "opt = SGD(params, lr=sgd__lr, momentum=sgd__momentum)\ndrop = nn.Dropout(p=nn_dropout__p)\n"
    );
}
