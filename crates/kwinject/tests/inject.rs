use kwinject::{InjectError, InjectOptions, Injector, Literal, ParamSpace, ParseError, SegmentError, inject};
use pretty_assertions::assert_eq;

fn build_space() -> ParamSpace {
    ParamSpace::new()
        .with("build", "lr", Literal::Float(0.01))
        .with("build", "momentum", Literal::Float(0.9))
}

#[test]
fn rewrites_the_documented_example() {
    let out = inject("model = build(lr=0.1)\n", &build_space()).unwrap();
    assert_eq!(out, "model = build(lr=0.01, momentum=0.9)\n");
}

#[test]
fn other_calls_pass_through() {
    let code = "import torch\nx = load(path, mode='r')\nprint(x)\n";
    assert_eq!(inject(code, &build_space()).unwrap(), code);
}

#[test]
fn identifier_boundary_is_respected() {
    let code = "a = rebuild(lr=1.0)\nb = model.build(x)\n";
    assert_eq!(
        inject(code, &build_space()).unwrap(),
        "a = rebuild(lr=1.0)\nb = model.build(x, lr=0.01, momentum=0.9)\n"
    );
}

#[test]
fn multi_line_call_is_joined_and_rewritten() {
    let code = "model = build(\n    x,\n    lr=0.1,\n)\nfit(model)\n";
    assert_eq!(
        inject(code, &build_space()).unwrap(),
        "model = build(x, lr=0.01, momentum=0.9)\nfit(model)\n"
    );
}

#[test]
fn each_function_is_rewritten_in_space_order() {
    let space = ParamSpace::new()
        .with("Net", "layers", Literal::List(vec![Literal::Int(32)]))
        .with("SGD", "lr", Literal::Float(0.5));
    let code = "opt = SGD(Net(layers=[64], act='relu'), lr=0.1)\n";
    // the outer call is parsed after the inner rewrite, so `Net(...)` makes it unsupported
    let err = inject(code, &space).unwrap_err();
    assert!(matches!(
        &err,
        InjectError::Parse {
            function,
            source: ParseError::NotSupported { .. },
            ..
        } if function == "SGD"
    ));

    let code = "net = Net(layers=[64], act='relu'); opt = SGD(params, lr=0.1)\n";
    assert_eq!(
        inject(code, &space).unwrap(),
        "net = Net(layers=[32], act='relu'); opt = SGD(params, lr=0.5)\n"
    );
}

#[test]
fn only_the_first_call_in_a_statement_is_rewritten() {
    let space = ParamSpace::new().with("f", "a", Literal::Int(1));
    assert_eq!(inject("y = f() + f()\n", &space).unwrap(), "y = f(a=1) + f()\n");
}

#[test]
fn unsupported_arguments_fail_with_context() {
    let err = inject("model = build(*args)\n", &build_space()).unwrap_err();
    let InjectError::Parse {
        function,
        statement,
        source,
    } = &err
    else {
        panic!("expected parse error, got {err:?}");
    };
    assert_eq!(function, "build");
    assert_eq!(statement, "model = build(*args)");
    assert!(matches!(source, ParseError::NotSupported { .. }));
    assert!(err.to_string().starts_with("cannot rewrite call to `build` in `model = build(*args)`"));
}

#[test]
fn malformed_nesting_is_reported() {
    let err = inject("x = build(\n", &build_space()).unwrap_err();
    assert_eq!(err, InjectError::Segment(SegmentError::Unclosed { depth: 1, start_line: 1 }));
}

#[test]
fn output_is_newline_terminated_per_statement() {
    let space = ParamSpace::new();
    assert_eq!(inject("a = 1\n\nb = 2", &space).unwrap(), "a = 1\n\nb = 2\n");
    assert_eq!(inject("", &space).unwrap(), "");
}

#[test]
fn whitespace_normalization_can_be_disabled() {
    let code = "y = g( a )\n";
    let space = ParamSpace::new();
    assert_eq!(inject(code, &space).unwrap(), "y = g(a)\n");
    let mut injector = Injector::new(&space).with_options(InjectOptions::new().normalize_whitespace(false));
    assert!(!injector.options().normalize_whitespace);
    assert_eq!(injector.inject(code).unwrap(), code);
}

#[test]
fn nesting_limit_is_configurable() {
    let space = ParamSpace::new().with("f", "a", Literal::Int(1));
    let code = "f(b=[[[1]]])\n";
    assert_eq!(inject(code, &space).unwrap(), "f(b=[[[1]]], a=1)\n");

    assert_eq!(Injector::new(&space).options(), &InjectOptions::default());
    let mut injector = Injector::new(&space).with_options(InjectOptions::new().max_nesting_depth(Some(2)));
    assert_eq!(injector.options().nesting_limit(), 2);
    let err = injector.inject(code).unwrap_err();
    assert!(matches!(
        err,
        InjectError::Parse {
            source: ParseError::NestingTooDeep { limit: 2, .. },
            ..
        }
    ));
}

/// Injecting twice gives the same result as injecting once.
fn assert_idempotent(code: &str, space: &ParamSpace) {
    let once = inject(code, space).unwrap();
    let twice = inject(&once, space).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn idempotent_for_numeric_values() {
    let space = ParamSpace::new()
        .with("fit", "epochs", Literal::Int(10))
        .with("fit", "lr", Literal::Float(1e-5))
        .with("fit", "scale", Literal::Float(-2.5));
    assert_idempotent("fit(model, epochs=3)\n", &space);
}

#[test]
fn idempotent_for_string_values() {
    let space = ParamSpace::new()
        .with("opt", "name", Literal::from("adam"))
        .with("opt", "note", Literal::from("it's \"fine\""));
    assert_idempotent("o = opt(name='sgd')\n", &space);
}

#[test]
fn idempotent_for_list_values() {
    let space = ParamSpace::new().with(
        "Net",
        "layers",
        Literal::List(vec![Literal::Int(64), Literal::Int(32), Literal::Float(0.5)]),
    );
    assert_idempotent("net = Net(x, layers=[1])\n", &space);
}

#[test]
fn idempotent_for_mapping_values() {
    let space =
        ParamSpace::from_literal("{'Net': {'cfg': {'act': 'relu', 'sizes': (1, 2), 'flags': {1, 2}}}}").unwrap();
    assert_idempotent("net = Net(\n    cfg={},\n)\n", &space);
}
