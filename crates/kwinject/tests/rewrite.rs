use kwinject::{CallArg, Literal, Overrides, parse_call, rewrite_args};
use pretty_assertions::assert_eq;

fn overrides(pairs: &[(&str, Literal)]) -> Overrides {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), v.clone())).collect()
}

#[test]
fn override_in_place_and_append_missing() {
    let args = [CallArg::positional("x"), CallArg::keyword("lr", 0.1)];
    let o = overrides(&[("lr", Literal::Float(0.01)), ("momentum", Literal::Float(0.9))]);
    assert_eq!(rewrite_args(&args, &o), "x, lr=0.01, momentum=0.9");
}

#[test]
fn untouched_keywords_are_re_rendered() {
    let args = parse_call("f(a, opt='adam', layers=[64,64], d={'k':1})").unwrap();
    assert_eq!(
        rewrite_args(&args, &Overrides::new()),
        "a, opt='adam', layers=[64, 64], d={'k': 1}"
    );
}

#[test]
fn overridden_keyword_keeps_its_position() {
    let args = parse_call("f(a=1, b=2, c=3)").unwrap();
    let o = overrides(&[("d", Literal::Int(4)), ("b", Literal::from("two"))]);
    assert_eq!(rewrite_args(&args, &o), "a=1, b='two', c=3, d=4");
}

#[test]
fn appended_overrides_follow_map_order() {
    let o = overrides(&[("z", Literal::Int(1)), ("a", Literal::Int(2)), ("m", Literal::Int(3))]);
    assert_eq!(rewrite_args(&[], &o), "z=1, a=2, m=3");
}

#[test]
fn values_render_as_python_literals() {
    let o = overrides(&[
        ("s", Literal::from("it's")),
        ("n", Literal::None),
        ("t", Literal::Tuple(vec![Literal::Int(1)])),
        ("p", Literal::Repr("fn__p".to_owned())),
    ]);
    assert_eq!(rewrite_args(&[], &o), "s=\"it's\", n=None, t=(1,), p=fn__p");
}
