use kwinject::{Injector, Literal, NoopTracer, ParamSpace, RecordingTracer, StderrTracer, TraceEvent};
use pretty_assertions::assert_eq;

fn space() -> ParamSpace {
    ParamSpace::new().with("build", "lr", Literal::Float(0.01))
}

#[test]
fn recording_tracer_sees_every_step() {
    let space = space();
    let mut injector = Injector::new(&space).with_tracer(RecordingTracer::new());
    injector.inject("x = 1\nm = build(lr=0.1)\n").unwrap();
    assert_eq!(
        injector.into_tracer().into_events(),
        vec![
            TraceEvent::Statement {
                index: 0,
                text: "x = 1".to_owned(),
            },
            TraceEvent::Statement {
                index: 1,
                text: "m = build(lr=0.1)".to_owned(),
            },
            TraceEvent::CallSite {
                function: "build".to_owned(),
                statement: 1,
                open: 9,
                close: 16,
            },
            TraceEvent::Rewrite {
                function: "build".to_owned(),
                before: "lr=0.1".to_owned(),
                after: "lr=0.01".to_owned(),
            },
        ]
    );
}

#[test]
fn recording_tracer_respects_limit() {
    let space = space();
    let mut injector = Injector::new(&space).with_tracer(RecordingTracer::with_limit(2));
    injector.inject("a = 1\nb = 2\nc = build()\n").unwrap();
    assert_eq!(injector.tracer().event_count(), 2);
}

#[test]
fn other_tracers_do_not_change_output() {
    let space = space();
    let code = "m = build(lr=0.1)\n";
    let plain = Injector::new(&space).with_tracer(NoopTracer).inject(code).unwrap();
    let traced = Injector::new(&space)
        .with_tracer(StderrTracer::with_limit(1))
        .inject(code)
        .unwrap();
    assert_eq!(plain, traced);
    assert_eq!(plain, "m = build(lr=0.01)\n");
}
