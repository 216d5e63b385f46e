#![doc = include_str!("../../../README.md")]

mod delimiter;
mod inject;
mod lexer;
mod literal;
mod options;
mod parse;
mod repr;
mod rewrite;
mod segment;
mod space;
pub mod tracer;

pub use crate::{
    delimiter::{Delimiter, DelimiterError, match_delimiter},
    inject::{InjectError, Injector, inject},
    literal::{ConversionError, DictPairs, Literal},
    options::InjectOptions,
    parse::{CallArg, CodeRange, MAX_NESTING_DEPTH, ParseError, parse_call, parse_literal},
    rewrite::rewrite_args,
    segment::{SegmentError, segment},
    space::{Overrides, ParamSpace, SpaceError},
    tracer::{InjectTracer, NoopTracer, RecordingTracer, StderrTracer, TraceEvent},
};
