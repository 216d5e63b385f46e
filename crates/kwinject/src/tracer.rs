//! Injection tracing.
//!
//! The [`Injector`](crate::Injector) is generic over an [`InjectTracer`], so
//! the default [`NoopTracer`] compiles away entirely. Other tracers observe
//! the same hook points:
//!
//! | Tracer | Purpose |
//! |--------|---------|
//! | [`NoopTracer`] | No-op (default) |
//! | [`StderrTracer`] | Human-readable log to stderr |
//! | [`RecordingTracer`] | Collects [`TraceEvent`]s for later inspection |
//!
//! ```
//! use kwinject::{Injector, Literal, ParamSpace, RecordingTracer, TraceEvent};
//!
//! let space = ParamSpace::new().with("build", "lr", Literal::Float(0.01));
//! let mut injector = Injector::new(&space).with_tracer(RecordingTracer::new());
//! injector.inject("m = build(lr=0.1)\n").unwrap();
//! assert!(matches!(injector.tracer().events()[1], TraceEvent::CallSite { .. }));
//! ```

/// Event captured by [`RecordingTracer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A logical statement was produced by the segmenter.
    Statement {
        /// Zero-based statement index.
        index: usize,
        text: String,
    },
    /// A call to a target function was found in a statement.
    CallSite {
        function: String,
        /// Zero-based statement index.
        statement: usize,
        /// Byte offsets of the call's `(` and `)` in the statement.
        open: usize,
        close: usize,
    },
    /// A call's argument list was replaced.
    Rewrite {
        function: String,
        before: String,
        after: String,
    },
}

/// Hooks invoked while an [`Injector`](crate::Injector) runs.
///
/// All methods default to no-ops; implementations override what they need.
pub trait InjectTracer: std::fmt::Debug {
    /// Called once per logical statement, before any rewriting.
    #[inline(always)]
    fn on_statement(&mut self, _index: usize, _text: &str) {}

    /// Called when a call to `function` is located in statement `statement`.
    #[inline(always)]
    fn on_call_site(&mut self, _function: &str, _statement: usize, _open: usize, _close: usize) {}

    /// Called with the argument text before and after rewriting.
    #[inline(always)]
    fn on_rewrite(&mut self, _function: &str, _before: &str, _after: &str) {}
}

/// A tracer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl InjectTracer for NoopTracer {}

/// Tracer that prints a human-readable log to stderr.
///
/// Output format:
/// ```text
/// [   0] model = build(lr=0.1)
///   >>> build                open=13 close=20
///   --- lr=0.1
///   +++ lr=0.01, momentum=0.9
/// ```
#[derive(Debug)]
pub struct StderrTracer {
    /// Maximum number of lines to print before going quiet. None = unlimited.
    limit: Option<usize>,
    count: usize,
    stopped: bool,
}

impl StderrTracer {
    /// Creates a new stderr tracer with no line limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            limit: None,
            count: 0,
            stopped: false,
        }
    }

    /// Creates a new stderr tracer that stops after `limit` lines.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            count: 0,
            stopped: false,
        }
    }

    fn emit(&mut self, line: &str) {
        if self.stopped {
            return;
        }
        eprintln!("{line}");
        self.count += 1;
        if let Some(limit) = self.limit
            && self.count >= limit
        {
            eprintln!("--- trace limit reached ({limit} lines) ---");
            self.stopped = true;
        }
    }
}

impl Default for StderrTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl InjectTracer for StderrTracer {
    fn on_statement(&mut self, index: usize, text: &str) {
        self.emit(&format!("[{index:>4}] {text}"));
    }

    fn on_call_site(&mut self, function: &str, _statement: usize, open: usize, close: usize) {
        self.emit(&format!("  >>> {function:<20} open={open} close={close}"));
    }

    fn on_rewrite(&mut self, _function: &str, before: &str, after: &str) {
        self.emit(&format!("  --- {before}"));
        self.emit(&format!("  +++ {after}"));
    }
}

/// Tracer that records every event in order.
#[derive(Debug)]
pub struct RecordingTracer {
    events: Vec<TraceEvent>,
    /// Optional limit on number of events recorded.
    limit: Option<usize>,
}

impl RecordingTracer {
    /// Creates a new recording tracer with no event limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            limit: None,
        }
    }

    /// Creates a new recording tracer that stops recording after `limit` events.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            events: Vec::with_capacity(limit.min(1024)),
            limit: Some(limit),
        }
    }

    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }

    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    fn record(&mut self, event: TraceEvent) {
        if !self.limit.is_some_and(|l| self.events.len() >= l) {
            self.events.push(event);
        }
    }
}

impl Default for RecordingTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl InjectTracer for RecordingTracer {
    fn on_statement(&mut self, index: usize, text: &str) {
        self.record(TraceEvent::Statement {
            index,
            text: text.to_owned(),
        });
    }

    fn on_call_site(&mut self, function: &str, statement: usize, open: usize, close: usize) {
        self.record(TraceEvent::CallSite {
            function: function.to_owned(),
            statement,
            open,
            close,
        });
    }

    fn on_rewrite(&mut self, function: &str, before: &str, after: &str) {
        self.record(TraceEvent::Rewrite {
            function: function.to_owned(),
            before: before.to_owned(),
            after: after.to_owned(),
        });
    }
}
