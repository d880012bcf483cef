//! Session observability.
//!
//! Trait-based tracing for the embedding session, monomorphized so the
//! default [`NoopTracer`] compiles away entirely. Concrete implementations
//! collect different kinds of data:
//!
//! | Tracer | Purpose |
//! |--------|---------|
//! | [`NoopTracer`] | Zero-cost no-op (production default) |
//! | [`StderrTracer`] | Human-readable session log to stderr |
//! | [`RecordingTracer`] | Full event recording for assertions or post-mortem |
//!
//! Script errors reported by the embedding (message plus optional line
//! number) are routed through [`SessionTracer::on_script_error`]; this is the
//! crate's logging story.

use std::time::Duration;

use crate::session::TimerId;

/// Trace event emitted by a session.
///
/// Used by [`RecordingTracer`] to capture what the session did, in order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SessionTrace {
    /// A script was loaded.
    Load {
        /// Length of the loaded script text in bytes.
        bytes: usize,
    },
    /// The session was stopped.
    Stop,
    /// A timer was scheduled.
    TimerSet {
        /// The scheduled timer.
        timer: TimerId,
        /// The requested delay.
        delay: Duration,
    },
    /// A timer event was consumed from the queue.
    TimerFired {
        /// The timer that fired.
        timer: TimerId,
    },
    /// The embedding reported a script error.
    ScriptError {
        /// The error message.
        message: String,
        /// Source line, when the engine provides one.
        line: Option<u32>,
    },
}

/// Trait for session tracing.
///
/// All methods have default no-op implementations, so [`NoopTracer`] requires
/// zero lines of code and compiles to zero instructions: the session carries
/// the tracer as a type parameter and the compiler inlines unused hooks away.
pub trait SessionTracer: std::fmt::Debug {
    /// Called after a non-empty script is loaded.
    #[inline(always)]
    fn on_load(&mut self, _script: &str) {}

    /// Called when a running session is stopped.
    #[inline(always)]
    fn on_stop(&mut self) {}

    /// Called when a timer is scheduled.
    #[inline(always)]
    fn on_timer_set(&mut self, _timer: TimerId, _delay: Duration) {}

    /// Called when a timer's event is consumed from the queue.
    #[inline(always)]
    fn on_timer_fired(&mut self, _timer: TimerId) {}

    /// Called when the embedding reports a script error.
    ///
    /// # Arguments
    /// * `message` - The engine's error message
    /// * `line` - Source line number, when the engine provides one
    #[inline(always)]
    fn on_script_error(&mut self, _message: &str, _line: Option<u32>) {}
}

/// A tracer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl SessionTracer for NoopTracer {}

/// Tracer that prints a human-readable session log to stderr.
///
/// Script errors use the host log format:
/// `script error: <message> (line <n>)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrTracer;

impl StderrTracer {
    /// Creates a new stderr tracer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SessionTracer for StderrTracer {
    fn on_load(&mut self, script: &str) {
        eprintln!("script loaded ({} bytes)", script.len());
    }

    fn on_stop(&mut self) {
        eprintln!("session stopped");
    }

    fn on_timer_set(&mut self, timer: TimerId, delay: Duration) {
        eprintln!("timer #{} set for {delay:?}", timer.raw());
    }

    fn on_timer_fired(&mut self, timer: TimerId) {
        eprintln!("timer #{} fired", timer.raw());
    }

    fn on_script_error(&mut self, message: &str, line: Option<u32>) {
        match line {
            Some(line) => eprintln!("script error: {message} (line {line})"),
            None => eprintln!("script error: {message}"),
        }
    }
}

/// Tracer that records every event for later inspection.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    events: Vec<SessionTrace>,
}

impl RecordingTracer {
    /// Creates an empty recording tracer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded events, in order.
    #[must_use]
    pub fn events(&self) -> &[SessionTrace] {
        &self.events
    }

    /// Consumes the recorded events, leaving the tracer empty.
    pub fn take_events(&mut self) -> Vec<SessionTrace> {
        std::mem::take(&mut self.events)
    }
}

impl SessionTracer for RecordingTracer {
    fn on_load(&mut self, script: &str) {
        self.events.push(SessionTrace::Load { bytes: script.len() });
    }

    fn on_stop(&mut self) {
        self.events.push(SessionTrace::Stop);
    }

    fn on_timer_set(&mut self, timer: TimerId, delay: Duration) {
        self.events.push(SessionTrace::TimerSet { timer, delay });
    }

    fn on_timer_fired(&mut self, timer: TimerId) {
        self.events.push(SessionTrace::TimerFired { timer });
    }

    fn on_script_error(&mut self, message: &str, line: Option<u32>) {
        self.events.push(SessionTrace::ScriptError {
            message: message.to_owned(),
            line,
        });
    }
}
