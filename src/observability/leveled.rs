//! Leveled logging calls on top of `tracing`.
//!
//! `tracing` exposes macros, not methods. Components that need a logger
//! *value* (the consensus engine being the main one) get a [`LeveledLogger`]
//! instead: six severities, each with a variadic form and a format form.

use std::fmt::{self, Display};

/// A logger with leveled, variadic and formatted calls.
///
/// The variadic forms receive their operands untouched; how they are joined
/// is up to the implementation. `fatal*` terminates the process and `panic*`
/// unwinds, so neither returns.
pub trait LeveledLogger: Send + Sync {
    fn debug(&self, v: &[&dyn Display]);
    fn debugf(&self, args: fmt::Arguments<'_>);

    fn info(&self, v: &[&dyn Display]);
    fn infof(&self, args: fmt::Arguments<'_>);

    fn warn(&self, v: &[&dyn Display]);
    fn warnf(&self, args: fmt::Arguments<'_>);

    fn error(&self, v: &[&dyn Display]);
    fn errorf(&self, args: fmt::Arguments<'_>);

    fn fatal(&self, v: &[&dyn Display]) -> !;
    fn fatalf(&self, args: fmt::Arguments<'_>) -> !;

    fn panic(&self, v: &[&dyn Display]) -> !;
    fn panicf(&self, args: fmt::Arguments<'_>) -> !;
}

/// Join variadic operands with single spaces.
pub fn sprint(v: &[&dyn Display]) -> String {
    let mut out = String::new();
    for (i, operand) in v.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&operand.to_string());
    }
    out
}

/// [`LeveledLogger`] that emits `tracing` events under the `raft` target.
///
/// Events go through whatever subscriber is current, so they share the
/// process log stream, filter and file rotation.
#[derive(Debug, Clone, Copy)]
pub struct TracingLogger {
    component: &'static str,
}

impl TracingLogger {
    /// Create a logger tagging every event with `component`.
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    /// Component name attached to every event.
    pub fn component(&self) -> &'static str {
        self.component
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new("raft")
    }
}

impl LeveledLogger for TracingLogger {
    fn debug(&self, v: &[&dyn Display]) {
        tracing::debug!(target: "raft", component = self.component, "{}", sprint(v));
    }

    fn debugf(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(target: "raft", component = self.component, "{}", args);
    }

    fn info(&self, v: &[&dyn Display]) {
        tracing::info!(target: "raft", component = self.component, "{}", sprint(v));
    }

    fn infof(&self, args: fmt::Arguments<'_>) {
        tracing::info!(target: "raft", component = self.component, "{}", args);
    }

    fn warn(&self, v: &[&dyn Display]) {
        tracing::warn!(target: "raft", component = self.component, "{}", sprint(v));
    }

    fn warnf(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(target: "raft", component = self.component, "{}", args);
    }

    fn error(&self, v: &[&dyn Display]) {
        tracing::error!(target: "raft", component = self.component, "{}", sprint(v));
    }

    fn errorf(&self, args: fmt::Arguments<'_>) {
        tracing::error!(target: "raft", component = self.component, "{}", args);
    }

    fn fatal(&self, v: &[&dyn Display]) -> ! {
        self.fatalf(format_args!("{}", sprint(v)))
    }

    fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        tracing::error!(target: "raft", component = self.component, fatal = true, "{}", args);
        std::process::exit(1)
    }

    fn panic(&self, v: &[&dyn Display]) -> ! {
        self.panicf(format_args!("{}", sprint(v)))
    }

    fn panicf(&self, args: fmt::Arguments<'_>) -> ! {
        let message = args.to_string();
        tracing::error!(target: "raft", component = self.component, panic = true, "{}", message);
        panic!("{message}")
    }
}
