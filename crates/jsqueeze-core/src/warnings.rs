//! Advisory diagnostics raised while compressing.
//!
//! Warnings never change the output tree. They are handed to a
//! [`WarningSink`] chosen by the caller; the library ships three sinks.

use std::fmt;

use crate::ast::Pos;

/// A diagnostic: a message template plus the source position it refers to.
///
/// Templates use the named placeholders `{line}` and `{col}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub template: &'static str,
    pub pos: Pos,
}

impl Warning {
    pub const CONDITION_ALWAYS_TRUE: &'static str = "Condition always true [{line},{col}]";
    pub const CONDITION_ALWAYS_FALSE: &'static str = "Condition always false [{line},{col}]";
    pub const UNREACHABLE_CODE: &'static str = "Unreachable code [{line},{col}]";
    pub const DECLARATIONS_IN_UNREACHABLE_CODE: &'static str =
        "Declarations in unreachable code! [{line},{col}]";
    pub const AND_ALWAYS_FALSE: &'static str = "Boolean && always false [{line},{col}]";
    pub const OR_ALWAYS_TRUE: &'static str = "Boolean || always true [{line},{col}]";
    pub const PLUS_ALWAYS_TRUE: &'static str = "+ in boolean context always true [{line},{col}]";
    pub const BOOLEAN_ALWAYS_TRUE: &'static str = "Boolean expression always true [{line},{col}]";

    pub fn new(template: &'static str, pos: Pos) -> Self {
        Self { template, pos }
    }

    /// The template with its placeholders filled in.
    pub fn message(&self) -> String {
        self.template
            .replace("{line}", &self.pos.line.to_string())
            .replace("{col}", &self.pos.col.to_string())
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Receiver for compressor warnings.
pub trait WarningSink {
    fn warn(&mut self, warning: Warning);
}

/// Collects warnings in order.
impl WarningSink for Vec<Warning> {
    fn warn(&mut self, warning: Warning) {
        self.push(warning);
    }
}

/// Forwards warnings to `tracing` at WARN level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&mut self, warning: Warning) {
        tracing::warn!(line = warning.pos.line, col = warning.pos.col, "{}", warning.message());
    }
}

/// Discards every warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl WarningSink for NullSink {
    fn warn(&mut self, _warning: Warning) {}
}
