//! Diagnostic creation, severity management, and terminal rendering.
//!
//! Mapping problems that the operator has to act on (a unit that cannot be
//! partitioned, a filter the firmware cannot run) are reported as structured
//! [`Diagnostic`]s with stable codes. The thread-safe [`DiagnosticSink`]
//! accumulates them over a compile pass and [`TerminalRenderer`] formats them.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
