//! Structured diagnostics for NoC routing and placement.
//!
//! Routing failures, cost-drift reports and run summaries are emitted as
//! [`Diagnostic`] values into a shared [`DiagnosticSink`] instead of being
//! printed, so callers decide how (and whether) to render them. The
//! [`TerminalRenderer`] produces the human-readable form.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::{Diagnostic, Severity};
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use sink::DiagnosticSink;
