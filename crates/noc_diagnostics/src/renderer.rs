//! Rendering of diagnostics into text.

use crate::diagnostic::Diagnostic;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-like terminal format:
///
/// ```text
/// warning[K002]: NoC latency cost drifted from its recomputed value
///    = note: incremental 1.2e-9, recomputed 1.1e-9
///    = help: ...
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in the header line.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn header(&self, diag: &Diagnostic) -> String {
        let label = format!("{}[{}]", diag.severity, diag.code);
        if !self.color {
            return label;
        }
        let color = match diag.severity {
            crate::Severity::Error => "31",
            crate::Severity::Warning => "33",
            crate::Severity::Note => "36",
        };
        format!("\x1b[1;{color}m{label}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = format!("{}: {}\n", self.header(diag), diag.message);
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};

    #[test]
    fn render_plain() {
        let diag = Diagnostic::warning(
            DiagnosticCode::new(Category::Cost, 2),
            "latency cost drifted",
        )
        .with_note("incremental 3, recomputed 2")
        .with_help("check the reroute bookkeeping");
        let out = TerminalRenderer::new(false).render(&diag);
        assert!(out.starts_with("warning[K002]: latency cost drifted\n"));
        assert!(out.contains("   = note: incremental 3, recomputed 2\n"));
        assert!(out.contains("   = help: check the reroute bookkeeping\n"));
    }

    #[test]
    fn render_colored_header() {
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Routing, 1), "unroutable");
        let out = TerminalRenderer::new(true).render(&diag);
        assert!(out.starts_with("\x1b[1;31merror[R001]\x1b[0m: unroutable"));
    }
}
