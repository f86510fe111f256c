//! Non-fatal compile-time notes.
//!
//! The passes report events a user may want to know about but that do not
//! stop compilation: a constant folded away, an int-to-float coercion
//! inserted, an alias that refers to itself.
//!
//! # Usage
//!
//! Each compilation owns one [`DiagnosticsCollector`] (held by the
//! validator). It is disabled by default:
//! - `DiagnosticsCollector::enable()` - start collecting
//! - `DiagnosticsCollector::take()` - retrieve and clear collected notes
//!
//! Debug builds also honor `SOLID_TRACE=1`, which writes one line per pass
//! to stderr.

#[cfg(debug_assertions)]
use std::sync::OnceLock;

use solid_parser::Span;

/// What a diagnostic reports
#[derive(Clone, Debug, PartialEq)]
pub enum DiagnosticReason {
    /// An expression was replaced by its value.
    /// Contains the rendered value.
    ConstantFolded(String),

    /// An int operand was widened to float.
    CoercionInserted,

    /// A type alias refers to itself.
    /// Contains the alias name.
    RecursiveAlias(String),
}

impl std::fmt::Display for DiagnosticReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticReason::ConstantFolded(value) => write!(f, "folded to constant {}", value),
            DiagnosticReason::CoercionInserted => write!(f, "int converted to float"),
            DiagnosticReason::RecursiveAlias(name) => {
                write!(f, "type alias '{}' is recursive", name)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub reason: DiagnosticReason,
    /// (line, column) of the node concerned
    pub location: Option<(usize, usize)>,
}

impl Diagnostic {
    pub fn new(reason: DiagnosticReason) -> Self {
        Self {
            reason,
            location: None,
        }
    }

    pub fn with_location(mut self, span: &Span) -> Self {
        self.location = Some((span.line(), span.column()));
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "note: {}", self.reason)?;
        if let Some((line, col)) = self.location {
            write!(f, " at line {}, column {}", line, col)?;
        }
        Ok(())
    }
}

/// Per-compilation store of [`Diagnostic`]s
#[derive(Debug, Default)]
pub struct DiagnosticsCollector {
    enabled: bool,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticsCollector {
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Record a diagnostic; dropped while disabled
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if self.enabled {
            self.diagnostics.push(diagnostic);
        }
    }

    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn count(&self) -> usize {
        self.diagnostics.len()
    }
}

#[cfg(debug_assertions)]
fn solid_trace_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var("SOLID_TRACE").is_ok_and(|v| v == "1"))
}

#[cfg(debug_assertions)]
pub(crate) fn solid_trace_log(args: std::fmt::Arguments<'_>) {
    if solid_trace_enabled() {
        use std::io::Write;
        let _ = writeln!(std::io::stderr(), "{args}");
    }
}

#[cfg(not(debug_assertions))]
pub(crate) fn solid_trace_log(_args: std::fmt::Arguments<'_>) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_collector_drops_notes() {
        let mut collector = DiagnosticsCollector::default();
        collector.emit(Diagnostic::new(DiagnosticReason::CoercionInserted));
        assert_eq!(collector.count(), 0);

        collector.enable();
        collector.emit(Diagnostic::new(DiagnosticReason::CoercionInserted));
        assert_eq!(collector.take().len(), 1);
        assert_eq!(collector.count(), 0);
    }

    #[test]
    fn test_display() {
        let note = Diagnostic::new(DiagnosticReason::RecursiveAlias("List".into()))
            .with_location(&Span::new(0, 4, 3, 3, 6, 10));
        assert_eq!(
            note.to_string(),
            "note: type alias 'List' is recursive at line 3, column 6"
        );
    }
}
