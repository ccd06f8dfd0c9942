//! Diagnostics for the definition compiler.
//!
//! Nothing in the pipeline aborts on a bad document. Every stage appends
//! [`Diagnostic`]s to a [`Diagnostics`] collector and keeps going with
//! whatever is still valid.

use std::fmt;

use serde::Serialize;

/// A single problem found while compiling a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub document: String,
    pub line: usize,
    pub col: usize,
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// Malformed token.
    Lexical,
    /// Structural violation of the grammar.
    Syntax,
    /// Valid syntax, invalid meaning.
    Semantic,
    /// Suspicious but accepted input.
    Lint,
}

impl DiagnosticKind {
    pub fn tag(self) -> &'static str {
        match self {
            DiagnosticKind::Lexical => "LexicalError",
            DiagnosticKind::Syntax => "SyntaxError",
            DiagnosticKind::Semantic => "SemanticError",
            DiagnosticKind::Lint => "Warning",
        }
    }
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}({}): {}",
            self.kind.tag(),
            self.document,
            self.line,
            self.message
        )
    }
}

impl std::error::Error for Diagnostic {}

/// Append-only collector, stamped with the document being compiled.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    document: String,
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            items: Vec::new(),
        }
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn lexical(&mut self, message: impl Into<String>, line: usize, col: usize) {
        self.push(DiagnosticKind::Lexical, Severity::Error, message, line, col);
    }

    pub fn syntax(&mut self, message: impl Into<String>, line: usize, col: usize) {
        self.push(DiagnosticKind::Syntax, Severity::Error, message, line, col);
    }

    pub fn semantic(&mut self, message: impl Into<String>, line: usize, col: usize) {
        self.push(DiagnosticKind::Semantic, Severity::Error, message, line, col);
    }

    pub fn warning(&mut self, message: impl Into<String>, line: usize, col: usize) {
        self.push(DiagnosticKind::Lint, Severity::Warning, message, line, col);
    }

    fn push(
        &mut self,
        kind: DiagnosticKind,
        severity: Severity,
        message: impl Into<String>,
        line: usize,
        col: usize,
    ) {
        self.items.push(Diagnostic {
            document: self.document.clone(),
            line,
            col,
            severity,
            kind,
            message: message.into(),
        });
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        self.items.extend(other);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_host_format() {
        let mut diags = Diagnostics::new("combat");
        diags.syntax("expected '}'", 12, 1);
        let all = diags.into_vec();
        assert_eq!(all[0].to_string(), "[SyntaxError] combat(12): expected '}'");
    }

    #[test]
    fn warnings_are_not_errors() {
        let mut diags = Diagnostics::new("doc");
        diags.warning("min exceeds max", 3, 5);
        assert!(!diags.has_errors());
        assert_eq!(diags.len(), 1);

        diags.semantic("duplicate port name 'A'", 4, 5);
        assert!(diags.has_errors());
    }

    #[test]
    fn tags_per_kind() {
        assert_eq!(DiagnosticKind::Lexical.tag(), "LexicalError");
        assert_eq!(DiagnosticKind::Semantic.tag(), "SemanticError");
        assert_eq!(DiagnosticKind::Lint.tag(), "Warning");
    }

    #[test]
    fn serializes_to_json() {
        let mut diags = Diagnostics::new("doc");
        diags.lexical("unexpected character: '@'", 1, 7);
        let json = serde_json::to_string(&diags.into_vec()).unwrap();
        assert!(json.contains("\"severity\":\"error\""));
        assert!(json.contains("\"kind\":\"Lexical\""));
    }
}
