use std::collections::BTreeMap;
use std::fmt;

use crate::conformance::{validate, Violation};
use crate::extractor::extract;
use crate::line_index::Span;

/// Source tag on every conformance diagnostic.
pub const INTERFACE_SOURCE: &str = "liva-interfaces";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub span: Span,
    pub severity: Severity,
    pub message: String,
    pub source: &'static str,
}

impl From<&Violation> for Diagnostic {
    fn from(v: &Violation) -> Self {
        Self {
            span: v.span,
            severity: if v.is_error() {
                Severity::Error
            } else {
                Severity::Warning
            },
            message: v.message(),
            source: INTERFACE_SOURCE,
        }
    }
}

/// Conformance diagnostics for one document.
pub fn diagnose(text: &str) -> Vec<Diagnostic> {
    validate(&extract(text)).iter().map(Diagnostic::from).collect()
}

/// Current diagnostics per document, keyed by path or URI. Setting a key
/// replaces whatever was published for it before.
#[derive(Debug, Default)]
pub struct DiagnosticTable {
    entries: BTreeMap<String, Vec<Diagnostic>>,
}

impl DiagnosticTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, document: impl Into<String>, diagnostics: Vec<Diagnostic>) {
        self.entries.insert(document.into(), diagnostics);
    }

    pub fn get(&self, document: &str) -> &[Diagnostic] {
        self.entries.get(document).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn delete(&mut self, document: &str) -> Option<Vec<Diagnostic>> {
        self.entries.remove(document)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Documents in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Diagnostic])> {
        self.entries
            .iter()
            .map(|(doc, diags)| (doc.as_str(), diags.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.entries
            .values()
            .flatten()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BROKEN: &str = "Shape {\n    area(): float\n}\n\
                          Circle : Shape, Round {\n    constructor() {}\n}\n";

    #[test]
    fn severities_and_source() {
        let diags = diagnose(BROKEN);
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].severity, Severity::Error);
        assert_eq!(diags[1].severity, Severity::Warning);
        assert!(diags.iter().all(|d| d.source == INTERFACE_SOURCE));
        assert_eq!(diags[1].message, "Interface 'Round' not found");
        assert_eq!(diags[0].span.start.line, 3);
    }

    #[test]
    fn clean_document_has_no_diagnostics() {
        assert!(diagnose("main() => 0\n").is_empty());
    }

    #[test]
    fn table_replaces_and_deletes() {
        let mut table = DiagnosticTable::new();
        table.set("b.liva", diagnose(BROKEN));
        table.set("a.liva", Vec::new());
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("b.liva").len(), 2);
        assert_eq!(table.error_count(), 1);

        let docs: Vec<&str> = table.iter().map(|(doc, _)| doc).collect();
        assert_eq!(docs, vec!["a.liva", "b.liva"]);

        table.set("b.liva", Vec::new());
        assert!(table.get("b.liva").is_empty());

        assert!(table.delete("a.liva").is_some());
        assert!(table.get("a.liva").is_empty());
        assert_eq!(table.len(), 1);

        table.clear();
        assert!(table.is_empty());
    }
}
