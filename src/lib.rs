//! Structural indexing for Liva source files.
//!
//! Everything here works on one document's text at a time and never fails:
//! malformed input yields a smaller model, not an error.
//!
//! ```
//! let analysis = liva_index::analyze("Shape {\n    area(): float\n}\n");
//! assert_eq!(analysis.model.len(), 1);
//! assert!(analysis.diagnostics.is_empty());
//! ```

pub mod braces;
pub mod common;
pub mod conformance;
pub mod diagnostics;
pub mod extractor;
pub mod line_index;
pub mod matchers;
pub mod outline;
pub mod resolver;
pub mod signature;
pub mod symbols;

pub use diagnostics::{Diagnostic, DiagnosticTable, Severity};
pub use extractor::extract;
pub use line_index::{Position, Span};
pub use symbols::{Symbol, SymbolKind, SymbolModel};

/// One analysis pass: the symbol model and the conformance diagnostics
/// derived from it.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub model: SymbolModel,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn analyze(text: &str) -> Analysis {
    let model = extract(text);
    let diagnostics = conformance::validate(&model)
        .iter()
        .map(Diagnostic::from)
        .collect();
    Analysis { model, diagnostics }
}
