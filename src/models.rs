use liva_index::diagnostics::Diagnostic;
use liva_index::outline::OutlineNode;
use liva_index::resolver::Definition;
use liva_index::{Position, Span, SymbolKind};

pub struct MetaInfo {
    pub elapsed_ms: u128,
    pub timeout: bool,
    pub files_scanned: usize,
    pub files_matched: usize,
    pub total_matches: Option<usize>,
}

pub struct OutlineFile {
    pub path: String,
    pub nodes: Vec<OutlineNode>,
    pub error: Option<String>,
}

pub struct DiagnosticFile {
    pub path: String,
    pub diagnostics: Vec<Diagnostic>,
    pub error: Option<String>,
}

pub struct Location {
    pub span: Span,
    /// Declaration kind for definitions; references have none.
    pub kind: Option<SymbolKind>,
}

impl From<Definition> for Location {
    fn from(def: Definition) -> Self {
        Self {
            span: def.span,
            kind: Some(def.kind),
        }
    }
}

impl From<Span> for Location {
    fn from(span: Span) -> Self {
        Self { span, kind: None }
    }
}

pub struct LocationFile {
    pub path: String,
    /// The identifier that was looked up; differs per file for position
    /// queries.
    pub name: Option<String>,
    pub locations: Vec<Location>,
    pub error: Option<String>,
}

impl OutlineFile {
    pub fn is_reportable(&self) -> bool {
        !self.nodes.is_empty() || self.error.is_some()
    }
}

impl DiagnosticFile {
    pub fn is_reportable(&self) -> bool {
        !self.diagnostics.is_empty() || self.error.is_some()
    }
}

impl LocationFile {
    pub fn is_reportable(&self) -> bool {
        !self.locations.is_empty() || self.error.is_some()
    }
}

#[derive(Default)]
pub struct OutputEnvelope {
    pub meta: Option<MetaInfo>,
    pub query: Option<String>,
    pub outline: Option<Vec<OutlineFile>>,
    pub diagnostics: Option<Vec<DiagnosticFile>>,
    pub locations: Option<Vec<LocationFile>>,
    pub error: Option<String>,
}

impl OutputEnvelope {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Positions are printed 1-based.
pub fn one_based(p: Position) -> (usize, usize) {
    (p.line + 1, p.column + 1)
}
