use std::fmt;

use crate::line_index::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Function,
    Class,
    Interface,
    Constant,
    Field,
    Method,
    Constructor,
    Variable,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Constant => "constant",
            SymbolKind::Field => "field",
            SymbolKind::Method => "method",
            SymbolKind::Constructor => "constructor",
            SymbolKind::Variable => "variable",
        }
    }

    pub fn is_container(self) -> bool {
        matches!(self, SymbolKind::Class | SymbolKind::Interface)
    }

    pub fn is_callable(self) -> bool {
        matches!(
            self,
            SymbolKind::Function | SymbolKind::Method | SymbolKind::Constructor
        )
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recognized declaration.
///
/// `signature` holds the raw parameter text of callables and is empty
/// otherwise. `declared_type` is the return type of callables or the type
/// annotation of fields. `value` is only set for constants.
///
/// Containers (classes and interfaces) also carry `implements` and
/// `members`; for every other kind both are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub name: String,
    pub signature: String,
    pub declared_type: Option<String>,
    pub value: Option<String>,
    /// The whole declaring construct.
    pub span: Span,
    /// Just the name; always inside `span`.
    pub selection_span: Span,
    /// The full physical line the declaration starts on.
    pub header_span: Span,
    pub implements: Vec<String>,
    pub members: Vec<Symbol>,
}

impl Symbol {
    /// `name(params)` plus `: Type` when a return type is declared.
    pub fn call_label(&self) -> String {
        match self.declared_type {
            Some(ref ty) => format!("{}({}): {}", self.name, self.signature, ty),
            None => format!("{}({})", self.name, self.signature),
        }
    }

    pub fn methods(&self) -> impl Iterator<Item = &Symbol> {
        self.members.iter().filter(|m| m.kind == SymbolKind::Method)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Symbol> {
        self.members.iter().filter(|m| m.kind == SymbolKind::Field)
    }

    pub fn constructor(&self) -> Option<&Symbol> {
        self.members
            .iter()
            .find(|m| m.kind == SymbolKind::Constructor)
    }
}

/// Extraction result for one document: top-level symbols in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolModel {
    pub symbols: Vec<Symbol>,
}

impl SymbolModel {
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }

    pub fn of_kind(&self, kind: SymbolKind) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(move |s| s.kind == kind)
    }

    pub fn functions(&self) -> impl Iterator<Item = &Symbol> {
        self.of_kind(SymbolKind::Function)
    }

    pub fn classes(&self) -> impl Iterator<Item = &Symbol> {
        self.of_kind(SymbolKind::Class)
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &Symbol> {
        self.of_kind(SymbolKind::Interface)
    }

    pub fn constants(&self) -> impl Iterator<Item = &Symbol> {
        self.of_kind(SymbolKind::Constant)
    }
}

impl<'a> IntoIterator for &'a SymbolModel {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}
