use crate::extractor::extract;
use crate::line_index::Span;
use crate::symbols::{Symbol, SymbolKind, SymbolModel};

const VALUE_DETAIL_MAX: usize = 30;
const VALUE_DETAIL_KEEP: usize = 27;

/// One entry of a document outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineNode {
    pub label: String,
    pub detail: String,
    pub kind: SymbolKind,
    pub range: Span,
    pub selection_range: Span,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// Total nodes in this subtree, itself included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(OutlineNode::count).sum::<usize>()
    }
}

pub fn outline(model: &SymbolModel) -> Vec<OutlineNode> {
    model.iter().map(node).collect()
}

pub fn document_outline(text: &str) -> Vec<OutlineNode> {
    outline(&extract(text))
}

fn node(symbol: &Symbol) -> OutlineNode {
    let label = if symbol.kind.is_callable() {
        symbol.call_label()
    } else {
        symbol.name.clone()
    };
    OutlineNode {
        label,
        detail: detail(symbol),
        kind: symbol.kind,
        range: symbol.span,
        selection_range: symbol.selection_span,
        children: symbol.members.iter().map(node).collect(),
    }
}

fn detail(symbol: &Symbol) -> String {
    match symbol.kind {
        SymbolKind::Class => "class".to_owned(),
        SymbolKind::Interface => "interface".to_owned(),
        SymbolKind::Method => "method".to_owned(),
        SymbolKind::Field => symbol.declared_type.clone().unwrap_or_default(),
        SymbolKind::Constant => symbol
            .value
            .as_deref()
            .map(shorten_value)
            .unwrap_or_default(),
        SymbolKind::Function | SymbolKind::Constructor | SymbolKind::Variable => String::new(),
    }
}

fn shorten_value(value: &str) -> String {
    if value.chars().count() <= VALUE_DETAIL_MAX {
        return value.to_owned();
    }
    let mut short: String = value.chars().take(VALUE_DETAIL_KEEP).collect();
    short.push_str("...");
    short
}
