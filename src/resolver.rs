//! Definition and reference lookup straight over document text.
//!
//! Independent of the symbol model: every query builds a handful of
//! per-identifier regexes and scans the whole document with them.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::line_index::{LineIndex, Position, Span};
use crate::symbols::SymbolKind;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+$").expect("word regex"));

static DECLARATION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(let|const|fn)\s+").expect("declaration line regex"));

static WORD_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("word run regex"));

/// Declaration patterns in lookup order. `{}` is replaced by the escaped
/// identifier, always as capture group 1.
const FUNCTION_PATTERNS: &[&str] = &[
    r"(?m)^[ \t]*({})\s*\([^)]*\)\s*=>",
    r"(?m)^[ \t]*({})\s*\([^)]*\)\s*\{",
    r"(?m)^[ \t]*({})\s*\([^)]*\)\s*:\s*\w+\s*\{",
    r"(?m)^[ \t]*({})\s*\([^)]*\)\s*:\s*\w+\s*=>",
];

const VARIABLE_PATTERNS: &[(SymbolKind, &str)] = &[
    (SymbolKind::Variable, r"(?m)^[ \t]*let[ \t]+({})[ \t]*[=,]"),
    (SymbolKind::Constant, r"(?m)^[ \t]*const[ \t]+({})[ \t]*="),
    (SymbolKind::Variable, r"(?m)^[ \t]*let[ \t]+\w+[ \t]*,[ \t]*({})[ \t]*="),
    (SymbolKind::Variable, r"(?m)^[ \t]*let[ \t]+({})[ \t]*,[ \t]*\w+[ \t]*="),
];

const CLASS_PATTERN: &str = r"(?m)^[ \t]*({})[ \t]*(?::[^{\n]*)?\{";

/// One declaration site, spanning exactly the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Definition {
    pub kind: SymbolKind,
    pub span: Span,
}

fn is_word(identifier: &str) -> bool {
    WORD.is_match(identifier)
}

fn pattern_for(template: &str, identifier: &str) -> Option<Regex> {
    let source = template.replace("{}", &regex::escape(identifier));
    Regex::new(&source).ok()
}

fn push_matches(
    index: &LineIndex<'_>,
    regex: &Regex,
    kind: SymbolKind,
    found: &mut Vec<Definition>,
) {
    for caps in regex.captures_iter(index.text()) {
        let name = match caps.get(1) {
            Some(name) => name,
            None => continue,
        };
        let span = Span::new(index.position(name.start()), index.position(name.end()));
        if found.iter().any(|d| d.span == span) {
            continue;
        }
        found.push(Definition { kind, span });
    }
}

/// Every declaration site of `identifier`: functions, then variables and
/// constants, then (for capitalized names) classes and interfaces.
pub fn resolve_definition(text: &str, identifier: &str) -> Vec<Definition> {
    let mut found = Vec::new();
    if !is_word(identifier) {
        return found;
    }
    let index = LineIndex::new(text);

    for template in FUNCTION_PATTERNS {
        if let Some(regex) = pattern_for(template, identifier) {
            push_matches(&index, &regex, SymbolKind::Function, &mut found);
        }
    }
    for (kind, template) in VARIABLE_PATTERNS {
        if let Some(regex) = pattern_for(template, identifier) {
            push_matches(&index, &regex, *kind, &mut found);
        }
    }
    if identifier.chars().next().map_or(false, char::is_uppercase) {
        if let Some(regex) = pattern_for(CLASS_PATTERN, identifier) {
            push_matches(&index, &regex, SymbolKind::Class, &mut found);
        }
    }

    trace!(identifier, definitions = found.len(), "definitions resolved");
    found
}

/// Every whole-word occurrence of `identifier`, in document order.
pub fn resolve_references(text: &str, identifier: &str) -> Vec<Span> {
    if !is_word(identifier) {
        return Vec::new();
    }
    let regex = match pattern_for(r"\b{}\b", identifier) {
        Some(regex) => regex,
        None => return Vec::new(),
    };
    let index = LineIndex::new(text);
    regex
        .find_iter(text)
        .map(|m| Span::new(index.position(m.start()), index.position(m.end())))
        .collect()
}

/// Drops references sitting on a `let`/`const`/`fn` line that mentions
/// `identifier`.
pub fn filter_declarations(text: &str, identifier: &str, references: Vec<Span>) -> Vec<Span> {
    let index = LineIndex::new(text);
    references
        .into_iter()
        .filter(|span| {
            let line = index.line(span.start.line);
            !(DECLARATION_LINE.is_match(line) && line.contains(identifier))
        })
        .collect()
}

pub fn find_references(text: &str, identifier: &str, include_declaration: bool) -> Vec<Span> {
    let references = resolve_references(text, identifier);
    if include_declaration {
        references
    } else {
        filter_declarations(text, identifier, references)
    }
}

/// The word under `position`, including a word that ends right at it.
pub fn word_at(text: &str, position: Position) -> Option<(String, Span)> {
    let index = LineIndex::new(text);
    if position.line >= index.line_count() {
        return None;
    }
    let line = index.line(position.line);
    let cursor = line
        .char_indices()
        .nth(position.column)
        .map(|(i, _)| i)
        .unwrap_or(line.len());

    let word = WORD_RUN
        .find_iter(line)
        .find(|m| m.start() <= cursor && cursor <= m.end())?;
    let span = Span::on_line(
        position.line,
        index.column_of(position.line, word.start()),
        index.column_of(position.line, word.end()),
    );
    Some((word.as_str().to_owned(), span))
}

pub fn definition_at(text: &str, position: Position) -> Vec<Definition> {
    match word_at(text, position) {
        Some((word, _)) => resolve_definition(text, &word),
        None => Vec::new(),
    }
}

pub fn references_at(text: &str, position: Position, include_declaration: bool) -> Vec<Span> {
    match word_at(text, position) {
        Some((word, _)) => find_references(text, &word, include_declaration),
        None => Vec::new(),
    }
}
