//! Line-oriented structural extraction.
//!
//! One pass over the document with at most one open container. While a
//! container is open, member rules apply to lines directly in its body
//! (depth 1); outside, top-level rules apply only at top-level depth 0, so
//! nothing inside a function body is mistaken for a declaration.
//!
//! A `Name {` block is classified when it closes. It is an interface only
//! when no `constructor` occurs between its opening and closing lines and
//! it declared no field or method body; otherwise it is a class. A
//! container still open at end of document is dropped.

use tracing::{debug, trace};

use crate::braces::{brace_delta, find_matching_close};
use crate::common::{indent_width, CommentTracker};
use crate::line_index::{LineIndex, Position, Span};
use crate::matchers::{self, Body, Callable, ContainerHead};
use crate::symbols::{Symbol, SymbolKind, SymbolModel};

/// Builds the symbol model for one document. Total over any input.
pub fn extract(text: &str) -> SymbolModel {
    let index = LineIndex::new(text);
    let mut comments = CommentTracker::new();
    let mut symbols = Vec::new();
    let mut open: Option<OpenContainer> = None;
    let mut top_depth: i32 = 0;

    for line in 0..index.line_count() {
        let raw = index.line(line);
        let trimmed = raw.trim();

        if let Some(container) = open.as_mut() {
            if raw.contains("constructor") {
                container.saw_constructor = true;
            }
        }

        if trimmed.is_empty() || comments.is_comment(trimmed) {
            continue;
        }

        let at = LineAt {
            index: &index,
            line,
            indent: indent_width(raw),
        };

        if let Some(mut container) = open.take() {
            let in_body = container.depth == 1;
            container.depth += brace_delta(trimmed);
            if container.depth <= 0 {
                symbols.push(container.finish());
                continue;
            }
            if in_body {
                container.collect(&at, trimmed);
            }
            open = Some(container);
            continue;
        }

        if top_depth == 0 {
            let head = matchers::match_container_head(trimmed)
                .map(|h| (h, false))
                .or_else(|| matchers::match_class_head(trimmed).map(|h| (h, true)));

            if let Some((head, explicit_class)) = head {
                let container = OpenContainer::start(&at, raw, head, explicit_class, trimmed);
                if container.depth <= 0 {
                    symbols.push(container.finish());
                } else {
                    trace!(name = %container.name, line, "container opened");
                    open = Some(container);
                }
                continue;
            }

            if let Some(symbol) = top_level_symbol(&at, trimmed) {
                symbols.push(symbol);
            }
        }

        top_depth = (top_depth + brace_delta(trimmed)).max(0);
    }

    if let Some(container) = open {
        debug!(
            name = %container.name,
            line = container.head_line,
            "unterminated container dropped"
        );
    }

    SymbolModel { symbols }
}

/// Location context for the line being matched.
struct LineAt<'i, 'a> {
    index: &'i LineIndex<'a>,
    line: usize,
    /// Byte width of the leading whitespace.
    indent: usize,
}

impl LineAt<'_, '_> {
    /// Absolute byte offset of a byte offset within the trimmed line.
    fn offset(&self, in_trimmed: usize) -> usize {
        self.index.line_start(self.line) + self.indent + in_trimmed
    }

    fn column(&self, in_trimmed: usize) -> usize {
        self.index.column_of(self.line, self.indent + in_trimmed)
    }

    fn start(&self) -> Position {
        Position::new(self.line, self.column(0))
    }

    fn line_end(&self) -> Position {
        self.index.line_span(self.line).end
    }

    fn name_span(&self, name_at: usize, name: &str) -> Span {
        let start = self.column(name_at);
        Span::on_line(self.line, start, start + name.chars().count())
    }

    /// Span from the line's first token to the brace matching the `{` at
    /// `brace_at`, or to the end of the document when it never closes.
    fn block_span(&self, brace_at: usize) -> Span {
        let end = match find_matching_close(self.index.text(), self.offset(brace_at)) {
            Some(close) => self.index.position(close + 1),
            None => self.index.end(),
        };
        Span::new(self.start(), end)
    }

    fn line_rest_span(&self) -> Span {
        Span::new(self.start(), self.line_end())
    }

    fn leaf(&self, kind: SymbolKind, name: &str, name_at: usize, span: Span) -> Symbol {
        Symbol {
            kind,
            name: name.to_owned(),
            signature: String::new(),
            declared_type: None,
            value: None,
            span,
            selection_span: self.name_span(name_at, name),
            header_span: self.index.line_span(self.line),
            implements: Vec::new(),
            members: Vec::new(),
        }
    }

    fn callable(&self, kind: SymbolKind, c: Callable) -> Symbol {
        let span = match c.body {
            Body::Block(brace_at) => self.block_span(brace_at),
            Body::Expression => self.line_rest_span(),
        };
        Symbol {
            signature: c.params,
            declared_type: c.return_type,
            ..self.leaf(kind, &c.name, 0, span)
        }
    }
}

fn top_level_symbol(at: &LineAt<'_, '_>, trimmed: &str) -> Option<Symbol> {
    if let Some(callable) = matchers::match_callable(trimmed) {
        if callable.is_constructor() {
            return None;
        }
        return Some(at.callable(SymbolKind::Function, callable));
    }

    let constant = matchers::match_constant(trimmed)?;
    Some(Symbol {
        value: Some(constant.value),
        ..at.leaf(
            SymbolKind::Constant,
            &constant.name,
            constant.name_at,
            at.line_rest_span(),
        )
    })
}

struct OpenContainer {
    name: String,
    implements: Vec<String>,
    /// Declared with an implements clause, so never an interface.
    explicit_class: bool,
    head_line: usize,
    span: Span,
    selection_span: Span,
    header_span: Span,
    depth: i32,
    saw_constructor: bool,
    /// Body-less method lines, kept if this turns out to be an interface.
    signatures: Vec<Symbol>,
    /// Fields, methods and constructor, kept if this is a class.
    members: Vec<Symbol>,
    /// Methods whose parameter list runs past the head line. Class only,
    /// and they do not decide the classification.
    wrapped: Vec<Symbol>,
    /// Inside a wrapped parameter list.
    params_open: bool,
}

impl OpenContainer {
    fn start(
        at: &LineAt<'_, '_>,
        raw: &str,
        head: ContainerHead,
        explicit_class: bool,
        trimmed: &str,
    ) -> Self {
        Self {
            span: at.block_span(head.brace_at),
            selection_span: at.name_span(0, &head.name),
            header_span: at.index.line_span(at.line),
            name: head.name,
            implements: head.implements,
            explicit_class,
            head_line: at.line,
            depth: brace_delta(trimmed),
            saw_constructor: raw.contains("constructor"),
            signatures: Vec::new(),
            members: Vec::new(),
            wrapped: Vec::new(),
            params_open: false,
        }
    }

    /// Member rules, tried in order: interface signature, method or
    /// constructor implementation, wrapped method head, field. Lines
    /// continuing a wrapped parameter list are never members.
    fn collect(&mut self, at: &LineAt<'_, '_>, trimmed: &str) {
        if self.params_open {
            if trimmed.contains(')') {
                self.params_open = false;
            }
            return;
        }

        if let Some(sig) = matchers::match_signature(trimmed) {
            let mut symbol = at.leaf(SymbolKind::Method, &sig.name, 0, at.line_rest_span());
            symbol.signature = sig.params;
            symbol.declared_type = sig.return_type;
            self.signatures.push(symbol);
            return;
        }

        if let Some(callable) = matchers::match_callable(trimmed) {
            let kind = if callable.is_constructor() {
                SymbolKind::Constructor
            } else {
                SymbolKind::Method
            };
            self.members.push(at.callable(kind, callable));
            return;
        }

        if let Some((name, params)) = matchers::match_wrapped_head(trimmed) {
            let kind = if name == "constructor" {
                SymbolKind::Constructor
            } else {
                SymbolKind::Method
            };
            let mut symbol = at.leaf(kind, &name, 0, at.line_rest_span());
            symbol.signature = params;
            self.wrapped.push(symbol);
            self.params_open = true;
            return;
        }

        if let Some(field) = matchers::match_field(trimmed) {
            let mut symbol = at.leaf(SymbolKind::Field, &field.name, 0, at.line_rest_span());
            symbol.declared_type = Some(field.ty);
            self.members.push(symbol);
        }
    }

    fn finish(self) -> Symbol {
        let is_interface =
            !self.explicit_class && !self.saw_constructor && self.members.is_empty();
        let (kind, members) = if is_interface {
            (SymbolKind::Interface, self.signatures)
        } else {
            let mut members = self.members;
            members.extend(self.wrapped);
            members.sort_by_key(|m| m.span.start);
            (SymbolKind::Class, members)
        };
        debug!(
            name = %self.name,
            kind = %kind,
            members = members.len(),
            first_line = self.head_line,
            last_line = self.span.end.line,
            "container finalized"
        );
        Symbol {
            kind,
            name: self.name,
            signature: String::new(),
            declared_type: None,
            value: None,
            span: self.span,
            selection_span: self.selection_span,
            header_span: self.header_span,
            implements: self.implements,
            members,
        }
    }
}
