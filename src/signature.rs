use crate::extractor::extract;
use crate::line_index::{LineIndex, Position};
use crate::symbols::{Symbol, SymbolKind, SymbolModel};

/// The call the cursor sits in: callee name and zero-based argument index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    pub name: String,
    pub argument: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHelp {
    pub label: String,
    pub parameters: Vec<String>,
    /// Clamped to the last parameter.
    pub active_parameter: usize,
}

/// Innermost `name(` left open in `prefix`. Parenthesized groups without a
/// name in front are skipped outward.
pub fn call_context(prefix: &str) -> Option<CallContext> {
    let bytes = prefix.as_bytes();
    let mut depth = 0usize;
    let mut commas = 0usize;
    let mut i = bytes.len();

    while i > 0 {
        i -= 1;
        match bytes[i] {
            b')' => depth += 1,
            b'(' if depth > 0 => depth -= 1,
            b'(' => {
                if let Some(name) = callee_before(&prefix[..i]) {
                    return Some(CallContext {
                        name: name.to_owned(),
                        argument: commas,
                    });
                }
                commas = 0;
            }
            b',' if depth == 0 => commas += 1,
            _ => {}
        }
    }
    None
}

/// The identifier directly before an opening paren, whitespace allowed.
fn callee_before(head: &str) -> Option<&str> {
    let head = head.trim_end();
    let start = head
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphanumeric() || *c == '_')
        .last()
        .map(|(i, _)| i)?;
    Some(&head[start..])
}

/// Signature of `name` as declared in `model`: top-level functions, then
/// container methods, then a class constructor when `name` is a class.
pub fn lookup<'m>(model: &'m SymbolModel, name: &str) -> Option<&'m Symbol> {
    if let Some(function) = model.functions().find(|f| f.name == name) {
        return Some(function);
    }
    let method = model
        .iter()
        .filter(|s| s.kind.is_container())
        .flat_map(|s| s.methods())
        .find(|m| m.name == name);
    if method.is_some() {
        return method;
    }
    model
        .classes()
        .find(|c| c.name == name)
        .and_then(Symbol::constructor)
}

fn parameters(signature: &str) -> Vec<String> {
    signature
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect()
}

pub fn signature_help(text: &str, position: Position) -> Option<SignatureHelp> {
    let index = LineIndex::new(text);
    if position.line >= index.line_count() {
        return None;
    }
    let line = index.line(position.line);
    let cut = line
        .char_indices()
        .nth(position.column)
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    let call = call_context(&line[..cut])?;

    let model = extract(text);
    let symbol = lookup(&model, &call.name)?;
    let parameters = parameters(&symbol.signature);
    let label = if symbol.kind == SymbolKind::Constructor {
        format!("{}({})", call.name, symbol.signature)
    } else {
        symbol.call_label()
    };
    Some(SignatureHelp {
        label,
        active_parameter: call.argument.min(parameters.len().saturating_sub(1)),
        parameters,
    })
}
