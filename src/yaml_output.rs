use std::io::{self, BufWriter, Write};

use liva_index::diagnostics::Diagnostic;
use liva_index::outline::OutlineNode;
use liva_index::Span;

use crate::models::{
    one_based, DiagnosticFile, Location, LocationFile, MetaInfo, OutlineFile, OutputEnvelope,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}

pub fn write_output(envelope: &OutputEnvelope, format: OutputFormat) {
    let stdout = io::stdout();
    let mut w = BufWriter::with_capacity(64 * 1024, stdout.lock());
    match format {
        OutputFormat::Yaml => { write_envelope_yaml(&mut w, envelope).ok(); }
        OutputFormat::Json => { write_envelope_json(&mut w, envelope).ok(); }
    }
    w.flush().ok();
}

// ── YAML output ──

fn write_envelope_yaml(w: &mut impl Write, envelope: &OutputEnvelope) -> io::Result<()> {
    if let Some(ref meta) = envelope.meta {
        write_meta(w, meta)?;
    }
    if let Some(ref error) = envelope.error {
        write_scalar(w, "error", error, 0)?;
    }
    if let Some(ref query) = envelope.query {
        write_scalar(w, "query", query, 0)?;
    }
    if let Some(ref outline) = envelope.outline {
        if !outline.is_empty() {
            write_outline(w, outline)?;
        }
    }
    if let Some(ref diagnostics) = envelope.diagnostics {
        if !diagnostics.is_empty() {
            write_diagnostics(w, diagnostics)?;
        }
    }
    if let Some(ref locations) = envelope.locations {
        if !locations.is_empty() {
            write_locations(w, locations)?;
        }
    }
    Ok(())
}

fn write_meta(w: &mut impl Write, meta: &MetaInfo) -> io::Result<()> {
    write!(w, "meta:\n")?;
    if meta.elapsed_ms != 0 {
        write!(w, "  elapsedMs: {}\n", meta.elapsed_ms)?;
    }
    if meta.timeout {
        write!(w, "  timeout: true\n")?;
    }
    if meta.files_scanned != 0 {
        write!(w, "  filesScanned: {}\n", meta.files_scanned)?;
    }
    if meta.files_matched != 0 {
        write!(w, "  filesMatched: {}\n", meta.files_matched)?;
    }
    if let Some(total) = meta.total_matches {
        write!(w, "  totalMatches: {}\n", total)?;
    }
    Ok(())
}

fn write_file_head(w: &mut impl Write, path: &str, error: Option<&str>) -> io::Result<()> {
    write!(w, "- path: ")?;
    write_inline_string(w, path)?;
    write!(w, "\n")?;
    if let Some(error) = error {
        write_scalar(w, "error", error, 2)?;
    }
    Ok(())
}

/// `line`, `column`, `endLine`, `endColumn`, 1-based. The first key is
/// written without indent so it can follow a list dash.
fn write_span(w: &mut impl Write, span: &Span, indent: usize) -> io::Result<()> {
    let (line, column) = one_based(span.start);
    let (end_line, end_column) = one_based(span.end);
    write!(w, "line: {}\n", line)?;
    write_indent(w, indent)?;
    write!(w, "column: {}\n", column)?;
    write_indent(w, indent)?;
    write!(w, "endLine: {}\n", end_line)?;
    write_indent(w, indent)?;
    write!(w, "endColumn: {}\n", end_column)
}

fn write_outline(w: &mut impl Write, files: &[OutlineFile]) -> io::Result<()> {
    write!(w, "outline:\n")?;
    for file in files {
        write_file_head(w, &file.path, file.error.as_deref())?;
        if file.nodes.is_empty() {
            continue;
        }
        write!(w, "  symbols:\n")?;
        for node in &file.nodes {
            write_outline_node(w, node, 2)?;
        }
    }
    Ok(())
}

fn write_outline_node(w: &mut impl Write, node: &OutlineNode, indent: usize) -> io::Result<()> {
    let inner = indent + 2;
    write_indent(w, indent)?;
    write!(w, "- kind: {}\n", node.kind)?;
    write_scalar(w, "name", &node.label, inner)?;
    if !node.detail.is_empty() {
        write_scalar(w, "detail", &node.detail, inner)?;
    }
    write_indent(w, inner)?;
    write_span(w, &node.range, inner)?;
    if !node.children.is_empty() {
        write_indent(w, inner)?;
        write!(w, "members:\n")?;
        for child in &node.children {
            write_outline_node(w, child, inner)?;
        }
    }
    Ok(())
}

fn write_diagnostics(w: &mut impl Write, files: &[DiagnosticFile]) -> io::Result<()> {
    write!(w, "diagnostics:\n")?;
    for file in files {
        write_file_head(w, &file.path, file.error.as_deref())?;
        if file.diagnostics.is_empty() {
            continue;
        }
        write!(w, "  items:\n")?;
        for diag in &file.diagnostics {
            write_diagnostic(w, diag)?;
        }
    }
    Ok(())
}

fn write_diagnostic(w: &mut impl Write, diag: &Diagnostic) -> io::Result<()> {
    write!(w, "  - severity: {}\n", diag.severity)?;
    write!(w, "    ")?;
    write_span(w, &diag.span, 4)?;
    write_scalar(w, "source", diag.source, 4)?;
    if diag.message.contains('\n') {
        write_block_scalar(w, "message", &diag.message, 4)
    } else {
        write_scalar(w, "message", &diag.message, 4)
    }
}

fn write_locations(w: &mut impl Write, files: &[LocationFile]) -> io::Result<()> {
    write!(w, "locations:\n")?;
    for file in files {
        write_file_head(w, &file.path, file.error.as_deref())?;
        if let Some(ref name) = file.name {
            write_scalar(w, "name", name, 2)?;
        }
        if file.locations.is_empty() {
            continue;
        }
        write!(w, "  matches:\n")?;
        for loc in &file.locations {
            write_location(w, loc)?;
        }
    }
    Ok(())
}

fn write_location(w: &mut impl Write, loc: &Location) -> io::Result<()> {
    write!(w, "  - ")?;
    write_span(w, &loc.span, 4)?;
    if let Some(kind) = loc.kind {
        write!(w, "    kind: {}\n", kind)?;
    }
    Ok(())
}

fn write_block_scalar(w: &mut impl Write, key: &str, content: &str, indent: usize) -> io::Result<()> {
    write_indent(w, indent)?;
    write!(w, "{}: |\n", key)?;
    for line in content.lines() {
        if line.is_empty() {
            write!(w, "\n")?;
        } else {
            write_indent(w, indent + 2)?;
            write!(w, "{}\n", line)?;
        }
    }
    Ok(())
}

fn write_scalar(w: &mut impl Write, key: &str, value: &str, indent: usize) -> io::Result<()> {
    write_indent(w, indent)?;
    write!(w, "{}: ", key)?;
    write_inline_string(w, value)?;
    write!(w, "\n")?;
    Ok(())
}

fn write_inline_string(w: &mut impl Write, value: &str) -> io::Result<()> {
    if value.is_empty() {
        return write!(w, "''");
    }

    if needs_quoting(value) {
        write!(w, "\"")?;
        for c in value.chars() {
            match c {
                '"' => write!(w, "\\\"")?,
                '\\' => write!(w, "\\\\")?,
                '\n' => write!(w, "\\n")?,
                '\r' => write!(w, "\\r")?,
                '\t' => write!(w, "\\t")?,
                _ => write!(w, "{}", c)?,
            }
        }
        write!(w, "\"")?;
    } else {
        write!(w, "{}", value)?;
    }
    Ok(())
}

fn needs_quoting(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }

    let first = value.as_bytes()[0];
    if matches!(first, b'-' | b'[' | b']' | b'{' | b'}' | b'\'' | b'"' |
        b'!' | b'&' | b'*' | b'|' | b'>' | b'%' | b'@' | b'`' | b',' | b'?' | b'#') {
        return true;
    }

    match value {
        "true" | "false" | "null" | "True" | "False" | "Null" |
        "TRUE" | "FALSE" | "NULL" | "yes" | "no" | "Yes" | "No" |
        "YES" | "NO" | "on" | "off" | "On" | "Off" | "ON" | "OFF" => return true,
        _ => {}
    }

    if looks_numeric(value) {
        return true;
    }

    // trailing space would be lost by a YAML reader
    if value.ends_with(' ') {
        return true;
    }

    value.chars().any(|c| matches!(c, ':' | '#' | '\n' | '\r'))
}

fn looks_numeric(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.is_empty() {
        return false;
    }
    let start = if bytes[0] == b'-' || bytes[0] == b'+' { 1 } else { 0 };
    let rest = &bytes[start..];
    if rest.is_empty() {
        return false;
    }
    let mut has_dot = false;
    for &b in rest {
        match b {
            b'0'..=b'9' => {}
            b'.' if !has_dot => has_dot = true,
            _ => return false,
        }
    }
    true
}

fn write_indent(w: &mut impl Write, n: usize) -> io::Result<()> {
    const SPACES: &[u8; 32] = b"                                ";
    if n <= SPACES.len() {
        w.write_all(&SPACES[..n])
    } else {
        for _ in 0..n {
            w.write_all(b" ")?;
        }
        Ok(())
    }
}

// ── JSON output ──

fn write_envelope_json(w: &mut impl Write, envelope: &OutputEnvelope) -> io::Result<()> {
    write!(w, "{{")?;
    let mut first = true;

    if let Some(ref meta) = envelope.meta {
        json_comma(w, &mut first)?;
        write_meta_json(w, meta)?;
    }
    if let Some(ref error) = envelope.error {
        json_comma(w, &mut first)?;
        write!(w, "\"error\":")?;
        write_json_string(w, error)?;
    }
    if let Some(ref query) = envelope.query {
        json_comma(w, &mut first)?;
        write!(w, "\"query\":")?;
        write_json_string(w, query)?;
    }
    if let Some(ref outline) = envelope.outline {
        json_comma(w, &mut first)?;
        write_outline_json(w, outline)?;
    }
    if let Some(ref diagnostics) = envelope.diagnostics {
        json_comma(w, &mut first)?;
        write_diagnostics_json(w, diagnostics)?;
    }
    if let Some(ref locations) = envelope.locations {
        json_comma(w, &mut first)?;
        write_locations_json(w, locations)?;
    }

    write!(w, "}}\n")
}

fn json_comma(w: &mut impl Write, first: &mut bool) -> io::Result<()> {
    if *first { *first = false; } else { write!(w, ",")?; }
    Ok(())
}

fn write_json_string(w: &mut impl Write, s: &str) -> io::Result<()> {
    write!(w, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(w, "\\\"")?,
            '\\' => write!(w, "\\\\")?,
            '\n' => write!(w, "\\n")?,
            '\r' => write!(w, "\\r")?,
            '\t' => write!(w, "\\t")?,
            c if (c as u32) < 0x20 => write!(w, "\\u{:04x}", c as u32)?,
            _ => write!(w, "{}", c)?,
        }
    }
    write!(w, "\"")
}

fn write_meta_json(w: &mut impl Write, meta: &MetaInfo) -> io::Result<()> {
    write!(w, "\"meta\":{{\"elapsedMs\":{},\"timeout\":{},\"filesScanned\":{},\"filesMatched\":{}",
        meta.elapsed_ms, meta.timeout, meta.files_scanned, meta.files_matched)?;
    if let Some(total) = meta.total_matches {
        write!(w, ",\"totalMatches\":{}", total)?;
    }
    write!(w, "}}")
}

fn write_span_json(w: &mut impl Write, span: &Span) -> io::Result<()> {
    let (line, column) = one_based(span.start);
    let (end_line, end_column) = one_based(span.end);
    write!(w, "\"line\":{},\"column\":{},\"endLine\":{},\"endColumn\":{}",
        line, column, end_line, end_column)
}

fn write_file_head_json(w: &mut impl Write, path: &str, error: Option<&str>) -> io::Result<()> {
    write!(w, "\"path\":")?;
    write_json_string(w, path)?;
    if let Some(error) = error {
        write!(w, ",\"error\":")?;
        write_json_string(w, error)?;
    }
    Ok(())
}

fn write_outline_json(w: &mut impl Write, files: &[OutlineFile]) -> io::Result<()> {
    write!(w, "\"outline\":[")?;
    for (i, file) in files.iter().enumerate() {
        if i > 0 { write!(w, ",")?; }
        write!(w, "{{")?;
        write_file_head_json(w, &file.path, file.error.as_deref())?;
        write!(w, ",\"symbols\":")?;
        write_outline_nodes_json(w, &file.nodes)?;
        write!(w, "}}")?;
    }
    write!(w, "]")
}

fn write_outline_nodes_json(w: &mut impl Write, nodes: &[OutlineNode]) -> io::Result<()> {
    write!(w, "[")?;
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 { write!(w, ",")?; }
        write!(w, "{{\"kind\":\"{}\",\"name\":", node.kind)?;
        write_json_string(w, &node.label)?;
        write!(w, ",\"detail\":")?;
        write_json_string(w, &node.detail)?;
        write!(w, ",")?;
        write_span_json(w, &node.range)?;
        if !node.children.is_empty() {
            write!(w, ",\"members\":")?;
            write_outline_nodes_json(w, &node.children)?;
        }
        write!(w, "}}")?;
    }
    write!(w, "]")
}

fn write_diagnostics_json(w: &mut impl Write, files: &[DiagnosticFile]) -> io::Result<()> {
    write!(w, "\"diagnostics\":[")?;
    for (i, file) in files.iter().enumerate() {
        if i > 0 { write!(w, ",")?; }
        write!(w, "{{")?;
        write_file_head_json(w, &file.path, file.error.as_deref())?;
        write!(w, ",\"items\":[")?;
        for (j, diag) in file.diagnostics.iter().enumerate() {
            if j > 0 { write!(w, ",")?; }
            write!(w, "{{\"severity\":\"{}\",", diag.severity)?;
            write_span_json(w, &diag.span)?;
            write!(w, ",\"source\":")?;
            write_json_string(w, diag.source)?;
            write!(w, ",\"message\":")?;
            write_json_string(w, &diag.message)?;
            write!(w, "}}")?;
        }
        write!(w, "]}}")?;
    }
    write!(w, "]")
}

fn write_locations_json(w: &mut impl Write, files: &[LocationFile]) -> io::Result<()> {
    write!(w, "\"locations\":[")?;
    for (i, file) in files.iter().enumerate() {
        if i > 0 { write!(w, ",")?; }
        write!(w, "{{")?;
        write_file_head_json(w, &file.path, file.error.as_deref())?;
        if let Some(ref name) = file.name {
            write!(w, ",\"name\":")?;
            write_json_string(w, name)?;
        }
        write!(w, ",\"matches\":[")?;
        for (j, loc) in file.locations.iter().enumerate() {
            if j > 0 { write!(w, ",")?; }
            write!(w, "{{")?;
            write_span_json(w, &loc.span)?;
            if let Some(kind) = loc.kind {
                write!(w, ",\"kind\":\"{}\"", kind)?;
            }
            write!(w, "}}")?;
        }
        write!(w, "]}}")?;
    }
    write!(w, "]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use liva_index::diagnostics::diagnose;
    use liva_index::outline::document_outline;
    use liva_index::SymbolKind;

    fn output_to_string(envelope: &OutputEnvelope) -> String {
        let mut buf = Vec::new();
        write_envelope_yaml(&mut buf, envelope).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn output_to_json(envelope: &OutputEnvelope) -> String {
        let mut buf = Vec::new();
        write_envelope_json(&mut buf, envelope).unwrap();
        String::from_utf8(buf).unwrap()
    }

    const SHAPES: &str = "Shape {\n    area(): float\n}\nSquare : Shape {\n    side: float\n    constructor() {}\n}\n";

    fn outline_envelope() -> OutputEnvelope {
        OutputEnvelope {
            outline: Some(vec![OutlineFile {
                path: "shapes.liva".into(),
                nodes: document_outline(SHAPES),
                error: None,
            }]),
            ..Default::default()
        }
    }

    fn check_envelope() -> OutputEnvelope {
        OutputEnvelope {
            diagnostics: Some(vec![DiagnosticFile {
                path: "shapes.liva".into(),
                diagnostics: diagnose(SHAPES),
                error: None,
            }]),
            ..Default::default()
        }
    }

    #[test]
    fn write_meta_basic() {
        let envelope = OutputEnvelope {
            meta: Some(MetaInfo {
                elapsed_ms: 42,
                timeout: false,
                files_scanned: 10,
                files_matched: 5,
                total_matches: Some(7),
            }),
            ..Default::default()
        };
        let s = output_to_string(&envelope);
        assert!(s.contains("meta:"));
        assert!(s.contains("elapsedMs: 42"));
        assert!(s.contains("filesScanned: 10"));
        assert!(s.contains("filesMatched: 5"));
        assert!(s.contains("totalMatches: 7"));
        assert!(!s.contains("timeout"));
    }

    #[test]
    fn write_meta_with_timeout() {
        let envelope = OutputEnvelope {
            meta: Some(MetaInfo {
                elapsed_ms: 100,
                timeout: true,
                files_scanned: 5,
                files_matched: 0,
                total_matches: None,
            }),
            ..Default::default()
        };
        let s = output_to_string(&envelope);
        assert!(s.contains("timeout: true"));
        assert!(!s.contains("filesMatched"));
    }

    #[test]
    fn write_error() {
        let s = output_to_string(&OutputEnvelope::failure("Directory not found: /nope"));
        assert_eq!(s, "error: \"Directory not found: /nope\"\n");
    }

    #[test]
    fn yaml_outline_is_nested_and_one_based() {
        let s = output_to_string(&outline_envelope());
        assert!(s.starts_with("outline:\n- path: shapes.liva\n  symbols:\n"));
        assert!(s.contains("  - kind: interface\n    name: Shape\n    detail: interface\n    line: 1\n    column: 1\n    endLine: 3\n    endColumn: 2\n"));
        assert!(s.contains("    members:\n    - kind: method\n      name: \"area(): float\"\n"));
        assert!(s.contains("      name: side\n      detail: float\n"));
    }

    #[test]
    fn yaml_file_error() {
        let envelope = OutputEnvelope {
            outline: Some(vec![OutlineFile {
                path: "blob.liva".into(),
                nodes: Vec::new(),
                error: Some("Binary file".into()),
            }]),
            ..Default::default()
        };
        let s = output_to_string(&envelope);
        assert_eq!(s, "outline:\n- path: blob.liva\n  error: Binary file\n");
    }

    #[test]
    fn yaml_multiline_message_uses_block_scalar() {
        let s = output_to_string(&check_envelope());
        assert!(s.contains("  items:\n  - severity: error\n    line: 4\n"));
        assert!(s.contains("    source: liva-interfaces\n"));
        assert!(s.contains(
            "    message: |\n      Class 'Square' does not implement method 'area' from interface 'Shape'\n\n      Required: area(): float\n"
        ));
    }

    #[test]
    fn yaml_locations() {
        let envelope = OutputEnvelope {
            query: Some("Shape".into()),
            locations: Some(vec![LocationFile {
                path: "shapes.liva".into(),
                name: Some("Shape".into()),
                locations: vec![Location {
                    span: Span::on_line(0, 0, 5),
                    kind: Some(SymbolKind::Class),
                }],
                error: None,
            }]),
            ..Default::default()
        };
        let s = output_to_string(&envelope);
        assert_eq!(
            s,
            "query: Shape\nlocations:\n- path: shapes.liva\n  name: Shape\n  matches:\n  - line: 1\n    column: 1\n    endLine: 1\n    endColumn: 6\n    kind: class\n"
        );
    }

    #[test]
    fn needs_quoting_colon_and_hash() {
        assert!(needs_quoting("key: value"));
        assert!(needs_quoting("value # comment"));
        assert!(needs_quoting("area(): float"));
    }

    #[test]
    fn needs_quoting_newlines_and_trailing_space() {
        assert!(needs_quoting("line1\nline2"));
        assert!(needs_quoting("line1\rline2"));
        assert!(needs_quoting("padded "));
    }

    #[test]
    fn no_quoting_for_simple_strings() {
        assert!(!needs_quoting("hello"));
        assert!(!needs_quoting("shapes.liva"));
        assert!(!needs_quoting("lib/util.liva"));
        assert!(!needs_quoting("greet(name)"));
    }

    #[test]
    fn needs_quoting_keywords_and_numbers() {
        assert!(needs_quoting(""));
        assert!(needs_quoting("on"));
        assert!(needs_quoting("3.14"));
        assert!(needs_quoting("-42"));
        assert!(!needs_quoting("12abc"));
        assert!(!needs_quoting("v1.0"));
    }

    #[test]
    fn inline_string_escapes() {
        let mut buf = Vec::new();
        write_inline_string(&mut buf, "\"hi\\there\"").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), r#""\"hi\\there\"""#);

        let mut buf = Vec::new();
        write_inline_string(&mut buf, "").unwrap();
        assert_eq!(buf, b"''");
    }

    #[test]
    fn write_indent_large() {
        let mut buf = Vec::new();
        write_indent(&mut buf, 40).unwrap();
        assert_eq!(buf.len(), 40);
        assert!(buf.iter().all(|&b| b == b' '));
    }

    // ── JSON output tests ──

    #[test]
    fn json_meta_and_error() {
        let envelope = OutputEnvelope {
            meta: Some(MetaInfo {
                elapsed_ms: 3,
                timeout: true,
                files_scanned: 2,
                files_matched: 1,
                total_matches: None,
            }),
            error: Some("Operation timed out".into()),
            ..Default::default()
        };
        let s = output_to_json(&envelope);
        assert_eq!(
            s,
            "{\"meta\":{\"elapsedMs\":3,\"timeout\":true,\"filesScanned\":2,\"filesMatched\":1},\"error\":\"Operation timed out\"}\n"
        );
    }

    #[test]
    fn json_outline_members() {
        let s = output_to_json(&outline_envelope());
        assert!(s.starts_with("{\"outline\":[{\"path\":\"shapes.liva\",\"symbols\":[{\"kind\":\"interface\",\"name\":\"Shape\""));
        assert!(s.contains("\"members\":[{\"kind\":\"method\",\"name\":\"area(): float\",\"detail\":\"method\",\"line\":2,"));
    }

    #[test]
    fn json_diagnostic_message_escaped() {
        let s = output_to_json(&check_envelope());
        assert!(s.contains("\"severity\":\"error\",\"line\":4,\"column\":1,"));
        assert!(s.contains("from interface 'Shape'\\n\\nRequired: area(): float\\n\\n"));
    }

    #[test]
    fn json_string_control_chars() {
        let mut buf = Vec::new();
        write_json_string(&mut buf, "a\u{1}b\tc").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "\"a\\u0001b\\tc\"");
    }
}
