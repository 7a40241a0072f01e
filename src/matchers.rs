//! Line-level declaration rules.
//!
//! Every matcher takes one trimmed, non-comment line and either recognizes a
//! single declaration on it or returns `None`. Name offsets are byte offsets
//! into the trimmed line.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::common::is_control_word;

static CONTAINER_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z][a-zA-Z0-9_]*)\s*\{").expect("container head regex"));

static CLASS_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Z][a-zA-Z0-9_]*)\s*:\s*([A-Z][a-zA-Z0-9_,\s]+)\s*\{")
        .expect("class head regex")
});

static SIGNATURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z_][a-zA-Z0-9_]*)\s*\((.*?)\)\s*(?::\s*([a-zA-Z0-9_\[\]]+))?$")
        .expect("signature regex")
});

static CALLABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z_][a-zA-Z0-9_]*)\s*\(([^)]*)\)\s*(?::\s*([a-zA-Z0-9_\[\]<>?]+)\s*)?(=>|\{)")
        .expect("callable regex")
});

static OPEN_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z_][a-zA-Z0-9_]*)\s*\((.*)$").expect("open call regex"));

static FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z_][a-zA-Z0-9_]*)\s*:\s*([a-zA-Z0-9_\[\]<>?]+)").expect("field regex")
});

static CONSTANT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^const\s+([A-Z_][A-Z0-9_]*)\s*=\s*(.+)$").expect("constant regex")
});

static VARIABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^let\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*(?:,\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*)?(?::[^=]*)?=")
        .expect("variable regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHead {
    pub name: String,
    pub implements: Vec<String>,
    /// Offset of the `{` that opens the body.
    pub brace_at: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    /// `name(...) => expr`
    Expression,
    /// `name(...) {`, with the `{` at this offset.
    Block(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callable {
    pub name: String,
    pub params: String,
    pub return_type: Option<String>,
    pub body: Body,
}

impl Callable {
    pub fn is_constructor(&self) -> bool {
        self.name == "constructor"
    }
}

/// A body-less method declaration as written inside an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub params: String,
    pub return_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    pub name: String,
    pub name_at: usize,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub name_at: usize,
}

/// `Name {` with no implements clause. Whether this is an interface or a
/// class is only known once the block closes.
pub fn match_container_head(trimmed: &str) -> Option<ContainerHead> {
    let caps = CONTAINER_HEAD.captures(trimmed)?;
    let whole = caps.get(0)?;
    Some(ContainerHead {
        name: caps[1].to_owned(),
        implements: Vec::new(),
        brace_at: whole.end() - 1,
    })
}

/// `Name : Iface1, Iface2 {`
pub fn match_class_head(trimmed: &str) -> Option<ContainerHead> {
    let caps = CLASS_HEAD.captures(trimmed)?;
    let whole = caps.get(0)?;
    let implements = caps[2]
        .split(',')
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(|name| name.to_owned())
        .collect();
    Some(ContainerHead {
        name: caps[1].to_owned(),
        implements,
        brace_at: whole.end() - 1,
    })
}

/// `name(params)` or `name(params): Type` with no body on the line.
pub fn match_signature(trimmed: &str) -> Option<Signature> {
    if trimmed.contains("=>") || trimmed.contains('{') {
        return None;
    }
    let caps = SIGNATURE.captures(trimmed)?;
    let name = &caps[1];
    if name == "constructor" || is_control_word(name) {
        return None;
    }
    Some(Signature {
        name: name.to_owned(),
        params: caps[2].trim().to_owned(),
        return_type: caps.get(3).map(|m| m.as_str().to_owned()),
    })
}

/// `name(params) =>` or `name(params) {`, optionally with `: Type` before
/// the arrow or brace. Used for top-level functions, methods and the
/// constructor.
pub fn match_callable(trimmed: &str) -> Option<Callable> {
    let caps = CALLABLE.captures(trimmed)?;
    let name = &caps[1];
    if is_control_word(name) {
        return None;
    }
    let opener = caps.get(4)?;
    let body = if opener.as_str() == "=>" {
        Body::Expression
    } else {
        Body::Block(opener.start())
    };
    Some(Callable {
        name: name.to_owned(),
        params: caps[2].trim().to_owned(),
        return_type: caps.get(3).map(|m| m.as_str().to_owned()),
        body,
    })
}

/// `name(` whose parameter list runs onto later lines: the line has no
/// `)`. Gives the name and whatever parameter text follows the `(`.
pub fn match_wrapped_head(trimmed: &str) -> Option<(String, String)> {
    if trimmed.contains(')') {
        return None;
    }
    let caps = OPEN_CALL.captures(trimmed)?;
    let name = &caps[1];
    if is_control_word(name) {
        return None;
    }
    let params = caps[2].trim().trim_end_matches(',').trim_end().to_owned();
    Some((name.to_owned(), params))
}

/// `name: Type` with no call parentheses on the line.
pub fn match_field(trimmed: &str) -> Option<Field> {
    if trimmed.contains('(') {
        return None;
    }
    let caps = FIELD.captures(trimmed)?;
    Some(Field {
        name: caps[1].to_owned(),
        ty: caps[2].to_owned(),
    })
}

/// `const UPPER_NAME = value`
pub fn match_constant(trimmed: &str) -> Option<Constant> {
    let caps = CONSTANT.captures(trimmed)?;
    let name = caps.get(1)?;
    Some(Constant {
        name: name.as_str().to_owned(),
        name_at: name.start(),
        value: caps[2].trim().to_owned(),
    })
}

/// `let name = …` or `let value, err = …`. Each bound name comes back as
/// its own binding.
pub fn match_variable(trimmed: &str) -> Vec<Binding> {
    let caps = match VARIABLE.captures(trimmed) {
        Some(caps) => caps,
        None => return Vec::new(),
    };
    [caps.get(1), caps.get(2)]
        .into_iter()
        .flatten()
        .map(|m| Binding {
            name: m.as_str().to_owned(),
            name_at: m.start(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── container heads ──

    #[test]
    fn container_head() {
        let head = match_container_head("Shape {").unwrap();
        assert_eq!(head.name, "Shape");
        assert!(head.implements.is_empty());
        assert_eq!(head.brace_at, 6);
    }

    #[test]
    fn container_head_requires_uppercase() {
        assert!(match_container_head("shape {").is_none());
        assert!(match_container_head("Shape").is_none());
    }

    #[test]
    fn container_head_ignores_class_with_implements() {
        assert!(match_container_head("Circle : Shape {").is_none());
    }

    #[test]
    fn class_head_with_interfaces() {
        let head = match_class_head("Circle : Shape, Printable {").unwrap();
        assert_eq!(head.name, "Circle");
        assert_eq!(head.implements, vec!["Shape", "Printable"]);
        assert_eq!(&"Circle : Shape, Printable {"[head.brace_at..], "{");
    }

    #[test]
    fn class_head_tolerates_tight_spacing() {
        let head = match_class_head("Box:Frobnicator{").unwrap();
        assert_eq!(head.name, "Box");
        assert_eq!(head.implements, vec!["Frobnicator"]);
    }

    #[test]
    fn lowercase_interface_list_is_not_a_class_head() {
        assert!(match_class_head("config : value {").is_none());
        assert!(match_class_head("Config : value {").is_none());
    }

    // ── signatures ──

    #[test]
    fn signature_with_return_type() {
        let sig = match_signature("area(): float").unwrap();
        assert_eq!(sig.name, "area");
        assert_eq!(sig.params, "");
        assert_eq!(sig.return_type.as_deref(), Some("float"));
    }

    #[test]
    fn signature_with_params_and_array_type() {
        let sig = match_signature("split(s: string, sep: string): [string]").unwrap();
        assert_eq!(sig.params, "s: string, sep: string");
        assert_eq!(sig.return_type.as_deref(), Some("[string]"));
    }

    #[test]
    fn signature_without_return_type() {
        let sig = match_signature("draw()").unwrap();
        assert_eq!(sig.return_type, None);
    }

    #[test]
    fn implementations_are_not_signatures() {
        assert!(match_signature("area() => 3.14").is_none());
        assert!(match_signature("area(): float {").is_none());
        assert!(match_signature("constructor(r: float)").is_none());
    }

    // ── callables ──

    #[test]
    fn block_callable() {
        let c = match_callable("area() {").unwrap();
        assert_eq!(c.name, "area");
        assert_eq!(c.body, Body::Block(7));
        assert_eq!(c.return_type, None);
    }

    #[test]
    fn expression_callable_with_return_type() {
        let c = match_callable("double(x: int): int => x * 2").unwrap();
        assert_eq!(c.name, "double");
        assert_eq!(c.params, "x: int");
        assert_eq!(c.return_type.as_deref(), Some("int"));
        assert_eq!(c.body, Body::Expression);
    }

    #[test]
    fn constructor_is_a_callable() {
        let c = match_callable("constructor(r: float) {").unwrap();
        assert!(c.is_constructor());
    }

    #[test]
    fn control_flow_is_not_a_callable() {
        assert!(match_callable("if (x > 1) {").is_none());
        assert!(match_callable("while (running) {").is_none());
    }

    #[test]
    fn plain_call_is_not_a_callable() {
        assert!(match_callable("print(x)").is_none());
    }

    #[test]
    fn wrapped_head_with_no_closing_paren() {
        assert_eq!(match_wrapped_head("area("), Some(("area".to_owned(), String::new())));
        assert_eq!(
            match_wrapped_head("scale(factor: float,"),
            Some(("scale".to_owned(), "factor: float".to_owned()))
        );
    }

    #[test]
    fn wrapped_head_rejects_complete_calls() {
        assert!(match_wrapped_head("area(): float {").is_none());
        assert!(match_wrapped_head("if (x &&").is_none());
        assert!(match_wrapped_head("radius: float").is_none());
    }

    // ── fields, constants, variables ──

    #[test]
    fn field_declaration() {
        let f = match_field("radius: float").unwrap();
        assert_eq!(f.name, "radius");
        assert_eq!(f.ty, "float");
    }

    #[test]
    fn field_rejects_signature_lines() {
        assert!(match_field("area(): float").is_none());
    }

    #[test]
    fn constant_declaration() {
        let c = match_constant("const MAX_USERS = 100").unwrap();
        assert_eq!(c.name, "MAX_USERS");
        assert_eq!(c.name_at, 6);
        assert_eq!(c.value, "100");
    }

    #[test]
    fn constant_requires_upper_snake_case() {
        assert!(match_constant("const maxUsers = 100").is_none());
    }

    #[test]
    fn single_variable() {
        let b = match_variable("let total = 0");
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].name, "total");
        assert_eq!(b[0].name_at, 4);
    }

    #[test]
    fn error_binding_yields_two_names() {
        let b = match_variable("let value, err = parse(s)");
        let names: Vec<&str> = b.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["value", "err"]);
        assert_eq!(b[1].name_at, 11);
    }

    #[test]
    fn typed_variable() {
        let b = match_variable("let count: int = 3");
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].name, "count");
    }

    #[test]
    fn not_a_variable() {
        assert!(match_variable("letter = 1").is_empty());
    }
}
