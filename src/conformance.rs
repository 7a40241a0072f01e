//! Interface conformance: every class must implement, by name, each method
//! of every interface it lists after `:`.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::debug;

use crate::line_index::Span;
use crate::symbols::{Symbol, SymbolKind, SymbolModel};

/// Interfaces by name. A later declaration replaces an earlier one.
#[derive(Debug, Default)]
pub struct InterfaceTable<'m> {
    by_name: HashMap<&'m str, &'m Symbol>,
}

impl<'m> InterfaceTable<'m> {
    pub fn from_model(model: &'m SymbolModel) -> Self {
        let mut by_name = HashMap::new();
        for iface in model.interfaces() {
            by_name.insert(iface.name.as_str(), iface);
        }
        Self { by_name }
    }

    pub fn get(&self, name: &str) -> Option<&'m Symbol> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[derive(Debug)]
pub struct ClassEntry<'m> {
    pub name: &'m str,
    pub implements: &'m [String],
    /// Names of the class's own methods; the constructor is not a method.
    pub methods: HashSet<&'m str>,
    /// The line carrying `Name : Iface {`.
    pub implements_span: Span,
}

/// Classes in document order.
#[derive(Debug, Default)]
pub struct ClassTable<'m> {
    pub entries: Vec<ClassEntry<'m>>,
}

impl<'m> ClassTable<'m> {
    pub fn from_model(model: &'m SymbolModel) -> Self {
        let entries = model
            .classes()
            .map(|class| ClassEntry {
                name: &class.name,
                implements: &class.implements,
                methods: class.methods().map(|m| m.name.as_str()).collect(),
                implements_span: class.header_span,
            })
            .collect();
        Self { entries }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    UnknownInterface,
    MissingMethod,
}

/// The interface's declaration of a method the class lacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredMethod {
    pub name: String,
    pub params: String,
    pub return_type: Option<String>,
}

impl RequiredMethod {
    fn from_symbol(symbol: &Symbol) -> Self {
        Self {
            name: symbol.name.clone(),
            params: symbol.signature.clone(),
            return_type: symbol.declared_type.clone(),
        }
    }
}

impl fmt::Display for RequiredMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.params)?;
        if let Some(ref ty) = self.return_type {
            write!(f, ": {}", ty)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub class_name: String,
    pub interface_name: String,
    /// Set for `MissingMethod` only.
    pub method: Option<RequiredMethod>,
    pub span: Span,
}

impl Violation {
    pub fn is_error(&self) -> bool {
        self.kind == ViolationKind::MissingMethod
    }

    pub fn message(&self) -> String {
        match (self.kind, &self.method) {
            (ViolationKind::MissingMethod, Some(method)) => format!(
                "Class '{}' does not implement method '{}' from interface '{}'\n\n\
                 Required: {}\n\n\
                 Add this method to the class or remove the interface from the implements clause",
                self.class_name, method.name, self.interface_name, method
            ),
            _ => format!("Interface '{}' not found", self.interface_name),
        }
    }
}

/// Violations ordered by class, then implements list, then interface
/// method order.
pub fn check(interfaces: &InterfaceTable<'_>, classes: &ClassTable<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for class in &classes.entries {
        for iface_name in class.implements {
            let iface = match interfaces.get(iface_name) {
                Some(iface) => iface,
                None => {
                    violations.push(Violation {
                        kind: ViolationKind::UnknownInterface,
                        class_name: class.name.to_owned(),
                        interface_name: iface_name.clone(),
                        method: None,
                        span: class.implements_span,
                    });
                    continue;
                }
            };

            for required in iface.members.iter().filter(|m| m.kind == SymbolKind::Method) {
                if class.methods.contains(required.name.as_str()) {
                    continue;
                }
                violations.push(Violation {
                    kind: ViolationKind::MissingMethod,
                    class_name: class.name.to_owned(),
                    interface_name: iface_name.clone(),
                    method: Some(RequiredMethod::from_symbol(required)),
                    span: class.implements_span,
                });
            }
        }
    }

    violations
}

/// Builds both tables from one model and checks them.
pub fn validate(model: &SymbolModel) -> Vec<Violation> {
    let interfaces = InterfaceTable::from_model(model);
    let classes = ClassTable::from_model(model);
    let violations = check(&interfaces, &classes);
    debug!(
        interfaces = interfaces.len(),
        classes = classes.entries.len(),
        violations = violations.len(),
        "conformance checked"
    );
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract;

    fn violations(text: &str) -> Vec<Violation> {
        validate(&extract(text))
    }

    const SHAPE: &str = "Shape {\n    area(): float\n}\n\n";

    #[test]
    fn missing_method_is_reported_once() {
        let text = format!(
            "{}Circle : Shape {{\n    constructor(r: float) {{\n        this.r = r\n    }}\n}}\n",
            SHAPE
        );
        let v = violations(&text);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].kind, ViolationKind::MissingMethod);
        assert_eq!(v[0].class_name, "Circle");
        assert_eq!(v[0].interface_name, "Shape");
        assert_eq!(v[0].method.as_ref().unwrap().name, "area");
        assert!(v[0].is_error());
    }

    #[test]
    fn implemented_method_satisfies_interface() {
        let text = format!(
            "{}Circle : Shape {{\n    constructor(r: float) {{\n        this.r = r\n    }}\n    area() {{ return 3.14 }}\n}}\n",
            SHAPE
        );
        assert!(violations(&text).is_empty());
    }

    #[test]
    fn unknown_interface_only() {
        let text = "Box : Frobnicator {\n    constructor() {\n    }\n}\n";
        let v = violations(text);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].kind, ViolationKind::UnknownInterface);
        assert_eq!(v[0].message(), "Interface 'Frobnicator' not found");
        assert!(!v[0].is_error());
    }

    #[test]
    fn span_is_the_implements_line() {
        let text = format!("{}  Circle : Shape {{\n    constructor() {{}}\n}}\n", SHAPE);
        let v = violations(&text);
        assert_eq!(v[0].span, Span::on_line(4, 0, 18));
    }

    #[test]
    fn matching_is_by_name_only() {
        let text = format!(
            "{}Square : Shape {{\n    constructor() {{}}\n    area(unit: string): string => \"1\" + unit\n}}\n",
            SHAPE
        );
        assert!(violations(&text).is_empty());
    }

    #[test]
    fn method_with_wrapped_parameters_is_implemented() {
        let text = format!(
            "{}Circle : Shape {{\n    constructor() {{}}\n    area(\n        unit: string\n    ): float {{\n        return 1.0\n    }}\n}}\n",
            SHAPE
        );
        assert!(violations(&text).is_empty());
    }

    #[test]
    fn block_declaring_a_constructor_is_not_an_interface() {
        let text = "Builder {\n    constructor()\n}\n\
                    Thing : Builder {\n    constructor() {}\n}\n";
        let v = violations(text);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].kind, ViolationKind::UnknownInterface);
    }

    #[test]
    fn violation_order_follows_declarations() {
        let text = "A {\n    one()\n    two()\n}\n\
                    B {\n    three()\n}\n\
                    First : B, A, Missing {\n    constructor() {}\n}\n\
                    Second : A {\n    constructor() {}\n    two() => 2\n}\n";
        let v = violations(text);
        let summary: Vec<(&str, &str, Option<&str>)> = v
            .iter()
            .map(|v| {
                (
                    v.class_name.as_str(),
                    v.interface_name.as_str(),
                    v.method.as_ref().map(|m| m.name.as_str()),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("First", "B", Some("three")),
                ("First", "A", Some("one")),
                ("First", "A", Some("two")),
                ("First", "Missing", None),
                ("Second", "A", Some("one")),
            ]
        );
    }

    #[test]
    fn last_interface_definition_wins() {
        let text = "Named {\n    name(): string\n}\n\
                    Named {\n    label(): string\n}\n\
                    Tag : Named {\n    constructor() {}\n    name() => \"t\"\n}\n";
        let v = violations(text);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].method.as_ref().unwrap().name, "label");
    }

    #[test]
    fn missing_method_message() {
        let text = "Reader {\n    read(n: int): string\n}\n\
                    File : Reader {\n    constructor() {}\n}\n";
        let v = violations(text);
        assert_eq!(
            v[0].message(),
            "Class 'File' does not implement method 'read' from interface 'Reader'\n\n\
             Required: read(n: int): string\n\n\
             Add this method to the class or remove the interface from the implements clause"
        );
    }

    #[test]
    fn tables_from_model() {
        let model = extract(&format!("{}Circle : Shape {{\n    constructor() {{}}\n    area() => 1\n}}\n", SHAPE));
        let interfaces = InterfaceTable::from_model(&model);
        let classes = ClassTable::from_model(&model);
        assert_eq!(interfaces.len(), 1);
        assert!(interfaces.get("Shape").is_some());
        assert_eq!(classes.entries.len(), 1);
        assert!(classes.entries[0].methods.contains("area"));
        assert!(!classes.entries[0].methods.contains("constructor"));
    }
}
