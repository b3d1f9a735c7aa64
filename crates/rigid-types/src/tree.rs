//! The annotated type-tree model consumed by the planner.
//!
//! A host front end (parser, IDE model, or test harness) supplies a
//! [`RecordDecl`] whose fields carry [`TypeNode`] trees: outer type name,
//! nullability marker, ordered child type arguments, and per-level
//! [`Annotation`]s. Every node carries a [`Span`] for error reporting.
//! Trees are immutable; the rewrite operations return new trees.

use crate::Span;

// ══════════════════════════════════════════════════════════════════════════════
// Identifiers
// ══════════════════════════════════════════════════════════════════════════════

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Annotations
// ══════════════════════════════════════════════════════════════════════════════

/// A single annotation argument.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationArg {
    /// An integer literal, e.g. the `3` in `@Size(3)`.
    Int(u64),
    /// A string literal, e.g. `"sha256"`.
    Str(String),
    /// A reference to a declaration by dotted path, e.g. `deals.zeroAmount`.
    Ref(String),
}

impl std::fmt::Display for AnnotationArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnotationArg::Int(n) => write!(f, "{n}"),
            AnnotationArg::Str(s) => write!(f, "\"{s}\""),
            AnnotationArg::Ref(path) => write!(f, "{path}"),
        }
    }
}

/// An annotation attached to a type-tree node, field, or declaration:
/// `@Size(3)`, `@Ascii(10)`, `@Converter(Surrogate, deals.convert)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: Ident,
    pub args: Vec<AnnotationArg>,
    pub span: Span,
}

impl Annotation {
    pub fn new(name: Ident, args: Vec<AnnotationArg>) -> Self {
        let span = name.span;
        Self { name, args, span }
    }

    /// The integer argument at `idx`, if present and integral.
    pub fn int_arg(&self, idx: usize) -> Option<u64> {
        match self.args.get(idx)? {
            AnnotationArg::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The string argument at `idx`, if present.
    pub fn str_arg(&self, idx: usize) -> Option<&str> {
        match self.args.get(idx)? {
            AnnotationArg::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The reference argument at `idx`, if present.
    pub fn ref_arg(&self, idx: usize) -> Option<&str> {
        match self.args.get(idx)? {
            AnnotationArg::Ref(path) => Some(path),
            _ => None,
        }
    }

    /// Textual form: `@Size(3)`.
    pub fn render(&self) -> String {
        if self.args.is_empty() {
            format!("@{}", self.name.name)
        } else {
            let args: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
            format!("@{}({})", self.name.name, args.join(", "))
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Type trees
// ══════════════════════════════════════════════════════════════════════════════

/// One node of a syntactic type tree: `@Size(3) List<@Default(d) Int>?`.
///
/// The grammar is acyclic, so a node owns its child arguments outright
/// (tree, not graph).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeNode {
    pub name: Ident,
    pub nullable: bool,
    pub args: Vec<TypeNode>,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

impl TypeNode {
    /// A bare, non-null node with no arguments or annotations.
    pub fn named(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: Ident::new(name, span),
            nullable: false,
            args: Vec::new(),
            annotations: Vec::new(),
            span,
        }
    }

    /// Textual form of the whole tree, annotations and nullability included.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for ann in &self.annotations {
            out.push_str(&ann.render());
            out.push(' ');
        }
        out.push_str(&self.name.name);
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(|a| a.render()).collect();
            out.push('<');
            out.push_str(&args.join(", "));
            out.push('>');
        }
        if self.nullable {
            out.push('?');
        }
        out
    }

    /// Rewrite the tree with `ann` added at the root and at every nested
    /// child argument, preserving nullability markers per level.
    pub fn attach_annotation(&self, ann: &Annotation) -> TypeNode {
        let mut annotations = self.annotations.clone();
        annotations.push(ann.clone());
        TypeNode {
            name: self.name.clone(),
            nullable: self.nullable,
            args: self.args.iter().map(|a| a.attach_annotation(ann)).collect(),
            annotations,
            span: self.span,
        }
    }

    /// Rewrite the tree with every annotation removed at every level,
    /// preserving nullability markers per level.
    pub fn strip_annotations(&self) -> TypeNode {
        TypeNode {
            name: self.name.clone(),
            nullable: self.nullable,
            args: self.args.iter().map(|a| a.strip_annotations()).collect(),
            annotations: Vec::new(),
            span: self.span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Imports
// ══════════════════════════════════════════════════════════════════════════════

/// An import line of the enclosing compilation unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    /// Dotted path: `deals.Counterparty`, or the package part for wildcards.
    pub path: String,
    pub wildcard: bool,
    pub span: Span,
}

impl Import {
    pub fn exact(path: impl Into<String>, span: Span) -> Self {
        Self {
            path: path.into(),
            wildcard: false,
            span,
        }
    }

    pub fn wildcard(path: impl Into<String>, span: Span) -> Self {
        Self {
            path: path.into(),
            wildcard: true,
            span,
        }
    }

    /// The simple name this import binds, `None` for wildcards.
    pub fn simple_name(&self) -> Option<&str> {
        if self.wildcard {
            return None;
        }
        Some(self.path.rsplit('.').next().unwrap_or(&self.path))
    }

    /// Textual form: `import deals.*` or `import deals.Counterparty`.
    pub fn render(&self) -> String {
        if self.wildcard {
            format!("import {}.*", self.path)
        } else {
            format!("import {}", self.path)
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Record declarations
// ══════════════════════════════════════════════════════════════════════════════

/// What kind of declaration a record is. Only concrete classes are
/// plannable; the rest are rejected by the assembler's shape check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Class,
    Interface,
    AnnotationClass,
    Object,
}

/// A record type declaration: the unit the planner compiles.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDecl {
    pub name: Ident,
    /// Dotted package of the enclosing compilation unit.
    pub package: String,
    pub kind: RecordKind,
    pub is_abstract: bool,
    pub type_params: Vec<Ident>,
    pub annotations: Vec<Annotation>,
    pub imports: Vec<Import>,
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

impl RecordDecl {
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.name.clone()
        } else {
            format!("{}.{}", self.package, self.name.name)
        }
    }
}

/// One constructor field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: Ident,
    pub ty: TypeNode,
    /// Annotations attached to the field itself (not to its type tree).
    pub annotations: Vec<Annotation>,
    /// Captured properties get a codec plan; plain parameters pass through.
    pub is_property: bool,
    pub span: Span,
}

impl FieldDecl {
    /// Textual form of the original declaration: `@Conv(..) name: Type?`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for ann in &self.annotations {
            out.push_str(&ann.render());
            out.push(' ');
        }
        out.push_str(&self.name.name);
        out.push_str(": ");
        out.push_str(&self.ty.render());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp() -> Span {
        Span::point(1, 1)
    }

    fn ann(name: &str, args: Vec<AnnotationArg>) -> Annotation {
        Annotation::new(Ident::new(name, sp()), args)
    }

    #[test]
    fn test_annotation_render() {
        assert_eq!(ann("Size", vec![AnnotationArg::Int(3)]).render(), "@Size(3)");
        assert_eq!(
            ann(
                "Converter",
                vec![
                    AnnotationArg::Ref("deals.Surrogate".into()),
                    AnnotationArg::Ref("deals.convert".into())
                ]
            )
            .render(),
            "@Converter(deals.Surrogate, deals.convert)"
        );
        assert_eq!(ann("AsciiChar", vec![]).render(), "@AsciiChar");
        assert_eq!(
            ann("HashScheme", vec![AnnotationArg::Str("sha256".into())]).render(),
            "@HashScheme(\"sha256\")"
        );
    }

    #[test]
    fn test_annotation_args() {
        let a = ann(
            "Digits",
            vec![AnnotationArg::Int(10), AnnotationArg::Int(2)],
        );
        assert_eq!(a.int_arg(0), Some(10));
        assert_eq!(a.int_arg(1), Some(2));
        assert_eq!(a.int_arg(2), None);
        assert_eq!(a.str_arg(0), None);
    }

    #[test]
    fn test_type_node_render_nested() {
        let mut list = TypeNode::named("List", sp());
        list.annotations.push(ann("Size", vec![AnnotationArg::Int(3)]));
        let mut inner = TypeNode::named("Int", sp());
        inner.nullable = true;
        list.args.push(inner);
        assert_eq!(list.render(), "@Size(3) List<Int?>");
    }

    #[test]
    fn test_attach_annotation_reaches_every_level() {
        let mut map = TypeNode::named("Map", sp());
        map.args.push(TypeNode::named("String", sp()));
        map.args.push(TypeNode::named("Int", sp()));
        map.nullable = true;

        let marker = ann("Fixed", vec![]);
        let attached = map.attach_annotation(&marker);

        assert!(attached.annotations.iter().any(|a| a.name.name == "Fixed"));
        for arg in &attached.args {
            assert!(arg.annotations.iter().any(|a| a.name.name == "Fixed"));
        }
        // Nullability preserved per level
        assert!(attached.nullable);
        assert!(!attached.args[0].nullable);
    }

    #[test]
    fn test_strip_annotations_reaches_every_level() {
        let mut list = TypeNode::named("List", sp());
        list.annotations.push(ann("Size", vec![AnnotationArg::Int(5)]));
        let mut inner = TypeNode::named("String", sp());
        inner.annotations.push(ann("Ascii", vec![AnnotationArg::Int(8)]));
        inner.nullable = true;
        list.args.push(inner);

        let stripped = list.strip_annotations();
        assert!(stripped.annotations.is_empty());
        assert!(stripped.args[0].annotations.is_empty());
        assert!(stripped.args[0].nullable);
        assert_eq!(stripped.render(), "List<String?>");
    }

    #[test]
    fn test_import_simple_name() {
        assert_eq!(
            Import::exact("deals.Counterparty", sp()).simple_name(),
            Some("Counterparty")
        );
        assert_eq!(Import::exact("Bare", sp()).simple_name(), Some("Bare"));
        assert_eq!(Import::wildcard("deals", sp()).simple_name(), None);
        assert_eq!(Import::wildcard("deals", sp()).render(), "import deals.*");
    }

    #[test]
    fn test_record_qualified_name() {
        let rec = RecordDecl {
            name: Ident::new("Deal", sp()),
            package: "com.app.deals".into(),
            kind: RecordKind::Class,
            is_abstract: false,
            type_params: vec![],
            annotations: vec![],
            imports: vec![],
            fields: vec![],
            span: sp(),
        };
        assert_eq!(rec.qualified_name(), "com.app.deals.Deal");
    }

    #[test]
    fn test_field_render() {
        let mut ty = TypeNode::named("Int", sp());
        ty.nullable = true;
        let field = FieldDecl {
            name: Ident::new("amount", sp()),
            ty,
            annotations: vec![ann("Default", vec![AnnotationArg::Ref("deals.zero".into())])],
            is_property: true,
            span: sp(),
        };
        assert_eq!(field.render(), "@Default(deals.zero) amount: Int?");
    }
}
