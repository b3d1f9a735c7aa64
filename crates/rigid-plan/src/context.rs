//! Contextualized type-tree nodes.
//!
//! [`TypeContext`] associates one syntactic [`TypeNode`] with its resolved
//! root [`TypeIdentity`], its recursively constructed child contexts, and
//! the annotations visible at that node. Contexts are created once per node
//! in a single top-down pass and never mutated; all operations are pure.

use rigid_resolve::{TypeIdentity, TypeResolver};
use rigid_types::tree::{Annotation, FieldDecl, TypeNode};
use rigid_types::{ErrorCode, PlanError, Result, Span};

use crate::annotations::{CONVERTER, DEFAULT, RESOLVER};
use crate::plan::Conversion;
use crate::registry;

const NO_FIELD_ANNOTATIONS: &[Annotation] = &[];

/// A meta-annotation hit: an attached annotation whose own declaration
/// carries the queried marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaMatch {
    /// Name of the attached annotation (e.g. `Sha256`).
    pub annotation: String,
    /// The marker annotation found on its declaration, with its arguments
    /// (e.g. `@HashScheme("sha256", 32)`).
    pub meta: Annotation,
}

/// A type-tree node wired to its resolution context.
pub struct TypeContext<'a> {
    node: &'a TypeNode,
    identity: TypeIdentity,
    children: Vec<TypeContext<'a>>,
    /// Annotations attached to the enclosing field; populated at the root
    /// context only.
    field_annotations: &'a [Annotation],
    resolver: &'a TypeResolver<'a>,
    file: &'a str,
}

impl<'a> TypeContext<'a> {
    /// Contextualize a field's type tree, making the field's own
    /// annotations visible at the root.
    pub fn for_field(
        field: &'a FieldDecl,
        resolver: &'a TypeResolver<'a>,
        file: &'a str,
    ) -> Self {
        Self::build(&field.ty, &field.annotations, resolver, file)
    }

    /// Contextualize a bare type tree.
    pub fn new(node: &'a TypeNode, resolver: &'a TypeResolver<'a>, file: &'a str) -> Self {
        Self::build(node, NO_FIELD_ANNOTATIONS, resolver, file)
    }

    fn build(
        node: &'a TypeNode,
        field_annotations: &'a [Annotation],
        resolver: &'a TypeResolver<'a>,
        file: &'a str,
    ) -> Self {
        let identity = resolver.resolve(&node.name.name);
        let children = node
            .args
            .iter()
            .map(|arg| Self::build(arg, NO_FIELD_ANNOTATIONS, resolver, file))
            .collect();
        Self {
            node,
            identity,
            children,
            field_annotations,
            resolver,
            file,
        }
    }

    // ──────────────────────────────────────────────────────────────────────
    // Derived values
    // ──────────────────────────────────────────────────────────────────────

    pub fn node(&self) -> &TypeNode {
        self.node
    }

    /// The canonical identity of the outer type name.
    pub fn root_type(&self) -> &TypeIdentity {
        &self.identity
    }

    pub fn is_nullable(&self) -> bool {
        self.node.nullable
    }

    /// True iff the root is registered under a native-collection rule.
    pub fn is_supported_collection(&self) -> bool {
        registry::is_native_collection(self.identity.simple_name())
    }

    pub fn children(&self) -> &[TypeContext<'a>] {
        &self.children
    }

    pub fn span(&self) -> Span {
        self.node.span
    }

    // ──────────────────────────────────────────────────────────────────────
    // Annotation queries
    // ──────────────────────────────────────────────────────────────────────

    /// Find at most one annotation by name.
    ///
    /// Use-site annotations (field-level, then the type node's own) are
    /// consulted first; the resolved identity's declaration metadata only
    /// when the use site has none — one query regardless of which resolution
    /// case produced the identity. More than one match within a source is a
    /// configuration error.
    pub fn find_annotation(&self, name: &str) -> Result<Option<&Annotation>> {
        let direct: Vec<&Annotation> = self
            .field_annotations
            .iter()
            .chain(self.node.annotations.iter())
            .filter(|a| a.name.name == name)
            .collect();
        if direct.len() > 1 {
            return Err(self.repeated_annotation_error(name, direct.len()));
        }
        if let Some(found) = direct.first().copied() {
            return Ok(Some(found));
        }

        let declared: Vec<&Annotation> = self
            .identity
            .annotations()
            .iter()
            .filter(|a| a.name.name == name)
            .collect();
        if declared.len() > 1 {
            return Err(self.repeated_annotation_error(name, declared.len()));
        }
        Ok(declared.first().copied())
    }

    /// Find at most one attached annotation whose own declaration carries
    /// `marker` (a scan of annotations-of-annotations).
    pub fn find_meta_annotation(&self, marker: &str) -> Result<Option<MetaMatch>> {
        let mut matches = Vec::new();
        let attached = self
            .field_annotations
            .iter()
            .chain(self.node.annotations.iter())
            .chain(self.identity.annotations().iter());
        for annotation in attached {
            let annotation_identity = self.resolver.resolve(&annotation.name.name);
            if let Some(meta) = annotation_identity.find_annotation(marker) {
                matches.push(MetaMatch {
                    annotation: annotation.name.name.clone(),
                    meta: meta.clone(),
                });
            }
        }
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            n => {
                let names: Vec<String> =
                    matches.iter().map(|m| format!("@{}", m.annotation)).collect();
                Err(self
                    .err(
                        ErrorCode::NON_REPEATABLE_ANNOTATION,
                        format!(
                            "found {n} @{marker}-bearing annotations on '{}': {}; at most one is allowed",
                            self.identity.simple_name(),
                            names.join(", ")
                        ),
                    )
                    .with_suggestion("keep exactly one scheme annotation"))
            }
        }
    }

    /// The default-value provider for this node, if one of the two accepted
    /// forms is present: `@Default(ref)`, or a conversion marker whose
    /// provider doubles as an embedded default.
    pub fn default_provider(&self) -> Result<Option<String>> {
        if let Some(default) = self.find_annotation(DEFAULT)? {
            let provider = default.ref_arg(0).ok_or_else(|| {
                self.err(
                    ErrorCode::MALFORMED_ANNOTATION,
                    format!("@{DEFAULT} requires a provider reference argument"),
                )
            })?;
            return Ok(Some(provider.to_string()));
        }
        Ok(self.conversion()?.map(|conv| conv.provider))
    }

    /// The surrogate conversion for this node, if a `@Converter` or
    /// `@Resolver` marker is present.
    pub fn conversion(&self) -> Result<Option<Conversion>> {
        for marker in [CONVERTER, RESOLVER] {
            if let Some(annotation) = self.find_annotation(marker)? {
                let surrogate = annotation.ref_arg(0).ok_or_else(|| {
                    self.err(
                        ErrorCode::MALFORMED_ANNOTATION,
                        format!("@{marker} requires a surrogate type argument"),
                    )
                })?;
                let provider = annotation.ref_arg(1).ok_or_else(|| {
                    self.err(
                        ErrorCode::MALFORMED_ANNOTATION,
                        format!("@{marker} requires a conversion provider argument"),
                    )
                })?;
                return Ok(Some(Conversion {
                    surrogate: surrogate.to_string(),
                    provider: provider.to_string(),
                }));
            }
        }
        Ok(None)
    }

    // ──────────────────────────────────────────────────────────────────────
    // Tree rewrites
    // ──────────────────────────────────────────────────────────────────────

    /// Rewrite the underlying tree with `ann` attached at every level.
    pub fn attach_annotation(&self, ann: &Annotation) -> TypeNode {
        self.node.attach_annotation(ann)
    }

    /// Rewrite the underlying tree with all annotations removed.
    pub fn strip_annotations(&self) -> TypeNode {
        self.node.strip_annotations()
    }

    // ──────────────────────────────────────────────────────────────────────
    // Errors
    // ──────────────────────────────────────────────────────────────────────

    pub(crate) fn err(&self, code: ErrorCode, message: String) -> PlanError {
        PlanError::new(self.file, code, message, self.node.span)
    }

    pub(crate) fn missing_default_error(&self) -> PlanError {
        self.err(
            ErrorCode::MISSING_ANNOTATION,
            format!(
                "type '{}' needs a default value here but provides none",
                self.identity.simple_name()
            ),
        )
        .with_suggestion(format!(
            "attach @{DEFAULT}(provider), or a @{CONVERTER}/@{RESOLVER} marker with an embedded default"
        ))
    }

    fn repeated_annotation_error(&self, name: &str, count: usize) -> PlanError {
        self.err(
            ErrorCode::NON_REPEATABLE_ANNOTATION,
            format!("@{name} appears {count} times on '{}'; it is not repeatable", self.identity.simple_name()),
        )
    }
}
