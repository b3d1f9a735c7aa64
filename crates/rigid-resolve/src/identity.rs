//! Canonical type identities.

use std::fmt;

use rigid_types::tree::Annotation;

use crate::artifact::CompiledType;

/// A canonical reference to a type, immutable once produced.
///
/// The three cases differ in how much metadata survived resolution, but all
/// expose the same annotation query surface so downstream rules do not
/// depend on which resolution layer produced the identity.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeIdentity {
    /// Fully known: a compiled artifact with accessible annotation metadata.
    Resolved(CompiledType),
    /// Declared in the current compilation but not yet materialized; carries
    /// the annotation syntax captured by the indexing pass. The list is empty
    /// for cross-module forward references, whose annotations are
    /// unrecoverable.
    PartiallyKnown {
        qualified_name: String,
        annotations: Vec<Annotation>,
    },
    /// A bare name with no further metadata available.
    Unresolved { name: String },
}

impl TypeIdentity {
    /// The best available qualified name; the bare name when unresolved.
    pub fn qualified_name(&self) -> &str {
        match self {
            TypeIdentity::Resolved(compiled) => &compiled.qualified_name,
            TypeIdentity::PartiallyKnown { qualified_name, .. } => qualified_name,
            TypeIdentity::Unresolved { name } => name,
        }
    }

    /// The last segment of the qualified name.
    pub fn simple_name(&self) -> &str {
        let qualified = self.qualified_name();
        qualified.rsplit('.').next().unwrap_or(qualified)
    }

    /// The annotations visible on this identity. Unresolved identities have
    /// none; callers that require one fail loudly downstream.
    pub fn annotations(&self) -> &[Annotation] {
        match self {
            TypeIdentity::Resolved(compiled) => &compiled.annotations,
            TypeIdentity::PartiallyKnown { annotations, .. } => annotations,
            TypeIdentity::Unresolved { .. } => &[],
        }
    }

    /// Linear scan for an annotation by name.
    pub fn find_annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations().iter().find(|a| a.name.name == name)
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.find_annotation(name).is_some()
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeIdentity::Resolved(_) => write!(f, "{} (compiled)", self.qualified_name()),
            TypeIdentity::PartiallyKnown { .. } => {
                write!(f, "{} (this compilation)", self.qualified_name())
            }
            TypeIdentity::Unresolved { name } => write!(f, "{name} (unresolved)"),
        }
    }
}
