//! Access to already-compiled type metadata.

use std::collections::HashMap;

use rigid_types::tree::Annotation;

/// A type whose compiled artifact is loadable, with its annotation metadata
/// accessible.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledType {
    pub qualified_name: String,
    pub annotations: Vec<Annotation>,
}

impl CompiledType {
    pub fn new(qualified_name: impl Into<String>, annotations: Vec<Annotation>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            annotations,
        }
    }
}

/// Source of compiled-artifact metadata.
///
/// A load failure is indistinguishable from "not compiled yet": resolution
/// is best-effort by contract and simply falls through to the next layer.
pub trait ArtifactStore {
    fn load(&self, qualified_name: &str) -> Option<CompiledType>;
}

/// In-memory artifact store, used by test harnesses and hosts that hold
/// their compiled metadata in memory.
#[derive(Debug, Default)]
pub struct MemoryArtifacts {
    types: HashMap<String, CompiledType>,
}

impl MemoryArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ty: CompiledType) {
        self.types.insert(ty.qualified_name.clone(), ty);
    }
}

impl ArtifactStore for MemoryArtifacts {
    fn load(&self, qualified_name: &str) -> Option<CompiledType> {
        self.types.get(qualified_name).cloned()
    }
}

/// An artifact store with nothing in it, for hosts with no compiled
/// classpath at all.
#[derive(Debug, Default)]
pub struct NoArtifacts;

impl ArtifactStore for NoArtifacts {
    fn load(&self, _qualified_name: &str) -> Option<CompiledType> {
        None
    }
}
