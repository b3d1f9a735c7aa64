//! The same-compilation-unit index.
//!
//! A separate indexing pass walks every type declaration in the current
//! compilation and registers it here before planning begins. The index is
//! append-only while building and immutable once frozen — build once, read
//! many. If the host compiles files in parallel, `finish()` is the barrier.

use std::collections::BTreeMap;

use rigid_types::tree::Annotation;
use thiserror::Error;

/// A declaration seen in the current compilation but not yet compiled.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub qualified_name: String,
    /// Raw annotation syntax captured at indexing time.
    pub annotations: Vec<Annotation>,
}

/// Errors raised while populating the index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Two declarations in one compilation share a simple name; a
    /// simple-name-keyed index cannot resolve them deterministically.
    #[error("duplicate type name '{name}': declared as both '{first}' and '{second}'")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },
}

/// Builder for [`CompilationIndex`]; the only mutable phase of its life.
#[derive(Debug, Default)]
pub struct CompilationIndexBuilder {
    entries: BTreeMap<String, IndexEntry>,
}

impl CompilationIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration under its simple name.
    pub fn add(
        &mut self,
        simple_name: impl Into<String>,
        entry: IndexEntry,
    ) -> Result<(), IndexError> {
        let simple_name = simple_name.into();
        if let Some(existing) = self.entries.get(&simple_name) {
            return Err(IndexError::DuplicateName {
                name: simple_name,
                first: existing.qualified_name.clone(),
                second: entry.qualified_name,
            });
        }
        self.entries.insert(simple_name, entry);
        Ok(())
    }

    /// Freeze the index. No further mutation is possible.
    pub fn finish(self) -> CompilationIndex {
        CompilationIndex {
            entries: self.entries,
        }
    }
}

/// Immutable mapping from simple type name to the declaration indexed for it.
#[derive(Debug, Default)]
pub struct CompilationIndex {
    entries: BTreeMap<String, IndexEntry>,
}

impl CompilationIndex {
    /// An index with nothing in it.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, simple_name: &str) -> Option<&IndexEntry> {
        self.entries.get(simple_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
