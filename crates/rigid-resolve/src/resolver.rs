//! Best-effort type name resolution.

use rigid_types::tree::Import;
use rigid_types::Result;

use crate::artifact::ArtifactStore;
use crate::identity::TypeIdentity;
use crate::imports::ImportTable;
use crate::index::CompilationIndex;

/// Resolves bare type names to canonical identities for one compilation
/// unit. Holds the unit's explicit import set and package, plus read-only
/// views of the compiled-artifact store and the frozen compilation index.
pub struct TypeResolver<'a> {
    imports: ImportTable,
    package: String,
    artifacts: &'a dyn ArtifactStore,
    index: &'a CompilationIndex,
}

impl std::fmt::Debug for TypeResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeResolver")
            .field("imports", &self.imports)
            .field("package", &self.package)
            .field("artifacts", &"<dyn ArtifactStore>")
            .field("index", &self.index)
            .finish()
    }
}

impl<'a> TypeResolver<'a> {
    /// Build a resolver. Fails if the unit contains wildcard imports.
    pub fn new(
        file: &str,
        package: impl Into<String>,
        imports: &[Import],
        artifacts: &'a dyn ArtifactStore,
        index: &'a CompilationIndex,
    ) -> Result<Self> {
        Ok(Self {
            imports: ImportTable::build(file, imports)?,
            package: package.into(),
            artifacts,
            index,
        })
    }

    /// Resolve a simple name to its canonical identity. First match wins:
    ///
    /// 1. explicit import whose target is loadable as a compiled artifact;
    /// 2. same-package compiled artifact;
    /// 3. same-compilation index entry (declared here, not yet compiled);
    /// 4. explicit import with no artifact and no index entry — a
    ///    cross-module forward reference whose annotations are unrecoverable;
    /// 5. the bare name, unresolved.
    pub fn resolve(&self, simple_name: &str) -> TypeIdentity {
        if let Some(imported) = self.imports.lookup(simple_name) {
            if let Some(compiled) = self.artifacts.load(imported) {
                return TypeIdentity::Resolved(compiled);
            }
        }

        if !self.package.is_empty() {
            let in_package = format!("{}.{}", self.package, simple_name);
            if let Some(compiled) = self.artifacts.load(&in_package) {
                return TypeIdentity::Resolved(compiled);
            }
        }

        if let Some(entry) = self.index.get(simple_name) {
            return TypeIdentity::PartiallyKnown {
                qualified_name: entry.qualified_name.clone(),
                annotations: entry.annotations.clone(),
            };
        }

        if let Some(imported) = self.imports.lookup(simple_name) {
            return TypeIdentity::PartiallyKnown {
                qualified_name: imported.to_string(),
                annotations: Vec::new(),
            };
        }

        TypeIdentity::Unresolved {
            name: simple_name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{CompiledType, MemoryArtifacts, NoArtifacts};
    use crate::index::{CompilationIndexBuilder, IndexEntry};
    use rigid_types::Span;

    fn sp() -> Span {
        Span::point(1, 1)
    }

    #[test]
    fn test_fallback_to_unresolved() {
        let index = CompilationIndex::empty();
        let resolver = TypeResolver::new("Deal.rg", "com.app", &[], &NoArtifacts, &index).unwrap();
        assert_eq!(
            resolver.resolve("Int"),
            TypeIdentity::Unresolved { name: "Int".into() }
        );
    }

    #[test]
    fn test_imported_uncompiled_unindexed_keeps_qualified_name() {
        let index = CompilationIndex::empty();
        let imports = [Import::exact("other.module.Thing", sp())];
        let resolver =
            TypeResolver::new("Deal.rg", "com.app", &imports, &NoArtifacts, &index).unwrap();
        match resolver.resolve("Thing") {
            TypeIdentity::PartiallyKnown {
                qualified_name,
                annotations,
            } => {
                assert_eq!(qualified_name, "other.module.Thing");
                assert!(annotations.is_empty());
            }
            other => panic!("expected PartiallyKnown, got {other:?}"),
        }
    }

    #[test]
    fn test_same_package_compiled_artifact() {
        let mut artifacts = MemoryArtifacts::new();
        artifacts.insert(CompiledType::new("com.app.Leg", vec![]));
        let index = CompilationIndex::empty();
        let resolver = TypeResolver::new("Deal.rg", "com.app", &[], &artifacts, &index).unwrap();
        match resolver.resolve("Leg") {
            TypeIdentity::Resolved(compiled) => {
                assert_eq!(compiled.qualified_name, "com.app.Leg")
            }
            other => panic!("expected Resolved, got {other:?}"),
        }
    }

    #[test]
    fn test_index_entry_before_import_fallback() {
        let mut builder = CompilationIndexBuilder::new();
        builder
            .add(
                "Leg",
                IndexEntry {
                    qualified_name: "com.app.Leg".into(),
                    annotations: vec![],
                },
            )
            .unwrap();
        let index = builder.finish();
        // Also imported, but with no compiled artifact: the index wins.
        let imports = [Import::exact("other.Leg", sp())];
        let resolver =
            TypeResolver::new("Deal.rg", "com.app", &imports, &NoArtifacts, &index).unwrap();
        match resolver.resolve("Leg") {
            TypeIdentity::PartiallyKnown { qualified_name, .. } => {
                assert_eq!(qualified_name, "com.app.Leg")
            }
            other => panic!("expected PartiallyKnown, got {other:?}"),
        }
    }
}
