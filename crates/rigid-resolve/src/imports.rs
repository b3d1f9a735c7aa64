//! The explicit import set of one compilation unit.

use std::collections::BTreeMap;

use rigid_types::tree::Import;
use rigid_types::{ErrorCode, PlanError, Result, Span};

/// Maps simple names to the fully-qualified names their imports bind.
///
/// Resolution determinism requires an unambiguous, explicit import set, so
/// construction rejects wildcard imports outright.
#[derive(Debug)]
pub struct ImportTable {
    by_simple: BTreeMap<String, String>,
}

impl ImportTable {
    /// Build the table, failing on any wildcard import. The error lists
    /// every offending import line.
    pub fn build(file: &str, imports: &[Import]) -> Result<Self> {
        let wildcards: Vec<&Import> = imports.iter().filter(|i| i.wildcard).collect();
        if !wildcards.is_empty() {
            let lines: Vec<String> = wildcards.iter().map(|i| i.render()).collect();
            let span = wildcards
                .iter()
                .map(|i| i.span)
                .reduce(Span::merge)
                .unwrap_or_else(|| Span::point(1, 1));
            return Err(PlanError::new(
                file,
                ErrorCode::WILDCARD_IMPORT,
                format!(
                    "wildcard imports cannot be resolved unambiguously: {}",
                    lines.join(", ")
                ),
                span,
            )
            .with_suggestion("replace each wildcard import with explicit imports"));
        }

        let mut by_simple = BTreeMap::new();
        for import in imports {
            if let Some(simple) = import.simple_name() {
                by_simple.insert(simple.to_string(), import.path.clone());
            }
        }
        Ok(Self { by_simple })
    }

    /// The fully-qualified name an explicit import binds `simple_name` to.
    pub fn lookup(&self, simple_name: &str) -> Option<&str> {
        self.by_simple.get(simple_name).map(String::as_str)
    }
}
