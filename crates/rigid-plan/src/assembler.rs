//! Top-level plan assembly for one record type.
//!
//! For each field that is a captured property, the assembler builds its
//! context, asks the registry for a plan, renders it with a fresh tracker,
//! and produces the field's rewritten declaration pointing at the top-level
//! generated codec symbol. Failure in any single field aborts assembly for
//! the whole record: no partial codec is ever emitted.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use rigid_resolve::{ArtifactStore, CompilationIndex, TypeResolver};
use rigid_types::tree::{RecordDecl, RecordKind};
use rigid_types::{ErrorCode, PlanError, Result};

use crate::context::TypeContext;
use crate::namer::Tracker;
use crate::plan::Declaration;
use crate::registry::ProcessorRegistry;

/// The plan outcome for one constructor field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldPlan {
    /// A captured property: rewritten declaration plus the generated
    /// declarations it requires, in production order.
    Serialized {
        name: String,
        rewritten: String,
        /// The top-level generated codec symbol the rewritten declaration
        /// points at.
        serializer: String,
        declarations: Vec<Declaration>,
    },
    /// Not a captured property: passes through unchanged, no plan.
    Verbatim { declaration: String },
}

/// The complete generated codec set for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordCodec {
    /// Qualified name of the planned record.
    pub record: String,
    pub fields: Vec<FieldPlan>,
    /// SHA-256 over the full generated output; equal inputs (and equal
    /// index state) must produce equal fingerprints.
    pub fingerprint: String,
}

impl RecordCodec {
    /// All generated declarations across fields, in production order.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.fields.iter().flat_map(|field| match field {
            FieldPlan::Serialized { declarations, .. } => declarations.as_slice(),
            FieldPlan::Verbatim { .. } => &[] as &[Declaration],
        })
    }

    /// The manifest a host splices from, as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Drives planning for one record declaration.
pub struct PlanAssembler<'a> {
    record: &'a RecordDecl,
    resolver: TypeResolver<'a>,
    file: &'a str,
}

impl<'a> PlanAssembler<'a> {
    /// Validate the record's shape and set up resolution. Fails on
    /// disallowed shapes and wildcard imports before any field is planned.
    pub fn new(
        file: &'a str,
        record: &'a RecordDecl,
        artifacts: &'a dyn ArtifactStore,
        index: &'a CompilationIndex,
    ) -> Result<Self> {
        check_shape(file, record)?;
        let resolver = TypeResolver::new(
            file,
            record.package.clone(),
            &record.imports,
            artifacts,
            index,
        )?;
        Ok(Self {
            record,
            resolver,
            file,
        })
    }

    /// Plan every captured property of the record.
    pub fn assemble(&self) -> Result<RecordCodec> {
        let registry = ProcessorRegistry::new();
        let mut fields = Vec::with_capacity(self.record.fields.len());
        for field in &self.record.fields {
            if !field.is_property {
                fields.push(FieldPlan::Verbatim {
                    declaration: field.render(),
                });
                continue;
            }
            let ctx = TypeContext::for_field(field, &self.resolver, self.file);
            let plan = registry.build(&ctx)?;

            let mut declarations = Vec::new();
            let serializer =
                plan.render(&Tracker::new(field.name.name.as_str()), &mut declarations);
            let rewritten = format!(
                "@UseCodec({serializer}) {}: {}",
                field.name.name,
                field.ty.strip_annotations().render()
            );
            fields.push(FieldPlan::Serialized {
                name: field.name.name.clone(),
                rewritten,
                serializer,
                declarations,
            });
        }

        let record = self.record.qualified_name();
        let fingerprint = fingerprint(&record, &fields);
        Ok(RecordCodec {
            record,
            fields,
            fingerprint,
        })
    }
}

/// Convenience entry point: shape check, resolution setup, and assembly.
pub fn plan_record(
    file: &str,
    record: &RecordDecl,
    artifacts: &dyn ArtifactStore,
    index: &CompilationIndex,
) -> Result<RecordCodec> {
    PlanAssembler::new(file, record, artifacts, index)?.assemble()
}

/// Records must be concrete, non-generic classes: a codec for an open shape
/// cannot have a fixed layout.
fn check_shape(file: &str, record: &RecordDecl) -> Result<()> {
    let reject = |what: &str| {
        Err(PlanError::new(
            file,
            ErrorCode::DISALLOWED_SHAPE,
            format!("'{}' is {what} and cannot be planned", record.qualified_name()),
            record.span,
        )
        .with_suggestion("declare a concrete, non-generic class"))
    };
    match record.kind {
        RecordKind::Interface => return reject("an interface"),
        RecordKind::AnnotationClass => return reject("an annotation class"),
        RecordKind::Class | RecordKind::Object => {}
    }
    if record.is_abstract {
        return reject("abstract");
    }
    if !record.type_params.is_empty() {
        let params: Vec<&str> = record
            .type_params
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        return Err(PlanError::new(
            file,
            ErrorCode::DISALLOWED_SHAPE,
            format!(
                "'{}' has generic type parameters <{}> and cannot be planned",
                record.qualified_name(),
                params.join(", ")
            ),
            record.span,
        )
        .with_suggestion("monomorphize the record before planning"));
    }
    Ok(())
}

/// SHA-256 over every piece of generated output, in order.
fn fingerprint(record: &str, fields: &[FieldPlan]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(record.as_bytes());
    hasher.update([0x1f]);
    for field in fields {
        match field {
            FieldPlan::Serialized {
                rewritten,
                declarations,
                ..
            } => {
                hasher.update(rewritten.as_bytes());
                hasher.update([0x1f]);
                for decl in declarations {
                    hasher.update(decl.text.as_bytes());
                    hasher.update([0x1f]);
                }
            }
            FieldPlan::Verbatim { declaration } => {
                hasher.update(declaration.as_bytes());
                hasher.update([0x1f]);
            }
        }
    }
    format!("{:x}", hasher.finalize())
}
