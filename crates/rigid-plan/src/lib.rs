//! Fixed-length codec-plan compiler.
//!
//! # Architecture
//!
//! The planner takes a record declaration (an annotated type tree per
//! field) and produces, per captured property, a [`SerializingPlan`]
//! describing a constant-size binary layout, rendered into
//! [`Declaration`]s with deterministic [`Tracker`]-generated symbols:
//!
//! ```text
//! RecordDecl → PlanAssembler → TypeContext (per field, via TypeResolver)
//!            → ProcessorRegistry → SerializingPlan (+ nullable/default
//!              wrapping) → Tracker-named declarations → RecordCodec
//! ```
//!
//! Constant size is the whole point: the consuming proof circuit cannot
//! handle variable-length witnesses, so every composite, collection, and
//! nullable type is bounded, and planning the same input twice yields
//! byte-identical output. Any rule violation is a fatal configuration
//! error for the enclosing record — a partially-planned fixed-layout codec
//! is unsafe to use, so nothing is emitted on failure.

pub mod annotations;
pub mod assembler;
pub mod context;
pub mod namer;
pub mod plan;
pub mod registry;

pub use assembler::{plan_record, FieldPlan, PlanAssembler, RecordCodec};
pub use context::{MetaMatch, TypeContext};
pub use namer::{Coordinate, Tracker};
pub use plan::{Conversion, Declaration, IntWidth, SerializerKind, SerializingPlan};
pub use registry::ProcessorRegistry;
