//! Shared types for the rigid codec planner.
//!
//! This crate defines the annotated type-tree model consumed by the planner,
//! source spans, and the configuration-error types shared across all
//! planning stages.

mod error;
mod span;
pub mod tree;

pub use error::{ErrorCategory, ErrorCode, PlanError};
pub use span::{SourceFile, Span};

/// Result type used throughout the rigid planner.
pub type Result<T> = std::result::Result<T, PlanError>;
