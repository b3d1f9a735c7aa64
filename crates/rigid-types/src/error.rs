use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Import,
    Annotation,
    Type,
    Shape,
    Arity,
}

/// Numeric error code (E100–E599).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Import errors (E100–E199) ──
    pub const WILDCARD_IMPORT: Self = Self(100);

    // ── Annotation errors (E200–E299) ──
    pub const MISSING_ANNOTATION: Self = Self(200);
    pub const NON_REPEATABLE_ANNOTATION: Self = Self(201);
    pub const CONFLICTING_ANNOTATIONS: Self = Self(202);
    pub const MALFORMED_ANNOTATION: Self = Self(203);

    // ── Type errors (E300–E399) ──
    pub const UNSUPPORTED_TYPE: Self = Self(300);

    // ── Shape errors (E400–E499) ──
    pub const DISALLOWED_SHAPE: Self = Self(400);
    pub const BANNED_TYPE: Self = Self(401);

    // ── Arity errors (E500–E599) ──
    pub const ARITY_MISMATCH: Self = Self(500);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Import,
            200..=299 => ErrorCategory::Annotation,
            300..=399 => ErrorCategory::Type,
            400..=499 => ErrorCategory::Shape,
            _ => ErrorCategory::Arity,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured planner configuration error.
///
/// Every detected violation is fatal to the enclosing record's codec
/// generation: a partially-planned fixed-layout codec is unsafe to use, so
/// planning aborts on the first error and nothing is emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanError {
    /// Source file name.
    pub file: String,
    /// Error code (e.g., E200).
    pub code: ErrorCode,
    /// Error category (derived from code).
    pub category: ErrorCategory,
    /// Human-readable error message.
    pub message: String,
    /// Source location of the offending declaration.
    #[serde(flatten)]
    pub span: Span,
    /// The exact source line for context, when the host supplied source text.
    pub source_line: String,
    /// Optional fix suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl PlanError {
    /// Create a new error. The source line starts empty; hosts that hold the
    /// source text attach it via [`PlanError::with_source_line`].
    pub fn new(file: impl Into<String>, code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            file: file.into(),
            code,
            category: code.category(),
            message: message.into(),
            span,
            source_line: String::new(),
            suggestion: None,
        }
    }

    /// Attach the offending source line.
    pub fn with_source_line(mut self, line: impl Into<String>) -> Self {
        self.source_line = line.into();
        self
    }

    /// Attach a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.file, self.span, self.code, self.category, self.message
        )
    }
}

impl std::error::Error for PlanError {}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Import => write!(f, "import"),
            Self::Annotation => write!(f, "annotation"),
            Self::Type => write!(f, "type"),
            Self::Shape => write!(f, "shape"),
            Self::Arity => write!(f, "arity"),
        }
    }
}
