//! Per-type-identity plan construction rules.
//!
//! [`ProcessorRegistry::build`] dispatches on the context's root identity:
//! native simple types (boolean/integer/char/string families, requiring
//! format annotations), native collections (list/set/map, requiring a size
//! bound and child plans), extended types (decimal, instant, hash and
//! identity values), and user types (surrogate conversion or own-codec
//! fallback). Any rule violation aborts the enclosing record's assembly.

use rigid_types::{ErrorCode, Result};

use crate::annotations::{
    ASCII, ASCII_CHAR, CONVERTER, DIGITS, FIXED, HASH_SCHEME, ID_SCHEME, SIZE, UNICODE_CHAR, UTF8,
};
use crate::context::TypeContext;
use crate::plan::{IntWidth, SerializerKind, SerializingPlan};

/// Native collection type names.
const NATIVE_COLLECTIONS: [&str; 3] = ["List", "Set", "Map"];

/// The abstract identity supertype, banned regardless of annotations.
const BANNED_ABSTRACT_ID: &str = "AbstractId";

/// True iff `simple_name` is registered under a native-collection rule.
pub fn is_native_collection(simple_name: &str) -> bool {
    NATIVE_COLLECTIONS.contains(&simple_name)
}

fn int_width(simple_name: &str) -> Option<IntWidth> {
    match simple_name {
        "Byte" => Some(IntWidth::I8),
        "Short" => Some(IntWidth::I16),
        "Int" => Some(IntWidth::I32),
        "Long" => Some(IntWidth::I64),
        "UByte" => Some(IntWidth::U8),
        "UShort" => Some(IntWidth::U16),
        "UInt" => Some(IntWidth::U32),
        "ULong" => Some(IntWidth::U64),
        _ => None,
    }
}

/// Dispatches construction rules by type identity.
#[derive(Debug, Default)]
pub struct ProcessorRegistry;

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Build the plan for one contextualized type-tree node.
    pub fn build(&self, ctx: &TypeContext<'_>) -> Result<SerializingPlan> {
        if ctx.root_type().simple_name() == BANNED_ABSTRACT_ID {
            return Err(ctx
                .err(
                    ErrorCode::BANNED_TYPE,
                    format!("'{BANNED_ABSTRACT_ID}' cannot be encoded into a fixed layout"),
                )
                .with_suggestion("use one of its concrete subtypes: PublicId or AnonymousId"));
        }
        if ctx.is_nullable() {
            let inner = self.build_non_null(ctx)?;
            return inner.wrap_null(ctx);
        }
        self.build_non_null(ctx)
    }

    fn build_non_null(&self, ctx: &TypeContext<'_>) -> Result<SerializingPlan> {
        let simple = ctx.root_type().simple_name();
        if let Some(width) = int_width(simple) {
            return Ok(SerializingPlan::leaf(SerializerKind::Int(width)));
        }
        match simple {
            "Bool" => Ok(SerializingPlan::leaf(SerializerKind::Bool)),
            "Char" => self.char_plan(ctx),
            "String" => self.string_plan(ctx),
            "Bytes" => self.bytes_plan(ctx),
            "List" | "Set" | "Map" => self.collection_plan(ctx, simple),
            "Decimal" => self.decimal_plan(ctx),
            "Instant" => Ok(SerializingPlan::leaf(SerializerKind::Instant)),
            "SecureHash" => self.scheme_plan(ctx, HASH_SCHEME, |algorithm, digest_size| {
                SerializerKind::SecureHash {
                    algorithm,
                    digest_size,
                }
            }),
            "PublicId" => self.scheme_plan(ctx, ID_SCHEME, |scheme, key_size| {
                SerializerKind::PublicId { scheme, key_size }
            }),
            "AnonymousId" => self.scheme_plan(ctx, ID_SCHEME, |scheme, key_size| {
                SerializerKind::AnonymousId { scheme, key_size }
            }),
            _ => self.user_plan(ctx),
        }
    }

    // ──────────────────────────────────────────────────────────────────────
    // Native simple types
    // ──────────────────────────────────────────────────────────────────────

    /// Char requires exactly one of the two format markers.
    fn char_plan(&self, ctx: &TypeContext<'_>) -> Result<SerializingPlan> {
        let ascii = ctx.find_annotation(ASCII_CHAR)?.is_some();
        let unicode = ctx.find_annotation(UNICODE_CHAR)?.is_some();
        match (ascii, unicode) {
            (true, true) => Err(ctx.err(
                ErrorCode::CONFLICTING_ANNOTATIONS,
                format!("@{ASCII_CHAR} and @{UNICODE_CHAR} are mutually exclusive"),
            )),
            (true, false) => Ok(SerializingPlan::leaf(SerializerKind::AsciiChar)),
            (false, true) => Ok(SerializingPlan::leaf(SerializerKind::UnicodeChar)),
            (false, false) => Err(ctx
                .err(
                    ErrorCode::MISSING_ANNOTATION,
                    "Char requires a format marker".into(),
                )
                .with_suggestion(format!("attach @{ASCII_CHAR} or @{UNICODE_CHAR}"))),
        }
    }

    /// String requires exactly one charset-with-max-length marker.
    fn string_plan(&self, ctx: &TypeContext<'_>) -> Result<SerializingPlan> {
        let ascii = ctx.find_annotation(ASCII)?.cloned();
        let utf8 = ctx.find_annotation(UTF8)?.cloned();
        let (marker, kind_name): (_, fn(u64) -> SerializerKind) = match (ascii, utf8) {
            (Some(_), Some(_)) => {
                return Err(ctx.err(
                    ErrorCode::CONFLICTING_ANNOTATIONS,
                    format!("@{ASCII} and @{UTF8} are mutually exclusive"),
                ))
            }
            (Some(a), None) => (a, |max_length| SerializerKind::AsciiString { max_length }),
            (None, Some(u)) => (u, |max_length| SerializerKind::Utf8String { max_length }),
            (None, None) => {
                return Err(ctx
                    .err(
                        ErrorCode::MISSING_ANNOTATION,
                        "String requires a charset marker with a max length".into(),
                    )
                    .with_suggestion(format!("attach @{ASCII}(max) or @{UTF8}(max)")))
            }
        };
        let max_length = marker.int_arg(0).ok_or_else(|| {
            ctx.err(
                ErrorCode::MALFORMED_ANNOTATION,
                format!("@{} requires a max-length argument", marker.name.name),
            )
        })?;
        Ok(SerializingPlan::leaf(kind_name(max_length)))
    }

    fn bytes_plan(&self, ctx: &TypeContext<'_>) -> Result<SerializingPlan> {
        let max_length = self.size_bound(ctx, "Bytes")?;
        Ok(SerializingPlan::leaf(SerializerKind::Bytes { max_length }))
    }

    // ──────────────────────────────────────────────────────────────────────
    // Native collections
    // ──────────────────────────────────────────────────────────────────────

    /// Collections require a size bound and the exact child arity. Children
    /// are planned with default-wrapping forced on: every slot must have a
    /// defaulted representation so the per-slot layout is uniform regardless
    /// of actual runtime length.
    fn collection_plan(&self, ctx: &TypeContext<'_>, simple: &str) -> Result<SerializingPlan> {
        let max_size = self.size_bound(ctx, simple)?;
        let (kind, expected) = match simple {
            "List" => (SerializerKind::FixedList { max_size }, 1),
            "Set" => (SerializerKind::FixedSet { max_size }, 1),
            _ => (SerializerKind::FixedMap { max_size }, 2),
        };
        let actual = ctx.children().len();
        if actual != expected {
            let shape = if expected == 1 {
                "1 type argument"
            } else {
                "2 type arguments (key, value)"
            };
            return Err(ctx.err(
                ErrorCode::ARITY_MISMATCH,
                format!("{simple} takes exactly {shape}, got {actual}"),
            ));
        }
        let children = ctx
            .children()
            .iter()
            .map(|child| self.build(child)?.wrap_default(child))
            .collect::<Result<Vec<_>>>()?;
        Ok(SerializingPlan::Explicit { kind, children })
    }

    fn size_bound(&self, ctx: &TypeContext<'_>, simple: &str) -> Result<u64> {
        let size = ctx.find_annotation(SIZE)?.ok_or_else(|| {
            ctx.err(
                ErrorCode::MISSING_ANNOTATION,
                format!("{simple} requires a @{SIZE} bound for a fixed layout"),
            )
            .with_suggestion(format!("attach @{SIZE}(max)"))
        })?;
        size.int_arg(0).ok_or_else(|| {
            ctx.err(
                ErrorCode::MALFORMED_ANNOTATION,
                format!("@{SIZE} requires an integer argument"),
            )
        })
    }

    // ──────────────────────────────────────────────────────────────────────
    // Extended types
    // ──────────────────────────────────────────────────────────────────────

    fn decimal_plan(&self, ctx: &TypeContext<'_>) -> Result<SerializingPlan> {
        let digits = ctx.find_annotation(DIGITS)?.ok_or_else(|| {
            ctx.err(
                ErrorCode::MISSING_ANNOTATION,
                format!("Decimal requires a @{DIGITS} bound"),
            )
            .with_suggestion(format!("attach @{DIGITS}(integer_digits, fraction_digits)"))
        })?;
        let (integer_digits, fraction_digits) = digits
            .int_arg(0)
            .zip(digits.int_arg(1))
            .ok_or_else(|| {
                ctx.err(
                    ErrorCode::MALFORMED_ANNOTATION,
                    format!("@{DIGITS} requires two integer arguments"),
                )
            })?;
        Ok(SerializingPlan::leaf(SerializerKind::Decimal {
            integer_digits,
            fraction_digits,
        }))
    }

    /// Hash and identity types: zero scheme meta-annotations means "treat as
    /// an opaque user type"; exactly one builds the scheme-parameterized
    /// plan; several is rejected inside the meta query.
    fn scheme_plan(
        &self,
        ctx: &TypeContext<'_>,
        marker: &str,
        make: impl FnOnce(String, u64) -> SerializerKind,
    ) -> Result<SerializingPlan> {
        let Some(hit) = ctx.find_meta_annotation(marker)? else {
            return self.user_plan(ctx);
        };
        let scheme = hit.meta.str_arg(0).ok_or_else(|| {
            ctx.err(
                ErrorCode::MALFORMED_ANNOTATION,
                format!("@{marker} on '@{}' requires a scheme name argument", hit.annotation),
            )
        })?;
        let size = hit.meta.int_arg(1).ok_or_else(|| {
            ctx.err(
                ErrorCode::MALFORMED_ANNOTATION,
                format!("@{marker} on '@{}' requires a size argument", hit.annotation),
            )
        })?;
        Ok(SerializingPlan::leaf(make(scheme.to_string(), size)))
    }

    // ──────────────────────────────────────────────────────────────────────
    // User types
    // ──────────────────────────────────────────────────────────────────────

    /// A user type either routes through a surrogate conversion, or carries
    /// the serializable marker and is planned by its own generated codec.
    fn user_plan(&self, ctx: &TypeContext<'_>) -> Result<SerializingPlan> {
        let target = ctx.root_type().qualified_name().to_string();
        if let Some(conversion) = ctx.conversion()? {
            return Ok(SerializingPlan::Fuzzy {
                target,
                conversion: Some(conversion),
            });
        }
        if ctx.root_type().has_annotation(FIXED) {
            return Ok(SerializingPlan::Fuzzy {
                target,
                conversion: None,
            });
        }
        Err(ctx
            .err(
                ErrorCode::UNSUPPORTED_TYPE,
                format!("type '{target}' has no codec rule"),
            )
            .with_suggestion(format!(
                "annotate '{}' with @{FIXED} to generate its own codec, or attach \
                 @{CONVERTER}(surrogate, provider) to the field",
                ctx.root_type().simple_name()
            )))
    }
}
