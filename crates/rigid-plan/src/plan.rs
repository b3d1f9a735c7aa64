//! The serializing-plan tree.
//!
//! A [`SerializingPlan`] describes how one value is encoded into a
//! constant-size binary layout, independent of the value's runtime content.
//! Rendering a plan walks it bottom-up, assigning one [`Tracker`]-generated
//! symbol per node and emitting one textual declaration per symbol; child
//! declarations always precede the parent's, so every declaration references
//! only earlier symbols.

use serde::{Deserialize, Serialize};

use crate::context::TypeContext;
use crate::namer::Tracker;
use rigid_types::Result;

// ══════════════════════════════════════════════════════════════════════════════
// Serializer kinds
// ══════════════════════════════════════════════════════════════════════════════

/// Width of a native fixed-size integer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntWidth {
    pub fn bytes(self) -> u64 {
        match self {
            IntWidth::I8 | IntWidth::U8 => 1,
            IntWidth::I16 | IntWidth::U16 => 2,
            IntWidth::I32 | IntWidth::U32 => 4,
            IntWidth::I64 | IntWidth::U64 => 8,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            IntWidth::I8 => "int8",
            IntWidth::I16 => "int16",
            IntWidth::I32 => "int32",
            IntWidth::I64 => "int64",
            IntWidth::U8 => "uint8",
            IntWidth::U16 => "uint16",
            IntWidth::U32 => "uint32",
            IntWidth::U64 => "uint64",
        }
    }
}

/// The serializer-kind tag of an [`Explicit`](SerializingPlan::Explicit)
/// plan node. Each kind knows its child arity, whether it self-provides a
/// default value, and its fixed encoded size.
#[derive(Debug, Clone, PartialEq)]
pub enum SerializerKind {
    Bool,
    Int(IntWidth),
    AsciiChar,
    UnicodeChar,
    AsciiString { max_length: u64 },
    Utf8String { max_length: u64 },
    Bytes { max_length: u64 },
    FixedList { max_size: u64 },
    FixedSet { max_size: u64 },
    FixedMap { max_size: u64 },
    Decimal { integer_digits: u64, fraction_digits: u64 },
    Instant,
    SecureHash { algorithm: String, digest_size: u64 },
    PublicId { scheme: String, key_size: u64 },
    AnonymousId { scheme: String, key_size: u64 },
}

impl SerializerKind {
    /// How many child plans this kind requires: 1 for list/set, 2 for map
    /// (key, value), 0 otherwise.
    pub fn child_arity(&self) -> usize {
        match self {
            SerializerKind::FixedList { .. } | SerializerKind::FixedSet { .. } => 1,
            SerializerKind::FixedMap { .. } => 2,
            _ => 0,
        }
    }

    /// Whether values of this kind have an intrinsic default (zero, empty).
    /// Hash and identity kinds do not: the planner cannot conjure one.
    pub fn self_provides_default(&self) -> bool {
        !matches!(
            self,
            SerializerKind::SecureHash { .. }
                | SerializerKind::PublicId { .. }
                | SerializerKind::AnonymousId { .. }
        )
    }

    /// Encoded size in bytes given the (already fixed) sizes of the child
    /// layouts. Variable content lives inside a fixed envelope: strings,
    /// byte sequences, and collections carry a 4-byte actual-length prefix
    /// ahead of their padded slots.
    pub fn encoded_size(&self, child_sizes: &[u64]) -> u64 {
        match self {
            SerializerKind::Bool => 1,
            SerializerKind::Int(width) => width.bytes(),
            SerializerKind::AsciiChar => 1,
            SerializerKind::UnicodeChar => 2,
            SerializerKind::AsciiString { max_length } => 4 + max_length,
            SerializerKind::Utf8String { max_length } => 4 + max_length,
            SerializerKind::Bytes { max_length } => 4 + max_length,
            SerializerKind::FixedList { max_size } | SerializerKind::FixedSet { max_size } => {
                4 + max_size * child_sizes[0]
            }
            SerializerKind::FixedMap { max_size } => {
                4 + max_size * (child_sizes[0] + child_sizes[1])
            }
            SerializerKind::Decimal {
                integer_digits,
                fraction_digits,
            } => 1 + integer_digits + fraction_digits,
            SerializerKind::Instant => 12,
            SerializerKind::SecureHash { digest_size, .. } => *digest_size,
            SerializerKind::PublicId { key_size, .. }
            | SerializerKind::AnonymousId { key_size, .. } => *key_size,
        }
    }

    /// Declaration body for this kind, referencing child symbols by name.
    fn render(&self, child_names: &[String]) -> String {
        debug_assert_eq!(child_names.len(), self.child_arity());
        match self {
            SerializerKind::Bool => "bool".into(),
            SerializerKind::Int(width) => width.keyword().into(),
            SerializerKind::AsciiChar => "ascii_char".into(),
            SerializerKind::UnicodeChar => "unicode_char".into(),
            SerializerKind::AsciiString { max_length } => {
                format!("ascii_string(max_length = {max_length})")
            }
            SerializerKind::Utf8String { max_length } => {
                format!("utf8_string(max_length = {max_length})")
            }
            SerializerKind::Bytes { max_length } => format!("bytes(max_length = {max_length})"),
            SerializerKind::FixedList { max_size } => {
                format!("fixed_list(max_size = {max_size}, inner = {})", child_names[0])
            }
            SerializerKind::FixedSet { max_size } => {
                format!("fixed_set(max_size = {max_size}, inner = {})", child_names[0])
            }
            SerializerKind::FixedMap { max_size } => format!(
                "fixed_map(max_size = {max_size}, key = {}, value = {})",
                child_names[0], child_names[1]
            ),
            SerializerKind::Decimal {
                integer_digits,
                fraction_digits,
            } => format!(
                "decimal(integer_digits = {integer_digits}, fraction_digits = {fraction_digits})"
            ),
            SerializerKind::Instant => "instant".into(),
            SerializerKind::SecureHash {
                algorithm,
                digest_size,
            } => format!("secure_hash(algorithm = \"{algorithm}\", digest_size = {digest_size})"),
            SerializerKind::PublicId { scheme, key_size } => {
                format!("public_id(scheme = \"{scheme}\", key_size = {key_size})")
            }
            SerializerKind::AnonymousId { scheme, key_size } => {
                format!("anonymous_id(scheme = \"{scheme}\", key_size = {key_size})")
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Plans
// ══════════════════════════════════════════════════════════════════════════════

/// A surrogate conversion: values are converted to `surrogate` by
/// `provider` before encoding, and back after decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// Qualified name of the surrogate type whose codec carries the value.
    pub surrogate: String,
    /// Reference to the conversion provider.
    pub provider: String,
}

/// One node of a codec plan.
#[derive(Debug, Clone, PartialEq)]
pub enum SerializingPlan {
    /// Fully specified: a serializer kind plus its child plans.
    Explicit {
        kind: SerializerKind,
        children: Vec<SerializingPlan>,
    },
    /// Structurally opaque: routes to `target`'s own generated codec,
    /// optionally through a surrogate conversion. Used for user types whose
    /// internal shape the planner does not decompose.
    Fuzzy {
        target: String,
        conversion: Option<Conversion>,
    },
    /// Null-presence handling around a child plan.
    Nullable(Box<SerializingPlan>),
    /// Default-value fallback around a child plan.
    WithDefault {
        provider: String,
        inner: Box<SerializingPlan>,
    },
}

/// One generated declaration: a Tracker-assigned symbol and its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub symbol: String,
    pub text: String,
}

impl SerializingPlan {
    /// Shorthand for a childless explicit node.
    pub fn leaf(kind: SerializerKind) -> Self {
        SerializingPlan::Explicit {
            kind,
            children: Vec::new(),
        }
    }

    /// Whether this plan already provides a defaulted representation.
    /// A `Nullable` does: its layout is "default value plus presence flag",
    /// so absent slots are representable without further wrapping.
    pub fn provides_default(&self) -> bool {
        match self {
            SerializingPlan::WithDefault { .. } | SerializingPlan::Nullable(_) => true,
            SerializingPlan::Explicit { kind, .. } => kind.self_provides_default(),
            SerializingPlan::Fuzzy { .. } => false,
        }
    }

    /// Ensure the plan has default handling.
    ///
    /// Already-defaulted plans pass through unchanged (idempotent). An
    /// explicit provider on the type node — `@Default(ref)` or a conversion
    /// marker's embedded provider — takes precedence over a kind's intrinsic
    /// default. A plan with neither an explicit nor an intrinsic default is
    /// a configuration error.
    pub fn wrap_default(self, ctx: &TypeContext<'_>) -> Result<SerializingPlan> {
        if matches!(
            self,
            SerializingPlan::WithDefault { .. } | SerializingPlan::Nullable(_)
        ) {
            return Ok(self);
        }
        if let Some(provider) = ctx.default_provider()? {
            return Ok(SerializingPlan::WithDefault {
                provider,
                inner: Box::new(self),
            });
        }
        if self.provides_default() {
            return Ok(self);
        }
        Err(ctx.missing_default_error())
    }

    /// Add null-presence handling.
    ///
    /// Always acquires default handling first: a nullable slot's fixed-size
    /// layout is "default value, plus one presence flag", never "no value,
    /// plus a null marker".
    pub fn wrap_null(self, ctx: &TypeContext<'_>) -> Result<SerializingPlan> {
        Ok(SerializingPlan::Nullable(Box::new(self.wrap_default(ctx)?)))
    }

    /// Total encoded size in bytes, when every node in the tree has a known
    /// fixed layout. `Fuzzy` nodes delegate to another type's codec, whose
    /// size is not visible here.
    pub fn encoded_size(&self) -> Option<u64> {
        match self {
            SerializingPlan::Explicit { kind, children } => {
                let sizes: Option<Vec<u64>> =
                    children.iter().map(|c| c.encoded_size()).collect();
                Some(kind.encoded_size(&sizes?))
            }
            SerializingPlan::Fuzzy { .. } => None,
            SerializingPlan::Nullable(inner) => inner.encoded_size().map(|s| s + 1),
            SerializingPlan::WithDefault { inner, .. } => inner.encoded_size(),
        }
    }

    /// Render this plan into `out`, returning the symbol assigned to this
    /// node. Children are emitted before their parent.
    ///
    /// A `Nullable` wrapping a `WithDefault` renders as a single
    /// nullable-with-default declaration: the layout is one unit, so a
    /// nullable defaulted scalar yields exactly two chained symbols.
    pub fn render(&self, tracker: &Tracker, out: &mut Vec<Declaration>) -> String {
        let symbol = tracker.to_string();
        let text = match self {
            SerializingPlan::Nullable(inner) => {
                let (default, child) = match &**inner {
                    SerializingPlan::WithDefault { provider, inner } => {
                        (Some(provider.as_str()), &**inner)
                    }
                    other => (None, other),
                };
                let child_symbol = child.render(&tracker.next(), out);
                match default {
                    Some(provider) => format!(
                        "codec {symbol} = nullable(default = {provider}, inner = {child_symbol})"
                    ),
                    None => format!("codec {symbol} = nullable(inner = {child_symbol})"),
                }
            }
            SerializingPlan::WithDefault { provider, inner } => {
                let child_symbol = inner.render(&tracker.next(), out);
                format!(
                    "codec {symbol} = with_default(provider = {provider}, inner = {child_symbol})"
                )
            }
            SerializingPlan::Fuzzy { target, conversion } => match conversion {
                Some(conv) => format!(
                    "codec {symbol} = converted(via = {}, codec = {})",
                    conv.provider, conv.surrogate
                ),
                None => format!("codec {symbol} = delegate(codec = {target})"),
            },
            SerializingPlan::Explicit { kind, children } => {
                let child_names: Vec<String> = match children.len() {
                    0 => Vec::new(),
                    1 => vec![children[0].render(&tracker.next(), out)],
                    _ => children
                        .iter()
                        .enumerate()
                        .map(|(i, child)| child.render(&tracker.branch(i), out))
                        .collect(),
                };
                format!("codec {symbol} = {}", kind.render(&child_names))
            }
        };
        out.push(Declaration {
            symbol: symbol.clone(),
            text,
        });
        symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_plan() -> SerializingPlan {
        SerializingPlan::leaf(SerializerKind::Int(IntWidth::I32))
    }

    #[test]
    fn test_child_arity() {
        assert_eq!(SerializerKind::FixedList { max_size: 3 }.child_arity(), 1);
        assert_eq!(SerializerKind::FixedSet { max_size: 3 }.child_arity(), 1);
        assert_eq!(SerializerKind::FixedMap { max_size: 3 }.child_arity(), 2);
        assert_eq!(SerializerKind::Bool.child_arity(), 0);
    }

    #[test]
    fn test_self_provided_defaults() {
        assert!(SerializerKind::Int(IntWidth::I64).self_provides_default());
        assert!(SerializerKind::AsciiString { max_length: 4 }.self_provides_default());
        assert!(SerializerKind::FixedList { max_size: 2 }.self_provides_default());
        assert!(!SerializerKind::SecureHash {
            algorithm: "sha256".into(),
            digest_size: 32
        }
        .self_provides_default());
        assert!(!SerializerKind::PublicId {
            scheme: "ed25519".into(),
            key_size: 32
        }
        .self_provides_default());
    }

    #[test]
    fn test_encoded_size_composes() {
        let list = SerializingPlan::Explicit {
            kind: SerializerKind::FixedList { max_size: 3 },
            children: vec![int_plan()],
        };
        // 4-byte length prefix + 3 slots of 4 bytes
        assert_eq!(list.encoded_size(), Some(16));

        let nullable = SerializingPlan::Nullable(Box::new(list));
        assert_eq!(nullable.encoded_size(), Some(17));

        let fuzzy = SerializingPlan::Fuzzy {
            target: "com.app.Deal".into(),
            conversion: None,
        };
        assert_eq!(fuzzy.encoded_size(), None);
    }

    #[test]
    fn test_render_linear_chain() {
        let plan = SerializingPlan::Nullable(Box::new(SerializingPlan::WithDefault {
            provider: "deals.zero".into(),
            inner: Box::new(int_plan()),
        }));
        let mut out = Vec::new();
        let symbol = plan.render(&Tracker::new("F"), &mut out);
        assert_eq!(symbol, "F_0");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].symbol, "F_1");
        assert_eq!(out[0].text, "codec F_1 = int32");
        assert_eq!(
            out[1].text,
            "codec F_0 = nullable(default = deals.zero, inner = F_1)"
        );
    }

    #[test]
    fn test_render_branches() {
        let plan = SerializingPlan::Explicit {
            kind: SerializerKind::FixedMap { max_size: 10 },
            children: vec![
                SerializingPlan::leaf(SerializerKind::AsciiString { max_length: 5 }),
                int_plan(),
            ],
        };
        let mut out = Vec::new();
        let symbol = plan.render(&Tracker::new("F"), &mut out);
        assert_eq!(symbol, "F_0");
        let symbols: Vec<&str> = out.iter().map(|d| d.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["F_0_A_0", "F_0_B_0", "F_0"]);
        assert_eq!(
            out[2].text,
            "codec F_0 = fixed_map(max_size = 10, key = F_0_A_0, value = F_0_B_0)"
        );
    }

    #[test]
    fn test_children_precede_parents() {
        let plan = SerializingPlan::Explicit {
            kind: SerializerKind::FixedList { max_size: 2 },
            children: vec![SerializingPlan::Explicit {
                kind: SerializerKind::FixedSet { max_size: 4 },
                children: vec![int_plan()],
            }],
        };
        let mut out = Vec::new();
        plan.render(&Tracker::new("F"), &mut out);
        // Every reference in a declaration points at an earlier symbol.
        for (i, decl) in out.iter().enumerate() {
            for earlier in &out[..i] {
                assert!(!earlier.text.contains(&decl.symbol));
            }
        }
    }
}
