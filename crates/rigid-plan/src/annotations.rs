//! Annotation vocabulary recognized by the planner.
//!
//! Every size bound, format marker, and conversion hook the processor rules
//! consult is named here in one place. Argument shapes:
//!
//! | Annotation            | Arguments                                  |
//! |-----------------------|--------------------------------------------|
//! | `@Size(n)`            | max element count / byte length            |
//! | `@Ascii(n)` `@Utf8(n)`| charset marker with max string length      |
//! | `@AsciiChar` `@UnicodeChar` | single-character format markers      |
//! | `@Digits(i, f)`       | decimal integer / fraction digit counts    |
//! | `@Default(ref)`       | default-value provider reference           |
//! | `@Converter(ty, ref)` | surrogate type + conversion provider       |
//! | `@Resolver(ty, ref)`  | surrogate type + resolving provider        |
//! | `@Fixed`              | serializable marker on user types          |
//! | `@HashScheme(s, n)`   | meta marker: algorithm name + digest size  |
//! | `@IdScheme(s, n)`     | meta marker: scheme name + key size        |

/// Max-size bound for collections and byte sequences.
pub const SIZE: &str = "Size";

/// ASCII charset marker for strings, with a max-length argument.
pub const ASCII: &str = "Ascii";
/// UTF-8 charset marker for strings, with a max-byte-length argument.
pub const UTF8: &str = "Utf8";

/// Single ASCII character format marker.
pub const ASCII_CHAR: &str = "AsciiChar";
/// Single unicode (UTF-16 code unit) character format marker.
pub const UNICODE_CHAR: &str = "UnicodeChar";

/// Decimal digit-count pair: integer digits, fraction digits.
pub const DIGITS: &str = "Digits";

/// Default-value provider reference.
pub const DEFAULT: &str = "Default";

/// Conversion through a surrogate type: `(surrogate, provider)`. The
/// provider doubles as an embedded default supplier.
pub const CONVERTER: &str = "Converter";
/// Resolver-style conversion marker, same argument shape as `@Converter`.
pub const RESOLVER: &str = "Resolver";

/// Serializable marker required on user types planned by their own codec.
pub const FIXED: &str = "Fixed";

/// Meta marker on hash-algorithm annotations: `(algorithm, digest_size)`.
pub const HASH_SCHEME: &str = "HashScheme";
/// Meta marker on identity-scheme annotations: `(scheme, key_size)`.
pub const ID_SCHEME: &str = "IdScheme";
