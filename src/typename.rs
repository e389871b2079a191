//! Canonicalization of textual Move type names
//!
//! # Background
//!
//! The same type instantiation can arrive under superficially different
//! spellings depending on its source: raw BCS metadata tends to carry
//! full-width 64-digit addresses (`0x0000…0002::borrow::Borrow`), while
//! JSON returned over RPC typically uses short-form addresses (`0x2::…`)
//! and may insert whitespace after the commas of generic argument lists.
//! Identity checks against type names are only reliable if every source
//! is first reduced to one canonical spelling.
//!
//! The canonical form produced by [`canonicalize`] has:
//!
//!   * no whitespace anywhere, including inside angle-bracket argument lists
//!   * every address literal in lowercase short form, with leading zeros
//!     stripped (`0x0000000000000000000000000000000000000000000000000000000000000002`
//!     and `0x2` both normalize to `0x2`)
//!   * all other tokens left untouched
//!
//! `canonicalize` is pure, total, and idempotent.

/// Reduces a raw type-name string to its canonical spelling.
///
/// Whitespace is stripped, and every address literal is compressed to
/// lowercase short form. Unrecognized tokens pass through unchanged.
///
/// # Examples
///
/// ```
/// # use sedum::typename::canonicalize;
/// assert_eq!(
///     canonicalize("0x0000000000000000000000000000000000000000000000000000000000000002::borrow::Referent< u64 >"),
///     "0x2::borrow::Referent<u64>"
/// );
/// ```
#[must_use]
pub fn canonicalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    // True when the previous emitted character could extend an identifier,
    // in which case a following `0x` is not an address literal.
    let mut in_ident = false;
    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        if c == '0' && !in_ident && matches!(chars.peek(), Some('x') | Some('X')) {
            let _x = chars.next();
            let mut digits = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_ascii_hexdigit() {
                    digits.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            out.push_str("0x");
            out.push_str(&compress_hex(&digits));
            in_ident = true;
            continue;
        }
        out.push(c);
        in_ident = c.is_ascii_alphanumeric() || c == '_';
    }
    out
}

/// Strips leading zeros from a hex digit run and lowercases it, keeping
/// at least one digit.
fn compress_hex(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_owned()
    } else {
        trimmed.to_lowercase()
    }
}

/// Composes a full type name from a canonical base name and the canonical
/// names of its type arguments.
///
/// With no arguments this is just `canonicalize(name)`; otherwise the
/// arguments are joined into an angle-bracket list with no separating
/// whitespace, so that the result is already canonical.
///
/// # Examples
///
/// ```
/// # use sedum::typename::compose;
/// assert_eq!(
///     compose("0x2::borrow::Referent", &["u64".to_owned()]),
///     "0x2::borrow::Referent<u64>"
/// );
/// ```
#[must_use]
pub fn compose(name: &str, args: &[String]) -> String {
    if args.is_empty() {
        canonicalize(name)
    } else {
        canonicalize(&format!("{}<{}>", name, args.join(",")))
    }
}

/// Tests whether `type_name` denotes the type (or some instantiation of
/// the generic type) whose canonical base name is `canonical_name`.
///
/// For non-generic types this reduces to canonical equality; for generic
/// ones, to a prefix check against `canonical_name` followed by `<`.
/// Argument arity and identity are deliberately not checked at this
/// layer; that is the caller's responsibility via
/// [`assert_type_args_match`](crate::reified::assert_type_args_match).
#[must_use]
pub fn is_instance_of(type_name: &str, canonical_name: &str) -> bool {
    let canonical = canonicalize(type_name);
    if canonical == canonical_name {
        return true;
    }
    canonical.len() > canonical_name.len()
        && canonical.starts_with(canonical_name)
        && canonical[canonical_name.len()..].starts_with('<')
}

/// Splits a canonical type name into its base name and top-level type
/// argument list.
///
/// Nested argument lists are kept intact: splitting
/// `a::B<x::Y<u8>,u64>` yields base `a::B` and arguments
/// `["x::Y<u8>", "u64"]`. A name with no argument list yields an empty
/// argument vector.
#[must_use]
pub fn split_type_args(type_name: &str) -> (&str, Vec<String>) {
    let Some(open) = type_name.find('<') else {
        return (type_name, Vec::new());
    };
    let base = &type_name[..open];
    let Some(inner) = type_name[open + 1..].strip_suffix('>') else {
        // Malformed argument list; treat the whole string as a base name.
        return (type_name, Vec::new());
    };
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(inner[start..i].to_owned());
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < inner.len() {
        args.push(inner[start..].to_owned());
    }
    (base, args)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn canonicalize_strips_whitespace_in_generic_lists() {
        assert_eq!(
            canonicalize("0x2::table::Table<0x2::object::ID, u64>"),
            "0x2::table::Table<0x2::object::ID,u64>"
        );
    }

    #[test]
    fn canonicalize_compresses_long_addresses() {
        let long = "0x0000000000000000000000000000000000000000000000000000000000000001::option::Option<u8>";
        assert_eq!(canonicalize(long), "0x1::option::Option<u8>");
        assert_eq!(canonicalize("0x0::x::Y"), "0x0::x::Y");
    }

    #[test]
    fn canonicalize_lowercases_addresses() {
        assert_eq!(canonicalize("0xAB::m::T"), "0xab::m::T");
    }

    #[test]
    fn canonicalize_is_idempotent() {
        for raw in [
            "0x0000000000000000000000000000000000000000000000000000000000000002::borrow::Referent< u64 >",
            "vector<0x2::object::ID>",
            "bool",
            "0x2::kiosk_extension::ExtensionKey<0x2::kiosk::Kiosk>",
        ] {
            let once = canonicalize(raw);
            assert_eq!(canonicalize(&once), once);
        }
    }

    #[test]
    fn instance_checks() {
        assert!(is_instance_of(
            "0x0000000000000000000000000000000000000000000000000000000000000002::borrow::Borrow",
            "0x2::borrow::Borrow"
        ));
        assert!(is_instance_of(
            "0x2::borrow::Referent<u64>",
            "0x2::borrow::Referent"
        ));
        assert!(!is_instance_of(
            "0x2::borrow::Referent<u64>",
            "0x2::borrow::Borrow"
        ));
        // A longer name sharing a prefix is not an instantiation.
        assert!(!is_instance_of(
            "0x2::borrow::BorrowExtra",
            "0x2::borrow::Borrow"
        ));
    }

    #[test]
    fn split_handles_nesting() {
        let (base, args) = split_type_args("0x2::table::Table<0x1::option::Option<u8>,u64>");
        assert_eq!(base, "0x2::table::Table");
        assert_eq!(args, vec!["0x1::option::Option<u8>", "u64"]);
        let (base, args) = split_type_args("bool");
        assert_eq!(base, "bool");
        assert!(args.is_empty());
    }
}
