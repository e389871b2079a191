//! Reified type descriptors
//!
//! A [`TypeDescriptor`] is a first-class, runtime-inspectable value
//! describing one type instantiation: its canonical name, its type
//! arguments (themselves descriptors, recursively), and, via the
//! methods defined in [`decode`](crate::decode) and
//! [`codec`](crate::codec), the four decode capabilities and the
//! composed binary codec for that instantiation.
//!
//! The descriptor is a closed tagged union. The classification of a
//! type as primitive, well-known parametric (string, vector, option),
//! struct, or phantom happens exactly once, when the descriptor is
//! constructed; the decoding engine dispatches on the variant and never
//! re-inspects name strings on the hot path.
//!
//! # Equality
//!
//! Two descriptors are interchangeable iff they are structurally equal:
//! same variant, same canonical name, and pairwise-equal type-argument
//! descriptors, recursively. Descriptor factories are referentially
//! transparent (constructing the same instantiation twice yields
//! values that compare equal), so callers may freely cache descriptors
//! by canonical name, though correctness never depends on sharing.
//!
//! # Phantom parameters
//!
//! A phantom type parameter exists only at the type level: its name
//! participates in the enclosing struct's full type name, but no value
//! of that type is ever materialized. [`phantom`] wraps any descriptor
//! into the name-only [`TypeDescriptor::Phantom`] variant; the decoding
//! engine rejects any attempt to value-decode it.

use crate::error::{ArityError, DecodeResult, TypeMismatchError};
use crate::typename;

/// Canonical base name of the well-known optional type.
pub const OPTION_TYPE_NAME: &str = "0x1::option::Option";
/// Canonical name of the well-known UTF-8 string type.
pub const UTF8_STRING_TYPE_NAME: &str = "0x1::string::String";
/// Canonical name of the well-known ASCII string type.
pub const ASCII_STRING_TYPE_NAME: &str = "0x1::ascii::String";

/// Reified descriptor for one type instantiation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeDescriptor {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    Address,
    /// `0x1::string::String`, encoded as a ULEB128-length-prefixed
    /// UTF-8 byte sequence.
    Utf8String,
    /// `0x1::ascii::String`, same encoding restricted to ASCII contents.
    AsciiString,
    /// `vector<T>`.
    Vector(Box<TypeDescriptor>),
    /// `0x1::option::Option<T>`.
    Option(Box<TypeDescriptor>),
    /// An arbitrary struct instantiation.
    Struct(Box<StructDescriptor>),
    /// A type-level-only parameter: canonical name with no value-level
    /// representation.
    Phantom(String),
}

impl TypeDescriptor {
    /// Full canonical name of this instantiation, suitable for identity
    /// comparison against any canonicalized source string.
    #[must_use]
    pub fn canonical_name(&self) -> String {
        match self {
            TypeDescriptor::Bool => "bool".to_owned(),
            TypeDescriptor::U8 => "u8".to_owned(),
            TypeDescriptor::U16 => "u16".to_owned(),
            TypeDescriptor::U32 => "u32".to_owned(),
            TypeDescriptor::U64 => "u64".to_owned(),
            TypeDescriptor::U128 => "u128".to_owned(),
            TypeDescriptor::U256 => "u256".to_owned(),
            TypeDescriptor::Address => "address".to_owned(),
            TypeDescriptor::Utf8String => UTF8_STRING_TYPE_NAME.to_owned(),
            TypeDescriptor::AsciiString => ASCII_STRING_TYPE_NAME.to_owned(),
            TypeDescriptor::Vector(elem) => format!("vector<{}>", elem.canonical_name()),
            TypeDescriptor::Option(inner) => {
                format!("{}<{}>", OPTION_TYPE_NAME, inner.canonical_name())
            }
            TypeDescriptor::Struct(desc) => desc.full_type_name(),
            TypeDescriptor::Phantom(name) => name.clone(),
        }
    }

    /// True iff this descriptor is the name-only phantom variant.
    #[must_use]
    pub fn is_phantom(&self) -> bool {
        matches!(self, TypeDescriptor::Phantom(_))
    }
}

/// Wraps a descriptor into its phantom form, retaining only the
/// canonical name.
///
/// The result satisfies the descriptor interface for type-argument
/// slots but supports no value-level decoding; it exists solely to emit
/// the argument's name into composite type strings.
#[must_use]
pub fn phantom(inner: TypeDescriptor) -> TypeDescriptor {
    match inner {
        TypeDescriptor::Phantom(name) => TypeDescriptor::Phantom(name),
        other => TypeDescriptor::Phantom(other.canonical_name()),
    }
}

/// Constructs a phantom descriptor directly from a type-name string.
#[must_use]
pub fn phantom_named(name: &str) -> TypeDescriptor {
    TypeDescriptor::Phantom(typename::canonicalize(name))
}

/// Descriptor for one struct instantiation: canonical base name, type
/// arguments, and the declared field layout under that instantiation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructDescriptor {
    type_name: String,
    type_args: Vec<TypeDescriptor>,
    fields: Vec<(String, TypeDescriptor)>,
}

impl StructDescriptor {
    /// Constructs a struct descriptor from a base name, type-argument
    /// descriptors, and the field layout in declared order.
    ///
    /// The base name is canonicalized on entry; field descriptors are
    /// taken as given (generated bindings construct them from their own
    /// reified arguments).
    #[must_use]
    pub fn new(
        type_name: &str,
        type_args: Vec<TypeDescriptor>,
        fields: Vec<(&str, TypeDescriptor)>,
    ) -> Self {
        Self {
            type_name: typename::canonicalize(type_name),
            type_args,
            fields: fields
                .into_iter()
                .map(|(name, desc)| (name.to_owned(), desc))
                .collect(),
        }
    }

    /// Canonical base name, without type arguments.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Type-argument descriptors, in declared parameter order.
    #[must_use]
    pub fn type_args(&self) -> &[TypeDescriptor] {
        &self.type_args
    }

    /// Declared field layout under this instantiation.
    #[must_use]
    pub fn fields(&self) -> &[(String, TypeDescriptor)] {
        &self.fields
    }

    /// Full canonical type name, including the angle-bracket argument
    /// list for generic instantiations.
    #[must_use]
    pub fn full_type_name(&self) -> String {
        let args: Vec<String> = self
            .type_args
            .iter()
            .map(TypeDescriptor::canonical_name)
            .collect();
        typename::compose(&self.type_name, &args)
    }

    /// Wraps this descriptor into the [`TypeDescriptor`] union.
    #[must_use]
    pub fn into_descriptor(self) -> TypeDescriptor {
        TypeDescriptor::Struct(Box::new(self))
    }
}

/// Verifies that a descriptor factory received exactly the declared
/// number of type-argument descriptors.
///
/// # Errors
///
/// Fails with [`ArityError`] on any mismatch; the argument list is
/// never silently truncated or padded.
pub fn check_arity(
    type_name: &str,
    expected: usize,
    args: &[TypeDescriptor],
) -> Result<(), ArityError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ArityError {
            type_name: type_name.to_owned(),
            expected,
            actual: args.len(),
        })
    }
}

/// Verifies that the type arguments embedded in a declared type string
/// match the expected argument descriptors, pairwise by canonical name.
///
/// # Errors
///
/// Fails with [`ArityError`] if the declared argument count differs,
/// or [`TypeMismatchError`] on the first pairwise name disagreement.
pub fn assert_type_args_match(
    declared_type: &str,
    expected: &[TypeDescriptor],
) -> DecodeResult<()> {
    let canonical = typename::canonicalize(declared_type);
    let (base, declared_args) = typename::split_type_args(&canonical);
    if declared_args.len() != expected.len() {
        return Err(ArityError {
            type_name: base.to_owned(),
            expected: expected.len(),
            actual: declared_args.len(),
        }
        .into());
    }
    for (declared, descriptor) in declared_args.iter().zip(expected) {
        let expected_name = descriptor.canonical_name();
        if *declared != expected_name {
            return Err(TypeMismatchError {
                expected: expected_name,
                declared: declared.clone(),
            }
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn referent_of(arg: TypeDescriptor) -> StructDescriptor {
        StructDescriptor::new(
            "0x2::borrow::Referent",
            vec![arg.clone()],
            vec![
                ("id", TypeDescriptor::Address),
                ("value", TypeDescriptor::Option(Box::new(arg))),
            ],
        )
    }

    #[test]
    fn canonical_names_compose() {
        assert_eq!(
            TypeDescriptor::Vector(Box::new(TypeDescriptor::U8)).canonical_name(),
            "vector<u8>"
        );
        assert_eq!(
            referent_of(TypeDescriptor::U64).into_descriptor().canonical_name(),
            "0x2::borrow::Referent<u64>"
        );
    }

    #[test]
    fn factories_are_referentially_transparent() {
        assert_eq!(referent_of(TypeDescriptor::U64), referent_of(TypeDescriptor::U64));
        assert_ne!(referent_of(TypeDescriptor::U64), referent_of(TypeDescriptor::U8));
    }

    #[test]
    fn phantom_retains_only_the_name() {
        let p = phantom(referent_of(TypeDescriptor::U64).into_descriptor());
        assert_eq!(
            p,
            TypeDescriptor::Phantom("0x2::borrow::Referent<u64>".to_owned())
        );
        assert!(p.is_phantom());
    }

    #[test]
    fn arity_is_checked_eagerly() {
        assert!(check_arity("0x2::borrow::Referent", 1, &[TypeDescriptor::U64]).is_ok());
        let err = check_arity("0x2::borrow::Referent", 1, &[]).unwrap_err();
        assert_eq!(err.expected, 1);
        assert_eq!(err.actual, 0);
    }

    #[test]
    fn declared_args_are_compared_canonically() {
        let expected = [TypeDescriptor::U64];
        assert!(assert_type_args_match("0x2::borrow::Referent< u64 >", &expected).is_ok());
        assert!(assert_type_args_match("0x2::borrow::Referent<u8>", &expected).is_err());
        assert!(assert_type_args_match("0x2::borrow::Referent", &expected).is_err());
    }
}
