//! Error types reported by descriptor construction and decoding
//!
//! This module contains the closed hierarchy of error types that may
//! arise while constructing reified type descriptors, or while decoding
//! values of described types from any of the supported source
//! representations.
//!
//! # Layout
//!
//! The primary type is the umbrella enumeration [`DecodeError`], together
//! with the alias [`DecodeResult<T>`]; the remaining types are refinements
//! of `DecodeError`, grouped by provenance:
//!
//!   * [`ArityError`]: a generic descriptor factory was given the wrong
//!     number of type-argument descriptors
//!   * [`TypeMismatchError`]: a declared type name disagreed with the
//!     expected canonical name at a decode boundary
//!   * [`CodecParseError`]: the binary layout of the input was violated
//!   * [`ShapeError`]: a structured input was missing an expected key, or
//!     held a value of the wrong kind
//!   * [`NotFoundError`]: a record or registered type could not be located
//!
//! Every error is raised synchronously at the point of detection and
//! propagated unchanged through compositional decoding; there is no
//! aggregation of multiple failures, and no partial results.

use std::convert::Infallible;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Enumeration over all errors that may be produced by descriptor
/// factories, the generic field decoder, the binary codec, or the
/// record-fetching helpers.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// Wrong number of type arguments supplied to a generic descriptor factory.
    Arity(ArityError),
    /// Declared and expected canonical type names disagree.
    TypeMismatch(TypeMismatchError),
    /// Binary layout violated while parsing raw bytes.
    Codec(CodecParseError),
    /// Structured input of the wrong shape.
    Shape(ShapeError),
    /// Record or registered type not found.
    NotFound(NotFoundError),
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Arity(err) => Display::fmt(err, f),
            DecodeError::TypeMismatch(err) => Display::fmt(err, f),
            DecodeError::Codec(err) => Display::fmt(err, f),
            DecodeError::Shape(err) => Display::fmt(err, f),
            DecodeError::NotFound(err) => Display::fmt(err, f),
        }
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DecodeError::Arity(err) => Some(err),
            DecodeError::TypeMismatch(err) => Some(err),
            DecodeError::Codec(err) => Some(err),
            DecodeError::Shape(err) => Some(err),
            DecodeError::NotFound(err) => Some(err),
        }
    }
}

impl From<Infallible> for DecodeError {
    fn from(_void: Infallible) -> Self {
        match _void {}
    }
}

/// Type alias for `Result` with an error type of [`DecodeError`]
///
/// All decode entry points, descriptor factories, and registry lookups
/// return `DecodeResult<T>` for various `T`.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Error raised when a generic descriptor factory is invoked with the
/// wrong number of type-argument descriptors.
///
/// This is detected eagerly, at descriptor-construction time, never
/// lazily at decode time; the supplied argument list is neither
/// truncated nor padded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArityError {
    /// Canonical base name of the generic type.
    pub type_name: String,
    /// Declared number of type parameters.
    pub expected: usize,
    /// Number of type-argument descriptors actually supplied.
    pub actual: usize,
}

impl Display for ArityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "type {} declares {} type parameter(s) but {} argument(s) were supplied",
            self.type_name, self.expected, self.actual
        )
    }
}

impl Error for ArityError {}

impl From<ArityError> for DecodeError {
    fn from(err: ArityError) -> Self {
        Self::Arity(err)
    }
}

/// Error raised when the declared type name of an externally-sourced
/// value disagrees with the canonical name of the expected descriptor.
///
/// Both names are retained so that the failure message can identify the
/// exact boundary at which the disagreement was detected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeMismatchError {
    /// Canonical name the decoder expected.
    pub expected: String,
    /// Canonicalized name the input declared.
    pub declared: String,
}

impl Display for TypeMismatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "declared type `{}` does not match expected type `{}`",
            self.declared, self.expected
        )
    }
}

impl Error for TypeMismatchError {}

impl From<TypeMismatchError> for DecodeError {
    fn from(err: TypeMismatchError) -> Self {
        Self::TypeMismatch(err)
    }
}

/// Classification of the ways in which a binary input can violate the
/// layout dictated by a composed codec.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum CodecErrorKind {
    /// The buffer ended before all declared fields were consumed.
    UnexpectedEof {
        /// Number of bytes the current element required.
        requested: usize,
        /// Number of bytes actually remaining.
        remaining: usize,
    },
    /// Bytes remained in the buffer after the final declared field.
    TrailingBytes { residual: usize },
    /// A byte intended to represent a boolean was neither `0x00` nor `0x01`.
    InvalidBool(u8),
    /// A byte intended to tag optional presence was neither `0x00` nor `0x01`.
    InvalidOptionTag(u8),
    /// A ULEB128 length prefix exceeded the maximum encodable value.
    LengthOverflow,
    /// A length-prefixed byte sequence declared as a string was not valid UTF-8.
    InvalidUtf8,
    /// A binary layout was requested for a phantom type parameter, which
    /// has none.
    PhantomLayout { type_name: String },
}

/// Error raised when raw binary input cannot be parsed against a
/// composed codec, carrying the byte offset at which the violation
/// was detected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecParseError {
    /// Byte offset into the input at the point of failure.
    pub offset: usize,
    /// Classification of the violation.
    pub kind: CodecErrorKind,
}

impl Display for CodecParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            CodecErrorKind::UnexpectedEof {
                requested,
                remaining,
            } => write!(
                f,
                "unexpected end of input at byte {}: needed {} byte(s), {} remaining",
                self.offset, requested, remaining
            ),
            CodecErrorKind::TrailingBytes { residual } => write!(
                f,
                "{} trailing byte(s) at offset {} after final declared field",
                residual, self.offset
            ),
            CodecErrorKind::InvalidBool(byte) => write!(
                f,
                "invalid boolean byte {:#04x} at offset {}",
                byte, self.offset
            ),
            CodecErrorKind::InvalidOptionTag(byte) => write!(
                f,
                "invalid option presence byte {:#04x} at offset {}",
                byte, self.offset
            ),
            CodecErrorKind::LengthOverflow => write!(
                f,
                "ULEB128 length prefix at offset {} overflows u32",
                self.offset
            ),
            CodecErrorKind::InvalidUtf8 => write!(
                f,
                "string contents at offset {} are not valid UTF-8",
                self.offset
            ),
            CodecErrorKind::PhantomLayout { type_name } => write!(
                f,
                "phantom type parameter `{}` has no binary layout",
                type_name
            ),
        }
    }
}

impl Error for CodecParseError {}

impl From<CodecParseError> for DecodeError {
    fn from(err: CodecParseError) -> Self {
        Self::Codec(err)
    }
}

/// Error type representing all possible conditions of invalidity
/// encountered when interpreting a string or byte-sequence as a
/// 32-byte address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddressError {
    /// A character outside of `[0-9a-fA-F]` was found after the optional
    /// `0x` prefix.
    NonHex { found: char },
    /// More than 64 hex digits were supplied.
    TooLong { digits: usize },
    /// A raw byte-sequence of the wrong width was supplied.
    WrongWidth { actual: usize },
}

impl Display for AddressError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressError::NonHex { found } => {
                write!(f, "non-hex character `{}` in address literal", found)
            }
            AddressError::TooLong { digits } => {
                write!(f, "address literal has {} hex digits (maximum 64)", digits)
            }
            AddressError::WrongWidth { actual } => {
                write!(f, "{}-byte value violated address width of 32 bytes", actual)
            }
        }
    }
}

impl Error for AddressError {}

impl From<AddressError> for ShapeError {
    fn from(err: AddressError) -> Self {
        Self::Address(err)
    }
}

impl From<AddressError> for DecodeError {
    fn from(err: AddressError) -> Self {
        Self::Shape(ShapeError::Address(err))
    }
}

/// Error raised when a structured (JSON-like or fields-with-types) input,
/// or an already-decoded value tree, does not have the shape required by
/// the expected descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ShapeError {
    /// A declared field was absent from the input.
    MissingField { field: String },
    /// A value of the wrong kind appeared where another was expected.
    WrongKind {
        expected: &'static str,
        actual: String,
    },
    /// A numeric value fell outside the declared integer width.
    OutOfRange {
        type_name: &'static str,
        value: String,
    },
    /// An address literal could not be interpreted.
    Address(AddressError),
    /// A value-level decode was attempted against a phantom type parameter.
    PhantomValue { type_name: String },
}

impl Display for ShapeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeError::MissingField { field } => {
                write!(f, "declared field `{}` missing from input", field)
            }
            ShapeError::WrongKind { expected, actual } => {
                write!(f, "expected {} but found {}", expected, actual)
            }
            ShapeError::OutOfRange { type_name, value } => {
                write!(f, "value {} out of range for {}", value, type_name)
            }
            ShapeError::Address(err) => Display::fmt(err, f),
            ShapeError::PhantomValue { type_name } => write!(
                f,
                "attempted value-level decode of phantom type parameter `{}`",
                type_name
            ),
        }
    }
}

impl Error for ShapeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ShapeError::Address(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShapeError> for DecodeError {
    fn from(err: ShapeError) -> Self {
        Self::Shape(err)
    }
}

/// Error raised when a record or a registered type cannot be located.
///
/// The `Record` case is surfaced unchanged from the external fetch
/// collaborator; the `Type` case arises when a declared type name has
/// no entry in the struct registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotFoundError {
    /// No record exists under the given identifier.
    Record { id: String },
    /// No binding is registered under the given canonical type name.
    Type { type_name: String },
}

impl Display for NotFoundError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NotFoundError::Record { id } => write!(f, "no record found at id {}", id),
            NotFoundError::Type { type_name } => {
                write!(f, "no binding registered for type `{}`", type_name)
            }
        }
    }
}

impl Error for NotFoundError {}

impl From<NotFoundError> for DecodeError {
    fn from(err: NotFoundError) -> Self {
        Self::NotFound(err)
    }
}

#[cfg(test)]
mod test {
    fn dummy<T: Send + Sync>() {}

    #[test]
    fn decode_error_threadsafe() {
        dummy::<super::DecodeError>()
    }

    #[test]
    fn mismatch_display_names_both_types() {
        let err = super::TypeMismatchError {
            expected: "0x2::borrow::Borrow".to_owned(),
            declared: "0x2::borrow::Referent<u64>".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("0x2::borrow::Borrow"));
        assert!(msg.contains("0x2::borrow::Referent<u64>"));
    }
}
