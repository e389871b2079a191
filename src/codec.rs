//! Binary codec composition and byte-level parsing
//!
//! The binary wire format is a BCS-style canonical encoding: a pure
//! declared-order concatenation of element encodings with no padding,
//! tags, or field separators. Layout is determined entirely by the
//! receiver's expected schema, so both directions of the codec are
//! driven by a [`TypeDescriptor`]:
//!
//!   * unsigned integers: little-endian, fixed width (1–32 bytes)
//!   * booleans: one byte, `0x00` or `0x01`
//!   * addresses: fixed 32-byte sequences
//!   * strings and vectors: ULEB128 element count, then the elements
//!   * optionals: one presence byte, then zero or one encoded value
//!   * structs: the concatenated encodings of their fields, in declared
//!     order, recursively
//!
//! Composition for generic structs happens per type-argument
//! instantiation: the descriptor for `Referent<u64>` and the descriptor
//! for `Referent<SomeStruct>` yield distinct codecs. Callers may cache
//! descriptors to avoid re-deriving codecs, but correctness never
//! depends on sharing.
//!
//! Parsing tracks the absolute byte offset at all times; every layout
//! violation is reported as a [`CodecParseError`] carrying the offset
//! at which it was detected.

use num_bigint::BigUint;

use crate::address::Address;
use crate::error::{CodecErrorKind, CodecParseError, ShapeError};
use crate::reified::{StructDescriptor, TypeDescriptor};
use crate::value::{RawValue, Value};

/// Result alias for byte-level parsing.
pub type CodecResult<T> = Result<T, CodecParseError>;

/// Maximum element count or byte length encodable in a ULEB128 prefix.
const MAX_SEQUENCE_LENGTH: u64 = u32::MAX as u64;

/// Cursor over a binary input buffer with absolute offset tracking.
///
/// All `take_*` methods advance the offset on success and leave it at
/// the point of failure otherwise, so that the offset embedded in a
/// returned error identifies the violating position exactly.
#[derive(Debug)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader positioned at the start of `buf`.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Current absolute offset into the input.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of bytes not yet consumed.
    #[must_use]
    pub fn remainder(&self) -> usize {
        self.buf.len() - self.offset
    }

    fn err(&self, kind: CodecErrorKind) -> CodecParseError {
        CodecParseError {
            offset: self.offset,
            kind,
        }
    }

    /// Consumes exactly `n` bytes, failing with `UnexpectedEof` if
    /// fewer remain.
    pub fn take(&mut self, n: usize) -> CodecResult<&'a [u8]> {
        if self.remainder() < n {
            return Err(self.err(CodecErrorKind::UnexpectedEof {
                requested: n,
                remaining: self.remainder(),
            }));
        }
        let slice = &self.buf[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    /// Consumes one byte.
    pub fn take_u8(&mut self) -> CodecResult<u8> {
        Ok(self.take(1)?[0])
    }

    /// Consumes a one-byte boolean, accepting only `0x00` and `0x01`.
    pub fn take_bool(&mut self) -> CodecResult<bool> {
        let at = self.offset;
        match self.take_u8()? {
            0x00 => Ok(false),
            0x01 => Ok(true),
            byte => Err(CodecParseError {
                offset: at,
                kind: CodecErrorKind::InvalidBool(byte),
            }),
        }
    }

    /// Consumes a little-endian `u16`.
    pub fn take_u16(&mut self) -> CodecResult<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Consumes a little-endian `u32`.
    pub fn take_u32(&mut self) -> CodecResult<u32> {
        let bytes = self.take(4)?;
        let mut arr = [0u8; 4];
        arr.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(arr))
    }

    /// Consumes a little-endian `u64`.
    pub fn take_u64(&mut self) -> CodecResult<u64> {
        let bytes = self.take(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(arr))
    }

    /// Consumes a little-endian `u128`.
    pub fn take_u128(&mut self) -> CodecResult<u128> {
        let bytes = self.take(16)?;
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(u128::from_le_bytes(arr))
    }

    /// Consumes a little-endian 256-bit unsigned integer.
    pub fn take_u256(&mut self) -> CodecResult<BigUint> {
        let bytes = self.take(32)?;
        Ok(BigUint::from_bytes_le(bytes))
    }

    /// Consumes a ULEB128-encoded length prefix.
    ///
    /// Values above `u32::MAX` are rejected with `LengthOverflow`.
    pub fn take_uleb128(&mut self) -> CodecResult<usize> {
        let start = self.offset;
        let mut value: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let byte = self.take_u8()?;
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
            if shift > 32 {
                return Err(CodecParseError {
                    offset: start,
                    kind: CodecErrorKind::LengthOverflow,
                });
            }
        }
        if value > MAX_SEQUENCE_LENGTH {
            return Err(CodecParseError {
                offset: start,
                kind: CodecErrorKind::LengthOverflow,
            });
        }
        Ok(value as usize)
    }

    /// Verifies that the input has been fully consumed.
    pub fn finish(&self) -> CodecResult<()> {
        if self.remainder() == 0 {
            Ok(())
        } else {
            Err(CodecParseError {
                offset: self.offset,
                kind: CodecErrorKind::TrailingBytes {
                    residual: self.remainder(),
                },
            })
        }
    }
}

/// Appends a ULEB128-encoded length to `out`.
fn write_uleb128(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Composed binary codec for one type instantiation.
///
/// A `Codec` borrows the descriptor it was derived from; obtaining one
/// is free, and two codecs behave identically iff their descriptors are
/// structurally equal.
#[derive(Clone, Copy, Debug)]
pub struct Codec<'a> {
    layout: &'a TypeDescriptor,
}

impl TypeDescriptor {
    /// The composed binary codec for this instantiation.
    #[must_use]
    pub fn codec(&self) -> Codec<'_> {
        Codec { layout: self }
    }
}

impl<'a> Codec<'a> {
    /// Parses a complete input buffer, requiring that every byte is
    /// consumed.
    ///
    /// # Errors
    ///
    /// Any layout violation, including trailing bytes after the final
    /// declared field, fails with a [`CodecParseError`] carrying the
    /// byte offset.
    pub fn parse(&self, bytes: &[u8]) -> CodecResult<RawValue> {
        let mut reader = ByteReader::new(bytes);
        let value = self.read(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }

    /// Reads one value of the described type from the reader, leaving
    /// the reader positioned after it.
    pub fn read(&self, reader: &mut ByteReader<'_>) -> CodecResult<RawValue> {
        match self.layout {
            TypeDescriptor::Bool => Ok(RawValue::Bool(reader.take_bool()?)),
            TypeDescriptor::U8 => Ok(RawValue::U8(reader.take_u8()?)),
            TypeDescriptor::U16 => Ok(RawValue::U16(reader.take_u16()?)),
            TypeDescriptor::U32 => Ok(RawValue::U32(reader.take_u32()?)),
            TypeDescriptor::U64 => Ok(RawValue::U64(reader.take_u64()?)),
            TypeDescriptor::U128 => Ok(RawValue::U128(reader.take_u128()?)),
            TypeDescriptor::U256 => Ok(RawValue::U256(reader.take_u256()?)),
            TypeDescriptor::Address => {
                Ok(RawValue::Bytes(reader.take(Address::LENGTH)?.to_vec()))
            }
            TypeDescriptor::Utf8String | TypeDescriptor::AsciiString => {
                let len = reader.take_uleb128()?;
                let at = reader.offset();
                let bytes = reader.take(len)?;
                match std::str::from_utf8(bytes) {
                    Ok(s) => Ok(RawValue::String(s.to_owned())),
                    Err(_) => Err(CodecParseError {
                        offset: at,
                        kind: CodecErrorKind::InvalidUtf8,
                    }),
                }
            }
            TypeDescriptor::Vector(elem) => {
                let len = reader.take_uleb128()?;
                let elem_codec = elem.codec();
                let mut items = Vec::with_capacity(len.min(4096));
                for _ in 0..len {
                    items.push(elem_codec.read(reader)?);
                }
                Ok(RawValue::Seq(items))
            }
            TypeDescriptor::Option(inner) => {
                let at = reader.offset();
                match reader.take_u8()? {
                    0x00 => Ok(RawValue::Opt(None)),
                    0x01 => Ok(RawValue::Opt(Some(Box::new(inner.codec().read(reader)?)))),
                    byte => Err(CodecParseError {
                        offset: at,
                        kind: CodecErrorKind::InvalidOptionTag(byte),
                    }),
                }
            }
            TypeDescriptor::Struct(desc) => read_struct(desc, reader),
            TypeDescriptor::Phantom(name) => Err(CodecParseError {
                offset: reader.offset(),
                kind: CodecErrorKind::PhantomLayout {
                    type_name: name.clone(),
                },
            }),
        }
    }

    /// Serializes a canonical value against this codec.
    ///
    /// # Errors
    ///
    /// Fails with a [`ShapeError`] if the value tree does not match the
    /// described layout, or if a numeric value exceeds its declared
    /// width.
    pub fn serialize(&self, value: &Value) -> Result<Vec<u8>, ShapeError> {
        let mut out = Vec::new();
        self.write(value, &mut out)?;
        Ok(out)
    }

    /// Appends the encoding of `value` to `out`.
    pub fn write(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), ShapeError> {
        match (self.layout, value) {
            (TypeDescriptor::Bool, Value::Bool(b)) => {
                out.push(u8::from(*b));
                Ok(())
            }
            (TypeDescriptor::U8, Value::U8(n)) => {
                out.push(*n);
                Ok(())
            }
            (TypeDescriptor::U16, Value::U16(n)) => {
                out.extend_from_slice(&n.to_le_bytes());
                Ok(())
            }
            (TypeDescriptor::U32, Value::U32(n)) => {
                out.extend_from_slice(&n.to_le_bytes());
                Ok(())
            }
            (TypeDescriptor::U64, Value::U64(n)) => {
                out.extend_from_slice(&n.to_le_bytes());
                Ok(())
            }
            (TypeDescriptor::U128, Value::U128(n)) => {
                out.extend_from_slice(&n.to_le_bytes());
                Ok(())
            }
            (TypeDescriptor::U256, Value::U256(n)) => {
                if n.bits() > 256 {
                    return Err(ShapeError::OutOfRange {
                        type_name: "u256",
                        value: n.to_string(),
                    });
                }
                let mut bytes = n.to_bytes_le();
                bytes.resize(32, 0);
                out.extend_from_slice(&bytes);
                Ok(())
            }
            (TypeDescriptor::Address, Value::Address(addr)) => {
                out.extend_from_slice(addr.as_bytes());
                Ok(())
            }
            (TypeDescriptor::Utf8String | TypeDescriptor::AsciiString, Value::String(s)) => {
                write_length(s.len(), out)?;
                out.extend_from_slice(s.as_bytes());
                Ok(())
            }
            (TypeDescriptor::Vector(elem), Value::Vector(items)) => {
                write_length(items.len(), out)?;
                let elem_codec = elem.codec();
                for item in items {
                    elem_codec.write(item, out)?;
                }
                Ok(())
            }
            (TypeDescriptor::Option(inner), Value::Option(opt)) => match opt {
                Some(item) => {
                    out.push(0x01);
                    inner.codec().write(item, out)
                }
                None => {
                    out.push(0x00);
                    Ok(())
                }
            },
            (TypeDescriptor::Struct(desc), Value::Struct(sv)) => {
                for (name, field_desc) in desc.fields() {
                    match sv.field(name) {
                        Some(field_value) => field_desc.codec().write(field_value, out)?,
                        None => {
                            return Err(ShapeError::MissingField {
                                field: name.clone(),
                            })
                        }
                    }
                }
                Ok(())
            }
            (TypeDescriptor::Phantom(name), _) => Err(ShapeError::PhantomValue {
                type_name: name.clone(),
            }),
            (layout, value) => Err(ShapeError::WrongKind {
                expected: kind_of(layout),
                actual: value.kind().to_owned(),
            }),
        }
    }
}

/// Reads a struct payload: the concatenated field encodings in declared
/// order.
fn read_struct(desc: &StructDescriptor, reader: &mut ByteReader<'_>) -> CodecResult<RawValue> {
    let mut fields = Vec::with_capacity(desc.fields().len());
    for (name, field_desc) in desc.fields() {
        let value = field_desc.codec().read(reader)?;
        fields.push((name.clone(), value));
    }
    Ok(RawValue::Fields(fields))
}

fn write_length(len: usize, out: &mut Vec<u8>) -> Result<(), ShapeError> {
    let len = len as u64;
    if len > MAX_SEQUENCE_LENGTH {
        return Err(ShapeError::OutOfRange {
            type_name: "sequence length",
            value: len.to_string(),
        });
    }
    write_uleb128(len, out);
    Ok(())
}

/// One-word description of a descriptor's expected value kind, for
/// mismatch messages.
fn kind_of(layout: &TypeDescriptor) -> &'static str {
    match layout {
        TypeDescriptor::Bool => "bool",
        TypeDescriptor::U8 => "u8",
        TypeDescriptor::U16 => "u16",
        TypeDescriptor::U32 => "u32",
        TypeDescriptor::U64 => "u64",
        TypeDescriptor::U128 => "u128",
        TypeDescriptor::U256 => "u256",
        TypeDescriptor::Address => "address",
        TypeDescriptor::Utf8String | TypeDescriptor::AsciiString => "string",
        TypeDescriptor::Vector(_) => "vector",
        TypeDescriptor::Option(_) => "option",
        TypeDescriptor::Struct(_) => "struct",
        TypeDescriptor::Phantom(_) => "phantom",
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::CodecErrorKind;

    #[test]
    fn uleb128_roundtrip() {
        for value in [0u64, 1, 127, 128, 300, 16384, u64::from(u32::MAX)] {
            let mut buf = Vec::new();
            write_uleb128(value, &mut buf);
            let mut reader = ByteReader::new(&buf);
            assert_eq!(reader.take_uleb128().unwrap(), value as usize);
            assert!(reader.finish().is_ok());
        }
    }

    #[test]
    fn uleb128_overflow_is_rejected() {
        // Six continuation groups push the shift past the u32 range.
        let buf = [0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        let mut reader = ByteReader::new(&buf);
        let err = reader.take_uleb128().unwrap_err();
        assert_eq!(err.kind, CodecErrorKind::LengthOverflow);
    }

    #[test]
    fn truncation_reports_offset() {
        let layout = TypeDescriptor::U64;
        let err = layout.codec().parse(&[0x01, 0x02]).unwrap_err();
        assert_eq!(err.offset, 0);
        assert_eq!(
            err.kind,
            CodecErrorKind::UnexpectedEof {
                requested: 8,
                remaining: 2
            }
        );
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let layout = TypeDescriptor::Bool;
        let err = layout.codec().parse(&[0x01, 0x00]).unwrap_err();
        assert_eq!(err.offset, 1);
        assert_eq!(err.kind, CodecErrorKind::TrailingBytes { residual: 1 });
    }

    #[test]
    fn invalid_bool_and_option_tags() {
        let err = TypeDescriptor::Bool.codec().parse(&[0x02]).unwrap_err();
        assert_eq!(err.kind, CodecErrorKind::InvalidBool(0x02));

        let layout = TypeDescriptor::Option(Box::new(TypeDescriptor::U8));
        let err = layout.codec().parse(&[0xff, 0x00]).unwrap_err();
        assert_eq!(err.kind, CodecErrorKind::InvalidOptionTag(0xff));
    }

    #[test]
    fn string_roundtrip() {
        let layout = TypeDescriptor::Utf8String;
        let bytes = layout
            .codec()
            .serialize(&Value::String("hello".to_owned()))
            .unwrap();
        assert_eq!(bytes, b"\x05hello");
        assert_eq!(
            layout.codec().parse(&bytes).unwrap(),
            RawValue::String("hello".to_owned())
        );
    }

    #[test]
    fn u256_serializes_to_32_le_bytes() {
        let layout = TypeDescriptor::U256;
        let bytes = layout
            .codec()
            .serialize(&Value::U256(num_bigint::BigUint::from(0x0102u32)))
            .unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[..2], &[0x02, 0x01]);
        assert_eq!(
            layout.codec().parse(&bytes).unwrap(),
            RawValue::U256(num_bigint::BigUint::from(0x0102u32))
        );
    }

    #[test]
    fn phantom_has_no_layout() {
        let layout = TypeDescriptor::Phantom("0x2::kiosk::Kiosk".to_owned());
        let err = layout.codec().parse(&[]).unwrap_err();
        assert!(matches!(err.kind, CodecErrorKind::PhantomLayout { .. }));
    }
}
