//! Dynamic value trees produced and consumed by the generic decoder
//!
//! Two closely related representations are defined here:
//!
//!   * [`RawValue`]: the untyped output of the binary codec. Addresses
//!     are still raw byte-sequences, and struct values are bare field
//!     maps with no type name attached, mirroring exactly what can be
//!     recovered from a non-self-describing binary format.
//!   * [`Value`]: the canonical in-memory form produced by the generic
//!     field decoder. Addresses have been coerced to [`Address`], and
//!     every struct value carries its full canonical type name.
//!
//! The typed layer ([`MoveType`](crate::typed::MoveType)) converts
//! between `Value` trees and concrete Rust values; generated bindings
//! never touch `RawValue` directly.
//!
//! Additionally, [`FieldsWithTypes`] models the input shape returned by
//! a node that echoes each field's declared type alongside its value,
//! which feeds the type-checked decode path.

use num_bigint::BigUint;
use serde::Deserialize;

use crate::address::Address;
use crate::error::{DecodeResult, ShapeError};

/// Untyped field map recovered from the binary codec: field name paired
/// with raw value, in declared order.
pub type FieldMap = Vec<(String, RawValue)>;

/// Raw decoded value, prior to coercion into canonical in-memory form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    U256(BigUint),
    /// Fixed-width byte payload (addresses and object identifiers).
    Bytes(Vec<u8>),
    String(String),
    Seq(Vec<RawValue>),
    Opt(Option<Box<RawValue>>),
    /// Struct payload: bare fields in declared order, no type name.
    Fields(FieldMap),
}

impl RawValue {
    /// One-word description of this value's kind, for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Bool(_) => "bool",
            RawValue::U8(_) => "u8",
            RawValue::U16(_) => "u16",
            RawValue::U32(_) => "u32",
            RawValue::U64(_) => "u64",
            RawValue::U128(_) => "u128",
            RawValue::U256(_) => "u256",
            RawValue::Bytes(_) => "bytes",
            RawValue::String(_) => "string",
            RawValue::Seq(_) => "sequence",
            RawValue::Opt(_) => "option",
            RawValue::Fields(_) => "fields",
        }
    }
}

/// Looks up a field by name in an untyped field map.
#[must_use]
pub fn raw_field<'a>(fields: &'a FieldMap, name: &str) -> Option<&'a RawValue> {
    fields
        .iter()
        .find_map(|(n, v)| if n == name { Some(v) } else { None })
}

/// Canonical in-memory value, fully coerced and type-annotated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    U256(BigUint),
    Address(Address),
    String(String),
    Vector(Vec<Value>),
    Option(Option<Box<Value>>),
    Struct(StructValue),
}

impl Value {
    /// One-word description of this value's kind, for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::U128(_) => "u128",
            Value::U256(_) => "u256",
            Value::Address(_) => "address",
            Value::String(_) => "string",
            Value::Vector(_) => "vector",
            Value::Option(_) => "option",
            Value::Struct(_) => "struct",
        }
    }
}

/// A decoded struct value: full canonical type name plus fields in
/// declared order.
///
/// Constructible without validation; the type-name checks that guard
/// externally-sourced data live at the decode entry points, not here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructValue {
    /// Full canonical type name, including any type arguments.
    pub type_name: String,
    /// Field values in declared order.
    pub fields: Vec<(String, Value)>,
}

impl StructValue {
    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find_map(|(n, v)| if n == name { Some(v) } else { None })
    }

    /// Removes and returns the named field, failing with
    /// [`ShapeError::MissingField`] if it is absent.
    pub fn take_field(&mut self, name: &str) -> DecodeResult<Value> {
        match self.fields.iter().position(|(n, _)| n == name) {
            Some(ix) => Ok(self.fields.remove(ix).1),
            None => Err(ShapeError::MissingField {
                field: name.to_owned(),
            }
            .into()),
        }
    }
}

/// Input shape pairing a record's declared type with its field values,
/// as returned by a node that echoes types alongside data.
///
/// Field values are structured JSON: primitives appear as numbers or
/// decimal strings, addresses as hex strings, and nested struct values
/// as objects that repeat this same `{type, fields}` shape.
#[derive(Clone, Debug, Deserialize)]
pub struct FieldsWithTypes {
    /// Declared type of the record, possibly in non-canonical spelling.
    #[serde(rename = "type")]
    pub type_: String,
    /// Field name to structured value.
    pub fields: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn take_field_removes_and_reports_missing() {
        let mut sv = StructValue {
            type_name: "0x2::object::ID".to_owned(),
            fields: vec![("bytes".to_owned(), Value::Address(Address::ZERO))],
        };
        assert!(sv.take_field("bytes").is_ok());
        assert!(sv.take_field("bytes").is_err());
    }

    #[test]
    fn fields_with_types_deserializes() {
        let item: FieldsWithTypes = serde_json::from_value(serde_json::json!({
            "type": "0x2::kiosk_extension::ExtensionKey<0x2::kiosk::Kiosk>",
            "fields": { "dummy_field": true }
        }))
        .unwrap();
        assert!(item.type_.starts_with("0x2::kiosk_extension"));
        assert_eq!(item.fields["dummy_field"], serde_json::json!(true));
    }
}
