//! The generic field decoder
//!
//! One decoding algorithm serves every generated binding, by dispatching
//! on the expected [`TypeDescriptor`] rather than on the payload itself.
//! The dispatch is three-way: primitives are coerced directly; the
//! well-known parametric types (string, vector, option) recurse
//! structurally; arbitrary struct descriptors delegate to their own
//! field layout. Because a descriptor is a closed tagged union resolved
//! at construction time, no name-string inspection occurs during
//! decoding.
//!
//! Four entry points cover the supported source representations:
//!
//! | Source | Entry point |
//! |---|---|
//! | untyped field map from the binary codec | [`TypeDescriptor::decode_from_fields`] |
//! | fields with declared type strings | [`TypeDescriptor::decode_from_typed_fields`] |
//! | raw binary bytes for a whole record | [`TypeDescriptor::decode_from_bytes`] |
//! | structured JSON-like field value | [`TypeDescriptor::decode_from_json`] |
//!
//! The typed-fields path additionally verifies every declared struct
//! type name against the expected descriptor before trusting the value;
//! the other paths are purely structural. All paths fail fast: the
//! first inner failure is propagated unchanged, and no partially-decoded
//! value is ever observable.
//!
//! The single encode path to the structured representation is
//! [`TypeDescriptor::to_json_field`]. Integers wider than 32 bits are
//! rendered as decimal strings, never as JSON numbers, so that values
//! survive consumers limited to double-precision floats.

use num_bigint::BigUint;
use serde_json::{json, Map, Value as JsonValue};

use crate::address::Address;
use crate::error::{DecodeResult, ShapeError, TypeMismatchError};
use crate::reified::{assert_type_args_match, StructDescriptor, TypeDescriptor};
use crate::typename;
use crate::value::{FieldMap, FieldsWithTypes, RawValue, StructValue, Value};

impl TypeDescriptor {
    /// Decodes a raw value recovered by the binary codec into canonical
    /// in-memory form.
    ///
    /// Primitives are coerced (raw 32-byte payloads become canonical
    /// [`Address`] values); vectors and options map element-wise;
    /// struct-typed values recurse through their own descriptors.
    pub fn decode_from_fields(&self, raw: &RawValue) -> DecodeResult<Value> {
        match (self, raw) {
            (TypeDescriptor::Bool, RawValue::Bool(b)) => Ok(Value::Bool(*b)),
            (TypeDescriptor::U8, RawValue::U8(n)) => Ok(Value::U8(*n)),
            (TypeDescriptor::U16, RawValue::U16(n)) => Ok(Value::U16(*n)),
            (TypeDescriptor::U32, RawValue::U32(n)) => Ok(Value::U32(*n)),
            (TypeDescriptor::U64, RawValue::U64(n)) => Ok(Value::U64(*n)),
            (TypeDescriptor::U128, RawValue::U128(n)) => Ok(Value::U128(*n)),
            (TypeDescriptor::U256, RawValue::U256(n)) => Ok(Value::U256(n.clone())),
            (TypeDescriptor::Address, RawValue::Bytes(bytes)) => {
                Ok(Value::Address(Address::from_bytes(bytes)?))
            }
            (
                TypeDescriptor::Utf8String | TypeDescriptor::AsciiString,
                RawValue::String(s),
            ) => Ok(Value::String(s.clone())),
            (TypeDescriptor::Vector(elem), RawValue::Seq(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(elem.decode_from_fields(item)?);
                }
                Ok(Value::Vector(out))
            }
            (TypeDescriptor::Option(inner), RawValue::Opt(opt)) => match opt {
                Some(item) => Ok(Value::Option(Some(Box::new(
                    inner.decode_from_fields(item)?,
                )))),
                None => Ok(Value::Option(None)),
            },
            (TypeDescriptor::Struct(desc), RawValue::Fields(fields)) => {
                desc.decode_fields(fields)
            }
            (TypeDescriptor::Phantom(name), _) => Err(ShapeError::PhantomValue {
                type_name: name.clone(),
            }
            .into()),
            (expected, raw) => Err(ShapeError::WrongKind {
                expected: expected_kind(expected),
                actual: raw.kind().to_owned(),
            }
            .into()),
        }
    }

    /// Decodes a structured field value whose struct-typed constituents
    /// carry declared type strings, verifying each declared name against
    /// the expected descriptor before trusting the payload.
    ///
    /// # Errors
    ///
    /// Fails with [`TypeMismatchError`] naming both types on any
    /// declared/expected disagreement, with [`ShapeError`] on missing
    /// keys or wrong value kinds, and propagates the first inner failure
    /// unchanged.
    pub fn decode_from_typed_fields(&self, json: &JsonValue) -> DecodeResult<Value> {
        match self {
            TypeDescriptor::Bool => Ok(Value::Bool(json_bool(json)?)),
            TypeDescriptor::U8 => Ok(Value::U8(narrow(json_u64(json)?, "u8")?)),
            TypeDescriptor::U16 => Ok(Value::U16(narrow(json_u64(json)?, "u16")?)),
            TypeDescriptor::U32 => Ok(Value::U32(narrow(json_u64(json)?, "u32")?)),
            TypeDescriptor::U64 => Ok(Value::U64(json_u64(json)?)),
            TypeDescriptor::U128 => Ok(Value::U128(json_u128(json)?)),
            TypeDescriptor::U256 => Ok(Value::U256(json_u256(json)?)),
            TypeDescriptor::Address => Ok(Value::Address(Address::from_hex(json_str(json)?)?)),
            TypeDescriptor::Utf8String | TypeDescriptor::AsciiString => {
                Ok(Value::String(json_str(json)?.to_owned()))
            }
            TypeDescriptor::Vector(elem) => {
                let items = json_array(json)?;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(elem.decode_from_typed_fields(item)?);
                }
                Ok(Value::Vector(out))
            }
            TypeDescriptor::Option(inner) => match json {
                JsonValue::Null => Ok(Value::Option(None)),
                // RPC renders options as a zero-or-one-element `vec` field.
                JsonValue::Object(obj) if obj.contains_key("fields") => {
                    let fields = json_object(&obj["fields"])?;
                    let vec = fields.get("vec").map_or(&JsonValue::Null, |v| v);
                    match json_array(vec)?.first() {
                        Some(item) => Ok(Value::Option(Some(Box::new(
                            inner.decode_from_typed_fields(item)?,
                        )))),
                        None => Ok(Value::Option(None)),
                    }
                }
                other => Ok(Value::Option(Some(Box::new(
                    inner.decode_from_typed_fields(other)?,
                )))),
            },
            TypeDescriptor::Struct(desc) => {
                let obj = json_object(json)?;
                let declared = json_str(obj.get("type").unwrap_or(&JsonValue::Null))?;
                let fields = json_object(obj.get("fields").unwrap_or(&JsonValue::Null))?;
                desc.decode_typed_parts(declared, fields)
            }
            TypeDescriptor::Phantom(name) => Err(ShapeError::PhantomValue {
                type_name: name.clone(),
            }
            .into()),
        }
    }

    /// Parses raw binary bytes for a whole record through the composed
    /// codec, then decodes the resulting untyped fields.
    pub fn decode_from_bytes(&self, bytes: &[u8]) -> DecodeResult<Value> {
        let raw = self.codec().parse(bytes)?;
        self.decode_from_fields(&raw)
    }

    /// Decodes a structured JSON-like field value, the inverse of
    /// [`to_json_field`](Self::to_json_field).
    ///
    /// Integers wider than 32 bits are expected as decimal strings but
    /// tolerated as numbers where they fit.
    pub fn decode_from_json(&self, json: &JsonValue) -> DecodeResult<Value> {
        match self {
            TypeDescriptor::Bool => Ok(Value::Bool(json_bool(json)?)),
            TypeDescriptor::U8 => Ok(Value::U8(narrow(json_u64(json)?, "u8")?)),
            TypeDescriptor::U16 => Ok(Value::U16(narrow(json_u64(json)?, "u16")?)),
            TypeDescriptor::U32 => Ok(Value::U32(narrow(json_u64(json)?, "u32")?)),
            TypeDescriptor::U64 => Ok(Value::U64(json_u64(json)?)),
            TypeDescriptor::U128 => Ok(Value::U128(json_u128(json)?)),
            TypeDescriptor::U256 => Ok(Value::U256(json_u256(json)?)),
            TypeDescriptor::Address => Ok(Value::Address(Address::from_hex(json_str(json)?)?)),
            TypeDescriptor::Utf8String | TypeDescriptor::AsciiString => {
                Ok(Value::String(json_str(json)?.to_owned()))
            }
            TypeDescriptor::Vector(elem) => {
                let items = json_array(json)?;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(elem.decode_from_json(item)?);
                }
                Ok(Value::Vector(out))
            }
            TypeDescriptor::Option(inner) => match json {
                JsonValue::Null => Ok(Value::Option(None)),
                other => Ok(Value::Option(Some(Box::new(inner.decode_from_json(other)?)))),
            },
            TypeDescriptor::Struct(desc) => {
                let fields = json_object(json)?;
                desc.decode_json_fields(fields)
            }
            TypeDescriptor::Phantom(name) => Err(ShapeError::PhantomValue {
                type_name: name.clone(),
            }
            .into()),
        }
    }

    /// Renders a canonical value into the structured JSON-like field
    /// representation.
    ///
    /// Addresses render in canonical `0x`-prefixed lowercase hex;
    /// integers wider than 32 bits render as decimal strings; options
    /// render as the present value or `null`.
    pub fn to_json_field(&self, value: &Value) -> Result<JsonValue, ShapeError> {
        match (self, value) {
            (TypeDescriptor::Bool, Value::Bool(b)) => Ok(json!(b)),
            (TypeDescriptor::U8, Value::U8(n)) => Ok(json!(n)),
            (TypeDescriptor::U16, Value::U16(n)) => Ok(json!(n)),
            (TypeDescriptor::U32, Value::U32(n)) => Ok(json!(n)),
            (TypeDescriptor::U64, Value::U64(n)) => Ok(json!(n.to_string())),
            (TypeDescriptor::U128, Value::U128(n)) => Ok(json!(n.to_string())),
            (TypeDescriptor::U256, Value::U256(n)) => Ok(json!(n.to_string())),
            (TypeDescriptor::Address, Value::Address(addr)) => {
                Ok(json!(addr.to_canonical_string()))
            }
            (
                TypeDescriptor::Utf8String | TypeDescriptor::AsciiString,
                Value::String(s),
            ) => Ok(json!(s)),
            (TypeDescriptor::Vector(elem), Value::Vector(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(elem.to_json_field(item)?);
                }
                Ok(JsonValue::Array(out))
            }
            (TypeDescriptor::Option(inner), Value::Option(opt)) => match opt {
                Some(item) => inner.to_json_field(item),
                None => Ok(JsonValue::Null),
            },
            (TypeDescriptor::Struct(desc), Value::Struct(sv)) => {
                let mut out = Map::with_capacity(desc.fields().len());
                for (name, field_desc) in desc.fields() {
                    match sv.field(name) {
                        Some(field_value) => {
                            out.insert(name.clone(), field_desc.to_json_field(field_value)?);
                        }
                        None => {
                            return Err(ShapeError::MissingField {
                                field: name.clone(),
                            })
                        }
                    }
                }
                Ok(JsonValue::Object(out))
            }
            (TypeDescriptor::Phantom(name), _) => Err(ShapeError::PhantomValue {
                type_name: name.clone(),
            }),
            (expected, value) => Err(ShapeError::WrongKind {
                expected: expected_kind(expected),
                actual: value.kind().to_owned(),
            }),
        }
    }
}

impl StructDescriptor {
    /// Decodes an untyped field map against this struct's declared
    /// layout, producing a fully-annotated [`StructValue`].
    pub fn decode_fields(&self, fields: &FieldMap) -> DecodeResult<Value> {
        let mut out = Vec::with_capacity(self.fields().len());
        for (name, field_desc) in self.fields() {
            match crate::value::raw_field(fields, name) {
                Some(raw) => out.push((name.clone(), field_desc.decode_from_fields(raw)?)),
                None => {
                    return Err(ShapeError::MissingField {
                        field: name.clone(),
                    }
                    .into())
                }
            }
        }
        Ok(Value::Struct(StructValue {
            type_name: self.full_type_name(),
            fields: out,
        }))
    }

    /// Decodes a fields-with-types record, verifying the declared type
    /// (base name and type arguments) before trusting any field value.
    pub fn decode_typed(&self, item: &FieldsWithTypes) -> DecodeResult<Value> {
        self.decode_typed_parts(&item.type_, &item.fields)
    }

    fn decode_typed_parts(
        &self,
        declared: &str,
        fields: &Map<String, JsonValue>,
    ) -> DecodeResult<Value> {
        if !typename::is_instance_of(declared, self.type_name()) {
            return Err(TypeMismatchError {
                expected: self.full_type_name(),
                declared: typename::canonicalize(declared),
            }
            .into());
        }
        assert_type_args_match(declared, self.type_args())?;
        let mut out = Vec::with_capacity(self.fields().len());
        for (name, field_desc) in self.fields() {
            match fields.get(name) {
                Some(value) => {
                    out.push((name.clone(), field_desc.decode_from_typed_fields(value)?))
                }
                None => {
                    return Err(ShapeError::MissingField {
                        field: name.clone(),
                    }
                    .into())
                }
            }
        }
        Ok(Value::Struct(StructValue {
            type_name: self.full_type_name(),
            fields: out,
        }))
    }

    /// Decodes the plain-object JSON field representation of this
    /// struct (no type discriminant at field level).
    pub fn decode_json_fields(&self, fields: &Map<String, JsonValue>) -> DecodeResult<Value> {
        let mut out = Vec::with_capacity(self.fields().len());
        for (name, field_desc) in self.fields() {
            match fields.get(name) {
                Some(value) => out.push((name.clone(), field_desc.decode_from_json(value)?)),
                None => {
                    return Err(ShapeError::MissingField {
                        field: name.clone(),
                    }
                    .into())
                }
            }
        }
        Ok(Value::Struct(StructValue {
            type_name: self.full_type_name(),
            fields: out,
        }))
    }
}

fn expected_kind(desc: &TypeDescriptor) -> &'static str {
    match desc {
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

pub(crate) fn json_kind(json: &JsonValue) -> String {
    match json {
        JsonValue::Null => "null".to_owned(),
        JsonValue::Bool(_) => "bool".to_owned(),
        JsonValue::Number(_) => "number".to_owned(),
        JsonValue::String(_) => "string".to_owned(),
        JsonValue::Array(_) => "array".to_owned(),
        JsonValue::Object(_) => "object".to_owned(),
    }
}

fn json_bool(json: &JsonValue) -> Result<bool, ShapeError> {
    match json {
        JsonValue::Bool(b) => Ok(*b),
        other => Err(ShapeError::WrongKind {
            expected: "bool",
            actual: json_kind(other),
        }),
    }
}

fn json_str(json: &JsonValue) -> Result<&str, ShapeError> {
    match json {
        JsonValue::String(s) => Ok(s),
        other => Err(ShapeError::WrongKind {
            expected: "string",
            actual: json_kind(other),
        }),
    }
}

fn json_array(json: &JsonValue) -> Result<&Vec<JsonValue>, ShapeError> {
    match json {
        JsonValue::Array(items) => Ok(items),
        other => Err(ShapeError::WrongKind {
            expected: "array",
            actual: json_kind(other),
        }),
    }
}

fn json_object(json: &JsonValue) -> Result<&Map<String, JsonValue>, ShapeError> {
    match json {
        JsonValue::Object(obj) => Ok(obj),
        other => Err(ShapeError::WrongKind {
            expected: "object",
            actual: json_kind(other),
        }),
    }
}

/// Interprets a JSON number or decimal string as a `u64`.
fn json_u64(json: &JsonValue) -> Result<u64, ShapeError> {
    match json {
        JsonValue::Number(n) => n.as_u64().ok_or_else(|| ShapeError::OutOfRange {
            type_name: "u64",
            value: n.to_string(),
        }),
        JsonValue::String(s) => s.parse::<u64>().map_err(|_| ShapeError::OutOfRange {
            type_name: "u64",
            value: s.clone(),
        }),
        other => Err(ShapeError::WrongKind {
            expected: "number or decimal string",
            actual: json_kind(other),
        }),
    }
}

fn json_u128(json: &JsonValue) -> Result<u128, ShapeError> {
    match json {
        JsonValue::Number(n) => n
            .as_u64()
            .map(u128::from)
            .ok_or_else(|| ShapeError::OutOfRange {
                type_name: "u128",
                value: n.to_string(),
            }),
        JsonValue::String(s) => s.parse::<u128>().map_err(|_| ShapeError::OutOfRange {
            type_name: "u128",
            value: s.clone(),
        }),
        other => Err(ShapeError::WrongKind {
            expected: "number or decimal string",
            actual: json_kind(other),
        }),
    }
}

fn json_u256(json: &JsonValue) -> Result<BigUint, ShapeError> {
    let parsed = match json {
        JsonValue::Number(n) => n.as_u64().map(BigUint::from).ok_or_else(|| {
            ShapeError::OutOfRange {
                type_name: "u256",
                value: n.to_string(),
            }
        })?,
        JsonValue::String(s) => BigUint::parse_bytes(s.as_bytes(), 10).ok_or_else(|| {
            ShapeError::OutOfRange {
                type_name: "u256",
                value: s.clone(),
            }
        })?,
        other => {
            return Err(ShapeError::WrongKind {
                expected: "number or decimal string",
                actual: json_kind(other),
            })
        }
    };
    if parsed.bits() > 256 {
        return Err(ShapeError::OutOfRange {
            type_name: "u256",
            value: parsed.to_string(),
        });
    }
    Ok(parsed)
}

/// Narrows a `u64` into a smaller declared width.
fn narrow<T: TryFrom<u64>>(value: u64, type_name: &'static str) -> Result<T, ShapeError> {
    T::try_from(value).map_err(|_| ShapeError::OutOfRange {
        type_name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::DecodeError;
    use crate::reified::phantom_named;

    fn id_descriptor() -> StructDescriptor {
        StructDescriptor::new(
            "0x2::object::ID",
            Vec::new(),
            vec![("bytes", TypeDescriptor::Address)],
        )
    }

    #[test]
    fn raw_address_bytes_coerce_to_canonical_form() {
        let desc = TypeDescriptor::Address;
        let value = desc
            .decode_from_fields(&RawValue::Bytes(vec![0x01; 32]))
            .unwrap();
        match value {
            Value::Address(addr) => assert_eq!(
                addr.to_canonical_string(),
                format!("0x{}", "01".repeat(32))
            ),
            other => panic!("expected address, got {:?}", other),
        }
    }

    #[test]
    fn typed_fields_reject_wrong_declared_type() {
        let desc = id_descriptor();
        let err = desc
            .decode_typed_parts(
                "0x2::object::UID",
                serde_json::json!({ "bytes": "0x2" }).as_object().unwrap(),
            )
            .unwrap_err();
        match err {
            DecodeError::TypeMismatch(inner) => {
                assert_eq!(inner.expected, "0x2::object::ID");
                assert_eq!(inner.declared, "0x2::object::UID");
            }
            other => panic!("expected type mismatch, got {:?}", other),
        }
    }

    #[test]
    fn typed_fields_accept_long_form_addresses_in_type() {
        let desc = id_descriptor();
        let long = format!("0x{}2::object::ID", "0".repeat(63));
        let value = desc
            .decode_typed_parts(&long, serde_json::json!({ "bytes": "0x2" }).as_object().unwrap())
            .unwrap();
        assert!(matches!(value, Value::Struct(_)));
    }

    #[test]
    fn typed_option_accepts_null_and_vec_shape() {
        let desc = TypeDescriptor::Option(Box::new(TypeDescriptor::U64));
        assert_eq!(
            desc.decode_from_typed_fields(&JsonValue::Null).unwrap(),
            Value::Option(None)
        );
        let present = serde_json::json!({
            "type": "0x1::option::Option<u64>",
            "fields": { "vec": ["42"] }
        });
        assert_eq!(
            desc.decode_from_typed_fields(&present).unwrap(),
            Value::Option(Some(Box::new(Value::U64(42))))
        );
        let absent = serde_json::json!({
            "type": "0x1::option::Option<u64>",
            "fields": { "vec": [] }
        });
        assert_eq!(
            desc.decode_from_typed_fields(&absent).unwrap(),
            Value::Option(None)
        );
    }

    #[test]
    fn wide_integers_roundtrip_as_strings() {
        let desc = TypeDescriptor::U128;
        let value = Value::U128(u128::MAX);
        let rendered = desc.to_json_field(&value).unwrap();
        assert_eq!(rendered, serde_json::json!(u128::MAX.to_string()));
        assert_eq!(desc.decode_from_json(&rendered).unwrap(), value);
    }

    #[test]
    fn narrow_widths_are_range_checked() {
        let err = TypeDescriptor::U8
            .decode_from_json(&serde_json::json!(300))
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Shape(ShapeError::OutOfRange { type_name: "u8", .. })
        ));
    }

    #[test]
    fn phantom_rejects_every_decode_path() {
        let desc = phantom_named("0x2::kiosk::Kiosk");
        assert!(desc.decode_from_fields(&RawValue::Bool(true)).is_err());
        assert!(desc.decode_from_typed_fields(&JsonValue::Bool(true)).is_err());
        assert!(desc.decode_from_json(&JsonValue::Bool(true)).is_err());
        assert!(desc.decode_from_bytes(&[]).is_err());
    }

    #[test]
    fn struct_json_roundtrip() {
        let desc = id_descriptor().into_descriptor();
        let decoded = desc
            .decode_from_json(&serde_json::json!({ "bytes": "0x2" }))
            .unwrap();
        let rendered = desc.to_json_field(&decoded).unwrap();
        assert_eq!(
            rendered,
            serde_json::json!({
                "bytes": format!("0x{}2", "0".repeat(63))
            })
        );
        assert_eq!(desc.decode_from_json(&rendered).unwrap(), decoded);
    }
}
