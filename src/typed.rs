//! Typed view over the dynamic value layer
//!
//! The [`MoveType`] trait connects concrete Rust types (primitives,
//! containers, and generated struct bindings) to the reified
//! descriptor machinery. An implementor supplies its descriptor and the
//! two conversions between itself and the canonical [`Value`] tree;
//! everything else (all four decode paths, the binary codec, the JSON
//! rendering) is derived from those three pieces by the generic engine.
//!
//! Generated bindings implement `MoveType` so that they can appear as
//! type arguments of other generic bindings, nesting to arbitrary
//! depth without any per-type special-casing in the engine.

use num_bigint::BigUint;
use serde_json::{json, Map, Value as JsonValue};

use crate::address::Address;
use crate::decode::json_kind;
use crate::error::{DecodeResult, ShapeError, TypeMismatchError};
use crate::reified::{assert_type_args_match, StructDescriptor, TypeDescriptor};
use crate::typename;
use crate::value::{FieldMap, FieldsWithTypes, StructValue, Value};

/// A Rust type with a reified Move type descriptor.
///
/// Implementations must be mutually consistent: `from_value(to_value(x))`
/// reproduces `x`, and `to_value` always yields a tree that the
/// descriptor's codec and JSON renderer accept.
pub trait MoveType: Sized {
    /// Reified descriptor for this type instantiation.
    fn reified() -> TypeDescriptor;

    /// Converts a canonical value tree into this type.
    ///
    /// # Errors
    ///
    /// Fails with [`ShapeError::WrongKind`] if the tree was decoded
    /// against a different descriptor.
    fn from_value(value: Value) -> DecodeResult<Self>;

    /// Converts this value into its canonical tree form.
    fn to_value(&self) -> Value;
}

/// Uniform operation surface of a generated struct binding with no
/// phantom type parameters.
///
/// Implementors supply only the base type name and the struct
/// descriptor for their instantiation; every decode and encode entry
/// point is provided on top of those, so bindings stay down to a
/// field-conversion pair plus two one-liners. Bindings whose type
/// parameters are phantom cannot name their argument statically and
/// instead expose inherent methods taking the argument descriptor at
/// runtime.
pub trait StructBinding: MoveType {
    /// Canonical base name of the bound struct type, without type
    /// arguments.
    const TYPE_NAME: &'static str;

    /// Struct descriptor for this instantiation.
    fn struct_descriptor() -> StructDescriptor;

    /// True iff a (possibly non-canonical) type string names this
    /// struct type, under any instantiation.
    fn is_instance(type_name: &str) -> bool {
        typename::is_instance_of(type_name, Self::TYPE_NAME)
    }

    /// Decodes from an untyped field map recovered by the binary codec.
    fn from_fields(fields: &FieldMap) -> DecodeResult<Self> {
        Self::from_value(Self::struct_descriptor().decode_fields(fields)?)
    }

    /// Decodes from a fields-with-types record, verifying the declared
    /// type name first.
    fn from_typed_fields(item: &FieldsWithTypes) -> DecodeResult<Self> {
        Self::from_value(Self::struct_descriptor().decode_typed(item)?)
    }

    /// Decodes from the raw binary encoding of a whole record.
    fn from_bcs(bytes: &[u8]) -> DecodeResult<Self> {
        Self::from_value(Self::reified().decode_from_bytes(bytes)?)
    }

    /// Decodes from the plain JSON field representation (no type
    /// discriminant).
    fn from_json_field(json: &JsonValue) -> DecodeResult<Self> {
        Self::from_value(Self::reified().decode_from_json(json)?)
    }

    /// Decodes from the discriminated JSON representation produced by
    /// [`to_json`](Self::to_json), verifying the `$typeName` key (and
    /// `$typeArgs` for generic instantiations) before any field.
    fn from_json(json: &JsonValue) -> DecodeResult<Self> {
        let desc = Self::struct_descriptor();
        let fields = check_json_discriminant(json, &desc)?;
        Self::from_value(desc.decode_json_fields(fields)?)
    }

    /// Renders the plain JSON field representation.
    fn to_json_field(&self) -> DecodeResult<JsonValue> {
        Ok(Self::reified().to_json_field(&self.to_value())?)
    }

    /// Renders the discriminated JSON representation: the field object
    /// with `$typeName` (and `$typeArgs` for generic instantiations)
    /// added.
    fn to_json(&self) -> DecodeResult<JsonValue> {
        let rendered = Self::reified().to_json_field(&self.to_value())?;
        annotate_json(&Self::struct_descriptor(), rendered)
    }

    /// Encodes into the raw binary representation.
    fn to_bcs(&self) -> DecodeResult<Vec<u8>> {
        Ok(Self::reified().codec().serialize(&self.to_value())?)
    }
}

/// Verifies the `$typeName`/`$typeArgs` discriminant of a discriminated
/// JSON object against a struct descriptor, returning the object for
/// field decoding.
pub(crate) fn check_json_discriminant<'a>(
    json: &'a JsonValue,
    desc: &StructDescriptor,
) -> DecodeResult<&'a Map<String, JsonValue>> {
    let obj = match json {
        JsonValue::Object(obj) => obj,
        other => {
            return Err(ShapeError::WrongKind {
                expected: "object",
                actual: json_kind(other),
            }
            .into())
        }
    };
    let declared = match obj.get("$typeName") {
        Some(JsonValue::String(s)) => s,
        Some(other) => {
            return Err(ShapeError::WrongKind {
                expected: "string",
                actual: json_kind(other),
            }
            .into())
        }
        None => {
            return Err(ShapeError::MissingField {
                field: "$typeName".to_owned(),
            }
            .into())
        }
    };
    if typename::canonicalize(declared) != desc.type_name() {
        return Err(TypeMismatchError {
            expected: desc.full_type_name(),
            declared: typename::canonicalize(declared),
        }
        .into());
    }
    if !desc.type_args().is_empty() {
        let args = match obj.get("$typeArgs") {
            Some(JsonValue::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        JsonValue::String(s) => out.push(s.clone()),
                        other => {
                            return Err(ShapeError::WrongKind {
                                expected: "string",
                                actual: json_kind(other),
                            }
                            .into())
                        }
                    }
                }
                out
            }
            Some(other) => {
                return Err(ShapeError::WrongKind {
                    expected: "array",
                    actual: json_kind(other),
                }
                .into())
            }
            None => {
                return Err(ShapeError::MissingField {
                    field: "$typeArgs".to_owned(),
                }
                .into())
            }
        };
        let composed = typename::compose(desc.type_name(), &args);
        assert_type_args_match(&composed, desc.type_args())?;
    }
    Ok(obj)
}

/// Adds the `$typeName`/`$typeArgs` discriminant keys to a rendered
/// field object.
pub(crate) fn annotate_json(
    desc: &StructDescriptor,
    rendered: JsonValue,
) -> DecodeResult<JsonValue> {
    let mut fields = match rendered {
        JsonValue::Object(obj) => obj,
        other => {
            return Err(ShapeError::WrongKind {
                expected: "object",
                actual: json_kind(&other),
            }
            .into())
        }
    };
    let mut out = Map::with_capacity(fields.len() + 2);
    out.insert("$typeName".to_owned(), json!(desc.type_name()));
    if !desc.type_args().is_empty() {
        let args: Vec<String> = desc
            .type_args()
            .iter()
            .map(TypeDescriptor::canonical_name)
            .collect();
        out.insert("$typeArgs".to_owned(), json!(args));
    }
    out.append(&mut fields);
    Ok(JsonValue::Object(out))
}

/// Unwraps a struct-kinded value, for binding field conversions.
pub(crate) fn into_struct(value: Value) -> DecodeResult<StructValue> {
    match value {
        Value::Struct(sv) => Ok(sv),
        other => wrong_kind("struct", &other),
    }
}

fn wrong_kind<T>(expected: &'static str, actual: &Value) -> DecodeResult<T> {
    Err(ShapeError::WrongKind {
        expected,
        actual: actual.kind().to_owned(),
    }
    .into())
}

macro_rules! impl_move_primitive {
    ($rust:ty, $variant:ident, $descriptor:ident, $kind:literal) => {
        impl MoveType for $rust {
            fn reified() -> TypeDescriptor {
                TypeDescriptor::$descriptor
            }

            fn from_value(value: Value) -> DecodeResult<Self> {
                match value {
                    Value::$variant(inner) => Ok(inner),
                    other => wrong_kind($kind, &other),
                }
            }

            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }
        }
    };
}

impl_move_primitive!(bool, Bool, Bool, "bool");
impl_move_primitive!(u8, U8, U8, "u8");
impl_move_primitive!(u16, U16, U16, "u16");
impl_move_primitive!(u32, U32, U32, "u32");
impl_move_primitive!(u64, U64, U64, "u64");
impl_move_primitive!(u128, U128, U128, "u128");
impl_move_primitive!(BigUint, U256, U256, "u256");
impl_move_primitive!(Address, Address, Address, "address");
impl_move_primitive!(String, String, Utf8String, "string");

/// Newtype marking a string whose on-chain type is `0x1::ascii::String`
/// rather than the UTF-8 `0x1::string::String`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Ascii(pub String);

impl MoveType for Ascii {
    fn reified() -> TypeDescriptor {
        TypeDescriptor::AsciiString
    }

    fn from_value(value: Value) -> DecodeResult<Self> {
        match value {
            Value::String(s) => Ok(Self(s)),
            other => wrong_kind("string", &other),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.0.clone())
    }
}

impl From<&str> for Ascii {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl<T: MoveType> MoveType for Vec<T> {
    fn reified() -> TypeDescriptor {
        TypeDescriptor::Vector(Box::new(T::reified()))
    }

    fn from_value(value: Value) -> DecodeResult<Self> {
        match value {
            Value::Vector(items) => items.into_iter().map(T::from_value).collect(),
            other => wrong_kind("vector", &other),
        }
    }

    fn to_value(&self) -> Value {
        Value::Vector(self.iter().map(MoveType::to_value).collect())
    }
}

impl<T: MoveType> MoveType for Option<T> {
    fn reified() -> TypeDescriptor {
        TypeDescriptor::Option(Box::new(T::reified()))
    }

    fn from_value(value: Value) -> DecodeResult<Self> {
        match value {
            Value::Option(Some(item)) => Ok(Some(T::from_value(*item)?)),
            Value::Option(None) => Ok(None),
            other => wrong_kind("option", &other),
        }
    }

    fn to_value(&self) -> Value {
        Value::Option(self.as_ref().map(|item| Box::new(item.to_value())))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn container_descriptors_compose() {
        assert_eq!(
            <Vec<Option<u8>> as MoveType>::reified().canonical_name(),
            "vector<0x1::option::Option<u8>>"
        );
    }

    #[test]
    fn value_roundtrip_through_containers() {
        let original: Vec<Option<u64>> = vec![Some(7), None, Some(u64::MAX)];
        let tree = original.to_value();
        assert_eq!(<Vec<Option<u64>>>::from_value(tree).unwrap(), original);
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        assert!(u8::from_value(Value::Bool(true)).is_err());
    }
}
