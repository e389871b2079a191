//! Bindings for the `0x2::borrow` module.

use crate::address::Address;
use crate::error::DecodeResult;
use crate::gen::object::ID;
use crate::registry::{StructClass, StructRegistry};
use crate::reified::{check_arity, StructDescriptor, TypeDescriptor};
use crate::typed::{into_struct, MoveType, StructBinding};
use crate::value::{StructValue, Value};

pub const BORROW_TYPE_NAME: &str = "0x2::borrow::Borrow";
pub const REFERENT_TYPE_NAME: &str = "0x2::borrow::Referent";

/// The hot-potato receipt issued when a value is borrowed out of a
/// [`Referent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Borrow {
    /// Wire name `ref`.
    pub ref_: Address,
    pub obj: ID,
}

fn borrow_layout(args: &[TypeDescriptor]) -> DecodeResult<StructDescriptor> {
    check_arity(BORROW_TYPE_NAME, 0, args)?;
    Ok(Borrow::struct_descriptor())
}

impl StructBinding for Borrow {
    const TYPE_NAME: &'static str = BORROW_TYPE_NAME;

    fn struct_descriptor() -> StructDescriptor {
        StructDescriptor::new(
            BORROW_TYPE_NAME,
            Vec::new(),
            vec![("ref", TypeDescriptor::Address), ("obj", ID::reified())],
        )
    }
}

impl MoveType for Borrow {
    fn reified() -> TypeDescriptor {
        Self::struct_descriptor().into_descriptor()
    }

    fn from_value(value: Value) -> DecodeResult<Self> {
        let mut sv = into_struct(value)?;
        Ok(Self {
            ref_: Address::from_value(sv.take_field("ref")?)?,
            obj: ID::from_value(sv.take_field("obj")?)?,
        })
    }

    fn to_value(&self) -> Value {
        Value::Struct(StructValue {
            type_name: BORROW_TYPE_NAME.to_owned(),
            fields: vec![
                ("ref".to_owned(), self.ref_.to_value()),
                ("obj".to_owned(), self.obj.to_value()),
            ],
        })
    }
}

/// A value slot that lends its contents out against a [`Borrow`]
/// receipt; `value` is absent while the loan is outstanding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Referent<T> {
    pub id: Address,
    pub value: Option<T>,
}

fn referent_fields(arg: TypeDescriptor) -> StructDescriptor {
    StructDescriptor::new(
        REFERENT_TYPE_NAME,
        vec![arg.clone()],
        vec![
            ("id", TypeDescriptor::Address),
            ("value", TypeDescriptor::Option(Box::new(arg))),
        ],
    )
}

fn referent_layout(args: &[TypeDescriptor]) -> DecodeResult<StructDescriptor> {
    check_arity(REFERENT_TYPE_NAME, 1, args)?;
    Ok(referent_fields(args[0].clone()))
}

impl<T: MoveType> StructBinding for Referent<T> {
    const TYPE_NAME: &'static str = REFERENT_TYPE_NAME;

    fn struct_descriptor() -> StructDescriptor {
        referent_fields(T::reified())
    }
}

impl<T: MoveType> MoveType for Referent<T> {
    fn reified() -> TypeDescriptor {
        Self::struct_descriptor().into_descriptor()
    }

    fn from_value(value: Value) -> DecodeResult<Self> {
        let mut sv = into_struct(value)?;
        Ok(Self {
            id: Address::from_value(sv.take_field("id")?)?,
            value: <Option<T>>::from_value(sv.take_field("value")?)?,
        })
    }

    fn to_value(&self) -> Value {
        Value::Struct(StructValue {
            type_name: Self::struct_descriptor().full_type_name(),
            fields: vec![
                ("id".to_owned(), self.id.to_value()),
                ("value".to_owned(), self.value.to_value()),
            ],
        })
    }
}

pub(crate) fn register(registry: &mut StructRegistry) {
    registry.register(StructClass::new(BORROW_TYPE_NAME, 0, borrow_layout));
    registry.register(StructClass::new(REFERENT_TYPE_NAME, 1, referent_layout));
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::{DecodeError, ShapeError};

    #[test]
    fn borrow_decodes_two_concatenated_addresses() {
        let mut bytes = vec![0u8; 32];
        bytes.extend_from_slice(&[0x01; 32]);
        let borrow = Borrow::from_bcs(&bytes).unwrap();
        assert_eq!(borrow.ref_, Address::ZERO);
        assert_eq!(borrow.obj.bytes, Address::new([0x01; 32]));
        assert_eq!(
            borrow.ref_.to_canonical_string(),
            format!("0x{}", "00".repeat(32))
        );
        assert_eq!(borrow.to_bcs().unwrap(), bytes);
    }

    #[test]
    fn borrow_rejects_truncated_input() {
        let err = Borrow::from_bcs(&[0u8; 63]).unwrap_err();
        assert!(matches!(err, DecodeError::Codec(_)));
    }

    #[test]
    fn referent_option_presence_drives_layout() {
        // Present: address, tag 0x01, then the u64 payload.
        let mut present = vec![0xab; 32];
        present.push(0x01);
        present.extend_from_slice(&42u64.to_le_bytes());
        let referent = Referent::<u64>::from_bcs(&present).unwrap();
        assert_eq!(referent.value, Some(42));
        assert_eq!(referent.to_bcs().unwrap(), present);

        // Absent: address, then tag 0x00 and nothing else.
        let mut absent = vec![0xab; 32];
        absent.push(0x00);
        let referent = Referent::<u64>::from_bcs(&absent).unwrap();
        assert_eq!(referent.value, None);
        assert_eq!(referent.to_bcs().unwrap(), absent);
    }

    #[test]
    fn referent_trailing_payload_after_absent_option_is_rejected() {
        let mut bytes = vec![0xab; 32];
        bytes.push(0x00);
        bytes.extend_from_slice(&42u64.to_le_bytes());
        let err = Referent::<u64>::from_bcs(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::Codec(_)));
    }

    #[test]
    fn referent_full_type_name_carries_its_argument() {
        assert_eq!(
            Referent::<u64>::struct_descriptor().full_type_name(),
            "0x2::borrow::Referent<u64>"
        );
        assert_eq!(
            Referent::<Borrow>::struct_descriptor().full_type_name(),
            "0x2::borrow::Referent<0x2::borrow::Borrow>"
        );
    }

    #[test]
    fn referent_json_discriminant_includes_type_args() {
        let referent = Referent::<u64> {
            id: Address::ZERO,
            value: Some(7),
        };
        let json = referent.to_json().unwrap();
        assert_eq!(json["$typeName"], serde_json::json!(REFERENT_TYPE_NAME));
        assert_eq!(json["$typeArgs"], serde_json::json!(["u64"]));
        assert_eq!(json["value"], serde_json::json!("7"));
        assert_eq!(Referent::<u64>::from_json(&json).unwrap(), referent);

        // The same document is not a Referent<u8>.
        let err = Referent::<u8>::from_json(&json).unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch(_)));
    }

    #[test]
    fn from_json_requires_the_discriminant() {
        let err = Referent::<u64>::from_json(&serde_json::json!({
            "id": "0x0",
            "value": null
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Shape(ShapeError::MissingField { .. })
        ));
    }

    #[test]
    fn typed_fields_verify_declared_name() {
        let item = serde_json::from_value(serde_json::json!({
            "type": "0x2::borrow::Borrow",
            "fields": {
                "ref": "0x2",
                "obj": { "type": "0x2::object::ID", "fields": { "bytes": "0x3" } }
            }
        }))
        .unwrap();
        let borrow = Borrow::from_typed_fields(&item).unwrap();
        assert_eq!(borrow.ref_, Address::from_hex("0x2").unwrap());
        assert_eq!(borrow.obj.bytes, Address::from_hex("0x3").unwrap());

        let wrong = serde_json::from_value(serde_json::json!({
            "type": "0x2::borrow::BorrowExtra",
            "fields": {}
        }))
        .unwrap();
        let err = Borrow::from_typed_fields(&wrong).unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch(_)));
    }
}
