//! Bindings for the `0x2::object` module.

use crate::address::Address;
use crate::error::DecodeResult;
use crate::registry::{StructClass, StructRegistry};
use crate::reified::{check_arity, StructDescriptor, TypeDescriptor};
use crate::typed::{into_struct, MoveType, StructBinding};
use crate::value::{StructValue, Value};

pub const ID_TYPE_NAME: &str = "0x2::object::ID";
pub const UID_TYPE_NAME: &str = "0x2::object::UID";

/// An object identifier: a wrapped 32-byte address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ID {
    pub bytes: Address,
}

fn id_layout(args: &[TypeDescriptor]) -> DecodeResult<StructDescriptor> {
    check_arity(ID_TYPE_NAME, 0, args)?;
    Ok(ID::struct_descriptor())
}

impl StructBinding for ID {
    const TYPE_NAME: &'static str = ID_TYPE_NAME;

    fn struct_descriptor() -> StructDescriptor {
        StructDescriptor::new(
            ID_TYPE_NAME,
            Vec::new(),
            vec![("bytes", TypeDescriptor::Address)],
        )
    }
}

impl MoveType for ID {
    fn reified() -> TypeDescriptor {
        Self::struct_descriptor().into_descriptor()
    }

    fn from_value(value: Value) -> DecodeResult<Self> {
        let mut sv = into_struct(value)?;
        Ok(Self {
            bytes: Address::from_value(sv.take_field("bytes")?)?,
        })
    }

    fn to_value(&self) -> Value {
        Value::Struct(StructValue {
            type_name: ID_TYPE_NAME.to_owned(),
            fields: vec![("bytes".to_owned(), self.bytes.to_value())],
        })
    }
}

/// The unique identifier field embedded in every owned object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UID {
    pub id: ID,
}

fn uid_layout(args: &[TypeDescriptor]) -> DecodeResult<StructDescriptor> {
    check_arity(UID_TYPE_NAME, 0, args)?;
    Ok(UID::struct_descriptor())
}

impl StructBinding for UID {
    const TYPE_NAME: &'static str = UID_TYPE_NAME;

    fn struct_descriptor() -> StructDescriptor {
        StructDescriptor::new(
            UID_TYPE_NAME,
            Vec::new(),
            vec![("id", ID::reified())],
        )
    }
}

impl MoveType for UID {
    fn reified() -> TypeDescriptor {
        Self::struct_descriptor().into_descriptor()
    }

    fn from_value(value: Value) -> DecodeResult<Self> {
        let mut sv = into_struct(value)?;
        Ok(Self {
            id: ID::from_value(sv.take_field("id")?)?,
        })
    }

    fn to_value(&self) -> Value {
        Value::Struct(StructValue {
            type_name: UID_TYPE_NAME.to_owned(),
            fields: vec![("id".to_owned(), self.id.to_value())],
        })
    }
}

pub(crate) fn register(registry: &mut StructRegistry) {
    registry.register(StructClass::new(ID_TYPE_NAME, 0, id_layout));
    registry.register(StructClass::new(UID_TYPE_NAME, 0, uid_layout));
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn id_bcs_roundtrip() {
        let id = ID {
            bytes: Address::new([0x42; 32]),
        };
        let bytes = id.to_bcs().unwrap();
        assert_eq!(bytes, vec![0x42; 32]);
        assert_eq!(ID::from_bcs(&bytes).unwrap(), id);
    }

    #[test]
    fn uid_nests_through_id() {
        let uid = UID::from_bcs(&[0x07; 32]).unwrap();
        assert_eq!(uid.id.bytes, Address::new([0x07; 32]));
        let json = uid.to_json().unwrap();
        assert_eq!(json["$typeName"], serde_json::json!(UID_TYPE_NAME));
        assert_eq!(
            json["id"]["bytes"],
            serde_json::json!(format!("0x{}", "07".repeat(32)))
        );
    }

    #[test]
    fn is_instance_matches_base_name_only() {
        assert!(ID::is_instance("0x2::object::ID"));
        assert!(ID::is_instance(&format!("0x{}2::object::ID", "0".repeat(63))));
        assert!(!ID::is_instance("0x2::object::UID"));
    }
}
