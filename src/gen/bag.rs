//! Binding for the `0x2::bag` module.

use crate::error::DecodeResult;
use crate::gen::object::UID;
use crate::registry::{StructClass, StructRegistry};
use crate::reified::{check_arity, StructDescriptor, TypeDescriptor};
use crate::typed::{into_struct, MoveType, StructBinding};
use crate::value::{StructValue, Value};

pub const BAG_TYPE_NAME: &str = "0x2::bag::Bag";

/// A heterogeneous key-value collection; only its identity and size are
/// visible in the record itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bag {
    pub id: UID,
    pub size: u64,
}

fn bag_layout(args: &[TypeDescriptor]) -> DecodeResult<StructDescriptor> {
    check_arity(BAG_TYPE_NAME, 0, args)?;
    Ok(Bag::struct_descriptor())
}

impl StructBinding for Bag {
    const TYPE_NAME: &'static str = BAG_TYPE_NAME;

    fn struct_descriptor() -> StructDescriptor {
        StructDescriptor::new(
            BAG_TYPE_NAME,
            Vec::new(),
            vec![("id", UID::reified()), ("size", TypeDescriptor::U64)],
        )
    }
}

impl MoveType for Bag {
    fn reified() -> TypeDescriptor {
        Self::struct_descriptor().into_descriptor()
    }

    fn from_value(value: Value) -> DecodeResult<Self> {
        let mut sv = into_struct(value)?;
        Ok(Self {
            id: UID::from_value(sv.take_field("id")?)?,
            size: u64::from_value(sv.take_field("size")?)?,
        })
    }

    fn to_value(&self) -> Value {
        Value::Struct(StructValue {
            type_name: BAG_TYPE_NAME.to_owned(),
            fields: vec![
                ("id".to_owned(), self.id.to_value()),
                ("size".to_owned(), self.size.to_value()),
            ],
        })
    }
}

pub(crate) fn register(registry: &mut StructRegistry) {
    registry.register(StructClass::new(BAG_TYPE_NAME, 0, bag_layout));
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::address::Address;
    use crate::gen::object::ID;

    fn sample() -> Bag {
        Bag {
            id: UID {
                id: ID {
                    bytes: Address::new([0x11; 32]),
                },
            },
            size: 3,
        }
    }

    #[test]
    fn bcs_layout_is_id_then_size() {
        let bytes = sample().to_bcs().unwrap();
        assert_eq!(bytes.len(), 32 + 8);
        assert_eq!(&bytes[..32], &[0x11; 32]);
        assert_eq!(&bytes[32..], &3u64.to_le_bytes());
        assert_eq!(Bag::from_bcs(&bytes).unwrap(), sample());
    }

    #[test]
    fn size_renders_as_decimal_string() {
        let json = sample().to_json_field().unwrap();
        assert_eq!(json["size"], serde_json::json!("3"));
        assert_eq!(Bag::from_json_field(&json).unwrap(), sample());
    }
}
