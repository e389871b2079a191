//! Binding for the `0x1::type_name` module.

use crate::error::DecodeResult;
use crate::registry::{StructClass, StructRegistry};
use crate::reified::{check_arity, StructDescriptor, TypeDescriptor};
use crate::typed::{into_struct, Ascii, MoveType, StructBinding};
use crate::value::{StructValue, Value};

pub const TYPE_NAME_TYPE_NAME: &str = "0x1::type_name::TypeName";

/// A type name reflected into a value, as an ASCII string.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeName {
    pub name: Ascii,
}

fn type_name_layout(args: &[TypeDescriptor]) -> DecodeResult<StructDescriptor> {
    check_arity(TYPE_NAME_TYPE_NAME, 0, args)?;
    Ok(TypeName::struct_descriptor())
}

impl StructBinding for TypeName {
    const TYPE_NAME: &'static str = TYPE_NAME_TYPE_NAME;

    fn struct_descriptor() -> StructDescriptor {
        StructDescriptor::new(
            TYPE_NAME_TYPE_NAME,
            Vec::new(),
            vec![("name", TypeDescriptor::AsciiString)],
        )
    }
}

impl MoveType for TypeName {
    fn reified() -> TypeDescriptor {
        Self::struct_descriptor().into_descriptor()
    }

    fn from_value(value: Value) -> DecodeResult<Self> {
        let mut sv = into_struct(value)?;
        Ok(Self {
            name: Ascii::from_value(sv.take_field("name")?)?,
        })
    }

    fn to_value(&self) -> Value {
        Value::Struct(StructValue {
            type_name: TYPE_NAME_TYPE_NAME.to_owned(),
            fields: vec![("name".to_owned(), self.name.to_value())],
        })
    }
}

pub(crate) fn register(registry: &mut StructRegistry) {
    registry.register(StructClass::new(TYPE_NAME_TYPE_NAME, 0, type_name_layout));
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn name_is_length_prefixed_on_the_wire() {
        let tn = TypeName {
            name: Ascii::from("0x2::sui::SUI"),
        };
        let bytes = tn.to_bcs().unwrap();
        assert_eq!(bytes[0] as usize, "0x2::sui::SUI".len());
        assert_eq!(TypeName::from_bcs(&bytes).unwrap(), tn);
    }

    #[test]
    fn json_field_is_the_bare_string() {
        let tn = TypeName {
            name: Ascii::from("0x2::sui::SUI"),
        };
        assert_eq!(
            tn.to_json_field().unwrap(),
            serde_json::json!({ "name": "0x2::sui::SUI" })
        );
    }
}
