//! Bindings for the `0x2::kiosk_extension` module.
//!
//! `ExtensionKey` is the bundled example of a phantom type parameter:
//! its argument participates in the type name but never in the value
//! layout, so the binding records the argument as a runtime type string
//! and its entry points take the argument descriptor explicitly.

use serde_json::Value as JsonValue;

use crate::error::{ArityError, DecodeResult};
use crate::gen::bag::Bag;
use crate::registry::{StructClass, StructRegistry};
use crate::reified::{check_arity, phantom, StructDescriptor, TypeDescriptor};
use crate::typed::{
    annotate_json, check_json_discriminant, into_struct, MoveType, StructBinding,
};
use crate::typename;
use crate::value::{FieldMap, FieldsWithTypes, StructValue, Value};

pub const EXTENSION_TYPE_NAME: &str = "0x2::kiosk_extension::Extension";
pub const EXTENSION_KEY_TYPE_NAME: &str = "0x2::kiosk_extension::ExtensionKey";

/// Per-extension state installed in a kiosk: private storage plus the
/// permission bitmap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extension {
    pub storage: Bag,
    pub permissions: u128,
    pub is_enabled: bool,
}

fn extension_layout(args: &[TypeDescriptor]) -> DecodeResult<StructDescriptor> {
    check_arity(EXTENSION_TYPE_NAME, 0, args)?;
    Ok(Extension::struct_descriptor())
}

impl StructBinding for Extension {
    const TYPE_NAME: &'static str = EXTENSION_TYPE_NAME;

    fn struct_descriptor() -> StructDescriptor {
        StructDescriptor::new(
            EXTENSION_TYPE_NAME,
            Vec::new(),
            vec![
                ("storage", Bag::reified()),
                ("permissions", TypeDescriptor::U128),
                ("is_enabled", TypeDescriptor::Bool),
            ],
        )
    }
}

impl MoveType for Extension {
    fn reified() -> TypeDescriptor {
        Self::struct_descriptor().into_descriptor()
    }

    fn from_value(value: Value) -> DecodeResult<Self> {
        let mut sv = into_struct(value)?;
        Ok(Self {
            storage: Bag::from_value(sv.take_field("storage")?)?,
            permissions: u128::from_value(sv.take_field("permissions")?)?,
            is_enabled: bool::from_value(sv.take_field("is_enabled")?)?,
        })
    }

    fn to_value(&self) -> Value {
        Value::Struct(StructValue {
            type_name: EXTENSION_TYPE_NAME.to_owned(),
            fields: vec![
                ("storage".to_owned(), self.storage.to_value()),
                ("permissions".to_owned(), self.permissions.to_value()),
                ("is_enabled".to_owned(), self.is_enabled.to_value()),
            ],
        })
    }
}

/// Dynamic-field key under which an extension's state is installed.
///
/// The parameter is phantom: no value of it is ever decoded, and the
/// binding carries the concrete argument as its canonical type string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionKey {
    /// Canonical name of the phantom type argument.
    pub type_arg: String,
    pub dummy_field: bool,
}

fn extension_key_fields(arg: TypeDescriptor) -> StructDescriptor {
    StructDescriptor::new(
        EXTENSION_KEY_TYPE_NAME,
        vec![phantom(arg)],
        vec![("dummy_field", TypeDescriptor::Bool)],
    )
}

fn extension_key_layout(args: &[TypeDescriptor]) -> DecodeResult<StructDescriptor> {
    check_arity(EXTENSION_KEY_TYPE_NAME, 1, args)?;
    Ok(extension_key_fields(args[0].clone()))
}

impl ExtensionKey {
    /// Reified descriptor for the instantiation with phantom argument
    /// `t0`.
    #[must_use]
    pub fn reified(t0: &TypeDescriptor) -> TypeDescriptor {
        extension_key_fields(t0.clone()).into_descriptor()
    }

    /// True iff a type string names this struct type, under any
    /// argument.
    #[must_use]
    pub fn is_instance(type_name: &str) -> bool {
        typename::is_instance_of(type_name, EXTENSION_KEY_TYPE_NAME)
    }

    /// Converts a decoded struct value, recovering the phantom argument
    /// from the value's own type name.
    pub fn from_value(value: Value) -> DecodeResult<Self> {
        let mut sv = into_struct(value)?;
        let (_, mut args) = typename::split_type_args(&sv.type_name);
        if args.len() != 1 {
            return Err(ArityError {
                type_name: EXTENSION_KEY_TYPE_NAME.to_owned(),
                expected: 1,
                actual: args.len(),
            }
            .into());
        }
        Ok(Self {
            type_arg: args.remove(0),
            dummy_field: bool::from_value(sv.take_field("dummy_field")?)?,
        })
    }

    /// Converts back into the canonical value tree.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Struct(StructValue {
            type_name: typename::compose(
                EXTENSION_KEY_TYPE_NAME,
                &[self.type_arg.clone()],
            ),
            fields: vec![("dummy_field".to_owned(), Value::Bool(self.dummy_field))],
        })
    }

    fn descriptor(&self) -> StructDescriptor {
        extension_key_fields(TypeDescriptor::Phantom(self.type_arg.clone()))
    }

    pub fn from_fields(t0: &TypeDescriptor, fields: &FieldMap) -> DecodeResult<Self> {
        Self::from_value(extension_key_fields(t0.clone()).decode_fields(fields)?)
    }

    pub fn from_typed_fields(
        t0: &TypeDescriptor,
        item: &FieldsWithTypes,
    ) -> DecodeResult<Self> {
        Self::from_value(extension_key_fields(t0.clone()).decode_typed(item)?)
    }

    pub fn from_bcs(t0: &TypeDescriptor, bytes: &[u8]) -> DecodeResult<Self> {
        Self::from_value(Self::reified(t0).decode_from_bytes(bytes)?)
    }

    pub fn from_json_field(t0: &TypeDescriptor, json: &JsonValue) -> DecodeResult<Self> {
        Self::from_value(Self::reified(t0).decode_from_json(json)?)
    }

    pub fn from_json(t0: &TypeDescriptor, json: &JsonValue) -> DecodeResult<Self> {
        let desc = extension_key_fields(t0.clone());
        let fields = check_json_discriminant(json, &desc)?;
        Self::from_value(desc.decode_json_fields(fields)?)
    }

    pub fn to_json_field(&self) -> DecodeResult<JsonValue> {
        Ok(self
            .descriptor()
            .into_descriptor()
            .to_json_field(&self.to_value())?)
    }

    pub fn to_json(&self) -> DecodeResult<JsonValue> {
        let desc = self.descriptor();
        let rendered = desc.clone().into_descriptor().to_json_field(&self.to_value())?;
        annotate_json(&desc, rendered)
    }

    pub fn to_bcs(&self) -> DecodeResult<Vec<u8>> {
        Ok(self
            .descriptor()
            .into_descriptor()
            .codec()
            .serialize(&self.to_value())?)
    }
}

pub(crate) fn register(registry: &mut StructRegistry) {
    registry.register(StructClass::new(EXTENSION_TYPE_NAME, 0, extension_layout));
    registry.register(StructClass::new(
        EXTENSION_KEY_TYPE_NAME,
        1,
        extension_key_layout,
    ));
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::{DecodeError, ShapeError};
    use crate::reified::phantom_named;
    use crate::value::RawValue;

    const KIOSK: &str = "0x2::kiosk::Kiosk";

    #[test]
    fn phantom_argument_is_recorded_not_decoded() {
        let t0 = phantom_named(KIOSK);
        let fields = vec![("dummy_field".to_owned(), RawValue::Bool(true))];
        let key = ExtensionKey::from_fields(&t0, &fields).unwrap();
        assert!(key.dummy_field);
        assert_eq!(key.type_arg, KIOSK);
    }

    #[test]
    fn phantom_argument_joins_the_type_name() {
        let t0 = phantom_named(KIOSK);
        assert_eq!(
            ExtensionKey::reified(&t0).canonical_name(),
            "0x2::kiosk_extension::ExtensionKey<0x2::kiosk::Kiosk>"
        );
    }

    #[test]
    fn key_bcs_is_the_single_non_phantom_field() {
        let key = ExtensionKey {
            type_arg: KIOSK.to_owned(),
            dummy_field: true,
        };
        assert_eq!(key.to_bcs().unwrap(), vec![0x01]);
        let back = ExtensionKey::from_bcs(&phantom_named(KIOSK), &[0x01]).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn key_json_discriminant_carries_the_phantom_argument() {
        let key = ExtensionKey {
            type_arg: KIOSK.to_owned(),
            dummy_field: false,
        };
        let json = key.to_json().unwrap();
        assert_eq!(json["$typeName"], serde_json::json!(EXTENSION_KEY_TYPE_NAME));
        assert_eq!(json["$typeArgs"], serde_json::json!([KIOSK]));
        let back = ExtensionKey::from_json(&phantom_named(KIOSK), &json).unwrap();
        assert_eq!(back, key);

        let err =
            ExtensionKey::from_json(&phantom_named("0x2::kiosk::Other"), &json).unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch(_)));
    }

    #[test]
    fn value_decoding_of_the_phantom_slot_is_rejected() {
        let t0 = phantom_named(KIOSK);
        let err = t0.decode_from_fields(&RawValue::Bool(true)).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Shape(ShapeError::PhantomValue { .. })
        ));
    }

    #[test]
    fn extension_bcs_roundtrip() {
        use crate::address::Address;
        use crate::gen::object::{ID, UID};

        let ext = Extension {
            storage: Bag {
                id: UID {
                    id: ID {
                        bytes: Address::new([0x05; 32]),
                    },
                },
                size: 0,
            },
            permissions: 0b11,
            is_enabled: true,
        };
        let bytes = ext.to_bcs().unwrap();
        assert_eq!(bytes.len(), 32 + 8 + 16 + 1);
        assert_eq!(Extension::from_bcs(&bytes).unwrap(), ext);
    }
}
