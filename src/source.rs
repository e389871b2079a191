//! Record-fetching collaborator interface
//!
//! Fetching a record by identifier is the one operation that leaves
//! pure in-memory computation; it is delegated entirely to an external
//! collaborator behind the [`RecordSource`] trait. The core consumes
//! the collaborator's result (the declared type name plus either raw
//! bytes or typed fields) once it is available, and treats both
//! not-found and transport failures as decode-abort conditions. Any
//! retry policy lives in the collaborator, never here.
//!
//! The convenience functions [`fetch_struct`] and [`fetch_typed_struct`]
//! combine a fetch with registry-driven type resolution and the
//! appropriate decode path.

use crate::address::Address;
use crate::error::DecodeResult;
use crate::registry::StructRegistry;
use crate::value::{FieldsWithTypes, Value};

/// A record fetched in raw binary form: the declared type of its
/// contents plus the BCS bytes.
#[derive(Clone, Debug)]
pub struct RawRecord {
    /// Declared on-chain type of the record, possibly non-canonical.
    pub type_name: String,
    /// BCS encoding of the record's contents.
    pub bytes: Vec<u8>,
}

/// External source of records, addressed by 32-byte identifier.
///
/// Implementations typically wrap a network client; both the not-found
/// and transport failure cases surface as
/// [`NotFoundError`](crate::error::NotFoundError) or another
/// [`DecodeError`](crate::error::DecodeError) variant of the
/// implementation's choosing.
pub trait RecordSource {
    /// Fetches a record's declared type and raw BCS bytes.
    fn fetch_raw(&self, id: &Address) -> DecodeResult<RawRecord>;

    /// Fetches a record in fields-with-types form.
    fn fetch_typed(&self, id: &Address) -> DecodeResult<FieldsWithTypes>;
}

/// Fetches a record by identifier and decodes it through its declared
/// type, resolved against `registry`.
///
/// # Errors
///
/// Propagates the collaborator's failure unchanged, fails with
/// [`NotFoundError::Type`](crate::error::NotFoundError) if the declared
/// type has no registered binding, and otherwise reports whatever the
/// binary decode path reports.
pub fn fetch_struct<S: RecordSource>(
    source: &S,
    registry: &StructRegistry,
    id: &Address,
) -> DecodeResult<Value> {
    let record = source.fetch_raw(id)?;
    let descriptor = registry.resolve(&record.type_name)?;
    descriptor.decode_from_bytes(&record.bytes)
}

/// Fetches a record in fields-with-types form and decodes it through
/// its declared type, including the declared-name verification of the
/// typed decode path.
pub fn fetch_typed_struct<S: RecordSource>(
    source: &S,
    registry: &StructRegistry,
    id: &Address,
) -> DecodeResult<Value> {
    let item = source.fetch_typed(id)?;
    let descriptor = registry.resolve(&item.type_)?;
    descriptor.decode_from_typed_fields(&serde_json::json!({
        "type": item.type_,
        "fields": item.fields,
    }))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::{DecodeError, NotFoundError};
    use crate::registry::REGISTRY;
    use crate::value::Value;
    use std::collections::HashMap;

    /// In-memory source backed by a map, standing in for a client.
    struct MapSource {
        records: HashMap<Address, RawRecord>,
    }

    impl RecordSource for MapSource {
        fn fetch_raw(&self, id: &Address) -> DecodeResult<RawRecord> {
            self.records.get(id).cloned().ok_or_else(|| {
                NotFoundError::Record {
                    id: id.to_canonical_string(),
                }
                .into()
            })
        }

        fn fetch_typed(&self, id: &Address) -> DecodeResult<FieldsWithTypes> {
            Err(NotFoundError::Record {
                id: id.to_canonical_string(),
            }
            .into())
        }
    }

    #[test]
    fn fetch_resolves_declared_type_and_decodes() {
        let id = Address::new([0xaa; 32]);
        let mut bytes = vec![0u8; 32];
        bytes.extend_from_slice(&[0x01; 32]);
        let source = MapSource {
            records: HashMap::from([(
                id,
                RawRecord {
                    type_name: "0x2::borrow::Borrow".to_owned(),
                    bytes,
                },
            )]),
        };
        let value = fetch_struct(&source, &REGISTRY, &id).unwrap();
        match value {
            Value::Struct(sv) => assert_eq!(sv.type_name, "0x2::borrow::Borrow"),
            other => panic!("expected struct, got {:?}", other),
        }
    }

    #[test]
    fn missing_record_surfaces_not_found() {
        let source = MapSource {
            records: HashMap::new(),
        };
        let err = fetch_struct(&source, &REGISTRY, &Address::ZERO).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::NotFound(NotFoundError::Record { .. })
        ));
    }
}
