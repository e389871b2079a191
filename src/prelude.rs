//! Assorted imports covering the common surface of the library,
//! for glob-import by generated bindings and their consumers.

pub use crate::address::Address;
pub use crate::error::{DecodeError, DecodeResult};
pub use crate::registry::{StructClass, StructRegistry, REGISTRY};
pub use crate::reified::{
    phantom, phantom_named, StructDescriptor, TypeDescriptor,
};
pub use crate::source::{fetch_struct, fetch_typed_struct, RawRecord, RecordSource};
pub use crate::typed::{Ascii, MoveType, StructBinding};
pub use crate::value::{FieldsWithTypes, RawValue, StructValue, Value};
