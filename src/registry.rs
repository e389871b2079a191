//! Read-only registry of known struct bindings
//!
//! Each generated binding contributes one [`StructClass`]: its canonical
//! base name, its declared type-parameter count, and a layout
//! constructor that instantiates a [`StructDescriptor`] from concrete
//! type-argument descriptors. The registry maps canonical names to
//! classes, enabling decoding driven purely by an on-chain type string,
//! the situation of the fetch-by-identifier path, where the concrete
//! instantiation is not known until the record's declared type arrives.
//!
//! The default registry, [`struct@REGISTRY`], is populated once with the
//! bundled bindings and is immutable thereafter; programs with
//! additional generated bindings can build their own
//! [`StructRegistry`] and register them alongside.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::error::{DecodeError, DecodeResult, NotFoundError};
use crate::reified::{
    StructDescriptor, TypeDescriptor, ASCII_STRING_TYPE_NAME, OPTION_TYPE_NAME,
    UTF8_STRING_TYPE_NAME,
};
use crate::typename;

/// Constructor producing a struct's field layout from its concrete
/// type-argument descriptors.
///
/// Implementations perform their own eager arity check and therefore
/// fail with [`ArityError`](crate::error::ArityError) before any field
/// layout is built.
pub type LayoutFn = fn(&[TypeDescriptor]) -> DecodeResult<StructDescriptor>;

/// Registry record for one bindable struct type: canonical base name,
/// declared arity, and the layout constructor.
#[derive(Clone, Copy, Debug)]
pub struct StructClass {
    type_name: &'static str,
    type_params: usize,
    layout: LayoutFn,
}

impl StructClass {
    /// Builds a registry record. `type_name` must already be canonical.
    #[must_use]
    pub const fn new(type_name: &'static str, type_params: usize, layout: LayoutFn) -> Self {
        Self {
            type_name,
            type_params,
            layout,
        }
    }

    /// Canonical base name of the described type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Declared number of type parameters.
    #[must_use]
    pub fn type_params(&self) -> usize {
        self.type_params
    }

    /// Instantiates the struct descriptor for the given type arguments.
    pub fn instantiate(&self, args: &[TypeDescriptor]) -> DecodeResult<StructDescriptor> {
        (self.layout)(args)
    }
}

/// Mapping from canonical struct name to binding class.
#[derive(Clone, Debug, Default)]
pub struct StructRegistry {
    classes: HashMap<String, StructClass>,
}

impl StructRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a binding class under its canonical name.
    ///
    /// A later registration under the same name replaces the earlier
    /// one.
    pub fn register(&mut self, class: StructClass) {
        self.classes.insert(class.type_name().to_owned(), class);
    }

    /// Looks up the class registered under a (possibly non-canonical)
    /// base type name.
    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&StructClass> {
        self.classes.get(&typename::canonicalize(type_name))
    }

    /// Resolves a full canonical type string into a reified descriptor,
    /// recursively resolving primitive, string, vector, option, and
    /// registered struct names.
    ///
    /// Type arguments naming unregistered struct types are kept as
    /// name-only phantom descriptors: phantom slots need nothing more,
    /// and a value slot instantiated with one fails at decode time.
    ///
    /// # Errors
    ///
    /// Fails with [`NotFoundError::Type`] for base struct names with no
    /// registered binding, and propagates arity failures from the
    /// instantiated class.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sedum::registry::REGISTRY;
    /// let desc = REGISTRY.resolve("0x2::borrow::Referent<u64>").unwrap();
    /// assert_eq!(desc.canonical_name(), "0x2::borrow::Referent<u64>");
    /// ```
    pub fn resolve(&self, type_name: &str) -> DecodeResult<TypeDescriptor> {
        let canonical = typename::canonicalize(type_name);
        match canonical.as_str() {
            "bool" => return Ok(TypeDescriptor::Bool),
            "u8" => return Ok(TypeDescriptor::U8),
            "u16" => return Ok(TypeDescriptor::U16),
            "u32" => return Ok(TypeDescriptor::U32),
            "u64" => return Ok(TypeDescriptor::U64),
            "u128" => return Ok(TypeDescriptor::U128),
            "u256" => return Ok(TypeDescriptor::U256),
            "address" => return Ok(TypeDescriptor::Address),
            UTF8_STRING_TYPE_NAME => return Ok(TypeDescriptor::Utf8String),
            ASCII_STRING_TYPE_NAME => return Ok(TypeDescriptor::AsciiString),
            _ => {}
        }
        let (base, args) = typename::split_type_args(&canonical);
        let mut resolved = Vec::with_capacity(args.len());
        for arg in &args {
            match self.resolve(arg) {
                Ok(desc) => resolved.push(desc),
                Err(DecodeError::NotFound(_)) => {
                    resolved.push(TypeDescriptor::Phantom(arg.clone()))
                }
                Err(err) => return Err(err),
            }
        }
        match base {
            "vector" if resolved.len() == 1 => {
                Ok(TypeDescriptor::Vector(Box::new(resolved.remove(0))))
            }
            OPTION_TYPE_NAME if resolved.len() == 1 => {
                Ok(TypeDescriptor::Option(Box::new(resolved.remove(0))))
            }
            _ => match self.classes.get(base) {
                Some(class) => Ok(class.instantiate(&resolved)?.into_descriptor()),
                None => Err(NotFoundError::Type {
                    type_name: canonical.clone(),
                }
                .into()),
            },
        }
    }
}

lazy_static! {
    /// Default registry holding the bundled generated bindings.
    pub static ref REGISTRY: StructRegistry = {
        let mut registry = StructRegistry::new();
        crate::gen::register_all(&mut registry);
        registry
    };
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::DecodeError;

    #[test]
    fn resolve_primitives_and_containers() {
        let desc = REGISTRY.resolve("vector<0x1::option::Option<u8>>").unwrap();
        assert_eq!(desc.canonical_name(), "vector<0x1::option::Option<u8>>");
    }

    #[test]
    fn resolve_registered_struct_with_long_address() {
        let long = format!("0x{}2::borrow::Borrow", "0".repeat(63));
        let desc = REGISTRY.resolve(&long).unwrap();
        assert_eq!(desc.canonical_name(), "0x2::borrow::Borrow");
    }

    #[test]
    fn unknown_struct_is_not_found() {
        let err = REGISTRY.resolve("0x99::nowhere::Missing").unwrap_err();
        assert!(matches!(err, DecodeError::NotFound(_)));
    }

    #[test]
    fn unregistered_argument_stays_name_only() {
        let desc = REGISTRY
            .resolve("0x2::kiosk_extension::ExtensionKey<0x2::kiosk::Kiosk>")
            .unwrap();
        assert_eq!(
            desc.canonical_name(),
            "0x2::kiosk_extension::ExtensionKey<0x2::kiosk::Kiosk>"
        );
    }

    #[test]
    fn wrong_arity_fails_at_resolution() {
        let err = REGISTRY.resolve("0x2::borrow::Referent").unwrap_err();
        assert!(matches!(err, DecodeError::Arity(_)));
        let err = REGISTRY.resolve("0x2::borrow::Referent<u64,u8>").unwrap_err();
        assert!(matches!(err, DecodeError::Arity(_)));
    }
}
