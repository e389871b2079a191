//! Bundled generated struct bindings
//!
//! One module per source module, one Rust struct per bound struct type.
//! Each binding contributes its descriptor factory, the uniform decode
//! and encode surface (via [`StructBinding`](crate::typed::StructBinding)
//! or, for phantom-parameterized types, equivalent inherent methods),
//! and a registry entry keyed by its canonical base name.
//!
//! The shapes here are hand-maintained but deliberately mechanical; a
//! binding generator pointed at the source modules would emit the same
//! code.

use crate::registry::StructRegistry;

pub mod bag;
pub mod borrow;
pub mod kiosk_extension;
pub mod object;
pub mod type_name;

/// Registers every bundled binding into a registry.
pub(crate) fn register_all(registry: &mut StructRegistry) {
    object::register(registry);
    bag::register(registry);
    borrow::register(registry);
    kiosk_extension::register(registry);
    type_name::register(registry);
}
