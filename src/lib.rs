//! Model for representing and decoding on-chain Move struct values
//!
//! # Overview
//!
//! This library serves as the runtime backbone for machine-generated
//! Rust modules that bind individual on-chain struct types. Such
//! modules, referred to as 'bindings', would normally require a great
//! deal of boilerplate: per-type binary parsing, per-type JSON
//! handling, and complex logic for verifying declared type names
//! against the expected instantiation.
//!
//! Rather than forcing a binding generator to emit bespoke decoding
//! logic for relatively ubiquitous patterns, `sedum` offers a
//! centralized implementation driven by reified type descriptors. A
//! [`TypeDescriptor`](reified::TypeDescriptor) is a first-class value
//! describing one type instantiation; from it the library derives the
//! composed binary codec, all four decode paths, and the JSON
//! rendering, so that a generated binding reduces to a descriptor
//! factory plus a pair of field conversions.
//!
//! The high-level traits [`MoveType`](typed::MoveType) and
//! [`StructBinding`](typed::StructBinding) are the keystones of the
//! library. They respectively connect concrete Rust types to their
//! descriptors, and provide the uniform decode/encode surface that
//! every non-phantom generated binding exposes.
//!
//! # Background
//!
//! On-chain struct values reach a client in three representations:
//! the canonical BCS binary encoding (little-endian fixed-width
//! integers, ULEB128 length prefixes, declared-order field
//! concatenation with no padding or tags), a fields-with-declared-types
//! form in which a node echoes each struct's type string alongside its
//! data, and a plain JSON form in which integers wider than 32 bits
//! travel as decimal strings. All three must agree with the expected
//! type instantiation, including type arguments, and type names must be
//! compared under canonicalization since the same type can be spelled
//! with either full-width or zero-compressed hex addresses.
//!
//! Generic struct types add one further wrinkle: a type parameter may
//! be phantom, participating in the type name but never in the value
//! layout. The descriptor machinery models these as name-only
//! descriptors that compose into type strings but reject every
//! value-level operation.

pub mod address;
pub mod codec;
pub mod decode;
pub mod error;
pub mod gen;
pub mod prelude;
pub mod registry;
pub mod reified;
pub mod source;
pub mod typed;
pub mod typename;
pub mod value;
