//! Intermediate Representation (IR) module.
//!
//! This module defines the language-agnostic data structures produced by
//! the extraction engine. The IR is consumed by the named-type resolver and
//! by the rendering view adapter to produce bindings for each target.

pub mod module;
pub mod rewrite;
pub mod value_type;

pub use module::{Field, Method, Module};
pub use value_type::{
    BasicType, CustomType, DictionaryKey, EnumMember, EnumSubType, EnumType, EnumValue, UnionType,
    ValueType,
};
