//! Shared fixtures for the unit tests.

mod module;

pub use module::*;
pub use types::*;

use crate::metadata::{
    members::MethodReference,
    signatures::MethodSignature,
    typesystem::{PrimitiveType, TypeReference},
};

// Instance constructor of `System.Attribute` taking `params`
pub fn attribute_constructor(params: Vec<TypeReference>) -> MethodReference {
    MethodReference::new(
        TestTypes::new().attribute(),
        ".ctor",
        MethodSignature::new(PrimitiveType::Void.into(), params).instance(),
    )
}
