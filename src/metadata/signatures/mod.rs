//! Method and type signature parsing and encoding for .NET metadata.
//!
//! Signatures encode type information, method parameters, generic arguments and calling
//! conventions in the compact binary format of ECMA-335 II.23.2. Decoded signatures are built
//! from [`crate::metadata::typesystem::TypeReference`] values, so custom modifiers, by-ref
//! markers, pinned locals and vararg sentinels are all part of the parameter types.
//!
//! # Signature Types
//!
//! - **Method Signatures** - Parameter types, return types, and calling conventions
//! - **Field Signatures** - Field type information and modifiers
//! - **Property Signatures** - Property type and parameter information
//! - **LocalVar Signatures** - Local variable types within method bodies
//! - **TypeSpec Signatures** - Generic type instantiations and complex type references
//! - **MethodSpec Signatures** - Generic method instantiations
//!
//! # Examples
//!
//! ```rust
//! use cilmeta::metadata::signatures::{encode_local_var_signature, parse_local_var_signature};
//! use cilmeta::metadata::{token::Token, typesystem::{PrimitiveType, TypeReference}};
//!
//! let resolver = |token: Token, _: bool| -> cilmeta::Result<TypeReference> {
//!     Err(cilmeta::Error::TokenNotFound(token))
//! };
//!
//! let locals_data = &[0x07, 0x02, 0x08, 0x0E]; // 2 locals: int32, string
//! let locals_sig = parse_local_var_signature(locals_data, &resolver)?;
//! assert_eq!(locals_sig.locals[1], TypeReference::Primitive(PrimitiveType::String));
//!
//! let mut tokens = |reference: &TypeReference| -> cilmeta::Result<Token> {
//!     Err(cilmeta::Error::NotSupported(reference.full_name()))
//! };
//! assert_eq!(encode_local_var_signature(&locals_sig, &mut tokens)?, locals_data);
//! # Ok::<(), cilmeta::Error>(())
//! ```
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Section 23.2 - Blobs and Signatures

mod encoders;
mod parser;
mod types;

pub use encoders::*;
pub use parser::*;
pub use types::*;

use crate::{metadata::typesystem::TypeReference, Result};

/// Parse a `MethodSignature` from a byte slice
///
/// ## Arguments
/// * 'data'     - The input slice to parse
/// * 'resolver' - Resolves the type tokens of the signature
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_method_signature(data: &[u8], resolver: &dyn TypeResolver) -> Result<MethodSignature> {
    let mut parser = SignatureParser::new(data, resolver);
    parser.parse_method_signature()
}

/// Parse a `FieldSignature` from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_field_signature(data: &[u8], resolver: &dyn TypeResolver) -> Result<FieldSignature> {
    let mut parser = SignatureParser::new(data, resolver);
    parser.parse_field_signature()
}

/// Parse a `PropertySignature` from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_property_signature(
    data: &[u8],
    resolver: &dyn TypeResolver,
) -> Result<PropertySignature> {
    let mut parser = SignatureParser::new(data, resolver);
    parser.parse_property_signature()
}

/// Parse a `LocalVariablesSignature` from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_local_var_signature(
    data: &[u8],
    resolver: &dyn TypeResolver,
) -> Result<LocalVariablesSignature> {
    let mut parser = SignatureParser::new(data, resolver);
    parser.parse_local_var_signature()
}

/// Parse a `TypeSpec` blob from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_type_spec_signature(data: &[u8], resolver: &dyn TypeResolver) -> Result<TypeReference> {
    let mut parser = SignatureParser::new(data, resolver);
    parser.parse_type_spec_signature()
}

/// Parse a `MethodSpecSignature` from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_method_spec_signature(
    data: &[u8],
    resolver: &dyn TypeResolver,
) -> Result<MethodSpecSignature> {
    let mut parser = SignatureParser::new(data, resolver);
    parser.parse_method_spec_signature()
}
