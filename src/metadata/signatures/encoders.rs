//! Signature encoders for .NET metadata blob encoding.
//!
//! The inverse of [`crate::metadata::signatures::SignatureParser`]: each function produces the
//! ECMA-335 binary form of one signature kind. Named types are written as
//! `TypeDefOrRefOrSpecEncoded` tokens obtained from a [`TypeTokenProvider`], which lets the
//! metadata writer add `TypeRef` rows on demand.
//!
//! # Available Encoders
//!
//! - [`encode_method_signature`] - Method signatures for MethodDef, MemberRef and StandAloneSig
//! - [`encode_field_signature`] - Field signatures for Field and MemberRef tables
//! - [`encode_property_signature`] - Property signatures for Property table
//! - [`encode_local_var_signature`] - Local variable signatures for StandAloneSig table
//! - [`encode_typespec_signature`] - Type specification signatures for TypeSpec table
//! - [`encode_method_spec_signature`] - Generic instantiations for MethodSpec table

use crate::{
    file::io::{write_compressed_int, write_compressed_uint},
    metadata::{
        signatures::{
            FieldSignature, LocalVariablesSignature, MethodSignature, MethodSpecSignature,
            PropertySignature, SIGNATURE_HEADER,
        },
        tables::CodedIndexType,
        token::Token,
        typesystem::{TypeReference, ELEMENT_TYPE},
    },
    Error::InvalidReference,
    Result,
};

/// Hands out `TypeDef`, `TypeRef` or `TypeSpec` tokens for the types a signature mentions
pub trait TypeTokenProvider {
    /// The token `reference` is written as
    ///
    /// # Errors
    /// Returns an error if no row can be found or created for the type.
    fn type_token(&mut self, reference: &TypeReference) -> Result<Token>;
}

impl<F> TypeTokenProvider for F
where
    F: FnMut(&TypeReference) -> Result<Token>,
{
    fn type_token(&mut self, reference: &TypeReference) -> Result<Token> {
        self(reference)
    }
}

struct SignatureEncoder<'a> {
    buffer: Vec<u8>,
    tokens: &'a mut dyn TypeTokenProvider,
}

impl<'a> SignatureEncoder<'a> {
    fn new(tokens: &'a mut dyn TypeTokenProvider) -> Self {
        SignatureEncoder {
            buffer: Vec::with_capacity(16),
            tokens,
        }
    }

    fn write_token(&mut self, reference: &TypeReference) -> Result<()> {
        let token = self.tokens.type_token(reference)?;
        let Some(table) = token.table_id() else {
            return Err(malformed_error!("Invalid type token - {:?}", token));
        };

        let coded = CodedIndexType::TypeDefOrRef
            .encode(table, token.row())
            .map_err(|_| InvalidReference {
                table,
                row: token.row(),
                category: "TypeDefOrRefOrSpecEncoded".to_string(),
            })?;
        write_compressed_uint(coded, &mut self.buffer)
    }

    fn write_count(&mut self, count: usize) -> Result<()> {
        let Ok(count) = u32::try_from(count) else {
            return Err(malformed_error!("Too many signature elements - {}", count));
        };
        write_compressed_uint(count, &mut self.buffer)
    }

    fn write_type(&mut self, reference: &TypeReference) -> Result<()> {
        match reference {
            TypeReference::Primitive(primitive) => {
                self.buffer.push(primitive.element_type());
            }
            TypeReference::Named(_) => {
                self.buffer.push(reference.element_type_code());
                self.write_token(reference)?;
            }
            TypeReference::GenericParameter(parameter) => {
                self.buffer.push(reference.element_type_code());
                write_compressed_uint(parameter.position, &mut self.buffer)?;
            }
            TypeReference::Array { element, .. } if reference.is_vector() => {
                self.buffer.push(ELEMENT_TYPE::SZARRAY);
                self.write_type(element)?;
            }
            TypeReference::Array {
                element,
                dimensions,
            } => {
                self.buffer.push(ELEMENT_TYPE::ARRAY);
                self.write_type(element)?;
                self.write_count(dimensions.len())?;

                let sizes: Vec<u32> = dimensions
                    .iter()
                    .map_while(|dimension| {
                        let upper = i64::from(dimension.upper_bound?);
                        let lower = i64::from(dimension.lower_bound.unwrap_or(0));
                        u32::try_from(upper - lower + 1).ok()
                    })
                    .collect();
                self.write_count(sizes.len())?;
                for size in sizes {
                    write_compressed_uint(size, &mut self.buffer)?;
                }

                let lower_bounds: Vec<i32> = dimensions
                    .iter()
                    .map_while(|dimension| dimension.lower_bound)
                    .collect();
                self.write_count(lower_bounds.len())?;
                for lower_bound in lower_bounds {
                    write_compressed_int(lower_bound, &mut self.buffer)?;
                }
            }
            TypeReference::Pointer(element)
            | TypeReference::ByReference(element)
            | TypeReference::Pinned(element)
            | TypeReference::Sentinel(element) => {
                self.buffer.push(reference.element_type_code());
                self.write_type(element)?;
            }
            TypeReference::RequiredModifier { modifier, element }
            | TypeReference::OptionalModifier { modifier, element } => {
                self.buffer.push(reference.element_type_code());
                self.write_token(modifier)?;
                self.write_type(element)?;
            }
            TypeReference::GenericInstance { element, arguments } => {
                if !matches!(element.as_ref(), TypeReference::Named(_)) {
                    return Err(malformed_error!(
                        "Generic instance of a non-named type - {}",
                        element.full_name()
                    ));
                }

                self.buffer.push(ELEMENT_TYPE::GENERICINST);
                self.write_type(element)?;
                self.write_count(arguments.len())?;
                for argument in arguments {
                    self.write_type(argument)?;
                }
            }
            TypeReference::FunctionPointer(signature) => {
                self.buffer.push(ELEMENT_TYPE::FNPTR);
                self.write_method(signature)?;
            }
        }

        Ok(())
    }

    fn write_method(&mut self, signature: &MethodSignature) -> Result<()> {
        let mut head = signature.calling_convention.to_byte();
        if signature.has_this {
            head |= SIGNATURE_HEADER::HAS_THIS;
        }
        if signature.explicit_this {
            head |= SIGNATURE_HEADER::EXPLICIT_THIS;
        }
        if signature.generic_parameter_count > 0 {
            head |= SIGNATURE_HEADER::GENERIC;
        }

        self.buffer.push(head);
        if signature.generic_parameter_count > 0 {
            write_compressed_uint(signature.generic_parameter_count, &mut self.buffer)?;
        }

        self.write_count(signature.parameters.len())?;
        self.write_type(&signature.return_type)?;
        for parameter in &signature.parameters {
            self.write_type(parameter)?;
        }

        Ok(())
    }
}

/// Encodes a method signature
///
/// # Errors
/// Returns an error if a referenced type has no token or a value does not fit its encoding
pub fn encode_method_signature(
    signature: &MethodSignature,
    tokens: &mut dyn TypeTokenProvider,
) -> Result<Vec<u8>> {
    let mut encoder = SignatureEncoder::new(tokens);
    encoder.write_method(signature)?;
    Ok(encoder.buffer)
}

/// Encodes a field signature
///
/// # Errors
/// Returns an error if a referenced type has no token
pub fn encode_field_signature(
    signature: &FieldSignature,
    tokens: &mut dyn TypeTokenProvider,
) -> Result<Vec<u8>> {
    let mut encoder = SignatureEncoder::new(tokens);
    encoder.buffer.push(SIGNATURE_HEADER::FIELD);
    encoder.write_type(&signature.field_type)?;
    Ok(encoder.buffer)
}

/// Encodes a property signature
///
/// # Errors
/// Returns an error if a referenced type has no token
pub fn encode_property_signature(
    signature: &PropertySignature,
    tokens: &mut dyn TypeTokenProvider,
) -> Result<Vec<u8>> {
    let mut encoder = SignatureEncoder::new(tokens);

    let mut head = SIGNATURE_HEADER::PROPERTY;
    if signature.has_this {
        head |= SIGNATURE_HEADER::HAS_THIS;
    }
    encoder.buffer.push(head);
    encoder.write_count(signature.parameters.len())?;
    encoder.write_type(&signature.property_type)?;
    for parameter in &signature.parameters {
        encoder.write_type(parameter)?;
    }

    Ok(encoder.buffer)
}

/// Encodes a local variable signature
///
/// # Errors
/// Returns an error if a referenced type has no token
pub fn encode_local_var_signature(
    signature: &LocalVariablesSignature,
    tokens: &mut dyn TypeTokenProvider,
) -> Result<Vec<u8>> {
    let mut encoder = SignatureEncoder::new(tokens);
    encoder.buffer.push(SIGNATURE_HEADER::LOCAL_SIG);
    encoder.write_count(signature.locals.len())?;
    for local in &signature.locals {
        encoder.write_type(local)?;
    }

    Ok(encoder.buffer)
}

/// Encodes the blob of a `TypeSpec` row
///
/// # Errors
/// Returns an error if a referenced type has no token
pub fn encode_typespec_signature(
    reference: &TypeReference,
    tokens: &mut dyn TypeTokenProvider,
) -> Result<Vec<u8>> {
    let mut encoder = SignatureEncoder::new(tokens);
    encoder.write_type(reference)?;
    Ok(encoder.buffer)
}

/// Encodes the instantiation blob of a `MethodSpec` row
///
/// # Errors
/// Returns an error if a referenced type has no token
pub fn encode_method_spec_signature(
    signature: &MethodSpecSignature,
    tokens: &mut dyn TypeTokenProvider,
) -> Result<Vec<u8>> {
    let mut encoder = SignatureEncoder::new(tokens);
    encoder.buffer.push(SIGNATURE_HEADER::GENERIC_INST);
    encoder.write_count(signature.arguments.len())?;
    for argument in &signature.arguments {
        encoder.write_type(argument)?;
    }

    Ok(encoder.buffer)
}
