use crate::{
    file::parser::Parser,
    metadata::{
        signatures::{
            CallingConvention, FieldSignature, LocalVariablesSignature, MethodSignature,
            MethodSpecSignature, PropertySignature, SIGNATURE_HEADER,
        },
        token::Token,
        typesystem::{
            ArrayDimensions, GenericParameterRef, PrimitiveType, TypeReference, ELEMENT_TYPE,
        },
    },
    Error::RecursionLimit,
    Result,
};

/// Default nesting limit, see [`crate::metadata::config::MetadataConfig::max_signature_depth`]
pub const MAX_RECURSION_DEPTH: usize = 64;

/// Turns the `TypeDefOrRefOrSpecEncoded` tokens of a signature into type references.
///
/// Implemented by the module loader over its `TypeDef`, `TypeRef` and `TypeSpec` rows, and for
/// any closure with the same shape.
pub trait TypeResolver {
    /// Resolves `token`; `is_value_type` tells whether it was introduced by `VALUETYPE`
    ///
    /// # Errors
    /// Returns an error if the token does not name a type.
    fn resolve_type(&self, token: Token, is_value_type: bool) -> Result<TypeReference>;
}

impl<F> TypeResolver for F
where
    F: Fn(Token, bool) -> Result<TypeReference>,
{
    fn resolve_type(&self, token: Token, is_value_type: bool) -> Result<TypeReference> {
        self(token, is_value_type)
    }
}

/// Decoder for the signature blobs of ECMA-335 II.23.2
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::signatures::{SignatureParser, TypeResolver};
/// use cilmeta::metadata::{token::Token, typesystem::{PrimitiveType, TypeReference}};
///
/// let resolver = |token: Token, _: bool| -> cilmeta::Result<TypeReference> {
///     Err(cilmeta::Error::TokenNotFound(token))
/// };
///
/// // instance void (int32, string)
/// let data = [0x20, 0x02, 0x01, 0x08, 0x0E];
/// let mut parser = SignatureParser::new(&data, &resolver);
/// let signature = parser.parse_method_signature()?;
///
/// assert!(signature.has_this);
/// assert_eq!(signature.return_type, TypeReference::Primitive(PrimitiveType::Void));
/// assert_eq!(signature.parameters.len(), 2);
/// # Ok::<(), cilmeta::Error>(())
/// ```
pub struct SignatureParser<'a> {
    parser: Parser<'a>,
    resolver: &'a dyn TypeResolver,
    depth: usize,
    max_depth: usize,
}

impl<'a> SignatureParser<'a> {
    /// Create a new `SignatureParser` over `data`
    #[must_use]
    pub fn new(data: &'a [u8], resolver: &'a dyn TypeResolver) -> Self {
        Self::with_max_depth(data, resolver, MAX_RECURSION_DEPTH)
    }

    /// Create a new `SignatureParser` rejecting signatures nested deeper than `max_depth`
    #[must_use]
    pub fn with_max_depth(
        data: &'a [u8],
        resolver: &'a dyn TypeResolver,
        max_depth: usize,
    ) -> Self {
        SignatureParser {
            parser: Parser::new(data),
            resolver,
            depth: 0,
            max_depth,
        }
    }

    /// Parse a single type, tracking the nesting depth
    ///
    /// # Errors
    /// Returns [`crate::Error::RecursionLimit`] if the type nests too deep, or an error for
    /// truncated data and unknown element types.
    pub fn parse_type(&mut self) -> Result<TypeReference> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(RecursionLimit(self.max_depth));
        }

        let result = self.parse_type_inner();
        self.depth -= 1;
        result
    }

    fn parse_type_inner(&mut self) -> Result<TypeReference> {
        let current_byte = self.parser.read_le::<u8>()?;
        if let Some(primitive) = PrimitiveType::from_element_type(current_byte) {
            return Ok(TypeReference::Primitive(primitive));
        }

        match current_byte {
            ELEMENT_TYPE::PTR => Ok(TypeReference::pointer(self.parse_type()?)),
            ELEMENT_TYPE::BYREF => Ok(TypeReference::by_reference(self.parse_type()?)),
            ELEMENT_TYPE::PINNED => Ok(TypeReference::pinned(self.parse_type()?)),
            ELEMENT_TYPE::VALUETYPE => {
                let token = self.parser.read_compressed_token()?;
                self.resolver.resolve_type(token, true)
            }
            ELEMENT_TYPE::CLASS => {
                let token = self.parser.read_compressed_token()?;
                self.resolver.resolve_type(token, false)
            }
            ELEMENT_TYPE::VAR => Ok(TypeReference::GenericParameter(
                GenericParameterRef::type_parameter(self.parser.read_compressed_uint()?),
            )),
            ELEMENT_TYPE::MVAR => Ok(TypeReference::GenericParameter(
                GenericParameterRef::method_parameter(self.parser.read_compressed_uint()?),
            )),
            ELEMENT_TYPE::SZARRAY => Ok(TypeReference::vector(self.parse_type()?)),
            ELEMENT_TYPE::ARRAY => self.parse_array(),
            ELEMENT_TYPE::GENERICINST => {
                let peek_byte = self.parser.peek_byte()?;
                if peek_byte != ELEMENT_TYPE::CLASS && peek_byte != ELEMENT_TYPE::VALUETYPE {
                    return Err(malformed_error!(
                        "GENERICINST - Next byte is not TYPE_CLASS or TYPE_VALUE - {}",
                        peek_byte
                    ));
                }

                let base_type = self.parse_type()?;
                let arg_count = self.parser.read_compressed_uint()?;

                let mut type_args = Vec::with_capacity(arg_count.min(64) as usize);
                for _ in 0..arg_count {
                    type_args.push(self.parse_type()?);
                }

                Ok(TypeReference::generic_instance(base_type, type_args))
            }
            ELEMENT_TYPE::FNPTR => Ok(TypeReference::function_pointer(
                self.parse_method_signature()?,
            )),
            ELEMENT_TYPE::CMOD_REQD | ELEMENT_TYPE::CMOD_OPT => {
                let token = self.parser.read_compressed_token()?;
                let modifier = self.resolver.resolve_type(token, false)?;
                let element = self.parse_type()?;

                if current_byte == ELEMENT_TYPE::CMOD_REQD {
                    Ok(TypeReference::required_modifier(modifier, element))
                } else {
                    Ok(TypeReference::optional_modifier(modifier, element))
                }
            }
            _ => Err(malformed_error!(
                "Unsupported ELEMENT_TYPE - {}",
                current_byte
            )),
        }
    }

    fn parse_array(&mut self) -> Result<TypeReference> {
        let element = self.parse_type()?;
        let rank = self.parser.read_compressed_uint()?;
        if rank == 0 || rank as usize > self.parser.remaining() + 1 {
            return Err(malformed_error!("Invalid array rank - {}", rank));
        }

        let num_sizes = self.parser.read_compressed_uint()?;
        let mut sizes = Vec::with_capacity(num_sizes.min(rank) as usize);
        for _ in 0..num_sizes {
            sizes.push(self.parser.read_compressed_uint()?);
        }

        let num_lo_bounds = self.parser.read_compressed_uint()?;
        let mut lower_bounds = Vec::with_capacity(num_lo_bounds.min(rank) as usize);
        for _ in 0..num_lo_bounds {
            lower_bounds.push(self.parser.read_compressed_int()?);
        }

        let mut dimensions = Vec::with_capacity(rank as usize);
        for index in 0..rank as usize {
            let lower_bound = lower_bounds.get(index).copied();
            let upper_bound = match sizes.get(index) {
                Some(size) => {
                    let Some(upper) = i64::from(lower_bound.unwrap_or(0))
                        .checked_add(i64::from(*size) - 1)
                        .and_then(|upper| i32::try_from(upper).ok())
                    else {
                        return Err(malformed_error!("Array bound overflows - size {}", size));
                    };
                    Some(upper)
                }
                None => None,
            };

            dimensions.push(ArrayDimensions {
                lower_bound,
                upper_bound,
            });
        }

        Ok(TypeReference::Array {
            element: Box::new(element),
            dimensions,
        })
    }

    /// Parse a `MethodDefSig`, `MethodRefSig` or `StandAloneMethodSig`
    ///
    /// # Errors
    /// Returns an error if the signature data is malformed or parsing fails
    pub fn parse_method_signature(&mut self) -> Result<MethodSignature> {
        let convention_byte = self.parser.read_le::<u8>()?;
        let Some(calling_convention) = CallingConvention::from_byte(convention_byte) else {
            return Err(malformed_error!(
                "SignatureMethod - invalid calling convention - {}",
                convention_byte
            ));
        };

        let generic_parameter_count = if convention_byte & SIGNATURE_HEADER::GENERIC != 0 {
            self.parser.read_compressed_uint()?
        } else {
            0
        };

        let param_count = self.parser.read_compressed_uint()?;
        let return_type = self.parse_type()?;

        let mut parameters = Vec::with_capacity(param_count.min(64) as usize);
        let mut seen_sentinel = false;
        for _ in 0..param_count {
            if self.parser.peek_byte()? == ELEMENT_TYPE::SENTINEL {
                if seen_sentinel {
                    return Err(malformed_error!("SignatureMethod - duplicate sentinel"));
                }

                self.parser.advance()?;
                seen_sentinel = true;
                parameters.push(TypeReference::sentinel(self.parse_type()?));
                continue;
            }

            parameters.push(self.parse_type()?);
        }

        Ok(MethodSignature {
            has_this: convention_byte & SIGNATURE_HEADER::HAS_THIS != 0,
            explicit_this: convention_byte & SIGNATURE_HEADER::EXPLICIT_THIS != 0,
            calling_convention,
            generic_parameter_count,
            return_type,
            parameters,
        })
    }

    /// Parse a `FieldSig`
    ///
    /// # Errors
    /// Returns an error if the signature data is malformed or parsing fails
    pub fn parse_field_signature(&mut self) -> Result<FieldSignature> {
        let head_byte = self.parser.read_le::<u8>()?;
        if head_byte != SIGNATURE_HEADER::FIELD {
            return Err(malformed_error!(
                "SignatureField - invalid start - {}",
                head_byte
            ));
        }

        Ok(FieldSignature {
            field_type: self.parse_type()?,
        })
    }

    /// Parse a `PropertySig`
    ///
    /// # Errors
    /// Returns an error if the signature data is malformed or parsing fails
    pub fn parse_property_signature(&mut self) -> Result<PropertySignature> {
        let head_byte = self.parser.read_le::<u8>()?;
        if (head_byte & SIGNATURE_HEADER::PROPERTY) == 0 {
            return Err(malformed_error!(
                "SignatureProperty - invalid start - {}",
                head_byte
            ));
        }

        let param_count = self.parser.read_compressed_uint()?;
        let property_type = self.parse_type()?;

        let mut parameters = Vec::with_capacity(param_count.min(64) as usize);
        for _ in 0..param_count {
            parameters.push(self.parse_type()?);
        }

        Ok(PropertySignature {
            has_this: (head_byte & SIGNATURE_HEADER::HAS_THIS) != 0,
            property_type,
            parameters,
        })
    }

    /// Parse a `LocalVarSig`
    ///
    /// # Errors
    /// Returns an error if the signature data is malformed or parsing fails
    pub fn parse_local_var_signature(&mut self) -> Result<LocalVariablesSignature> {
        let head_byte = self.parser.read_le::<u8>()?;
        if head_byte != SIGNATURE_HEADER::LOCAL_SIG {
            return Err(malformed_error!(
                "SignatureLocalVar - invalid start - {}",
                head_byte
            ));
        }

        let count = self.parser.read_compressed_uint()?;
        let mut locals = Vec::with_capacity(count.min(256) as usize);
        for _ in 0..count {
            locals.push(self.parse_type()?);
        }

        Ok(LocalVariablesSignature { locals })
    }

    /// Parse a `TypeSpec` blob, which is a single type
    ///
    /// # Errors
    /// Returns an error if the signature data is malformed or parsing fails
    pub fn parse_type_spec_signature(&mut self) -> Result<TypeReference> {
        self.parse_type()
    }

    /// Parse a `MethodSpec` instantiation blob
    ///
    /// # Errors
    /// Returns an error if the signature data is malformed or parsing fails
    pub fn parse_method_spec_signature(&mut self) -> Result<MethodSpecSignature> {
        let head_byte = self.parser.read_le::<u8>()?;
        if head_byte != SIGNATURE_HEADER::GENERIC_INST {
            return Err(malformed_error!(
                "SignatureMethodSpec - invalid start - {}",
                head_byte
            ));
        }

        let arg_count = self.parser.read_compressed_uint()?;
        let mut arguments = Vec::with_capacity(arg_count.min(64) as usize);
        for _ in 0..arg_count {
            arguments.push(self.parse_type()?);
        }

        Ok(MethodSpecSignature { arguments })
    }
}
