//! Custom attribute blob parsing (ECMA-335 II.23.3).
//!
//! Fixed arguments carry no type information of their own; they are read according to the
//! parameter types of the attribute constructor. Named arguments, boxed values and enum types
//! in named arguments are self-describing through `CorSerializationType` tags.
//!
//! The underlying type of an enum is not part of the blob either. Callers that know the enums of
//! the module pass a lookup to [`CustomAttributeParser::with_enum_lookup`]; enums it does not know
//! are read as `int32`, the underlying type of nearly every enum in practice.
//!
//! # Examples
//!
//! ```rust
//! use cilmeta::metadata::customattributes::{parse_custom_attribute_blob, CustomAttributeArgument};
//! use cilmeta::metadata::typesystem::{PrimitiveType, TypeReference};
//!
//! let blob = &[
//!     0x01, 0x00,                     // Prolog (0x0001)
//!     0x05,                           // String length
//!     0x48, 0x65, 0x6C, 0x6C, 0x6F,   // "Hello" (UTF-8)
//!     0x00, 0x00,                     // Named argument count (0)
//! ];
//!
//! let value = parse_custom_attribute_blob(blob, &[PrimitiveType::String.into()])?;
//! assert_eq!(
//!     value.fixed_args[0],
//!     CustomAttributeArgument::String(Some("Hello".to_string()))
//! );
//! # Ok::<(), cilmeta::Error>(())
//! ```

use crate::{
    file::parser::Parser,
    metadata::{
        customattributes::types::{
            CustomAttributeArgument, CustomAttributeNamedArgument, CustomAttributeValue,
            SERIALIZATION_TYPE,
        },
        typesystem::{AssemblyName, NamedType, PrimitiveType, ResolutionScope, TypeReference},
    },
    Error::RecursionLimit,
    Result,
};

/// Maximum nesting of arrays and boxed values inside one argument
const MAX_NESTING_DEPTH: usize = 64;

/// Looks up the underlying integer type of an enum
pub type EnumLookup<'a> = &'a dyn Fn(&NamedType) -> Option<PrimitiveType>;

/// Parse a custom attribute blob, reading the fixed arguments as `params`.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for a wrong prolog or values that do not match their
/// types, [`crate::Error::OutOfBounds`] for truncated data and
/// [`crate::Error::RecursionLimit`] for arrays nested too deeply.
pub fn parse_custom_attribute_blob(
    data: &[u8],
    params: &[TypeReference],
) -> Result<CustomAttributeValue> {
    let mut parser = CustomAttributeParser::new(data);
    parser.parse_custom_attribute(params)
}

/// Reader for one custom attribute blob
pub struct CustomAttributeParser<'a> {
    parser: Parser<'a>,
    enums: Option<EnumLookup<'a>>,
    depth: usize,
}

impl<'a> CustomAttributeParser<'a> {
    /// Creates a parser that reads every enum as `int32`
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        CustomAttributeParser {
            parser: Parser::new(data),
            enums: None,
            depth: 0,
        }
    }

    /// Creates a parser that asks `enums` for the underlying type of enum arguments
    #[must_use]
    pub fn with_enum_lookup(data: &'a [u8], enums: EnumLookup<'a>) -> Self {
        CustomAttributeParser {
            parser: Parser::new(data),
            enums: Some(enums),
            depth: 0,
        }
    }

    /// Parse the prolog, the fixed arguments for `params` and the named arguments.
    ///
    /// A blob that ends right after the fixed arguments has no named arguments.
    ///
    /// # Errors
    /// See [`parse_custom_attribute_blob`].
    pub fn parse_custom_attribute(
        &mut self,
        params: &[TypeReference],
    ) -> Result<CustomAttributeValue> {
        let prolog = self.parser.read_le::<u16>()?;
        if prolog != 0x0001 {
            return Err(malformed_error!(
                "Invalid custom attribute prolog - expected 0x0001, found 0x{:04x}",
                prolog
            ));
        }

        let mut fixed_args = Vec::with_capacity(params.len());
        for param in params {
            fixed_args.push(self.parse_value(param)?);
        }

        let mut named_args = Vec::new();
        if self.parser.remaining() >= 2 {
            let count = self.parser.read_le::<u16>()?;
            named_args.reserve(usize::from(count));
            for _ in 0..count {
                named_args.push(self.parse_named_argument()?);
            }
        }

        Ok(CustomAttributeValue {
            fixed_args,
            named_args,
        })
    }

    /// Reads a compressed count followed by that many named arguments, the property list
    /// layout of binary permission sets
    pub(crate) fn parse_compressed_named_arguments(
        &mut self,
    ) -> Result<Vec<CustomAttributeNamedArgument>> {
        let count = self.parser.read_compressed_uint()? as usize;
        if count > self.parser.remaining() {
            return Err(malformed_error!(
                "Named argument count {} exceeds the remaining blob",
                count
            ));
        }

        let mut named_args = Vec::with_capacity(count);
        for _ in 0..count {
            named_args.push(self.parse_named_argument()?);
        }
        Ok(named_args)
    }

    fn parse_named_argument(&mut self) -> Result<CustomAttributeNamedArgument> {
        let is_field = match self.parser.read_le::<u8>()? {
            SERIALIZATION_TYPE::FIELD => true,
            SERIALIZATION_TYPE::PROPERTY => false,
            other => {
                return Err(malformed_error!(
                    "Invalid named argument kind - 0x{:02x}",
                    other
                ))
            }
        };

        let (arg_type, enum_name) = self.parse_field_or_prop_type()?;
        let Some(name) = self.parser.read_ser_string()? else {
            return Err(malformed_error!("Named argument without a name"));
        };

        let value = match enum_name {
            Some(enum_name) => self.parse_enum(&arg_type, enum_name)?,
            None => self.parse_value(&arg_type)?,
        };

        Ok(CustomAttributeNamedArgument {
            is_field,
            name,
            arg_type,
            value,
        })
    }

    /// Reads a `FieldOrPropType`, returning the type and, for enums, the serialized type name
    fn parse_field_or_prop_type(&mut self) -> Result<(TypeReference, Option<String>)> {
        let tag = self.parser.read_le::<u8>()?;
        let primitive = match tag {
            SERIALIZATION_TYPE::BOOLEAN..=SERIALIZATION_TYPE::STRING => {
                PrimitiveType::from_element_type(tag)
            }
            SERIALIZATION_TYPE::TAGGED_OBJECT => Some(PrimitiveType::Object),
            _ => None,
        };

        if let Some(primitive) = primitive {
            return Ok((TypeReference::Primitive(primitive), None));
        }

        match tag {
            SERIALIZATION_TYPE::TYPE => Ok((TypeReference::Named(system_type()), None)),
            SERIALIZATION_TYPE::SZARRAY => {
                self.enter()?;
                let element = self.parse_field_or_prop_type();
                self.depth -= 1;
                let (element, enum_name) = element?;
                Ok((TypeReference::vector(element), enum_name))
            }
            SERIALIZATION_TYPE::ENUM => {
                let Some(name) = self.parser.read_ser_string()? else {
                    return Err(malformed_error!("Enum argument without a type name"));
                };

                let named = parse_serialized_type_name(&name, true);
                Ok((TypeReference::Named(named), Some(name)))
            }
            _ => Err(malformed_error!(
                "Invalid serialization type - 0x{:02x}",
                tag
            )),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            self.depth -= 1;
            return Err(RecursionLimit(MAX_NESTING_DEPTH));
        }
        Ok(())
    }

    /// Reads one value of type `arg_type`
    fn parse_value(&mut self, arg_type: &TypeReference) -> Result<CustomAttributeArgument> {
        let stripped = strip_modifiers(arg_type);
        match stripped {
            TypeReference::Primitive(PrimitiveType::Object) => self.parse_boxed(),
            TypeReference::Primitive(primitive) => self.parse_primitive(*primitive),
            TypeReference::Named(named) if is_system_type(named) => {
                Ok(CustomAttributeArgument::Type(self.parser.read_ser_string()?))
            }
            TypeReference::Named(named) if named.is_value_type => {
                let name = serialized_type_name(named);
                self.parse_enum(&TypeReference::Named(named.clone()), name)
            }
            TypeReference::Array { element, .. } if stripped.is_vector() => {
                self.enter()?;
                let result = self.parse_array(element);
                self.depth -= 1;
                result
            }
            other => Err(malformed_error!(
                "Type {} cannot be used in a custom attribute",
                other.full_name()
            )),
        }
    }

    fn parse_array(&mut self, element: &TypeReference) -> Result<CustomAttributeArgument> {
        let length = self.parser.read_le::<u32>()?;
        if length == u32::MAX {
            return Ok(CustomAttributeArgument::Array(None));
        }

        if length as usize > self.parser.remaining() {
            return Err(malformed_error!(
                "Array length {} exceeds the remaining blob",
                length
            ));
        }

        let mut items = Vec::with_capacity(length as usize);
        for _ in 0..length {
            items.push(self.parse_value(element)?);
        }

        Ok(CustomAttributeArgument::Array(Some(items)))
    }

    fn parse_boxed(&mut self) -> Result<CustomAttributeArgument> {
        self.enter()?;
        let result = self.parse_field_or_prop_type().and_then(|(boxed_type, enum_name)| {
            let value = match enum_name {
                Some(enum_name) => self.parse_enum(&boxed_type, enum_name)?,
                None => self.parse_value(&boxed_type)?,
            };
            Ok(CustomAttributeArgument::Boxed(boxed_type, Box::new(value)))
        });
        self.depth -= 1;
        result
    }

    fn parse_enum(
        &mut self,
        enum_type: &TypeReference,
        name: String,
    ) -> Result<CustomAttributeArgument> {
        let element = match enum_type {
            TypeReference::Array { element, .. } => {
                // an array of enums, every item carries the enum name
                self.enter()?;
                let length = self.parser.read_le::<u32>();
                let result = length.and_then(|length| {
                    if length == u32::MAX {
                        return Ok(CustomAttributeArgument::Array(None));
                    }
                    let mut items = Vec::new();
                    for _ in 0..length {
                        items.push(self.parse_enum(element, name.clone())?);
                    }
                    Ok(CustomAttributeArgument::Array(Some(items)))
                });
                self.depth -= 1;
                return result;
            }
            TypeReference::Named(named) => named,
            other => {
                return Err(malformed_error!(
                    "Type {} is not an enum",
                    other.full_name()
                ))
            }
        };

        let underlying = self
            .enums
            .and_then(|lookup| lookup(element))
            .unwrap_or(PrimitiveType::I4);

        let value = self.parse_primitive(underlying)?;
        Ok(CustomAttributeArgument::Enum(name, Box::new(value)))
    }

    fn parse_primitive(&mut self, primitive: PrimitiveType) -> Result<CustomAttributeArgument> {
        Ok(match primitive {
            PrimitiveType::Boolean => CustomAttributeArgument::Bool(self.parser.read_le::<u8>()? != 0),
            PrimitiveType::Char => {
                let code = self.parser.read_le::<u16>()?;
                let Some(value) = char::from_u32(u32::from(code)) else {
                    return Err(malformed_error!("Invalid char value - 0x{:04x}", code));
                };
                CustomAttributeArgument::Char(value)
            }
            PrimitiveType::I1 => CustomAttributeArgument::I1(self.parser.read_le::<i8>()?),
            PrimitiveType::U1 => CustomAttributeArgument::U1(self.parser.read_le::<u8>()?),
            PrimitiveType::I2 => CustomAttributeArgument::I2(self.parser.read_le::<i16>()?),
            PrimitiveType::U2 => CustomAttributeArgument::U2(self.parser.read_le::<u16>()?),
            PrimitiveType::I4 => CustomAttributeArgument::I4(self.parser.read_le::<i32>()?),
            PrimitiveType::U4 => CustomAttributeArgument::U4(self.parser.read_le::<u32>()?),
            PrimitiveType::I8 => CustomAttributeArgument::I8(self.parser.read_le::<i64>()?),
            PrimitiveType::U8 => CustomAttributeArgument::U8(self.parser.read_le::<u64>()?),
            PrimitiveType::R4 => CustomAttributeArgument::R4(self.parser.read_le::<f32>()?),
            PrimitiveType::R8 => CustomAttributeArgument::R8(self.parser.read_le::<f64>()?),
            PrimitiveType::String => {
                CustomAttributeArgument::String(self.parser.read_ser_string()?)
            }
            other => {
                return Err(malformed_error!(
                    "{} cannot be used in a custom attribute",
                    other.name()
                ))
            }
        })
    }
}

/// Removes custom modifiers, which carry no meaning for attribute values
pub(crate) fn strip_modifiers(mut reference: &TypeReference) -> &TypeReference {
    while let TypeReference::RequiredModifier { element, .. }
    | TypeReference::OptionalModifier { element, .. } = reference
    {
        reference = element.as_ref();
    }
    reference
}

pub(crate) fn is_system_type(named: &NamedType) -> bool {
    named.namespace == "System" && named.name == "Type" && named.declaring_type().is_none()
}

fn system_type() -> NamedType {
    NamedType::new(
        "System",
        "Type",
        ResolutionScope::AssemblyRef(AssemblyName::new("mscorlib")),
    )
}

/// Reads a reflection style type name such as `App.Outer+Inner, App, Version=1.0.0.0`.
///
/// Only the simple assembly name is kept.
#[must_use]
pub fn parse_serialized_type_name(serialized: &str, is_value_type: bool) -> NamedType {
    let (type_name, assembly) = match serialized.split_once(',') {
        Some((type_name, assembly)) => (type_name.trim(), Some(assembly)),
        None => (serialized.trim(), None),
    };

    let scope = match assembly.and_then(|assembly| assembly.split(',').next()) {
        Some(name) if !name.trim().is_empty() => {
            ResolutionScope::AssemblyRef(AssemblyName::new(name.trim()))
        }
        _ => ResolutionScope::CurrentModule,
    };

    let mut parts = type_name.split('+');
    let outermost = parts.next().unwrap_or_default();
    let mut named = match outermost.rsplit_once('.') {
        Some((namespace, name)) => NamedType::new(namespace, name, scope),
        None => NamedType::new("", outermost, scope),
    };

    for nested in parts {
        named = NamedType::nested(named, nested);
    }

    named.is_value_type = is_value_type;
    named
}

/// Writes a named type the way reflection serializes it: `Namespace.Outer+Inner`, followed by
/// the assembly name for types from other assemblies
#[must_use]
pub fn serialized_type_name(named: &NamedType) -> String {
    let mut name = named.full_name().replace('/', "+");
    if let ResolutionScope::AssemblyRef(assembly) = named.root_scope() {
        name.push_str(", ");
        name.push_str(&assembly.name);
    }
    name
}
