//! Custom attribute blob encoding (ECMA-335 II.23.3), the inverse of the parser.

use crate::{
    file::io::{write_compressed_uint, write_ser_string},
    metadata::{
        customattributes::{
            parser::{is_system_type, serialized_type_name, strip_modifiers},
            types::{
                CustomAttributeArgument, CustomAttributeNamedArgument, CustomAttributeValue,
                SERIALIZATION_TYPE,
            },
        },
        typesystem::{PrimitiveType, TypeReference},
    },
    Result,
};

/// Encodes a custom attribute value whose constructor takes `params`.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the number of fixed arguments does not match the
/// constructor, or an argument does not match its declared type.
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::customattributes::{
///     encode_custom_attribute_value, CustomAttributeArgument, CustomAttributeValue,
/// };
/// use cilmeta::metadata::typesystem::PrimitiveType;
///
/// let value = CustomAttributeValue {
///     fixed_args: vec![CustomAttributeArgument::I4(1)],
///     named_args: vec![],
/// };
///
/// let blob = encode_custom_attribute_value(&value, &[PrimitiveType::I4.into()])?;
/// assert_eq!(blob, [0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00]);
/// # Ok::<(), cilmeta::Error>(())
/// ```
pub fn encode_custom_attribute_value(
    value: &CustomAttributeValue,
    params: &[TypeReference],
) -> Result<Vec<u8>> {
    if value.fixed_args.len() != params.len() {
        return Err(malformed_error!(
            "Constructor takes {} arguments, attribute has {}",
            params.len(),
            value.fixed_args.len()
        ));
    }

    let Ok(named_count) = u16::try_from(value.named_args.len()) else {
        return Err(malformed_error!(
            "Too many named arguments - {}",
            value.named_args.len()
        ));
    };

    let mut blob = vec![0x01, 0x00];
    for (arg, param) in value.fixed_args.iter().zip(params) {
        write_value(arg, param, &mut blob)?;
    }

    blob.extend_from_slice(&named_count.to_le_bytes());
    for named in &value.named_args {
        write_named_argument(named, &mut blob)?;
    }

    Ok(blob)
}

pub(crate) fn write_named_argument(
    named: &CustomAttributeNamedArgument,
    blob: &mut Vec<u8>,
) -> Result<()> {
    blob.push(if named.is_field {
        SERIALIZATION_TYPE::FIELD
    } else {
        SERIALIZATION_TYPE::PROPERTY
    });
    write_field_or_prop_type(&named.arg_type, Some(&named.value), blob)?;
    write_ser_string(Some(&named.name), blob)?;
    write_value(&named.value, &named.arg_type, blob)
}

/// Writes the `FieldOrPropType` of `arg_type`; enum names are taken from `value` when present
pub(crate) fn write_field_or_prop_type(
    arg_type: &TypeReference,
    value: Option<&CustomAttributeArgument>,
    blob: &mut Vec<u8>,
) -> Result<()> {
    let stripped = strip_modifiers(arg_type);
    match stripped {
        TypeReference::Primitive(PrimitiveType::Object) => {
            blob.push(SERIALIZATION_TYPE::TAGGED_OBJECT);
        }
        TypeReference::Primitive(primitive) if is_serializable(*primitive) => {
            blob.push(primitive.element_type());
        }
        TypeReference::Named(named) if is_system_type(named) => {
            blob.push(SERIALIZATION_TYPE::TYPE);
        }
        TypeReference::Named(named) => {
            blob.push(SERIALIZATION_TYPE::ENUM);
            let name = match value {
                Some(CustomAttributeArgument::Enum(name, _)) => name.clone(),
                _ => serialized_type_name(named),
            };
            write_ser_string(Some(&name), blob)?;
        }
        TypeReference::Array { element, .. } if stripped.is_vector() => {
            blob.push(SERIALIZATION_TYPE::SZARRAY);
            let first = match value {
                Some(CustomAttributeArgument::Array(Some(items))) => items.first(),
                _ => None,
            };
            write_field_or_prop_type(element, first, blob)?;
        }
        other => {
            return Err(malformed_error!(
                "Type {} cannot be used in a custom attribute",
                other.full_name()
            ))
        }
    }

    Ok(())
}

fn is_serializable(primitive: PrimitiveType) -> bool {
    (SERIALIZATION_TYPE::BOOLEAN..=SERIALIZATION_TYPE::STRING).contains(&primitive.element_type())
}

fn write_value(
    arg: &CustomAttributeArgument,
    arg_type: &TypeReference,
    blob: &mut Vec<u8>,
) -> Result<()> {
    let stripped = strip_modifiers(arg_type);
    match (stripped, arg) {
        (
            TypeReference::Primitive(PrimitiveType::Object),
            CustomAttributeArgument::Boxed(boxed_type, value),
        ) => {
            write_field_or_prop_type(boxed_type, Some(value), blob)?;
            write_value(value, boxed_type, blob)
        }
        (TypeReference::Primitive(primitive), arg) if primitive_of(arg) == Some(*primitive) => {
            write_primitive(arg, blob)
        }
        (TypeReference::Named(named), CustomAttributeArgument::Type(name))
            if is_system_type(named) =>
        {
            write_ser_string(name.as_deref(), blob)
        }
        (TypeReference::Named(_), CustomAttributeArgument::Enum(_, value)) => {
            write_primitive(value, blob)
        }
        (TypeReference::Array { element, .. }, CustomAttributeArgument::Array(items))
            if stripped.is_vector() =>
        {
            let Some(items) = items else {
                blob.extend_from_slice(&u32::MAX.to_le_bytes());
                return Ok(());
            };

            let Ok(length) = u32::try_from(items.len()) else {
                return Err(malformed_error!("Array too long - {}", items.len()));
            };

            blob.extend_from_slice(&length.to_le_bytes());
            for item in items {
                write_value(item, element, blob)?;
            }
            Ok(())
        }
        (arg_type, arg) => Err(malformed_error!(
            "Argument {:?} does not match type {}",
            arg,
            arg_type.full_name()
        )),
    }
}

fn primitive_of(arg: &CustomAttributeArgument) -> Option<PrimitiveType> {
    Some(match arg {
        CustomAttributeArgument::Bool(_) => PrimitiveType::Boolean,
        CustomAttributeArgument::Char(_) => PrimitiveType::Char,
        CustomAttributeArgument::I1(_) => PrimitiveType::I1,
        CustomAttributeArgument::U1(_) => PrimitiveType::U1,
        CustomAttributeArgument::I2(_) => PrimitiveType::I2,
        CustomAttributeArgument::U2(_) => PrimitiveType::U2,
        CustomAttributeArgument::I4(_) => PrimitiveType::I4,
        CustomAttributeArgument::U4(_) => PrimitiveType::U4,
        CustomAttributeArgument::I8(_) => PrimitiveType::I8,
        CustomAttributeArgument::U8(_) => PrimitiveType::U8,
        CustomAttributeArgument::R4(_) => PrimitiveType::R4,
        CustomAttributeArgument::R8(_) => PrimitiveType::R8,
        CustomAttributeArgument::String(_) => PrimitiveType::String,
        _ => return None,
    })
}

#[allow(clippy::cast_possible_truncation)]
fn write_primitive(arg: &CustomAttributeArgument, blob: &mut Vec<u8>) -> Result<()> {
    match arg {
        CustomAttributeArgument::Bool(value) => blob.push(u8::from(*value)),
        CustomAttributeArgument::Char(value) => {
            let Ok(code) = u16::try_from(u32::from(*value)) else {
                return Err(malformed_error!("Char {:?} is outside the BMP", value));
            };
            blob.extend_from_slice(&code.to_le_bytes());
        }
        CustomAttributeArgument::I1(value) => blob.extend_from_slice(&value.to_le_bytes()),
        CustomAttributeArgument::U1(value) => blob.push(*value),
        CustomAttributeArgument::I2(value) => blob.extend_from_slice(&value.to_le_bytes()),
        CustomAttributeArgument::U2(value) => blob.extend_from_slice(&value.to_le_bytes()),
        CustomAttributeArgument::I4(value) => blob.extend_from_slice(&value.to_le_bytes()),
        CustomAttributeArgument::U4(value) => blob.extend_from_slice(&value.to_le_bytes()),
        CustomAttributeArgument::I8(value) => blob.extend_from_slice(&value.to_le_bytes()),
        CustomAttributeArgument::U8(value) => blob.extend_from_slice(&value.to_le_bytes()),
        CustomAttributeArgument::R4(value) => blob.extend_from_slice(&value.to_le_bytes()),
        CustomAttributeArgument::R8(value) => blob.extend_from_slice(&value.to_le_bytes()),
        CustomAttributeArgument::String(value) => write_ser_string(value.as_deref(), blob)?,
        other => {
            return Err(malformed_error!("{:?} is not a primitive value", other));
        }
    }

    Ok(())
}

/// Appends `payload` behind its compressed length
pub(crate) fn write_length_prefixed(payload: &[u8], blob: &mut Vec<u8>) -> Result<()> {
    let Ok(length) = u32::try_from(payload.len()) else {
        return Err(malformed_error!("Payload too long - {}", payload.len()));
    };

    write_compressed_uint(length, blob)?;
    blob.extend_from_slice(payload);
    Ok(())
}
