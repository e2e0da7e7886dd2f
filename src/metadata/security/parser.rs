//! Decoding of `DeclSecurity` permission set blobs.

use quick_xml::{events::Event, Reader};
use widestring::U16Str;

use crate::{
    file::parser::Parser,
    metadata::{
        customattributes::{CustomAttributeArgument, CustomAttributeNamedArgument, CustomAttributeParser},
        security::{security_classes, PermissionSetFormat, SecurityAttribute},
        typesystem::PrimitiveType,
    },
    Result,
};

/// Decodes a permission set blob in either of its formats.
///
/// An empty blob declares no permissions.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for an unknown format or invalid content and
/// [`crate::Error::OutOfBounds`] for truncated binary data.
pub fn parse_permission_set(data: &[u8]) -> Result<Vec<SecurityAttribute>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    match PermissionSetFormat::detect(data) {
        Some(PermissionSetFormat::Binary) => parse_binary_permission_set(data),
        Some(PermissionSetFormat::Xml) => parse_xml_permission_set(data),
        None => Err(malformed_error!(
            "Unknown permission set format - leading byte 0x{:02x}",
            data[0]
        )),
    }
}

/// Decodes the `.`-prefixed binary format: a compressed attribute count, then per attribute
/// its type name, the byte length of its arguments, and the compressed named argument list.
///
/// # Errors
/// See [`parse_permission_set`].
pub fn parse_binary_permission_set(data: &[u8]) -> Result<Vec<SecurityAttribute>> {
    let mut parser = Parser::new(data);
    if parser.read_le::<u8>()? != b'.' {
        return Err(malformed_error!("Binary permission set must start with '.'"));
    }

    let count = parser.read_compressed_uint()? as usize;
    if count > parser.remaining() {
        return Err(malformed_error!(
            "Permission count {} exceeds the remaining blob",
            count
        ));
    }

    let mut attributes = Vec::with_capacity(count);
    for _ in 0..count {
        let Some(type_name) = parser.read_ser_string()? else {
            return Err(malformed_error!("Security attribute without a type name"));
        };

        let length = parser.read_compressed_uint()? as usize;
        let arguments = parser.read_bytes(length)?;
        let named_args = if arguments.is_empty() {
            Vec::new()
        } else {
            CustomAttributeParser::new(arguments).parse_compressed_named_arguments()?
        };

        attributes.push(SecurityAttribute {
            type_name,
            named_args,
        });
    }

    Ok(attributes)
}

/// Decodes the legacy XML format.
///
/// Every `IPermission` element becomes one attribute whose type is its `class` and whose
/// properties are its remaining XML attributes, as strings. A `PermissionSet` root that
/// carries more than `class` and `version` (e.g. `Unrestricted`) becomes an attribute too.
///
/// # Errors
/// See [`parse_permission_set`].
pub fn parse_xml_permission_set(data: &[u8]) -> Result<Vec<SecurityAttribute>> {
    let text = decode_xml_text(data)?;

    let mut reader = Reader::from_str(&text);
    reader.config_mut().trim_text(true);

    let mut attributes = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let element = e.name();
                let is_permission = element.as_ref() == b"IPermission";
                let is_set = element.as_ref() == b"PermissionSet";
                if !is_permission && !is_set {
                    continue;
                }

                let mut class = None;
                let mut named_args = Vec::new();
                for attr in e.attributes() {
                    let attr = attr.map_err(|err| {
                        malformed_error!("Invalid XML attribute in permission set - {}", err)
                    })?;
                    let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
                    let raw = String::from_utf8_lossy(&attr.value).to_string();
                    let value = quick_xml::escape::unescape(&raw)
                        .map_err(|err| malformed_error!("Invalid XML escape - {}", err))?
                        .to_string();

                    match key.as_str() {
                        "class" => class = Some(value),
                        "version" => {}
                        _ => named_args.push(CustomAttributeNamedArgument {
                            is_field: false,
                            name: key,
                            arg_type: PrimitiveType::String.into(),
                            value: CustomAttributeArgument::String(Some(value)),
                        }),
                    }
                }

                if is_set && named_args.is_empty() {
                    continue;
                }

                let type_name = match class {
                    Some(class) => class,
                    None if is_set => security_classes::PERMISSION_SET.to_string(),
                    None => {
                        return Err(malformed_error!("IPermission element without a class"));
                    }
                };

                attributes.push(SecurityAttribute {
                    type_name,
                    named_args,
                });
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(malformed_error!(
                    "Invalid XML permission set at {} - {}",
                    reader.buffer_position(),
                    err
                ));
            }
        }
    }

    Ok(attributes)
}

/// XML permission sets are stored as UTF-16LE, optionally behind a byte order mark; a few
/// compilers emit plain ASCII instead
fn decode_xml_text(data: &[u8]) -> Result<String> {
    let utf16 = data.starts_with(&[0xFF, 0xFE]) || (data.len() >= 2 && data[1] == 0);
    if !utf16 {
        return match std::str::from_utf8(data) {
            Ok(text) => Ok(text.to_string()),
            Err(_) => Err(malformed_error!("Invalid UTF-8 in XML permission set")),
        };
    }

    let body = data.strip_prefix(&[0xFF, 0xFE]).unwrap_or(data);
    if body.len() % 2 != 0 {
        return Err(malformed_error!(
            "UTF-16 permission set has an odd length - {}",
            body.len()
        ));
    }

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    match U16Str::from_slice(&units).to_string() {
        Ok(text) => Ok(text.trim_end_matches('\0').to_string()),
        Err(_) => Err(malformed_error!("Invalid UTF-16 in XML permission set")),
    }
}
