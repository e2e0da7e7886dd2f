use crate::{
    file::io::{write_compressed_uint, write_ser_string},
    metadata::{
        customattributes::{write_length_prefixed, write_named_argument},
        security::SecurityAttribute,
    },
    Result,
};

/// Encodes a permission set in the binary format.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if a named argument cannot be encoded.
pub fn encode_permission_set(attributes: &[SecurityAttribute]) -> Result<Vec<u8>> {
    let Ok(count) = u32::try_from(attributes.len()) else {
        return Err(malformed_error!(
            "Too many security attributes - {}",
            attributes.len()
        ));
    };

    let mut blob = vec![b'.'];
    write_compressed_uint(count, &mut blob)?;

    for attribute in attributes {
        write_ser_string(Some(&attribute.type_name), &mut blob)?;

        let mut arguments = Vec::new();
        let Ok(named_count) = u32::try_from(attribute.named_args.len()) else {
            return Err(malformed_error!(
                "Too many named arguments - {}",
                attribute.named_args.len()
            ));
        };
        write_compressed_uint(named_count, &mut arguments)?;
        for named in &attribute.named_args {
            write_named_argument(named, &mut arguments)?;
        }

        write_length_prefixed(&arguments, &mut blob)?;
    }

    Ok(blob)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        customattributes::{CustomAttributeArgument, CustomAttributeNamedArgument},
        security::parse_permission_set,
        typesystem::PrimitiveType,
    };

    #[test]
    fn layout() {
        let attributes = vec![SecurityAttribute {
            type_name: "P".to_string(),
            named_args: vec![CustomAttributeNamedArgument {
                is_field: false,
                name: "Flags".to_string(),
                arg_type: PrimitiveType::I4.into(),
                value: CustomAttributeArgument::I4(8),
            }],
        }];

        let blob = encode_permission_set(&attributes).unwrap();
        #[rustfmt::skip]
        let expected = [
            b'.', 0x01,
            0x01, b'P',
            0x0D,
            0x01, 0x54, 0x08, 0x05, b'F', b'l', b'a', b'g', b's', 0x08, 0x00, 0x00, 0x00,
        ];
        assert_eq!(blob, expected);
        assert_eq!(parse_permission_set(&blob).unwrap(), attributes);
    }

    #[test]
    fn empty_attribute() {
        let blob = encode_permission_set(&[SecurityAttribute::new("A")]).unwrap();
        assert_eq!(blob, [b'.', 0x01, 0x01, b'A', 0x01, 0x00]);
        assert_eq!(parse_permission_set(&blob).unwrap()[0].type_name, "A");
    }
}
