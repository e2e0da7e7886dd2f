use std::sync::Arc;

use crate::metadata::{
    customattributes::CustomAttributeList,
    members::{FieldAttributes, Owned, OwnerSlot, TokenCell},
    signatures::FieldSignature,
    typesystem::{TypeReference, ELEMENT_TYPE},
};

/// A reference-counted pointer to a `FieldDefinition`
pub type FieldRc = Arc<FieldDefinition>;

/// Default value of a field, parameter or property, as stored in the `Constant` table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstantValue {
    /// `ELEMENT_TYPE` of the value; `CLASS` for a null reference
    pub element_type: u8,
    /// Little-endian value bytes, UTF-16LE for strings
    pub value: Vec<u8>,
}

impl ConstantValue {
    /// A `bool` constant
    #[must_use]
    pub fn bool(value: bool) -> Self {
        ConstantValue {
            element_type: ELEMENT_TYPE::BOOLEAN,
            value: vec![u8::from(value)],
        }
    }

    /// An `int32` constant
    #[must_use]
    pub fn i4(value: i32) -> Self {
        ConstantValue {
            element_type: ELEMENT_TYPE::I4,
            value: value.to_le_bytes().to_vec(),
        }
    }

    /// An `int64` constant
    #[must_use]
    pub fn i8(value: i64) -> Self {
        ConstantValue {
            element_type: ELEMENT_TYPE::I8,
            value: value.to_le_bytes().to_vec(),
        }
    }

    /// A `float64` constant
    #[must_use]
    pub fn r8(value: f64) -> Self {
        ConstantValue {
            element_type: ELEMENT_TYPE::R8,
            value: value.to_le_bytes().to_vec(),
        }
    }

    /// A string constant
    #[must_use]
    pub fn string(value: &str) -> Self {
        ConstantValue {
            element_type: ELEMENT_TYPE::STRING,
            value: value.encode_utf16().flat_map(u16::to_le_bytes).collect(),
        }
    }

    /// The null reference; stored as `CLASS` with a 4 byte zero value
    #[must_use]
    pub fn null() -> Self {
        ConstantValue {
            element_type: ELEMENT_TYPE::CLASS,
            value: vec![0; 4],
        }
    }

    /// Returns true for the null reference
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.element_type == ELEMENT_TYPE::CLASS
    }

    /// The value of an integer, char or boolean constant, sign- or zero-extended
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        let bytes = self.value.as_slice();
        Some(match (self.element_type, bytes) {
            (ELEMENT_TYPE::BOOLEAN | ELEMENT_TYPE::U1, [value]) => i64::from(*value),
            (ELEMENT_TYPE::I1, [value]) => i64::from(*value as i8),
            (ELEMENT_TYPE::CHAR | ELEMENT_TYPE::U2, [lo, hi]) => {
                i64::from(u16::from_le_bytes([*lo, *hi]))
            }
            (ELEMENT_TYPE::I2, [lo, hi]) => i64::from(i16::from_le_bytes([*lo, *hi])),
            (ELEMENT_TYPE::I4, &[a, b, c, d]) => i64::from(i32::from_le_bytes([a, b, c, d])),
            (ELEMENT_TYPE::U4, &[a, b, c, d]) => i64::from(u32::from_le_bytes([a, b, c, d])),
            (ELEMENT_TYPE::I8 | ELEMENT_TYPE::U8, bytes) => {
                i64::from_le_bytes(bytes.try_into().ok()?)
            }
            _ => return None,
        })
    }

    /// The value of a string constant
    #[must_use]
    pub fn as_string(&self) -> Option<String> {
        if self.element_type != ELEMENT_TYPE::STRING || self.value.len() % 2 != 0 {
            return None;
        }

        let units: Vec<u16> = self
            .value
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).ok()
    }
}

/// A field defined by a type
pub struct FieldDefinition {
    /// `Field` token, assigned when read or written
    pub token: TokenCell,
    owner: OwnerSlot,
    /// Field name
    pub name: String,
    /// `FieldAttributes`
    pub attributes: FieldAttributes,
    /// Field type
    pub signature: FieldSignature,
    /// Default value (`Constant` table)
    pub constant: Option<ConstantValue>,
    /// Explicit layout offset (`FieldLayout` table)
    pub offset: Option<u32>,
    /// Native type blob (`FieldMarshal` table)
    pub marshal: Option<Vec<u8>>,
    /// Address of the initial data (`FieldRVA` table)
    pub rva: Option<u32>,
    /// Custom attributes applied to the field
    pub custom_attributes: CustomAttributeList,
}

impl FieldDefinition {
    /// Creates a field of type `field_type`
    #[must_use]
    pub fn new(name: &str, attributes: FieldAttributes, field_type: TypeReference) -> Self {
        FieldDefinition {
            token: TokenCell::default(),
            owner: OwnerSlot::default(),
            name: name.to_string(),
            attributes,
            signature: FieldSignature { field_type },
            constant: None,
            offset: None,
            marshal: None,
            rva: None,
            custom_attributes: CustomAttributeList::new(),
        }
    }

    /// The field type
    #[must_use]
    pub fn field_type(&self) -> &TypeReference {
        &self.signature.field_type
    }

    /// Returns true for static fields
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.attributes.contains(FieldAttributes::STATIC)
    }

    /// Description of the collection holding this field
    pub fn owner(&self) -> Option<String> {
        self.owner.owner()
    }
}

impl Owned for FieldDefinition {
    fn owner_slot(&self) -> &OwnerSlot {
        &self.owner
    }
}

impl std::fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("token", &self.token.get())
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .field("field_type", &self.signature.field_type.full_name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants() {
        assert_eq!(ConstantValue::i4(-2).as_i64(), Some(-2));
        assert_eq!(ConstantValue::i8(1 << 40).as_i64(), Some(1 << 40));
        assert_eq!(ConstantValue::bool(true).as_i64(), Some(1));
        assert_eq!(ConstantValue::string("hé").value, [b'h', 0x00, 0xE9, 0x00]);
        assert_eq!(ConstantValue::string("hé").as_string().as_deref(), Some("hé"));
        assert_eq!(ConstantValue::string("x").as_i64(), None);
        assert!(ConstantValue::null().is_null());
        assert_eq!(ConstantValue::r8(1.5).value.len(), 8);

        let short = ConstantValue {
            element_type: ELEMENT_TYPE::I2,
            value: vec![0xFE, 0xFF],
        };
        assert_eq!(short.as_i64(), Some(-2));
    }
}
