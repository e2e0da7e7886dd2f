use crate::metadata::typesystem::ELEMENT_TYPE;

/// Built-in types with their own `ELEMENT_TYPE` encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// System.Void - represents no value
    Void,
    /// System.Boolean - true/false value
    Boolean,
    /// System.Char - Unicode 16-bit character
    Char,
    /// System.SByte - signed 8-bit integer
    I1,
    /// System.Byte - unsigned 8-bit integer
    U1,
    /// System.Int16 - signed 16-bit integer
    I2,
    /// System.UInt16 - unsigned 16-bit integer
    U2,
    /// System.Int32 - signed 32-bit integer
    I4,
    /// System.UInt32 - unsigned 32-bit integer
    U4,
    /// System.Int64 - signed 64-bit integer
    I8,
    /// System.UInt64 - unsigned 64-bit integer
    U8,
    /// System.Single - 32-bit floating point
    R4,
    /// System.Double - 64-bit floating point
    R8,
    /// System.String - immutable string of Unicode characters
    String,
    /// System.TypedReference - type-safe pointer (used by compiler)
    TypedReference,
    /// System.IntPtr - native sized signed integer
    I,
    /// System.UIntPtr - native sized unsigned integer
    U,
    /// System.Object - base class for all reference types
    Object,
}

impl PrimitiveType {
    /// The `ELEMENT_TYPE` byte of this primitive
    #[must_use]
    pub fn element_type(&self) -> u8 {
        match self {
            PrimitiveType::Void => ELEMENT_TYPE::VOID,
            PrimitiveType::Boolean => ELEMENT_TYPE::BOOLEAN,
            PrimitiveType::Char => ELEMENT_TYPE::CHAR,
            PrimitiveType::I1 => ELEMENT_TYPE::I1,
            PrimitiveType::U1 => ELEMENT_TYPE::U1,
            PrimitiveType::I2 => ELEMENT_TYPE::I2,
            PrimitiveType::U2 => ELEMENT_TYPE::U2,
            PrimitiveType::I4 => ELEMENT_TYPE::I4,
            PrimitiveType::U4 => ELEMENT_TYPE::U4,
            PrimitiveType::I8 => ELEMENT_TYPE::I8,
            PrimitiveType::U8 => ELEMENT_TYPE::U8,
            PrimitiveType::R4 => ELEMENT_TYPE::R4,
            PrimitiveType::R8 => ELEMENT_TYPE::R8,
            PrimitiveType::String => ELEMENT_TYPE::STRING,
            PrimitiveType::TypedReference => ELEMENT_TYPE::TYPEDBYREF,
            PrimitiveType::I => ELEMENT_TYPE::I,
            PrimitiveType::U => ELEMENT_TYPE::U,
            PrimitiveType::Object => ELEMENT_TYPE::OBJECT,
        }
    }

    /// Maps an `ELEMENT_TYPE` byte back to its primitive, `None` for constructed types
    #[must_use]
    pub fn from_element_type(element_type: u8) -> Option<Self> {
        Some(match element_type {
            ELEMENT_TYPE::VOID => PrimitiveType::Void,
            ELEMENT_TYPE::BOOLEAN => PrimitiveType::Boolean,
            ELEMENT_TYPE::CHAR => PrimitiveType::Char,
            ELEMENT_TYPE::I1 => PrimitiveType::I1,
            ELEMENT_TYPE::U1 => PrimitiveType::U1,
            ELEMENT_TYPE::I2 => PrimitiveType::I2,
            ELEMENT_TYPE::U2 => PrimitiveType::U2,
            ELEMENT_TYPE::I4 => PrimitiveType::I4,
            ELEMENT_TYPE::U4 => PrimitiveType::U4,
            ELEMENT_TYPE::I8 => PrimitiveType::I8,
            ELEMENT_TYPE::U8 => PrimitiveType::U8,
            ELEMENT_TYPE::R4 => PrimitiveType::R4,
            ELEMENT_TYPE::R8 => PrimitiveType::R8,
            ELEMENT_TYPE::STRING => PrimitiveType::String,
            ELEMENT_TYPE::TYPEDBYREF => PrimitiveType::TypedReference,
            ELEMENT_TYPE::I => PrimitiveType::I,
            ELEMENT_TYPE::U => PrimitiveType::U,
            ELEMENT_TYPE::OBJECT => PrimitiveType::Object,
            _ => return None,
        })
    }

    /// Get the short name (without namespace)
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::Void => "Void",
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::Char => "Char",
            PrimitiveType::I1 => "SByte",
            PrimitiveType::U1 => "Byte",
            PrimitiveType::I2 => "Int16",
            PrimitiveType::U2 => "UInt16",
            PrimitiveType::I4 => "Int32",
            PrimitiveType::U4 => "UInt32",
            PrimitiveType::I8 => "Int64",
            PrimitiveType::U8 => "UInt64",
            PrimitiveType::R4 => "Single",
            PrimitiveType::R8 => "Double",
            PrimitiveType::String => "String",
            PrimitiveType::TypedReference => "TypedReference",
            PrimitiveType::I => "IntPtr",
            PrimitiveType::U => "UIntPtr",
            PrimitiveType::Object => "Object",
        }
    }

    /// Every primitive lives in `System`
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        "System"
    }

    /// Is this a value type
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        !matches!(
            self,
            PrimitiveType::Object | PrimitiveType::String | PrimitiveType::Void
        )
    }
}
