//! Decoded custom attribute payloads.
//!
//! These types are self-contained values: a [`CustomAttributeValue`] holds no reference into the
//! blob it was decoded from and can be encoded back with
//! [`crate::metadata::customattributes::encode_custom_attribute_value`].

use crate::metadata::typesystem::TypeReference;

/// The payload of a custom attribute blob
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomAttributeValue {
    /// Constructor arguments, in parameter order
    pub fixed_args: Vec<CustomAttributeArgument>,
    /// Field and property assignments, in blob order
    pub named_args: Vec<CustomAttributeNamedArgument>,
}

impl CustomAttributeValue {
    /// Field assignments
    pub fn fields(&self) -> impl Iterator<Item = &CustomAttributeNamedArgument> {
        self.named_args.iter().filter(|arg| arg.is_field)
    }

    /// Property assignments
    pub fn properties(&self) -> impl Iterator<Item = &CustomAttributeNamedArgument> {
        self.named_args.iter().filter(|arg| !arg.is_field)
    }
}

/// A single custom attribute argument value
#[derive(Debug, Clone, PartialEq)]
pub enum CustomAttributeArgument {
    /// Boolean value
    Bool(bool),
    /// Character value (16-bit Unicode)
    Char(char),
    /// Signed 8-bit integer
    I1(i8),
    /// Unsigned 8-bit integer
    U1(u8),
    /// Signed 16-bit integer
    I2(i16),
    /// Unsigned 16-bit integer
    U2(u16),
    /// Signed 32-bit integer
    I4(i32),
    /// Unsigned 32-bit integer
    U4(u32),
    /// Signed 64-bit integer
    I8(i64),
    /// Unsigned 64-bit integer
    U8(u64),
    /// 32-bit floating point
    R4(f32),
    /// 64-bit floating point
    R8(f64),
    /// UTF-8 string, `None` for a null string
    String(Option<String>),
    /// Serialized type name, `None` for a null `System.Type`
    Type(Option<String>),
    /// Single dimensional array, `None` for a null array
    Array(Option<Vec<CustomAttributeArgument>>),
    /// Enum value: the serialized enum type name and the underlying integer
    Enum(String, Box<CustomAttributeArgument>),
    /// A value stored in a `System.Object` slot, with the type it was boxed as
    Boxed(TypeReference, Box<CustomAttributeArgument>),
}

/// A named argument (field or property) of a custom attribute
#[derive(Debug, Clone, PartialEq)]
pub struct CustomAttributeNamedArgument {
    /// Whether this is a field (true) or property (false)
    pub is_field: bool,
    /// Name of the field or property
    pub name: String,
    /// Declared type of the field or property
    pub arg_type: TypeReference,
    /// Value of the argument
    pub value: CustomAttributeArgument,
}

/// .NET `CorSerializationType` constants as defined in corhdr.h
#[allow(non_snake_case, missing_docs)]
pub mod SERIALIZATION_TYPE {
    pub const BOOLEAN: u8 = 0x02;
    pub const CHAR: u8 = 0x03;
    pub const I1: u8 = 0x04;
    pub const U1: u8 = 0x05;
    pub const I2: u8 = 0x06;
    pub const U2: u8 = 0x07;
    pub const I4: u8 = 0x08;
    pub const U4: u8 = 0x09;
    pub const I8: u8 = 0x0A;
    pub const U8: u8 = 0x0B;
    pub const R4: u8 = 0x0C;
    pub const R8: u8 = 0x0D;
    pub const STRING: u8 = 0x0E;
    pub const SZARRAY: u8 = 0x1D;
    pub const TYPE: u8 = 0x50;
    pub const TAGGED_OBJECT: u8 = 0x51;
    pub const FIELD: u8 = 0x53;
    pub const PROPERTY: u8 = 0x54;
    pub const ENUM: u8 = 0x55;
}
