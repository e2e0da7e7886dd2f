use crate::metadata::typesystem::TypeReference;

#[allow(non_snake_case, dead_code, missing_docs)]
/// Leading bytes of the signature blobs (ECMA-335 II.23.2)
pub mod SIGNATURE_HEADER {
    pub const GENERIC: u8 = 0x10;
    pub const HAS_THIS: u8 = 0x20;
    pub const EXPLICIT_THIS: u8 = 0x40;
    pub const FIELD: u8 = 0x06;
    pub const LOCAL_SIG: u8 = 0x07;
    pub const PROPERTY: u8 = 0x08;
    pub const GENERIC_INST: u8 = 0x0A;
    pub const CALLING_CONVENTION_MASK: u8 = 0x0F;
}

/// Calling convention of a method signature, the low nibble of its first byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CallingConvention {
    /// Managed calling convention
    #[default]
    Default,
    /// Unmanaged `cdecl`
    C,
    /// Unmanaged `stdcall`
    StdCall,
    /// Unmanaged `thiscall`
    ThisCall,
    /// Unmanaged `fastcall`
    FastCall,
    /// Managed, with a variable argument list
    VarArg,
    /// Unmanaged, the actual convention is given by modifiers
    Unmanaged,
}

impl CallingConvention {
    /// The low nibble of the signature's first byte
    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            CallingConvention::Default => 0x0,
            CallingConvention::C => 0x1,
            CallingConvention::StdCall => 0x2,
            CallingConvention::ThisCall => 0x3,
            CallingConvention::FastCall => 0x4,
            CallingConvention::VarArg => 0x5,
            CallingConvention::Unmanaged => 0x9,
        }
    }

    /// Decodes the low nibble of a signature's first byte
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte & SIGNATURE_HEADER::CALLING_CONVENTION_MASK {
            0x0 => CallingConvention::Default,
            0x1 => CallingConvention::C,
            0x2 => CallingConvention::StdCall,
            0x3 => CallingConvention::ThisCall,
            0x4 => CallingConvention::FastCall,
            0x5 => CallingConvention::VarArg,
            0x9 => CallingConvention::Unmanaged,
            _ => return None,
        })
    }
}

/// `MethodDefSig`, `MethodRefSig` and `StandAloneMethodSig`
///
/// Custom modifiers and by-ref markers are part of the parameter types. In vararg call sites the
/// first extra argument is wrapped in [`TypeReference::Sentinel`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    /// Instance method, `this` is passed as hidden first argument
    pub has_this: bool,
    /// `this` is listed explicitly as first parameter
    pub explicit_this: bool,
    /// The calling convention
    pub calling_convention: CallingConvention,
    /// Number of generic parameters of a generic method, 0 otherwise
    pub generic_parameter_count: u32,
    /// The return type, `System.Void` for none
    pub return_type: TypeReference,
    /// Parameter types in declaration order
    pub parameters: Vec<TypeReference>,
}

impl MethodSignature {
    /// Static, managed, non-generic signature
    #[must_use]
    pub fn new(return_type: TypeReference, parameters: Vec<TypeReference>) -> Self {
        MethodSignature {
            has_this: false,
            explicit_this: false,
            calling_convention: CallingConvention::Default,
            generic_parameter_count: 0,
            return_type,
            parameters,
        }
    }

    /// Same signature with `has_this` set
    #[must_use]
    pub fn instance(mut self) -> Self {
        self.has_this = true;
        self
    }

    /// Index of the first vararg parameter
    #[must_use]
    pub fn sentinel_position(&self) -> Option<usize> {
        self.parameters
            .iter()
            .position(|parameter| matches!(parameter, TypeReference::Sentinel(_)))
    }

    /// Writes `(P1,P2)`, prefixing the first vararg parameter with `...,`
    pub(crate) fn write_parameter_list(&self, out: &mut String) {
        out.push('(');
        for (index, parameter) in self.parameters.iter().enumerate() {
            if index > 0 {
                out.push(',');
            }
            if matches!(parameter, TypeReference::Sentinel(_)) {
                out.push_str("...,");
            }
            out.push_str(&parameter.full_name());
        }
        out.push(')');
    }
}

/// `FieldSig`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSignature {
    /// Type of the field, including its custom modifiers
    pub field_type: TypeReference,
}

/// `PropertySig`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertySignature {
    /// Instance property
    pub has_this: bool,
    /// Type of the property
    pub property_type: TypeReference,
    /// Index parameters
    pub parameters: Vec<TypeReference>,
}

/// `LocalVarSig`
///
/// Pinned locals are wrapped in [`TypeReference::Pinned`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct LocalVariablesSignature {
    /// Local variable types in slot order
    pub locals: Vec<TypeReference>,
}

/// `MethodSpec` instantiation blob
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSpecSignature {
    /// Generic arguments, in parameter order
    pub arguments: Vec<TypeReference>,
}
