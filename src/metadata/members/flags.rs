//! Attribute flag sets of the member rows (ECMA-335 II.23.1).
//!
//! Every set is a plain `u32` bitmask; values read from an image are kept with
//! `from_bits_retain` so that unknown and reserved bits survive a round trip.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// `TypeAttributes`, §II.23.1.15
    pub struct TypeAttributes: u32 {
        /// Class has public scope
        const PUBLIC = 0x0000_0001;
        /// Nested with public visibility
        const NESTED_PUBLIC = 0x0000_0002;
        /// Nested with private visibility
        const NESTED_PRIVATE = 0x0000_0003;
        /// Nested with family visibility
        const NESTED_FAMILY = 0x0000_0004;
        /// Nested with assembly visibility
        const NESTED_ASSEMBLY = 0x0000_0005;
        /// Nested with family and assembly visibility
        const NESTED_FAM_AND_ASSEM = 0x0000_0006;
        /// Nested with family or assembly visibility
        const NESTED_FAM_OR_ASSEM = 0x0000_0007;
        /// Fields are laid out sequentially
        const SEQUENTIAL_LAYOUT = 0x0000_0008;
        /// Layout is supplied explicitly
        const EXPLICIT_LAYOUT = 0x0000_0010;
        /// Type is an interface
        const INTERFACE = 0x0000_0020;
        /// Class is abstract
        const ABSTRACT = 0x0000_0080;
        /// Class cannot be extended
        const SEALED = 0x0000_0100;
        /// Class name is special
        const SPECIAL_NAME = 0x0000_0400;
        /// Class is imported
        const IMPORT = 0x0000_1000;
        /// Class is serializable
        const SERIALIZABLE = 0x0000_2000;
        /// `LPSTR` is interpreted as UNICODE
        const UNICODE_CLASS = 0x0001_0000;
        /// `LPSTR` is interpreted automatically
        const AUTO_CLASS = 0x0002_0000;
        /// Initialize the class before the first static field access
        const BEFORE_FIELD_INIT = 0x0010_0000;
        /// The runtime checks the name encoding
        const RT_SPECIAL_NAME = 0x0000_0800;
        /// Class has security associated with it
        const HAS_SECURITY = 0x0004_0000;
    }
}

impl TypeAttributes {
    /// Visibility bits
    pub const VISIBILITY_MASK: u32 = 0x0000_0007;

    /// Returns true if the visibility bits mark a nested type
    #[must_use]
    pub fn is_nested(self) -> bool {
        self.bits() & Self::VISIBILITY_MASK > 1
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// `FieldAttributes`, §II.23.1.5
    pub struct FieldAttributes: u32 {
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by sub-types only in this assembly
        const FAM_AND_ASSEM = 0x0002;
        /// Accessible by anyone in the assembly
        const ASSEMBLY = 0x0003;
        /// Accessible only by type and sub-types
        const FAMILY = 0x0004;
        /// Accessible by sub-types anywhere, plus anyone in the assembly
        const FAM_OR_ASSEM = 0x0005;
        /// Accessible by anyone
        const PUBLIC = 0x0006;
        /// Defined on the type, else per instance
        const STATIC = 0x0010;
        /// Can only be initialized, not written to after init
        const INIT_ONLY = 0x0020;
        /// Value is a compile time constant
        const LITERAL = 0x0040;
        /// Not serialized when the type is remoted
        const NOT_SERIALIZED = 0x0080;
        /// Field is special
        const SPECIAL_NAME = 0x0200;
        /// Implementation is forwarded through `PInvoke`
        const PINVOKE_IMPL = 0x2000;
        /// The runtime checks the name encoding
        const RT_SPECIAL_NAME = 0x0400;
        /// Field has marshalling information
        const HAS_FIELD_MARSHAL = 0x1000;
        /// Field has a default value
        const HAS_DEFAULT = 0x8000;
        /// Field has an RVA
        const HAS_FIELD_RVA = 0x0100;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// `MethodAttributes`, §II.23.1.10
    pub struct MethodAttributes: u32 {
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by sub-types only in this assembly
        const FAM_AND_ASSEM = 0x0002;
        /// Accessible by anyone in the assembly
        const ASSEMBLY = 0x0003;
        /// Accessible only by type and sub-types
        const FAMILY = 0x0004;
        /// Accessible by sub-types anywhere, plus anyone in the assembly
        const FAM_OR_ASSEM = 0x0005;
        /// Accessible by anyone
        const PUBLIC = 0x0006;
        /// Defined on the type, else per instance
        const STATIC = 0x0010;
        /// Method cannot be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method hides by name and signature, else just by name
        const HIDE_BY_SIG = 0x0080;
        /// Method always gets a new slot in the vtable
        const NEW_SLOT = 0x0100;
        /// Method can only be overridden if also accessible
        const STRICT = 0x0200;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0400;
        /// Method is special
        const SPECIAL_NAME = 0x0800;
        /// Implementation is forwarded through `PInvoke`
        const PINVOKE_IMPL = 0x2000;
        /// Reserved: shall be zero for conforming implementations
        const UNMANAGED_EXPORT = 0x0008;
        /// The runtime checks the name encoding
        const RT_SPECIAL_NAME = 0x1000;
        /// Method has security associated with it
        const HAS_SECURITY = 0x4000;
        /// Method calls another method containing security code
        const REQUIRE_SEC_OBJECT = 0x8000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// `MethodImplAttributes`, §II.23.1.11
    pub struct MethodImplAttributes: u32 {
        /// Method implementation is native
        const NATIVE = 0x0001;
        /// Method implementation is OPTIL
        const OPTIL = 0x0002;
        /// Method implementation is provided by the runtime
        const RUNTIME = 0x0003;
        /// Method implementation is unmanaged
        const UNMANAGED = 0x0004;
        /// Method cannot be inlined
        const NO_INLINING = 0x0008;
        /// Method is defined, used primarily in merge scenarios
        const FORWARD_REF = 0x0010;
        /// Method is single threaded through the body
        const SYNCHRONIZED = 0x0020;
        /// Method will not be optimized when generating native code
        const NO_OPTIMIZATION = 0x0040;
        /// Method signature is exported exactly as declared
        const PRESERVE_SIG = 0x0080;
        /// Method should be inlined if possible
        const AGGRESSIVE_INLINING = 0x0100;
        /// Reserved for internal use
        const INTERNAL_CALL = 0x1000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// `ParamAttributes`, §II.23.1.13
    pub struct ParamAttributes: u32 {
        /// Param is `[In]`
        const IN = 0x0001;
        /// Param is `[Out]`
        const OUT = 0x0002;
        /// Param is optional
        const OPTIONAL = 0x0010;
        /// Param has a default value
        const HAS_DEFAULT = 0x1000;
        /// Param has marshalling information
        const HAS_FIELD_MARSHAL = 0x2000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// `PropertyAttributes`, §II.23.1.14
    pub struct PropertyAttributes: u32 {
        /// Property is special
        const SPECIAL_NAME = 0x0200;
        /// The runtime checks the name encoding
        const RT_SPECIAL_NAME = 0x0400;
        /// Property has a default value
        const HAS_DEFAULT = 0x1000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// `EventAttributes`, §II.23.1.4
    pub struct EventAttributes: u32 {
        /// Event is special
        const SPECIAL_NAME = 0x0200;
        /// The runtime checks the name encoding
        const RT_SPECIAL_NAME = 0x0400;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// `MethodSemanticsAttributes`, §II.23.1.12
    pub struct MethodSemanticsAttributes: u32 {
        /// Setter for property
        const SETTER = 0x0001;
        /// Getter for property
        const GETTER = 0x0002;
        /// Other method for property or event
        const OTHER = 0x0004;
        /// `AddOn` method for event
        const ADD_ON = 0x0008;
        /// `RemoveOn` method for event
        const REMOVE_ON = 0x0010;
        /// Fire method for event
        const FIRE = 0x0020;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// `GenericParamAttributes`, §II.23.1.7
    pub struct GenericParamAttributes: u32 {
        /// Covariant (`out T`)
        const COVARIANT = 0x0001;
        /// Contravariant (`in T`)
        const CONTRAVARIANT = 0x0002;
        /// Must be a reference type
        const REFERENCE_TYPE_CONSTRAINT = 0x0004;
        /// Must be a non-nullable value type
        const NOT_NULLABLE_VALUE_TYPE_CONSTRAINT = 0x0008;
        /// Must have a public parameterless constructor
        const DEFAULT_CONSTRUCTOR_CONSTRAINT = 0x0010;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// `PInvokeAttributes`, §II.23.1.8
    pub struct PInvokeAttributes: u32 {
        /// Use the member name as specified
        const NO_MANGLE = 0x0001;
        /// Marshal strings as ANSI
        const CHAR_SET_ANSI = 0x0002;
        /// Marshal strings as UNICODE
        const CHAR_SET_UNICODE = 0x0004;
        /// Marshal strings automatically
        const CHAR_SET_AUTO = 0x0006;
        /// The callee sets the last error
        const SUPPORTS_LAST_ERROR = 0x0040;
        /// `winapi` calling convention
        const CALL_CONV_WINAPI = 0x0100;
        /// `cdecl` calling convention
        const CALL_CONV_CDECL = 0x0200;
        /// `stdcall` calling convention
        const CALL_CONV_STDCALL = 0x0300;
        /// `thiscall` calling convention
        const CALL_CONV_THISCALL = 0x0400;
        /// `fastcall` calling convention
        const CALL_CONV_FASTCALL = 0x0500;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// `AssemblyFlags`, §II.23.1.2
    pub struct AssemblyFlags: u32 {
        /// The assembly reference holds the full public key
        const PUBLIC_KEY = 0x0001;
        /// The implementation of this assembly used at runtime is not expected to match the
        /// version seen at compile time
        const RETARGETABLE = 0x0100;
        /// Reserved
        const DISABLE_JIT_COMPILE_OPTIMIZER = 0x4000;
        /// Reserved
        const ENABLE_JIT_COMPILE_TRACKING = 0x8000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retains_unknown_bits() {
        let flags = MethodAttributes::from_bits_retain(0x0001_0086);
        assert!(flags.contains(MethodAttributes::PUBLIC));
        assert!(flags.contains(MethodAttributes::HIDE_BY_SIG));
        assert_eq!(flags.bits(), 0x0001_0086);
    }

    #[test]
    fn nested_visibility() {
        assert!(!TypeAttributes::PUBLIC.is_nested());
        assert!(!TypeAttributes::empty().is_nested());
        assert!(TypeAttributes::NESTED_PRIVATE.is_nested());
        assert!((TypeAttributes::NESTED_PUBLIC | TypeAttributes::SEALED).is_nested());
    }
}
