use std::fmt;

#[allow(non_snake_case, dead_code, missing_docs)]
/// Possible bytes that represent various 'Types' for a signature - from coreclr
pub mod ELEMENT_TYPE {
    //Marks end of a list
    pub const END: u8 = 0x00;
    pub const VOID: u8 = 0x01;
    pub const BOOLEAN: u8 = 0x02;
    pub const CHAR: u8 = 0x03;
    pub const I1: u8 = 0x04;
    pub const U1: u8 = 0x05;
    pub const I2: u8 = 0x06;
    pub const U2: u8 = 0x07;
    pub const I4: u8 = 0x08;
    pub const U4: u8 = 0x09;
    pub const I8: u8 = 0x0a;
    pub const U8: u8 = 0x0b;
    pub const R4: u8 = 0x0c;
    pub const R8: u8 = 0x0d;
    pub const STRING: u8 = 0x0e;
    // Followed by type
    pub const PTR: u8 = 0x0f;
    // Followed by type
    pub const BYREF: u8 = 0x10;
    // Followed by TypeDef or TypeRef token
    pub const VALUETYPE: u8 = 0x11;
    // Followed by TypeDef or TypeRef token
    pub const CLASS: u8 = 0x12;
    // Generic parameter in a generic type definition, represented as number
    pub const VAR: u8 = 0x13;
    // type rank boundsCount bound1 … loCount lo1 …
    pub const ARRAY: u8 = 0x14;
    // Generic type instantiation. Followed by type type-arg-count type-1 ... type-n
    pub const GENERICINST: u8 = 0x15;
    pub const TYPEDBYREF: u8 = 0x16;
    // System.IntPtr
    pub const I: u8 = 0x18;
    // System.UIntPtr
    pub const U: u8 = 0x19;
    // Followed by full method signature
    pub const FNPTR: u8 = 0x1b;
    // System.Object
    pub const OBJECT: u8 = 0x1c;
    // Single-dim array with 0 lower bound
    pub const SZARRAY: u8 = 0x1d;
    // Generic parameter in a generic method definition,represented as number
    pub const MVAR: u8 = 0x1e;
    // Required modifier : followed by a TypeDef or TypeRef token
    pub const CMOD_REQD: u8 = 0x1f;
    // Optional modifier : followed by a TypeDef or TypeRef token
    pub const CMOD_OPT: u8 = 0x20;
    // Implemented within the CLI
    pub const INTERNAL: u8 = 0x21;
    // Or’d with following element types
    pub const MODIFIER: u8 = 0x40;
    // Sentinel for vararg method signature
    pub const SENTINEL: u8 = 0x41;
    // Denotes a local variable that points at a pinned object
    pub const PINNED: u8 = 0x45;
}

/// A single dimension of an array
///
/// A dimension without bounds renders as nothing (`T[,]`), a bounded one as `lo...hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ArrayDimensions {
    /// The lowest index that can be used to access an element
    pub lower_bound: Option<i32>,
    /// The highest index that can be used to access an element
    pub upper_bound: Option<i32>,
}

impl ArrayDimensions {
    /// A dimension with both bounds set
    #[must_use]
    pub fn bounded(lower_bound: i32, upper_bound: i32) -> Self {
        ArrayDimensions {
            lower_bound: Some(lower_bound),
            upper_bound: Some(upper_bound),
        }
    }

    /// Returns true if either bound is set
    #[must_use]
    pub fn is_sized(&self) -> bool {
        self.lower_bound.is_some() || self.upper_bound.is_some()
    }
}

impl fmt::Display for ArrayDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_sized() {
            return Ok(());
        }

        if let Some(lower) = self.lower_bound {
            write!(f, "{lower}")?;
        }
        f.write_str("...")?;
        if let Some(upper) = self.upper_bound {
            write!(f, "{upper}")?;
        }
        Ok(())
    }
}

/// Identity of a referenced assembly, as stored in an `AssemblyRef` row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AssemblyName {
    /// Simple name, e.g. `mscorlib`
    pub name: String,
    /// Major version
    pub major_version: u16,
    /// Minor version
    pub minor_version: u16,
    /// Build number
    pub build_number: u16,
    /// Revision number
    pub revision_number: u16,
    /// Culture, empty for the neutral culture
    pub culture: String,
    /// `AssemblyFlags` of the reference
    pub flags: u32,
    /// Full public key or its 8 byte token, empty if the assembly is not strong named
    pub public_key_or_token: Vec<u8>,
}

impl AssemblyName {
    /// An unversioned reference to the assembly `name`
    #[must_use]
    pub fn new(name: &str) -> Self {
        AssemblyName {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

/// Where a named type lives, relative to the module referencing it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolutionScope {
    /// Defined in the module doing the referencing
    CurrentModule,
    /// Defined in another module of the same assembly
    ModuleRef(String),
    /// Defined in another assembly
    AssemblyRef(AssemblyName),
    /// Nested inside another type
    Nested(Box<NamedType>),
}

/// A class, interface or value type identified by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedType {
    /// Namespace, empty for nested types and the global namespace
    pub namespace: String,
    /// Simple name
    pub name: String,
    /// Where the type is defined
    pub scope: ResolutionScope,
    /// Encoded as `VALUETYPE` rather than `CLASS` in signatures
    pub is_value_type: bool,
}

impl NamedType {
    /// Creates a reference type named `namespace.name` in `scope`
    #[must_use]
    pub fn new(namespace: &str, name: &str, scope: ResolutionScope) -> Self {
        NamedType {
            namespace: namespace.to_string(),
            name: name.to_string(),
            scope,
            is_value_type: false,
        }
    }

    /// Creates a value type named `namespace.name` in `scope`
    #[must_use]
    pub fn value_type(namespace: &str, name: &str, scope: ResolutionScope) -> Self {
        NamedType {
            is_value_type: true,
            ..Self::new(namespace, name, scope)
        }
    }

    /// Creates a type nested inside `declaring`
    #[must_use]
    pub fn nested(declaring: NamedType, name: &str) -> Self {
        Self::new("", name, ResolutionScope::Nested(Box::new(declaring)))
    }

    /// The enclosing type, if this type is nested
    #[must_use]
    pub fn declaring_type(&self) -> Option<&NamedType> {
        match &self.scope {
            ResolutionScope::Nested(declaring) => Some(declaring),
            _ => None,
        }
    }

    /// The outermost enclosing type's scope
    #[must_use]
    pub fn root_scope(&self) -> &ResolutionScope {
        match &self.scope {
            ResolutionScope::Nested(declaring) => declaring.root_scope(),
            scope => scope,
        }
    }

    /// `Namespace.Name`, or `Outer/Inner` for nested types
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.scope {
            ResolutionScope::Nested(declaring) => {
                format!("{}/{}", declaring.full_name(), self.name)
            }
            _ if self.namespace.is_empty() => self.name.clone(),
            _ => format!("{}.{}", self.namespace, self.name),
        }
    }
}

/// Whether a generic parameter belongs to a type or to a method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericParameterKind {
    /// Declared by a type, `!n`
    Type,
    /// Declared by a method, `!!n`
    Method,
}

/// Reference to a generic parameter by position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenericParameterRef {
    /// Type or method parameter
    pub kind: GenericParameterKind,
    /// 0-based position in the owner's parameter list
    pub position: u32,
    /// Declared name, if known
    pub name: Option<String>,
}

impl GenericParameterRef {
    /// Unnamed type generic parameter `!position`
    #[must_use]
    pub fn type_parameter(position: u32) -> Self {
        GenericParameterRef {
            kind: GenericParameterKind::Type,
            position,
            name: None,
        }
    }

    /// Unnamed method generic parameter `!!position`
    #[must_use]
    pub fn method_parameter(position: u32) -> Self {
        GenericParameterRef {
            kind: GenericParameterKind::Method,
            position,
            name: None,
        }
    }

    /// The declared name, or `!n` / `!!n`
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.name, self.kind) {
            (Some(name), _) if !name.is_empty() => name.clone(),
            (_, GenericParameterKind::Type) => format!("!{}", self.position),
            (_, GenericParameterKind::Method) => format!("!!{}", self.position),
        }
    }
}
