use std::fmt::{self, Write};

use crate::metadata::{
    signatures::MethodSignature,
    typesystem::{
        ArrayDimensions, GenericParameterKind, GenericParameterRef, NamedType, PrimitiveType,
        ResolutionScope, ELEMENT_TYPE,
    },
};

/// A reference to a type, as it appears in signatures and member declarations.
///
/// The first three variants name a type directly. Every other variant wraps exactly one
/// element type and adds one construction step on top of it. Names are derived from the
/// structure, so two references are equal exactly when they render and encode the same way.
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::typesystem::{ArrayDimensions, PrimitiveType, TypeReference};
///
/// let int = TypeReference::Primitive(PrimitiveType::I4);
/// let vector = TypeReference::vector(int.clone());
/// let matrix = TypeReference::array(int.clone(), 2);
/// let bounded = TypeReference::Array {
///     element: Box::new(int.clone()),
///     dimensions: vec![ArrayDimensions::bounded(2, 5)],
/// };
///
/// assert_eq!(vector.full_name(), "System.Int32[]");
/// assert_eq!(matrix.full_name(), "System.Int32[,]");
/// assert_eq!(bounded.full_name(), "System.Int32[2...5]");
/// assert!(vector.is_vector() && !bounded.is_vector());
/// assert_eq!(bounded.element_type(), &int);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeReference {
    /// A built-in type with its own element type byte
    Primitive(PrimitiveType),
    /// A class or value type from a `TypeDef` or `TypeRef` row
    Named(NamedType),
    /// A generic parameter of the enclosing type or method
    GenericParameter(GenericParameterRef),
    /// An array, `[]` for vectors or one entry per dimension otherwise
    Array {
        /// The element type
        element: Box<TypeReference>,
        /// One entry per dimension, a vector has a single unbounded one
        dimensions: Vec<ArrayDimensions>,
    },
    /// An unmanaged pointer, `*`
    Pointer(Box<TypeReference>),
    /// A managed reference, `&`
    ByReference(Box<TypeReference>),
    /// A pinned local variable
    Pinned(Box<TypeReference>),
    /// The first vararg parameter of a call site
    Sentinel(Box<TypeReference>),
    /// `element modreq(modifier)`
    RequiredModifier {
        /// The modifier type, usually a class from `System.Runtime.CompilerServices`
        modifier: Box<TypeReference>,
        /// The modified type
        element: Box<TypeReference>,
    },
    /// `element modopt(modifier)`
    OptionalModifier {
        /// The modifier type
        modifier: Box<TypeReference>,
        /// The modified type
        element: Box<TypeReference>,
    },
    /// A generic type with its arguments, `List<T>`
    GenericInstance {
        /// The open generic type
        element: Box<TypeReference>,
        /// The type arguments, in declaration order
        arguments: Vec<TypeReference>,
    },
    /// A method pointer
    FunctionPointer(Box<MethodSignature>),
}

impl TypeReference {
    /// Creates a reference type named `namespace.name`
    #[must_use]
    pub fn class(namespace: &str, name: &str, scope: ResolutionScope) -> Self {
        TypeReference::Named(NamedType::new(namespace, name, scope))
    }

    /// Creates a value type named `namespace.name`
    #[must_use]
    pub fn value_type(namespace: &str, name: &str, scope: ResolutionScope) -> Self {
        TypeReference::Named(NamedType::value_type(namespace, name, scope))
    }

    /// Single dimension, zero based array of `element`
    #[must_use]
    pub fn vector(element: TypeReference) -> Self {
        Self::array(element, 1)
    }

    /// Array of `element` with `rank` unbounded dimensions
    #[must_use]
    pub fn array(element: TypeReference, rank: usize) -> Self {
        TypeReference::Array {
            element: Box::new(element),
            dimensions: vec![ArrayDimensions::default(); rank.max(1)],
        }
    }

    /// Unmanaged pointer to `element`
    #[must_use]
    pub fn pointer(element: TypeReference) -> Self {
        TypeReference::Pointer(Box::new(element))
    }

    /// Managed reference to `element`
    #[must_use]
    pub fn by_reference(element: TypeReference) -> Self {
        TypeReference::ByReference(Box::new(element))
    }

    /// Pinned `element`
    #[must_use]
    pub fn pinned(element: TypeReference) -> Self {
        TypeReference::Pinned(Box::new(element))
    }

    /// Marks `element` as the first vararg parameter
    #[must_use]
    pub fn sentinel(element: TypeReference) -> Self {
        TypeReference::Sentinel(Box::new(element))
    }

    /// `element modreq(modifier)`
    #[must_use]
    pub fn required_modifier(modifier: TypeReference, element: TypeReference) -> Self {
        TypeReference::RequiredModifier {
            modifier: Box::new(modifier),
            element: Box::new(element),
        }
    }

    /// `element modopt(modifier)`
    #[must_use]
    pub fn optional_modifier(modifier: TypeReference, element: TypeReference) -> Self {
        TypeReference::OptionalModifier {
            modifier: Box::new(modifier),
            element: Box::new(element),
        }
    }

    /// `element<arguments>`
    #[must_use]
    pub fn generic_instance(element: TypeReference, arguments: Vec<TypeReference>) -> Self {
        TypeReference::GenericInstance {
            element: Box::new(element),
            arguments,
        }
    }

    /// Pointer to a method with `signature`
    #[must_use]
    pub fn function_pointer(signature: MethodSignature) -> Self {
        TypeReference::FunctionPointer(Box::new(signature))
    }

    /// The directly wrapped type, `None` for the non-wrapping variants
    #[must_use]
    pub fn inner(&self) -> Option<&TypeReference> {
        match self {
            TypeReference::Array { element, .. }
            | TypeReference::Pointer(element)
            | TypeReference::ByReference(element)
            | TypeReference::Pinned(element)
            | TypeReference::Sentinel(element)
            | TypeReference::RequiredModifier { element, .. }
            | TypeReference::OptionalModifier { element, .. }
            | TypeReference::GenericInstance { element, .. } => Some(element),
            TypeReference::Primitive(_)
            | TypeReference::Named(_)
            | TypeReference::GenericParameter(_)
            | TypeReference::FunctionPointer(_) => None,
        }
    }

    /// The innermost non-wrapping type
    ///
    /// Function pointers are their own element type.
    #[must_use]
    pub fn element_type(&self) -> &TypeReference {
        let mut current = self;
        while let Some(inner) = current.inner() {
            current = inner;
        }
        current
    }

    /// The short name, with the suffixes of arrays, pointers, references and modifiers
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            TypeReference::Primitive(primitive) => primitive.name().to_string(),
            TypeReference::Named(named) => named.name.clone(),
            TypeReference::GenericParameter(parameter) => parameter.display_name(),
            TypeReference::FunctionPointer(_) => "method".to_string(),
            TypeReference::Pinned(element)
            | TypeReference::Sentinel(element)
            | TypeReference::GenericInstance { element, .. } => element.name(),
            _ => {
                let mut name = self.inner().map(TypeReference::name).unwrap_or_default();
                self.write_suffix(&mut name);
                name
            }
        }
    }

    /// The fully qualified name
    ///
    /// Nested types render as `Outer/Inner`, generic instances as `List`1<System.Int32>`.
    #[must_use]
    pub fn full_name(&self) -> String {
        match self {
            TypeReference::Primitive(primitive) => {
                format!("{}.{}", primitive.namespace(), primitive.name())
            }
            TypeReference::Named(named) => named.full_name(),
            TypeReference::GenericParameter(parameter) => parameter.display_name(),
            TypeReference::FunctionPointer(signature) => {
                let mut name = format!("method {} *", signature.return_type.full_name());
                signature.write_parameter_list(&mut name);
                name
            }
            TypeReference::Pinned(element) | TypeReference::Sentinel(element) => {
                element.full_name()
            }
            TypeReference::GenericInstance { element, arguments } => {
                let mut name = element.full_name();
                name.push('<');
                for (index, argument) in arguments.iter().enumerate() {
                    if index > 0 {
                        name.push(',');
                    }
                    name.push_str(&argument.full_name());
                }
                name.push('>');
                name
            }
            _ => {
                let mut name = self.inner().map(TypeReference::full_name).unwrap_or_default();
                self.write_suffix(&mut name);
                name
            }
        }
    }

    fn write_suffix(&self, out: &mut String) {
        match self {
            TypeReference::Array { dimensions, .. } => {
                if self.is_vector() {
                    out.push_str("[]");
                    return;
                }

                out.push('[');
                for (index, dimension) in dimensions.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    let _ = write!(out, "{dimension}");
                }
                out.push(']');
            }
            TypeReference::Pointer(_) => out.push('*'),
            TypeReference::ByReference(_) => out.push('&'),
            TypeReference::RequiredModifier { modifier, .. } => {
                let _ = write!(out, " modreq({})", modifier.full_name());
            }
            TypeReference::OptionalModifier { modifier, .. } => {
                let _ = write!(out, " modopt({})", modifier.full_name());
            }
            _ => {}
        }
    }

    /// The namespace of the innermost named type, empty for generic parameters and function
    /// pointers
    #[must_use]
    pub fn namespace(&self) -> String {
        match self.element_type() {
            TypeReference::Primitive(primitive) => primitive.namespace().to_string(),
            TypeReference::Named(named) => named.namespace.clone(),
            _ => String::new(),
        }
    }

    /// Returns true if values of this type are stored inline
    ///
    /// Arrays, pointers, references and function pointers never are. Other wrappers follow
    /// their element.
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        match self {
            TypeReference::Primitive(primitive) => primitive.is_value_type(),
            TypeReference::Named(named) => named.is_value_type,
            TypeReference::GenericParameter(_)
            | TypeReference::Array { .. }
            | TypeReference::Pointer(_)
            | TypeReference::ByReference(_)
            | TypeReference::FunctionPointer(_) => false,
            TypeReference::Pinned(element)
            | TypeReference::Sentinel(element)
            | TypeReference::RequiredModifier { element, .. }
            | TypeReference::OptionalModifier { element, .. }
            | TypeReference::GenericInstance { element, .. } => element.is_value_type(),
        }
    }

    /// Returns true for a single dimension array without bounds
    #[must_use]
    pub fn is_vector(&self) -> bool {
        match self {
            TypeReference::Array { dimensions, .. } => match dimensions.as_slice() {
                [] => true,
                [dimension] => !dimension.is_sized(),
                _ => false,
            },
            _ => false,
        }
    }

    /// Returns true if a generic parameter appears anywhere in this reference
    #[must_use]
    pub fn contains_generic_parameter(&self) -> bool {
        match self {
            TypeReference::Primitive(_) | TypeReference::Named(_) => false,
            TypeReference::GenericParameter(_) => true,
            TypeReference::GenericInstance { element, arguments } => {
                element.contains_generic_parameter()
                    || arguments.iter().any(TypeReference::contains_generic_parameter)
            }
            TypeReference::RequiredModifier { modifier, element }
            | TypeReference::OptionalModifier { modifier, element } => {
                modifier.contains_generic_parameter() || element.contains_generic_parameter()
            }
            TypeReference::FunctionPointer(signature) => {
                signature.return_type.contains_generic_parameter()
                    || signature
                        .parameters
                        .iter()
                        .any(TypeReference::contains_generic_parameter)
            }
            TypeReference::Array { element, .. }
            | TypeReference::Pointer(element)
            | TypeReference::ByReference(element)
            | TypeReference::Pinned(element)
            | TypeReference::Sentinel(element) => element.contains_generic_parameter(),
        }
    }

    /// The `ELEMENT_TYPE` byte that introduces this reference in a signature
    #[must_use]
    pub fn element_type_code(&self) -> u8 {
        match self {
            TypeReference::Primitive(primitive) => primitive.element_type(),
            TypeReference::Named(named) if named.is_value_type => ELEMENT_TYPE::VALUETYPE,
            TypeReference::Named(_) => ELEMENT_TYPE::CLASS,
            TypeReference::GenericParameter(parameter) => match parameter.kind {
                GenericParameterKind::Type => ELEMENT_TYPE::VAR,
                GenericParameterKind::Method => ELEMENT_TYPE::MVAR,
            },
            TypeReference::Array { .. } if self.is_vector() => ELEMENT_TYPE::SZARRAY,
            TypeReference::Array { .. } => ELEMENT_TYPE::ARRAY,
            TypeReference::Pointer(_) => ELEMENT_TYPE::PTR,
            TypeReference::ByReference(_) => ELEMENT_TYPE::BYREF,
            TypeReference::Pinned(_) => ELEMENT_TYPE::PINNED,
            TypeReference::Sentinel(_) => ELEMENT_TYPE::SENTINEL,
            TypeReference::RequiredModifier { .. } => ELEMENT_TYPE::CMOD_REQD,
            TypeReference::OptionalModifier { .. } => ELEMENT_TYPE::CMOD_OPT,
            TypeReference::GenericInstance { .. } => ELEMENT_TYPE::GENERICINST,
            TypeReference::FunctionPointer(_) => ELEMENT_TYPE::FNPTR,
        }
    }

    /// Returns true for references that need a `TypeSpec` row to be used as a token
    #[must_use]
    pub fn is_type_specification(&self) -> bool {
        !matches!(self, TypeReference::Named(_))
    }

    /// The named type, if this is a plain `Named` reference
    #[must_use]
    pub fn as_named(&self) -> Option<&NamedType> {
        match self {
            TypeReference::Named(named) => Some(named),
            _ => None,
        }
    }
}

impl From<PrimitiveType> for TypeReference {
    fn from(primitive: PrimitiveType) -> Self {
        TypeReference::Primitive(primitive)
    }
}

impl From<NamedType> for TypeReference {
    fn from(named: NamedType) -> Self {
        TypeReference::Named(named)
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}
