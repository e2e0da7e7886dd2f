use std::sync::Arc;

use crate::metadata::{
    customattributes::CustomAttributeList,
    members::{
        EventDefinition, FieldDefinition, GenericParameter, MethodDefinition, Owned, OwnedList,
        OwnerSlot, PropertyDefinition, TokenCell, TypeAttributes,
    },
    security::SecurityDeclarationList,
    typesystem::{NamedType, PrimitiveType, ResolutionScope, TypeReference},
};

/// A reference-counted pointer to a `TypeDefinition`
pub type TypeRc = Arc<TypeDefinition>;

/// Explicit layout of a type (`ClassLayout` table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeLayout {
    /// Field alignment, a power of two up to 128, or 0 for the default
    pub packing_size: u16,
    /// Size of the type in bytes, 0 to let the runtime decide
    pub class_size: u32,
}

/// A type defined by the module.
pub struct TypeDefinition {
    /// `TypeDef` token, assigned when read or written
    pub token: TokenCell,
    owner: OwnerSlot,
    /// Namespace, empty for nested types
    pub namespace: String,
    /// Simple name
    pub name: String,
    /// `TypeAttributes`
    pub attributes: TypeAttributes,
    /// The `extends` type, `None` for interfaces and `System.Object`
    pub base_type: Option<TypeReference>,
    /// Implemented interfaces (`InterfaceImpl` table)
    pub interfaces: Vec<TypeReference>,
    /// Fields, in declaration order
    pub fields: OwnedList<FieldDefinition>,
    /// Methods, in declaration order
    pub methods: OwnedList<MethodDefinition>,
    /// Properties, in declaration order
    pub properties: OwnedList<PropertyDefinition>,
    /// Events, in declaration order
    pub events: OwnedList<EventDefinition>,
    /// Types nested inside this one (`NestedClass` table)
    pub nested_types: OwnedList<TypeDefinition>,
    /// Generic parameters of a generic type
    pub generic_parameters: OwnedList<GenericParameter>,
    /// Explicit layout
    pub layout: Option<TypeLayout>,
    /// Custom attributes applied to the type
    pub custom_attributes: CustomAttributeList,
    /// Security declarations of the type
    pub security_declarations: SecurityDeclarationList,
}

impl TypeDefinition {
    /// Creates an empty type `namespace.name`
    #[must_use]
    pub fn new(namespace: &str, name: &str, attributes: TypeAttributes) -> Self {
        let full_name = if namespace.is_empty() {
            name.to_string()
        } else {
            format!("{namespace}.{name}")
        };

        TypeDefinition {
            token: TokenCell::default(),
            owner: OwnerSlot::default(),
            namespace: namespace.to_string(),
            name: name.to_string(),
            attributes,
            base_type: None,
            interfaces: Vec::new(),
            fields: OwnedList::new(format!("fields of {full_name}")),
            methods: OwnedList::new(format!("methods of {full_name}")),
            properties: OwnedList::new(format!("properties of {full_name}")),
            events: OwnedList::new(format!("events of {full_name}")),
            nested_types: OwnedList::new(format!("nested types of {full_name}")),
            generic_parameters: OwnedList::new(format!("generic parameters of {full_name}")),
            layout: None,
            custom_attributes: CustomAttributeList::new(),
            security_declarations: SecurityDeclarationList::new(),
        }
    }

    /// Creates a type deriving from `base_type`
    #[must_use]
    pub fn with_base(
        namespace: &str,
        name: &str,
        attributes: TypeAttributes,
        base_type: TypeReference,
    ) -> Self {
        TypeDefinition {
            base_type: Some(base_type),
            ..Self::new(namespace, name, attributes)
        }
    }

    /// Returns true if the type derives directly from `System.ValueType` or `System.Enum`
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        self.base_full_name()
            .is_some_and(|base| base == "System.ValueType" || base == "System.Enum")
    }

    /// Returns true if the type derives directly from `System.Enum`
    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.base_full_name()
            .is_some_and(|base| base == "System.Enum")
    }

    /// Returns true for interfaces
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.attributes.contains(TypeAttributes::INTERFACE)
    }

    /// The integer type of an enum, from the type of its instance field
    pub fn enum_underlying_type(&self) -> Option<PrimitiveType> {
        if !self.is_enum() {
            return None;
        }

        let field = self.fields.find(|field| !field.is_static())?;
        match field.field_type() {
            TypeReference::Primitive(primitive) => Some(*primitive),
            _ => None,
        }
    }

    /// The name of this type as referenced from its own module
    ///
    /// `declaring` is the enclosing type for nested types.
    #[must_use]
    pub fn named_type(&self, declaring: Option<NamedType>) -> NamedType {
        let mut named = match declaring {
            Some(declaring) => NamedType::nested(declaring, &self.name),
            None => NamedType::new(&self.namespace, &self.name, ResolutionScope::CurrentModule),
        };
        named.is_value_type = self.is_value_type();
        named
    }

    /// Description of the collection holding this type
    pub fn owner(&self) -> Option<String> {
        self.owner.owner()
    }

    fn base_full_name(&self) -> Option<String> {
        self.base_type.as_ref().map(TypeReference::full_name)
    }
}

impl Owned for TypeDefinition {
    fn owner_slot(&self) -> &OwnerSlot {
        &self.owner
    }
}

impl std::fmt::Debug for TypeDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDefinition")
            .field("token", &self.token.get())
            .field("namespace", &self.namespace)
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .field("base_type", &self.base_type.as_ref().map(TypeReference::full_name))
            .field("fields", &self.fields.len())
            .field("methods", &self.methods.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        members::FieldAttributes,
        typesystem::AssemblyName,
    };

    fn corlib(name: &str) -> TypeReference {
        TypeReference::class(
            "System",
            name,
            ResolutionScope::AssemblyRef(AssemblyName::new("mscorlib")),
        )
    }

    #[test]
    fn enum_underlying_type() {
        let color = TypeDefinition::with_base(
            "App",
            "Color",
            TypeAttributes::PUBLIC | TypeAttributes::SEALED,
            corlib("Enum"),
        );
        color
            .fields
            .add(Arc::new(FieldDefinition::new(
                "value__",
                FieldAttributes::PUBLIC | FieldAttributes::SPECIAL_NAME | FieldAttributes::RT_SPECIAL_NAME,
                PrimitiveType::U2.into(),
            )))
            .unwrap();

        assert!(color.is_enum());
        assert!(color.is_value_type());
        assert_eq!(color.enum_underlying_type(), Some(PrimitiveType::U2));
        assert!(color.named_type(None).is_value_type);
    }

    #[test]
    fn nested_naming() {
        let outer = TypeDefinition::with_base("App", "Outer", TypeAttributes::PUBLIC, corlib("Object"));
        let inner = Arc::new(TypeDefinition::with_base(
            "",
            "Inner",
            TypeAttributes::NESTED_PUBLIC,
            corlib("Object"),
        ));
        outer.nested_types.add(inner.clone()).unwrap();

        let named = inner.named_type(Some(outer.named_type(None)));
        assert_eq!(named.full_name(), "App.Outer/Inner");
        assert_eq!(inner.owner().as_deref(), Some("nested types of App.Outer"));
        assert!(!outer.is_value_type());
        assert_eq!(outer.enum_underlying_type(), None);
    }
}
