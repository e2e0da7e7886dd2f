use std::sync::Arc;

use crate::metadata::{
    customattributes::CustomAttributeList,
    members::{ConstantValue, MethodRc, Owned, OwnerSlot, PropertyAttributes, TokenCell},
    signatures::PropertySignature,
    typesystem::TypeReference,
};

/// A reference-counted pointer to a `PropertyDefinition`
pub type PropertyRc = Arc<PropertyDefinition>;

/// A property defined by a type, with its accessor methods
pub struct PropertyDefinition {
    /// `Property` token, assigned when read or written
    pub token: TokenCell,
    owner: OwnerSlot,
    /// Property name
    pub name: String,
    /// `PropertyAttributes`
    pub attributes: PropertyAttributes,
    /// Property type and index parameters
    pub signature: PropertySignature,
    /// Default value (`Constant` table)
    pub constant: Option<ConstantValue>,
    /// The `get` accessor
    pub getter: Option<MethodRc>,
    /// The `set` accessor
    pub setter: Option<MethodRc>,
    /// Further accessors marked `Other`
    pub other_methods: Vec<MethodRc>,
    /// Custom attributes applied to the property
    pub custom_attributes: CustomAttributeList,
}

impl PropertyDefinition {
    /// Creates an instance property of type `property_type` without accessors
    #[must_use]
    pub fn new(name: &str, attributes: PropertyAttributes, property_type: TypeReference) -> Self {
        PropertyDefinition {
            token: TokenCell::default(),
            owner: OwnerSlot::default(),
            name: name.to_string(),
            attributes,
            signature: PropertySignature {
                has_this: true,
                property_type,
                parameters: Vec::new(),
            },
            constant: None,
            getter: None,
            setter: None,
            other_methods: Vec::new(),
            custom_attributes: CustomAttributeList::new(),
        }
    }

    /// The property type
    #[must_use]
    pub fn property_type(&self) -> &TypeReference {
        &self.signature.property_type
    }

    /// Description of the type holding this property
    pub fn owner(&self) -> Option<String> {
        self.owner.owner()
    }
}

impl Owned for PropertyDefinition {
    fn owner_slot(&self) -> &OwnerSlot {
        &self.owner
    }
}

impl std::fmt::Debug for PropertyDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyDefinition")
            .field("token", &self.token.get())
            .field("name", &self.name)
            .field("property_type", &self.signature.property_type.full_name())
            .field("getter", &self.getter.as_ref().map(|method| &method.name))
            .field("setter", &self.setter.as_ref().map(|method| &method.name))
            .finish_non_exhaustive()
    }
}
