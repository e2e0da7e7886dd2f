use std::sync::Arc;

use crate::metadata::{
    customattributes::CustomAttributeList,
    members::{GenericParamAttributes, Owned, OwnerSlot, TokenCell},
    typesystem::TypeReference,
};

/// A reference-counted pointer to a `GenericParameter`
pub type GenericParameterRc = Arc<GenericParameter>;

/// A generic parameter declared by a type or a method
pub struct GenericParameter {
    /// `GenericParam` token, assigned when read or written
    pub token: TokenCell,
    owner: OwnerSlot,
    /// 0-based position in the owner's parameter list
    pub number: u16,
    /// Declared name, e.g. `T`
    pub name: String,
    /// `GenericParamAttributes`
    pub attributes: GenericParamAttributes,
    /// Base type and interface constraints (`GenericParamConstraint` table)
    pub constraints: Vec<TypeReference>,
    /// Custom attributes applied to the parameter
    pub custom_attributes: CustomAttributeList,
}

impl GenericParameter {
    /// Creates an unconstrained parameter
    #[must_use]
    pub fn new(number: u16, name: &str) -> Self {
        GenericParameter {
            token: TokenCell::default(),
            owner: OwnerSlot::default(),
            number,
            name: name.to_string(),
            attributes: GenericParamAttributes::empty(),
            constraints: Vec::new(),
            custom_attributes: CustomAttributeList::new(),
        }
    }

    /// Description of the type or method declaring this parameter
    pub fn owner(&self) -> Option<String> {
        self.owner.owner()
    }
}

impl Owned for GenericParameter {
    fn owner_slot(&self) -> &OwnerSlot {
        &self.owner
    }
}

impl std::fmt::Debug for GenericParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericParameter")
            .field("number", &self.number)
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .field("constraints", &self.constraints)
            .finish_non_exhaustive()
    }
}
