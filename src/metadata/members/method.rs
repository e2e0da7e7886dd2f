use std::sync::Arc;

use crate::metadata::{
    customattributes::CustomAttributeList,
    members::{
        ConstantValue, GenericParameter, MethodAttributes, MethodImplAttributes, MethodReference,
        Owned, OwnedList, OwnerSlot, PInvokeAttributes, ParamAttributes, TokenCell,
    },
    security::SecurityDeclarationList,
    signatures::MethodSignature,
    typesystem::TypeReference,
};

/// A reference-counted pointer to a `MethodDefinition`
pub type MethodRc = Arc<MethodDefinition>;
/// A reference-counted pointer to a `ParameterDefinition`
pub type ParameterRc = Arc<ParameterDefinition>;

/// A `Param` row: name, flags and default value of one parameter.
///
/// Sequence 0 describes the return value; parameters are numbered from 1.
pub struct ParameterDefinition {
    /// `Param` token, assigned when read or written
    pub token: TokenCell,
    owner: OwnerSlot,
    /// Position, 0 for the return value
    pub sequence: u16,
    /// Parameter name
    pub name: String,
    /// `ParamAttributes`
    pub attributes: ParamAttributes,
    /// Default value (`Constant` table)
    pub constant: Option<ConstantValue>,
    /// Native type blob (`FieldMarshal` table)
    pub marshal: Option<Vec<u8>>,
    /// Custom attributes applied to the parameter
    pub custom_attributes: CustomAttributeList,
}

impl ParameterDefinition {
    /// Creates the parameter at `sequence`
    #[must_use]
    pub fn new(sequence: u16, name: &str, attributes: ParamAttributes) -> Self {
        ParameterDefinition {
            token: TokenCell::default(),
            owner: OwnerSlot::default(),
            sequence,
            name: name.to_string(),
            attributes,
            constant: None,
            marshal: None,
            custom_attributes: CustomAttributeList::new(),
        }
    }

    /// Description of the method holding this parameter
    pub fn owner(&self) -> Option<String> {
        self.owner.owner()
    }
}

impl Owned for ParameterDefinition {
    fn owner_slot(&self) -> &OwnerSlot {
        &self.owner
    }
}

impl std::fmt::Debug for ParameterDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterDefinition")
            .field("sequence", &self.sequence)
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .field("constant", &self.constant)
            .finish_non_exhaustive()
    }
}

/// Platform invoke mapping of a method (`ImplMap` table)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PInvokeInfo {
    /// `PInvokeAttributes`
    pub attributes: PInvokeAttributes,
    /// Name of the native entry point
    pub entry_point: String,
    /// Native library, a `ModuleRef` name
    pub module: String,
}

/// A method defined by a type
pub struct MethodDefinition {
    /// `MethodDef` token, assigned when read or written
    pub token: TokenCell,
    owner: OwnerSlot,
    /// Method name
    pub name: String,
    /// `MethodAttributes`
    pub attributes: MethodAttributes,
    /// `MethodImplAttributes`
    pub impl_attributes: MethodImplAttributes,
    /// The method signature
    pub signature: MethodSignature,
    /// Address of the method body, 0 for methods without one
    pub rva: u32,
    /// Parameter rows, in sequence order
    pub parameters: OwnedList<ParameterDefinition>,
    /// Generic parameters of a generic method
    pub generic_parameters: OwnedList<GenericParameter>,
    /// Native import, for `PInvokeImpl` methods
    pub pinvoke: Option<PInvokeInfo>,
    /// Interface or base methods this method implements explicitly (`MethodImpl` table)
    pub overrides: Vec<MethodReference>,
    /// Custom attributes applied to the method
    pub custom_attributes: CustomAttributeList,
    /// Security declarations of the method
    pub security_declarations: SecurityDeclarationList,
}

impl MethodDefinition {
    /// Creates a method with `signature`
    #[must_use]
    pub fn new(name: &str, attributes: MethodAttributes, signature: MethodSignature) -> Self {
        MethodDefinition {
            token: TokenCell::default(),
            owner: OwnerSlot::default(),
            name: name.to_string(),
            attributes,
            impl_attributes: MethodImplAttributes::empty(),
            signature,
            rva: 0,
            parameters: OwnedList::new(format!("parameters of {name}")),
            generic_parameters: OwnedList::new(format!("generic parameters of {name}")),
            pinvoke: None,
            overrides: Vec::new(),
            custom_attributes: CustomAttributeList::new(),
            security_declarations: SecurityDeclarationList::new(),
        }
    }

    /// Returns true for static methods
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.attributes.contains(MethodAttributes::STATIC)
    }

    /// Returns true for instance and static constructors
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.attributes.contains(MethodAttributes::RT_SPECIAL_NAME)
            && (self.name == ".ctor" || self.name == ".cctor")
    }

    /// The parameter row with `sequence`
    pub fn parameter(&self, sequence: u16) -> Option<ParameterRc> {
        self.parameters.find(|param| param.sequence == sequence)
    }

    /// A reference to this method as a member of `declaring_type`
    #[must_use]
    pub fn reference(&self, declaring_type: TypeReference) -> MethodReference {
        MethodReference::new(declaring_type, &self.name, self.signature.clone())
    }

    /// Description of the type holding this method
    pub fn owner(&self) -> Option<String> {
        self.owner.owner()
    }
}

impl Owned for MethodDefinition {
    fn owner_slot(&self) -> &OwnerSlot {
        &self.owner
    }
}

impl std::fmt::Debug for MethodDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDefinition")
            .field("token", &self.token.get())
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .field("signature", &self.signature)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metadata::typesystem::PrimitiveType, Error};

    #[test]
    fn parameters_belong_to_one_method() {
        let signature = MethodSignature::new(PrimitiveType::Void.into(), vec![PrimitiveType::I4.into()]);
        let first = MethodDefinition::new("First", MethodAttributes::PUBLIC, signature.clone());
        let second = MethodDefinition::new("Second", MethodAttributes::PUBLIC, signature);

        let value = Arc::new(ParameterDefinition::new(1, "value", ParamAttributes::empty()));
        first.parameters.add(value.clone()).unwrap();
        assert_eq!(value.owner().as_deref(), Some("parameters of First"));
        assert!(matches!(
            second.parameters.add(value.clone()),
            Err(Error::AlreadyOwned(_))
        ));

        assert!(first.parameters.remove(&value));
        second.parameters.add(value.clone()).unwrap();
        assert_eq!(second.parameter(1).unwrap().name, "value");
        assert!(first.parameter(1).is_none());
    }
}
