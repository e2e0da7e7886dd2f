//! Type definitions, their nesting and generic parameters.

use std::{collections::HashMap, sync::Arc};

use crate::{
    metadata::{
        loader::data::{narrow, LoaderData},
        members::{
            GenericParamAttributes, GenericParameter, ModuleDefinition, TypeAttributes,
            TypeDefinition, TypeLayout,
        },
        tables::{
            ClassLayoutRaw, CodedIndex, GenericParamConstraintRaw, GenericParamRaw,
            InterfaceImplRaw, TableId,
        },
        token::Token,
    },
    Error::TokenNotFound,
    Result,
};

/// Creates one [`TypeDefinition`] per `TypeDef` row, with its base type, interfaces and layout
pub(crate) fn load_types(data: &LoaderData) -> Result<()> {
    let mut interfaces: HashMap<u32, Vec<CodedIndex>> = HashMap::new();
    for row in data.rows::<InterfaceImplRaw>() {
        interfaces.entry(row.class).or_default().push(row.interface);
    }
    let layouts: HashMap<u32, ClassLayoutRaw> = data
        .rows::<ClassLayoutRaw>()
        .into_iter()
        .map(|row| (row.parent, row))
        .collect();

    for (index, row) in data.type_defs.iter().enumerate() {
        let rid = index as u32 + 1;
        let namespace = data.string(row.type_namespace)?;
        let name = data.string(row.type_name)?;

        let mut definition =
            TypeDefinition::new(&namespace, &name, TypeAttributes::from_bits_retain(row.flags));
        definition.base_type = data.type_def_or_ref(row.extends)?;
        for interface in interfaces.remove(&rid).unwrap_or_default() {
            if let Some(interface) = data.type_def_or_ref(interface)? {
                definition.interfaces.push(interface);
            }
        }
        if let Some(layout) = layouts.get(&rid) {
            definition.layout = Some(TypeLayout {
                packing_size: narrow(layout.packing_size)?,
                class_size: layout.class_size,
            });
        }

        definition.token.set(Token::from_parts(TableId::TypeDef, rid));
        data.types.insert(rid, Arc::new(definition));
    }
    Ok(())
}

/// Hangs every type off its enclosing type, or off `module` if it is not nested
pub(crate) fn attach_types(data: &LoaderData, module: &ModuleDefinition) -> Result<()> {
    for entry in data.types.iter() {
        let definition = entry.value().clone();
        match data.enclosing.get(entry.key()) {
            Some(enclosing) => {
                let parent = data
                    .types
                    .get(enclosing)
                    .ok_or(TokenNotFound(Token::from_parts(TableId::TypeDef, *enclosing)))?;
                parent.value().nested_types.add(definition)?;
            }
            None => {
                module.types.add(definition)?;
            }
        }
    }
    Ok(())
}

/// Creates the generic parameters and their constraints and adds them to their owners
pub(crate) fn load_generic_parameters(data: &LoaderData) -> Result<()> {
    let mut constraints: HashMap<u32, Vec<CodedIndex>> = HashMap::new();
    for row in data.rows::<GenericParamConstraintRaw>() {
        constraints.entry(row.owner).or_default().push(row.constraint);
    }

    for (index, row) in data.rows::<GenericParamRaw>().into_iter().enumerate() {
        let rid = index as u32 + 1;
        let mut parameter =
            GenericParameter::new(narrow(row.number)?, &data.string(row.name)?);
        parameter.attributes = GenericParamAttributes::from_bits_retain(row.flags);
        for constraint in constraints.remove(&rid).unwrap_or_default() {
            if let Some(constraint) = data.type_def_or_ref(constraint)? {
                parameter.constraints.push(constraint);
            }
        }
        parameter.token.set(Token::from_parts(TableId::GenericParam, rid));
        let parameter = Arc::new(parameter);

        let owner = row.owner;
        match owner.tag {
            TableId::TypeDef => {
                let Some(entry) = data.types.get(&owner.row) else {
                    return Err(TokenNotFound(owner.token));
                };
                entry.value().generic_parameters.add(parameter.clone())?;
            }
            TableId::MethodDef => {
                let Some(entry) = data.methods.get(&owner.row) else {
                    return Err(TokenNotFound(owner.token));
                };
                entry.value().generic_parameters.add(parameter.clone())?;
            }
            other => {
                return Err(malformed_error!(
                    "GenericParam {} is owned by a row of {:?}",
                    rid,
                    other
                ))
            }
        }
        data.generic_params.insert(rid, parameter);
    }
    Ok(())
}
