//! Custom attributes and security declarations.
//!
//! Both are created undecoded: each keeps the heap offset of its blob and is decoded through
//! the module context on first access.

use std::{collections::HashMap, sync::Arc};

use crossbeam_skiplist::SkipMap;

use crate::{
    metadata::{
        customattributes::{CustomAttribute, SharedEnumLookup},
        lazy::BlobSource,
        loader::data::LoaderData,
        members::ModuleDefinition,
        security::{SecurityAction, SecurityDeclaration},
        tables::{CustomAttributeRaw, DeclSecurityRaw, TableId},
        typesystem::{NamedType, PrimitiveType, ResolutionScope},
    },
    Result,
};

/// Underlying types of the enums defined by the module, keyed by full name.
///
/// Must run after the fields are loaded, the underlying type comes from the instance field.
pub(crate) fn enum_lookup(data: &LoaderData) -> SharedEnumLookup {
    let enums: HashMap<String, PrimitiveType> = data
        .types
        .iter()
        .filter_map(|entry| {
            let underlying = entry.value().enum_underlying_type()?;
            let named = data.type_names.get(*entry.key() as usize - 1)?;
            Some((named.full_name(), underlying))
        })
        .collect();

    Arc::new(move |named: &NamedType| {
        if !matches!(named.root_scope(), ResolutionScope::CurrentModule) {
            return None;
        }
        enums.get(&named.full_name()).copied()
    })
}

pub(crate) fn load_custom_attributes(
    data: &LoaderData,
    module: &ModuleDefinition,
    enums: &SharedEnumLookup,
) -> Result<()> {
    for row in data.rows::<CustomAttributeRaw>() {
        let constructor = data.method_reference(row.constructor)?;
        let attribute = Arc::new(CustomAttribute::from_blob(
            data.context.clone(),
            constructor,
            BlobSource::Heap(row.value),
            Some(enums.clone()),
        ));

        let parent = row.parent;
        let rid = parent.row;
        let attached = match parent.tag {
            TableId::Module => {
                module.custom_attributes.push(attribute);
                true
            }
            TableId::Assembly => module
                .assembly
                .as_ref()
                .map(|assembly| assembly.custom_attributes.push(attribute))
                .is_some(),
            TableId::TypeDef => attach(&data.types, rid, |t| t.custom_attributes.push(attribute)),
            TableId::Field => attach(&data.fields, rid, |f| f.custom_attributes.push(attribute)),
            TableId::MethodDef => {
                attach(&*data.methods, rid, |m| m.custom_attributes.push(attribute))
            }
            TableId::Param => attach(&data.params, rid, |p| p.custom_attributes.push(attribute)),
            TableId::Property => {
                attach(&data.properties, rid, |p| p.custom_attributes.push(attribute))
            }
            TableId::Event => attach(&data.events, rid, |e| e.custom_attributes.push(attribute)),
            TableId::GenericParam => {
                attach(&data.generic_params, rid, |g| g.custom_attributes.push(attribute))
            }
            _ => false,
        };
        if !attached {
            log::debug!("Skipping custom attribute on {:?}", parent.token);
        }
    }
    Ok(())
}

pub(crate) fn load_security_declarations(
    data: &LoaderData,
    module: &ModuleDefinition,
) -> Result<()> {
    for row in data.rows::<DeclSecurityRaw>() {
        #[allow(clippy::cast_possible_truncation)]
        let action = SecurityAction::from(row.action as u16);
        let declaration = Arc::new(SecurityDeclaration::from_blob(
            data.context.clone(),
            action,
            BlobSource::Heap(row.permission_set),
        ));

        let parent = row.parent;
        let attached = match parent.tag {
            TableId::Assembly => module
                .assembly
                .as_ref()
                .map(|assembly| assembly.security_declarations.push(declaration))
                .is_some(),
            TableId::TypeDef => attach(&data.types, parent.row, |t| {
                t.security_declarations.push(declaration)
            }),
            TableId::MethodDef => attach(&*data.methods, parent.row, |m| {
                m.security_declarations.push(declaration)
            }),
            _ => false,
        };
        if !attached {
            log::debug!("Skipping security declaration on {:?}", parent.token);
        }
    }
    Ok(())
}

/// Runs `push` on the entity at `rid`, returning false if there is none
fn attach<T, R>(map: &SkipMap<u32, Arc<T>>, rid: u32, push: impl FnOnce(&T) -> R) -> bool {
    map.get(&rid).map(|entry| push(entry.value())).is_some()
}
