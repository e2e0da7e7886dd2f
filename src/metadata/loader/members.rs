//! Fields, methods, parameters, properties and events.
//!
//! Members are created in row order and added to the type whose list column covers them.
//! Property accessors are resolved while loading; event accessors are left to a resolver that
//! reads the `MethodSemantics` rows on first access.

use std::{collections::HashMap, sync::Arc};

use crossbeam_skiplist::SkipMap;

use crate::{
    metadata::{
        loader::data::{list_ranges, narrow, row_of, LoaderData},
        members::{
            EventAccessors, EventAttributes, EventDefinition, FieldAttributes, FieldDefinition,
            MethodAttributes, MethodDefinition, MethodImplAttributes, MethodRc,
            MethodSemanticsAttributes, PInvokeAttributes, PInvokeInfo, ParamAttributes,
            ParameterDefinition, PropertyAttributes, PropertyDefinition, TypeRc,
        },
        tables::{
            CodedIndex, EventMapRaw, EventRaw, FieldLayoutRaw, FieldRaw, FieldRvaRaw, ImplMapRaw,
            MethodDefRaw, MethodImplRaw, MethodSemanticsRaw, ParamRaw, PropertyMapRaw,
            PropertyRaw, TableId,
        },
        token::Token,
    },
    Error::TokenNotFound,
    Result,
};

pub(crate) fn load_fields(data: &LoaderData) -> Result<()> {
    let rows: Vec<FieldRaw> = data.rows();
    let offsets: HashMap<u32, u32> = data
        .rows::<FieldLayoutRaw>()
        .into_iter()
        .map(|row| (row.field, row.field_offset))
        .collect();
    let rvas: HashMap<u32, u32> = data
        .rows::<FieldRvaRaw>()
        .into_iter()
        .map(|row| (row.field, row.rva))
        .collect();

    let starts: Vec<u32> = data.type_defs.iter().map(|row| row.field_list).collect();
    for (type_index, range) in list_ranges(&starts, rows.len() as u32).into_iter().enumerate() {
        let owner = declaring_type(data, type_index)?;
        for rid in range {
            let Some(row) = row_of(&rows, rid) else { break };
            let token = Token::from_parts(TableId::Field, rid);
            let signature = data.field_signature(row.signature)?;

            let mut field = FieldDefinition::new(
                &data.string(row.name)?,
                FieldAttributes::from_bits_retain(row.flags),
                signature.field_type.clone(),
            );
            field.signature = signature;
            field.constant = data.constants.get(&token).cloned();
            field.marshal = data.marshals.get(&token).cloned();
            field.offset = offsets.get(&rid).copied();
            field.rva = rvas.get(&rid).copied();
            field.token.set(token);

            let field = Arc::new(field);
            owner.fields.add(field.clone())?;
            data.fields.insert(rid, field);
        }
    }
    Ok(())
}

pub(crate) fn load_methods(data: &LoaderData) -> Result<()> {
    let rows: Vec<MethodDefRaw> = data.rows();
    let params: Vec<ParamRaw> = data.rows();
    let param_ranges = list_ranges(
        &rows.iter().map(|row| row.param_list).collect::<Vec<_>>(),
        params.len() as u32,
    );

    let pinvokes: HashMap<u32, ImplMapRaw> = data
        .rows::<ImplMapRaw>()
        .into_iter()
        .filter(|row| row.member_forwarded.tag == TableId::MethodDef)
        .map(|row| (row.member_forwarded.row, row))
        .collect();
    let mut overrides: HashMap<u32, Vec<CodedIndex>> = HashMap::new();
    for row in data.rows::<MethodImplRaw>() {
        if row.method_body.tag == TableId::MethodDef {
            overrides.entry(row.method_body.row).or_default().push(row.method_declaration);
        }
    }

    let starts: Vec<u32> = data.type_defs.iter().map(|row| row.method_list).collect();
    for (type_index, range) in list_ranges(&starts, rows.len() as u32).into_iter().enumerate() {
        let owner = declaring_type(data, type_index)?;
        for rid in range {
            let Some(row) = row_of(&rows, rid) else { break };
            let reference = data.method_def(rid)?;

            let mut method = MethodDefinition::new(
                &reference.name,
                MethodAttributes::from_bits_retain(row.flags),
                reference.signature.clone(),
            );
            method.impl_attributes = MethodImplAttributes::from_bits_retain(row.impl_flags);
            method.rva = row.rva;
            if let Some(pinvoke) = pinvokes.get(&rid) {
                method.pinvoke = Some(PInvokeInfo {
                    attributes: PInvokeAttributes::from_bits_retain(pinvoke.mapping_flags),
                    entry_point: data.string(pinvoke.import_name)?,
                    module: row_of(&data.module_refs, pinvoke.import_scope)
                        .cloned()
                        .unwrap_or_default(),
                });
            }
            for declaration in overrides.remove(&rid).unwrap_or_default() {
                method.overrides.push(data.method_reference(declaration)?);
            }
            method.token.set(Token::from_parts(TableId::MethodDef, rid));

            for param_rid in param_ranges[rid as usize - 1].clone() {
                let Some(param) = row_of(&params, param_rid) else { break };
                let token = Token::from_parts(TableId::Param, param_rid);

                let mut parameter = ParameterDefinition::new(
                    narrow(param.sequence)?,
                    &data.string(param.name)?,
                    ParamAttributes::from_bits_retain(param.flags),
                );
                parameter.constant = data.constants.get(&token).cloned();
                parameter.marshal = data.marshals.get(&token).cloned();
                parameter.token.set(token);

                let parameter = Arc::new(parameter);
                method.parameters.add(parameter.clone())?;
                data.params.insert(param_rid, parameter);
            }

            let method = Arc::new(method);
            owner.methods.add(method.clone())?;
            data.methods.insert(rid, method);
        }
    }
    Ok(())
}

pub(crate) fn load_properties(data: &LoaderData) -> Result<()> {
    let rows: Vec<PropertyRaw> = data.rows();
    let maps: Vec<PropertyMapRaw> = data.rows();
    let starts: Vec<u32> = maps.iter().map(|row| row.property_list).collect();

    for (map, range) in maps.iter().zip(list_ranges(&starts, rows.len() as u32)) {
        let owner = data
            .types
            .get(&map.parent)
            .ok_or(TokenNotFound(Token::from_parts(TableId::TypeDef, map.parent)))?;
        for rid in range {
            let Some(row) = row_of(&rows, rid) else { break };
            let token = Token::from_parts(TableId::Property, rid);
            let signature = data.property_signature(row.signature)?;

            let mut property = PropertyDefinition::new(
                &data.string(row.name)?,
                PropertyAttributes::from_bits_retain(row.flags),
                signature.property_type.clone(),
            );
            property.signature = signature;
            property.constant = data.constants.get(&token).cloned();

            for semantic in associated(&data.semantics, token) {
                let method = semantic_method(&data.methods, semantic)?;
                let kind = MethodSemanticsAttributes::from_bits_retain(semantic.semantics);
                if kind.contains(MethodSemanticsAttributes::GETTER) {
                    property.getter = Some(method);
                } else if kind.contains(MethodSemanticsAttributes::SETTER) {
                    property.setter = Some(method);
                } else {
                    property.other_methods.push(method);
                }
            }
            property.token.set(token);

            let property = Arc::new(property);
            owner.value().properties.add(property.clone())?;
            data.properties.insert(rid, property);
        }
    }
    Ok(())
}

pub(crate) fn load_events(data: &LoaderData) -> Result<()> {
    let rows: Vec<EventRaw> = data.rows();
    let maps: Vec<EventMapRaw> = data.rows();
    let starts: Vec<u32> = maps.iter().map(|row| row.event_list).collect();

    for (map, range) in maps.iter().zip(list_ranges(&starts, rows.len() as u32)) {
        let owner = data
            .types
            .get(&map.parent)
            .ok_or(TokenNotFound(Token::from_parts(TableId::TypeDef, map.parent)))?;
        for rid in range {
            let Some(row) = row_of(&rows, rid) else { break };
            let token = Token::from_parts(TableId::Event, rid);
            let event_type = data
                .type_def_or_ref(row.event_type)?
                .ok_or_else(|| malformed_error!("Event {} has no type", rid))?;

            let semantics = data.semantics.clone();
            let methods = data.methods.clone();
            let event = EventDefinition::from_semantics(
                data.context.clone(),
                &data.string(row.name)?,
                EventAttributes::from_bits_retain(row.flags),
                event_type,
                move |_| event_accessors(&semantics, &methods, token),
            );
            event.token.set(token);

            let event = Arc::new(event);
            owner.value().events.add(event.clone())?;
            data.events.insert(rid, event);
        }
    }
    Ok(())
}

/// Collects the accessors of the event `association` from the `MethodSemantics` rows
fn event_accessors(
    semantics: &[MethodSemanticsRaw],
    methods: &SkipMap<u32, MethodRc>,
    association: Token,
) -> Result<EventAccessors> {
    let mut accessors = EventAccessors::default();
    for semantic in associated(semantics, association) {
        let method = semantic_method(methods, semantic)?;
        let kind = MethodSemanticsAttributes::from_bits_retain(semantic.semantics);
        if kind.contains(MethodSemanticsAttributes::ADD_ON) {
            accessors.add = Some(method);
        } else if kind.contains(MethodSemanticsAttributes::REMOVE_ON) {
            accessors.remove = Some(method);
        } else if kind.contains(MethodSemanticsAttributes::FIRE) {
            accessors.invoke = Some(method);
        } else {
            accessors.other.push(method);
        }
    }
    Ok(accessors)
}

fn associated(
    semantics: &[MethodSemanticsRaw],
    association: Token,
) -> impl Iterator<Item = &MethodSemanticsRaw> {
    semantics
        .iter()
        .filter(move |row| row.association.token == association)
}

fn semantic_method(
    methods: &SkipMap<u32, MethodRc>,
    semantic: &MethodSemanticsRaw,
) -> Result<MethodRc> {
    methods
        .get(&semantic.method)
        .map(|entry| entry.value().clone())
        .ok_or(TokenNotFound(Token::from_parts(TableId::MethodDef, semantic.method)))
}

fn declaring_type(data: &LoaderData, type_index: usize) -> Result<TypeRc> {
    let rid = type_index as u32 + 1;
    data.types
        .get(&rid)
        .map(|entry| entry.value().clone())
        .ok_or(TokenNotFound(Token::from_parts(TableId::TypeDef, rid)))
}
