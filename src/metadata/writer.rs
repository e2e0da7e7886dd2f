//! Lowering of a member graph into a metadata image.
//!
//! [`MetadataWriter`] walks a [`ModuleDefinition`] and appends one row per member to a
//! [`TablesBuilder`], interning names, signatures and attribute blobs into a [`HeapWriter`].
//! Once every row is known the builder derives the index widths, sorts the sorted tables and
//! serializes the `#~` stream.
//!
//! # Phases
//!
//! 1. **Planning**: types are numbered depth first, each enclosing type before the types nested
//!    in it, and every definition receives its token. Fields, methods, parameters, properties
//!    and events are numbered in the order their owners are, so the list columns of `TypeDef`
//!    and `MethodDef` describe contiguous runs.
//! 2. **Emission**: rows are appended. References to types and methods outside the module
//!    create `TypeRef`, `TypeSpec` and `MemberRef` rows on first use; later uses of an equal
//!    reference reuse the row.
//! 3. **Serialization**: generic parameters are ordered by owner, then the builder writes the
//!    stream.
//!
//! A `<Module>` type is written as `TypeDef` row 1 unless the module already starts with one.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use cilmeta::metadata::{
//!     members::{ModuleDefinition, TypeAttributes, TypeDefinition},
//!     streams::TablesHeader,
//!     tables::TypeDefRaw,
//!     writer::MetadataWriter,
//! };
//!
//! let module = ModuleDefinition::new("app.dll");
//! module.types.add(Arc::new(TypeDefinition::new("App", "Program", TypeAttributes::PUBLIC)))?;
//!
//! let image = MetadataWriter::default().write(&module)?;
//! let header = TablesHeader::from(&image.tables)?;
//! assert_eq!(header.table::<TypeDefRaw>().unwrap().row_count(), 2);
//! # Ok::<(), cilmeta::Error>(())
//! ```

use std::collections::HashMap;

use dashmap::DashMap;

use crate::{
    metadata::{
        config::MetadataConfig,
        customattributes::CustomAttributeList,
        members::{
            ConstantValue, GenericParameterRc, MethodRc, MethodReference, MethodSemanticsAttributes,
            ModuleDefinition, TypeRc,
        },
        module::{HeapsView, MetadataImage},
        security::SecurityDeclarationList,
        signatures::{
            encode_field_signature, encode_method_signature, encode_property_signature,
            encode_typespec_signature, TypeTokenProvider,
        },
        streams::HeapWriter,
        tables::{
            AssemblyRaw, AssemblyRefRaw, ClassLayoutRaw, CodedIndex, CodedIndexType, ConstantRaw,
            CustomAttributeRaw, DeclSecurityRaw, EventMapRaw, EventRaw, FieldLayoutRaw,
            FieldMarshalRaw, FieldRaw, FieldRvaRaw, GenericParamConstraintRaw, GenericParamRaw,
            ImplMapRaw, InterfaceImplRaw, MemberRefRaw, MethodDefRaw, MethodImplRaw,
            MethodSemanticsRaw, ModuleRaw, ModuleRefRaw, NestedClassRaw, ParamRaw, PropertyMapRaw,
            PropertyRaw, TableId, TablesBuilder, TypeDefRaw, TypeRefRaw, TypeSpecRaw,
        },
        token::Token,
        typesystem::{AssemblyName, NamedType, ResolutionScope, TypeReference},
    },
    Error::TokenNotFound,
    Result,
};

/// Name of the type holding global fields and methods
const MODULE_TYPE: &str = "<Module>";

/// Turns a [`ModuleDefinition`] into a [`MetadataImage`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataWriter {
    config: MetadataConfig,
}

impl MetadataWriter {
    /// Creates a writer using `config` for the stream version and the heap index widths
    #[must_use]
    pub fn new(config: MetadataConfig) -> Self {
        MetadataWriter { config }
    }

    /// Writes `module` into a tables stream and its heaps.
    ///
    /// Every definition of the module gets its token assigned as a side effect.
    ///
    /// # Errors
    /// Returns an error if a member refers to a method that is not part of the module, a blob
    /// cannot be encoded, or a value does not fit its column.
    pub fn write(&self, module: &ModuleDefinition) -> Result<MetadataImage> {
        let mut session = WriteSession::new(self.config);
        session.plan(module)?;
        session.emit(module)?;
        session.emit_generic_parameters()?;

        let tables = session.tables.write(&session.heaps)?;
        log::debug!(
            "Wrote module {}: {} types, {} bytes of tables, heaps {}/{}/{} bytes",
            module.name,
            session.types.len(),
            tables.len(),
            session.heaps.strings_size(),
            session.heaps.blob_size(),
            session.heaps.guid_size()
        );

        Ok(MetadataImage {
            tables,
            heaps: HeapsView::from_writer(&session.heaps),
        })
    }
}

struct PlannedType {
    definition: TypeRc,
    enclosing: Option<usize>,
}

struct PendingGenericParameter {
    key: u32,
    owner: CodedIndex,
    parameter: GenericParameterRc,
}

struct WriteSession {
    tables: TablesBuilder,
    heaps: HeapWriter,
    types: Vec<PlannedType>,
    type_defs: HashMap<String, usize>,
    type_refs: DashMap<NamedType, u32>,
    type_specs: DashMap<TypeReference, u32>,
    member_refs: DashMap<MethodReference, u32>,
    assembly_refs: DashMap<AssemblyName, u32>,
    module_refs: DashMap<String, u32>,
    generic_parameters: Vec<PendingGenericParameter>,
    synthetic_module_type: bool,
}

impl WriteSession {
    fn new(config: MetadataConfig) -> Self {
        WriteSession {
            tables: TablesBuilder::new(config),
            heaps: HeapWriter::new(),
            types: Vec::new(),
            type_defs: HashMap::new(),
            type_refs: DashMap::new(),
            type_specs: DashMap::new(),
            member_refs: DashMap::new(),
            assembly_refs: DashMap::new(),
            module_refs: DashMap::new(),
            generic_parameters: Vec::new(),
            synthetic_module_type: false,
        }
    }

    fn plan(&mut self, module: &ModuleDefinition) -> Result<()> {
        self.synthetic_module_type = module
            .types
            .get(0)
            .map_or(true, |first| first.name != MODULE_TYPE || !first.namespace.is_empty());

        for definition in module.types.to_vec() {
            self.plan_type(definition, None, None);
        }

        let mut type_rid = if self.synthetic_module_type { 2 } else { 1 };
        let (mut field_rid, mut method_rid, mut param_rid) = (1, 1, 1);
        let (mut property_rid, mut event_rid) = (1, 1);

        for planned in &self.types {
            let definition = &planned.definition;
            definition.token.set(Token::from_parts(TableId::TypeDef, type_rid));
            type_rid += 1;

            for field in definition.fields.to_vec() {
                field.token.set(Token::from_parts(TableId::Field, field_rid));
                field_rid += 1;
            }
            for method in definition.methods.to_vec() {
                method.token.set(Token::from_parts(TableId::MethodDef, method_rid));
                method_rid += 1;
                for parameter in method.parameters.to_vec() {
                    parameter.token.set(Token::from_parts(TableId::Param, param_rid));
                    param_rid += 1;
                }
            }
            for property in definition.properties.to_vec() {
                property.token.set(Token::from_parts(TableId::Property, property_rid));
                property_rid += 1;
            }
            for event in definition.events.to_vec() {
                event.token.set(Token::from_parts(TableId::Event, event_rid));
                event_rid += 1;
            }
        }

        for assembly in &module.assembly_references {
            self.assembly_ref(assembly)?;
        }
        for name in &module.module_references {
            self.module_ref(name)?;
        }

        Ok(())
    }

    fn plan_type(&mut self, definition: TypeRc, declaring: Option<NamedType>, enclosing: Option<usize>) {
        let named = definition.named_type(declaring);
        let index = self.types.len();
        let nested = definition.nested_types.to_vec();

        self.type_defs.insert(named.full_name(), index);
        self.types.push(PlannedType {
            definition,
            enclosing,
        });

        for inner in nested {
            self.plan_type(inner, Some(named.clone()), Some(index));
        }
    }

    fn emit(&mut self, module: &ModuleDefinition) -> Result<()> {
        let name = self.heaps.intern_string(&module.name)?;
        let mvid = self.heaps.intern_guid(&module.mvid);
        self.tables.module.add_row(ModuleRaw {
            generation: u32::from(module.generation),
            name,
            mvid,
            encid: 0,
            encbaseid: 0,
        })?;
        self.custom_attributes(
            CodedIndex::new(TableId::Module, 1),
            &module.custom_attributes,
        )?;

        if let Some(assembly) = &module.assembly {
            let public_key = self.heaps.intern_blob(&assembly.name.public_key_or_token)?;
            let name = self.heaps.intern_string(&assembly.name.name)?;
            let culture = self.heaps.intern_string(&assembly.name.culture)?;
            self.tables.assembly.add_row(AssemblyRaw {
                hash_alg_id: assembly.hash_algorithm,
                major_version: u32::from(assembly.name.major_version),
                minor_version: u32::from(assembly.name.minor_version),
                build_number: u32::from(assembly.name.build_number),
                revision_number: u32::from(assembly.name.revision_number),
                flags: assembly.name.flags,
                public_key,
                name,
                culture,
            })?;

            let parent = CodedIndex::new(TableId::Assembly, 1);
            self.custom_attributes(parent, &assembly.custom_attributes)?;
            self.security_declarations(parent, &assembly.security_declarations)?;
        }

        if self.synthetic_module_type {
            let type_name = self.heaps.intern_string(MODULE_TYPE)?;
            self.tables.type_def.add_row(TypeDefRaw {
                flags: 0,
                type_name,
                type_namespace: 0,
                extends: CodedIndex::null(CodedIndexType::TypeDefOrRef),
                field_list: 1,
                method_list: 1,
            });
        }

        for index in 0..self.types.len() {
            self.emit_type(index)?;
        }

        Ok(())
    }

    fn emit_type(&mut self, index: usize) -> Result<()> {
        let definition = self.types[index].definition.clone();
        let rid = definition.token.row();

        let extends = match &definition.base_type {
            Some(base) => self.type_def_or_ref(base)?,
            None => CodedIndex::null(CodedIndexType::TypeDefOrRef),
        };
        let type_name = self.heaps.intern_string(&definition.name)?;
        let type_namespace = self.heaps.intern_string(&definition.namespace)?;
        self.tables.type_def.add_row(TypeDefRaw {
            flags: definition.attributes.bits(),
            type_name,
            type_namespace,
            extends,
            field_list: self.tables.field.len() + 1,
            method_list: self.tables.method_def.len() + 1,
        });

        let parent = CodedIndex::new(TableId::TypeDef, rid);
        self.custom_attributes(parent, &definition.custom_attributes)?;
        self.security_declarations(parent, &definition.security_declarations)?;

        if let Some(enclosing) = self.types[index].enclosing {
            self.tables.nested_class.add_row(NestedClassRaw {
                nested_class: rid,
                enclosing_class: self.types[enclosing].definition.token.row(),
            });
        }

        if let Some(layout) = definition.layout {
            self.tables.class_layout.add_row(ClassLayoutRaw {
                packing_size: u32::from(layout.packing_size),
                class_size: layout.class_size,
                parent: rid,
            });
        }

        for interface in &definition.interfaces {
            let interface = self.type_def_or_ref(interface)?;
            self.tables.interface_impl.add_row(InterfaceImplRaw {
                class: rid,
                interface,
            });
        }

        for parameter in definition.generic_parameters.to_vec() {
            self.queue_generic_parameter(TableId::TypeDef, rid, parameter)?;
        }

        self.emit_fields(&definition)?;
        self.emit_methods(&definition)?;
        self.emit_properties(&definition)?;
        self.emit_events(&definition)
    }

    fn emit_fields(&mut self, definition: &TypeRc) -> Result<()> {
        for field in definition.fields.to_vec() {
            let rid = field.token.row();
            let name = self.heaps.intern_string(&field.name)?;
            let signature = encode_field_signature(&field.signature, self)?;
            let signature = self.heaps.intern_blob(&signature)?;
            self.tables.field.add_row(FieldRaw {
                flags: field.attributes.bits(),
                name,
                signature,
            });

            let parent = CodedIndex::new(TableId::Field, rid);
            if let Some(constant) = &field.constant {
                self.constant(parent, constant)?;
            }
            if let Some(marshal) = &field.marshal {
                let native_type = self.heaps.intern_blob(marshal)?;
                self.tables
                    .field_marshal
                    .add_row(FieldMarshalRaw { parent, native_type });
            }
            if let Some(offset) = field.offset {
                self.tables.field_layout.add_row(FieldLayoutRaw {
                    field_offset: offset,
                    field: rid,
                });
            }
            if let Some(rva) = field.rva {
                self.tables.field_rva.add_row(FieldRvaRaw { rva, field: rid });
            }
            self.custom_attributes(parent, &field.custom_attributes)?;
        }

        Ok(())
    }

    fn emit_methods(&mut self, definition: &TypeRc) -> Result<()> {
        let class = definition.token.row();

        for method in definition.methods.to_vec() {
            let rid = method.token.row();
            let name = self.heaps.intern_string(&method.name)?;
            let signature = encode_method_signature(&method.signature, self)?;
            let signature = self.heaps.intern_blob(&signature)?;
            self.tables.method_def.add_row(MethodDefRaw {
                rva: method.rva,
                impl_flags: method.impl_attributes.bits(),
                flags: method.attributes.bits(),
                name,
                signature,
                param_list: self.tables.param.len() + 1,
            });

            for parameter in method.parameters.to_vec() {
                let name = self.heaps.intern_string(&parameter.name)?;
                self.tables.param.add_row(ParamRaw {
                    flags: parameter.attributes.bits(),
                    sequence: u32::from(parameter.sequence),
                    name,
                });

                let parent = CodedIndex::new(TableId::Param, parameter.token.row());
                if let Some(constant) = &parameter.constant {
                    self.constant(parent, constant)?;
                }
                if let Some(marshal) = &parameter.marshal {
                    let native_type = self.heaps.intern_blob(marshal)?;
                    self.tables
                        .field_marshal
                        .add_row(FieldMarshalRaw { parent, native_type });
                }
                self.custom_attributes(parent, &parameter.custom_attributes)?;
            }

            let parent = CodedIndex::new(TableId::MethodDef, rid);
            if let Some(pinvoke) = &method.pinvoke {
                let import_name = self.heaps.intern_string(&pinvoke.entry_point)?;
                let import_scope = self.module_ref(&pinvoke.module)?;
                self.tables.impl_map.add_row(ImplMapRaw {
                    mapping_flags: pinvoke.attributes.bits(),
                    member_forwarded: parent,
                    import_name,
                    import_scope,
                });
            }

            for declaration in &method.overrides {
                let method_declaration = self.method_def_or_ref(declaration)?;
                self.tables.method_impl.add_row(MethodImplRaw {
                    class,
                    method_body: parent,
                    method_declaration,
                });
            }

            for parameter in method.generic_parameters.to_vec() {
                self.queue_generic_parameter(TableId::MethodDef, rid, parameter)?;
            }

            self.custom_attributes(parent, &method.custom_attributes)?;
            self.security_declarations(parent, &method.security_declarations)?;
        }

        Ok(())
    }

    fn emit_properties(&mut self, definition: &TypeRc) -> Result<()> {
        let properties = definition.properties.to_vec();
        if properties.is_empty() {
            return Ok(());
        }

        self.tables.property_map.add_row(PropertyMapRaw {
            parent: definition.token.row(),
            property_list: self.tables.property.len() + 1,
        });

        for property in properties {
            let name = self.heaps.intern_string(&property.name)?;
            let signature = encode_property_signature(&property.signature, self)?;
            let signature = self.heaps.intern_blob(&signature)?;
            self.tables.property.add_row(PropertyRaw {
                flags: property.attributes.bits(),
                name,
                signature,
            });

            let association = CodedIndex::new(TableId::Property, property.token.row());
            if let Some(getter) = &property.getter {
                self.semantics(MethodSemanticsAttributes::GETTER, getter, association)?;
            }
            if let Some(setter) = &property.setter {
                self.semantics(MethodSemanticsAttributes::SETTER, setter, association)?;
            }
            for other in &property.other_methods {
                self.semantics(MethodSemanticsAttributes::OTHER, other, association)?;
            }

            if let Some(constant) = &property.constant {
                self.constant(association, constant)?;
            }
            self.custom_attributes(association, &property.custom_attributes)?;
        }

        Ok(())
    }

    fn emit_events(&mut self, definition: &TypeRc) -> Result<()> {
        let events = definition.events.to_vec();
        if events.is_empty() {
            return Ok(());
        }

        self.tables.event_map.add_row(EventMapRaw {
            parent: definition.token.row(),
            event_list: self.tables.event.len() + 1,
        });

        for event in events {
            let name = self.heaps.intern_string(&event.name)?;
            let event_type = self.type_def_or_ref(&event.event_type)?;
            self.tables.event.add_row(EventRaw {
                flags: event.attributes.bits(),
                name,
                event_type,
            });

            let association = CodedIndex::new(TableId::Event, event.token.row());
            let accessors = event.accessors();
            if let Some(add) = &accessors.add {
                self.semantics(MethodSemanticsAttributes::ADD_ON, add, association)?;
            }
            if let Some(remove) = &accessors.remove {
                self.semantics(MethodSemanticsAttributes::REMOVE_ON, remove, association)?;
            }
            if let Some(invoke) = &accessors.invoke {
                self.semantics(MethodSemanticsAttributes::FIRE, invoke, association)?;
            }
            for other in &accessors.other {
                self.semantics(MethodSemanticsAttributes::OTHER, other, association)?;
            }

            self.custom_attributes(association, &event.custom_attributes)?;
        }

        Ok(())
    }

    fn queue_generic_parameter(
        &mut self,
        table: TableId,
        rid: u32,
        parameter: GenericParameterRc,
    ) -> Result<()> {
        self.generic_parameters.push(PendingGenericParameter {
            key: CodedIndexType::TypeOrMethodDef.encode(table, rid)?,
            owner: CodedIndex::new(table, rid),
            parameter,
        });
        Ok(())
    }

    /// `GenericParam` rows, ordered by owner and then by number
    fn emit_generic_parameters(&mut self) -> Result<()> {
        let mut pending = std::mem::take(&mut self.generic_parameters);
        pending.sort_by_key(|entry| (entry.key, entry.parameter.number));

        for entry in &pending {
            let parameter = &entry.parameter;
            let name = self.heaps.intern_string(&parameter.name)?;
            let rid = self.tables.generic_param.add_row(GenericParamRaw {
                number: u32::from(parameter.number),
                flags: parameter.attributes.bits(),
                owner: entry.owner,
                name,
            });
            parameter
                .token
                .set(Token::from_parts(TableId::GenericParam, rid));
        }

        for entry in &pending {
            let owner = entry.parameter.token.row();
            for constraint in &entry.parameter.constraints {
                let constraint = self.type_def_or_ref(constraint)?;
                self.tables
                    .generic_param_constraint
                    .add_row(GenericParamConstraintRaw { owner, constraint });
            }
            self.custom_attributes(
                CodedIndex::new(TableId::GenericParam, owner),
                &entry.parameter.custom_attributes,
            )?;
        }

        Ok(())
    }

    fn constant(&mut self, parent: CodedIndex, constant: &ConstantValue) -> Result<()> {
        let value = self.heaps.intern_blob(&constant.value)?;
        self.tables.constant.add_row(ConstantRaw {
            base: constant.element_type,
            parent,
            value,
        });
        Ok(())
    }

    fn semantics(
        &mut self,
        semantics: MethodSemanticsAttributes,
        method: &MethodRc,
        association: CodedIndex,
    ) -> Result<()> {
        let token = method.token.get();
        if token.is_null() {
            return Err(TokenNotFound(token));
        }

        self.tables.method_semantics.add_row(MethodSemanticsRaw {
            semantics: semantics.bits(),
            method: token.row(),
            association,
        });
        Ok(())
    }

    fn custom_attributes(&mut self, parent: CodedIndex, list: &CustomAttributeList) -> Result<()> {
        for (_, attribute) in list.iter() {
            let constructor = self.method_def_or_ref(attribute.constructor())?;
            let value = self.heaps.intern_blob(&attribute.to_blob()?)?;
            self.tables.custom_attribute.add_row(CustomAttributeRaw {
                parent,
                constructor,
                value,
            });
        }
        Ok(())
    }

    fn security_declarations(
        &mut self,
        parent: CodedIndex,
        list: &SecurityDeclarationList,
    ) -> Result<()> {
        for (_, declaration) in list.iter() {
            let permission_set = self.heaps.intern_blob(&declaration.to_blob()?)?;
            self.tables.decl_security.add_row(DeclSecurityRaw {
                action: u32::from(u16::from(declaration.action())),
                parent,
                permission_set,
            });
        }
        Ok(())
    }

    /// A `TypeDefOrRef` coded index for `reference`
    fn type_def_or_ref(&mut self, reference: &TypeReference) -> Result<CodedIndex> {
        let token = self.type_token(reference)?;
        coded_index(token)
    }

    /// `TypeDef` token for types of this module, `TypeRef` token for everything else
    fn named_token(&mut self, named: &NamedType) -> Result<Token> {
        if matches!(named.root_scope(), ResolutionScope::CurrentModule) {
            if let Some(index) = self.type_defs.get(&named.full_name()) {
                return Ok(self.types[*index].definition.token.get());
            }
        }

        Ok(Token::from_parts(TableId::TypeRef, self.type_ref(named)?))
    }

    fn type_ref(&mut self, named: &NamedType) -> Result<u32> {
        let key = NamedType {
            is_value_type: false,
            ..named.clone()
        };
        if let Some(rid) = self.type_refs.get(&key) {
            return Ok(*rid);
        }

        let resolution_scope = match &named.scope {
            ResolutionScope::CurrentModule => CodedIndex::new(TableId::Module, 1),
            ResolutionScope::ModuleRef(name) => {
                CodedIndex::new(TableId::ModuleRef, self.module_ref(name)?)
            }
            ResolutionScope::AssemblyRef(assembly) => {
                CodedIndex::new(TableId::AssemblyRef, self.assembly_ref(assembly)?)
            }
            ResolutionScope::Nested(declaring) => {
                CodedIndex::new(TableId::TypeRef, self.type_ref(declaring)?)
            }
        };

        let type_name = self.heaps.intern_string(&named.name)?;
        let type_namespace = self.heaps.intern_string(&named.namespace)?;
        let rid = self.tables.type_ref.add_row(TypeRefRaw {
            resolution_scope,
            type_name,
            type_namespace,
        });
        self.type_refs.insert(key, rid);
        Ok(rid)
    }

    fn type_spec(&mut self, reference: &TypeReference) -> Result<u32> {
        if let Some(rid) = self.type_specs.get(reference) {
            return Ok(*rid);
        }

        let signature = encode_typespec_signature(reference, self)?;
        let signature = self.heaps.intern_blob(&signature)?;
        let rid = self.tables.type_spec.add_row(TypeSpecRaw { signature });
        self.type_specs.insert(reference.clone(), rid);
        Ok(rid)
    }

    /// A `MethodDefOrRef` (or `CustomAttributeType`) coded index for `method`
    fn method_def_or_ref(&mut self, method: &MethodReference) -> Result<CodedIndex> {
        if let Some(rid) = self.method_def(method) {
            return Ok(CodedIndex::new(TableId::MethodDef, rid));
        }

        Ok(CodedIndex::new(TableId::MemberRef, self.member_ref(method)?))
    }

    fn method_def(&self, method: &MethodReference) -> Option<u32> {
        let TypeReference::Named(named) = &method.declaring_type else {
            return None;
        };
        if !matches!(named.root_scope(), ResolutionScope::CurrentModule) {
            return None;
        }

        let index = self.type_defs.get(&named.full_name())?;
        self.types[*index]
            .definition
            .methods
            .find(|candidate| {
                candidate.name == method.name && candidate.signature == method.signature
            })
            .map(|found| found.token.row())
    }

    fn member_ref(&mut self, method: &MethodReference) -> Result<u32> {
        if let Some(rid) = self.member_refs.get(method) {
            return Ok(*rid);
        }

        let class = self.type_def_or_ref(&method.declaring_type)?;
        let name = self.heaps.intern_string(&method.name)?;
        let signature = encode_method_signature(&method.signature, self)?;
        let signature = self.heaps.intern_blob(&signature)?;
        let rid = self.tables.member_ref.add_row(MemberRefRaw {
            class,
            name,
            signature,
        });
        self.member_refs.insert(method.clone(), rid);
        Ok(rid)
    }

    fn assembly_ref(&mut self, assembly: &AssemblyName) -> Result<u32> {
        if let Some(rid) = self.assembly_refs.get(assembly) {
            return Ok(*rid);
        }

        let public_key_or_token = self.heaps.intern_blob(&assembly.public_key_or_token)?;
        let name = self.heaps.intern_string(&assembly.name)?;
        let culture = self.heaps.intern_string(&assembly.culture)?;
        let rid = self.tables.assembly_ref.add_row(AssemblyRefRaw {
            major_version: u32::from(assembly.major_version),
            minor_version: u32::from(assembly.minor_version),
            build_number: u32::from(assembly.build_number),
            revision_number: u32::from(assembly.revision_number),
            flags: assembly.flags,
            public_key_or_token,
            name,
            culture,
            hash_value: 0,
        });
        self.assembly_refs.insert(assembly.clone(), rid);
        Ok(rid)
    }

    fn module_ref(&mut self, name: &str) -> Result<u32> {
        if let Some(rid) = self.module_refs.get(name) {
            return Ok(*rid);
        }

        let name_index = self.heaps.intern_string(name)?;
        let rid = self
            .tables
            .module_ref
            .add_row(ModuleRefRaw { name: name_index });
        self.module_refs.insert(name.to_string(), rid);
        Ok(rid)
    }
}

impl TypeTokenProvider for WriteSession {
    fn type_token(&mut self, reference: &TypeReference) -> Result<Token> {
        match reference {
            TypeReference::Named(named) => self.named_token(named),
            other => Ok(Token::from_parts(TableId::TypeSpec, self.type_spec(other)?)),
        }
    }
}

fn coded_index(token: Token) -> Result<CodedIndex> {
    match token.table_id() {
        Some(table) if !token.is_null() => Ok(CodedIndex::new(table, token.row())),
        _ => Err(TokenNotFound(token)),
    }
}
