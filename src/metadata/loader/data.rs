//! Rows, names and signatures shared by the loading phases.
//!
//! [`LoaderData`] is built once per image. It reads the reference tables up front (assembly and
//! module references, type names, method and member references) so that the later phases can
//! resolve any token without revisiting the stream, and it collects the definitions they create
//! in skip maps keyed by row id.

use std::{cell::Cell, collections::HashMap, ops::Range, sync::Arc};

use crossbeam_skiplist::SkipMap;

use crate::{
    metadata::{
        members::{
            ConstantValue, EventRc, FieldRc, GenericParameterRc, MethodRc, MethodReference,
            ParameterRc, PropertyRc, TypeRc,
        },
        module::{HeapsView, MetadataReader, ModuleContext},
        signatures::{
            FieldSignature, MethodSignature, PropertySignature, SignatureParser, TypeResolver,
            SIGNATURE_HEADER,
        },
        streams::TablesHeader,
        tables::{
            AssemblyRefRaw, CodedIndex, ConstantRaw, FieldMarshalRaw, MemberRefRaw, MethodDefRaw,
            MethodSemanticsRaw, ModuleRefRaw, NestedClassRaw, RowReadable, TableId, TypeDefRaw,
            TypeRefRaw, TypeSpecRaw,
        },
        token::Token,
        typesystem::{AssemblyName, NamedType, ResolutionScope, TypeReference},
    },
    Error::{RecursionLimit, TokenNotFound},
    Result,
};

/// Everything the loading phases share
pub(crate) struct LoaderData<'a> {
    header: TablesHeader<'a>,
    pub(crate) heaps: Arc<HeapsView>,
    pub(crate) context: Arc<ModuleContext>,
    max_depth: usize,
    spec_depth: Cell<usize>,

    pub(crate) assembly_refs: Vec<AssemblyName>,
    pub(crate) module_refs: Vec<String>,
    pub(crate) type_defs: Vec<TypeDefRaw>,
    pub(crate) type_names: Vec<NamedType>,
    type_ref_names: Vec<NamedType>,
    type_specs: Vec<TypeSpecRaw>,
    method_refs: Vec<MethodReference>,
    member_refs: Vec<Option<MethodReference>>,
    pub(crate) enclosing: HashMap<u32, u32>,
    pub(crate) constants: HashMap<Token, ConstantValue>,
    pub(crate) marshals: HashMap<Token, Vec<u8>>,
    pub(crate) semantics: Arc<Vec<MethodSemanticsRaw>>,

    pub(crate) types: SkipMap<u32, TypeRc>,
    pub(crate) fields: SkipMap<u32, FieldRc>,
    pub(crate) methods: Arc<SkipMap<u32, MethodRc>>,
    pub(crate) params: SkipMap<u32, ParameterRc>,
    pub(crate) properties: SkipMap<u32, PropertyRc>,
    pub(crate) events: SkipMap<u32, EventRc>,
    pub(crate) generic_params: SkipMap<u32, GenericParameterRc>,
}

impl<'a> LoaderData<'a> {
    /// Reads the reference tables of `header`.
    ///
    /// # Errors
    /// Returns an error if a name or signature cannot be read, or a reference points at a row
    /// that does not exist.
    pub(crate) fn new(
        header: TablesHeader<'a>,
        heaps: Arc<HeapsView>,
        context: Arc<ModuleContext>,
    ) -> Result<Self> {
        let max_depth = context.config().max_signature_depth;
        let mut data = LoaderData {
            header,
            heaps,
            context,
            max_depth,
            spec_depth: Cell::new(0),
            assembly_refs: Vec::new(),
            module_refs: Vec::new(),
            type_defs: Vec::new(),
            type_names: Vec::new(),
            type_ref_names: Vec::new(),
            type_specs: Vec::new(),
            method_refs: Vec::new(),
            member_refs: Vec::new(),
            enclosing: HashMap::new(),
            constants: HashMap::new(),
            marshals: HashMap::new(),
            semantics: Arc::new(Vec::new()),
            types: SkipMap::new(),
            fields: SkipMap::new(),
            methods: Arc::new(SkipMap::new()),
            params: SkipMap::new(),
            properties: SkipMap::new(),
            events: SkipMap::new(),
            generic_params: SkipMap::new(),
        };

        data.assembly_refs = data.load_assembly_refs()?;
        data.module_refs = data
            .rows::<ModuleRefRaw>()
            .iter()
            .map(|row| data.string(row.name))
            .collect::<Result<_>>()?;
        data.type_ref_names = data.load_type_ref_names()?;

        data.type_defs = data.rows();
        data.enclosing = data
            .rows::<NestedClassRaw>()
            .into_iter()
            .map(|row| (row.nested_class, row.enclosing_class))
            .collect();
        data.type_names = data.load_type_names()?;
        data.type_specs = data.rows();

        data.method_refs = data.load_method_refs()?;
        data.member_refs = data.load_member_refs()?;

        data.constants = data
            .rows::<ConstantRaw>()
            .into_iter()
            .map(|row| {
                Ok((
                    row.parent.token,
                    ConstantValue {
                        element_type: row.base,
                        value: data.heaps.blob(row.value)?.to_vec(),
                    },
                ))
            })
            .collect::<Result<_>>()?;
        data.marshals = data
            .rows::<FieldMarshalRaw>()
            .into_iter()
            .map(|row| Ok((row.parent.token, data.heaps.blob(row.native_type)?.to_vec())))
            .collect::<Result<_>>()?;
        data.semantics = Arc::new(data.rows());

        Ok(data)
    }

    /// All rows of table `T`, empty if the table is absent
    pub(crate) fn rows<T: RowReadable>(&self) -> Vec<T> {
        self.header
            .table::<T>()
            .map(|table| table.iter().collect())
            .unwrap_or_default()
    }

    /// The string at `index` of the `#Strings` heap
    pub(crate) fn string(&self, index: u32) -> Result<String> {
        Ok(self.heaps.string(index)?.to_string())
    }

    /// The type a `TypeDefOrRef` coded index points at, `None` for a null index
    pub(crate) fn type_def_or_ref(&self, index: CodedIndex) -> Result<Option<TypeReference>> {
        if index.is_null() {
            return Ok(None);
        }
        self.resolve_type(index.token, false).map(Some)
    }

    /// The method a `MethodDefOrRef` or `CustomAttributeType` coded index points at
    pub(crate) fn method_reference(&self, index: CodedIndex) -> Result<MethodReference> {
        let found = match index.tag {
            TableId::MethodDef => row_of(&self.method_refs, index.row).cloned(),
            TableId::MemberRef => row_of(&self.member_refs, index.row).cloned().flatten(),
            _ => None,
        };
        found.ok_or(TokenNotFound(index.token))
    }

    /// The reference of the method defined at `rid`
    pub(crate) fn method_def(&self, rid: u32) -> Result<&MethodReference> {
        row_of(&self.method_refs, rid)
            .ok_or(TokenNotFound(Token::from_parts(TableId::MethodDef, rid)))
    }

    pub(crate) fn field_signature(&self, index: u32) -> Result<FieldSignature> {
        SignatureParser::with_max_depth(self.heaps.blob(index)?, self, self.max_depth)
            .parse_field_signature()
    }

    pub(crate) fn property_signature(&self, index: u32) -> Result<PropertySignature> {
        SignatureParser::with_max_depth(self.heaps.blob(index)?, self, self.max_depth)
            .parse_property_signature()
    }

    fn method_signature(&self, index: u32) -> Result<MethodSignature> {
        SignatureParser::with_max_depth(self.heaps.blob(index)?, self, self.max_depth)
            .parse_method_signature()
    }

    fn load_assembly_refs(&self) -> Result<Vec<AssemblyName>> {
        self.rows::<AssemblyRefRaw>()
            .iter()
            .map(|row| {
                Ok(AssemblyName {
                    name: self.string(row.name)?,
                    major_version: narrow(row.major_version)?,
                    minor_version: narrow(row.minor_version)?,
                    build_number: narrow(row.build_number)?,
                    revision_number: narrow(row.revision_number)?,
                    culture: self.string(row.culture)?,
                    flags: row.flags,
                    public_key_or_token: self.heaps.blob(row.public_key_or_token)?.to_vec(),
                })
            })
            .collect()
    }

    fn load_type_ref_names(&self) -> Result<Vec<NamedType>> {
        let rows: Vec<TypeRefRaw> = self.rows();
        (1..=rows.len() as u32)
            .map(|rid| self.type_ref_name(&rows, rid, 0))
            .collect()
    }

    fn type_ref_name(&self, rows: &[TypeRefRaw], rid: u32, depth: usize) -> Result<NamedType> {
        if depth > self.max_depth {
            return Err(RecursionLimit(self.max_depth));
        }
        let row = row_of(rows, rid).ok_or(TokenNotFound(Token::from_parts(TableId::TypeRef, rid)))?;

        let scope = row.resolution_scope;
        let scope = match scope.tag {
            TableId::Module => ResolutionScope::CurrentModule,
            TableId::ModuleRef => ResolutionScope::ModuleRef(
                row_of(&self.module_refs, scope.row)
                    .cloned()
                    .ok_or(TokenNotFound(scope.token))?,
            ),
            TableId::AssemblyRef => ResolutionScope::AssemblyRef(
                row_of(&self.assembly_refs, scope.row)
                    .cloned()
                    .ok_or(TokenNotFound(scope.token))?,
            ),
            TableId::TypeRef => {
                ResolutionScope::Nested(Box::new(self.type_ref_name(rows, scope.row, depth + 1)?))
            }
            other => {
                return Err(malformed_error!(
                    "TypeRef {} has a resolution scope in table {:?}",
                    rid,
                    other
                ))
            }
        };

        Ok(NamedType::new(
            self.heaps.string(row.type_namespace)?,
            self.heaps.string(row.type_name)?,
            scope,
        ))
    }

    fn load_type_names(&self) -> Result<Vec<NamedType>> {
        (1..=self.type_defs.len() as u32)
            .map(|rid| self.type_name(rid, 0))
            .collect()
    }

    fn type_name(&self, rid: u32, depth: usize) -> Result<NamedType> {
        if depth > self.max_depth {
            return Err(RecursionLimit(self.max_depth));
        }
        let row = row_of(&self.type_defs, rid)
            .ok_or(TokenNotFound(Token::from_parts(TableId::TypeDef, rid)))?;
        let name = self.heaps.string(row.type_name)?;

        match self.enclosing.get(&rid) {
            Some(&enclosing) => Ok(NamedType::nested(self.type_name(enclosing, depth + 1)?, name)),
            None => Ok(NamedType::new(
                self.heaps.string(row.type_namespace)?,
                name,
                ResolutionScope::CurrentModule,
            )),
        }
    }

    fn load_method_refs(&self) -> Result<Vec<MethodReference>> {
        let rows: Vec<MethodDefRaw> = self.rows();
        let starts: Vec<u32> = self.type_defs.iter().map(|row| row.method_list).collect();

        let mut declaring = vec![None; rows.len()];
        for (type_index, range) in list_ranges(&starts, rows.len() as u32).into_iter().enumerate() {
            for rid in range {
                declaring[rid as usize - 1] = Some(type_index);
            }
        }

        rows.iter()
            .zip(declaring)
            .map(|(row, declaring)| {
                let declaring_type = match declaring.and_then(|index| self.type_names.get(index)) {
                    Some(named) => TypeReference::Named(named.clone()),
                    None => TypeReference::class("", "<Module>", ResolutionScope::CurrentModule),
                };
                Ok(MethodReference::new(
                    declaring_type,
                    self.heaps.string(row.name)?,
                    self.method_signature(row.signature)?,
                ))
            })
            .collect()
    }

    fn load_member_refs(&self) -> Result<Vec<Option<MethodReference>>> {
        let mut refs = Vec::new();
        for (index, row) in self.rows::<MemberRefRaw>().into_iter().enumerate() {
            let blob = self.heaps.blob(row.signature)?;
            if blob.first().is_some_and(|&head| {
                head & SIGNATURE_HEADER::CALLING_CONVENTION_MASK == SIGNATURE_HEADER::FIELD
            }) {
                refs.push(None);
                continue;
            }

            let class = row.class;
            let declaring_type = match class.tag {
                TableId::TypeDef | TableId::TypeRef | TableId::TypeSpec => {
                    self.resolve_type(class.token, false)?
                }
                TableId::ModuleRef => TypeReference::class(
                    "",
                    "<Module>",
                    ResolutionScope::ModuleRef(
                        row_of(&self.module_refs, class.row)
                            .cloned()
                            .ok_or(TokenNotFound(class.token))?,
                    ),
                ),
                TableId::MethodDef => self.method_def(class.row)?.declaring_type.clone(),
                other => {
                    return Err(malformed_error!(
                        "MemberRef {} has a parent in table {:?}",
                        index + 1,
                        other
                    ))
                }
            };

            let signature = SignatureParser::with_max_depth(blob, self, self.max_depth)
                .parse_method_signature()?;
            refs.push(Some(MethodReference::new(
                declaring_type,
                self.heaps.string(row.name)?,
                signature,
            )));
        }
        Ok(refs)
    }

    fn type_spec(&self, rid: u32) -> Result<TypeReference> {
        let row = row_of(&self.type_specs, rid)
            .ok_or(TokenNotFound(Token::from_parts(TableId::TypeSpec, rid)))?;

        // A TypeSpec may refer to itself through its own blob
        let depth = self.spec_depth.get();
        if depth >= self.max_depth {
            return Err(RecursionLimit(self.max_depth));
        }
        self.spec_depth.set(depth + 1);
        let result = self.heaps.blob(row.signature).and_then(|blob| {
            SignatureParser::with_max_depth(blob, self, self.max_depth).parse_type_spec_signature()
        });
        self.spec_depth.set(depth);
        result
    }
}

impl TypeResolver for LoaderData<'_> {
    fn resolve_type(&self, token: Token, is_value_type: bool) -> Result<TypeReference> {
        let named = match token.table_id() {
            Some(TableId::TypeDef) => row_of(&self.type_names, token.row()),
            Some(TableId::TypeRef) => row_of(&self.type_ref_names, token.row()),
            Some(TableId::TypeSpec) => return self.type_spec(token.row()),
            _ => None,
        };

        let mut named = named.cloned().ok_or(TokenNotFound(token))?;
        named.is_value_type = is_value_type;
        Ok(TypeReference::Named(named))
    }
}

/// The element of `rows` at 1-based `rid`
pub(crate) fn row_of<T>(rows: &[T], rid: u32) -> Option<&T> {
    rid.checked_sub(1).and_then(|index| rows.get(index as usize))
}

/// Splits a child table into the runs owned by consecutive parent rows.
///
/// `starts` holds the list column of every parent row; a run ends where the next parent's run
/// starts, the last one at the end of the child table. Out of range starts are clamped.
pub(crate) fn list_ranges(starts: &[u32], child_count: u32) -> Vec<Range<u32>> {
    let end = child_count + 1;
    starts
        .iter()
        .enumerate()
        .map(|(index, &start)| {
            let first = start.clamp(1, end);
            let next = starts.get(index + 1).map_or(end, |&next| next.clamp(1, end));
            first..next.max(first)
        })
        .collect()
}

pub(crate) fn narrow(value: u32) -> Result<u16> {
    u16::try_from(value).map_err(|_| malformed_error!("Column value {} does not fit 16 bits", value))
}
