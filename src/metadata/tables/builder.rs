//! Assembly of a complete tables stream (`#~`) from typed row tables.
//!
//! [`TablesBuilder`] owns one typed table per table kind. Rows are appended while the member
//! graph is lowered; once nothing grows anymore, [`TablesBuilder::write`] sorts the sorted
//! tables, derives every index width from the final row counts and heap sizes, and serializes
//! header and rows into one buffer.

use rayon::prelude::*;
use std::sync::Arc;
use strum::IntoEnumIterator;

use crate::{
    file::io::write_le_at,
    metadata::{
        config::MetadataConfig,
        streams::HeapWriter,
        tables::{
            AssemblyOsRaw, AssemblyProcessorRaw, AssemblyRaw, AssemblyRefOsRaw,
            AssemblyRefProcessorRaw, AssemblyRefRaw, ClassLayoutRaw, ConstantRaw,
            CustomAttributeRaw, DeclSecurityRaw, EncLogRaw, EncMapRaw, EventMapRaw, EventPtrRaw,
            EventRaw, ExportedTypeRaw, FieldLayoutRaw, FieldMarshalRaw, FieldPtrRaw, FieldRaw,
            FieldRvaRaw, FileRaw, GenericParamConstraintRaw, GenericParamRaw, ImplMapRaw,
            InterfaceImplRaw, ManifestResourceRaw, MemberRefRaw, MethodDefRaw, MethodImplRaw,
            MethodPtrRaw, MethodSemanticsRaw, MethodSpecRaw, ModuleRaw, ModuleRefRaw,
            NestedClassRaw, ParamPtrRaw, ParamRaw, PropertyMapRaw, PropertyPtrRaw, PropertyRaw,
            RowTable, SingleRowTable, SortedRowTable, StandAloneSigRaw, Table, TableId,
            TableInfo, TableInfoRef, TypeDefRaw, TypeRefRaw, TypeSpecRaw,
        },
    },
    Result,
};

/// Size of the fixed part of the tables stream header
const HEADER_SIZE: usize = 24;

macro_rules! tables_builder {
    ($($field:ident: $kind:ident<$raw:ident>),* $(,)?) => {
        /// One typed table per metadata table kind, in table id order.
        ///
        /// The fields are public so callers append rows directly through the table's own
        /// `add_row`, getting back the row id to reference from other rows.
        pub struct TablesBuilder {
            config: MetadataConfig,
            $(
                #[allow(missing_docs)]
                pub $field: $kind<$raw>,
            )*
        }

        impl TablesBuilder {
            /// Creates a builder with every table empty
            #[must_use]
            pub fn new(config: MetadataConfig) -> Self {
                TablesBuilder {
                    config,
                    $($field: $kind::new(),)*
                }
            }

            /// Type erased view of every table, in table id order
            #[must_use]
            pub fn tables(&self) -> Vec<&dyn Table> {
                vec![$(&self.$field as &dyn Table),*]
            }

            fn tables_mut(&mut self) -> Vec<&mut dyn Table> {
                vec![$(&mut self.$field as &mut dyn Table),*]
            }
        }
    };
}

tables_builder! {
    module: SingleRowTable<ModuleRaw>,
    type_ref: RowTable<TypeRefRaw>,
    type_def: RowTable<TypeDefRaw>,
    field_ptr: RowTable<FieldPtrRaw>,
    field: RowTable<FieldRaw>,
    method_ptr: RowTable<MethodPtrRaw>,
    method_def: RowTable<MethodDefRaw>,
    param_ptr: RowTable<ParamPtrRaw>,
    param: RowTable<ParamRaw>,
    interface_impl: RowTable<InterfaceImplRaw>,
    member_ref: RowTable<MemberRefRaw>,
    constant: SortedRowTable<ConstantRaw>,
    custom_attribute: SortedRowTable<CustomAttributeRaw>,
    field_marshal: SortedRowTable<FieldMarshalRaw>,
    decl_security: SortedRowTable<DeclSecurityRaw>,
    class_layout: SortedRowTable<ClassLayoutRaw>,
    field_layout: SortedRowTable<FieldLayoutRaw>,
    stand_alone_sig: RowTable<StandAloneSigRaw>,
    event_map: RowTable<EventMapRaw>,
    event_ptr: RowTable<EventPtrRaw>,
    event: RowTable<EventRaw>,
    property_map: RowTable<PropertyMapRaw>,
    property_ptr: RowTable<PropertyPtrRaw>,
    property: RowTable<PropertyRaw>,
    method_semantics: SortedRowTable<MethodSemanticsRaw>,
    method_impl: RowTable<MethodImplRaw>,
    module_ref: RowTable<ModuleRefRaw>,
    type_spec: RowTable<TypeSpecRaw>,
    impl_map: SortedRowTable<ImplMapRaw>,
    field_rva: RowTable<FieldRvaRaw>,
    enc_log: RowTable<EncLogRaw>,
    enc_map: RowTable<EncMapRaw>,
    assembly: SingleRowTable<AssemblyRaw>,
    assembly_processor: RowTable<AssemblyProcessorRaw>,
    assembly_os: RowTable<AssemblyOsRaw>,
    assembly_ref: RowTable<AssemblyRefRaw>,
    assembly_ref_processor: RowTable<AssemblyRefProcessorRaw>,
    assembly_ref_os: RowTable<AssemblyRefOsRaw>,
    file: RowTable<FileRaw>,
    exported_type: RowTable<ExportedTypeRaw>,
    manifest_resource: RowTable<ManifestResourceRaw>,
    nested_class: RowTable<NestedClassRaw>,
    generic_param: RowTable<GenericParamRaw>,
    method_spec: RowTable<MethodSpecRaw>,
    generic_param_constraint: RowTable<GenericParamConstraintRaw>,
}

impl TablesBuilder {
    /// The configuration this builder writes with
    #[must_use]
    pub fn config(&self) -> &MetadataConfig {
        &self.config
    }

    /// Current row count of a table
    #[must_use]
    pub fn row_count(&self, table_id: TableId) -> u32 {
        self.tables()[table_id as usize].len()
    }

    /// Orders the rows of the eight sorted tables by their key column.
    ///
    /// Each table is sorted independently, so with `parallel_sort` the tables are handed to
    /// the rayon thread pool.
    pub fn sort_all(&mut self) {
        let parallel = self.config.parallel_sort;
        let mut sorted: Vec<&mut dyn Table> = self
            .tables_mut()
            .into_iter()
            .filter(|table| table.is_sorted_table() && !table.is_empty())
            .collect();

        log::debug!("Sorting {} tables (parallel: {})", sorted.len(), parallel);

        if parallel {
            sorted.par_iter_mut().for_each(|table| table.sort());
        } else {
            sorted.iter_mut().for_each(|table| table.sort());
        }
    }

    /// Index widths of the image as it stands, combining row counts, heap sizes and the
    /// forced widths of the configuration.
    ///
    /// Only meaningful once every table has stopped growing.
    #[must_use]
    pub fn table_info(&self, heaps: &HeapWriter) -> TableInfoRef {
        let rows: Vec<(TableId, u32)> = self
            .tables()
            .iter()
            .map(|table| (table.id(), table.len()))
            .collect();

        Arc::new(TableInfo::from_rows(
            &rows,
            heaps.is_large_strings() || self.config.force_large_strings,
            heaps.is_large_blob() || self.config.force_large_blobs,
            heaps.is_large_guid() || self.config.force_large_guids,
        ))
    }

    /// Sorts the sorted tables and serializes the complete `#~` stream.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidReference`] if a coded index targets a table outside its
    /// category, or [`crate::Error::OutOfBounds`] if a value does not fit its column.
    pub fn write(&mut self, heaps: &HeapWriter) -> Result<Vec<u8>> {
        self.sort_all();

        let info = self.table_info(heaps);
        let tables = self.tables();
        let present: Vec<&dyn Table> = tables.into_iter().filter(|t| !t.is_empty()).collect();

        let valid = present.iter().fold(0u64, |bits, table| bits | table.id().bit());
        let sorted = TableId::iter()
            .filter(|table_id| table_id.is_sorted())
            .fold(0u64, |bits, table_id| bits | table_id.bit());

        let rows_size: u64 = present.iter().map(|table| table.size(&info)).sum();
        let Ok(rows_size) = usize::try_from(rows_size) else {
            return Err(malformed_error!("Tables stream too large - {} bytes", rows_size));
        };

        let size = HEADER_SIZE + present.len() * 4 + rows_size;
        let mut data = vec![0u8; (size + 3) & !3];
        let mut offset = 0;

        write_le_at(&mut data, &mut offset, 0u32)?;
        write_le_at(&mut data, &mut offset, self.config.major_version)?;
        write_le_at(&mut data, &mut offset, self.config.minor_version)?;
        write_le_at(&mut data, &mut offset, info.heap_size_flags())?;
        write_le_at(&mut data, &mut offset, 1u8)?;
        write_le_at(&mut data, &mut offset, valid)?;
        write_le_at(&mut data, &mut offset, sorted)?;

        for table in &present {
            write_le_at(&mut data, &mut offset, table.len())?;
        }

        for table in &present {
            table.write(&mut data, &mut offset, &info)?;
        }

        log::debug!(
            "Wrote tables stream: {} tables, {} bytes, heap flags 0x{:02x}",
            present.len(),
            data.len(),
            info.heap_size_flags()
        );

        Ok(data)
    }
}
