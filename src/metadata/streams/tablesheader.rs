//! Tables stream (`#~`) header and typed table access.
//!
//! The stream starts with a fixed 24 byte header, followed by one `u32` row count per present
//! table and then the rows of every present table in table id order:
//!
//! | Offset | Size | Field          | Description                                     |
//! |--------|------|----------------|-------------------------------------------------|
//! | 0      | 4    | Reserved       | Always 0                                        |
//! | 4      | 1    | MajorVersion   | Major version of the table schema (2)           |
//! | 5      | 1    | MinorVersion   | Minor version of the table schema (0)           |
//! | 6      | 1    | HeapSizes      | Bit flags for 4 byte heap indices               |
//! | 7      | 1    | Reserved       | Always 1                                        |
//! | 8      | 8    | Valid          | Bit vector of present tables                    |
//! | 16     | 8    | Sorted         | Bit vector of sorted tables                     |
//! | 24     | 4*n  | Rows           | Row count of each present table                 |
//!
//! # Reference
//! - [ECMA-335 II.24.2.6](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use std::sync::Arc;
use strum::{EnumCount, IntoEnumIterator};

use crate::{
    file::io::read_le,
    metadata::tables::{MetadataTable, RowReadable, TableId, TableInfo, TableInfoRef},
    Error::OutOfBounds,
    Result,
};

/// Parsed header of a `#~` stream, with access to each present table.
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::{streams::TablesHeader, tables::{ModuleRaw, TablesBuilder}};
/// use cilmeta::metadata::{config::MetadataConfig, streams::HeapWriter};
///
/// let mut heaps = HeapWriter::new();
/// let mut tables = TablesBuilder::new(MetadataConfig::default());
/// tables.module.add_row(ModuleRaw {
///     generation: 0,
///     name: heaps.intern_string("app.dll")?,
///     mvid: 0,
///     encid: 0,
///     encbaseid: 0,
/// })?;
///
/// let stream = tables.write(&heaps)?;
/// let header = TablesHeader::from(&stream)?;
/// let module = header.table::<ModuleRaw>().unwrap();
/// assert_eq!(module.row_count(), 1);
/// # Ok::<(), cilmeta::Error>(())
/// ```
pub struct TablesHeader<'a> {
    /// Major version of the table schema, shall be 2
    pub major_version: u8,
    /// Minor version of the table schema, shall be 0
    pub minor_version: u8,
    /// Bit vector of present tables
    pub valid: u64,
    /// Bit vector of sorted tables
    pub sorted: u64,
    /// Row counts and index widths of all tables
    pub info: TableInfoRef,
    data: &'a [u8],
    /// Byte offset of the first row of every present table
    offsets: Vec<Option<usize>>,
}

/// Row count of one present table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    /// The table
    pub table_id: TableId,
    /// Number of rows in the table
    pub row_count: u32,
}

impl<'a> TablesHeader<'a> {
    /// Parses the header of a `#~` stream and locates every present table.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the stream is truncated, or
    /// [`crate::Error::Malformed`] if it names tables this crate does not know.
    pub fn from(data: &'a [u8]) -> Result<TablesHeader<'a>> {
        if data.len() < 24 {
            return Err(OutOfBounds);
        }

        let valid = read_le::<u64>(&data[8..])?;
        if valid >> TableId::COUNT != 0 {
            return Err(malformed_error!(
                "Tables stream references unknown tables - valid: 0x{:016x}",
                valid
            ));
        }

        let info = Arc::new(TableInfo::new(data, valid)?);
        let mut offsets = vec![None; TableId::COUNT];
        let mut current_offset = 24 + valid.count_ones() as usize * 4;

        for table_id in TableId::iter() {
            if valid & table_id.bit() == 0 {
                continue;
            }

            let size = table_size(&info, table_id);
            let Some(end) = current_offset.checked_add(size) else {
                return Err(OutOfBounds);
            };

            if end > data.len() {
                return Err(OutOfBounds);
            }

            offsets[table_id as usize] = Some(current_offset);
            current_offset = end;
        }

        Ok(TablesHeader {
            major_version: read_le::<u8>(&data[4..])?,
            minor_version: read_le::<u8>(&data[5..])?,
            valid,
            sorted: read_le::<u64>(&data[16..])?,
            info,
            data,
            offsets,
        })
    }

    /// Number of present tables
    #[must_use]
    pub fn table_count(&self) -> u32 {
        self.valid.count_ones()
    }

    /// Returns true if the table is present
    #[must_use]
    pub fn has_table(&self, table_id: TableId) -> bool {
        self.valid & table_id.bit() != 0
    }

    /// Typed access to the rows of the table `T` belongs to, `None` if it is absent
    #[must_use]
    pub fn table<T: RowReadable>(&self) -> Option<MetadataTable<'a, T>> {
        let start = self.offsets[T::TABLE_ID as usize]?;
        let row_count = self.info.get(T::TABLE_ID).rows;

        MetadataTable::new(&self.data[start..], row_count, self.info.clone()).ok()
    }

    /// Row count of every present table, in table id order
    #[must_use]
    pub fn table_summaries(&self) -> Vec<TableSummary> {
        TableId::iter()
            .filter(|table_id| self.has_table(*table_id))
            .map(|table_id| TableSummary {
                table_id,
                row_count: self.info.get(table_id).rows,
            })
            .collect()
    }
}

/// Byte size of a table, computed from its row layout
fn table_size(info: &TableInfoRef, table_id: TableId) -> usize {
    macro_rules! size_of_rows {
        ($($id:ident => $raw:ident),* $(,)?) => {
            match table_id {
                $(TableId::$id => {
                    <crate::metadata::tables::$raw as crate::metadata::tables::RowDefinition>::row_size(info)
                })*
            }
        };
    }

    let row_size = size_of_rows! {
        Module => ModuleRaw,
        TypeRef => TypeRefRaw,
        TypeDef => TypeDefRaw,
        FieldPtr => FieldPtrRaw,
        Field => FieldRaw,
        MethodPtr => MethodPtrRaw,
        MethodDef => MethodDefRaw,
        ParamPtr => ParamPtrRaw,
        Param => ParamRaw,
        InterfaceImpl => InterfaceImplRaw,
        MemberRef => MemberRefRaw,
        Constant => ConstantRaw,
        CustomAttribute => CustomAttributeRaw,
        FieldMarshal => FieldMarshalRaw,
        DeclSecurity => DeclSecurityRaw,
        ClassLayout => ClassLayoutRaw,
        FieldLayout => FieldLayoutRaw,
        StandAloneSig => StandAloneSigRaw,
        EventMap => EventMapRaw,
        EventPtr => EventPtrRaw,
        Event => EventRaw,
        PropertyMap => PropertyMapRaw,
        PropertyPtr => PropertyPtrRaw,
        Property => PropertyRaw,
        MethodSemantics => MethodSemanticsRaw,
        MethodImpl => MethodImplRaw,
        ModuleRef => ModuleRefRaw,
        TypeSpec => TypeSpecRaw,
        ImplMap => ImplMapRaw,
        FieldRVA => FieldRvaRaw,
        EncLog => EncLogRaw,
        EncMap => EncMapRaw,
        Assembly => AssemblyRaw,
        AssemblyProcessor => AssemblyProcessorRaw,
        AssemblyOS => AssemblyOsRaw,
        AssemblyRef => AssemblyRefRaw,
        AssemblyRefProcessor => AssemblyRefProcessorRaw,
        AssemblyRefOS => AssemblyRefOsRaw,
        File => FileRaw,
        ExportedType => ExportedTypeRaw,
        ManifestResource => ManifestResourceRaw,
        NestedClass => NestedClassRaw,
        GenericParam => GenericParamRaw,
        MethodSpec => MethodSpecRaw,
        GenericParamConstraint => GenericParamConstraintRaw,
    };

    info.get(table_id).rows as usize * row_size as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{FieldRaw, TypeRefRaw};

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data = vec![
            0x00, 0x00, 0x00, 0x00, // reserved
            0x02, 0x00,             // version 2.0
            0x00,                   // heap sizes
            0x01,                   // reserved
            0x12, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // valid: TypeRef, Field
            0x00, 0x16, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // sorted
            0x01, 0x00, 0x00, 0x00, // TypeRef rows
            0x02, 0x00, 0x00, 0x00, // Field rows
            // TypeRef 1
            0x06, 0x00, 0x01, 0x00, 0x08, 0x00,
            // Field 1
            0x01, 0x00, 0x10, 0x00, 0x01, 0x00,
            // Field 2
            0x11, 0x00, 0x14, 0x00, 0x05, 0x00,
        ];

        let header = TablesHeader::from(&data).unwrap();
        assert_eq!(header.major_version, 2);
        assert_eq!(header.minor_version, 0);
        assert_eq!(header.table_count(), 2);
        assert!(header.has_table(TableId::Field));
        assert!(!header.has_table(TableId::TypeDef));
        assert_eq!(
            header.table_summaries(),
            vec![
                TableSummary { table_id: TableId::TypeRef, row_count: 1 },
                TableSummary { table_id: TableId::Field, row_count: 2 },
            ]
        );

        let typeref = header.table::<TypeRefRaw>().unwrap().get(1).unwrap();
        assert_eq!(typeref.resolution_scope.tag, TableId::AssemblyRef);
        assert_eq!(typeref.resolution_scope.row, 1);
        assert_eq!(typeref.type_name, 1);
        assert_eq!(typeref.type_namespace, 8);

        let fields = header.table::<FieldRaw>().unwrap();
        let names: Vec<u32> = fields.iter().map(|field| field.name).collect();
        assert_eq!(names, vec![0x10, 0x14]);

        assert!(header.table::<crate::metadata::tables::TypeDefRaw>().is_none());
    }

    #[test]
    fn truncated() {
        #[rustfmt::skip]
        let data = vec![
            0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x01,
            0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x10, 0x00, 0x01, 0x00,
        ];

        assert!(matches!(TablesHeader::from(&data), Err(OutOfBounds)));
        assert!(matches!(TablesHeader::from(&data[..20]), Err(OutOfBounds)));
    }
}
