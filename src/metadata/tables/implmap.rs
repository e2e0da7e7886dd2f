use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at_dyn},
    metadata::tables::{
        CodedIndex, CodedIndexType, RowDefinition, RowReadable, RowWritable, SortedRow, TableId,
        TableInfoRef,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `ImplMap` table holds P/Invoke mappings, `TableId` = 0x1C
pub struct ImplMapRaw {
    /// a 2-byte bitmask of type `PInvokeAttributes`, §23.1.8
    pub mapping_flags: u32,
    /// an index into the `Field` or `MethodDef` table; more precisely, a `MemberForwarded` (§II.24.2.6) coded index
    pub member_forwarded: CodedIndex,
    /// an index into the String heap
    pub import_name: u32,
    /// an index into the `ModuleRef` table
    pub import_scope: u32,
}

impl RowDefinition for ImplMapRaw {
    const TABLE_ID: TableId = TableId::ImplMap;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* mapping_flags */    2 +
            /* member_forwarded */ sizes.coded_index_bytes(CodedIndexType::MemberForwarded) +
            /* import_name */      sizes.str_bytes() +
            /* import_scope */     sizes.table_index_bytes(TableId::ModuleRef)
        )
    }
}

impl RowReadable for ImplMapRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(ImplMapRaw {
            mapping_flags: u32::from(read_le_at::<u16>(data, offset)?),
            member_forwarded: CodedIndex::read(data, offset, sizes, CodedIndexType::MemberForwarded)?,
            import_name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            import_scope: read_le_at_dyn(data, offset, sizes.is_large(TableId::ModuleRef))?,
        })
    }
}

impl RowWritable for ImplMapRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.mapping_flags, false)?;
        self.member_forwarded.write(data, offset, sizes, CodedIndexType::MemberForwarded)?;
        write_le_at_dyn(data, offset, self.import_name, sizes.is_large_str())?;
        write_le_at_dyn(data, offset, self.import_scope, sizes.is_large(TableId::ModuleRef))?;
        Ok(())
    }
}

impl SortedRow for ImplMapRaw {
    fn sort_key(&self) -> u32 {
        // References outside the category sort last, writing the row reports them
        CodedIndexType::MemberForwarded
            .encode(self.member_forwarded.tag, self.member_forwarded.row)
            .unwrap_or(u32::MAX)
    }
}
