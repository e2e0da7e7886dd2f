use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::tables::{
        CodedIndex, CodedIndexType, RowDefinition, RowReadable, RowWritable, SortedRow, TableId,
        TableInfoRef,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `CustomAttribute` table associates attributes with elements in various metadata tables, `TableId` = 0x0C
pub struct CustomAttributeRaw {
    /// an index into a metadata table that has an associated `HasCustomAttribute` (§II.24.2.6) coded index
    pub parent: CodedIndex,
    /// an index into the `MethodDef` or `MemberRef` table; more precisely, a `CustomAttributeType` (§II.24.2.6) coded index
    pub constructor: CodedIndex,
    /// an index into the Blob heap
    pub value: u32,
}

impl RowDefinition for CustomAttributeRaw {
    const TABLE_ID: TableId = TableId::CustomAttribute;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* parent */      sizes.coded_index_bytes(CodedIndexType::HasCustomAttribute) +
            /* constructor */ sizes.coded_index_bytes(CodedIndexType::CustomAttributeType) +
            /* value */       sizes.blob_bytes()
        )
    }
}

impl RowReadable for CustomAttributeRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(CustomAttributeRaw {
            parent: CodedIndex::read(data, offset, sizes, CodedIndexType::HasCustomAttribute)?,
            constructor: CodedIndex::read(data, offset, sizes, CodedIndexType::CustomAttributeType)?,
            value: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

impl RowWritable for CustomAttributeRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        self.parent.write(data, offset, sizes, CodedIndexType::HasCustomAttribute)?;
        self.constructor.write(data, offset, sizes, CodedIndexType::CustomAttributeType)?;
        write_le_at_dyn(data, offset, self.value, sizes.is_large_blob())?;
        Ok(())
    }
}

impl SortedRow for CustomAttributeRaw {
    fn sort_key(&self) -> u32 {
        // References outside the category sort last, writing the row reports them
        CodedIndexType::HasCustomAttribute
            .encode(self.parent.tag, self.parent.row)
            .unwrap_or(u32::MAX)
    }
}
