use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::tables::{
        CodedIndex, CodedIndexType, RowDefinition, RowReadable, RowWritable, SortedRow, TableId,
        TableInfoRef,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `FieldMarshal` table links fields and parameters to their interop marshalling descriptor, `TableId` = 0x0D
pub struct FieldMarshalRaw {
    /// an index into `Field` or `Param` table; more precisely, a `HasFieldMarshal` (§II.24.2.6) coded index
    pub parent: CodedIndex,
    /// an index into the Blob heap
    pub native_type: u32,
}

impl RowDefinition for FieldMarshalRaw {
    const TABLE_ID: TableId = TableId::FieldMarshal;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* parent */      sizes.coded_index_bytes(CodedIndexType::HasFieldMarshal) +
            /* native_type */ sizes.blob_bytes()
        )
    }
}

impl RowReadable for FieldMarshalRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(FieldMarshalRaw {
            parent: CodedIndex::read(data, offset, sizes, CodedIndexType::HasFieldMarshal)?,
            native_type: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

impl RowWritable for FieldMarshalRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        self.parent.write(data, offset, sizes, CodedIndexType::HasFieldMarshal)?;
        write_le_at_dyn(data, offset, self.native_type, sizes.is_large_blob())?;
        Ok(())
    }
}

impl SortedRow for FieldMarshalRaw {
    fn sort_key(&self) -> u32 {
        // References outside the category sort last, writing the row reports them
        CodedIndexType::HasFieldMarshal
            .encode(self.parent.tag, self.parent.row)
            .unwrap_or(u32::MAX)
    }
}
