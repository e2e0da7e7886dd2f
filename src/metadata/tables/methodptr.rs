use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::tables::{RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `MethodPtr` table adds a level of indirection to the `MethodDef` table, `TableId` = 0x05
pub struct MethodPtrRaw {
    /// an index into the `MethodDef` table
    pub method: u32,
}

impl RowDefinition for MethodPtrRaw {
    const TABLE_ID: TableId = TableId::MethodPtr;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* method */ sizes.table_index_bytes(TableId::MethodDef)
        )
    }
}

impl RowReadable for MethodPtrRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(MethodPtrRaw {
            method: read_le_at_dyn(data, offset, sizes.is_large(TableId::MethodDef))?,
        })
    }
}

impl RowWritable for MethodPtrRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.method, sizes.is_large(TableId::MethodDef))?;
        Ok(())
    }
}
