use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::tables::{RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `FieldPtr` table adds a level of indirection to the `Field` table, `TableId` = 0x03
pub struct FieldPtrRaw {
    /// an index into the `Field` table
    pub field: u32,
}

impl RowDefinition for FieldPtrRaw {
    const TABLE_ID: TableId = TableId::FieldPtr;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* field */ sizes.table_index_bytes(TableId::Field)
        )
    }
}

impl RowReadable for FieldPtrRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(FieldPtrRaw {
            field: read_le_at_dyn(data, offset, sizes.is_large(TableId::Field))?,
        })
    }
}

impl RowWritable for FieldPtrRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.field, sizes.is_large(TableId::Field))?;
        Ok(())
    }
}
