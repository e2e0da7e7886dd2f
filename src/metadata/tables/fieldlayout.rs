use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at, write_le_at_dyn},
    metadata::tables::{RowDefinition, RowReadable, RowWritable, SortedRow, TableId, TableInfoRef},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `FieldLayout` table specifies explicit field offsets, `TableId` = 0x10
pub struct FieldLayoutRaw {
    /// a 4-byte constant, the byte offset of the field
    pub field_offset: u32,
    /// an index into the `Field` table
    pub field: u32,
}

impl RowDefinition for FieldLayoutRaw {
    const TABLE_ID: TableId = TableId::FieldLayout;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* field_offset */ 4 +
            /* field */        sizes.table_index_bytes(TableId::Field)
        )
    }
}

impl RowReadable for FieldLayoutRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(FieldLayoutRaw {
            field_offset: read_le_at::<u32>(data, offset)?,
            field: read_le_at_dyn(data, offset, sizes.is_large(TableId::Field))?,
        })
    }
}

impl RowWritable for FieldLayoutRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at(data, offset, self.field_offset)?;
        write_le_at_dyn(data, offset, self.field, sizes.is_large(TableId::Field))?;
        Ok(())
    }
}

impl SortedRow for FieldLayoutRaw {
    fn sort_key(&self) -> u32 {
        self.field
    }
}
