use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at, write_le_at_dyn},
    metadata::tables::{RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `FieldRVA` table holds the initial data location of static fields, `TableId` = 0x1D
pub struct FieldRvaRaw {
    /// a 4-byte constant
    pub rva: u32,
    /// an index into the `Field` table
    pub field: u32,
}

impl RowDefinition for FieldRvaRaw {
    const TABLE_ID: TableId = TableId::FieldRVA;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* rva */   4 +
            /* field */ sizes.table_index_bytes(TableId::Field)
        )
    }
}

impl RowReadable for FieldRvaRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(FieldRvaRaw {
            rva: read_le_at::<u32>(data, offset)?,
            field: read_le_at_dyn(data, offset, sizes.is_large(TableId::Field))?,
        })
    }
}

impl RowWritable for FieldRvaRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at(data, offset, self.rva)?;
        write_le_at_dyn(data, offset, self.field, sizes.is_large(TableId::Field))?;
        Ok(())
    }
}
