use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at, write_le_at_dyn},
    metadata::tables::{RowDefinition, RowReadable, RowWritable, SortedRow, TableId, TableInfoRef},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `ClassLayout` table specifies explicit packing and size of a type, `TableId` = 0x0F
pub struct ClassLayoutRaw {
    /// a 2-byte constant
    pub packing_size: u32,
    /// a 4-byte constant
    pub class_size: u32,
    /// an index into the `TypeDef` table
    pub parent: u32,
}

impl RowDefinition for ClassLayoutRaw {
    const TABLE_ID: TableId = TableId::ClassLayout;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* packing_size */ 2 +
            /* class_size */   4 +
            /* parent */       sizes.table_index_bytes(TableId::TypeDef)
        )
    }
}

impl RowReadable for ClassLayoutRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(ClassLayoutRaw {
            packing_size: u32::from(read_le_at::<u16>(data, offset)?),
            class_size: read_le_at::<u32>(data, offset)?,
            parent: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
        })
    }
}

impl RowWritable for ClassLayoutRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.packing_size, false)?;
        write_le_at(data, offset, self.class_size)?;
        write_le_at_dyn(data, offset, self.parent, sizes.is_large(TableId::TypeDef))?;
        Ok(())
    }
}

impl SortedRow for ClassLayoutRaw {
    fn sort_key(&self) -> u32 {
        self.parent
    }
}
