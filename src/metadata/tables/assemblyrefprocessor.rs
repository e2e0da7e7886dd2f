use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at, write_le_at_dyn},
    metadata::tables::{RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `AssemblyRefProcessor` table, `TableId` = 0x24. Should be ignored by the CLI.
pub struct AssemblyRefProcessorRaw {
    /// a 4-byte constant
    pub processor: u32,
    /// an index into the `AssemblyRef` table
    pub assembly_ref: u32,
}

impl RowDefinition for AssemblyRefProcessorRaw {
    const TABLE_ID: TableId = TableId::AssemblyRefProcessor;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* processor */    4 +
            /* assembly_ref */ sizes.table_index_bytes(TableId::AssemblyRef)
        )
    }
}

impl RowReadable for AssemblyRefProcessorRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(AssemblyRefProcessorRaw {
            processor: read_le_at::<u32>(data, offset)?,
            assembly_ref: read_le_at_dyn(data, offset, sizes.is_large(TableId::AssemblyRef))?,
        })
    }
}

impl RowWritable for AssemblyRefProcessorRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at(data, offset, self.processor)?;
        write_le_at_dyn(data, offset, self.assembly_ref, sizes.is_large(TableId::AssemblyRef))?;
        Ok(())
    }
}
