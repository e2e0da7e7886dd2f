use crate::{
    file::io::{read_le_at, write_le_at},
    metadata::tables::{RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `AssemblyProcessor` table, `TableId` = 0x21. Should be ignored by the CLI.
pub struct AssemblyProcessorRaw {
    /// a 4-byte constant
    pub processor: u32,
}

impl RowDefinition for AssemblyProcessorRaw {
    const TABLE_ID: TableId = TableId::AssemblyProcessor;

    #[rustfmt::skip]
    fn row_size(_sizes: &TableInfoRef) -> u32 {
        /* processor */
        4
    }
}

impl RowReadable for AssemblyProcessorRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, _sizes: &TableInfoRef) -> Result<Self> {
        Ok(AssemblyProcessorRaw {
            processor: read_le_at::<u32>(data, offset)?,
        })
    }
}

impl RowWritable for AssemblyProcessorRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        _sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at(data, offset, self.processor)?;
        Ok(())
    }
}
