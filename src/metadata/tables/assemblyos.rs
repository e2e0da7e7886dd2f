use crate::{
    file::io::{read_le_at, write_le_at},
    metadata::tables::{RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `AssemblyOS` table, `TableId` = 0x22. Should be ignored by the CLI.
pub struct AssemblyOsRaw {
    /// a 4-byte constant
    pub os_platform_id: u32,
    /// a 4-byte constant
    pub os_major_version: u32,
    /// a 4-byte constant
    pub os_minor_version: u32,
}

impl RowDefinition for AssemblyOsRaw {
    const TABLE_ID: TableId = TableId::AssemblyOS;

    #[rustfmt::skip]
    fn row_size(_sizes: &TableInfoRef) -> u32 {
        /* os_platform_id, os_major_version, os_minor_version */
        12
    }
}

impl RowReadable for AssemblyOsRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, _sizes: &TableInfoRef) -> Result<Self> {
        Ok(AssemblyOsRaw {
            os_platform_id: read_le_at::<u32>(data, offset)?,
            os_major_version: read_le_at::<u32>(data, offset)?,
            os_minor_version: read_le_at::<u32>(data, offset)?,
        })
    }
}

impl RowWritable for AssemblyOsRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        _sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at(data, offset, self.os_platform_id)?;
        write_le_at(data, offset, self.os_major_version)?;
        write_le_at(data, offset, self.os_minor_version)?;
        Ok(())
    }
}
