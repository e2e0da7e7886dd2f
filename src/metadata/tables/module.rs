use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at_dyn},
    metadata::tables::{RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `Module` table describes the current module, `TableId` = 0x00. It holds exactly one row.
pub struct ModuleRaw {
    /// a 2-byte value, reserved, shall be zero
    pub generation: u32,
    /// an index into the String heap
    pub name: u32,
    /// an index into the Guid heap; simply a Guid used to distinguish between two versions of the same module
    pub mvid: u32,
    /// an index into the Guid heap; reserved, shall be zero
    pub encid: u32,
    /// an index into the Guid heap; reserved, shall be zero
    pub encbaseid: u32,
}

impl RowDefinition for ModuleRaw {
    const TABLE_ID: TableId = TableId::Module;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* generation */ 2 +
            /* name */       sizes.str_bytes() +
            /* mvid */       sizes.guid_bytes() +
            /* encid */      sizes.guid_bytes() +
            /* encbaseid */  sizes.guid_bytes()
        )
    }
}

impl RowReadable for ModuleRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(ModuleRaw {
            generation: u32::from(read_le_at::<u16>(data, offset)?),
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            mvid: read_le_at_dyn(data, offset, sizes.is_large_guid())?,
            encid: read_le_at_dyn(data, offset, sizes.is_large_guid())?,
            encbaseid: read_le_at_dyn(data, offset, sizes.is_large_guid())?,
        })
    }
}

impl RowWritable for ModuleRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.generation, false)?;
        write_le_at_dyn(data, offset, self.name, sizes.is_large_str())?;
        write_le_at_dyn(data, offset, self.mvid, sizes.is_large_guid())?;
        write_le_at_dyn(data, offset, self.encid, sizes.is_large_guid())?;
        write_le_at_dyn(data, offset, self.encbaseid, sizes.is_large_guid())?;
        Ok(())
    }
}
