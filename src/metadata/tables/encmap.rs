use crate::{
    file::io::{read_le_at, write_le_at},
    metadata::tables::{RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `EncMap` table maps edit and continue tokens, `TableId` = 0x1F
pub struct EncMapRaw {
    /// a 4-byte metadata token
    pub token_value: u32,
}

impl RowDefinition for EncMapRaw {
    const TABLE_ID: TableId = TableId::EncMap;

    #[rustfmt::skip]
    fn row_size(_sizes: &TableInfoRef) -> u32 {
        /* token_value */
        4
    }
}

impl RowReadable for EncMapRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, _sizes: &TableInfoRef) -> Result<Self> {
        Ok(EncMapRaw {
            token_value: read_le_at::<u32>(data, offset)?,
        })
    }
}

impl RowWritable for EncMapRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        _sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at(data, offset, self.token_value)?;
        Ok(())
    }
}
