use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at_dyn},
    metadata::tables::{RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `Property` table defines properties, `TableId` = 0x17
pub struct PropertyRaw {
    /// a 2-byte bitmask of type `PropertyAttributes`, §II.23.1.14
    pub flags: u32,
    /// an index into the String heap
    pub name: u32,
    /// an index into the Blob heap
    pub signature: u32,
}

impl RowDefinition for PropertyRaw {
    const TABLE_ID: TableId = TableId::Property;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* flags */     2 +
            /* name */      sizes.str_bytes() +
            /* signature */ sizes.blob_bytes()
        )
    }
}

impl RowReadable for PropertyRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(PropertyRaw {
            flags: u32::from(read_le_at::<u16>(data, offset)?),
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            signature: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

impl RowWritable for PropertyRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.flags, false)?;
        write_le_at_dyn(data, offset, self.name, sizes.is_large_str())?;
        write_le_at_dyn(data, offset, self.signature, sizes.is_large_blob())?;
        Ok(())
    }
}
