use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::tables::{RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `PropertyMap` table maps a type to the run of properties it owns, `TableId` = 0x15
pub struct PropertyMapRaw {
    /// an index into the `TypeDef` table
    pub parent: u32,
    /// an index into the `Property` table; the first of a contiguous run of properties owned by this type
    pub property_list: u32,
}

impl RowDefinition for PropertyMapRaw {
    const TABLE_ID: TableId = TableId::PropertyMap;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* parent */        sizes.table_index_bytes(TableId::TypeDef) +
            /* property_list */ sizes.table_index_bytes(TableId::Property)
        )
    }
}

impl RowReadable for PropertyMapRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(PropertyMapRaw {
            parent: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
            property_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::Property))?,
        })
    }
}

impl RowWritable for PropertyMapRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.parent, sizes.is_large(TableId::TypeDef))?;
        write_le_at_dyn(data, offset, self.property_list, sizes.is_large(TableId::Property))?;
        Ok(())
    }
}
