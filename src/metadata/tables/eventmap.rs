use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::tables::{RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `EventMap` table maps a type to the run of events it owns, `TableId` = 0x12
pub struct EventMapRaw {
    /// an index into the `TypeDef` table
    pub parent: u32,
    /// an index into the `Event` table; the first of a contiguous run of events owned by this type
    pub event_list: u32,
}

impl RowDefinition for EventMapRaw {
    const TABLE_ID: TableId = TableId::EventMap;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* parent */     sizes.table_index_bytes(TableId::TypeDef) +
            /* event_list */ sizes.table_index_bytes(TableId::Event)
        )
    }
}

impl RowReadable for EventMapRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(EventMapRaw {
            parent: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
            event_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::Event))?,
        })
    }
}

impl RowWritable for EventMapRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.parent, sizes.is_large(TableId::TypeDef))?;
        write_le_at_dyn(data, offset, self.event_list, sizes.is_large(TableId::Event))?;
        Ok(())
    }
}
