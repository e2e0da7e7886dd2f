use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::tables::{RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `EventPtr` table adds a level of indirection to the `Event` table, `TableId` = 0x13
pub struct EventPtrRaw {
    /// an index into the `Event` table
    pub event: u32,
}

impl RowDefinition for EventPtrRaw {
    const TABLE_ID: TableId = TableId::EventPtr;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* event */ sizes.table_index_bytes(TableId::Event)
        )
    }
}

impl RowReadable for EventPtrRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(EventPtrRaw {
            event: read_le_at_dyn(data, offset, sizes.is_large(TableId::Event))?,
        })
    }
}

impl RowWritable for EventPtrRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.event, sizes.is_large(TableId::Event))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::metadata::tables::{MetadataTable, TableInfo};

    #[test]
    fn crafted_short() {
        let data = vec![
            0x01, 0x01, // event
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::EventPtr, 1),
                (TableId::Event, 1),
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<EventPtrRaw>::new(&data, 1, sizes.clone()).unwrap();

        let eval = |row: EventPtrRaw| {
            assert_eq!(row.event, 0x0101);
        };

        for row in table.iter() {
            eval(row);
        }

        let row = table.get(1).unwrap();
        let mut buffer = vec![0u8; EventPtrRaw::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, buffer.len());
        assert_eq!(buffer, data);
        eval(row);
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x01, 0x01, 0x01, 0x01, // event
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::EventPtr, 1),
                (TableId::Event, u16::MAX as u32 + 3),
            ],
            true,
            true,
            true,
        ));
        let table = MetadataTable::<EventPtrRaw>::new(&data, 1, sizes.clone()).unwrap();

        let eval = |row: EventPtrRaw| {
            assert_eq!(row.event, 0x01010101);
        };

        for row in table.iter() {
            eval(row);
        }

        let row = table.get(1).unwrap();
        let mut buffer = vec![0u8; EventPtrRaw::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, buffer.len());
        assert_eq!(buffer, data);
        eval(row);
    }
}
