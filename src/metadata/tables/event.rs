use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at_dyn},
    metadata::tables::{
        CodedIndex, CodedIndexType, RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `Event` table defines events, `TableId` = 0x14
pub struct EventRaw {
    /// a 2-byte bitmask of type `EventAttributes`, §II.23.1.4
    pub flags: u32,
    /// an index into the String heap
    pub name: u32,
    /// an index into a `TypeDef`, a `TypeRef`, or `TypeSpec` table; more precisely, a `TypeDefOrRef` (§II.24.2.6) coded index
    pub event_type: CodedIndex,
}

impl RowDefinition for EventRaw {
    const TABLE_ID: TableId = TableId::Event;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* flags */      2 +
            /* name */       sizes.str_bytes() +
            /* event_type */ sizes.coded_index_bytes(CodedIndexType::TypeDefOrRef)
        )
    }
}

impl RowReadable for EventRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(EventRaw {
            flags: u32::from(read_le_at::<u16>(data, offset)?),
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            event_type: CodedIndex::read(data, offset, sizes, CodedIndexType::TypeDefOrRef)?,
        })
    }
}

impl RowWritable for EventRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.flags, false)?;
        write_le_at_dyn(data, offset, self.name, sizes.is_large_str())?;
        self.event_type.write(data, offset, sizes, CodedIndexType::TypeDefOrRef)?;
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
            0x01, 0x01, // flags
            0x02, 0x02, // name
            0x04, 0x04, // event_type
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::Event, 1),
                (TableId::TypeDef, 1),
                (TableId::TypeRef, 1),
                (TableId::TypeSpec, 1),
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<EventRaw>::new(&data, 1, sizes.clone()).unwrap();

        let eval = |row: EventRaw| {
            assert_eq!(row.flags, 0x0101);
            assert_eq!(row.name, 0x0202);
            assert_eq!(row.event_type, CodedIndex::new(TableId::TypeDef, 0x101));
        };

        for row in table.iter() {
            eval(row);
        }

        let row = table.get(1).unwrap();
        let mut buffer = vec![0u8; EventRaw::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, buffer.len());
        assert_eq!(buffer, data);
        eval(row);
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x01, 0x01, // flags
            0x02, 0x02, 0x02, 0x02, // name
            0x04, 0x04, 0x04, 0x04, // event_type
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::Event, 1),
                (TableId::TypeDef, u16::MAX as u32 + 3),
                (TableId::TypeRef, u16::MAX as u32 + 3),
                (TableId::TypeSpec, u16::MAX as u32 + 3),
            ],
            true,
            true,
            true,
        ));
        let table = MetadataTable::<EventRaw>::new(&data, 1, sizes.clone()).unwrap();

        let eval = |row: EventRaw| {
            assert_eq!(row.flags, 0x0101);
            assert_eq!(row.name, 0x02020202);
            assert_eq!(row.event_type, CodedIndex::new(TableId::TypeDef, 0x1010101));
        };

        for row in table.iter() {
            eval(row);
        }

        let row = table.get(1).unwrap();
        let mut buffer = vec![0u8; EventRaw::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, buffer.len());
        assert_eq!(buffer, data);
        eval(row);
    }
}
