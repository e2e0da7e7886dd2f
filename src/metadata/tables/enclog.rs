use crate::{
    file::io::{read_le_at, write_le_at},
    metadata::tables::{RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `EncLog` table records edit and continue operations, `TableId` = 0x1E
pub struct EncLogRaw {
    /// a 4-byte metadata token
    pub token_value: u32,
    /// a 4-byte operation code
    pub func_code: u32,
}

impl RowDefinition for EncLogRaw {
    const TABLE_ID: TableId = TableId::EncLog;

    #[rustfmt::skip]
    fn row_size(_sizes: &TableInfoRef) -> u32 {
        /* token_value, func_code */
        8
    }
}

impl RowReadable for EncLogRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, _sizes: &TableInfoRef) -> Result<Self> {
        Ok(EncLogRaw {
            token_value: read_le_at::<u32>(data, offset)?,
            func_code: read_le_at::<u32>(data, offset)?,
        })
    }
}

impl RowWritable for EncLogRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        _sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at(data, offset, self.token_value)?;
        write_le_at(data, offset, self.func_code)?;
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
            0x01, 0x01, 0x01, 0x01, // token_value
            0x02, 0x02, 0x02, 0x02, // func_code
        ];

        let sizes = Arc::new(TableInfo::from_rows(&[(TableId::EncLog, 1)], false, false, false));
        let table = MetadataTable::<EncLogRaw>::new(&data, 1, sizes.clone()).unwrap();

        let eval = |row: EncLogRaw| {
            assert_eq!(row.token_value, 0x01010101);
            assert_eq!(row.func_code, 0x02020202);
        };

        for row in table.iter() {
            eval(row);
        }

        let row = table.get(1).unwrap();
        let mut buffer = vec![0u8; EncLogRaw::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, buffer.len());
        assert_eq!(buffer, data);
        eval(row);
    }
}
