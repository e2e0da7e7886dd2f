use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::tables::{RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `StandAloneSig` table holds signatures that are not attached to a member, `TableId` = 0x11
pub struct StandAloneSigRaw {
    /// an index into the Blob heap
    pub signature: u32,
}

impl RowDefinition for StandAloneSigRaw {
    const TABLE_ID: TableId = TableId::StandAloneSig;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* signature */ sizes.blob_bytes()
        )
    }
}

impl RowReadable for StandAloneSigRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(StandAloneSigRaw {
            signature: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

impl RowWritable for StandAloneSigRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.signature, sizes.is_large_blob())?;
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
            0x01, 0x01, // signature
        ];

        let sizes = Arc::new(TableInfo::from_rows(&[(TableId::StandAloneSig, 1)], false, false, false));
        let table = MetadataTable::<StandAloneSigRaw>::new(&data, 1, sizes.clone()).unwrap();

        let eval = |row: StandAloneSigRaw| {
            assert_eq!(row.signature, 0x0101);
        };

        for row in table.iter() {
            eval(row);
        }

        let row = table.get(1).unwrap();
        let mut buffer = vec![0u8; StandAloneSigRaw::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, buffer.len());
        assert_eq!(buffer, data);
        eval(row);
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x01, 0x01, 0x01, 0x01, // signature
        ];

        let sizes = Arc::new(TableInfo::from_rows(&[(TableId::StandAloneSig, 1)], true, true, true));
        let table = MetadataTable::<StandAloneSigRaw>::new(&data, 1, sizes.clone()).unwrap();

        let eval = |row: StandAloneSigRaw| {
            assert_eq!(row.signature, 0x01010101);
        };

        for row in table.iter() {
            eval(row);
        }

        let row = table.get(1).unwrap();
        let mut buffer = vec![0u8; StandAloneSigRaw::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, buffer.len());
        assert_eq!(buffer, data);
        eval(row);
    }
}
