use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at, write_le_at_dyn},
    metadata::tables::{RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `AssemblyRefOS` table, `TableId` = 0x25. Should be ignored by the CLI.
pub struct AssemblyRefOsRaw {
    /// a 4-byte constant
    pub os_platform_id: u32,
    /// a 4-byte constant
    pub os_major_version: u32,
    /// a 4-byte constant
    pub os_minor_version: u32,
    /// an index into the `AssemblyRef` table
    pub assembly_ref: u32,
}

impl RowDefinition for AssemblyRefOsRaw {
    const TABLE_ID: TableId = TableId::AssemblyRefOS;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* os_platform_id */   4 +
            /* os_major_version */ 4 +
            /* os_minor_version */ 4 +
            /* assembly_ref */     sizes.table_index_bytes(TableId::AssemblyRef)
        )
    }
}

impl RowReadable for AssemblyRefOsRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(AssemblyRefOsRaw {
            os_platform_id: read_le_at::<u32>(data, offset)?,
            os_major_version: read_le_at::<u32>(data, offset)?,
            os_minor_version: read_le_at::<u32>(data, offset)?,
            assembly_ref: read_le_at_dyn(data, offset, sizes.is_large(TableId::AssemblyRef))?,
        })
    }
}

impl RowWritable for AssemblyRefOsRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at(data, offset, self.os_platform_id)?;
        write_le_at(data, offset, self.os_major_version)?;
        write_le_at(data, offset, self.os_minor_version)?;
        write_le_at_dyn(data, offset, self.assembly_ref, sizes.is_large(TableId::AssemblyRef))?;
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
            0x01, 0x01, 0x01, 0x01, // os_platform_id
            0x02, 0x02, 0x02, 0x02, // os_major_version
            0x03, 0x03, 0x03, 0x03, // os_minor_version
            0x04, 0x04, // assembly_ref
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::AssemblyRefOS, 1),
                (TableId::AssemblyRef, 1),
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<AssemblyRefOsRaw>::new(&data, 1, sizes.clone()).unwrap();

        let eval = |row: AssemblyRefOsRaw| {
            assert_eq!(row.os_platform_id, 0x01010101);
            assert_eq!(row.os_major_version, 0x02020202);
            assert_eq!(row.os_minor_version, 0x03030303);
            assert_eq!(row.assembly_ref, 0x0404);
        };

        for row in table.iter() {
            eval(row);
        }

        let row = table.get(1).unwrap();
        let mut buffer = vec![0u8; AssemblyRefOsRaw::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, buffer.len());
        assert_eq!(buffer, data);
        eval(row);
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x01, 0x01, 0x01, 0x01, // os_platform_id
            0x02, 0x02, 0x02, 0x02, // os_major_version
            0x03, 0x03, 0x03, 0x03, // os_minor_version
            0x04, 0x04, 0x04, 0x04, // assembly_ref
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::AssemblyRefOS, 1),
                (TableId::AssemblyRef, u16::MAX as u32 + 3),
            ],
            true,
            true,
            true,
        ));
        let table = MetadataTable::<AssemblyRefOsRaw>::new(&data, 1, sizes.clone()).unwrap();

        let eval = |row: AssemblyRefOsRaw| {
            assert_eq!(row.os_platform_id, 0x01010101);
            assert_eq!(row.os_major_version, 0x02020202);
            assert_eq!(row.os_minor_version, 0x03030303);
            assert_eq!(row.assembly_ref, 0x04040404);
        };

        for row in table.iter() {
            eval(row);
        }

        let row = table.get(1).unwrap();
        let mut buffer = vec![0u8; AssemblyRefOsRaw::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, buffer.len());
        assert_eq!(buffer, data);
        eval(row);
    }
}
