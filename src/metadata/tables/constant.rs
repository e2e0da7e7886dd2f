use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at, write_le_at_dyn},
    metadata::tables::{
        CodedIndex, CodedIndexType, RowDefinition, RowReadable, RowWritable, SortedRow, TableId,
        TableInfoRef,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `Constant` table stores compile time values of fields, parameters and properties, `TableId` = 0x0B
pub struct ConstantRaw {
    /// a 1-byte constant, the `ELEMENT_TYPE` of the value
    pub base: u8,
    /// an index into the `Param`, `Field`, or `Property` table; more precisely, a `HasConstant` (§II.24.2.6) coded index
    pub parent: CodedIndex,
    /// an index into the Blob heap
    pub value: u32,
}

impl RowDefinition for ConstantRaw {
    const TABLE_ID: TableId = TableId::Constant;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* base */     1 +
            /* padding */  1 +
            /* parent */   sizes.coded_index_bytes(CodedIndexType::HasConstant) +
            /* value */    sizes.blob_bytes()
        )
    }
}

impl RowReadable for ConstantRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        let base = read_le_at::<u8>(data, offset)?;
        // padding
        let _ = read_le_at::<u8>(data, offset)?;

        Ok(ConstantRaw {
            base,
            parent: CodedIndex::read(data, offset, sizes, CodedIndexType::HasConstant)?,
            value: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

impl RowWritable for ConstantRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at(data, offset, self.base)?;
        write_le_at(data, offset, 0u8)?;
        self.parent.write(data, offset, sizes, CodedIndexType::HasConstant)?;
        write_le_at_dyn(data, offset, self.value, sizes.is_large_blob())?;
        Ok(())
    }
}

impl SortedRow for ConstantRaw {
    fn sort_key(&self) -> u32 {
        // References outside the category sort last, writing the row reports them
        CodedIndexType::HasConstant
            .encode(self.parent.tag, self.parent.row)
            .unwrap_or(u32::MAX)
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
            0x01, // base
            0x00, // padding
            0x02, 0x02, // parent
            0x03, 0x03, // value
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::Constant, 1),
                (TableId::Field, 1),
                (TableId::Param, 1),
                (TableId::Property, 1),
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<ConstantRaw>::new(&data, 1, sizes.clone()).unwrap();

        let eval = |row: ConstantRaw| {
            assert_eq!(row.base, 0x01);
            assert_eq!(row.parent, CodedIndex::new(TableId::Property, 0x80));
            assert_eq!(row.value, 0x0303);
        };

        for row in table.iter() {
            eval(row);
        }

        let row = table.get(1).unwrap();
        let mut buffer = vec![0u8; ConstantRaw::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, buffer.len());
        assert_eq!(buffer, data);
        eval(row);
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x01, // base
            0x00, // padding
            0x02, 0x02, 0x02, 0x02, // parent
            0x03, 0x03, 0x03, 0x03, // value
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::Constant, 1),
                (TableId::Field, u16::MAX as u32 + 3),
                (TableId::Param, u16::MAX as u32 + 3),
                (TableId::Property, u16::MAX as u32 + 3),
            ],
            true,
            true,
            true,
        ));
        let table = MetadataTable::<ConstantRaw>::new(&data, 1, sizes.clone()).unwrap();

        let eval = |row: ConstantRaw| {
            assert_eq!(row.base, 0x01);
            assert_eq!(row.parent, CodedIndex::new(TableId::Property, 0x808080));
            assert_eq!(row.value, 0x03030303);
        };

        for row in table.iter() {
            eval(row);
        }

        let row = table.get(1).unwrap();
        let mut buffer = vec![0u8; ConstantRaw::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, buffer.len());
        assert_eq!(buffer, data);
        eval(row);
    }
}
