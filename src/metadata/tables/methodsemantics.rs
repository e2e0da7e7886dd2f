use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at_dyn},
    metadata::tables::{
        CodedIndex, CodedIndexType, RowDefinition, RowReadable, RowWritable, SortedRow, TableId,
        TableInfoRef,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `MethodSemantics` table links events and properties to their accessor methods, `TableId` = 0x18
pub struct MethodSemanticsRaw {
    /// a 2-byte bitmask of type `MethodSemanticsAttributes`, §II.23.1.12
    pub semantics: u32,
    /// an index into the `MethodDef` table
    pub method: u32,
    /// an index into the `Event` or `Property` table; more precisely, a `HasSemantics` (§II.24.2.6) coded index
    pub association: CodedIndex,
}

impl RowDefinition for MethodSemanticsRaw {
    const TABLE_ID: TableId = TableId::MethodSemantics;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* semantics */   2 +
            /* method */      sizes.table_index_bytes(TableId::MethodDef) +
            /* association */ sizes.coded_index_bytes(CodedIndexType::HasSemantics)
        )
    }
}

impl RowReadable for MethodSemanticsRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(MethodSemanticsRaw {
            semantics: u32::from(read_le_at::<u16>(data, offset)?),
            method: read_le_at_dyn(data, offset, sizes.is_large(TableId::MethodDef))?,
            association: CodedIndex::read(data, offset, sizes, CodedIndexType::HasSemantics)?,
        })
    }
}

impl RowWritable for MethodSemanticsRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.semantics, false)?;
        write_le_at_dyn(data, offset, self.method, sizes.is_large(TableId::MethodDef))?;
        self.association.write(data, offset, sizes, CodedIndexType::HasSemantics)?;
        Ok(())
    }
}

impl SortedRow for MethodSemanticsRaw {
    fn sort_key(&self) -> u32 {
        // References outside the category sort last, writing the row reports them
        CodedIndexType::HasSemantics
            .encode(self.association.tag, self.association.row)
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
            0x01, 0x01, // semantics
            0x02, 0x02, // method
            0x03, 0x03, // association
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::MethodSemantics, 1),
                (TableId::Event, 1),
                (TableId::MethodDef, 1),
                (TableId::Property, 1),
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<MethodSemanticsRaw>::new(&data, 1, sizes.clone()).unwrap();

        let eval = |row: MethodSemanticsRaw| {
            assert_eq!(row.semantics, 0x0101);
            assert_eq!(row.method, 0x0202);
            assert_eq!(row.association, CodedIndex::new(TableId::Property, 0x181));
        };

        for row in table.iter() {
            eval(row);
        }

        let row = table.get(1).unwrap();
        let mut buffer = vec![0u8; MethodSemanticsRaw::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, buffer.len());
        assert_eq!(buffer, data);
        eval(row);
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x01, 0x01, // semantics
            0x02, 0x02, 0x02, 0x02, // method
            0x03, 0x03, 0x03, 0x03, // association
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::MethodSemantics, 1),
                (TableId::Event, u16::MAX as u32 + 3),
                (TableId::MethodDef, u16::MAX as u32 + 3),
                (TableId::Property, u16::MAX as u32 + 3),
            ],
            true,
            true,
            true,
        ));
        let table = MetadataTable::<MethodSemanticsRaw>::new(&data, 1, sizes.clone()).unwrap();

        let eval = |row: MethodSemanticsRaw| {
            assert_eq!(row.semantics, 0x0101);
            assert_eq!(row.method, 0x02020202);
            assert_eq!(row.association, CodedIndex::new(TableId::Property, 0x1818181));
        };

        for row in table.iter() {
            eval(row);
        }

        let row = table.get(1).unwrap();
        let mut buffer = vec![0u8; MethodSemanticsRaw::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, buffer.len());
        assert_eq!(buffer, data);
        eval(row);
    }
}
