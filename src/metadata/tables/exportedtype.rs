use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at, write_le_at_dyn},
    metadata::tables::{
        CodedIndex, CodedIndexType, RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `ExportedType` table lists types exported or forwarded by the assembly, `TableId` = 0x27
pub struct ExportedTypeRaw {
    /// a 4-byte bitmask of type `TypeAttributes`, §II.23.1.15
    pub flags: u32,
    /// a 4-byte index into a `TypeDef` table of another module; a hint only
    pub type_def_id: u32,
    /// an index into the String heap
    pub name: u32,
    /// an index into the String heap
    pub namespace: u32,
    /// an index into the `File`, `ExportedType` or `AssemblyRef` table; more precisely, an `Implementation` (§II.24.2.6) coded index
    pub implementation: CodedIndex,
}

impl RowDefinition for ExportedTypeRaw {
    const TABLE_ID: TableId = TableId::ExportedType;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* flags */          4 +
            /* type_def_id */    4 +
            /* name */           sizes.str_bytes() +
            /* namespace */      sizes.str_bytes() +
            /* implementation */ sizes.coded_index_bytes(CodedIndexType::Implementation)
        )
    }
}

impl RowReadable for ExportedTypeRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(ExportedTypeRaw {
            flags: read_le_at::<u32>(data, offset)?,
            type_def_id: read_le_at::<u32>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            namespace: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            implementation: CodedIndex::read(data, offset, sizes, CodedIndexType::Implementation)?,
        })
    }
}

impl RowWritable for ExportedTypeRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at(data, offset, self.flags)?;
        write_le_at(data, offset, self.type_def_id)?;
        write_le_at_dyn(data, offset, self.name, sizes.is_large_str())?;
        write_le_at_dyn(data, offset, self.namespace, sizes.is_large_str())?;
        self.implementation.write(data, offset, sizes, CodedIndexType::Implementation)?;
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
            0x01, 0x01, 0x01, 0x01, // flags
            0x02, 0x02, 0x02, 0x02, // type_def_id
            0x03, 0x03, // name
            0x04, 0x04, // namespace
            0x05, 0x05, // implementation
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::AssemblyRef, 1),
                (TableId::ExportedType, 1),
                (TableId::File, 1),
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<ExportedTypeRaw>::new(&data, 1, sizes.clone()).unwrap();

        let eval = |row: ExportedTypeRaw| {
            assert_eq!(row.flags, 0x01010101);
            assert_eq!(row.type_def_id, 0x02020202);
            assert_eq!(row.name, 0x0303);
            assert_eq!(row.namespace, 0x0404);
            assert_eq!(row.implementation, CodedIndex::new(TableId::AssemblyRef, 0x141));
        };

        for row in table.iter() {
            eval(row);
        }

        let row = table.get(1).unwrap();
        let mut buffer = vec![0u8; ExportedTypeRaw::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, buffer.len());
        assert_eq!(buffer, data);
        eval(row);
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x01, 0x01, 0x01, 0x01, // flags
            0x02, 0x02, 0x02, 0x02, // type_def_id
            0x03, 0x03, 0x03, 0x03, // name
            0x04, 0x04, 0x04, 0x04, // namespace
            0x05, 0x05, 0x05, 0x05, // implementation
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::AssemblyRef, u16::MAX as u32 + 3),
                (TableId::ExportedType, u16::MAX as u32 + 3),
                (TableId::File, u16::MAX as u32 + 3),
            ],
            true,
            true,
            true,
        ));
        let table = MetadataTable::<ExportedTypeRaw>::new(&data, 1, sizes.clone()).unwrap();

        let eval = |row: ExportedTypeRaw| {
            assert_eq!(row.flags, 0x01010101);
            assert_eq!(row.type_def_id, 0x02020202);
            assert_eq!(row.name, 0x03030303);
            assert_eq!(row.namespace, 0x04040404);
            assert_eq!(row.implementation, CodedIndex::new(TableId::AssemblyRef, 0x1414141));
        };

        for row in table.iter() {
            eval(row);
        }

        let row = table.get(1).unwrap();
        let mut buffer = vec![0u8; ExportedTypeRaw::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, buffer.len());
        assert_eq!(buffer, data);
        eval(row);
    }
}
