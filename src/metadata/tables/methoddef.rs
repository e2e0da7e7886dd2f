use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at, write_le_at_dyn},
    metadata::tables::{RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `MethodDef` table defines the methods of all types, `TableId` = 0x06
pub struct MethodDefRaw {
    /// a 4-byte constant, the relative virtual address of the method body
    pub rva: u32,
    /// a 2-byte bitmask of type `MethodImplAttributes`, §II.23.1.10
    pub impl_flags: u32,
    /// a 2-byte bitmask of type `MethodAttributes`, §II.23.1.10
    pub flags: u32,
    /// an index into the String heap
    pub name: u32,
    /// an index into the Blob heap
    pub signature: u32,
    /// an index into the `Param` table; the first of a contiguous run of parameters owned by this method
    pub param_list: u32,
}

impl RowDefinition for MethodDefRaw {
    const TABLE_ID: TableId = TableId::MethodDef;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* rva */        4 +
            /* impl_flags */ 2 +
            /* flags */      2 +
            /* name */       sizes.str_bytes() +
            /* signature */  sizes.blob_bytes() +
            /* param_list */ sizes.table_index_bytes(TableId::Param)
        )
    }
}

impl RowReadable for MethodDefRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(MethodDefRaw {
            rva: read_le_at::<u32>(data, offset)?,
            impl_flags: u32::from(read_le_at::<u16>(data, offset)?),
            flags: u32::from(read_le_at::<u16>(data, offset)?),
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            signature: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
            param_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::Param))?,
        })
    }
}

impl RowWritable for MethodDefRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at(data, offset, self.rva)?;
        write_le_at_dyn(data, offset, self.impl_flags, false)?;
        write_le_at_dyn(data, offset, self.flags, false)?;
        write_le_at_dyn(data, offset, self.name, sizes.is_large_str())?;
        write_le_at_dyn(data, offset, self.signature, sizes.is_large_blob())?;
        write_le_at_dyn(data, offset, self.param_list, sizes.is_large(TableId::Param))?;
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
            0x01, 0x01, 0x01, 0x01, // rva
            0x02, 0x02, // impl_flags
            0x03, 0x03, // flags
            0x04, 0x04, // name
            0x05, 0x05, // signature
            0x06, 0x06, // param_list
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::MethodDef, 1),
                (TableId::Param, 1),
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<MethodDefRaw>::new(&data, 1, sizes.clone()).unwrap();

        let eval = |row: MethodDefRaw| {
            assert_eq!(row.rva, 0x01010101);
            assert_eq!(row.impl_flags, 0x0202);
            assert_eq!(row.flags, 0x0303);
            assert_eq!(row.name, 0x0404);
            assert_eq!(row.signature, 0x0505);
            assert_eq!(row.param_list, 0x0606);
        };

        for row in table.iter() {
            eval(row);
        }

        let row = table.get(1).unwrap();
        let mut buffer = vec![0u8; MethodDefRaw::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, buffer.len());
        assert_eq!(buffer, data);
        eval(row);
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x01, 0x01, 0x01, 0x01, // rva
            0x02, 0x02, // impl_flags
            0x03, 0x03, // flags
            0x04, 0x04, 0x04, 0x04, // name
            0x05, 0x05, 0x05, 0x05, // signature
            0x06, 0x06, 0x06, 0x06, // param_list
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::MethodDef, 1),
                (TableId::Param, u16::MAX as u32 + 3),
            ],
            true,
            true,
            true,
        ));
        let table = MetadataTable::<MethodDefRaw>::new(&data, 1, sizes.clone()).unwrap();

        let eval = |row: MethodDefRaw| {
            assert_eq!(row.rva, 0x01010101);
            assert_eq!(row.impl_flags, 0x0202);
            assert_eq!(row.flags, 0x0303);
            assert_eq!(row.name, 0x04040404);
            assert_eq!(row.signature, 0x05050505);
            assert_eq!(row.param_list, 0x06060606);
        };

        for row in table.iter() {
            eval(row);
        }

        let row = table.get(1).unwrap();
        let mut buffer = vec![0u8; MethodDefRaw::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, buffer.len());
        assert_eq!(buffer, data);
        eval(row);
    }
}
