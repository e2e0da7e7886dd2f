use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at, write_le_at_dyn},
    metadata::tables::{RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `Assembly` table holds the manifest of the current assembly, `TableId` = 0x20. It holds at most one row.
pub struct AssemblyRaw {
    /// a 4-byte constant of type `AssemblyHashAlgorithm`, §II.23.1.1
    pub hash_alg_id: u32,
    /// a 2-byte constant
    pub major_version: u32,
    /// a 2-byte constant
    pub minor_version: u32,
    /// a 2-byte constant
    pub build_number: u32,
    /// a 2-byte constant
    pub revision_number: u32,
    /// a 4-byte bitmask of type `AssemblyFlags`, §II.23.1.2
    pub flags: u32,
    /// an index into the Blob heap
    pub public_key: u32,
    /// an index into the String heap
    pub name: u32,
    /// an index into the String heap
    pub culture: u32,
}

impl RowDefinition for AssemblyRaw {
    const TABLE_ID: TableId = TableId::Assembly;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* hash_alg_id */     4 +
            /* major_version */   2 +
            /* minor_version */   2 +
            /* build_number */    2 +
            /* revision_number */ 2 +
            /* flags */           4 +
            /* public_key */      sizes.blob_bytes() +
            /* name */            sizes.str_bytes() +
            /* culture */         sizes.str_bytes()
        )
    }
}

impl RowReadable for AssemblyRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(AssemblyRaw {
            hash_alg_id: read_le_at::<u32>(data, offset)?,
            major_version: u32::from(read_le_at::<u16>(data, offset)?),
            minor_version: u32::from(read_le_at::<u16>(data, offset)?),
            build_number: u32::from(read_le_at::<u16>(data, offset)?),
            revision_number: u32::from(read_le_at::<u16>(data, offset)?),
            flags: read_le_at::<u32>(data, offset)?,
            public_key: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            culture: read_le_at_dyn(data, offset, sizes.is_large_str())?,
        })
    }
}

impl RowWritable for AssemblyRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at(data, offset, self.hash_alg_id)?;
        write_le_at_dyn(data, offset, self.major_version, false)?;
        write_le_at_dyn(data, offset, self.minor_version, false)?;
        write_le_at_dyn(data, offset, self.build_number, false)?;
        write_le_at_dyn(data, offset, self.revision_number, false)?;
        write_le_at(data, offset, self.flags)?;
        write_le_at_dyn(data, offset, self.public_key, sizes.is_large_blob())?;
        write_le_at_dyn(data, offset, self.name, sizes.is_large_str())?;
        write_le_at_dyn(data, offset, self.culture, sizes.is_large_str())?;
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
            0x01, 0x01, 0x01, 0x01, // hash_alg_id
            0x02, 0x02, // major_version
            0x03, 0x03, // minor_version
            0x04, 0x04, // build_number
            0x05, 0x05, // revision_number
            0x06, 0x06, 0x06, 0x06, // flags
            0x07, 0x07, // public_key
            0x08, 0x08, // name
            0x09, 0x09, // culture
        ];

        let sizes = Arc::new(TableInfo::from_rows(&[(TableId::Assembly, 1)], false, false, false));
        let table = MetadataTable::<AssemblyRaw>::new(&data, 1, sizes.clone()).unwrap();

        let eval = |row: AssemblyRaw| {
            assert_eq!(row.hash_alg_id, 0x01010101);
            assert_eq!(row.major_version, 0x0202);
            assert_eq!(row.minor_version, 0x0303);
            assert_eq!(row.build_number, 0x0404);
            assert_eq!(row.revision_number, 0x0505);
            assert_eq!(row.flags, 0x06060606);
            assert_eq!(row.public_key, 0x0707);
            assert_eq!(row.name, 0x0808);
            assert_eq!(row.culture, 0x0909);
        };

        for row in table.iter() {
            eval(row);
        }

        let row = table.get(1).unwrap();
        let mut buffer = vec![0u8; AssemblyRaw::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, buffer.len());
        assert_eq!(buffer, data);
        eval(row);
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x01, 0x01, 0x01, 0x01, // hash_alg_id
            0x02, 0x02, // major_version
            0x03, 0x03, // minor_version
            0x04, 0x04, // build_number
            0x05, 0x05, // revision_number
            0x06, 0x06, 0x06, 0x06, // flags
            0x07, 0x07, 0x07, 0x07, // public_key
            0x08, 0x08, 0x08, 0x08, // name
            0x09, 0x09, 0x09, 0x09, // culture
        ];

        let sizes = Arc::new(TableInfo::from_rows(&[(TableId::Assembly, 1)], true, true, true));
        let table = MetadataTable::<AssemblyRaw>::new(&data, 1, sizes.clone()).unwrap();

        let eval = |row: AssemblyRaw| {
            assert_eq!(row.hash_alg_id, 0x01010101);
            assert_eq!(row.major_version, 0x0202);
            assert_eq!(row.minor_version, 0x0303);
            assert_eq!(row.build_number, 0x0404);
            assert_eq!(row.revision_number, 0x0505);
            assert_eq!(row.flags, 0x06060606);
            assert_eq!(row.public_key, 0x07070707);
            assert_eq!(row.name, 0x08080808);
            assert_eq!(row.culture, 0x09090909);
        };

        for row in table.iter() {
            eval(row);
        }

        let row = table.get(1).unwrap();
        let mut buffer = vec![0u8; AssemblyRaw::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, buffer.len());
        assert_eq!(buffer, data);
        eval(row);
    }
}
