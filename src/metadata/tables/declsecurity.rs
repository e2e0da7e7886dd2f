use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at_dyn},
    metadata::tables::{
        CodedIndex, CodedIndexType, RowDefinition, RowReadable, RowWritable, SortedRow, TableId,
        TableInfoRef,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `DeclSecurity` table attaches declarative security permission sets, `TableId` = 0x0E
pub struct DeclSecurityRaw {
    /// a 2-byte value, the `SecurityAction`
    pub action: u32,
    /// an index into the `TypeDef`, `MethodDef`, or `Assembly` table; more precisely, a `HasDeclSecurity` (§II.24.2.6) coded index
    pub parent: CodedIndex,
    /// an index into the Blob heap
    pub permission_set: u32,
}

impl RowDefinition for DeclSecurityRaw {
    const TABLE_ID: TableId = TableId::DeclSecurity;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* action */         2 +
            /* parent */         sizes.coded_index_bytes(CodedIndexType::HasDeclSecurity) +
            /* permission_set */ sizes.blob_bytes()
        )
    }
}

impl RowReadable for DeclSecurityRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(DeclSecurityRaw {
            action: u32::from(read_le_at::<u16>(data, offset)?),
            parent: CodedIndex::read(data, offset, sizes, CodedIndexType::HasDeclSecurity)?,
            permission_set: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

impl RowWritable for DeclSecurityRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.action, false)?;
        self.parent.write(data, offset, sizes, CodedIndexType::HasDeclSecurity)?;
        write_le_at_dyn(data, offset, self.permission_set, sizes.is_large_blob())?;
        Ok(())
    }
}

impl SortedRow for DeclSecurityRaw {
    fn sort_key(&self) -> u32 {
        // References outside the category sort last, writing the row reports them
        CodedIndexType::HasDeclSecurity
            .encode(self.parent.tag, self.parent.row)
            .unwrap_or(u32::MAX)
    }
}
