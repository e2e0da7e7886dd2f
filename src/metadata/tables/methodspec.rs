use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::tables::{
        CodedIndex, CodedIndexType, RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `MethodSpec` table describes instantiations of generic methods, `TableId` = 0x2B
pub struct MethodSpecRaw {
    /// an index into the `MethodDef` or `MemberRef` table; more precisely, a `MethodDefOrRef` (§II.24.2.6) coded index
    pub method: CodedIndex,
    /// an index into the Blob heap
    pub instantiation: u32,
}

impl RowDefinition for MethodSpecRaw {
    const TABLE_ID: TableId = TableId::MethodSpec;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* method */        sizes.coded_index_bytes(CodedIndexType::MethodDefOrRef) +
            /* instantiation */ sizes.blob_bytes()
        )
    }
}

impl RowReadable for MethodSpecRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(MethodSpecRaw {
            method: CodedIndex::read(data, offset, sizes, CodedIndexType::MethodDefOrRef)?,
            instantiation: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

impl RowWritable for MethodSpecRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        self.method.write(data, offset, sizes, CodedIndexType::MethodDefOrRef)?;
        write_le_at_dyn(data, offset, self.instantiation, sizes.is_large_blob())?;
        Ok(())
    }
}
