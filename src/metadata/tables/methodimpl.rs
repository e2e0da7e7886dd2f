use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::tables::{
        CodedIndex, CodedIndexType, RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `MethodImpl` table records explicit method overrides, `TableId` = 0x19
pub struct MethodImplRaw {
    /// an index into the `TypeDef` table
    pub class: u32,
    /// an index into the `MethodDef` or `MemberRef` table; more precisely, a `MethodDefOrRef` (§II.24.2.6) coded index
    pub method_body: CodedIndex,
    /// an index into the `MethodDef` or `MemberRef` table; more precisely, a `MethodDefOrRef` (§II.24.2.6) coded index
    pub method_declaration: CodedIndex,
}

impl RowDefinition for MethodImplRaw {
    const TABLE_ID: TableId = TableId::MethodImpl;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* class */              sizes.table_index_bytes(TableId::TypeDef) +
            /* method_body */        sizes.coded_index_bytes(CodedIndexType::MethodDefOrRef) +
            /* method_declaration */ sizes.coded_index_bytes(CodedIndexType::MethodDefOrRef)
        )
    }
}

impl RowReadable for MethodImplRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(MethodImplRaw {
            class: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
            method_body: CodedIndex::read(data, offset, sizes, CodedIndexType::MethodDefOrRef)?,
            method_declaration: CodedIndex::read(data, offset, sizes, CodedIndexType::MethodDefOrRef)?,
        })
    }
}

impl RowWritable for MethodImplRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.class, sizes.is_large(TableId::TypeDef))?;
        self.method_body.write(data, offset, sizes, CodedIndexType::MethodDefOrRef)?;
        self.method_declaration.write(data, offset, sizes, CodedIndexType::MethodDefOrRef)?;
        Ok(())
    }
}
