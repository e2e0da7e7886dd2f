use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::tables::{
        CodedIndex, CodedIndexType, RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `GenericParamConstraint` table lists the constraints of generic parameters, `TableId` = 0x2C
pub struct GenericParamConstraintRaw {
    /// an index into the `GenericParam` table
    pub owner: u32,
    /// an index into the `TypeDef`, `TypeRef`, or `TypeSpec` table; more precisely, a `TypeDefOrRef` (§II.24.2.6) coded index
    pub constraint: CodedIndex,
}

impl RowDefinition for GenericParamConstraintRaw {
    const TABLE_ID: TableId = TableId::GenericParamConstraint;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* owner */      sizes.table_index_bytes(TableId::GenericParam) +
            /* constraint */ sizes.coded_index_bytes(CodedIndexType::TypeDefOrRef)
        )
    }
}

impl RowReadable for GenericParamConstraintRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(GenericParamConstraintRaw {
            owner: read_le_at_dyn(data, offset, sizes.is_large(TableId::GenericParam))?,
            constraint: CodedIndex::read(data, offset, sizes, CodedIndexType::TypeDefOrRef)?,
        })
    }
}

impl RowWritable for GenericParamConstraintRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.owner, sizes.is_large(TableId::GenericParam))?;
        self.constraint.write(data, offset, sizes, CodedIndexType::TypeDefOrRef)?;
        Ok(())
    }
}
