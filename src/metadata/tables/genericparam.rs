use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at_dyn},
    metadata::tables::{
        CodedIndex, CodedIndexType, RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `GenericParam` table defines generic parameters of types and methods, `TableId` = 0x2A
pub struct GenericParamRaw {
    /// the 2-byte index of the generic parameter, numbered left-to-right, from zero
    pub number: u32,
    /// a 2-byte bitmask of type `GenericParamAttributes`, §II.23.1.7
    pub flags: u32,
    /// an index into the `TypeDef` or `MethodDef` table; more precisely, a `TypeOrMethodDef` (§II.24.2.6) coded index
    pub owner: CodedIndex,
    /// an index into the String heap
    pub name: u32,
}

impl RowDefinition for GenericParamRaw {
    const TABLE_ID: TableId = TableId::GenericParam;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* number */ 2 +
            /* flags */  2 +
            /* owner */  sizes.coded_index_bytes(CodedIndexType::TypeOrMethodDef) +
            /* name */   sizes.str_bytes()
        )
    }
}

impl RowReadable for GenericParamRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(GenericParamRaw {
            number: u32::from(read_le_at::<u16>(data, offset)?),
            flags: u32::from(read_le_at::<u16>(data, offset)?),
            owner: CodedIndex::read(data, offset, sizes, CodedIndexType::TypeOrMethodDef)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
        })
    }
}

impl RowWritable for GenericParamRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.number, false)?;
        write_le_at_dyn(data, offset, self.flags, false)?;
        self.owner.write(data, offset, sizes, CodedIndexType::TypeOrMethodDef)?;
        write_le_at_dyn(data, offset, self.name, sizes.is_large_str())?;
        Ok(())
    }
}
