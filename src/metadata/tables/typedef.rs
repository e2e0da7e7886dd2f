use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at, write_le_at_dyn},
    metadata::tables::{
        CodedIndex, CodedIndexType, RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `TypeDef` table defines the types of this module, `TableId` = 0x02
pub struct TypeDefRaw {
    /// a 4-byte bitmask of type `TypeAttributes`, §II.23.1.15
    pub flags: u32,
    /// an index into the String heap
    pub type_name: u32,
    /// an index into the String heap
    pub type_namespace: u32,
    /// an index into the `TypeDef`, `TypeRef`, or `TypeSpec` table; more precisely, a `TypeDefOrRef` (§II.24.2.6) coded index
    pub extends: CodedIndex,
    /// an index into the `Field` table; the first of a contiguous run of fields owned by this type
    pub field_list: u32,
    /// an index into the `MethodDef` table; the first of a contiguous run of methods owned by this type
    pub method_list: u32,
}

impl RowDefinition for TypeDefRaw {
    const TABLE_ID: TableId = TableId::TypeDef;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* flags */          4 +
            /* type_name */      sizes.str_bytes() +
            /* type_namespace */ sizes.str_bytes() +
            /* extends */        sizes.coded_index_bytes(CodedIndexType::TypeDefOrRef) +
            /* field_list */     sizes.table_index_bytes(TableId::Field) +
            /* method_list */    sizes.table_index_bytes(TableId::MethodDef)
        )
    }
}

impl RowReadable for TypeDefRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(TypeDefRaw {
            flags: read_le_at::<u32>(data, offset)?,
            type_name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            type_namespace: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            extends: CodedIndex::read(data, offset, sizes, CodedIndexType::TypeDefOrRef)?,
            field_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::Field))?,
            method_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::MethodDef))?,
        })
    }
}

impl RowWritable for TypeDefRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at(data, offset, self.flags)?;
        write_le_at_dyn(data, offset, self.type_name, sizes.is_large_str())?;
        write_le_at_dyn(data, offset, self.type_namespace, sizes.is_large_str())?;
        self.extends.write(data, offset, sizes, CodedIndexType::TypeDefOrRef)?;
        write_le_at_dyn(data, offset, self.field_list, sizes.is_large(TableId::Field))?;
        write_le_at_dyn(data, offset, self.method_list, sizes.is_large(TableId::MethodDef))?;
        Ok(())
    }
}
