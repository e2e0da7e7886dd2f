use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::tables::{RowDefinition, RowReadable, RowWritable, TableId, TableInfoRef},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `NestedClass` table records which types are nested in which, `TableId` = 0x29
pub struct NestedClassRaw {
    /// an index into the `TypeDef` table
    pub nested_class: u32,
    /// an index into the `TypeDef` table
    pub enclosing_class: u32,
}

impl RowDefinition for NestedClassRaw {
    const TABLE_ID: TableId = TableId::NestedClass;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* nested_class */    sizes.table_index_bytes(TableId::TypeDef) +
            /* enclosing_class */ sizes.table_index_bytes(TableId::TypeDef)
        )
    }
}

impl RowReadable for NestedClassRaw {
    fn row_read(data: &[u8], offset: &mut usize, _rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(NestedClassRaw {
            nested_class: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
            enclosing_class: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
        })
    }
}

impl RowWritable for NestedClassRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.nested_class, sizes.is_large(TableId::TypeDef))?;
        write_le_at_dyn(data, offset, self.enclosing_class, sizes.is_large(TableId::TypeDef))?;
        Ok(())
    }
}
