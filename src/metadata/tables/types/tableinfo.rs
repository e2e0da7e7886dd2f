use std::sync::Arc;
use strum::{EnumCount, IntoEnumIterator};

use crate::{
    file::io::read_le_at,
    metadata::tables::types::{CodedIndexType, TableId},
    Error::{self, OutOfBounds},
    Result,
};

/// Holds information about the size that reference index fields have
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct TableRowInfo {
    /// The count of rows in this table
    pub rows: u32,
    /// Number of bits required to represent any valid row index
    pub bits: u8,
    /// If the count is > `u16::max`, the indexes of other tables into this table will be 4 bytes instead of 2
    pub is_large: bool,
}

impl TableRowInfo {
    /// Creates a new `TableRowInfo` instance with the given row count.
    ///
    /// # Arguments
    /// * `rows` - The number of rows in the table
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(rows: u32) -> Self {
        let bits = if rows == 0 {
            1
        } else {
            // Safe: 32 - zeros is always <= 32, fits in u8
            (32 - rows.leading_zeros()) as u8
        };

        Self {
            rows,
            bits,
            is_large: rows > u32::from(u16::MAX),
        }
    }
}

/// `TableInfo` holds the row count of every table and the resulting width of every index kind.
///
/// It is the single source of truth for column widths: heap indices (2 or 4 bytes depending on
/// heap size), simple table indices (depending on the target table's row count) and coded
/// indices (depending on the largest candidate table and the tag width). Readers build it from
/// a tables stream header, writers build it once every table has stopped growing.
#[derive(Clone, PartialEq, Debug)]
pub struct TableInfo {
    rows: Vec<TableRowInfo>,
    coded_indexes: Vec<u8>,
    is_large_index_str: bool,
    is_large_index_guid: bool,
    is_large_index_blob: bool,
}

/// Cheap-copy reference to a `TableInfo` structure
pub type TableInfoRef = Arc<TableInfo>;

impl Default for TableInfo {
    /// All tables empty, all heap indices 2 bytes wide
    fn default() -> Self {
        TableInfo::from_rows(&[], false, false, false)
    }
}

impl TableInfo {
    /// Parses a `TableInfo` from the beginning of a tables stream.
    ///
    /// ## Arguments
    /// * 'data'         - The tables stream, starting with its header
    /// * '`valid_bitvec`' - The valid bitvector from the header, showing which tables are present
    ///
    /// # Errors
    /// Returns an error if the table data is insufficient or malformed
    pub fn new(data: &[u8], valid_bitvec: u64) -> Result<Self> {
        if data.len() < 24 {
            return Err(OutOfBounds);
        }

        let mut rows = vec![TableRowInfo::default(); TableId::COUNT];
        let mut next_row_offset = 24;

        for table_id in TableId::iter() {
            if (valid_bitvec & table_id.bit()) == 0 {
                continue;
            }

            let row_count = read_le_at::<u32>(data, &mut next_row_offset)?;
            rows[table_id as usize] = TableRowInfo::new(row_count);
        }

        let heap_size_flags = data[6];
        let mut table_info = TableInfo {
            rows,
            coded_indexes: vec![0; CodedIndexType::COUNT],
            is_large_index_str: heap_size_flags & 1 == 1,
            is_large_index_guid: heap_size_flags & 2 == 2,
            is_large_index_blob: heap_size_flags & 4 == 4,
        };

        table_info.calculate_coded_index_bits();
        Ok(table_info)
    }

    /// Builds a `TableInfo` from explicit row counts and heap widths.
    ///
    /// Tables that are not listed have zero rows.
    ///
    /// ## Arguments
    /// * 'valid_tables'    - A slice of tuples, which provides (table_id, row_count) of the valid tables
    /// * 'large_str'       - Specify if the #String heap indexes are 4 or 2 bytes
    /// * 'large_blob'      - Specify if the #Blob heap indexes are 4 or 2 bytes
    /// * 'large_guid'      - Specify if the #GUID heap indexes are 4 or 2 bytes
    #[must_use]
    pub fn from_rows(
        valid_tables: &[(TableId, u32)],
        large_str: bool,
        large_blob: bool,
        large_guid: bool,
    ) -> Self {
        let mut table_info = TableInfo {
            rows: vec![TableRowInfo::default(); TableId::COUNT],
            coded_indexes: vec![0; CodedIndexType::COUNT],
            is_large_index_str: large_str,
            is_large_index_guid: large_guid,
            is_large_index_blob: large_blob,
        };

        for (table, rows) in valid_tables {
            table_info.rows[*table as usize] = TableRowInfo::new(*rows);
        }

        table_info.calculate_coded_index_bits();
        table_info
    }

    /// Decodes a coded index value into its component table and row index.
    ///
    /// # Errors
    /// Returns an error if the tag value is out of bounds for the coded index type
    pub fn decode_coded_index(
        &self,
        value: u32,
        coded_index_type: CodedIndexType,
    ) -> Result<(TableId, u32)> {
        coded_index_type.decode(value)
    }

    /// Encodes a reference to `row` of `table` as a `coded_index_type` coded index.
    ///
    /// Returns the byte width of the column (2 or 4) together with the packed value. The width
    /// is the one every row of the stream uses for this category, derived from the row counts
    /// this `TableInfo` was built with.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidReference`] if `table` is not a candidate of the category,
    /// or if the packed value does not fit the column width.
    pub fn encode_coded_index(
        &self,
        table: TableId,
        row: u32,
        coded_index_type: CodedIndexType,
    ) -> Result<(u8, u32)> {
        let packed = coded_index_type.encode(table, row)?;
        let width = self.coded_index_bytes(coded_index_type);
        if width == 2 && packed > u32::from(u16::MAX) {
            return Err(Error::InvalidReference {
                table,
                row,
                category: format!("{coded_index_type:?} (2 byte column)"),
            });
        }

        Ok((width, packed))
    }

    /// Returns true, if a requested table has more than 65535 rows and hence requires 4 bytes instead of 2 bytes
    #[must_use]
    pub fn is_large(&self, id: TableId) -> bool {
        self.rows[id as usize].is_large
    }

    /// Indicates the size of indexes referring into the '#String' heap. True means 4 bytes, False is 2 bytes
    #[must_use]
    pub fn is_large_str(&self) -> bool {
        self.is_large_index_str
    }

    /// Indicates the size of indexes referring into the '#Guid' heap. True means 4 bytes, False is 2 bytes
    #[must_use]
    pub fn is_large_guid(&self) -> bool {
        self.is_large_index_guid
    }

    /// Indicates the size of indexes referring into the '#Blob' heap. True means 4 bytes, False is 2 bytes
    #[must_use]
    pub fn is_large_blob(&self) -> bool {
        self.is_large_index_blob
    }

    /// The `HeapSizes` byte of the tables stream header
    #[must_use]
    pub fn heap_size_flags(&self) -> u8 {
        u8::from(self.is_large_index_str)
            | (u8::from(self.is_large_index_guid) << 1)
            | (u8::from(self.is_large_index_blob) << 2)
    }

    /// Returns the width of '#String' heap indexes in bytes
    #[must_use]
    pub fn str_bytes(&self) -> u8 {
        if self.is_large_index_str {
            4
        } else {
            2
        }
    }

    /// Returns the width of '#Guid' heap indexes in bytes
    #[must_use]
    pub fn guid_bytes(&self) -> u8 {
        if self.is_large_index_guid {
            4
        } else {
            2
        }
    }

    /// Returns the width of '#Blob' heap indexes in bytes
    #[must_use]
    pub fn blob_bytes(&self) -> u8 {
        if self.is_large_index_blob {
            4
        } else {
            2
        }
    }

    /// Returns the row information of a specific table
    #[must_use]
    pub fn get(&self, table: TableId) -> &TableRowInfo {
        &self.rows[table as usize]
    }

    /// Returns the number of bits required to represent an index into a specific table
    #[must_use]
    pub fn table_index_bits(&self, table_id: TableId) -> u8 {
        self.rows[table_id as usize].bits
    }

    /// Returns the number of bytes required to represent an index into a specific table
    #[must_use]
    pub fn table_index_bytes(&self, table_id: TableId) -> u8 {
        if self.rows[table_id as usize].bits > 16 {
            4
        } else {
            2
        }
    }

    /// Returns the cached bit size for a specific coded index type
    #[must_use]
    pub fn coded_index_bits(&self, coded_index_type: CodedIndexType) -> u8 {
        self.coded_indexes[coded_index_type as usize]
    }

    /// Returns the byte size of a specific coded index type
    #[must_use]
    pub fn coded_index_bytes(&self, coded_index_type: CodedIndexType) -> u8 {
        if self.coded_indexes[coded_index_type as usize] > 16 {
            4
        } else {
            2
        }
    }

    /// Bits needed by a coded index: the widest candidate row index plus the tag
    fn calculate_coded_index_size(&self, coded_index_type: CodedIndexType) -> u8 {
        let max_bits = coded_index_type
            .tables()
            .iter()
            .map(|table| self.table_index_bits(*table))
            .max()
            .unwrap_or(1);

        max_bits + coded_index_type.tag_bits()
    }

    fn calculate_coded_index_bits(&mut self) {
        for coded_index in CodedIndexType::iter() {
            let size = self.calculate_coded_index_size(coded_index);
            self.coded_indexes[coded_index as usize] = size;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_info() {
        assert_eq!(TableRowInfo::new(0).bits, 1);
        assert_eq!(TableRowInfo::new(1).bits, 1);
        assert_eq!(TableRowInfo::new(0xFFFF).bits, 16);
        assert!(!TableRowInfo::new(0xFFFF).is_large);
        assert_eq!(TableRowInfo::new(0x1_0000).bits, 17);
        assert!(TableRowInfo::new(0x1_0000).is_large);
    }

    #[test]
    fn heap_widths() {
        let info = TableInfo::from_rows(&[], true, false, true);
        assert_eq!(info.str_bytes(), 4);
        assert_eq!(info.blob_bytes(), 2);
        assert_eq!(info.guid_bytes(), 4);
        assert_eq!(info.heap_size_flags(), 0x03);

        let info = TableInfo::from_rows(&[], false, true, false);
        assert_eq!(info.heap_size_flags(), 0x04);
    }

    #[test]
    fn coded_index_width_threshold() {
        // TypeDefOrRef has 2 tag bits: 2^14 rows is the first size that needs 4 bytes
        let info = TableInfo::from_rows(&[(TableId::TypeRef, 0x3FFF)], false, false, false);
        assert_eq!(info.coded_index_bytes(CodedIndexType::TypeDefOrRef), 2);

        let info = TableInfo::from_rows(&[(TableId::TypeRef, 0x4000)], false, false, false);
        assert_eq!(info.coded_index_bytes(CodedIndexType::TypeDefOrRef), 4);
        // The same table is still small for a plain index
        assert_eq!(info.table_index_bytes(TableId::TypeRef), 2);
        assert!(!info.is_large(TableId::TypeRef));
    }

    #[test]
    fn encode_coded_index_small_row_in_large_table() {
        let info = TableInfo::from_rows(&[(TableId::Field, 70_000)], false, false, false);
        let (width, packed) = info
            .encode_coded_index(TableId::Field, 1, CodedIndexType::HasConstant)
            .unwrap();
        assert_eq!(width, 4);
        assert_eq!(packed, 0x04);

        // HasFieldMarshal also contains Field, MemberRefParent does not
        assert_eq!(info.coded_index_bytes(CodedIndexType::HasFieldMarshal), 4);
        assert_eq!(info.coded_index_bytes(CodedIndexType::MemberRefParent), 2);
    }

    #[test]
    fn encode_coded_index_wide_value() {
        let info = TableInfo::from_rows(&[(TableId::TypeDef, 0x4000)], false, false, false);
        let (width, packed) = info
            .encode_coded_index(TableId::TypeDef, 0x4000, CodedIndexType::TypeDefOrRef)
            .unwrap();
        assert_eq!(width, 4);
        assert_eq!(packed, 0x1_0000);
    }

    #[test]
    fn encode_coded_index_value_wider_than_column() {
        let info = TableInfo::default();
        assert_eq!(info.coded_index_bytes(CodedIndexType::TypeDefOrRef), 2);
        match info.encode_coded_index(TableId::TypeDef, 0x4000, CodedIndexType::TypeDefOrRef) {
            Err(Error::InvalidReference { table, row, .. }) => {
                assert_eq!(table, TableId::TypeDef);
                assert_eq!(row, 0x4000);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        // the largest value that still fits keeps the 2 byte column
        let (width, packed) = info
            .encode_coded_index(TableId::TypeSpec, 0x3FFF, CodedIndexType::TypeDefOrRef)
            .unwrap();
        assert_eq!(width, 2);
        assert_eq!(packed, 0xFFFE);
    }

    #[test]
    fn encode_coded_index_invalid() {
        let info = TableInfo::default();
        assert!(matches!(
            info.encode_coded_index(TableId::Param, 1, CodedIndexType::TypeDefOrRef),
            Err(Error::InvalidReference { .. })
        ));
    }

    #[test]
    fn parse_from_header() {
        #[rustfmt::skip]
        let data = [
            0x00, 0x00, 0x00, 0x00, // reserved
            0x02, 0x00,             // major, minor
            0x05,                   // heap sizes: strings + blob
            0x01,                   // reserved
            0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // valid: Module, TypeDef
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // sorted
            0x01, 0x00, 0x00, 0x00, // Module rows
            0x00, 0x00, 0x01, 0x00, // TypeDef rows
        ];

        let info = TableInfo::new(&data, 0x05).unwrap();
        assert_eq!(info.get(TableId::Module).rows, 1);
        assert_eq!(info.get(TableId::TypeDef).rows, 0x1_0000);
        assert!(info.is_large(TableId::TypeDef));
        assert!(info.is_large_str());
        assert!(!info.is_large_guid());
        assert!(info.is_large_blob());
        assert_eq!(info.coded_index_bytes(CodedIndexType::TypeOrMethodDef), 4);
    }
}
