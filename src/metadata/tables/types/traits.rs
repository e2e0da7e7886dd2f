use crate::{
    metadata::tables::{TableId, TableInfoRef},
    Result,
};

/// The physical shape of one row of a metadata table.
///
/// ## Implementation Requirements
///
/// Types implementing this trait must:
/// - Be `Send` to support sorting and writing tables on worker threads
/// - Provide an exact row size for the given index widths
pub trait RowDefinition: Sized + Send {
    /// The table this row type belongs to
    const TABLE_ID: TableId;

    /// Calculates the size in bytes of a single row for this table type.
    ///
    /// Heap indices, simple table indices and coded indices are 2 or 4 bytes wide depending
    /// on `sizes`; fixed columns are always the same size.
    fn row_size(sizes: &TableInfoRef) -> u32;
}

/// Trait defining the interface for reading and parsing metadata table rows.
pub trait RowReadable: RowDefinition {
    /// Reads and parses a single row from the provided byte buffer.
    ///
    /// ## Arguments
    ///
    /// * `data` - The byte buffer containing the table data to read from
    /// * `offset` - Mutable reference to the current read position, automatically
    ///   advanced by the number of bytes consumed
    /// * `rid` - The 1-based row identifier for this entry (starts at 1, not 0)
    /// * `sizes` - Table size information for parsing variable-sized fields
    ///
    /// # Errors
    /// Returns an error if the buffer contains insufficient data or a coded index is invalid.
    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self>;
}

/// Trait defining the interface for serializing metadata table rows.
pub trait RowWritable: RowDefinition {
    /// Serializes a single row into `data` at `offset`, advancing the offset.
    ///
    /// ## Arguments
    ///
    /// * `data` - The mutable byte buffer to write the row data into
    /// * `offset` - Mutable reference to the current write position
    /// * `rid` - The 1-based row identifier for this entry
    /// * `sizes` - Final index widths of the metadata being written
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] when the buffer lacks space or an index does not fit
    /// its column, and [`crate::Error::InvalidReference`] when a coded index targets a table
    /// outside its category.
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()>;
}

/// Rows of the tables that must be ordered by a key column before they are written.
///
/// The key of a coded index column is its packed value (`row << tag_bits | tag`), which does
/// not depend on the final column width, so tables can be sorted before widths are known.
pub trait SortedRow: RowWritable {
    /// The value the table is ordered by
    fn sort_key(&self) -> u32;
}
