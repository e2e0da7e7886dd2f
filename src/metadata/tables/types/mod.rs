//! # Metadata Table Types Module
//!
//! Core infrastructure shared by all metadata tables: identifiers, coded indices, index width
//! computation, the row traits, and the two containers rows live in.
//!
//! ## Key Components
//!
//! ### Reading
//!
//! - [`MetadataTable`]: Typed, lazy view over the rows of one table inside a tables stream
//! - [`TableIterator`]: Sequential iterator for table rows
//!
//! ### Writing
//!
//! - [`RowTable`], [`SortedRowTable`], [`SingleRowTable`]: Growable row storage
//! - [`Table`]: Type erased view over any of the above, used by the stream writer
//!
//! ### Supporting Infrastructure
//!
//! - [`CodedIndex`] and [`CodedIndexType`]: Compact cross-table references
//! - [`TableId`]: Enumeration of all metadata table types
//! - [`TableInfo`] and [`TableInfoRef`]: Row counts and the resulting index widths
//!
//! ## References
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Partition II, Section 22

mod codedindex;
mod rowtable;
mod tableid;
mod tableinfo;
mod traits;

use std::marker::PhantomData;

use crate::{Error::OutOfBounds, Result};

pub use codedindex::{CodedIndex, CodedIndexType};
pub use rowtable::{RowTable, SingleRowTable, SortedRowTable, Table};
pub use tableid::TableId;
pub use tableinfo::{TableInfo, TableInfoRef, TableRowInfo};
pub use traits::{RowDefinition, RowReadable, RowWritable, SortedRow};

/// Generic container for metadata table data with typed row access.
///
/// Wraps the raw bytes of one table and parses rows on demand through [`RowReadable`].
///
/// ## Type Parameters
///
/// * `'a` - Lifetime of the underlying byte data
/// * `T` - The row type that implements [`RowReadable`]
///
/// ## Examples
///
/// ```rust
/// use std::sync::Arc;
/// use cilmeta::metadata::tables::{FieldRaw, MetadataTable, TableId, TableInfo};
///
/// let sizes = Arc::new(TableInfo::from_rows(&[(TableId::Field, 1)], false, false, false));
/// let data = [0x06, 0x00, 0x01, 0x00, 0x0A, 0x00];
/// let table = MetadataTable::<FieldRaw>::new(&data, 1, sizes)?;
///
/// let field = table.get(1).unwrap();
/// assert_eq!(field.flags, 6);
/// assert_eq!(field.signature, 10);
/// # Ok::<(), cilmeta::Error>(())
/// ```
pub struct MetadataTable<'a, T> {
    /// Reference to the raw table data bytes
    data: &'a [u8],
    /// Total number of rows in this table
    row_count: u32,
    /// Size in bytes of each row
    row_size: u32,
    /// Table configuration and size information
    sizes: TableInfoRef,
    _phantom: PhantomData<T>,
}

impl<'a, T: RowReadable> MetadataTable<'a, T> {
    /// Creates a new metadata table from raw byte data.
    ///
    /// ## Arguments
    ///
    /// * `data` - The raw byte buffer starting with the first row of the table
    /// * `row_count` - The total number of rows present in the table
    /// * `sizes` - Index widths required for the row size calculation
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if `data` is too small to hold `row_count` rows.
    pub fn new(data: &'a [u8], row_count: u32, sizes: TableInfoRef) -> Result<Self> {
        let row_size = T::row_size(&sizes);
        if (data.len() as u64) < u64::from(row_count) * u64::from(row_size) {
            return Err(OutOfBounds);
        }

        Ok(MetadataTable {
            data,
            row_count,
            row_size,
            sizes,
            _phantom: PhantomData,
        })
    }

    /// Returns the total size of this table in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        u64::from(self.row_count) * u64::from(self.row_size)
    }

    /// Returns the size of a single row in bytes.
    #[must_use]
    pub fn row_size(&self) -> u32 {
        self.row_size
    }

    /// Returns the total number of rows in this table.
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Retrieves a specific row by its 1-based index.
    ///
    /// Row 0 is reserved and represents a null reference in the metadata format.
    ///
    /// ## Returns
    ///
    /// Returns `Some(T)` if the row exists and can be parsed successfully,
    /// or `None` if the index is out of bounds or parsing fails.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<T> {
        if index == 0 || self.row_count < index {
            return None;
        }

        T::row_read(
            self.data,
            &mut ((index as usize - 1) * self.row_size as usize),
            index,
            &self.sizes,
        )
        .ok()
    }

    /// Creates a sequential iterator over all rows in the table.
    #[must_use]
    pub fn iter(&'a self) -> TableIterator<'a, T> {
        TableIterator {
            table: self,
            current_row: 0,
            current_offset: 0,
        }
    }
}

impl<'a, T: RowReadable> IntoIterator for &'a MetadataTable<'a, T> {
    type Item = T;
    type IntoIter = TableIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sequential iterator for metadata table rows.
///
/// Rows are parsed only as they are requested. Iteration stops at the first row that fails
/// to parse.
pub struct TableIterator<'a, T> {
    /// Reference to the table being iterated
    table: &'a MetadataTable<'a, T>,
    /// Current row number (0-based for internal tracking)
    current_row: u32,
    /// Current byte offset in the table data
    current_offset: usize,
}

impl<T: RowReadable> Iterator for TableIterator<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row >= self.table.row_count {
            return None;
        }

        match T::row_read(
            self.table.data,
            &mut self.current_offset,
            self.current_row + 1,
            &self.table.sizes,
        ) {
            Ok(row) => {
                self.current_row += 1;
                Some(row)
            }
            Err(_) => None,
        }
    }
}
