//! Growable, strongly typed storage for the rows of one table while metadata is being built.
//!
//! Three flavors exist, matching how the format treats tables:
//!
//! - [`RowTable`] - any number of rows in insertion order
//! - [`SortedRowTable`] - a [`RowTable`] that is ordered by its key column once, right before
//!   it is written
//! - [`SingleRowTable`] - at most one row (`Module`, `Assembly`)
//!
//! All of them implement the object safe [`Table`] trait, which is what the tables stream
//! writer iterates over.
//!
//! # Example
//!
//! ```rust
//! use cilmeta::metadata::tables::{CodedIndex, CustomAttributeRaw, SortedRowTable, TableId};
//!
//! let mut table = SortedRowTable::<CustomAttributeRaw>::new();
//! let ctor = CodedIndex::new(TableId::MemberRef, 1);
//! table.add_row(CustomAttributeRaw { parent: CodedIndex::new(TableId::TypeDef, 2), constructor: ctor, value: 0 });
//! table.add_row(CustomAttributeRaw { parent: CodedIndex::new(TableId::TypeDef, 1), constructor: ctor, value: 0 });
//!
//! table.sort();
//! assert_eq!(table.get(1).unwrap().parent.row, 1);
//! ```

use crate::{
    metadata::tables::{RowWritable, SortedRow, TableId, TableInfoRef},
    Error, Result,
};

/// Type erased view of a table under construction.
pub trait Table: Send {
    /// The table identifier
    fn id(&self) -> TableId;

    /// Current number of rows
    fn len(&self) -> u32;

    /// Returns true if the table holds no rows
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true when references into this table need 4 bytes
    fn is_large(&self) -> bool {
        self.len() > u32::from(u16::MAX)
    }

    /// Returns true if this table is ordered by a key column before writing
    fn is_sorted_table(&self) -> bool {
        false
    }

    /// Orders the rows by the key column; a no-op for unsorted tables
    fn sort(&mut self) {}

    /// Size of one row under the given widths
    fn row_size(&self, sizes: &TableInfoRef) -> u32;

    /// Size of all rows under the given widths
    fn size(&self, sizes: &TableInfoRef) -> u64 {
        u64::from(self.len()) * u64::from(self.row_size(sizes))
    }

    /// Serializes every row in order into `data` at `offset`
    ///
    /// # Errors
    /// Returns an error if a row cannot be encoded with the given widths.
    fn write(&self, data: &mut [u8], offset: &mut usize, sizes: &TableInfoRef) -> Result<()>;
}

/// A growable table of rows of one kind.
///
/// Rows are only ever appended; a row id, once handed out by [`RowTable::add_row`], keeps
/// pointing at the same row until the table is sorted.
pub struct RowTable<T> {
    rows: Vec<T>,
}

impl<T: RowWritable> Default for RowTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RowWritable> RowTable<T> {
    /// Creates an empty table
    #[must_use]
    pub fn new() -> Self {
        RowTable { rows: Vec::new() }
    }

    /// Creates an empty table with room for `capacity` rows
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        RowTable {
            rows: Vec::with_capacity(capacity),
        }
    }

    /// Appends a row and returns its 1-based row id.
    ///
    /// Storage grows by doubling when full.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_row(&mut self, row: T) -> u32 {
        if self.rows.len() == self.rows.capacity() {
            self.rows.reserve(self.rows.len().max(4));
        }

        self.rows.push(row);
        self.rows.len() as u32
    }

    /// Number of rows
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn len(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Returns true if no rows have been added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns true when references into this table need 4 bytes (more than 65535 rows)
    #[must_use]
    pub fn is_large(&self) -> bool {
        self.len() > u32::from(u16::MAX)
    }

    /// Returns the row with the 1-based id `rid`
    #[must_use]
    pub fn get(&self, rid: u32) -> Option<&T> {
        if rid == 0 {
            return None;
        }

        self.rows.get(rid as usize - 1)
    }

    /// Iterates the rows in their current order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    /// The rows in their current order
    #[must_use]
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<T> {
        &mut self.rows
    }

    /// Serializes every row into `data` at `offset`
    ///
    /// # Errors
    /// Returns an error if a row cannot be encoded with the given widths.
    #[allow(clippy::cast_possible_truncation)]
    pub fn write(&self, data: &mut [u8], offset: &mut usize, sizes: &TableInfoRef) -> Result<()> {
        for (index, row) in self.rows.iter().enumerate() {
            row.row_write(data, offset, index as u32 + 1, sizes)?;
        }

        Ok(())
    }
}

impl<T: RowWritable> Table for RowTable<T> {
    fn id(&self) -> TableId {
        T::TABLE_ID
    }

    fn len(&self) -> u32 {
        RowTable::len(self)
    }

    fn row_size(&self, sizes: &TableInfoRef) -> u32 {
        T::row_size(sizes)
    }

    fn write(&self, data: &mut [u8], offset: &mut usize, sizes: &TableInfoRef) -> Result<()> {
        RowTable::write(self, data, offset, sizes)
    }
}

/// A table that is ordered by its key column right before it is written.
///
/// Sorting happens exactly once, never incrementally. Keys are compared as unsigned integers
/// and the sort is stable, so rows with equal keys keep their insertion order.
pub struct SortedRowTable<T> {
    inner: RowTable<T>,
    sorted: bool,
}

impl<T: SortedRow> Default for SortedRowTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SortedRow> SortedRowTable<T> {
    /// Creates an empty table
    #[must_use]
    pub fn new() -> Self {
        SortedRowTable {
            inner: RowTable::new(),
            sorted: false,
        }
    }

    /// Appends a row and returns its 1-based row id (valid until [`SortedRowTable::sort`])
    pub fn add_row(&mut self, row: T) -> u32 {
        self.sorted = false;
        self.inner.add_row(row)
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> u32 {
        self.inner.len()
    }

    /// Returns true if no rows have been added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns true when references into this table need 4 bytes
    #[must_use]
    pub fn is_large(&self) -> bool {
        self.inner.is_large()
    }

    /// Returns the row with the 1-based id `rid`
    #[must_use]
    pub fn get(&self, rid: u32) -> Option<&T> {
        self.inner.get(rid)
    }

    /// Iterates the rows in their current order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.inner.iter()
    }

    /// Returns true once the rows are ordered by key
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.sorted
    }

    /// Orders the rows by key in place
    pub fn sort(&mut self) {
        if self.sorted {
            return;
        }

        self.inner
            .rows_mut()
            .sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        self.sorted = true;
    }
}

impl<T: SortedRow> Table for SortedRowTable<T> {
    fn id(&self) -> TableId {
        T::TABLE_ID
    }

    fn len(&self) -> u32 {
        self.inner.len()
    }

    fn is_sorted_table(&self) -> bool {
        true
    }

    fn sort(&mut self) {
        SortedRowTable::sort(self);
    }

    fn row_size(&self, sizes: &TableInfoRef) -> u32 {
        T::row_size(sizes)
    }

    fn write(&self, data: &mut [u8], offset: &mut usize, sizes: &TableInfoRef) -> Result<()> {
        if !self.sorted && !self.inner.is_empty() {
            return Err(malformed_error!(
                "{:?} table must be sorted before it is written",
                T::TABLE_ID
            ));
        }

        self.inner.write(data, offset, sizes)
    }
}

/// A table that holds at most one row.
pub struct SingleRowTable<T> {
    row: Option<T>,
}

impl<T: RowWritable> Default for SingleRowTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RowWritable> SingleRowTable<T> {
    /// Creates an empty table
    #[must_use]
    pub fn new() -> Self {
        SingleRowTable { row: None }
    }

    /// Sets the row, which always gets row id 1.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidReference`] if the table already holds its row.
    pub fn add_row(&mut self, row: T) -> Result<u32> {
        if self.row.is_some() {
            return Err(Error::InvalidReference {
                table: T::TABLE_ID,
                row: 2,
                category: "a single row table".to_string(),
            });
        }

        self.row = Some(row);
        Ok(1)
    }

    /// The row, if set
    #[must_use]
    pub fn row(&self) -> Option<&T> {
        self.row.as_ref()
    }

    /// Number of rows, 0 or 1
    #[must_use]
    pub fn len(&self) -> u32 {
        u32::from(self.row.is_some())
    }

    /// Returns true if the row has not been set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row.is_none()
    }
}

impl<T: RowWritable> Table for SingleRowTable<T> {
    fn id(&self) -> TableId {
        T::TABLE_ID
    }

    fn len(&self) -> u32 {
        SingleRowTable::len(self)
    }

    fn row_size(&self, sizes: &TableInfoRef) -> u32 {
        T::row_size(sizes)
    }

    fn write(&self, data: &mut [u8], offset: &mut usize, sizes: &TableInfoRef) -> Result<()> {
        match &self.row {
            Some(row) => row.row_write(data, offset, 1, sizes),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::metadata::tables::{
        CodedIndex, ConstantRaw, FieldLayoutRaw, FieldRaw, ModuleRaw, TableInfo,
    };

    fn field(name: u32) -> FieldRaw {
        FieldRaw {
            flags: 0x0006,
            name,
            signature: 1,
        }
    }

    fn constant(parent: CodedIndex, value: u32) -> ConstantRaw {
        ConstantRaw {
            base: 0x08,
            parent,
            value,
        }
    }

    #[test]
    fn add_row_returns_rid() {
        let mut table = RowTable::<FieldRaw>::new();
        assert!(table.is_empty());
        assert_eq!(table.add_row(field(1)), 1);
        assert_eq!(table.add_row(field(2)), 2);
        assert_eq!(table.add_row(field(3)), 3);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(2).unwrap().name, 2);
        assert!(table.get(0).is_none());
        assert!(table.get(4).is_none());
    }

    #[test]
    fn is_large_flips_at_65536() {
        let mut table = RowTable::<FieldRaw>::with_capacity(0x1_0000);
        for i in 0..0xFFFF {
            table.add_row(field(i));
        }
        assert_eq!(table.len(), 0xFFFF);
        assert!(!table.is_large());

        table.add_row(field(0));
        assert_eq!(table.len(), 0x1_0000);
        assert!(table.is_large());
    }

    #[test]
    fn write_unsorted_table() {
        let mut table = RowTable::<FieldRaw>::new();
        table.add_row(field(0x10));
        table.add_row(field(0x20));

        let sizes = Arc::new(TableInfo::default());
        let mut data = vec![0u8; table.size(&sizes) as usize];
        let mut offset = 0;
        Table::write(&table, &mut data, &mut offset, &sizes).unwrap();

        assert_eq!(offset, data.len());
        assert_eq!(
            data,
            vec![0x06, 0x00, 0x10, 0x00, 0x01, 0x00, 0x06, 0x00, 0x20, 0x00, 0x01, 0x00]
        );
    }

    #[test]
    fn sort_orders_by_key() {
        let mut table = SortedRowTable::<ConstantRaw>::new();
        table.add_row(constant(CodedIndex::new(TableId::Property, 1), 1));
        table.add_row(constant(CodedIndex::new(TableId::Field, 3), 2));
        table.add_row(constant(CodedIndex::new(TableId::Param, 1), 3));
        table.add_row(constant(CodedIndex::new(TableId::Field, 1), 4));

        table.sort();

        let keys: Vec<u32> = table.iter().map(SortedRow::sort_key).collect();
        assert!(keys.windows(2).all(|pair| pair[0] <= pair[1]));
        let values: Vec<u32> = table.iter().map(|row| row.value).collect();
        assert_eq!(values, vec![4, 3, 1, 2]);
    }

    #[test]
    fn sort_keeps_insertion_order_on_ties() {
        let mut table = SortedRowTable::<FieldLayoutRaw>::new();
        for (value, field) in [(0u32, 7u32), (1, 2), (2, 7), (3, 2), (4, 7), (5, 1)] {
            table.add_row(FieldLayoutRaw {
                field_offset: value,
                field,
            });
        }

        table.sort();

        let order: Vec<(u32, u32)> = table
            .iter()
            .map(|row| (row.field, row.field_offset))
            .collect();
        assert_eq!(order, vec![(1, 5), (2, 1), (2, 3), (7, 0), (7, 2), (7, 4)]);
    }

    #[test]
    fn sort_compares_unsigned() {
        let mut table = SortedRowTable::<FieldLayoutRaw>::new();
        table.add_row(FieldLayoutRaw {
            field_offset: 0,
            field: 0x00FF_FFFF,
        });
        table.add_row(FieldLayoutRaw {
            field_offset: 1,
            field: 1,
        });

        table.sort();
        assert_eq!(table.get(1).unwrap().field, 1);
        assert_eq!(table.get(2).unwrap().field, 0x00FF_FFFF);
    }

    #[test]
    fn unsorted_write_is_rejected() {
        let mut table = SortedRowTable::<FieldLayoutRaw>::new();
        table.add_row(FieldLayoutRaw {
            field_offset: 0,
            field: 1,
        });

        let sizes = Arc::new(TableInfo::default());
        let mut data = vec![0u8; 6];
        let mut offset = 0;
        assert!(Table::write(&table, &mut data, &mut offset, &sizes).is_err());

        Table::sort(&mut table);
        assert!(Table::write(&table, &mut data, &mut offset, &sizes).is_ok());
    }

    #[test]
    fn single_row_table() {
        let mut table = SingleRowTable::<ModuleRaw>::new();
        assert_eq!(table.len(), 0);

        let row = ModuleRaw {
            generation: 0,
            name: 1,
            mvid: 1,
            encid: 0,
            encbaseid: 0,
        };
        assert_eq!(table.add_row(row.clone()).unwrap(), 1);
        assert_eq!(table.len(), 1);
        assert!(matches!(
            table.add_row(row),
            Err(Error::InvalidReference {
                table: TableId::Module,
                ..
            })
        ));
    }
}
