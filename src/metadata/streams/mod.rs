//! Metadata streams for .NET assemblies.
//!
//! This module reads and writes the heaps and the table stream of the ECMA-335 metadata root.
//!
//! # Stream Types
//!
//! ## String Heap
//! - **`#Strings`** - UTF-8 identifier strings heap containing type names, member names, etc.
//!   The first entry is always null (`\0`). All valid entries are null-terminated.
//!
//! ## Binary Data
//! - **`#Blob`** - Binary heap containing signatures, custom attribute data, and other
//!   variable-length binary structures referenced by metadata tables.
//! - **`#GUID`** - Sequence of 128-bit GUIDs used for module identity and versioning.
//!
//! ## Metadata Tables
//! - **`#~`** - Compressed metadata tables containing type definitions, method signatures,
//!   field layouts, and all structural information about the module.
//!
//! The readers borrow the stream bytes. [`HeapWriter`] builds the three heaps of a new image,
//! the `#~` stream itself is produced by [`crate::metadata::tables::TablesBuilder`].
//!
//! # Examples
//!
//! ```rust
//! use cilmeta::metadata::streams::{Blob, HeapWriter, Strings};
//!
//! let mut heaps = HeapWriter::new();
//! let name = heaps.intern_string("Program")?;
//! let sig = heaps.intern_blob(&[0x00, 0x00, 0x01])?;
//!
//! let strings_data = heaps.strings_heap();
//! let blob_data = heaps.blob_heap();
//! let strings = Strings::from(&strings_data)?;
//! let blob = Blob::from(&blob_data)?;
//!
//! assert_eq!(strings.get(name as usize)?, "Program");
//! assert_eq!(blob.get(sig as usize)?, &[0x00, 0x00, 0x01]);
//! # Ok::<(), cilmeta::Error>(())
//! ```
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Section 24.2 - Metadata Physical Layout

/// '#Strings' heap reader
mod strings;
pub use strings::Strings;

/// '#GUID' heap reader
mod guid;
pub use guid::Guid;

/// '#Blob' heap reader
mod blob;
pub use blob::{Blob, BlobIterator};

/// Heap builder for new images
mod heapwriter;
pub use heapwriter::HeapWriter;

/// '#~' stream header and table access
mod tablesheader;
pub use tablesheader::{TableSummary, TablesHeader};
