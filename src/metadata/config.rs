//! Configuration for reading and writing metadata
//!
//! Index widths are normally derived from the data (heap sizes, row counts). The options in
//! [`MetadataConfig`] allow forcing the wide encodings, choosing the schema version written
//! into the tables stream header and bounding signature recursion.

/// Configuration for the metadata reader and writer
///
/// Forcing a heap to 4-byte indices never changes the meaning of the metadata, only its size.
/// Readers honor whatever the header declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct MetadataConfig {
    /// Write 4-byte `#Strings` indices regardless of the heap size
    pub force_large_strings: bool,

    /// Write 4-byte `#GUID` indices regardless of the heap size
    pub force_large_guids: bool,

    /// Write 4-byte `#Blob` indices regardless of the heap size
    pub force_large_blobs: bool,

    /// Major version of the table schema written to the `#~` header (default: 2)
    pub major_version: u8,

    /// Minor version of the table schema written to the `#~` header (default: 0)
    pub minor_version: u8,

    /// Maximum nesting of types inside a signature blob (default: 64)
    /// Deeper signatures are rejected with [`crate::Error::RecursionLimit`]
    pub max_signature_depth: usize,

    /// Sort the sorted tables on the rayon thread pool
    pub parallel_sort: bool,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            force_large_strings: false,
            force_large_guids: false,
            force_large_blobs: false,
            major_version: 2,
            minor_version: 0,
            max_signature_depth: 64,
            parallel_sort: true,
        }
    }
}

impl MetadataConfig {
    /// Creates a configuration producing the smallest metadata
    ///
    /// Every index width is derived from the data, tables are sorted on the calling thread.
    #[must_use]
    pub fn compact() -> Self {
        Self {
            parallel_sort: false,
            ..Self::default()
        }
    }

    /// Creates a configuration that writes 4-byte indices into every heap
    ///
    /// Useful when the metadata is patched later and heaps are expected to grow.
    #[must_use]
    pub fn wide() -> Self {
        Self {
            force_large_strings: true,
            force_large_guids: true,
            force_large_blobs: true,
            ..Self::default()
        }
    }
}
