//! Builder for the `#Strings`, `#Blob` and `#GUID` heaps of a new metadata image.
//!
//! Every payload is stored once: interning the same string, blob or GUID twice returns the
//! offset of the first copy. Offset 0 is reserved for the empty string, the empty blob and the
//! null GUID, and interning those never grows a heap.

use std::collections::HashMap;

use crate::{
    file::io::{compressed_uint_size, write_compressed_uint},
    Result,
};

/// Heap size from which indices into the heap need 4 bytes
const LARGE_HEAP: usize = 0xFFFF;

/// Interns heap payloads and hands out their offsets.
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::streams::HeapWriter;
///
/// let mut heaps = HeapWriter::new();
/// let name = heaps.intern_string("Program")?;
/// assert_eq!(heaps.intern_string("Program")?, name);
/// assert_eq!(heaps.intern_string("")?, 0);
///
/// let sig = heaps.intern_blob(&[0x06, 0x08])?;
/// assert_eq!(heaps.intern_blob(&[0x06, 0x08])?, sig);
/// assert!(!heaps.is_large_blob());
/// # Ok::<(), cilmeta::Error>(())
/// ```
pub struct HeapWriter {
    strings: Vec<u8>,
    string_offsets: HashMap<String, u32>,
    blobs: Vec<u8>,
    blob_offsets: HashMap<Vec<u8>, u32>,
    guids: Vec<uguid::Guid>,
    guid_indices: HashMap<uguid::Guid, u32>,
}

impl Default for HeapWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl HeapWriter {
    /// Creates empty heaps, each holding only its null entry
    #[must_use]
    pub fn new() -> Self {
        HeapWriter {
            strings: vec![0],
            string_offsets: HashMap::new(),
            blobs: vec![0],
            blob_offsets: HashMap::new(),
            guids: Vec::new(),
            guid_indices: HashMap::new(),
        }
    }

    /// Adds `value` to the `#Strings` heap, returning its offset
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `value` contains a NUL, which would end the entry
    /// early when read back
    #[allow(clippy::cast_possible_truncation)]
    pub fn intern_string(&mut self, value: &str) -> Result<u32> {
        if value.is_empty() {
            return Ok(0);
        }

        if let Some(offset) = self.string_offsets.get(value) {
            return Ok(*offset);
        }

        if let Some(position) = value.find('\0') {
            return Err(malformed_error!(
                "String contains a NUL at {} - {:?}",
                position,
                value
            ));
        }

        let offset = self.strings.len() as u32;
        self.strings.extend_from_slice(value.as_bytes());
        self.strings.push(0);
        self.string_offsets.insert(value.to_string(), offset);
        Ok(offset)
    }

    /// Adds `value` to the `#Blob` heap, returning its offset
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the blob is too long for a compressed length prefix
    #[allow(clippy::cast_possible_truncation)]
    pub fn intern_blob(&mut self, value: &[u8]) -> Result<u32> {
        if value.is_empty() {
            return Ok(0);
        }

        if let Some(offset) = self.blob_offsets.get(value) {
            return Ok(*offset);
        }

        let Ok(length) = u32::try_from(value.len()) else {
            return Err(malformed_error!("Blob too large - {} bytes", value.len()));
        };

        let offset = self.blobs.len() as u32;
        write_compressed_uint(length, &mut self.blobs)?;
        self.blobs.extend_from_slice(value);
        self.blob_offsets.insert(value.to_vec(), offset);
        Ok(offset)
    }

    /// Adds `value` to the `#GUID` heap, returning its 1-based index (0 for the null GUID)
    #[allow(clippy::cast_possible_truncation)]
    pub fn intern_guid(&mut self, value: &uguid::Guid) -> u32 {
        if *value == uguid::Guid::ZERO {
            return 0;
        }

        if let Some(index) = self.guid_indices.get(value) {
            return *index;
        }

        self.guids.push(*value);
        let index = self.guids.len() as u32;
        self.guid_indices.insert(*value, index);
        index
    }

    /// Size in bytes of the `#Strings` stream, including alignment
    #[must_use]
    pub fn strings_size(&self) -> usize {
        align(self.strings.len())
    }

    /// Size in bytes of the `#Blob` stream, including alignment
    #[must_use]
    pub fn blob_size(&self) -> usize {
        align(self.blobs.len())
    }

    /// Size in bytes of the `#GUID` stream
    #[must_use]
    pub fn guid_size(&self) -> usize {
        self.guids.len() * 16
    }

    /// Returns true if indices into `#Strings` need 4 bytes
    #[must_use]
    pub fn is_large_strings(&self) -> bool {
        self.strings_size() > LARGE_HEAP
    }

    /// Returns true if indices into `#Blob` need 4 bytes
    #[must_use]
    pub fn is_large_blob(&self) -> bool {
        self.blob_size() > LARGE_HEAP
    }

    /// Returns true if indices into `#GUID` need 4 bytes
    #[must_use]
    pub fn is_large_guid(&self) -> bool {
        self.guid_size() > LARGE_HEAP
    }

    /// The `#Strings` stream, padded to a multiple of 4 bytes
    #[must_use]
    pub fn strings_heap(&self) -> Vec<u8> {
        padded(&self.strings)
    }

    /// The `#Blob` stream, padded to a multiple of 4 bytes
    #[must_use]
    pub fn blob_heap(&self) -> Vec<u8> {
        padded(&self.blobs)
    }

    /// The `#GUID` stream
    #[must_use]
    pub fn guid_heap(&self) -> Vec<u8> {
        self.guids.iter().flat_map(|guid| guid.to_bytes()).collect()
    }

    /// Number of bytes a blob of `length` occupies on the heap, length prefix included
    #[must_use]
    pub fn blob_entry_size(length: u32) -> usize {
        compressed_uint_size(length) + length as usize
    }
}

fn align(size: usize) -> usize {
    (size + 3) & !3
}

fn padded(data: &[u8]) -> Vec<u8> {
    let mut heap = Vec::with_capacity(align(data.len()));
    heap.extend_from_slice(data);
    heap.resize(align(data.len()), 0);
    heap
}
