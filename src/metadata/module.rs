//! Module-wide state shared by everything that resolves lazily.
//!
//! A loaded module owns one [`ModuleContext`]. It carries the heap reader that lazily decoded
//! entities pull their blobs from, and the single lock that serializes every resolution in the
//! module: custom attributes, security declarations and event accessors all take the same
//! [`ModuleContext::sync_root`] before decoding.
//!
//! One coarse lock per module keeps the resolution protocol easy to reason about. Resolution
//! happens once per entity, so the lock is only contended while a module is first explored.
//!
//! # Key Components
//!
//! - [`MetadataReader`]: Heap access consumed by the lazy resolvers
//! - [`HeapsView`]: Owned `#Strings`, `#Blob` and `#GUID` heaps implementing [`MetadataReader`]
//! - [`MetadataImage`]: A tables stream together with its heaps, as produced by the writer
//! - [`ModuleContext`]: Reader, configuration and the module lock

use std::sync::{Arc, Mutex};

use crate::{
    metadata::{
        config::MetadataConfig,
        streams::{Blob, Guid, Strings},
    },
    Result,
};

/// Read access to the heaps of a metadata image.
///
/// Implemented by [`HeapsView`] for in-memory heaps; image readers that keep the heaps inside a
/// mapped file can implement it directly over their mapping.
pub trait MetadataReader: Send + Sync {
    /// The blob at byte offset `index` of the `#Blob` heap, without its length prefix
    ///
    /// # Errors
    /// Returns an error if the offset or the blob length lies outside the heap.
    fn blob(&self, index: u32) -> Result<&[u8]>;

    /// The string at byte offset `index` of the `#Strings` heap
    ///
    /// # Errors
    /// Returns an error if the offset lies outside the heap or the string is not valid UTF-8.
    fn string(&self, index: u32) -> Result<&str>;

    /// The GUID at 1-based `index` of the `#GUID` heap, the null GUID for index 0
    ///
    /// # Errors
    /// Returns an error if the index lies outside the heap.
    fn guid(&self, index: u32) -> Result<uguid::Guid>;
}

/// The three heaps of a metadata image, held in memory.
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::{module::{HeapsView, MetadataReader}, streams::HeapWriter};
///
/// let mut heaps = HeapWriter::new();
/// let name = heaps.intern_string("Program")?;
/// let sig = heaps.intern_blob(&[0x06, 0x08])?;
///
/// let view = HeapsView::from_writer(&heaps);
/// assert_eq!(view.string(name)?, "Program");
/// assert_eq!(view.blob(sig)?, &[0x06, 0x08]);
/// # Ok::<(), cilmeta::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapsView {
    strings: Vec<u8>,
    blob: Vec<u8>,
    guid: Vec<u8>,
}

impl HeapsView {
    /// Wraps the raw bytes of the three heaps.
    ///
    /// Empty `#Strings` and `#Blob` heaps are replaced by a heap holding only the null entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a heap does not have the layout ECMA-335 requires.
    pub fn new(strings: Vec<u8>, blob: Vec<u8>, guid: Vec<u8>) -> Result<Self> {
        let strings = if strings.is_empty() { vec![0] } else { strings };
        let blob = if blob.is_empty() { vec![0] } else { blob };

        Strings::from(&strings)?;
        Blob::from(&blob)?;
        Guid::from(&guid)?;

        Ok(HeapsView {
            strings,
            blob,
            guid,
        })
    }

    /// Snapshot of the heaps a [`crate::metadata::streams::HeapWriter`] has built so far
    #[must_use]
    pub fn from_writer(heaps: &crate::metadata::streams::HeapWriter) -> Self {
        HeapsView {
            strings: heaps.strings_heap(),
            blob: heaps.blob_heap(),
            guid: heaps.guid_heap(),
        }
    }

    /// Raw bytes of the `#Strings` heap
    #[must_use]
    pub fn strings_heap(&self) -> &[u8] {
        &self.strings
    }

    /// Raw bytes of the `#Blob` heap
    #[must_use]
    pub fn blob_heap(&self) -> &[u8] {
        &self.blob
    }

    /// Raw bytes of the `#GUID` heap
    #[must_use]
    pub fn guid_heap(&self) -> &[u8] {
        &self.guid
    }
}

impl MetadataReader for HeapsView {
    fn blob(&self, index: u32) -> Result<&[u8]> {
        Blob::from(&self.blob)?.get(index as usize)
    }

    fn string(&self, index: u32) -> Result<&str> {
        Strings::from(&self.strings)?.get(index as usize)
    }

    fn guid(&self, index: u32) -> Result<uguid::Guid> {
        Guid::from(&self.guid)?.get(index as usize)
    }
}

/// A complete metadata image: the `#~` stream and the heaps its rows point into.
///
/// Produced by [`crate::metadata::writer::MetadataWriter`] and consumed by
/// [`crate::metadata::loader::ModuleLoader`]. Placing the streams inside a PE file is left to
/// the image writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataImage {
    /// The `#~` stream
    pub tables: Vec<u8>,
    /// `#Strings`, `#Blob` and `#GUID`
    pub heaps: HeapsView,
}

/// State shared by every entity of one module.
pub struct ModuleContext {
    sync_root: Mutex<()>,
    reader: Option<Arc<dyn MetadataReader>>,
    config: MetadataConfig,
}

impl ModuleContext {
    /// Context of a module backed by the heaps behind `reader`
    #[must_use]
    pub fn new(reader: Arc<dyn MetadataReader>, config: MetadataConfig) -> Self {
        ModuleContext {
            sync_root: Mutex::new(()),
            reader: Some(reader),
            config,
        }
    }

    /// Context of a module built in memory, without any image behind it
    #[must_use]
    pub fn detached() -> Self {
        ModuleContext {
            sync_root: Mutex::new(()),
            reader: None,
            config: MetadataConfig::default(),
        }
    }

    /// The lock serializing lazy resolution within this module
    pub fn sync_root(&self) -> &Mutex<()> {
        &self.sync_root
    }

    /// The heaps of the backing image, `None` for modules built in memory
    #[must_use]
    pub fn reader(&self) -> Option<&Arc<dyn MetadataReader>> {
        self.reader.as_ref()
    }

    /// Returns true if the module was read from an image
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.reader.is_some()
    }

    /// The configuration the module was loaded with
    #[must_use]
    pub fn config(&self) -> &MetadataConfig {
        &self.config
    }
}

impl std::fmt::Debug for ModuleContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleContext")
            .field("has_image", &self.has_image())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
