//! Deferred decoding of metadata payloads.
//!
//! Custom attributes, security declarations and event accessor groups are loaded as light
//! handles. Their payload is decoded the first time any derived property is read, and the
//! result is cached for the lifetime of the entity.
//!
//! # Resolution protocol
//!
//! 1. A resolved payload is published through an `RwLock` and returned without touching the
//!    module lock.
//! 2. Otherwise the module lock ([`ModuleContext::sync_root`]) is taken, the state checked
//!    again and the payload decoded while the lock is held.
//! 3. On success the payload is stored and the entity stays resolved.
//! 4. On failure the error is logged, the entity stays unresolved and the accessor reports an
//!    empty payload. The next access tries again.
//!
//! Entities built in memory start resolved and never decode anything.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use cilmeta::metadata::{lazy::{BlobSource, LazyBlob}, module::ModuleContext};
//!
//! let decoder = Arc::new(|blob: &[u8]| -> cilmeta::Result<Vec<u8>> { Ok(blob.to_vec()) });
//! let lazy = LazyBlob::new(
//!     Arc::new(ModuleContext::detached()),
//!     BlobSource::raw(&[1, 2, 3]),
//!     "example",
//!     decoder,
//! );
//!
//! assert!(!lazy.is_resolved());
//! assert_eq!(*lazy.get(), vec![1, 2, 3]);
//! assert!(lazy.is_resolved());
//! ```

use std::sync::{Arc, RwLock};

use crate::{
    metadata::module::ModuleContext,
    Error::NotSupported,
    Result,
};

/// Decodes the payload of a blob.
///
/// Implemented for every `Fn(&[u8]) -> Result<T>` closure, which is how the loader hands the
/// decoding context (constructor parameters, enum types) to an entity.
pub trait BlobDecoder<T>: Send + Sync {
    /// Decodes `blob` into its payload
    ///
    /// # Errors
    /// Returns an error if the blob is malformed.
    fn decode(&self, blob: &[u8]) -> Result<T>;
}

impl<T, F> BlobDecoder<T> for F
where
    F: Fn(&[u8]) -> Result<T> + Send + Sync,
{
    fn decode(&self, blob: &[u8]) -> Result<T> {
        self(blob)
    }
}

/// Where the bytes of a lazily decoded payload come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobSource {
    /// A blob handed over directly, independent of any heap
    Raw(Arc<[u8]>),
    /// Byte offset into the `#Blob` heap of the owning module
    Heap(u32),
    /// No backing bytes; the entity was built in memory
    None,
}

impl BlobSource {
    /// A raw blob, copied from `data`
    #[must_use]
    pub fn raw(data: &[u8]) -> Self {
        BlobSource::Raw(Arc::from(data))
    }

    /// Returns true if there are bytes to decode
    #[must_use]
    pub fn is_backed(&self) -> bool {
        !matches!(self, BlobSource::None)
    }

    /// Runs `f` over the bytes of this source
    ///
    /// # Errors
    /// Returns [`crate::Error::NotSupported`] if there are no bytes, either because the source
    /// is [`BlobSource::None`] or because a heap offset is used without a backing image.
    pub fn with_blob<R>(
        &self,
        context: &ModuleContext,
        f: impl FnOnce(&[u8]) -> Result<R>,
    ) -> Result<R> {
        match self {
            BlobSource::Raw(data) => f(data),
            BlobSource::Heap(index) => match context.reader() {
                Some(reader) => f(reader.blob(*index)?),
                None => Err(NotSupported(format!(
                    "blob 0x{index:x} requested from a module without image"
                ))),
            },
            BlobSource::None => Err(NotSupported(
                "entity was created in memory and has no blob".to_string(),
            )),
        }
    }
}

type Resolver<T> = Box<dyn Fn(&ModuleContext) -> Result<T> + Send + Sync>;

/// A value that is computed once, under the module lock, on first access.
pub struct Lazy<T> {
    context: Arc<ModuleContext>,
    state: RwLock<Option<Arc<T>>>,
    resolver: Option<Resolver<T>>,
    what: &'static str,
}

impl<T: Default + Send + Sync> Lazy<T> {
    /// A lazy value computed by `resolver` on first access
    ///
    /// `what` names the payload in log messages.
    pub fn new(
        context: Arc<ModuleContext>,
        what: &'static str,
        resolver: impl Fn(&ModuleContext) -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        Lazy {
            context,
            state: RwLock::new(None),
            resolver: Some(Box::new(resolver)),
            what,
        }
    }

    /// An already resolved value
    #[must_use]
    pub fn resolved(value: T) -> Self {
        Lazy {
            context: Arc::new(ModuleContext::detached()),
            state: RwLock::new(Some(Arc::new(value))),
            resolver: None,
            what: "value",
        }
    }

    /// Returns true once the value has been computed
    pub fn is_resolved(&self) -> bool {
        read_lock!(self.state).is_some()
    }

    /// The module this value belongs to
    pub fn context(&self) -> &Arc<ModuleContext> {
        &self.context
    }

    /// The value, computing it first if needed.
    ///
    /// A failing computation is logged and reported as `T::default()`; the value stays
    /// unresolved.
    pub fn get(&self) -> Arc<T> {
        if let Some(value) = read_lock!(self.state).as_ref() {
            return value.clone();
        }

        let Some(resolver) = &self.resolver else {
            return Arc::new(T::default());
        };

        let _guard = lock!(self.context.sync_root());
        if let Some(value) = read_lock!(self.state).as_ref() {
            return value.clone();
        }

        match resolver(&self.context) {
            Ok(value) => {
                let value = Arc::new(value);
                *write_lock!(self.state) = Some(value.clone());
                log::trace!("Resolved {}", self.what);
                value
            }
            Err(error) => {
                log::warn!("Failed to resolve {} - {}", self.what, error);
                Arc::new(T::default())
            }
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lazy")
            .field("what", &self.what)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// A payload decoded from a blob on first access.
pub struct LazyBlob<T> {
    source: BlobSource,
    value: Lazy<T>,
}

impl<T: Default + Send + Sync + 'static> LazyBlob<T> {
    /// A payload decoded from `source` by `decoder` on first access
    pub fn new(
        context: Arc<ModuleContext>,
        source: BlobSource,
        what: &'static str,
        decoder: Arc<dyn BlobDecoder<T>>,
    ) -> Self {
        let blob = source.clone();
        LazyBlob {
            source,
            value: Lazy::new(context, what, move |context| {
                blob.with_blob(context, |data| decoder.decode(data))
            }),
        }
    }

    /// A payload that exists only in memory
    #[must_use]
    pub fn resolved(value: T) -> Self {
        LazyBlob {
            source: BlobSource::None,
            value: Lazy::resolved(value),
        }
    }

    /// The decoded payload; empty if decoding fails
    pub fn get(&self) -> Arc<T> {
        self.value.get()
    }

    /// Returns true once the payload has been decoded, or if it never needed decoding
    pub fn is_resolved(&self) -> bool {
        self.value.is_resolved()
    }

    /// Where the payload is decoded from
    pub fn source(&self) -> &BlobSource {
        &self.source
    }

    /// A copy of the undecoded blob
    ///
    /// # Errors
    /// Returns [`crate::Error::NotSupported`] if the payload was created in memory, or an error
    /// from the heap if the blob cannot be read.
    pub fn blob(&self) -> Result<Vec<u8>> {
        self.source
            .with_blob(self.value.context(), |data| Ok(data.to_vec()))
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for LazyBlob<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyBlob")
            .field("source", &self.source)
            .field("value", &self.value)
            .finish()
    }
}
