use thiserror::Error;

use crate::metadata::{tables::TableId, token::Token};

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The variants fall into three groups, which callers are expected to treat differently:
///
/// ## Input errors (recoverable)
/// - [`Error::Malformed`] - A blob, heap or table region could not be decoded
/// - [`Error::OutOfBounds`] - A read or write would have left the buffer
/// - [`Error::RecursionLimit`] - A signature nests deeper than the configured limit
///
/// Inside the lazy resolution protocol these are contained: accessors on
/// [`crate::metadata::customattributes::CustomAttribute`] and friends report empty collections
/// instead of returning them.
///
/// ## Builder errors (programming-contract violations)
/// - [`Error::InvalidReference`] - A coded index target is not part of its category
/// - [`Error::AlreadyOwned`] - An element was inserted into a second owning collection
///
/// ## Misuse
/// - [`Error::NotSupported`] - An operation requires backing data the entity does not have
///
/// # Examples
///
/// ```rust
/// use cilmeta::{Error, metadata::tables::{CodedIndexType, TableId, TableInfo}};
///
/// let info = TableInfo::default();
/// match info.encode_coded_index(TableId::Field, 1, CodedIndexType::TypeDefOrRef) {
///     Err(Error::InvalidReference { table, .. }) => assert_eq!(table, TableId::Field),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The data is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while reading or writing a buffer.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The operation is not supported for this entity.
    ///
    /// Raised when blob access is requested from an entity that was constructed purely in
    /// memory and therefore has neither a raw blob nor a backing image.
    #[error("This operation is not supported - {0}")]
    NotSupported(String),

    /// A reference could not be encoded into the requested coded index category.
    ///
    /// This always indicates a bug in the code building the metadata, never bad input, and
    /// is surfaced immediately instead of silently producing a corrupt table.
    #[error("Invalid reference - table {table:?} (row {row}) is not valid for {category}")]
    InvalidReference {
        /// The table the reference pointed into
        table: TableId,
        /// The row that was referenced
        row: u32,
        /// Human readable name of the category or table that rejected it
        category: String,
    },

    /// An element was attached to an owning collection while still owned by another one.
    #[error("Element is already owned by {0}")]
    AlreadyOwned(String),

    /// Failed to find an entity by its token.
    #[error("Failed to resolve token - {0}")]
    TokenNotFound(Token),

    /// Recursion limit reached.
    ///
    /// To prevent stack overflow while decoding nested signatures, a maximum depth is
    /// enforced. The associated value shows the limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// Failed to lock target.
    #[error("Failed to lock target")]
    LockError,
}
