//! Byte-level primitives shared by every reader and writer in the crate.
//!
//! Locating metadata inside a PE image is the job of the surrounding image reader; this
//! module only provides the bounds-checked cursor and endian helpers used once a heap or
//! table region is in hand.

/// Endian-aware reads and writes on byte slices
pub mod io;
/// Cursor based parser for blobs and heaps
pub mod parser;
