//! ECMA-335 metadata: tables, heaps, signatures and the member graph built on them.
//!
//! The modules split along the two directions data travels:
//!
//! - **Writing**: [`writer::MetadataWriter`] lowers a [`members::ModuleDefinition`] into rows of
//!   a [`tables::TablesBuilder`] and blobs of a [`streams::HeapWriter`], then serializes the
//!   `#~` stream.
//! - **Reading**: [`loader::ModuleLoader`] parses the stream through
//!   [`streams::TablesHeader`] and builds the member graph back. Custom attributes, security
//!   declarations and event accessors stay undecoded until first accessed ([`lazy`]).
//!
//! # Key Components
//!
//! - [`token`] - Table kind and row id packed into one `u32`
//! - [`tables`] - Row types of every table, row storage and coded indices
//! - [`streams`] - Heap readers, the heap writer and the tables stream header
//! - [`typesystem`] - [`typesystem::TypeReference`] and the names it is built from
//! - [`signatures`] - Method, field, property and type specification blobs
//! - [`customattributes`] and [`security`] - Attribute and permission set blobs
//! - [`members`] - Types and members, owned by exactly one collection each
//! - [`module`] and [`config`] - Heap access, the per-module lock and write options
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use cilmeta::metadata::{
//!     loader::ModuleLoader,
//!     members::{FieldAttributes, FieldDefinition, ModuleDefinition, TypeAttributes, TypeDefinition},
//!     typesystem::PrimitiveType,
//!     writer::MetadataWriter,
//! };
//!
//! let module = ModuleDefinition::new("app.dll");
//! let program = Arc::new(TypeDefinition::new("App", "Program", TypeAttributes::PUBLIC));
//! program.fields.add(Arc::new(FieldDefinition::new(
//!     "counter",
//!     FieldAttributes::STATIC,
//!     PrimitiveType::I8.into(),
//! )))?;
//! module.types.add(program)?;
//!
//! let loaded = ModuleLoader::default().load(MetadataWriter::default().write(&module)?)?;
//! let program = loaded.find_type("App", "Program").unwrap();
//! assert_eq!(program.fields.get(0).unwrap().name, "counter");
//! # Ok::<(), cilmeta::Error>(())
//! ```

/// Options for reading and writing metadata
pub mod config;
/// Custom attribute values and their blob format
pub mod customattributes;
/// Payloads decoded from a blob on first access
pub mod lazy;
/// Reading a member graph from a metadata image
pub mod loader;
/// Types, members and the collections owning them
pub mod members;
/// Heap access and state shared by the entities of one module
pub mod module;
/// Declarative security and permission set blobs
pub mod security;
/// Signature blobs
pub mod signatures;
/// Metadata heaps and the tables stream header
pub mod streams;
/// Metadata tables, their rows and coded indices
pub mod tables;
/// Metadata tokens
pub mod token;
/// References to types
pub mod typesystem;
/// Writing a member graph into a metadata image
pub mod writer;
