// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]

//! # cilmeta
//!
//! Reading and writing the ECMA-335 metadata embedded in .NET assemblies: the tables stream,
//! the `#Strings`, `#Blob` and `#GUID` heaps, signature and attribute blobs, and an in-memory
//! member graph that maps onto them.
//!
//! Locating the metadata inside a PE image, strong-name signing and the CIL instruction stream
//! are left to the surrounding tools; `cilmeta` starts at the stream bytes and ends there.
//!
//! ## Features
//!
//! - **Every table** - Row types for all tables from `Module` (0x00) to
//!   `GenericParamConstraint` (0x2C), read and written with the index widths ECMA-335 derives
//!   from table and heap sizes
//! - **Coded indices** - Encoding and decoding for all thirteen categories, failing on tables
//!   outside the category instead of truncating
//! - **Type references** - Arrays, pointers, by-refs, modifiers, generic instances and function
//!   pointers with canonical names and value-type rules
//! - **Lazy blobs** - Custom attributes, security declarations and event accessors decode on
//!   first access, under one lock per module, and a broken blob only empties the entity it
//!   belongs to
//! - **Round trips** - [`metadata::writer::MetadataWriter`] and
//!   [`metadata::loader::ModuleLoader`] convert between the member graph and the tables
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use cilmeta::prelude::*;
//!
//! let module = ModuleDefinition::new("app.dll");
//! let object = TypeReference::class(
//!     "System",
//!     "Object",
//!     ResolutionScope::AssemblyRef(AssemblyName::new("mscorlib")),
//! );
//! module.types.add(Arc::new(TypeDefinition::with_base(
//!     "App",
//!     "Program",
//!     TypeAttributes::PUBLIC,
//!     object,
//! )))?;
//!
//! let image = MetadataWriter::default().write(&module)?;
//! let loaded = ModuleLoader::default().load(image)?;
//! let program = loaded.find_type("App", "Program").unwrap();
//! assert_eq!(program.base_type.as_ref().unwrap().full_name(), "System.Object");
//! # Ok::<(), cilmeta::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Re-exports of the commonly used types
//! - [`metadata`] - Tables, heaps, signatures, the member graph and the write and read passes
//! - [`Error`] and [`Result`] - Error handling for every fallible operation
//!
//! ## Standards Compliance
//!
//! `cilmeta` follows the **ECMA-335 specification** (6th edition), Partition II, for the
//! physical layout of metadata.
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)
#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use cilmeta::prelude::*;
///
/// let token = Token::from_parts(TableId::TypeDef, 2);
/// assert_eq!(token.value(), 0x0200_0002);
/// ```
pub mod prelude;

/// Definitions, reading and writing of CIL metadata based on ECMA-335
///
/// # Key Components
///
/// - [`metadata::tables`] - Row types, row storage and coded indices
/// - [`metadata::streams`] - Heaps and the tables stream header
/// - [`metadata::typesystem`] - Type references
/// - [`metadata::members`] - The member graph
/// - [`metadata::writer`] and [`metadata::loader`] - Conversion between graph and tables
pub mod metadata;

/// `cilmeta` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `cilmeta` Error type
///
/// # Examples
///
/// ```rust
/// use cilmeta::{metadata::tables::{CodedIndexType, TableId}, Error};
///
/// match CodedIndexType::HasConstant.encode(TableId::MethodDef, 1) {
///     Err(Error::InvalidReference { table, .. }) => assert_eq!(table, TableId::MethodDef),
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
pub use error::Error;

/// Cursor over a byte slice, used by every blob decoder
pub use file::parser::Parser;
