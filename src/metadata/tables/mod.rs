//! Implementation of the ECMA-335 metadata tables.
//!
//! Every table kind from `Module` (0x00) to `GenericParamConstraint` (0x2C) has a raw row type
//! (`<Table>Raw`) that knows its column layout and can be read from, and written to, a tables
//! stream. The shared infrastructure (identifiers, coded indices, index widths, row storage)
//! lives in [`types`], and [`TablesBuilder`] assembles complete `#~` streams.
//!
//! # Column encoding
//!
//! - Fixed columns are 1, 2 or 4 bytes.
//! - Heap indices are 2 bytes, or 4 bytes when the heap exceeds 65535 bytes.
//! - Simple table indices are 2 bytes, or 4 bytes when the target table exceeds 65535 rows.
//! - Coded indices are 2 bytes unless the largest candidate table needs more than
//!   `16 - tag_bits` bits for its row ids.
//!
//! # Reference
//! - [ECMA-335 Partition II, Section 22](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

mod builder;
pub mod types;

mod module;
mod typeref;
mod typedef;
mod fieldptr;
mod field;
mod methodptr;
mod methoddef;
mod paramptr;
mod param;
mod interfaceimpl;
mod memberref;
mod constant;
mod customattribute;
mod fieldmarshal;
mod declsecurity;
mod classlayout;
mod fieldlayout;
mod standalonesig;
mod eventmap;
mod eventptr;
mod event;
mod propertymap;
mod propertyptr;
mod property;
mod methodsemantics;
mod methodimpl;
mod moduleref;
mod typespec;
mod implmap;
mod fieldrva;
mod enclog;
mod encmap;
mod assembly;
mod assemblyprocessor;
mod assemblyos;
mod assemblyref;
mod assemblyrefprocessor;
mod assemblyrefos;
mod file;
mod exportedtype;
mod manifestresource;
mod nestedclass;
mod genericparam;
mod methodspec;
mod genericparamconstraint;

pub use builder::TablesBuilder;
pub use types::*;

pub use module::*;
pub use typeref::*;
pub use typedef::*;
pub use fieldptr::*;
pub use field::*;
pub use methodptr::*;
pub use methoddef::*;
pub use paramptr::*;
pub use param::*;
pub use interfaceimpl::*;
pub use memberref::*;
pub use constant::*;
pub use customattribute::*;
pub use fieldmarshal::*;
pub use declsecurity::*;
pub use classlayout::*;
pub use fieldlayout::*;
pub use standalonesig::*;
pub use eventmap::*;
pub use eventptr::*;
pub use event::*;
pub use propertymap::*;
pub use propertyptr::*;
pub use property::*;
pub use methodsemantics::*;
pub use methodimpl::*;
pub use moduleref::*;
pub use typespec::*;
pub use implmap::*;
pub use fieldrva::*;
pub use enclog::*;
pub use encmap::*;
pub use assembly::*;
pub use assemblyprocessor::*;
pub use assemblyos::*;
pub use assemblyref::*;
pub use assemblyrefprocessor::*;
pub use assemblyrefos::*;
pub use file::*;
pub use exportedtype::*;
pub use manifestresource::*;
pub use nestedclass::*;
pub use genericparam::*;
pub use methodspec::*;
pub use genericparamconstraint::*;
