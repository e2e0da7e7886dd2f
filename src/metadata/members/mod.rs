//! The in-memory member graph: module, types and their members.
//!
//! This is what [`crate::metadata::writer::MetadataWriter`] turns into tables and
//! [`crate::metadata::loader::ModuleLoader`] builds back from them. Members are shared as
//! `Arc`s; their collections are [`OwnedList`]s, which keep the back-reference from each
//! element to the one collection that holds it.
//!
//! Scalar properties are plain public fields, set before the member is added to its parent.
//! Custom attributes and security declarations are append-only lists that can be extended at
//! any time.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use cilmeta::metadata::members::{
//!     FieldAttributes, FieldDefinition, ModuleDefinition, TypeAttributes, TypeDefinition,
//! };
//! use cilmeta::metadata::typesystem::{AssemblyName, PrimitiveType, ResolutionScope, TypeReference};
//!
//! let module = ModuleDefinition::new("app.dll");
//! let object = TypeReference::class(
//!     "System",
//!     "Object",
//!     ResolutionScope::AssemblyRef(AssemblyName::new("mscorlib")),
//! );
//!
//! let widget = Arc::new(TypeDefinition::with_base("App", "Widget", TypeAttributes::PUBLIC, object));
//! widget.fields.add(Arc::new(FieldDefinition::new(
//!     "size",
//!     FieldAttributes::PRIVATE,
//!     PrimitiveType::I4.into(),
//! )))?;
//! module.types.add(widget.clone())?;
//!
//! // A member belongs to one collection at a time
//! assert!(ModuleDefinition::new("other.dll").types.add(widget).is_err());
//! # Ok::<(), cilmeta::Error>(())
//! ```

mod event;
mod field;
mod flags;
mod generic;
mod method;
mod module;
mod owned;
mod property;
mod reference;
mod typedef;

pub use event::{EventAccessors, EventDefinition, EventRc};
pub use field::{ConstantValue, FieldDefinition, FieldRc};
pub use flags::*;
pub use generic::{GenericParameter, GenericParameterRc};
pub use method::{MethodDefinition, MethodRc, PInvokeInfo, ParameterDefinition, ParameterRc};
pub use module::{AssemblyDefinition, ModuleDefinition};
pub use owned::{Owned, OwnedList, OwnerSlot, TokenCell};
pub use property::{PropertyDefinition, PropertyRc};
pub use reference::MethodReference;
pub use typedef::{TypeDefinition, TypeLayout, TypeRc};
