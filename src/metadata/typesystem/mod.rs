//! Type references as they appear in .NET metadata.
//!
//! Every type used by a signature, a member declaration or a custom attribute is described by a
//! [`TypeReference`]. It is a closed set of variants: three of them name a type directly
//! ([`PrimitiveType`], [`NamedType`] and generic parameters), all others wrap exactly one element
//! and add a construction step such as an array rank, a pointer or a custom modifier.
//!
//! # Key Components
//!
//! - [`TypeReference`]: The variant model, with canonical names and structural identity
//! - [`NamedType`] / [`ResolutionScope`]: Classes and value types, and where they are defined
//! - [`PrimitiveType`]: Built-in types with their own element type byte
//! - [`ELEMENT_TYPE`]: The element type bytes used in signature blobs
//!
//! # Examples
//!
//! ```rust
//! use cilmeta::metadata::typesystem::{AssemblyName, ResolutionScope, TypeReference};
//!
//! let corlib = ResolutionScope::AssemblyRef(AssemblyName::new("mscorlib"));
//! let list = TypeReference::class("System.Collections.Generic", "List`1", corlib.clone());
//! let string = TypeReference::class("System", "String", corlib);
//!
//! let strings = TypeReference::generic_instance(list, vec![string]);
//! assert_eq!(strings.full_name(), "System.Collections.Generic.List`1<System.String>");
//! assert_eq!(strings.name(), "List`1");
//! ```

mod base;
mod primitives;
mod reference;

pub use base::{
    ArrayDimensions, AssemblyName, GenericParameterKind, GenericParameterRef, NamedType,
    ResolutionScope, ELEMENT_TYPE,
};
pub use primitives::PrimitiveType;
pub use reference::TypeReference;
