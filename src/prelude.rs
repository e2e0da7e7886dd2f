//! # cilmeta Prelude
//!
//! Re-exports of the types most code working with `cilmeta` needs: the member graph, type
//! references, the write and read passes, and the table level building blocks.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cilmeta operations
pub use crate::Error;

/// The result type used throughout cilmeta
pub use crate::Result;

/// Options for reading and writing metadata
pub use crate::metadata::config::MetadataConfig;

// ================================================================================================
// Reading and Writing
// ================================================================================================

/// Lowers a member graph into tables and heaps
pub use crate::metadata::writer::MetadataWriter;

/// Builds a member graph from tables and heaps
pub use crate::metadata::loader::ModuleLoader;

/// Image parts, heap access and the per-module lock
pub use crate::metadata::module::{HeapsView, MetadataImage, MetadataReader, ModuleContext};

// ================================================================================================
// Member Graph
// ================================================================================================

pub use crate::metadata::members::{
    AssemblyDefinition, ConstantValue, EventAccessors, EventAttributes, EventDefinition,
    FieldAttributes, FieldDefinition, GenericParamAttributes, GenericParameter, MethodAttributes,
    MethodDefinition, MethodImplAttributes, MethodReference, MethodSemanticsAttributes,
    ModuleDefinition, ParamAttributes, ParameterDefinition, PropertyAttributes,
    PropertyDefinition, TypeAttributes, TypeDefinition,
};

/// Custom attributes
pub use crate::metadata::customattributes::{
    CustomAttribute, CustomAttributeArgument, CustomAttributeNamedArgument, CustomAttributeValue,
};

/// Declarative security
pub use crate::metadata::security::{SecurityAction, SecurityAttribute, SecurityDeclaration};

// ================================================================================================
// Type System and Signatures
// ================================================================================================

pub use crate::metadata::typesystem::{
    AssemblyName, GenericParameterRef, NamedType, PrimitiveType, ResolutionScope, TypeReference,
};

pub use crate::metadata::signatures::{
    FieldSignature, MethodSignature, PropertySignature, SignatureParser, TypeResolver,
};

// ================================================================================================
// Tables and Heaps
// ================================================================================================

/// Metadata tokens
pub use crate::metadata::token::Token;

pub use crate::metadata::tables::{
    CodedIndex, CodedIndexType, RowTable, SingleRowTable, SortedRowTable, TableId, TablesBuilder,
};

pub use crate::metadata::streams::{Blob, Guid, HeapWriter, Strings, TablesHeader};
