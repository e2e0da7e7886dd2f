//! Building a member graph from a metadata image.
//!
//! [`ModuleLoader`] is the inverse of [`crate::metadata::writer::MetadataWriter`]: it reads the
//! tables of a [`MetadataImage`] and creates one definition per row, linked the way the rows
//! refer to each other.
//!
//! # Phases
//!
//! Loading runs in dependency order, each phase reading what the previous ones created:
//!
//! 1. **References**: assembly and module references, the names of every `TypeDef` and
//!    `TypeRef`, and the signature of every `MethodDef` and `MemberRef`. Signatures can name any
//!    type, so all names are known before the first signature is parsed.
//! 2. **Types**: one [`crate::metadata::members::TypeDefinition`] per row with its base type,
//!    interfaces and layout.
//! 3. **Members**: fields, methods with their parameters, properties and events, each added
//!    to the type whose list column covers it.
//! 4. **Generic parameters** and their constraints.
//! 5. **Nesting**: types are attached to their enclosing type or to the module.
//! 6. **Attributes**: custom attributes and security declarations, left undecoded.
//!
//! Errors in the structure of the tables fail the load. Blobs that are only decoded on access,
//! custom attribute values, permission sets and event accessors, fail when accessed instead, and
//! then only for the entity they belong to.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use cilmeta::metadata::{
//!     loader::ModuleLoader,
//!     members::{ModuleDefinition, TypeAttributes, TypeDefinition},
//!     writer::MetadataWriter,
//! };
//!
//! let module = ModuleDefinition::new("app.dll");
//! module.types.add(Arc::new(TypeDefinition::new("App", "Program", TypeAttributes::PUBLIC)))?;
//!
//! let image = MetadataWriter::default().write(&module)?;
//! let loaded = ModuleLoader::default().load(image)?;
//!
//! assert_eq!(loaded.name, "app.dll");
//! assert!(loaded.find_type("App", "Program").is_some());
//! # Ok::<(), cilmeta::Error>(())
//! ```

mod attributes;
mod data;
mod members;
mod types;

use std::sync::Arc;

use crate::{
    metadata::{
        config::MetadataConfig,
        loader::data::{narrow, LoaderData},
        members::{AssemblyDefinition, ModuleDefinition},
        module::{MetadataImage, MetadataReader, ModuleContext},
        streams::TablesHeader,
        tables::{AssemblyRaw, ModuleRaw},
        typesystem::AssemblyName,
    },
    Result,
};

/// Reads metadata images into [`ModuleDefinition`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleLoader {
    config: MetadataConfig,
}

impl ModuleLoader {
    /// Creates a loader; `config` bounds signature nesting and is handed to the loaded module
    #[must_use]
    pub fn new(config: MetadataConfig) -> Self {
        ModuleLoader { config }
    }

    /// Loads the module described by `image`.
    ///
    /// The heaps of `image` move into the context of the returned module, where lazily decoded
    /// blobs are read from.
    ///
    /// # Errors
    /// Returns an error if the tables stream is malformed, a required row is missing, a row
    /// refers to a row that does not exist, or a signature cannot be parsed.
    pub fn load(&self, image: MetadataImage) -> Result<ModuleDefinition> {
        let MetadataImage { tables, heaps } = image;
        let heaps = Arc::new(heaps);
        let context = Arc::new(ModuleContext::new(heaps.clone(), self.config));

        let header = TablesHeader::from(&tables)?;
        let data = LoaderData::new(header, heaps, context)?;

        let module = load_module(&data)?;
        types::load_types(&data)?;
        members::load_fields(&data)?;
        members::load_methods(&data)?;
        members::load_properties(&data)?;
        members::load_events(&data)?;
        types::load_generic_parameters(&data)?;
        types::attach_types(&data, &module)?;

        let enums = attributes::enum_lookup(&data);
        attributes::load_custom_attributes(&data, &module, &enums)?;
        attributes::load_security_declarations(&data, &module)?;

        log::debug!(
            "Loaded module {}: {} types, {} methods, {} fields",
            module.name,
            data.types.len(),
            data.methods.len(),
            data.fields.len()
        );
        Ok(module)
    }
}

fn load_module(data: &LoaderData) -> Result<ModuleDefinition> {
    let Some(row) = data.rows::<ModuleRaw>().into_iter().next() else {
        return Err(malformed_error!("Image has no Module row"));
    };

    let mut module = ModuleDefinition::with_context(&data.string(row.name)?, data.context.clone());
    module.mvid = data.heaps.guid(row.mvid)?;
    module.generation = narrow(row.generation)?;
    module.assembly_references = data.assembly_refs.clone();
    module.module_references = data.module_refs.clone();

    if let Some(row) = data.rows::<AssemblyRaw>().into_iter().next() {
        let mut assembly = AssemblyDefinition::new(AssemblyName {
            name: data.string(row.name)?,
            major_version: narrow(row.major_version)?,
            minor_version: narrow(row.minor_version)?,
            build_number: narrow(row.build_number)?,
            revision_number: narrow(row.revision_number)?,
            culture: data.string(row.culture)?,
            flags: row.flags,
            public_key_or_token: data.heaps.blob(row.public_key)?.to_vec(),
        });
        assembly.hash_algorithm = row.hash_alg_id;
        module.assembly = Some(assembly);
    }

    Ok(module)
}
