use std::sync::Arc;

use uguid::Guid;

use crate::metadata::{
    customattributes::CustomAttributeList,
    members::{OwnedList, TypeDefinition, TypeRc},
    module::ModuleContext,
    security::SecurityDeclarationList,
    typesystem::AssemblyName,
};

/// The `Assembly` row of a module that is an assembly manifest
pub struct AssemblyDefinition {
    /// Name, version, culture, flags and public key
    pub name: AssemblyName,
    /// `AssemblyHashAlgorithm`, `0x8004` (SHA1) by default
    pub hash_algorithm: u32,
    /// Custom attributes applied to the assembly
    pub custom_attributes: CustomAttributeList,
    /// Security declarations of the assembly
    pub security_declarations: SecurityDeclarationList,
}

impl AssemblyDefinition {
    /// Creates the manifest of assembly `name`
    #[must_use]
    pub fn new(name: AssemblyName) -> Self {
        AssemblyDefinition {
            name,
            hash_algorithm: 0x8004,
            custom_attributes: CustomAttributeList::new(),
            security_declarations: SecurityDeclarationList::new(),
        }
    }
}

impl std::fmt::Debug for AssemblyDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssemblyDefinition")
            .field("name", &self.name)
            .field("hash_algorithm", &self.hash_algorithm)
            .finish_non_exhaustive()
    }
}

/// A module: the root of the member graph.
///
/// Types listed in [`ModuleDefinition::types`] are the top-level types; nested types hang off
/// their enclosing type.
pub struct ModuleDefinition {
    /// Module name, usually the file name
    pub name: String,
    /// Module version id
    pub mvid: Guid,
    /// Edit-and-continue generation, 0 for compiler output
    pub generation: u16,
    /// The assembly manifest, for the main module of an assembly
    pub assembly: Option<AssemblyDefinition>,
    /// Top-level types, in definition order
    pub types: OwnedList<TypeDefinition>,
    /// Referenced assemblies; the writer appends any further assemblies the member graph mentions
    pub assembly_references: Vec<AssemblyName>,
    /// Referenced modules; the writer appends any further modules the member graph mentions
    pub module_references: Vec<String>,
    /// Custom attributes applied to the module
    pub custom_attributes: CustomAttributeList,
    context: Arc<ModuleContext>,
}

impl ModuleDefinition {
    /// Creates an empty module that is not backed by an image
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self::with_context(name, Arc::new(ModuleContext::detached()))
    }

    /// Creates an empty module whose lazy members resolve through `context`
    #[must_use]
    pub fn with_context(name: &str, context: Arc<ModuleContext>) -> Self {
        ModuleDefinition {
            name: name.to_string(),
            mvid: Guid::ZERO,
            generation: 0,
            assembly: None,
            types: OwnedList::new(format!("types of {name}")),
            assembly_references: Vec::new(),
            module_references: Vec::new(),
            custom_attributes: CustomAttributeList::new(),
            context,
        }
    }

    /// The lock and heap access shared by the lazy members of this module
    #[must_use]
    pub fn context(&self) -> &Arc<ModuleContext> {
        &self.context
    }

    /// Every type of the module, each enclosing type before the types nested in it
    pub fn all_types(&self) -> Vec<TypeRc> {
        fn visit(current: &TypeRc, out: &mut Vec<TypeRc>) {
            out.push(current.clone());
            for nested in current.nested_types.to_vec() {
                visit(&nested, out);
            }
        }

        let mut out = Vec::new();
        for current in self.types.to_vec() {
            visit(&current, &mut out);
        }
        out
    }

    /// Finds a top-level type by namespace and name
    pub fn find_type(&self, namespace: &str, name: &str) -> Option<TypeRc> {
        self.types
            .find(|candidate| candidate.namespace == namespace && candidate.name == name)
    }
}

impl std::fmt::Debug for ModuleDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleDefinition")
            .field("name", &self.name)
            .field("mvid", &self.mvid)
            .field("assembly", &self.assembly)
            .field("types", &self.types.len())
            .finish_non_exhaustive()
    }
}
