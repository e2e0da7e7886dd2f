//! .NET Code Access Security declarations.
//!
//! A `DeclSecurity` row attaches a permission set to a type, a method or the assembly, together
//! with the [`SecurityAction`] that says how the runtime enforces it. The permission set blob
//! comes in two encodings:
//!
//! - **Binary** (.NET 2.0 and later) - a `.` marker, the number of security attributes, and for
//!   each one its assembly-qualified type name and its named arguments, laid out like the named
//!   arguments of a custom attribute.
//! - **XML** (.NET 1.x) - a UTF-16LE `PermissionSet` document with one `IPermission` element per
//!   permission.
//!
//! Both decode into the same list of [`SecurityAttribute`]s. A [`SecurityDeclaration`] read from
//! an image decodes its blob on first access, under the lock of the owning module, and yields an
//! empty list if the blob is malformed. Declarations built in memory are always written in the
//! binary encoding.
//!
//! Code Access Security is not enforced by .NET Core and later; these declarations are mostly
//! found in .NET Framework assemblies.
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Section 22.11 - DeclSecurity Table
//! - ECMA-335 6th Edition, Partition II, Section 23.1.3 - Security Actions

mod encoder;
mod parser;
mod types;

pub use encoder::encode_permission_set;
pub use parser::{parse_binary_permission_set, parse_permission_set, parse_xml_permission_set};
pub use types::*;

use std::sync::Arc;

use crate::{
    metadata::{
        lazy::{BlobDecoder, BlobSource, LazyBlob},
        module::ModuleContext,
    },
    Result,
};

/// A reference-counted pointer to a `SecurityDeclaration`
pub type SecurityDeclarationRc = Arc<SecurityDeclaration>;
/// Append-only list of the security declarations of one entity
pub type SecurityDeclarationList = boxcar::Vec<SecurityDeclarationRc>;

/// A permission set attached to a type, method or assembly
pub struct SecurityDeclaration {
    action: SecurityAction,
    attributes: LazyBlob<Vec<SecurityAttribute>>,
}

impl SecurityDeclaration {
    /// A declaration built in memory
    #[must_use]
    pub fn new(action: SecurityAction, attributes: Vec<SecurityAttribute>) -> Self {
        SecurityDeclaration {
            action,
            attributes: LazyBlob::resolved(attributes),
        }
    }

    /// A declaration whose permission set is decoded from `source` on first access
    #[must_use]
    pub fn from_blob(context: Arc<ModuleContext>, action: SecurityAction, source: BlobSource) -> Self {
        Self::with_decoder(context, action, source, Arc::new(parse_permission_set))
    }

    /// A declaration decoded from `source` by a custom decoder
    #[must_use]
    pub fn with_decoder(
        context: Arc<ModuleContext>,
        action: SecurityAction,
        source: BlobSource,
        decoder: Arc<dyn BlobDecoder<Vec<SecurityAttribute>>>,
    ) -> Self {
        SecurityDeclaration {
            action,
            attributes: LazyBlob::new(context, source, "security declaration", decoder),
        }
    }

    /// How the permission set is enforced
    #[must_use]
    pub fn action(&self) -> SecurityAction {
        self.action
    }

    /// The permissions of this declaration, empty if the blob cannot be decoded
    pub fn security_attributes(&self) -> Arc<Vec<SecurityAttribute>> {
        self.attributes.get()
    }

    /// Returns true if the declaration holds at least one permission
    pub fn has_security_attributes(&self) -> bool {
        !self.security_attributes().is_empty()
    }

    /// Returns true once the blob has been decoded, or if there never was one
    pub fn is_resolved(&self) -> bool {
        self.attributes.is_resolved()
    }

    /// Where the undecoded blob comes from
    pub fn blob_source(&self) -> &BlobSource {
        self.attributes.source()
    }

    /// The undecoded permission set blob
    ///
    /// # Errors
    /// Returns [`crate::Error::NotSupported`] for declarations built in memory.
    pub fn get_blob(&self) -> Result<Vec<u8>> {
        self.attributes.blob()
    }

    /// The blob to store for this declaration: the original bytes when there are any,
    /// otherwise the binary encoding of the in-memory permissions
    ///
    /// # Errors
    /// Returns an error if a named argument cannot be encoded.
    pub fn to_blob(&self) -> Result<Vec<u8>> {
        if self.attributes.source().is_backed() {
            return self.get_blob();
        }

        encode_permission_set(&self.security_attributes())
    }
}

impl std::fmt::Debug for SecurityDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityDeclaration")
            .field("action", &self.action)
            .field("attributes", &self.attributes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            customattributes::{CustomAttributeArgument, CustomAttributeNamedArgument},
            typesystem::PrimitiveType,
        },
        Error,
    };

    #[test]
    fn in_memory_declaration() {
        let mut permission = SecurityAttribute::new(security_classes::SECURITY_PERMISSION_ATTRIBUTE);
        permission.named_args.push(CustomAttributeNamedArgument {
            is_field: false,
            name: "SkipVerification".to_string(),
            arg_type: PrimitiveType::Boolean.into(),
            value: CustomAttributeArgument::Bool(true),
        });

        let declaration = SecurityDeclaration::new(SecurityAction::RequestMinimum, vec![permission]);
        assert!(declaration.is_resolved());
        assert!(declaration.has_security_attributes());
        assert_eq!(declaration.action(), SecurityAction::RequestMinimum);
        assert!(matches!(declaration.get_blob(), Err(Error::NotSupported(_))));

        let blob = declaration.to_blob().unwrap();
        assert_eq!(blob[0], b'.');
        assert_eq!(
            parse_permission_set(&blob).unwrap(),
            *declaration.security_attributes()
        );
    }

    #[test]
    fn lazy_declaration() {
        let declaration = SecurityDeclaration::from_blob(
            Arc::new(ModuleContext::detached()),
            SecurityAction::Demand,
            BlobSource::raw(&[b'.', 0x01, 0x01, b'A', 0x01, 0x00]),
        );

        assert!(!declaration.is_resolved());
        assert_eq!(declaration.security_attributes()[0].type_name, "A");
        assert!(declaration.is_resolved());
        assert_eq!(declaration.to_blob().unwrap(), [b'.', 0x01, 0x01, b'A', 0x01, 0x00]);
    }

    #[test]
    fn malformed_declaration() {
        let declaration = SecurityDeclaration::from_blob(
            Arc::new(ModuleContext::detached()),
            SecurityAction::Demand,
            BlobSource::raw(&[b'.', 0x02, 0x01]),
        );

        assert!(!declaration.has_security_attributes());
        assert!(!declaration.is_resolved());
        assert_eq!(declaration.get_blob().unwrap(), [b'.', 0x02, 0x01]);
    }
}
