//! Custom attributes: blob codec and the lazily decoded attribute entity.
//!
//! Custom attributes encode metadata annotations in a compact binary format:
//! - **Prolog** - The 0x0001 marker
//! - **Fixed Arguments** - Constructor argument values, in parameter order
//! - **Named Arguments** - Field and property assignments with name, type and value
//!
//! A [`CustomAttribute`] read from an image holds only its constructor and the location of its
//! blob. The blob is decoded on the first call to any accessor that needs the arguments, under
//! the lock of the owning module (see [`crate::metadata::lazy`]). A blob that fails to decode
//! leaves the attribute unresolved and its argument lists empty.
//!
//! # Examples
//!
//! ```rust
//! use cilmeta::metadata::customattributes::{CustomAttribute, CustomAttributeArgument};
//! use cilmeta::metadata::lazy::BlobSource;
//! use cilmeta::metadata::members::MethodReference;
//! use cilmeta::metadata::module::ModuleContext;
//! use cilmeta::metadata::signatures::MethodSignature;
//! use cilmeta::metadata::typesystem::{AssemblyName, PrimitiveType, ResolutionScope, TypeReference};
//! use std::sync::Arc;
//!
//! let corlib = ResolutionScope::AssemblyRef(AssemblyName::new("mscorlib"));
//! let constructor = MethodReference::new(
//!     TypeReference::class("System", "ObsoleteAttribute", corlib),
//!     ".ctor",
//!     MethodSignature::new(PrimitiveType::Void.into(), vec![PrimitiveType::String.into()])
//!         .instance(),
//! );
//!
//! let blob = [0x01, 0x00, 0x03, b'o', b'l', b'd', 0x00, 0x00];
//! let attribute = CustomAttribute::from_blob(
//!     Arc::new(ModuleContext::detached()),
//!     constructor,
//!     BlobSource::raw(&blob),
//!     None,
//! );
//!
//! assert!(!attribute.is_resolved());
//! assert_eq!(
//!     attribute.constructor_arguments(),
//!     vec![CustomAttributeArgument::String(Some("old".to_string()))]
//! );
//! assert!(attribute.is_resolved());
//! ```
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Section 23.3 - Custom Attributes

mod encoder;
mod parser;
mod types;

pub use encoder::encode_custom_attribute_value;
pub(crate) use encoder::{write_length_prefixed, write_named_argument};
pub use parser::{
    parse_custom_attribute_blob, parse_serialized_type_name, serialized_type_name,
    CustomAttributeParser, EnumLookup,
};
pub use types::*;

use std::sync::Arc;

use crate::{
    metadata::{
        lazy::{BlobDecoder, BlobSource, LazyBlob},
        members::MethodReference,
        module::ModuleContext,
        typesystem::{NamedType, PrimitiveType, TypeReference},
    },
    Result,
};

/// A reference-counted pointer to a `CustomAttribute`
pub type CustomAttributeRc = Arc<CustomAttribute>;
/// Append-only list of the custom attributes of one entity
pub type CustomAttributeList = boxcar::Vec<CustomAttributeRc>;

/// Resolves the underlying type of the enums a module defines, shared by every attribute decoder
pub type SharedEnumLookup = Arc<dyn Fn(&NamedType) -> Option<PrimitiveType> + Send + Sync>;

/// A custom attribute attached to a metadata entity.
pub struct CustomAttribute {
    constructor: MethodReference,
    value: LazyBlob<CustomAttributeValue>,
}

impl CustomAttribute {
    /// An attribute built in memory; it is resolved from the start and has no blob
    #[must_use]
    pub fn new(constructor: MethodReference, value: CustomAttributeValue) -> Self {
        CustomAttribute {
            constructor,
            value: LazyBlob::resolved(value),
        }
    }

    /// An attribute whose arguments are decoded from `source` on first access.
    ///
    /// The fixed arguments are read as the constructor's parameter types, with `enums`
    /// supplying the underlying types of enums defined in the module.
    #[must_use]
    pub fn from_blob(
        context: Arc<ModuleContext>,
        constructor: MethodReference,
        source: BlobSource,
        enums: Option<SharedEnumLookup>,
    ) -> Self {
        let params = constructor.signature.parameters.clone();
        let decoder = move |blob: &[u8]| -> Result<CustomAttributeValue> {
            let mut parser = match &enums {
                Some(enums) => CustomAttributeParser::with_enum_lookup(blob, &**enums),
                None => CustomAttributeParser::new(blob),
            };
            parser.parse_custom_attribute(&params)
        };

        Self::with_decoder(context, constructor, source, Arc::new(decoder))
    }

    /// An attribute decoded from `source` by a custom decoder
    #[must_use]
    pub fn with_decoder(
        context: Arc<ModuleContext>,
        constructor: MethodReference,
        source: BlobSource,
        decoder: Arc<dyn BlobDecoder<CustomAttributeValue>>,
    ) -> Self {
        CustomAttribute {
            constructor,
            value: LazyBlob::new(context, source, "custom attribute", decoder),
        }
    }

    /// The attribute constructor
    #[must_use]
    pub fn constructor(&self) -> &MethodReference {
        &self.constructor
    }

    /// The attribute type, the type declaring the constructor
    #[must_use]
    pub fn attribute_type(&self) -> &TypeReference {
        &self.constructor.declaring_type
    }

    /// The decoded payload, empty if the blob cannot be decoded
    pub fn value(&self) -> Arc<CustomAttributeValue> {
        self.value.get()
    }

    /// Constructor arguments, in parameter order
    pub fn constructor_arguments(&self) -> Vec<CustomAttributeArgument> {
        self.value().fixed_args.clone()
    }

    /// Field assignments
    pub fn fields(&self) -> Vec<CustomAttributeNamedArgument> {
        self.value().fields().cloned().collect()
    }

    /// Property assignments
    pub fn properties(&self) -> Vec<CustomAttributeNamedArgument> {
        self.value().properties().cloned().collect()
    }

    /// Returns true if the attribute passes arguments to its constructor
    pub fn has_constructor_arguments(&self) -> bool {
        !self.value().fixed_args.is_empty()
    }

    /// Returns true if the attribute assigns fields
    pub fn has_fields(&self) -> bool {
        self.value().fields().next().is_some()
    }

    /// Returns true if the attribute assigns properties
    pub fn has_properties(&self) -> bool {
        self.value().properties().next().is_some()
    }

    /// Returns true once the blob has been decoded, or if there never was one
    pub fn is_resolved(&self) -> bool {
        self.value.is_resolved()
    }

    /// Where the undecoded blob comes from
    pub fn blob_source(&self) -> &BlobSource {
        self.value.source()
    }

    /// The undecoded blob
    ///
    /// # Errors
    /// Returns [`crate::Error::NotSupported`] for attributes built in memory.
    pub fn get_blob(&self) -> Result<Vec<u8>> {
        self.value.blob()
    }

    /// The blob to store for this attribute: the original bytes when there are any, otherwise
    /// the encoded in-memory value
    ///
    /// # Errors
    /// Returns an error if the in-memory value does not match the constructor.
    pub fn to_blob(&self) -> Result<Vec<u8>> {
        if self.value.source().is_backed() {
            return self.get_blob();
        }

        encode_custom_attribute_value(&self.value(), &self.constructor.signature.parameters)
    }
}

impl std::fmt::Debug for CustomAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomAttribute")
            .field("constructor", &self.constructor)
            .field("value", &self.value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{
        metadata::signatures::MethodSignature,
        test::{attribute_constructor, TestTypes},
        Error,
    };

    #[test]
    fn in_memory_attribute() {
        let constructor = attribute_constructor(vec![PrimitiveType::I4.into()]);
        let attribute = CustomAttribute::new(
            constructor,
            CustomAttributeValue {
                fixed_args: vec![CustomAttributeArgument::I4(7)],
                named_args: vec![CustomAttributeNamedArgument {
                    is_field: false,
                    name: "Level".to_string(),
                    arg_type: PrimitiveType::I4.into(),
                    value: CustomAttributeArgument::I4(2),
                }],
            },
        );

        assert!(attribute.is_resolved());
        assert!(attribute.has_constructor_arguments());
        assert!(attribute.has_properties());
        assert!(!attribute.has_fields());
        assert_eq!(attribute.properties()[0].name, "Level");
        assert!(matches!(attribute.get_blob(), Err(Error::NotSupported(_))));
        assert_eq!(
            attribute.to_blob().unwrap(),
            [
                0x01, 0x00, 0x07, 0x00, 0x00, 0x00, 0x01, 0x00, 0x54, 0x08, 0x05, b'L', b'e',
                b'v', b'e', b'l', 0x02, 0x00, 0x00, 0x00
            ]
        );
    }

    #[test]
    fn resolves_on_first_access() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let decoder = move |blob: &[u8]| -> Result<CustomAttributeValue> {
            counter.fetch_add(1, Ordering::SeqCst);
            parse_custom_attribute_blob(blob, &[PrimitiveType::Boolean.into()])
        };

        let attribute = CustomAttribute::with_decoder(
            Arc::new(ModuleContext::detached()),
            attribute_constructor(vec![PrimitiveType::Boolean.into()]),
            BlobSource::raw(&[0x01, 0x00, 0x01, 0x01, 0x00, 0x53, 0x02, 0x01, b'X', 0x00]),
            Arc::new(decoder),
        );

        assert!(!attribute.is_resolved());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(attribute.has_constructor_arguments());
        assert!(attribute.has_fields());
        assert_eq!(attribute.fields()[0].name, "X");
        assert_eq!(attribute.constructor_arguments(), vec![CustomAttributeArgument::Bool(true)]);
        assert!(attribute.is_resolved());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn truncated_blob_is_contained() {
        let attribute = CustomAttribute::from_blob(
            Arc::new(ModuleContext::detached()),
            attribute_constructor(vec![PrimitiveType::String.into()]),
            BlobSource::raw(&[0x01, 0x00, 0x10, b'a']),
            None,
        );

        assert!(!attribute.has_constructor_arguments());
        assert!(attribute.constructor_arguments().is_empty());
        assert!(!attribute.is_resolved());
        assert_eq!(attribute.get_blob().unwrap(), vec![0x01, 0x00, 0x10, b'a']);
        assert_eq!(attribute.to_blob().unwrap(), vec![0x01, 0x00, 0x10, b'a']);
    }

    #[test]
    fn enum_lookup_from_module() {
        let types = TestTypes::new();
        let lookup: SharedEnumLookup =
            Arc::new(|named: &NamedType| (named.name == "Color").then_some(PrimitiveType::I2));

        let attribute = CustomAttribute::from_blob(
            Arc::new(ModuleContext::detached()),
            MethodReference::new(
                types.attribute(),
                ".ctor",
                MethodSignature::new(PrimitiveType::Void.into(), vec![types.color()]).instance(),
            ),
            BlobSource::raw(&[0x01, 0x00, 0x05, 0x00, 0x00, 0x00]),
            Some(lookup),
        );

        assert_eq!(
            attribute.constructor_arguments(),
            vec![CustomAttributeArgument::Enum(
                "App.Color".to_string(),
                Box::new(CustomAttributeArgument::I2(5))
            )]
        );
        assert_eq!(attribute.attribute_type().full_name(), "System.Attribute");
    }
}
