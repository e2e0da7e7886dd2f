//! Lazy resolution of custom attributes, security declarations and event accessors: decode
//! once, contain malformed blobs, and stay consistent when first touched from many threads.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use cilmeta::{metadata::lazy::BlobSource, prelude::*};

fn corlib() -> AssemblyName {
    AssemblyName {
        major_version: 4,
        ..AssemblyName::new("mscorlib")
    }
}

fn corlib_type(name: &str) -> TypeReference {
    TypeReference::class("System", name, ResolutionScope::AssemblyRef(corlib()))
}

fn constructor_of(attribute: &str, parameters: Vec<TypeReference>) -> MethodReference {
    MethodReference::new(
        corlib_type(attribute),
        ".ctor",
        MethodSignature::new(PrimitiveType::Void.into(), parameters).instance(),
    )
}

fn raw_attribute(attribute: &str, parameter: PrimitiveType, blob: &[u8]) -> Arc<CustomAttribute> {
    Arc::new(CustomAttribute::from_blob(
        Arc::new(ModuleContext::detached()),
        constructor_of(attribute, vec![parameter.into()]),
        BlobSource::raw(blob),
        None,
    ))
}

fn accessor(name: &str) -> Arc<MethodDefinition> {
    Arc::new(MethodDefinition::new(
        name,
        MethodAttributes::PUBLIC | MethodAttributes::SPECIAL_NAME,
        MethodSignature::new(PrimitiveType::Void.into(), vec![corlib_type("EventHandler")])
            .instance(),
    ))
}

/// `App.Holder` carries a zero length blob, a blob cut inside its argument and a valid blob;
/// `App.Source` declares the `Changed` event.
fn build_module() -> Result<ModuleDefinition> {
    let mut module = ModuleDefinition::new("lazy.dll");
    module.assembly_references.push(corlib());

    let holder = TypeDefinition::with_base("App", "Holder", TypeAttributes::PUBLIC, corlib_type("Object"));
    holder.custom_attributes.push(raw_attribute("ObsoleteAttribute", PrimitiveType::String, &[]));
    holder.custom_attributes.push(raw_attribute(
        "CLSCompliantAttribute",
        PrimitiveType::I4,
        &[0x01, 0x00, 0x2A],
    ));
    holder.custom_attributes.push(raw_attribute(
        "ObsoleteAttribute",
        PrimitiveType::String,
        &[0x01, 0x00, 0x02, b'n', b'o', 0x00, 0x00],
    ));
    holder.security_declarations.push(Arc::new(SecurityDeclaration::from_blob(
        Arc::new(ModuleContext::detached()),
        SecurityAction::Demand,
        BlobSource::raw(&[0x2E, 0x05]),
    )));
    module.types.add(Arc::new(holder))?;

    let source = TypeDefinition::with_base("App", "Source", TypeAttributes::PUBLIC, corlib_type("Object"));
    let add = accessor("add_Changed");
    let remove = accessor("remove_Changed");
    source.methods.add(add.clone())?;
    source.methods.add(remove.clone())?;
    source.events.add(Arc::new(EventDefinition::new(
        "Changed",
        EventAttributes::empty(),
        corlib_type("EventHandler"),
        EventAccessors {
            add: Some(add),
            remove: Some(remove),
            ..EventAccessors::default()
        },
    )))?;
    module.types.add(Arc::new(source))?;

    Ok(module)
}

fn load() -> Result<ModuleDefinition> {
    let image = MetadataWriter::default().write(&build_module()?)?;
    ModuleLoader::default().load(image)
}

/// A constructor blob truncated to zero bytes reads back as an attribute without arguments
#[test]
fn truncated_constructor_blob_has_no_arguments() -> Result<()> {
    let module = load()?;
    let holder = module.find_type("App", "Holder").unwrap();
    assert_eq!(holder.custom_attributes.count(), 3);

    let empty = holder.custom_attributes.get(0).unwrap().clone();
    assert_eq!(empty.attribute_type().full_name(), "System.ObsoleteAttribute");
    assert!(!empty.is_resolved());
    assert!(!empty.has_constructor_arguments());
    assert!(!empty.has_properties());
    assert!(!empty.is_resolved());

    // a second access sees the same empty payload
    assert!(empty.constructor_arguments().is_empty());
    assert!(!empty.is_resolved());
    Ok(())
}

/// A blob ending inside a fixed argument is contained the same way
#[test]
fn blob_cut_inside_an_argument_has_no_arguments() -> Result<()> {
    let module = load()?;
    let holder = module.find_type("App", "Holder").unwrap();

    let cut = holder.custom_attributes.get(1).unwrap().clone();
    assert_eq!(
        cut.constructor().signature.parameters,
        vec![TypeReference::Primitive(PrimitiveType::I4)]
    );
    assert!(!cut.has_constructor_arguments());
    assert!(cut.fields().is_empty());
    assert!(!cut.is_resolved());

    // the original bytes survive for rewriting
    assert_eq!(cut.get_blob()?, vec![0x01, 0x00, 0x2A]);
    Ok(())
}

/// Failing attributes leave their siblings untouched
#[test]
fn malformed_blobs_do_not_affect_other_entities() -> Result<()> {
    let module = load()?;
    let holder = module.find_type("App", "Holder").unwrap();

    for (_, attribute) in holder.custom_attributes.iter().take(2) {
        assert!(!attribute.has_constructor_arguments());
    }

    let valid = holder.custom_attributes.get(2).unwrap().clone();
    assert_eq!(
        valid.constructor_arguments(),
        vec![CustomAttributeArgument::String(Some("no".to_string()))]
    );
    assert!(valid.is_resolved());

    let declaration = holder.security_declarations.get(0).unwrap().clone();
    assert_eq!(declaration.action(), SecurityAction::Demand);
    assert!(!declaration.has_security_attributes());
    assert!(!declaration.is_resolved());
    Ok(())
}

/// Entities created in memory start resolved and never touch a blob
#[test]
fn in_memory_entities_are_resolved() {
    let attribute = CustomAttribute::new(
        constructor_of("ObsoleteAttribute", vec![]),
        CustomAttributeValue::default(),
    );
    assert!(attribute.is_resolved());
    assert!(matches!(attribute.get_blob(), Err(Error::NotSupported(_))));
    assert_eq!(attribute.to_blob().unwrap(), vec![0x01, 0x00, 0x00, 0x00]);

    let declaration = SecurityDeclaration::new(SecurityAction::Assert, vec![]);
    assert!(declaration.is_resolved());
    assert!(!declaration.has_security_attributes());
}

/// A resolved attribute is never decoded again
#[test]
fn decoder_runs_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let attribute = CustomAttribute::with_decoder(
        Arc::new(ModuleContext::detached()),
        constructor_of("ObsoleteAttribute", vec![]),
        BlobSource::raw(&[0x01, 0x00, 0x00, 0x00]),
        Arc::new(move |_: &[u8]| -> Result<CustomAttributeValue> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(CustomAttributeValue::default())
        }),
    );

    assert!(!attribute.is_resolved());
    assert!(!attribute.has_constructor_arguments());
    assert!(attribute.is_resolved());
    assert!(attribute.fields().is_empty());
    assert!(attribute.properties().is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// A failing decoder is retried on the next access and keeps reporting an empty payload
#[test]
fn failing_decoder_stays_unresolved() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let attribute = CustomAttribute::with_decoder(
        Arc::new(ModuleContext::detached()),
        constructor_of("ObsoleteAttribute", vec![]),
        BlobSource::raw(&[0xFF]),
        Arc::new(move |_: &[u8]| -> Result<CustomAttributeValue> {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(Error::NotSupported("bad prolog".to_string()))
        }),
    );

    assert!(!attribute.has_constructor_arguments());
    assert!(!attribute.has_constructor_arguments());
    assert!(!attribute.is_resolved());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

/// Concurrent first accesses on one module decode each payload once and agree on the result
#[test]
fn concurrent_first_access() -> Result<()> {
    let module = load()?;
    let source = module.find_type("App", "Source").unwrap();
    let changed = source.events.get(0).unwrap();
    let holder = module.find_type("App", "Holder").unwrap();
    let valid = holder.custom_attributes.get(2).unwrap().clone();
    assert!(!changed.is_resolved());

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let counted = CustomAttribute::with_decoder(
        module.context().clone(),
        constructor_of("ObsoleteAttribute", vec![]),
        BlobSource::raw(&[0x01, 0x00, 0x00, 0x00]),
        Arc::new(move |_: &[u8]| -> Result<CustomAttributeValue> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(CustomAttributeValue::default())
        }),
    );

    let adders: Vec<Arc<MethodDefinition>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    assert_eq!(valid.constructor_arguments().len(), 1);
                    assert!(!counted.has_constructor_arguments());
                    changed.add_method().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(changed.is_resolved());
    let declared = source.methods.find(|method| method.name == "add_Changed").unwrap();
    assert!(adders.iter().all(|add| Arc::ptr_eq(add, &declared)));
    assert_eq!(changed.remove_method().unwrap().name, "remove_Changed");
    Ok(())
}
