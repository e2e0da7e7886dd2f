//! A small module exercising most tables, shared by the writer and loader tests.
//!
//! | Type                 | Contents                                                     |
//! |----------------------|--------------------------------------------------------------|
//! | `App.MarkerAttribute`| `.ctor(string)`, `.ctor(App.Color)`                          |
//! | `App.Widget`         | fields, a literal, `Count` property, `Changed` event, nested |
//! | `App.Widget/Inner`   | empty nested class                                           |
//! | `App.Color`          | `uint16` enum with `Red` and `Green`                         |
//! | `App.Box`1`          | generic class with a field of type `!0`                      |

use std::sync::Arc;

use crate::metadata::{
    customattributes::{CustomAttribute, CustomAttributeArgument, CustomAttributeValue},
    members::{
        AssemblyDefinition, ConstantValue, EventAccessors, EventAttributes, EventDefinition,
        FieldAttributes, FieldDefinition, GenericParameter, MethodAttributes, MethodDefinition,
        MethodReference, ModuleDefinition, ParamAttributes, ParameterDefinition,
        PropertyAttributes, PropertyDefinition, TypeAttributes, TypeDefinition,
    },
    security::{SecurityAction, SecurityAttribute, SecurityDeclaration},
    signatures::MethodSignature,
    typesystem::{
        AssemblyName, GenericParameterRef, NamedType, PrimitiveType, ResolutionScope,
        TypeReference, ELEMENT_TYPE,
    },
};

pub fn corlib() -> AssemblyName {
    AssemblyName {
        major_version: 4,
        public_key_or_token: vec![0xB7, 0x7A, 0x5C, 0x56, 0x19, 0x34, 0xE0, 0x89],
        ..AssemblyName::new("mscorlib")
    }
}

pub fn corlib_type(name: &str) -> TypeReference {
    TypeReference::class("System", name, ResolutionScope::AssemblyRef(corlib()))
}

pub fn app_type(name: &str, is_value_type: bool) -> TypeReference {
    let mut named = NamedType::new("App", name, ResolutionScope::CurrentModule);
    named.is_value_type = is_value_type;
    TypeReference::Named(named)
}

fn constructor(parameters: Vec<TypeReference>) -> MethodDefinition {
    MethodDefinition::new(
        ".ctor",
        MethodAttributes::PUBLIC
            | MethodAttributes::HIDE_BY_SIG
            | MethodAttributes::SPECIAL_NAME
            | MethodAttributes::RT_SPECIAL_NAME,
        MethodSignature::new(PrimitiveType::Void.into(), parameters).instance(),
    )
}

fn marker(argument: CustomAttributeArgument, parameter: TypeReference) -> CustomAttribute {
    CustomAttribute::new(
        MethodReference::new(
            app_type("MarkerAttribute", false),
            ".ctor",
            MethodSignature::new(PrimitiveType::Void.into(), vec![parameter]).instance(),
        ),
        CustomAttributeValue {
            fixed_args: vec![argument],
            named_args: Vec::new(),
        },
    )
}

pub fn sample_module() -> ModuleDefinition {
    let mut module = ModuleDefinition::new("sample.dll");
    module.mvid = uguid::guid!("d437908e-65e6-487c-9735-7bdff699bea5");
    module.assembly_references.push(corlib());

    let assembly = AssemblyDefinition::new(AssemblyName {
        major_version: 1,
        minor_version: 2,
        build_number: 3,
        revision_number: 4,
        ..AssemblyName::new("Sample")
    });
    assembly.security_declarations.push(Arc::new(SecurityDeclaration::new(
        SecurityAction::RequestMinimum,
        vec![SecurityAttribute::new(
            "System.Security.Permissions.SecurityPermissionAttribute, mscorlib",
        )],
    )));
    module.assembly = Some(assembly);

    module.types.add(marker_attribute()).unwrap();
    module.types.add(widget()).unwrap();
    module.types.add(color()).unwrap();
    module.types.add(generic_box()).unwrap();

    module.custom_attributes.push(Arc::new(marker(
        CustomAttributeArgument::String(Some("module".to_string())),
        PrimitiveType::String.into(),
    )));
    module
}

fn marker_attribute() -> Arc<TypeDefinition> {
    let marker = TypeDefinition::with_base(
        "App",
        "MarkerAttribute",
        TypeAttributes::PUBLIC | TypeAttributes::SEALED,
        corlib_type("Attribute"),
    );

    let by_name = constructor(vec![PrimitiveType::String.into()]);
    by_name
        .parameters
        .add(Arc::new(ParameterDefinition::new(1, "label", ParamAttributes::empty())))
        .unwrap();
    marker.methods.add(Arc::new(by_name)).unwrap();
    marker
        .methods
        .add(Arc::new(constructor(vec![app_type("Color", true)])))
        .unwrap();

    Arc::new(marker)
}

fn widget() -> Arc<TypeDefinition> {
    let widget = TypeDefinition::with_base(
        "App",
        "Widget",
        TypeAttributes::PUBLIC | TypeAttributes::BEFORE_FIELD_INIT,
        corlib_type("Object"),
    );

    widget
        .fields
        .add(Arc::new(FieldDefinition::new(
            "count",
            FieldAttributes::PRIVATE,
            PrimitiveType::I4.into(),
        )))
        .unwrap();

    let mut limit = FieldDefinition::new(
        "Limit",
        FieldAttributes::PUBLIC
            | FieldAttributes::STATIC
            | FieldAttributes::LITERAL
            | FieldAttributes::HAS_DEFAULT,
        PrimitiveType::I4.into(),
    );
    limit.constant = Some(ConstantValue::i4(42));
    widget.fields.add(Arc::new(limit)).unwrap();

    let handler = corlib_type("EventHandler");
    let accessor = |name: &str, parameters: Vec<TypeReference>, returns: TypeReference| {
        Arc::new(MethodDefinition::new(
            name,
            MethodAttributes::PUBLIC | MethodAttributes::HIDE_BY_SIG | MethodAttributes::SPECIAL_NAME,
            MethodSignature::new(returns, parameters).instance(),
        ))
    };

    let get_count = accessor("get_Count", vec![], PrimitiveType::I4.into());
    let add = accessor("add_Changed", vec![handler.clone()], PrimitiveType::Void.into());
    let remove = accessor("remove_Changed", vec![handler.clone()], PrimitiveType::Void.into());
    add.parameters
        .add(Arc::new(ParameterDefinition::new(1, "value", ParamAttributes::empty())))
        .unwrap();

    widget.methods.add(Arc::new(constructor(vec![]))).unwrap();
    widget.methods.add(get_count.clone()).unwrap();
    widget.methods.add(add.clone()).unwrap();
    widget.methods.add(remove.clone()).unwrap();

    let mut count = PropertyDefinition::new("Count", PropertyAttributes::empty(), PrimitiveType::I4.into());
    count.getter = Some(get_count);
    widget.properties.add(Arc::new(count)).unwrap();

    widget
        .events
        .add(Arc::new(EventDefinition::new(
            "Changed",
            EventAttributes::empty(),
            handler,
            EventAccessors {
                add: Some(add),
                remove: Some(remove),
                ..EventAccessors::default()
            },
        )))
        .unwrap();

    widget
        .nested_types
        .add(Arc::new(TypeDefinition::with_base(
            "",
            "Inner",
            TypeAttributes::NESTED_PUBLIC,
            corlib_type("Object"),
        )))
        .unwrap();

    widget.custom_attributes.push(Arc::new(marker(
        CustomAttributeArgument::String(Some("widget".to_string())),
        PrimitiveType::String.into(),
    )));
    widget.custom_attributes.push(Arc::new(CustomAttribute::new(
        MethodReference::new(
            corlib_type("ObsoleteAttribute"),
            ".ctor",
            MethodSignature::new(PrimitiveType::Void.into(), vec![PrimitiveType::String.into()])
                .instance(),
        ),
        CustomAttributeValue {
            fixed_args: vec![CustomAttributeArgument::String(Some("old".to_string()))],
            named_args: Vec::new(),
        },
    )));

    Arc::new(widget)
}

fn color() -> Arc<TypeDefinition> {
    let color = TypeDefinition::with_base(
        "App",
        "Color",
        TypeAttributes::PUBLIC | TypeAttributes::SEALED,
        corlib_type("Enum"),
    );

    color
        .fields
        .add(Arc::new(FieldDefinition::new(
            "value__",
            FieldAttributes::PUBLIC | FieldAttributes::SPECIAL_NAME | FieldAttributes::RT_SPECIAL_NAME,
            PrimitiveType::U2.into(),
        )))
        .unwrap();

    for (name, value) in [("Red", 1u16), ("Green", 2)] {
        let mut field = FieldDefinition::new(
            name,
            FieldAttributes::PUBLIC
                | FieldAttributes::STATIC
                | FieldAttributes::LITERAL
                | FieldAttributes::HAS_DEFAULT,
            app_type("Color", true),
        );
        field.constant = Some(ConstantValue {
            element_type: ELEMENT_TYPE::U2,
            value: u16::to_le_bytes(value).to_vec(),
        });
        color.fields.add(Arc::new(field)).unwrap();
    }

    color.custom_attributes.push(Arc::new(marker(
        CustomAttributeArgument::Enum("App.Color".to_string(), Box::new(CustomAttributeArgument::U2(2))),
        app_type("Color", true),
    )));

    Arc::new(color)
}

fn generic_box() -> Arc<TypeDefinition> {
    let generic = TypeDefinition::with_base(
        "App",
        "Box`1",
        TypeAttributes::PUBLIC,
        corlib_type("Object"),
    );

    let mut parameter = GenericParameter::new(0, "T");
    parameter.constraints.push(corlib_type("IDisposable"));
    generic.generic_parameters.add(Arc::new(parameter)).unwrap();

    generic
        .fields
        .add(Arc::new(FieldDefinition::new(
            "value",
            FieldAttributes::PRIVATE,
            TypeReference::GenericParameter(GenericParameterRef::type_parameter(0)),
        )))
        .unwrap();

    Arc::new(generic)
}
