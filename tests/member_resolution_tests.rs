//! Member resolution across a small class hierarchy.

use fdr::types::{ConstantValue, FunctionKind, OverrideKind, PropertyKind};
use fdr::{
    ClassDescId, ForeignResolver, FqNameUnsafe, FunctionId, MemberOwner, MemoryMetadata,
    MemorySource, Modifiers, RawClass, RawConstant, RawField, RawMethod, SearchPolicy,
};

fn widgets() -> MemorySource {
    let classes = vec![
        RawClass::class("a.ui.Widget")
            .with_modifiers(Modifiers::PUBLIC)
            .with_method(RawMethod::constructor("(I)V").with_parameter_names(&["id"]))
            .with_method(RawMethod::new("render", "()V"))
            .with_field(RawField::new("id", "I").with_modifiers(Modifiers::PUBLIC | Modifiers::FINAL))
            .with_field(
                RawField::new("DEFAULT_WIDTH", "I")
                    .with_modifiers(Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL)
                    .with_constant(RawConstant::Integer(80)),
            ),
        RawClass::class("a.ui.Button")
            .with_modifiers(Modifiers::PUBLIC)
            .extends("a.ui.Widget")
            .with_inner_class("Listener")
            .with_method(RawMethod::new("render", "()V"))
            .with_method(
                RawMethod::new("onClick", "(La/ui/Button$Listener;)V").with_parameter_names(&["listener"]),
            ),
        RawClass::interface("a.ui.Button$Listener").nested_in("a.ui.Button").with_method(
            RawMethod::new("clicked", "(La/ui/Button;)V")
                .with_modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT),
        ),
        RawClass::enumeration("a.ui.Align")
            .with_signature("Ljava/lang/Enum<La/ui/Align;>;")
            .with_field(enum_entry("LEFT"))
            .with_field(enum_entry("RIGHT")),
    ];
    let mut source = MemorySource::new();
    for class in classes {
        source.add_class(class).expect("unique class names");
    }
    source
}

fn enum_entry(name: &str) -> RawField {
    RawField::new(name, "La/ui/Align;").with_modifiers(
        Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL | Modifiers::ENUM,
    )
}

fn class(resolver: &mut ForeignResolver<'_>, name: &str) -> ClassDescId {
    resolver
        .resolve_class(&FqNameUnsafe::new(name), SearchPolicy::IgnoreNative)
        .unwrap_or_else(|| panic!("{name} resolves"))
}

fn render(resolver: &ForeignResolver<'_>, ids: &[FunctionId]) -> Vec<String> {
    let formatter = resolver.formatter();
    ids.iter().map(|&id| formatter.format_function(id)).collect()
}

#[test]
fn test_declared_override_and_inherited_field() {
    let source = widgets();
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let widget = class(&mut resolver, "a.ui.Widget");
    let button = class(&mut resolver, "a.ui.Button");

    let widget_render = resolver.functions(MemberOwner::Class(widget), "render");
    let render_fn = resolver.functions(MemberOwner::Class(button), "render");
    assert_eq!(render(&resolver, &render_fn), vec!["fun render(): Unit"]);
    let descriptor = resolver.store().function(render_fn[0]);
    assert_eq!(descriptor.kind, FunctionKind::Declared);
    assert_eq!(descriptor.overridden, vec![(widget_render[0], OverrideKind::Override)]);

    let id = resolver.properties(MemberOwner::Class(button), "id");
    assert_eq!(id.len(), 1);
    assert_eq!(resolver.formatter().format_property(id[0]), "val id: Int");
    assert_eq!(resolver.store().property(id[0]).kind, PropertyKind::FakeOverride);
}

#[test]
fn test_constructors_are_not_inherited() {
    let source = widgets();
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let widget = class(&mut resolver, "a.ui.Widget");
    let button = class(&mut resolver, "a.ui.Button");

    let constructors = resolver.constructors(widget);
    assert_eq!(render(&resolver, &constructors), vec!["fun <init>(id: Int): Widget"]);
    let constructors = resolver.constructors(button);
    assert_eq!(render(&resolver, &constructors), vec!["fun <init>(): Button"]);
}

#[test]
fn test_nested_sam_interface_gets_adapter() {
    let source = widgets();
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let button = class(&mut resolver, "a.ui.Button");
    let listener = resolver.inner_class(button, "Listener").expect("nested listener");
    assert!(resolver.is_sam_interface(listener));

    let on_click = resolver.functions(MemberOwner::Class(button), "onClick");
    assert_eq!(
        render(&resolver, &on_click),
        vec![
            "fun onClick(listener: Listener?): Unit",
            "fun onClick(listener: Function1<Button?, Unit>?): Unit",
        ]
    );
    assert_eq!(resolver.store().function(on_click[1]).kind, FunctionKind::SamAdapter);

    let param = resolver.store().function(on_click[0]).value_params[0].ty;
    assert_eq!(resolver.formatter().qualified().format(param), "a.ui.Button.Listener?");
    assert_eq!(resolver.functions(MemberOwner::Class(button), "onClick"), on_click);
}

#[test]
fn test_static_constant_lives_in_class_statics() {
    let source = widgets();
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let widget = class(&mut resolver, "a.ui.Widget");
    assert!(resolver.properties(MemberOwner::Class(widget), "DEFAULT_WIDTH").is_empty());

    let statics = resolver.class_statics(widget).expect("widget has statics");
    let width = resolver.properties(MemberOwner::Namespace(statics), "DEFAULT_WIDTH");
    assert_eq!(resolver.formatter().format_property(width[0]), "val DEFAULT_WIDTH: Int");
    let property = resolver.store().property(width[0]);
    assert!(property.is_static);
    assert_eq!(property.compile_time_constant, Some(ConstantValue::Int(80)));
}

#[test]
fn test_enum_entries_and_holder_functions() {
    let source = widgets();
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let align = class(&mut resolver, "a.ui.Align");
    let holder = resolver.store().class(align).class_object.expect("enum holder");
    let owner = MemberOwner::Class(holder);

    let left = resolver.properties(owner, "LEFT");
    assert_eq!(resolver.formatter().format_property(left[0]), "val LEFT: Align");
    assert_eq!(resolver.store().property(left[0]).kind, PropertyKind::EnumEntry);
    let values = resolver.functions(owner, "values");
    assert_eq!(render(&resolver, &values), vec!["fun values(): Array<Align>"]);
    let value_of = resolver.functions(owner, "valueOf");
    assert_eq!(render(&resolver, &value_of), vec!["fun valueOf(value: String): Align"]);
    assert!(resolver.constructors(align).is_empty());
}
