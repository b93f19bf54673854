use super::*;
use fdr_common::diagnostics::diagnostic_codes;
use fdr_common::names::{FqName, FqNameUnsafe};
use fdr_source::{MemoryMetadata, MemorySource, RawClass, RawConstant, RawField, RawMethod};
use fdr_types::{
    ConstantValue, DescriptorOrigin, FunctionKind, OverrideKind, PropertyKind, TypeParamOwner,
};

const NOT_NULL: &str = "org.jetbrains.annotations.NotNull";
const NULLABLE: &str = "org.jetbrains.annotations.Nullable";

fn abstract_method(name: &str, descriptor: &str) -> RawMethod {
    RawMethod::new(name, descriptor).with_modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT)
}

fn static_method(name: &str, descriptor: &str) -> RawMethod {
    RawMethod::new(name, descriptor).with_modifiers(Modifiers::PUBLIC | Modifiers::STATIC)
}

fn build(classes: Vec<RawClass>) -> MemorySource {
    let mut source = MemorySource::new();
    for class in classes {
        source.add_class(class).expect("unique class names");
    }
    source
}

fn class(resolver: &mut ForeignResolver<'_>, name: &str) -> ClassDescId {
    resolver
        .resolve_class(&FqNameUnsafe::new(name), SearchPolicy::IgnoreNative)
        .unwrap_or_else(|| panic!("{name} resolves"))
}

fn render(resolver: &ForeignResolver<'_>, functions: &[FunctionId]) -> Vec<String> {
    functions
        .iter()
        .map(|&f| resolver.formatter().format_function(f))
        .collect()
}

// =============================================================================
// Declared functions
// =============================================================================

#[test]
fn test_declared_methods() {
    let source = build(vec![
        RawClass::class("a.Service")
            .with_method(RawMethod::new("name", "()Ljava/lang/String;"))
            .with_method(
                RawMethod::new("log", "([Ljava/lang/String;)V")
                    .with_modifiers(Modifiers::PUBLIC | Modifiers::VARARGS)
                    .with_parameter_names(&["lines"]),
            )
            .with_method(
                RawMethod::new("first", "(Ljava/util/List;)Ljava/lang/Object;")
                    .with_signature("<T:Ljava/lang/Object;>(Ljava/util/List<TT;>;)TT;")
                    .with_parameter_names(&["items"]),
            )
            .with_method(static_method("count", "()I"))
            .with_method(
                RawMethod::new("hidden", "()V")
                    .with_modifiers(Modifiers::PUBLIC | Modifiers::SYNTHETIC),
            ),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let service = class(&mut resolver, "a.Service");
    let owner = MemberOwner::Class(service);

    let name = resolver.functions(owner, "name");
    assert_eq!(render(&resolver, &name), vec!["fun name(): String?"]);
    let descriptor = resolver.store().function(name[0]);
    assert_eq!(descriptor.kind, FunctionKind::Declared);
    assert_eq!(descriptor.modality, Modality::Open);
    assert_eq!(descriptor.signature_source, SignatureSource::Declared);

    let log = resolver.functions(owner, "log");
    assert_eq!(render(&resolver, &log), vec!["fun log(vararg lines: String): Unit"]);

    let first = resolver.functions(owner, "first");
    assert_eq!(render(&resolver, &first), vec!["fun <T> first(items: List<T>?): T?"]);

    assert!(resolver.functions(owner, "count").is_empty());
    assert!(resolver.functions(owner, "hidden").is_empty());
    assert_eq!(resolver.functions(owner, "name"), name);
}

#[test]
fn test_static_methods_live_in_class_statics() {
    let source = build(vec![
        RawClass::class("a.Util").with_method(static_method("count", "()I")),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let util = class(&mut resolver, "a.Util");
    let statics = resolver.class_statics(util).expect("foreign class has statics");

    let count = resolver.functions(MemberOwner::Namespace(statics), "count");
    assert_eq!(render(&resolver, &count), vec!["fun count(): Int"]);
    let descriptor = resolver.store().function(count[0]);
    assert!(descriptor.is_static);
    assert_eq!(descriptor.owner, MemberOwner::Namespace(statics));
}

#[test]
fn test_nullability_annotations() {
    let source = build(vec![
        RawClass::class("a.Service").with_method(
            RawMethod::new("find", "(Ljava/lang/String;)Ljava/lang/String;")
                .with_annotation(RawAnnotation::new(NOT_NULL))
                .with_parameter_annotation(0, RawAnnotation::new(NOT_NULL))
                .with_parameter_names(&["key"]),
        ),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let service = class(&mut resolver, "a.Service");
    let find = resolver.functions(MemberOwner::Class(service), "find");
    assert_eq!(render(&resolver, &find), vec!["fun find(key: String): String"]);
    // Marker annotations are consumed, not surfaced.
    assert!(resolver.store().function(find[0]).annotations.is_empty());
}

#[test]
fn test_malformed_method_signature_falls_back_to_descriptor() {
    let source = build(vec![
        RawClass::class("a.Service")
            .with_method(RawMethod::new("size", "()I").with_signature("<T:()I")),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let service = class(&mut resolver, "a.Service");
    let size = resolver.functions(MemberOwner::Class(service), "size");
    assert_eq!(render(&resolver, &size), vec!["fun size(): Int"]);
    assert_eq!(resolver.store().function(size[0]).signature_errors.len(), 1);
}

// =============================================================================
// Overrides and propagation
// =============================================================================

fn generic_base() -> RawClass {
    RawClass::class("a.Base")
        .with_signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
        .with_method(RawMethod::new("get", "()Ljava/lang/Object;").with_signature("()TT;"))
        .with_method(
            RawMethod::new("set", "(Ljava/lang/Object;)V")
                .with_signature("(TT;)V")
                .with_parameter_names(&["value"]),
        )
}

#[test]
fn test_fake_overrides_are_substituted() {
    let source = build(vec![
        generic_base(),
        RawClass::class("a.Derived").with_signature("La/Base<Ljava/lang/String;>;"),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let base = class(&mut resolver, "a.Base");
    let derived = class(&mut resolver, "a.Derived");

    let get = resolver.functions(MemberOwner::Class(derived), "get");
    assert_eq!(render(&resolver, &get), vec!["fun get(): String?"]);
    let base_get = resolver.functions(MemberOwner::Class(base), "get")[0];
    let fake = resolver.store().function(get[0]);
    assert_eq!(fake.kind, FunctionKind::FakeOverride);
    assert_eq!(fake.original, Some(base_get));
    assert_eq!(fake.overridden, vec![(base_get, OverrideKind::Override)]);
    assert_eq!(fake.owner, MemberOwner::Class(derived));
}

#[test]
fn test_fake_override_of_fake_override_keeps_root_original() {
    let source = build(vec![
        generic_base(),
        RawClass::class("a.Middle").with_signature("La/Base<Ljava/lang/String;>;"),
        RawClass::class("a.Leaf").extends("a.Middle"),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let base = class(&mut resolver, "a.Base");
    let leaf = class(&mut resolver, "a.Leaf");
    let get = resolver.functions(MemberOwner::Class(leaf), "get");
    let base_get = resolver.functions(MemberOwner::Class(base), "get")[0];
    assert_eq!(resolver.store().function(get[0]).original, Some(base_get));
    assert_eq!(render(&resolver, &get), vec!["fun get(): String?"]);
}

#[test]
fn test_declared_override_and_bridge() {
    let source = build(vec![
        generic_base(),
        RawClass::class("a.Derived")
            .with_signature("La/Base<Ljava/lang/String;>;")
            .with_method(RawMethod::new("get", "()Ljava/lang/String;"))
            .with_method(
                RawMethod::new("set", "(Ljava/lang/String;)V").with_parameter_names(&["value"]),
            ),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let base = class(&mut resolver, "a.Base");
    let derived = class(&mut resolver, "a.Derived");
    let base_get = resolver.functions(MemberOwner::Class(base), "get")[0];
    let base_set = resolver.functions(MemberOwner::Class(base), "set")[0];

    let get = resolver.functions(MemberOwner::Class(derived), "get");
    assert_eq!(get.len(), 1);
    let descriptor = resolver.store().function(get[0]);
    assert_eq!(descriptor.kind, FunctionKind::Declared);
    assert_eq!(descriptor.overridden, vec![(base_get, OverrideKind::Override)]);
    assert_eq!(descriptor.signature_source, SignatureSource::Propagated);

    let set = resolver.functions(MemberOwner::Class(derived), "set");
    assert_eq!(set.len(), 1);
    assert_eq!(
        resolver.store().function(set[0]).overridden,
        vec![(base_set, OverrideKind::Bridge)]
    );
}

#[test]
fn test_overload_does_not_hide_inherited_member() {
    let source = build(vec![
        generic_base(),
        RawClass::class("a.Derived")
            .with_signature("La/Base<Ljava/lang/String;>;")
            .with_method(RawMethod::new("set", "(I)V").with_parameter_names(&["value"])),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let derived = class(&mut resolver, "a.Derived");
    let set = resolver.functions(MemberOwner::Class(derived), "set");
    assert_eq!(
        render(&resolver, &set),
        vec!["fun set(value: Int): Unit", "fun set(value: String?): Unit"]
    );
    assert!(resolver.store().function(set[0]).overridden.is_empty());
}

#[test]
fn test_nullability_propagates_from_super() {
    let source = build(vec![
        RawClass::interface("a.Source").with_method(
            abstract_method("accept", "(Ljava/util/List;)Ljava/lang/String;")
                .with_signature("(Ljava/util/List<Ljava/lang/String;>;)Ljava/lang/String;")
                .with_annotation(RawAnnotation::new(NOT_NULL))
                .with_parameter_annotation(0, RawAnnotation::new(NOT_NULL)),
        ),
        RawClass::class("a.Impl").implements("a.Source").with_method(
            RawMethod::new("accept", "(Ljava/util/List;)Ljava/lang/String;")
                .with_signature("(Ljava/util/List<Ljava/lang/String;>;)Ljava/lang/String;")
                .with_parameter_names(&["items"]),
        ),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let implementation = class(&mut resolver, "a.Impl");
    let accept = resolver.functions(MemberOwner::Class(implementation), "accept");
    assert_eq!(
        render(&resolver, &accept),
        vec!["fun accept(items: List<String>): String"]
    );
    let descriptor = resolver.store().function(accept[0]);
    assert_eq!(descriptor.signature_source, SignatureSource::Propagated);
    assert!(descriptor.signature_errors.is_empty());
}

#[test]
fn test_collection_mutability_propagates_from_super() {
    let source = build(vec![
        RawClass::interface("a.Sink").with_method(
            abstract_method("drain", "()Ljava/util/List;")
                .with_signature("()Ljava/util/List<Ljava/lang/String;>;")
                .with_external_signature("fun drain(): List<String>"),
        ),
        RawClass::class("a.Impl").implements("a.Sink").with_method(
            RawMethod::new("drain", "()Ljava/util/List;")
                .with_signature("()Ljava/util/List<Ljava/lang/String;>;"),
        ),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let implementation = class(&mut resolver, "a.Impl");
    let drain = resolver.functions(MemberOwner::Class(implementation), "drain");
    assert_eq!(render(&resolver, &drain), vec!["fun drain(): List<String>"]);
}

#[test]
fn test_conflicting_supers_report_propagation_error() {
    let source = build(vec![
        RawClass::interface("a.Strict").with_method(
            abstract_method("accept", "(Ljava/lang/String;)V")
                .with_parameter_annotation(0, RawAnnotation::new(NOT_NULL)),
        ),
        RawClass::interface("a.Lenient").with_method(
            abstract_method("accept", "(Ljava/lang/String;)V")
                .with_parameter_annotation(0, RawAnnotation::new(NULLABLE)),
        ),
        RawClass::class("a.Both")
            .implements("a.Strict")
            .implements("a.Lenient")
            .with_method(RawMethod::new("accept", "(Ljava/lang/String;)V")),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let both = class(&mut resolver, "a.Both");
    let accept = resolver.functions(MemberOwner::Class(both), "accept");
    assert_eq!(accept.len(), 1);
    let errors = &resolver.store().function(accept[0]).signature_errors;
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Incompatible types in superclasses"));
    assert!(resolver
        .diagnostics()
        .has_code(diagnostic_codes::PROPAGATED_SIGNATURE_ERROR));
}

#[test]
fn test_vararg_propagates_from_super() {
    let source = build(vec![
        RawClass::interface("a.Summer").with_method(
            abstract_method("sum", "([I)I")
                .with_modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT | Modifiers::VARARGS),
        ),
        RawClass::class("a.Impl")
            .implements("a.Summer")
            .with_method(RawMethod::new("sum", "([I)I").with_parameter_names(&["values"])),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let implementation = class(&mut resolver, "a.Impl");
    let sum = resolver.functions(MemberOwner::Class(implementation), "sum");
    assert_eq!(render(&resolver, &sum), vec!["fun sum(vararg values: Int): Int"]);
}

#[test]
fn test_incompatible_override_return() {
    let source = build(vec![
        RawClass::class("a.Base").with_method(RawMethod::new("name", "()Ljava/lang/String;")),
        RawClass::class("a.Derived")
            .extends("a.Base")
            .with_method(RawMethod::new("name", "()Ljava/lang/Integer;")),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let derived = class(&mut resolver, "a.Derived");
    let name = resolver.functions(MemberOwner::Class(derived), "name");
    assert_eq!(name.len(), 1);
    assert!(resolver
        .store()
        .function(name[0])
        .signature_errors
        .iter()
        .any(|e| e.contains("not a subtype")));
    assert!(resolver
        .diagnostics()
        .has_code(diagnostic_codes::INCOMPATIBLE_OVERRIDE_RETURN));
}

#[test]
fn test_private_super_members_are_not_inherited() {
    let source = build(vec![
        RawClass::class("a.Base").with_method(
            RawMethod::new("secret", "()V").with_modifiers(Modifiers::PRIVATE),
        ),
        RawClass::class("a.Derived").extends("a.Base"),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let derived = class(&mut resolver, "a.Derived");
    assert!(resolver.functions(MemberOwner::Class(derived), "secret").is_empty());
}

// =============================================================================
// External signatures
// =============================================================================

#[test]
fn test_external_signature_replaces_declared_types() {
    let source = build(vec![
        RawClass::class("a.Service").with_method(
            RawMethod::new("max", "(Ljava/util/List;)Ljava/lang/Object;")
                .with_signature("<T:Ljava/lang/Object;>(Ljava/util/List<TT;>;)TT;")
                .with_external_signature("fun <T : Comparable<T>> max(items: List<T>): T"),
        ),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let service = class(&mut resolver, "a.Service");
    let max = resolver.functions(MemberOwner::Class(service), "max");
    assert_eq!(
        render(&resolver, &max),
        vec!["fun <T : Comparable<T>> max(items: List<T>): T"]
    );
    assert_eq!(
        resolver.store().function(max[0]).signature_source,
        SignatureSource::External
    );
}

#[test]
fn test_external_vararg() {
    let source = build(vec![
        RawClass::class("a.Service").with_method(
            RawMethod::new("sum", "([I)I").with_external_signature("fun sum(vararg values: Int): Int"),
        ),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let service = class(&mut resolver, "a.Service");
    let sum = resolver.functions(MemberOwner::Class(service), "sum");
    assert_eq!(render(&resolver, &sum), vec!["fun sum(vararg values: Int): Int"]);
    let param = &resolver.store().function(sum[0]).value_params[0];
    assert_eq!(resolver.formatter().format(param.ty), "IntArray");
}

#[test]
fn test_mismatched_external_signature_is_rejected() {
    let source = build(vec![
        RawClass::class("a.Service").with_method(
            RawMethod::new("name", "()Ljava/lang/String;")
                .with_external_signature("fun title(): String"),
        ),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let service = class(&mut resolver, "a.Service");
    let name = resolver.functions(MemberOwner::Class(service), "name");
    assert_eq!(render(&resolver, &name), vec!["fun name(): String?"]);
    let descriptor = resolver.store().function(name[0]);
    assert_eq!(descriptor.signature_source, SignatureSource::Declared);
    assert_eq!(
        descriptor.signature_errors,
        vec!["external signature: name 'title' does not match 'name'".to_string()]
    );
    assert!(resolver
        .diagnostics()
        .has_code(diagnostic_codes::EXTERNAL_SIGNATURE_ERROR));
}

#[test]
fn test_external_signature_sees_class_type_parameters() {
    let source = build(vec![
        RawClass::class("a.Holder")
            .with_signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
            .with_method(
                RawMethod::new("get", "()Ljava/lang/Object;")
                    .with_signature("()TT;")
                    .with_external_signature("fun get(): T"),
            )
            .with_field(
                RawField::new("value", "Ljava/lang/Object;")
                    .with_modifiers(Modifiers::PUBLIC | Modifiers::FINAL)
                    .with_signature("TT;")
                    .with_external_signature("val value: T"),
            ),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let holder = class(&mut resolver, "a.Holder");

    let get = resolver.functions(MemberOwner::Class(holder), "get");
    assert_eq!(render(&resolver, &get), vec!["fun get(): T"]);
    let descriptor = resolver.store().function(get[0]);
    assert_eq!(descriptor.signature_source, SignatureSource::External);
    assert!(descriptor.signature_errors.is_empty());

    let value = resolver.properties(MemberOwner::Class(holder), "value")[0];
    assert_eq!(resolver.formatter().format_property(value), "val value: T");
    let descriptor = resolver.store().property(value);
    assert_eq!(descriptor.signature_source, SignatureSource::External);
    assert!(descriptor.signature_errors.is_empty());
}

#[test]
fn test_external_signature_with_different_erasure_is_rejected() {
    let source = build(vec![
        RawClass::class("a.Service").with_method(
            RawMethod::new("size", "(I)I")
                .with_parameter_names(&["x"])
                .with_external_signature("fun size(x: String): String"),
        ),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let service = class(&mut resolver, "a.Service");
    let size = resolver.functions(MemberOwner::Class(service), "size");
    assert_eq!(render(&resolver, &size), vec!["fun size(x: Int): Int"]);
    let descriptor = resolver.store().function(size[0]);
    assert_eq!(descriptor.signature_source, SignatureSource::Declared);
    assert_eq!(
        descriptor.signature_errors,
        vec![
            "external signature: parameter 'x': 'String' does not match 'Int'".to_string(),
            "external signature: return type: 'String' does not match 'Int'".to_string(),
        ]
    );
    assert!(resolver
        .diagnostics()
        .has_code(diagnostic_codes::EXTERNAL_SIGNATURE_ERROR));
}

#[test]
fn test_external_property_signature() {
    let source = build(vec![
        RawClass::class("a.Bean")
            .with_field(
                RawField::new("title", "Ljava/lang/String;")
                    .with_modifiers(Modifiers::PUBLIC | Modifiers::FINAL)
                    .with_external_signature("val title: String"),
            )
            .with_field(
                RawField::new("size", "I").with_external_signature("val size: Int"),
            ),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let bean = class(&mut resolver, "a.Bean");

    let title = resolver.properties(MemberOwner::Class(bean), "title")[0];
    assert_eq!(resolver.formatter().format_property(title), "val title: String");
    assert_eq!(
        resolver.store().property(title).signature_source,
        SignatureSource::External
    );

    let size = resolver.properties(MemberOwner::Class(bean), "size")[0];
    assert_eq!(resolver.formatter().format_property(size), "var size: Int");
    assert_eq!(resolver.store().property(size).signature_errors.len(), 1);
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_fields_become_properties() {
    let source = build(vec![
        RawClass::class("a.Bean")
            .with_field(RawField::new("title", "Ljava/lang/String;"))
            .with_field(
                RawField::new("tags", "Ljava/util/List;")
                    .with_signature("Ljava/util/List<Ljava/lang/String;>;")
                    .with_modifiers(Modifiers::PUBLIC | Modifiers::FINAL),
            )
            .with_field(
                RawField::new("MAX", "I")
                    .with_modifiers(Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL)
                    .with_constant(RawConstant::Integer(10)),
            )
            .with_field(
                RawField::new("LABEL", "Ljava/lang/String;")
                    .with_modifiers(Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL)
                    .with_constant(RawConstant::String("bean".to_string())),
            ),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let bean = class(&mut resolver, "a.Bean");
    let owner = MemberOwner::Class(bean);

    let title = resolver.properties(owner, "title")[0];
    assert_eq!(resolver.formatter().format_property(title), "var title: String?");
    let tags = resolver.properties(owner, "tags")[0];
    assert_eq!(resolver.formatter().format_property(tags), "val tags: MutableList<String>?");
    assert!(resolver.properties(owner, "MAX").is_empty());

    let statics = MemberOwner::Namespace(resolver.class_statics(bean).expect("statics"));
    let max = resolver.properties(statics, "MAX")[0];
    assert_eq!(resolver.formatter().format_property(max), "val MAX: Int");
    assert_eq!(
        resolver.store().property(max).compile_time_constant,
        Some(ConstantValue::Int(10))
    );
    let label = resolver.properties(statics, "LABEL")[0];
    assert_eq!(resolver.formatter().format_property(label), "val LABEL: String");
    assert!(resolver.store().property(label).is_static);
}

#[test]
fn test_inherited_property_is_fake_override() {
    let source = build(vec![
        RawClass::class("a.Holder")
            .with_signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
            .with_field(RawField::new("value", "Ljava/lang/Object;").with_signature("TT;")),
        RawClass::class("a.Named").with_signature("La/Holder<Ljava/lang/String;>;"),
        RawClass::class("a.Shadow")
            .with_signature("La/Holder<Ljava/lang/String;>;")
            .with_field(RawField::new("value", "I")),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let holder = class(&mut resolver, "a.Holder");
    let named = class(&mut resolver, "a.Named");
    let shadow = class(&mut resolver, "a.Shadow");
    let original = resolver.properties(MemberOwner::Class(holder), "value")[0];

    let inherited = resolver.properties(MemberOwner::Class(named), "value");
    assert_eq!(inherited.len(), 1);
    assert_eq!(
        resolver.formatter().format_property(inherited[0]),
        "var value: String?"
    );
    let property = resolver.store().property(inherited[0]);
    assert_eq!(property.kind, PropertyKind::FakeOverride);
    assert_eq!(property.original, Some(original));

    let own = resolver.properties(MemberOwner::Class(shadow), "value");
    assert_eq!(own.len(), 1);
    assert_eq!(resolver.store().property(own[0]).kind, PropertyKind::Declared);
}

// =============================================================================
// Constructors
// =============================================================================

#[test]
fn test_constructors() {
    let source = build(vec![
        RawClass::class("a.Point")
            .with_method(RawMethod::constructor("(II)V").with_parameter_names(&["x", "y"])),
        RawClass::class("a.Box")
            .with_signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
            .with_method(
                RawMethod::constructor("(Ljava/lang/Object;)V")
                    .with_signature("(TT;)V")
                    .with_parameter_names(&["item"]),
            ),
        RawClass::class("a.Empty"),
        RawClass::interface("a.Shape"),
        RawClass::enumeration("a.Color"),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);

    let point = class(&mut resolver, "a.Point");
    let constructors = resolver.constructors(point);
    assert_eq!(
        render(&resolver, &constructors),
        vec!["fun <init>(x: Int, y: Int): Point"]
    );
    assert_eq!(
        resolver.store().function(constructors[0]).kind,
        FunctionKind::Constructor
    );

    let boxed = class(&mut resolver, "a.Box");
    let constructors = resolver.constructors(boxed);
    assert_eq!(render(&resolver, &constructors), vec!["fun <init>(item: T?): Box<T>"]);

    let empty = class(&mut resolver, "a.Empty");
    let constructors = resolver.constructors(empty);
    assert_eq!(render(&resolver, &constructors), vec!["fun <init>(): Empty"]);
    assert_eq!(
        resolver.store().function(constructors[0]).origin,
        DescriptorOrigin::Synthesized
    );
    assert_eq!(resolver.constructors(empty), constructors);

    let shape = class(&mut resolver, "a.Shape");
    assert!(resolver.constructors(shape).is_empty());
    let color = class(&mut resolver, "a.Color");
    assert!(resolver.constructors(color).is_empty());
}

#[test]
fn test_annotation_constructor() {
    let source = build(vec![
        RawClass::annotation("a.Tags")
            .with_method(abstract_method("value", "()[Ljava/lang/String;"))
            .with_method(
                abstract_method("priority", "()I").with_default_value(RawConstant::Integer(1)),
            ),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let tags = class(&mut resolver, "a.Tags");
    let constructors = resolver.constructors(tags);
    assert_eq!(
        render(&resolver, &constructors),
        vec!["fun <init>(vararg value: String, priority: Int): Tags"]
    );
    let params = &resolver.store().function(constructors[0]).value_params;
    assert!(!params[0].has_default);
    assert!(params[1].has_default);
}

// =============================================================================
// SAM interfaces
// =============================================================================

fn sam_source() -> MemorySource {
    build(vec![
        RawClass::interface("a.Callback").with_method(abstract_method("call", "(Ljava/lang/String;)V")),
        RawClass::interface("a.Mapper")
            .with_signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
            .with_method(
                abstract_method("map", "(Ljava/lang/Object;)Ljava/lang/Object;")
                    .with_signature("(TT;)TT;"),
            ),
        RawClass::interface("a.Twice")
            .with_method(abstract_method("first", "()V"))
            .with_method(abstract_method("second", "()V")),
        RawClass::interface("a.Generic").with_method(
            abstract_method("apply", "(Ljava/lang/Object;)V").with_signature("<X:Ljava/lang/Object;>(TX;)V"),
        ),
        RawClass::interface("a.WithObjectMethods")
            .with_method(abstract_method("run", "()V"))
            .with_method(abstract_method("equals", "(Ljava/lang/Object;)Z"))
            .with_method(abstract_method("hashCode", "()I")),
        RawClass::interface("a.Inherits").implements("a.Callback"),
        RawClass::class("a.Button").with_method(
            RawMethod::new("listen", "(La/Callback;)V").with_parameter_names(&["callback"]),
        ),
    ])
}

#[test]
fn test_sam_detection() {
    let source = sam_source();
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let mut is_sam = |name: &str| {
        let id = class(&mut resolver, name);
        resolver.is_sam_interface(id)
    };
    assert!(is_sam("a.Callback"));
    assert!(is_sam("a.Mapper"));
    assert!(!is_sam("a.Twice"));
    assert!(!is_sam("a.Generic"));
    assert!(is_sam("a.WithObjectMethods"));
    assert!(is_sam("a.Inherits"));
    assert!(!is_sam("a.Button"));
}

#[test]
fn test_sam_constructors() {
    let source = sam_source();
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let package = resolver
        .resolve_namespace(&FqName::new("a").expect("safe name"), SearchPolicy::IgnoreNative)
        .expect("package a");
    let owner = MemberOwner::Namespace(package);

    let callback = resolver.functions(owner, "Callback");
    assert_eq!(
        render(&resolver, &callback),
        vec!["fun Callback(function: Function1<String?, Unit>): Callback"]
    );
    let descriptor = resolver.store().function(callback[0]);
    assert_eq!(descriptor.kind, FunctionKind::SamConstructor);
    assert!(descriptor.is_static);

    let mapper = resolver.functions(owner, "Mapper");
    assert_eq!(
        render(&resolver, &mapper),
        vec!["fun <T> Mapper(function: Function1<T?, T?>): Mapper<T>"]
    );
    let param = resolver.store().function(mapper[0]).type_params[0];
    assert_eq!(
        resolver.store().type_param(param).owner,
        TypeParamOwner::Function(mapper[0])
    );

    assert!(resolver.functions(owner, "Twice").is_empty());
    assert!(resolver.functions(owner, "Button").is_empty());
}

#[test]
fn test_sam_adapters() {
    let source = sam_source();
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let button = class(&mut resolver, "a.Button");
    let listen = resolver.functions(MemberOwner::Class(button), "listen");
    assert_eq!(
        render(&resolver, &listen),
        vec![
            "fun listen(callback: Callback?): Unit",
            "fun listen(callback: Function1<String?, Unit>?): Unit",
        ]
    );
    let adapter = resolver.store().function(listen[1]);
    assert_eq!(adapter.kind, FunctionKind::SamAdapter);
    assert_eq!(adapter.original, Some(listen[0]));
}

#[test]
fn test_sam_features_can_be_disabled() {
    let source = sam_source();
    let metadata = MemoryMetadata::new();
    let options = ResolverOptions {
        sam_adapters: false,
        sam_constructors: false,
        ..ResolverOptions::default()
    };
    let mut resolver = ForeignResolver::with_options(&source, &metadata, options);
    let button = class(&mut resolver, "a.Button");
    assert_eq!(resolver.functions(MemberOwner::Class(button), "listen").len(), 1);
    let package = resolver
        .resolve_namespace(&FqName::new("a").expect("safe name"), SearchPolicy::IgnoreNative)
        .expect("package a");
    assert!(resolver
        .functions(MemberOwner::Namespace(package), "Callback")
        .is_empty());
}
