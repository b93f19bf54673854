//! Class and namespace resolution through the public API.

use fdr::types::{ClassParent, NamespaceKind};
use fdr::{
    ClassDescId, ClassKind, ForeignResolver, FqName, FqNameUnsafe, MemoryMetadata, MemorySource,
    Modifiers, RawClass, SearchPolicy, diagnostic_codes,
};

fn source(classes: Vec<RawClass>) -> MemorySource {
    let mut source = MemorySource::new();
    for class in classes {
        source.add_class(class).expect("unique class names");
    }
    source
}

fn resolve(resolver: &mut ForeignResolver<'_>, name: &str) -> Option<ClassDescId> {
    resolver.resolve_class(&FqNameUnsafe::new(name), SearchPolicy::PreferNative)
}

fn supertypes(resolver: &ForeignResolver<'_>, class: ClassDescId) -> Vec<String> {
    let formatter = resolver.formatter();
    resolver
        .store()
        .class(class)
        .supertypes
        .iter()
        .map(|&ty| formatter.format(ty))
        .collect()
}

#[test]
fn test_same_name_same_descriptor() {
    let source = source(vec![RawClass::class("org.acme.Widget")]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);

    let first = resolve(&mut resolver, "org.acme.Widget").expect("resolves");
    for _ in 0..3 {
        assert_eq!(resolve(&mut resolver, "org.acme.Widget"), Some(first));
    }
    assert_eq!(resolver.resolve_foreign_class("org.acme.Widget"), Some(first));
    assert_eq!(source.query_count(&FqName::new("org.acme.Widget").expect("safe")), 1);
}

#[test]
fn test_self_reference_in_supertype_terminates() {
    let source = source(vec![
        RawClass::class("a.Node").with_signature("Ljava/lang/Object;Ljava/lang/Comparable<La/Node;>;"),
        RawClass::class("a.Loop").extends("a.Loop"),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);

    let node = resolve(&mut resolver, "a.Node").expect("resolves");
    assert_eq!(supertypes(&resolver, node), vec!["Any", "Comparable<Node>"]);
    assert_eq!(resolver.cache().resolved_class_count(), 1);

    let looping = resolve(&mut resolver, "a.Loop").expect("resolves");
    assert_eq!(supertypes(&resolver, looping), vec!["Loop"]);
    assert_eq!(resolver.cache().resolved_class_count(), 2);
}

#[test]
fn test_negative_results_are_stable() {
    let source = source(vec![RawClass::class("a.Present")]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);

    for _ in 0..3 {
        assert_eq!(resolve(&mut resolver, "a.Absent"), None);
    }
    assert_eq!(source.query_count(&FqName::new("a.Absent").expect("safe")), 1);
    assert!(resolve(&mut resolver, "a.Present").is_some());
}

#[test]
fn test_inner_class_parent_is_outer_descriptor() {
    let source = source(vec![
        RawClass::class("a.Outer").with_inner_class("Inner"),
        RawClass::class("a.Outer$Inner").nested_in("a.Outer"),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);

    let inner = resolve(&mut resolver, "a.Outer.Inner").expect("inner resolves");
    let outer = resolve(&mut resolver, "a.Outer").expect("outer resolves");
    assert_eq!(resolver.store().class(inner).parent, ClassParent::Class(outer));
    assert_eq!(resolver.inner_class(outer, "Inner"), Some(inner));
    assert_eq!(resolver.resolve_foreign_class("a.Outer$Inner"), Some(inner));
}

#[test]
fn test_native_declarations_and_policies() {
    let source = source(vec![RawClass::class("core.String"), RawClass::class("a.Only")]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let string = resolver.builtins().string;
    let name = FqNameUnsafe::new("core.String");

    assert_eq!(resolver.resolve_class(&name, SearchPolicy::PreferNative), Some(string));
    let foreign = resolver
        .resolve_class(&name, SearchPolicy::PreferForeign)
        .expect("foreign core.String");
    assert_ne!(foreign, string);
    assert_eq!(resolver.resolve_class(&name, SearchPolicy::IgnoreNative), Some(foreign));

    let only = FqNameUnsafe::new("a.Only");
    assert_eq!(
        resolver.resolve_class(&only, SearchPolicy::ErrorIfNative),
        resolver.resolve_class(&only, SearchPolicy::IgnoreNative)
    );
}

#[test]
fn test_incomplete_hierarchy_is_reported() {
    let source = source(vec![
        RawClass::class("a.Child").extends("a.Missing"),
        RawClass::class("a.Grandchild").extends("a.Child"),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);

    let grandchild = resolve(&mut resolver, "a.Grandchild").expect("resolves");
    assert!(!resolver.store().class(grandchild).incomplete);
    let child = resolve(&mut resolver, "a.Child").expect("resolves");
    assert!(resolver.store().class(child).incomplete);
    assert_eq!(supertypes(&resolver, child), vec!["[ERROR : a.Missing]"]);

    let diagnostics = resolver.take_diagnostics();
    let subjects: Vec<&str> = diagnostics
        .iter()
        .filter(|d| d.code == diagnostic_codes::INCOMPLETE_HIERARCHY)
        .map(|d| d.subject.as_str())
        .collect();
    assert_eq!(subjects, vec!["a.Child"]);
}

#[test]
fn test_packages_and_class_statics() {
    let source = source(vec![
        RawClass::class("org.acme.Tools").with_method(
            fdr::RawMethod::new("version", "()Ljava/lang/String;")
                .with_modifiers(Modifiers::PUBLIC | Modifiers::STATIC),
        ),
        RawClass::enumeration("org.acme.Mode"),
    ]);
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let name = |n: &str| FqName::new(n).expect("safe name");

    let acme = resolver
        .resolve_namespace(&name("org.acme"), SearchPolicy::PreferNative)
        .expect("package");
    assert_eq!(resolver.store().namespace(acme).kind, NamespaceKind::Package);

    let tools = resolve(&mut resolver, "org.acme.Tools").expect("resolves");
    let statics = resolver
        .resolve_namespace(&name("org.acme.Tools"), SearchPolicy::PreferNative)
        .expect("class statics");
    assert_eq!(resolver.store().namespace(statics).kind, NamespaceKind::ClassStatics(tools));

    let mode = resolve(&mut resolver, "org.acme.Mode").expect("resolves");
    assert_eq!(resolver.store().class(mode).kind, ClassKind::Enum);
    assert!(resolver.store().class(mode).class_object.is_some());
}
