use super::*;
use crate::options::ResolverOptions;
use fdr_common::diagnostics::diagnostic_codes;
use fdr_source::{MemoryMetadata, MemorySource, RawField, RawMethod};

fn resolve(resolver: &mut ForeignResolver<'_>, name: &str) -> Option<ClassDescId> {
    resolver.resolve_class(&FqNameUnsafe::new(name), SearchPolicy::IgnoreNative)
}

fn supertypes(resolver: &ForeignResolver<'_>, class: ClassDescId) -> Vec<String> {
    resolver
        .store()
        .class(class)
        .supertypes
        .iter()
        .map(|&ty| resolver.formatter().format(ty))
        .collect()
}

#[test]
fn test_resolution_is_idempotent() {
    let source = MemorySource::new()
        .with_class(RawClass::class("a.b.C"))
        .expect("fresh source");
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);

    let first = resolve(&mut resolver, "a.b.C").expect("resolves");
    let second = resolve(&mut resolver, "a.b.C").expect("resolves");
    assert_eq!(first, second);
    assert_eq!(resolver.resolve_foreign_class("a.b.C"), Some(first));

    let class = resolver.store().class(first);
    assert_eq!(class.kind, ClassKind::Class);
    assert_eq!(class.modality, Modality::Open);
    assert_eq!(class.visibility, Visibility::Public);
    assert_eq!(class.origin, DescriptorOrigin::Foreign);
    let ClassParent::Namespace(package) = class.parent else {
        panic!("top-level class lives in its package");
    };
    assert_eq!(resolver.store().namespace(package).fq_name.as_str(), "a.b");
    assert_eq!(supertypes(&resolver, first), vec!["Any"]);
}

#[test]
fn test_missing_class_is_cached_negatively() {
    let source = MemorySource::new();
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    assert_eq!(resolve(&mut resolver, "a.Missing"), None);
    assert_eq!(resolve(&mut resolver, "a.Missing"), None);
    assert_eq!(
        source.query_count(&FqName::new("a.Missing").expect("safe name")),
        1
    );
    assert_eq!(resolver.cache().missing_class_count(), 1);
}

#[test]
fn test_nested_classes() {
    let source = MemorySource::new()
        .with_class(
            RawClass::class("a.Outer")
                .with_inner_class("Inner")
                .with_inner_class("Nested"),
        )
        .and_then(|s| s.with_class(RawClass::class("a.Outer$Inner").nested_in("a.Outer")))
        .and_then(|s| {
            s.with_class(
                RawClass::class("a.Outer$Nested")
                    .nested_in("a.Outer")
                    .with_modifiers(Modifiers::PUBLIC | Modifiers::STATIC),
            )
        })
        .expect("fresh source");
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);

    // Resolving the inner class first materializes the outer one.
    let inner = resolver
        .resolve_foreign_class("a.Outer$Inner")
        .expect("inner resolves");
    let outer = resolve(&mut resolver, "a.Outer").expect("outer resolves");
    assert_eq!(resolver.store().class(inner).parent, ClassParent::Class(outer));
    assert!(resolver.store().class(inner).is_inner);

    let nested = resolve(&mut resolver, "a.Outer.Nested").expect("nested resolves");
    assert!(!resolver.store().class(nested).is_inner);
    assert_eq!(resolver.inner_class(outer, "Nested"), Some(nested));
    assert_eq!(resolver.inner_class(outer, "Absent"), None);
}

#[test]
#[should_panic(expected = "cannot be resolved")]
fn test_missing_outer_class_is_fatal() {
    let source = MemorySource::new()
        .with_class(RawClass::class("a.Gone$Inner").nested_in("a.Gone"))
        .expect("fresh source");
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let _ = resolver.resolve_foreign_class("a.Gone$Inner");
}

#[test]
#[should_panic(expected = "declared natively")]
fn test_error_if_native_is_fatal() {
    let source = MemorySource::new();
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let _ = resolver.resolve_class(&FqNameUnsafe::new("core.String"), SearchPolicy::ErrorIfNative);
}

#[test]
fn test_synthesized_helpers_never_resolve() {
    let source = MemorySource::new()
        .with_class(RawClass::class("a.Shape$TImpl"))
        .expect("fresh source");
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    assert_eq!(resolve(&mut resolver, "a.Shape$TImpl"), None);
    assert_eq!(resolve(&mut resolver, ""), None);
}

#[test]
fn test_modality_and_kind() {
    let source = MemorySource::new()
        .with_class(
            RawClass::class("a.Base").with_modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT),
        )
        .and_then(|s| {
            s.with_class(RawClass::class("a.Leaf").with_modifiers(Modifiers::PUBLIC | Modifiers::FINAL))
        })
        .and_then(|s| s.with_class(RawClass::interface("a.Shape")))
        .and_then(|s| s.with_class(RawClass::annotation("a.Marker")))
        .and_then(|s| s.with_class(RawClass::class("a.Hidden").with_modifiers(Modifiers::empty())))
        .expect("fresh source");
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);

    let mut shape = |name: &str| {
        let id = resolve(&mut resolver, name).expect("resolves");
        let class = resolver.store().class(id);
        (class.kind, class.modality, class.visibility)
    };
    assert_eq!(shape("a.Base"), (ClassKind::Class, Modality::Abstract, Visibility::Public));
    assert_eq!(shape("a.Leaf"), (ClassKind::Class, Modality::Final, Visibility::Public));
    assert_eq!(shape("a.Shape"), (ClassKind::Interface, Modality::Abstract, Visibility::Public));
    assert_eq!(
        shape("a.Marker"),
        (ClassKind::AnnotationClass, Modality::Abstract, Visibility::Public)
    );
    assert_eq!(
        shape("a.Hidden"),
        (ClassKind::Class, Modality::Open, Visibility::PackagePrivate)
    );
}

#[test]
fn test_generic_supertypes() {
    let source = MemorySource::new()
        .with_class(
            RawClass::class("a.Base").with_signature("<T:Ljava/lang/Object;>Ljava/lang/Object;"),
        )
        .and_then(|s| {
            s.with_class(RawClass::class("a.Child").with_signature(
                "<E:Ljava/lang/Object;>La/Base<TE;>;Ljava/lang/Comparable<La/Child<TE;>;>;Ljava/util/List<Ljava/lang/String;>;",
            ))
        })
        .expect("fresh source");
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let child = resolve(&mut resolver, "a.Child").expect("resolves");
    assert_eq!(
        supertypes(&resolver, child),
        vec!["Base<E>", "Comparable<Child<E>>", "MutableList<String>"]
    );
    assert!(!resolver.store().class(child).incomplete);
}

#[test]
fn test_self_referential_bound() {
    let source = MemorySource::new()
        .with_class(
            RawClass::class("a.Node")
                .with_signature("<N:La/Node<TN;>;>Ljava/lang/Object;"),
        )
        .expect("fresh source");
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let node = resolve(&mut resolver, "a.Node").expect("resolves");
    let param = resolver.store().class(node).type_params[0];
    let bounds = resolver.store().upper_bounds(param).to_vec();
    assert_eq!(bounds.len(), 1);
    assert_eq!(resolver.formatter().format(bounds[0]), "Node<N>");
}

#[test]
fn test_unresolved_supertype_marks_hierarchy_incomplete() {
    let source = MemorySource::new()
        .with_class(RawClass::class("a.Child").extends("a.Gone").implements("java.lang.Comparable"))
        .expect("fresh source");
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let child = resolve(&mut resolver, "a.Child").expect("still resolves");
    assert!(resolver.store().class(child).incomplete);
    assert_eq!(
        supertypes(&resolver, child),
        vec!["[ERROR : a.Gone]", "Comparable<Any?>"]
    );
    let diagnostics = resolver.diagnostics();
    assert!(diagnostics.has_code(diagnostic_codes::UNRESOLVED_SUPERTYPE));
    assert!(diagnostics.has_code(diagnostic_codes::INCOMPLETE_HIERARCHY));
}

#[test]
fn test_malformed_class_signature_is_tolerated() {
    let source = MemorySource::new()
        .with_class(RawClass::class("a.Broken").with_signature("<T:"))
        .expect("fresh source");
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let broken = resolve(&mut resolver, "a.Broken").expect("resolves");
    assert!(resolver.store().class(broken).incomplete);
    assert!(resolver.store().class(broken).type_params.is_empty());
}

#[test]
fn test_depth_limit_cuts_long_chains() {
    let mut source = MemorySource::new();
    for i in 0..6 {
        source
            .add_class(RawClass::class(format!("a.C{i}")).extends(format!("a.C{}", i + 1)))
            .expect("unique");
    }
    let metadata = MemoryMetadata::new();
    let options = ResolverOptions {
        max_resolution_depth: 2,
        ..ResolverOptions::default()
    };
    let mut resolver = ForeignResolver::with_options(&source, &metadata, options);
    assert!(resolve(&mut resolver, "a.C0").is_some());
    assert!(resolver
        .diagnostics()
        .has_code(diagnostic_codes::UNRESOLVED_SUPERTYPE));
}

#[test]
fn test_enum_holder() {
    let entry = |name: &str| {
        RawField::new(name, "La/Color;").with_modifiers(
            Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL | Modifiers::ENUM,
        )
    };
    let source = MemorySource::new()
        .with_class(
            RawClass::enumeration("a.Color")
                .with_signature("Ljava/lang/Enum<La/Color;>;")
                .with_field(entry("RED"))
                .with_field(entry("GREEN")),
        )
        .expect("fresh source");
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let color = resolve(&mut resolver, "a.Color").expect("resolves");
    assert_eq!(resolver.store().class(color).modality, Modality::Final);
    assert_eq!(supertypes(&resolver, color), vec!["Enum<Color>"]);

    let holder = resolver.store().class(color).class_object.expect("holder");
    assert_eq!(resolver.store().class(holder).kind, ClassKind::ClassObject);
    let marker = FqNameUnsafe::new("a.Color").class_object_name();
    assert_eq!(resolver.resolve_class(&marker, SearchPolicy::IgnoreNative), Some(holder));

    let holder_desc = resolver.store().class(holder);
    let entries: Vec<&str> = holder_desc
        .properties
        .iter()
        .map(|&p| resolver.store().name(resolver.store().property(p).name))
        .collect();
    assert_eq!(entries, vec!["RED", "GREEN"]);
    let helpers: Vec<String> = holder_desc
        .functions
        .iter()
        .map(|&f| resolver.formatter().format_function(f))
        .collect();
    assert_eq!(
        helpers,
        vec!["fun values(): Array<Color>", "fun valueOf(value: String): Color"]
    );
}

#[test]
fn test_namespaces() {
    let source = MemorySource::new()
        .with_class(
            RawClass::class("a.b.Util").with_method(
                RawMethod::new("twice", "(I)I").with_modifiers(Modifiers::PUBLIC | Modifiers::STATIC),
            ),
        )
        .and_then(|s| s.with_class(RawClass::class("a.b.Plain")))
        .expect("fresh source");
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let name = |n: &str| FqName::new(n).expect("safe name");

    let package = resolver
        .resolve_namespace(&name("a.b"), SearchPolicy::IgnoreNative)
        .expect("package exists");
    assert_eq!(resolver.store().namespace(package).kind, NamespaceKind::Package);
    let parent = resolver.store().namespace(package).parent.expect("has parent");
    assert_eq!(resolver.store().namespace(parent).fq_name.as_str(), "a");
    assert_eq!(
        resolver.resolve_namespace(&name("a.b"), SearchPolicy::IgnoreNative),
        Some(package)
    );

    let statics = resolver
        .resolve_namespace(&name("a.b.Util"), SearchPolicy::IgnoreNative)
        .expect("class statics");
    let util = resolve(&mut resolver, "a.b.Util").expect("resolves");
    assert_eq!(
        resolver.store().namespace(statics).kind,
        NamespaceKind::ClassStatics(util)
    );
    assert_eq!(resolver.class_statics(util), Some(statics));

    assert_eq!(resolver.resolve_namespace(&name("a.b.Plain"), SearchPolicy::IgnoreNative), None);
    assert_eq!(resolver.resolve_namespace(&name("x.y"), SearchPolicy::IgnoreNative), None);
    assert_eq!(
        resolver.resolve_namespace(&FqName::root(), SearchPolicy::IgnoreNative),
        Some(resolver.root())
    );
}
