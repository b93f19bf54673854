use super::*;
use fdr_common::names::FqNameUnsafe;
use fdr_source::{MemoryMetadata, MemorySource, PrimitiveKind, RawClass, parse_field_signature};

fn raw(signature: &str) -> RawType {
    parse_field_signature(signature).expect("valid field signature")
}

fn render(
    resolver: &mut ForeignResolver<'_>,
    signature: &str,
    usage: TypeUsage,
    flags: TypeFlags,
) -> String {
    let scope = TypeVariableResolver::new();
    let ty = resolver.transform_type(&raw(signature), usage, flags, &scope);
    resolver.formatter().format(ty)
}

#[test]
fn test_primitives_and_void() {
    let source = MemorySource::new();
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let usage = TypeUsage::MemberSignatureCovariant;
    assert_eq!(render(&mut resolver, "I", usage, TypeFlags::empty()), "Int");
    let scope = TypeVariableResolver::new();
    let void = RawType::Primitive(PrimitiveKind::Void);
    let unit = resolver.transform_type(&void, usage, TypeFlags::empty(), &scope);
    assert_eq!(resolver.formatter().format(unit), "Unit");
    assert_eq!(render(&mut resolver, "[I", usage, TypeFlags::empty()), "IntArray?");
    assert_eq!(
        render(&mut resolver, "[I", usage, TypeFlags::NOT_NULL),
        "IntArray"
    );
}

#[test]
fn test_object_array_parameter_is_projected() {
    let source = MemorySource::new();
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let string_array = "[Ljava/lang/String;";
    assert_eq!(
        render(
            &mut resolver,
            string_array,
            TypeUsage::MemberSignatureContravariant,
            TypeFlags::empty()
        ),
        "Array<out String>?"
    );
    assert_eq!(
        render(
            &mut resolver,
            string_array,
            TypeUsage::MemberSignatureContravariant,
            TypeFlags::VARARG
        ),
        "Array<String>?"
    );
    assert_eq!(
        render(
            &mut resolver,
            string_array,
            TypeUsage::MemberSignatureCovariant,
            TypeFlags::empty()
        ),
        "Array<String>?"
    );
}

#[test]
fn test_collection_mutability_follows_usage() {
    let source = MemorySource::new();
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let list = "Ljava/util/List<Ljava/lang/String;>;";
    assert_eq!(
        render(
            &mut resolver,
            list,
            TypeUsage::MemberSignatureContravariant,
            TypeFlags::empty()
        ),
        "List<String>?"
    );
    assert_eq!(
        render(
            &mut resolver,
            list,
            TypeUsage::MemberSignatureCovariant,
            TypeFlags::NOT_NULL
        ),
        "MutableList<String>"
    );
}

#[test]
fn test_wildcards_against_declaration_site_variance() {
    let source = MemorySource::new();
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let extends = "Ljava/util/List<+Ljava/lang/Number;>;";
    // Read-only List declares `out E`: the projection is redundant.
    assert_eq!(
        render(
            &mut resolver,
            extends,
            TypeUsage::MemberSignatureContravariant,
            TypeFlags::NOT_NULL
        ),
        "List<Number>"
    );
    assert_eq!(
        render(
            &mut resolver,
            extends,
            TypeUsage::MemberSignatureCovariant,
            TypeFlags::NOT_NULL
        ),
        "MutableList<out Number>"
    );
    // Opposite variance collapses to a star.
    assert_eq!(
        render(
            &mut resolver,
            "Ljava/util/List<-Ljava/lang/Number;>;",
            TypeUsage::MemberSignatureContravariant,
            TypeFlags::NOT_NULL
        ),
        "List<*>"
    );
    assert_eq!(
        render(
            &mut resolver,
            "Ljava/util/List<*>;",
            TypeUsage::MemberSignatureCovariant,
            TypeFlags::NOT_NULL
        ),
        "MutableList<*>"
    );
}

#[test]
fn test_raw_generic_use() {
    let source = MemorySource::new();
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    assert_eq!(
        render(
            &mut resolver,
            "Ljava/lang/Comparable;",
            TypeUsage::Supertype,
            TypeFlags::empty()
        ),
        "Comparable<Any?>"
    );
    assert_eq!(
        render(
            &mut resolver,
            "Ljava/lang/Comparable;",
            TypeUsage::MemberSignatureCovariant,
            TypeFlags::NOT_NULL
        ),
        "Comparable<*>"
    );
}

#[test]
fn test_unresolved_names_become_error_types() {
    let source = MemorySource::new();
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    assert_eq!(
        render(
            &mut resolver,
            "La/Missing;",
            TypeUsage::MemberSignatureCovariant,
            TypeFlags::empty()
        ),
        "[ERROR : a.Missing]?"
    );
    assert_eq!(
        render(&mut resolver, "TT;", TypeUsage::TypeArgument, TypeFlags::empty()),
        "[ERROR : T]"
    );
}

#[test]
fn test_argument_count_mismatch_is_error_argument() {
    let source = MemorySource::new()
        .with_class(RawClass::class("a.Box").with_signature("<T:Ljava/lang/Object;>Ljava/lang/Object;"))
        .expect("fresh source");
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    assert_eq!(
        render(
            &mut resolver,
            "La/Box<Ljava/lang/String;Ljava/lang/String;>;",
            TypeUsage::MemberSignatureCovariant,
            TypeFlags::NOT_NULL
        ),
        "Box<[ERROR : a.Box]>"
    );
    assert_eq!(
        render(
            &mut resolver,
            "La/Box<Ljava/lang/String;>;",
            TypeUsage::MemberSignatureCovariant,
            TypeFlags::NOT_NULL
        ),
        "Box<String>"
    );
}

#[test]
fn test_type_variables_resolve_through_scope() {
    let source = MemorySource::new()
        .with_class(RawClass::class("a.Box").with_signature("<T:Ljava/lang/Object;>Ljava/lang/Object;"))
        .expect("fresh source");
    let metadata = MemoryMetadata::new();
    let mut resolver = ForeignResolver::new(&source, &metadata);
    let name = FqNameUnsafe::new("a.Box");
    let class = resolver
        .resolve_class(&name, SearchPolicy::IgnoreNative)
        .expect("a.Box resolves");
    let scope = TypeVariableResolver::for_class(resolver.store(), class);
    let ty = resolver.transform_type(
        &raw("Ljava/util/List<TT;>;"),
        TypeUsage::MemberSignatureContravariant,
        TypeFlags::empty(),
        &scope,
    );
    assert_eq!(resolver.formatter().format(ty), "List<T>?");
}
