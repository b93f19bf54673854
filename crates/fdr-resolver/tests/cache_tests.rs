use super::*;

fn name(s: &str) -> FqNameUnsafe {
    FqNameUnsafe::new(s)
}

#[test]
fn test_class_lifecycle() {
    let mut cache = ResolutionCache::new();
    let a = name("p.A");
    assert_eq!(cache.lookup_class(&a), Lookup::Miss);

    cache.begin_class(&a, ClassDescId(3));
    assert_eq!(
        cache.lookup_class(&a),
        Lookup::Hit(CacheEntry::Materializing(ClassDescId(3)))
    );
    cache.complete_class(&a, ClassDescId(3));
    assert_eq!(
        cache.lookup_class(&a),
        Lookup::Hit(CacheEntry::Resolved(ClassDescId(3)))
    );
    assert_eq!(cache.resolved_class_count(), 1);
}

#[test]
fn test_negative_entries_are_stable() {
    let mut cache = ResolutionCache::new();
    cache.record_missing_class(&name("p.Missing"));
    assert_eq!(cache.lookup_class(&name("p.Missing")), Lookup::Negative);
    assert_eq!(cache.missing_class_count(), 1);
}

#[test]
#[should_panic(expected = "written twice")]
fn test_second_begin_is_fatal() {
    let mut cache = ResolutionCache::new();
    cache.begin_class(&name("p.A"), ClassDescId(1));
    cache.begin_class(&name("p.A"), ClassDescId(2));
}

#[test]
#[should_panic(expected = "written twice")]
fn test_caching_a_missing_class_is_fatal() {
    let mut cache = ResolutionCache::new();
    cache.record_missing_class(&name("p.A"));
    cache.insert_resolved_class(&name("p.A"), ClassDescId(1));
}

#[test]
fn test_resolved_insert_is_idempotent_for_same_id() {
    let mut cache = ResolutionCache::new();
    cache.insert_resolved_class(&name("p.A"), ClassDescId(1));
    cache.insert_resolved_class(&name("p.A"), ClassDescId(1));
    assert_eq!(cache.resolved_class_count(), 1);
}

#[test]
fn test_namespaces() {
    let mut cache = ResolutionCache::new();
    let pkg = FqName::new("p").expect("safe");
    cache.insert_namespace(&pkg, NamespaceId(4));
    cache.insert_namespace(&pkg, NamespaceId(4));
    assert_eq!(cache.lookup_namespace(&pkg), Lookup::Hit(NamespaceId(4)));

    let missing = FqName::new("q").expect("safe");
    cache.record_missing_namespace(&missing);
    assert_eq!(cache.lookup_namespace(&missing), Lookup::Negative);
}

#[test]
#[should_panic(expected = "written twice")]
fn test_namespace_rewrite_is_fatal() {
    let mut cache = ResolutionCache::new();
    let pkg = FqName::new("p").expect("safe");
    cache.insert_namespace(&pkg, NamespaceId(1));
    cache.insert_namespace(&pkg, NamespaceId(2));
}
