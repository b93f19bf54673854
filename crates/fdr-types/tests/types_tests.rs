use super::*;

#[test]
fn test_error_type_is_preinterned() {
    let types = TypeInterner::new();
    assert!(types.is_error(TypeId::ERROR));
    assert!(!types.is_nullable(TypeId::ERROR));
    assert!(types.is_empty());
}

#[test]
fn test_interning_deduplicates() {
    let mut types = TypeInterner::new();
    let class = ClassDescId(1);
    let a = types.simple(class, false);
    let b = types.class_type(class, [], false);
    assert_eq!(a, b);

    let nullable = types.simple(class, true);
    assert_ne!(a, nullable);
    assert_eq!(types.with_nullability(nullable, false), a);
    assert_eq!(types.with_nullability(a, false), a);
}

#[test]
fn test_arguments_and_classifier_queries() {
    let mut types = TypeInterner::new();
    let list = ClassDescId(2);
    let string = types.simple(ClassDescId(3), false);
    let ty = types.class_type(list, [TypeProjection::out(string)], true);

    assert_eq!(types.class_of(ty), Some(list));
    assert_eq!(types.args_of(ty), &[TypeProjection::out(string)]);
    assert!(types.args_of(string).is_empty());

    let retargeted = types.with_class(ty, ClassDescId(4));
    assert_eq!(types.class_of(retargeted), Some(ClassDescId(4)));
    assert!(types.is_nullable(retargeted));
}

#[test]
fn test_unknown_id_reads_as_error() {
    let types = TypeInterner::new();
    assert!(matches!(types.lookup(TypeId(9999)), TypeData::Error { .. }));
}

#[test]
fn test_variance_composition() {
    assert_eq!(Variance::Out.compose(Variance::In), Variance::In);
    assert_eq!(Variance::In.compose(Variance::In), Variance::Out);
    assert_eq!(Variance::In.compose(Variance::Invariant), Variance::Invariant);
    assert_eq!(Variance::Out.opposite(), Variance::In);
}

#[test]
fn test_star_projection_reads_as_out() {
    assert_eq!(TypeProjection::Star.variance(), Variance::Out);
    assert_eq!(TypeProjection::Star.ty(), None);
    assert!(TypeProjection::Star.is_star());
}
