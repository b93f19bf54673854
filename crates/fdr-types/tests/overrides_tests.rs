use super::*;
use crate::builtins::{Builtins, PrimitiveType};
use crate::descriptors::{
    DescriptorOrigin, FunctionDescriptor, FunctionKind, NamespaceDescriptor, NamespaceKind,
    OverrideKind, ValueParameter,
};
use crate::ids::{MemberOwner, TypeParamOwner};
use crate::store::DescriptorStore;
use crate::types::{TypeInterner, Variance};
use fdr_common::names::FqName;

fn setup() -> (DescriptorStore, TypeInterner, Builtins) {
    let mut store = DescriptorStore::new();
    let mut types = TypeInterner::new();
    let root = store.alloc_namespace(NamespaceDescriptor::new(
        FqName::root(),
        NamespaceKind::Root,
        None,
    ));
    let builtins = Builtins::new(&mut store, &mut types, root);
    (store, types, builtins)
}

/// `fun put(value: <param>): <ret>` owned by `Box`, whose parameter `T` is
/// returned alongside.
fn generic_put(
    store: &mut DescriptorStore,
    types: &mut TypeInterner,
    builtins: &Builtins,
) -> (FunctionId, TypeParamId) {
    let t_name = store.intern("T");
    let t = store.alloc_type_param(t_name, 0, Variance::Invariant, TypeParamOwner::Detached);
    store.set_upper_bounds(t, vec![builtins.nullable_any_type]);
    let t_type = types.parameter(t, false);

    let name = store.intern("put");
    let mut function = FunctionDescriptor::new(
        name,
        MemberOwner::Class(builtins.any),
        FunctionKind::Declared,
        DescriptorOrigin::Foreign,
    );
    function.value_params.push(ValueParameter {
        name: store.intern("value"),
        index: 0,
        ty: t_type,
        vararg_element: None,
        has_default: false,
        annotations: Vec::new(),
    });
    function.return_type = builtins.unit_type;
    (store.alloc_function(function), t)
}

#[test]
fn test_substituted_generic_member_needs_bridge() {
    let (mut store, mut types, builtins) = setup();
    let (put, t) = generic_put(&mut store, &mut types, &builtins);
    let string = builtins.string_type;
    let owner_subst = TypeSubstitutor::for_params(&[t], &[string]);

    let mut relations = TypeRelations::new(&store, &mut types, &builtins);
    let sup = relations.substitute_member(put, &owner_subst);
    assert_eq!(sup.value_params, vec![string]);
    assert_eq!(sup.vararg, vec![false]);

    let check = relations.classify_override(
        &MemberShape {
            type_params: &[],
            value_params: &[string],
            return_type: builtins.unit_type,
        },
        &sup,
    );
    assert_eq!(check.kind, OverrideKind::Bridge);
    assert!(check.return_compatible);
}

#[test]
fn test_different_parameter_is_overload() {
    let (mut store, mut types, builtins) = setup();
    let (put, t) = generic_put(&mut store, &mut types, &builtins);
    let string = builtins.string_type;
    let int = types.simple(builtins.primitive(PrimitiveType::Int), false);
    let owner_subst = TypeSubstitutor::for_params(&[t], &[string]);

    let mut relations = TypeRelations::new(&store, &mut types, &builtins);
    let sup = relations.substitute_member(put, &owner_subst);
    let check = relations.classify_override(
        &MemberShape {
            type_params: &[],
            value_params: &[int],
            return_type: builtins.unit_type,
        },
        &sup,
    );
    assert_eq!(check.kind, OverrideKind::Overload);

    let arity = relations.classify_override(
        &MemberShape {
            type_params: &[],
            value_params: &[],
            return_type: builtins.unit_type,
        },
        &sup,
    );
    assert_eq!(arity.kind, OverrideKind::Overload);
}

#[test]
fn test_unbound_generic_member_is_plain_override() {
    let (mut store, mut types, builtins) = setup();
    let (put, t) = generic_put(&mut store, &mut types, &builtins);
    let t_type = types.parameter(t, false);

    let mut relations = TypeRelations::new(&store, &mut types, &builtins);
    let sup = relations.substitute_member(put, &TypeSubstitutor::empty());
    let check = relations.classify_override(
        &MemberShape {
            type_params: &[],
            value_params: &[t_type],
            return_type: builtins.string_type,
        },
        &sup,
    );
    assert_eq!(check.kind, OverrideKind::Override);
    assert!(!check.return_compatible);
}
