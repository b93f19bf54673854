//! Two-phase type parameter resolution.
//!
//! Phase one allocates placeholders for every parameter of a declaration so
//! that bounds may mention any sibling (`<K extends Comparable<V>, V>`) or
//! the declaration itself. Phase two resolves the bounds in a scope that
//! already contains all placeholders.

use super::{TypeFlags, TypeUsage, TypeVariableResolver};
use crate::context::ForeignResolver;
use fdr_source::RawTypeParameter;
use fdr_types::{TypeData, TypeId, TypeInterner, TypeParamId, TypeParamOwner, Variance};

impl ForeignResolver<'_> {
    /// Phase one. Foreign type parameters carry no declaration-site variance.
    pub(crate) fn alloc_type_parameters(
        &mut self,
        raw: &[RawTypeParameter],
        owner: TypeParamOwner,
    ) -> Vec<TypeParamId> {
        raw.iter()
            .enumerate()
            .map(|(index, param)| {
                let name = self.store.intern(&param.name);
                self.store
                    .alloc_type_param(name, index as u32, Variance::Invariant, owner)
            })
            .collect()
    }

    /// Phase two. `scope` must already contain `params`.
    pub(crate) fn resolve_type_parameter_bounds(
        &mut self,
        raw: &[RawTypeParameter],
        params: &[TypeParamId],
        scope: &TypeVariableResolver,
    ) {
        for (raw_param, &param) in raw.iter().zip(params) {
            let mut bounds = Vec::with_capacity(raw_param.bounds.len());
            for bound in &raw_param.bounds {
                let ty = self.transform_type(bound, TypeUsage::UpperBound, TypeFlags::empty(), scope);
                // An explicit `Object` bound is the same as no bound at all.
                if ty == self.builtins.any_type {
                    continue;
                }
                if !bounds.contains(&ty) {
                    bounds.push(ty);
                }
            }
            if bounds.is_empty() {
                bounds.push(self.builtins.nullable_any_type);
            }
            self.store.set_upper_bounds(param, bounds);
        }
    }
}

/// Whether `ty` mentions `param` anywhere in its structure.
pub(crate) fn mentions_param(types: &TypeInterner, ty: TypeId, param: TypeParamId) -> bool {
    fn walk(types: &TypeInterner, ty: TypeId, param: TypeParamId, depth: u32) -> bool {
        if depth > fdr_common::limits::MAX_TYPE_TRANSFORM_DEPTH {
            return false;
        }
        match types.lookup(ty) {
            TypeData::Parameter { param: p, .. } => *p == param,
            TypeData::Class { args, .. } => args
                .iter()
                .filter_map(|a| a.ty())
                .any(|t| walk(types, t, param, depth + 1)),
            TypeData::Error { .. } => false,
        }
    }
    walk(types, ty, param, 0)
}
