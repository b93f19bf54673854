//! Type parameter substitution.

use crate::ids::TypeParamId;
use crate::store::DescriptorStore;
use crate::types::{TypeArgs, TypeData, TypeId, TypeInterner, TypeProjection, Variance};
use fdr_common::limits::MAX_TYPE_TRANSFORM_DEPTH;
use rustc_hash::FxHashMap;

/// Maps type parameters to projections.
#[derive(Clone, Debug, Default)]
pub struct TypeSubstitutor {
    map: FxHashMap<TypeParamId, TypeProjection>,
}

impl TypeSubstitutor {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn insert(&mut self, param: TypeParamId, projection: TypeProjection) {
        self.map.insert(param, projection);
    }

    pub fn get(&self, param: TypeParamId) -> Option<TypeProjection> {
        self.map.get(&param).copied()
    }

    /// Substitutor binding the parameters of `ty`'s classifier to its
    /// arguments. Missing arguments leave their parameter unbound.
    pub fn for_class_type(store: &DescriptorStore, types: &TypeInterner, ty: TypeId) -> Self {
        let mut result = Self::empty();
        if let TypeData::Class { class, args, .. } = types.lookup(ty) {
            for (param, arg) in store.class(*class).type_params.iter().zip(args.iter()) {
                result.insert(*param, *arg);
            }
        }
        result
    }

    /// Bind `from[i]` to the invariant type `to[i]`.
    pub fn for_params(from: &[TypeParamId], to: &[TypeId]) -> Self {
        let mut result = Self::empty();
        for (param, ty) in from.iter().zip(to) {
            result.insert(*param, TypeProjection::invariant(*ty));
        }
        result
    }

    /// Entries of `other` are added, replacing existing bindings.
    pub fn extend(&mut self, other: &TypeSubstitutor) {
        self.map.extend(other.map.iter().map(|(k, v)| (*k, *v)));
    }

    /// Substitute in a top-level position. A parameter bound to a star or
    /// to a projection widens to `star_fallback` or the projected type.
    pub fn substitute(&self, types: &mut TypeInterner, ty: TypeId, star_fallback: TypeId) -> TypeId {
        if self.is_empty() {
            return ty;
        }
        self.substitute_at(types, ty, star_fallback, 0)
    }

    fn substitute_at(
        &self,
        types: &mut TypeInterner,
        ty: TypeId,
        star_fallback: TypeId,
        depth: u32,
    ) -> TypeId {
        if depth > MAX_TYPE_TRANSFORM_DEPTH {
            return TypeId::ERROR;
        }
        match types.lookup(ty).clone() {
            TypeData::Parameter { param, nullable } => match self.get(param) {
                Some(TypeProjection::Type { ty: replacement, .. }) => {
                    if nullable {
                        types.with_nullability(replacement, true)
                    } else {
                        replacement
                    }
                }
                Some(TypeProjection::Star) => {
                    let fallback = star_fallback;
                    if nullable {
                        types.with_nullability(fallback, true)
                    } else {
                        fallback
                    }
                }
                None => ty,
            },
            TypeData::Class {
                class,
                args,
                nullable,
            } => {
                let new_args: TypeArgs = args
                    .iter()
                    .map(|arg| self.substitute_projection(types, *arg, star_fallback, depth + 1))
                    .collect();
                if new_args == args {
                    return ty;
                }
                types.intern(TypeData::Class {
                    class,
                    args: new_args,
                    nullable,
                })
            }
            TypeData::Error { .. } => ty,
        }
    }

    fn substitute_projection(
        &self,
        types: &mut TypeInterner,
        projection: TypeProjection,
        star_fallback: TypeId,
        depth: u32,
    ) -> TypeProjection {
        let TypeProjection::Type { variance, ty } = projection else {
            return projection;
        };
        // A bare parameter argument takes over the bound projection kind.
        if let TypeData::Parameter { param, nullable } = types.lookup(ty).clone()
            && let Some(bound) = self.get(param)
        {
            return match bound {
                TypeProjection::Star => TypeProjection::Star,
                TypeProjection::Type {
                    variance: inner,
                    ty: replacement,
                } => {
                    let replacement = if nullable {
                        types.with_nullability(replacement, true)
                    } else {
                        replacement
                    };
                    let combined = match (variance, inner) {
                        (Variance::Invariant, v) | (v, Variance::Invariant) => v,
                        (a, b) if a == b => a,
                        // `in` of `out X`: nothing can be written
                        _ => return TypeProjection::Star,
                    };
                    TypeProjection::Type {
                        variance: combined,
                        ty: replacement,
                    }
                }
            };
        }
        TypeProjection::Type {
            variance,
            ty: self.substitute_at(types, ty, star_fallback, depth),
        }
    }
}

#[cfg(test)]
#[path = "../tests/subst_tests.rs"]
mod tests;
