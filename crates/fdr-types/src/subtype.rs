//! Subtyping, supertype search and erasure.
//!
//! All three walk the supertype graph of already resolved classes. The
//! graph may contain cycles coming from broken declarations; the walks are
//! bounded by recursion guards and treat a revisited pair as related.

use crate::builtins::Builtins;
use crate::ids::ClassDescId;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::store::DescriptorStore;
use crate::subst::TypeSubstitutor;
use crate::types::{TypeData, TypeId, TypeInterner, TypeProjection, Variance};
use fdr_common::interner::Atom;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tracing::trace;

/// Erased shape of a type, as the foreign runtime sees it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErasedType {
    Class(ClassDescId),
    Array(Box<ErasedType>),
    /// Erasure of an error type; equal only to the same unresolved name.
    Unresolved(Atom),
}

pub struct TypeRelations<'a> {
    pub(crate) store: &'a DescriptorStore,
    pub(crate) types: &'a mut TypeInterner,
    pub(crate) builtins: &'a Builtins,
    guard: RecursionGuard<(TypeId, TypeId)>,
}

impl<'a> TypeRelations<'a> {
    pub fn new(
        store: &'a DescriptorStore,
        types: &'a mut TypeInterner,
        builtins: &'a Builtins,
    ) -> Self {
        Self {
            store,
            types,
            builtins,
            guard: RecursionGuard::with_profile(RecursionProfile::SubtypeCheck),
        }
    }

    pub fn types(&mut self) -> &mut TypeInterner {
        self.types
    }

    // =========================================================================
    // Subtyping
    // =========================================================================

    pub fn is_subtype(&mut self, sub: TypeId, sup: TypeId) -> bool {
        if sub == sup {
            return true;
        }
        match self.guard.enter((sub, sup)) {
            RecursionResult::Entered => {
                let result = self.is_subtype_inner(sub, sup);
                self.guard.leave((sub, sup));
                result
            }
            // Assume related when the same question is already being asked.
            RecursionResult::Cycle => true,
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                trace!(sub = sub.0, sup = sup.0, "subtype check limit exceeded");
                false
            }
        }
    }

    /// Mutual subtyping.
    pub fn is_equivalent(&mut self, a: TypeId, b: TypeId) -> bool {
        a == b || (self.is_subtype(a, b) && self.is_subtype(b, a))
    }

    fn is_subtype_inner(&mut self, sub: TypeId, sup: TypeId) -> bool {
        let sub_data = self.types.lookup(sub).clone();
        let sup_data = self.types.lookup(sup).clone();

        if matches!(sub_data, TypeData::Error { .. }) || matches!(sup_data, TypeData::Error { .. })
        {
            return true;
        }
        if sup == self.builtins.nullable_any_type {
            return true;
        }
        if sub_data.is_nullable() && !sup_data.is_nullable() {
            return false;
        }
        if self.types.class_of(sub) == Some(self.builtins.nothing) {
            return true;
        }

        match (&sub_data, &sup_data) {
            (TypeData::Parameter { param: a, .. }, TypeData::Parameter { param: b, .. })
                if a == b =>
            {
                true
            }
            (TypeData::Parameter { param, .. }, _) => {
                let bounds = self.store.upper_bounds(*param).to_vec();
                bounds.into_iter().any(|bound| {
                    let bound = if sub_data.is_nullable() {
                        self.types.with_nullability(bound, true)
                    } else {
                        bound
                    };
                    self.is_subtype(bound, sup)
                })
            }
            (_, TypeData::Parameter { .. }) => false,
            (TypeData::Class { .. }, TypeData::Class { class: target, .. }) => {
                let sub_non_null = self.types.with_nullability(sub, false);
                let Some(view) = self.find_corresponding_supertype(sub_non_null, *target) else {
                    return false;
                };
                self.arguments_conform(view, sup)
            }
            _ => false,
        }
    }

    /// Both types have the same classifier; compare arguments using the
    /// declared variance of each parameter.
    fn arguments_conform(&mut self, sub: TypeId, sup: TypeId) -> bool {
        let Some(class) = self.types.class_of(sup) else {
            return false;
        };
        let params = self.store.class(class).type_params.clone();
        let sub_args = self.types.args_of(sub).to_vec();
        let sup_args = self.types.args_of(sup).to_vec();
        if sub_args.len() != sup_args.len() {
            // Raw usage on either side
            return sub_args.is_empty() || sup_args.is_empty();
        }
        for ((param, a), b) in params.iter().zip(&sub_args).zip(&sup_args) {
            let declared = self.store.type_param(*param).variance;
            if !self.argument_conforms(declared, *a, *b) {
                return false;
            }
        }
        true
    }

    fn argument_conforms(&mut self, declared: Variance, a: TypeProjection, b: TypeProjection) -> bool {
        let TypeProjection::Type {
            variance: b_kind,
            ty: b_ty,
        } = b
        else {
            return true;
        };
        let TypeProjection::Type {
            variance: a_kind,
            ty: a_ty,
        } = a
        else {
            return false;
        };
        let effective = |kind: Variance| {
            if kind == Variance::Invariant {
                declared
            } else {
                kind
            }
        };
        match effective(b_kind) {
            Variance::Out => effective(a_kind) != Variance::In && self.is_subtype(a_ty, b_ty),
            Variance::In => effective(a_kind) != Variance::Out && self.is_subtype(b_ty, a_ty),
            Variance::Invariant => {
                effective(a_kind) == Variance::Invariant && self.is_equivalent(a_ty, b_ty)
            }
        }
    }

    // =========================================================================
    // Supertype search
    // =========================================================================

    /// The supertype of `ty` whose classifier is `target`, with arguments
    /// expressed in terms of `ty`'s arguments. Breadth-first, so the nearest
    /// path wins when a class is reachable twice.
    pub fn find_corresponding_supertype(
        &mut self,
        ty: TypeId,
        target: ClassDescId,
    ) -> Option<TypeId> {
        let nullable = self.types.is_nullable(ty);
        let start = self.types.with_nullability(ty, false);
        let mut queue = VecDeque::from([start]);
        let mut visited = FxHashSet::default();
        let max = RecursionProfile::SupertypeSearch.max_iterations();
        let mut steps = 0u32;

        while let Some(current) = queue.pop_front() {
            steps += 1;
            if steps > max {
                break;
            }
            let Some(class) = self.types.class_of(current) else {
                continue;
            };
            if class == target {
                return Some(self.types.with_nullability(current, nullable));
            }
            if !visited.insert(class) {
                continue;
            }
            let substitutor = TypeSubstitutor::for_class_type(self.store, self.types, current);
            for &supertype in &self.store.class(class).supertypes {
                let substituted =
                    substitutor.substitute(self.types, supertype, self.builtins.nullable_any_type);
                queue.push_back(substituted);
            }
        }
        None
    }

    /// Classes reachable from `class` through supertypes, nearest first,
    /// excluding `class` itself.
    pub fn all_superclasses(&self, class: ClassDescId) -> Vec<ClassDescId> {
        let mut result = Vec::new();
        let mut visited = FxHashSet::default();
        visited.insert(class);
        let mut queue = VecDeque::from([class]);
        while let Some(current) = queue.pop_front() {
            for &supertype in &self.store.class(current).supertypes {
                if let Some(super_class) = self.types.class_of(supertype)
                    && visited.insert(super_class)
                {
                    result.push(super_class);
                    queue.push_back(super_class);
                }
            }
        }
        result
    }

    // =========================================================================
    // Erasure
    // =========================================================================

    /// Erase a type the way the foreign runtime would: arguments dropped,
    /// type parameters replaced by the erasure of their first bound, and
    /// both sides of a collection pair folded together.
    pub fn erasure(&self, ty: TypeId) -> ErasedType {
        self.erasure_at(ty, 0)
    }

    fn erasure_at(&self, ty: TypeId, depth: u32) -> ErasedType {
        if depth > RecursionProfile::TypeTransform.max_depth() {
            return ErasedType::Class(self.builtins.any);
        }
        match self.types.lookup(ty) {
            TypeData::Class { class, args, .. } => {
                let class = *class;
                if class == self.builtins.array {
                    let element = args
                        .first()
                        .and_then(|a| a.ty())
                        .map(|t| self.erasure_at(t, depth + 1))
                        .unwrap_or(ErasedType::Class(self.builtins.any));
                    return ErasedType::Array(Box::new(element));
                }
                let class = self.builtins.read_only_to_mutable(class).unwrap_or(class);
                ErasedType::Class(class)
            }
            TypeData::Parameter { param, .. } => {
                // Uninitialized placeholders erase like unbounded parameters.
                match self.store.type_param(*param).bounds().and_then(|b| b.first()) {
                    Some(&bound) => self.erasure_at(bound, depth + 1),
                    None => ErasedType::Class(self.builtins.any),
                }
            }
            TypeData::Error { name, .. } => ErasedType::Unresolved(*name),
        }
    }
}

#[cfg(test)]
#[path = "../tests/subtype_tests.rs"]
mod tests;
