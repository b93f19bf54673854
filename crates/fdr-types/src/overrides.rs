//! Override classification between a member and a same-named super member.
//!
//! ```text
//! substituted shapes equal?  ── no ──▶ Overload
//!          │ yes
//! erased shapes equal?       ── no ──▶ Bridge
//!          │ yes
//!       Override
//! ```

use crate::descriptors::OverrideKind;
use crate::ids::{FunctionId, TypeParamId};
use crate::subst::TypeSubstitutor;
use crate::subtype::TypeRelations;
use crate::types::{TypeId, TypeProjection};

/// The parts of a member signature override matching looks at.
#[derive(Clone, Debug)]
pub struct MemberShape<'s> {
    pub type_params: &'s [TypeParamId],
    pub value_params: &'s [TypeId],
    pub return_type: TypeId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverrideCheck {
    pub kind: OverrideKind,
    /// Return type is a subtype of the substituted super return type.
    /// Meaningless for overloads.
    pub return_compatible: bool,
}

/// A super member expressed in the frame of the overriding class.
#[derive(Clone, Debug)]
pub struct SubstitutedMember {
    pub function: FunctionId,
    pub value_params: Vec<TypeId>,
    pub vararg: Vec<bool>,
    pub return_type: TypeId,
    pub type_params: Vec<TypeParamId>,
    /// Parameter types before substitution, for erased-shape comparison.
    pub raw_value_params: Vec<TypeId>,
}

impl TypeRelations<'_> {
    /// Express `function` (a member of a supertype) in the frame described by
    /// `owner_subst`, which binds the supertype's class parameters.
    pub fn substitute_member(
        &mut self,
        function: FunctionId,
        owner_subst: &TypeSubstitutor,
    ) -> SubstitutedMember {
        let descriptor = self.store.function(function);
        let fallback = self.builtins.nullable_any_type;
        let raw_value_params: Vec<TypeId> = descriptor.value_params.iter().map(|p| p.ty).collect();
        let vararg = descriptor
            .value_params
            .iter()
            .map(|p| p.vararg_element.is_some())
            .collect();
        let type_params = descriptor.type_params.clone();
        let return_type = descriptor.return_type;
        let value_params = raw_value_params
            .iter()
            .map(|&ty| owner_subst.substitute(self.types, ty, fallback))
            .collect();
        let return_type = owner_subst.substitute(self.types, return_type, fallback);
        SubstitutedMember {
            function,
            value_params,
            vararg,
            return_type,
            type_params,
            raw_value_params,
        }
    }

    /// Classify `sub` against the substituted super member `sup`.
    pub fn classify_override(&mut self, sub: &MemberShape<'_>, sup: &SubstitutedMember) -> OverrideCheck {
        let overload = OverrideCheck {
            kind: OverrideKind::Overload,
            return_compatible: true,
        };
        if sub.value_params.len() != sup.value_params.len()
            || sub.type_params.len() != sup.type_params.len()
        {
            return overload;
        }

        // Method type parameters correspond by position.
        let mut method_subst = TypeSubstitutor::empty();
        let sub_param_types: Vec<TypeId> = sub
            .type_params
            .iter()
            .map(|&p| self.types.parameter(p, false))
            .collect();
        for (param, ty) in sup.type_params.iter().zip(&sub_param_types) {
            method_subst.insert(*param, TypeProjection::invariant(*ty));
        }
        let fallback = self.builtins.nullable_any_type;

        let mut substituted_match = true;
        for (&sub_ty, &sup_ty) in sub.value_params.iter().zip(&sup.value_params) {
            let sup_ty = method_subst.substitute(self.types, sup_ty, fallback);
            if self.erasure(sub_ty) != self.erasure(sup_ty) {
                substituted_match = false;
                break;
            }
        }
        if !substituted_match {
            return overload;
        }

        let erased_match = sub
            .value_params
            .iter()
            .zip(&sup.raw_value_params)
            .all(|(&a, &b)| self.erasure(a) == self.erasure(b));

        let sup_return = method_subst.substitute(self.types, sup.return_type, fallback);
        let return_compatible = self.is_subtype(sub.return_type, sup_return);

        OverrideCheck {
            kind: if erased_match {
                OverrideKind::Override
            } else {
                OverrideKind::Bridge
            },
            return_compatible,
        }
    }
}

#[cfg(test)]
#[path = "../tests/overrides_tests.rs"]
mod tests;
