//! Signature propagation from overridden super members.
//!
//! A foreign method knows only its own raw signature. When it overrides
//! members of supertypes, its types are narrowed to agree with theirs:
//! nullability, collection mutability, argument projections, vararg-ness
//! and the bounds of its own type parameters.

use super::SignatureData;
use super::overrides::SuperFunction;
use crate::context::ForeignResolver;
use fdr_common::diagnostics::diagnostic_messages;
use fdr_common::limits::MAX_TYPE_TRANSFORM_DEPTH;
use fdr_types::{
    ClassDescId, FunctionId, SignatureSource, TypeData, TypeId, TypeParamId, TypeProjection,
    TypeSubstitutor, ValueParameter, Variance,
};
use tracing::debug;

/// Where a propagated type occurs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Position {
    /// Parameter or return type of the member itself.
    Member,
    TypeArgument,
    UpperBound,
}

impl ForeignResolver<'_> {
    pub(crate) fn propagate_signature(
        &mut self,
        function: FunctionId,
        mut data: SignatureData,
        supers: &[&SuperFunction],
    ) -> SignatureData {
        let mut errors = Vec::new();
        let fallback = self.builtins.nullable_any_type;

        // Method type parameters of each super member, renamed to ours by
        // position.
        let ours: Vec<TypeId> = data
            .type_params
            .iter()
            .map(|&p| self.types.parameter(p, false))
            .collect();
        let method_substs: Vec<TypeSubstitutor> = supers
            .iter()
            .map(|sup| TypeSubstitutor::for_params(&sup.member.type_params, &ours))
            .collect();

        if supers
            .iter()
            .any(|sup| sup.member.type_params.len() != data.type_params.len())
        {
            errors.push("Incompatible number of type parameters in super methods".to_string());
        } else {
            self.propagate_type_parameters(&data.type_params, supers, &method_substs, &mut errors);
        }

        for (index, param) in data.value_params.iter_mut().enumerate() {
            let mut from_super = Vec::with_capacity(supers.len());
            for (sup, method_subst) in supers.iter().zip(&method_substs) {
                if let Some(&ty) = sup.member.value_params.get(index) {
                    let ty = method_subst.substitute(&mut self.types, ty, fallback);
                    from_super.push((ty, Variance::Invariant));
                }
            }
            param.ty = self.modify_type(param.ty, &from_super, Position::Member, &mut errors, 0);
            self.propagate_vararg(param, index, supers, &mut errors);
        }

        let mut returns = Vec::with_capacity(supers.len());
        for (sup, method_subst) in supers.iter().zip(&method_substs) {
            let ty = method_subst.substitute(&mut self.types, sup.member.return_type, fallback);
            returns.push((ty, Variance::Out));
        }
        data.return_type = self.modify_type(data.return_type, &returns, Position::Member, &mut errors, 0);

        if !errors.is_empty() {
            let subject = self.function_subject(function);
            let joined = errors.join("; ");
            self.diagnostics.report(
                &diagnostic_messages::PROPAGATED_SIGNATURE_ERROR,
                &subject,
                &[&subject, &joined],
            );
            data.errors.extend(errors);
        }
        data.source = SignatureSource::Propagated;
        debug!(function = function.0, supers = supers.len(), "signature propagated");
        data
    }

    fn propagate_type_parameters(
        &mut self,
        params: &[TypeParamId],
        supers: &[&SuperFunction],
        method_substs: &[TypeSubstitutor],
        errors: &mut Vec<String>,
    ) {
        let fallback = self.builtins.nullable_any_type;
        for (index, &param) in params.iter().enumerate() {
            let Some(auto_bounds) = self.store.type_param(param).bounds().map(<[TypeId]>::to_vec) else {
                continue;
            };
            let mut per_bound: Vec<Vec<(TypeId, Variance)>> = vec![Vec::new(); auto_bounds.len()];
            for (sup, method_subst) in supers.iter().zip(method_substs) {
                let Some(&super_param) = sup.member.type_params.get(index) else {
                    continue;
                };
                let Some(super_bounds) = self.store.type_param(super_param).bounds().map(<[TypeId]>::to_vec)
                else {
                    continue;
                };
                if super_bounds.len() != auto_bounds.len() {
                    continue;
                }
                let mut subst = sup.subst.clone();
                subst.extend(method_subst);
                for (slot, bound) in per_bound.iter_mut().zip(super_bounds) {
                    slot.push((subst.substitute(&mut self.types, bound, fallback), Variance::Invariant));
                }
            }
            let narrowed: Vec<TypeId> = auto_bounds
                .iter()
                .zip(&per_bound)
                .map(|(&bound, from_super)| {
                    self.modify_type(bound, from_super, Position::UpperBound, errors, 0)
                })
                .collect();
            if narrowed != auto_bounds {
                self.store.replace_upper_bounds(param, narrowed);
            }
        }
    }

    fn propagate_vararg(
        &mut self,
        param: &mut ValueParameter,
        index: usize,
        supers: &[&SuperFunction],
        errors: &mut Vec<String>,
    ) {
        let mut some_vararg = false;
        let mut some_not_vararg = false;
        for sup in supers {
            match sup.member.vararg.get(index) {
                Some(true) => some_vararg = true,
                Some(false) => some_not_vararg = true,
                None => {}
            }
        }
        if some_vararg && some_not_vararg {
            errors.push("Incompatible super methods: some have vararg parameter, some have not".to_string());
        } else if some_vararg && param.vararg_element.is_none() {
            param.vararg_element = self.array_element_type(param.ty);
        } else if some_not_vararg && param.vararg_element.is_some() {
            param.vararg_element = None;
        }
    }

    // =========================================================================
    // Type narrowing
    // =========================================================================

    fn modify_type(
        &mut self,
        auto: TypeId,
        from_super: &[(TypeId, Variance)],
        position: Position,
        errors: &mut Vec<String>,
        depth: u32,
    ) -> TypeId {
        if from_super.is_empty() || depth > MAX_TYPE_TRANSFORM_DEPTH || self.types.is_error(auto) {
            return auto;
        }
        let nullable = self.must_be_nullable(auto, from_super, position, errors);
        match self.types.lookup(auto).clone() {
            TypeData::Class { class, args, .. } => {
                let classifier = self.modify_classifier(class, from_super, errors);
                let args = self.modify_arguments(classifier, &args, from_super, errors, depth);
                self.types.class_type(classifier, args, nullable)
            }
            _ => self.types.with_nullability(auto, nullable),
        }
    }

    fn must_be_nullable(
        &mut self,
        auto: TypeId,
        from_super: &[(TypeId, Variance)],
        position: Position,
        errors: &mut Vec<String>,
    ) -> bool {
        let mut some_not_null = false;
        let mut some_covariant_nullable = false;
        let mut some_not_covariant_nullable = false;
        for &(ty, variance) in from_super {
            if !self.types.is_nullable(ty) {
                some_not_null = true;
            } else if variance == Variance::Out {
                some_covariant_nullable = true;
            } else {
                some_not_covariant_nullable = true;
            }
        }
        let auto_nullable = self.types.is_nullable(auto);

        if some_not_null && some_not_covariant_nullable {
            errors.push(format!(
                "Incompatible types in superclasses: {}",
                self.describe(from_super)
            ));
            return auto_nullable;
        }
        if some_not_null {
            return false;
        }
        if some_not_covariant_nullable || some_covariant_nullable {
            let annotated_not_null = position != Position::TypeArgument && !auto_nullable;
            if annotated_not_null && some_not_covariant_nullable {
                errors.push(format!(
                    "In superclass type is nullable: {}, in subclass it is not: {}",
                    self.describe(from_super),
                    self.formatter().format(auto)
                ));
                return true;
            }
            return !annotated_not_null;
        }
        auto_nullable
    }

    /// Pick the read-only or mutable variant of a collection classifier to
    /// agree with the supers.
    fn modify_classifier(
        &mut self,
        class: ClassDescId,
        from_super: &[(TypeId, Variance)],
        errors: &mut Vec<String>,
    ) -> ClassDescId {
        let builtins = &self.builtins;
        if !builtins.is_read_only_collection(class) && !builtins.is_mutable_collection(class) {
            return class;
        }
        let mut some_mutable = false;
        let mut some_read_only = false;
        for &(ty, _) in from_super {
            let Some(super_class) = self.types.class_of(ty) else {
                continue;
            };
            some_mutable |= builtins.is_mutable_collection(super_class);
            some_read_only |= builtins.is_read_only_collection(super_class);
        }
        if some_mutable && some_read_only {
            errors.push(format!(
                "Incompatible types in superclasses: {}",
                self.describe(from_super)
            ));
            return class;
        }
        if some_mutable {
            return self.builtins.read_only_to_mutable(class).unwrap_or(class);
        }
        if some_read_only {
            return self.builtins.mutable_to_read_only(class).unwrap_or(class);
        }
        class
    }

    fn modify_arguments(
        &mut self,
        classifier: ClassDescId,
        auto_args: &[TypeProjection],
        from_super: &[(TypeId, Variance)],
        errors: &mut Vec<String>,
        depth: u32,
    ) -> Vec<TypeProjection> {
        let params = self.store.class(classifier).type_params.clone();
        if auto_args.len() != params.len() {
            return auto_args.to_vec();
        }
        let default = self.default_type(classifier);
        let mut collected: Vec<Vec<(TypeProjection, Variance)>> = vec![Vec::new(); params.len()];
        for &(super_type, position) in from_super {
            let Some(super_class) = self.types.class_of(super_type) else {
                continue;
            };
            let Some(view) = self.relations().find_corresponding_supertype(default, super_class) else {
                continue;
            };
            let view_args = self.types.args_of(view).to_vec();
            let super_args = self.types.args_of(super_type).to_vec();
            for (view_arg, &super_arg) in view_args.iter().zip(&super_args) {
                let Some(param) = view_arg.ty().and_then(|t| self.types.param_of(t)) else {
                    continue;
                };
                if let Some(index) = params.iter().position(|&p| p == param) {
                    collected[index].push((super_arg, position));
                }
            }
        }
        auto_args
            .iter()
            .zip(&params)
            .zip(&collected)
            .map(|((&arg, &param), from_super)| {
                self.modify_argument(arg, param, from_super, errors, depth)
            })
            .collect()
    }

    fn modify_argument(
        &mut self,
        arg: TypeProjection,
        param: TypeParamId,
        from_super: &[(TypeProjection, Variance)],
        errors: &mut Vec<String>,
        depth: u32,
    ) -> TypeProjection {
        let TypeProjection::Type { variance: kind, ty } = arg else {
            return arg;
        };
        if from_super.is_empty() {
            return arg;
        }
        let declared = self.store.type_param(param).variance;
        let mut super_types = Vec::with_capacity(from_super.len());
        let mut kinds: Vec<Variance> = Vec::new();
        for &(projection, position) in from_super {
            let (super_ty, super_kind) = match projection {
                TypeProjection::Star => (self.builtins.nullable_any_type, Variance::Out),
                TypeProjection::Type { variance, ty } => (ty, variance),
            };
            let effective = if super_kind == Variance::Invariant {
                declared
            } else {
                super_kind
            };
            super_types.push((super_ty, position.compose(effective)));
            if !kinds.contains(&super_kind) {
                kinds.push(super_kind);
            }
        }
        let ty = self.modify_type(ty, &super_types, Position::TypeArgument, errors, depth + 1);

        let kind = match kinds.as_slice() {
            [only] if kind == Variance::Invariant || kind == *only => *only,
            _ => {
                errors.push(format!(
                    "Incompatible projection kinds in type arguments of super methods' return types: {}, defined in current: {}",
                    self.describe(&super_types),
                    self.formatter().format(ty)
                ));
                kind
            }
        };
        let kind = if kind == declared { Variance::Invariant } else { kind };
        TypeProjection::Type { variance: kind, ty }
    }

    fn describe(&self, types: &[(TypeId, Variance)]) -> String {
        let formatter = self.formatter();
        let rendered: Vec<String> = types.iter().map(|&(ty, _)| formatter.format(ty)).collect();
        format!("[{}]", rendered.join(", "))
    }
}
