//! Override binding and fake overrides.

use crate::context::ForeignResolver;
use fdr_common::diagnostics::diagnostic_messages;
use fdr_common::interner::Atom;
use fdr_types::{
    ClassDescId, DescriptorOrigin, ErasedType, FunctionDescriptor, FunctionId, FunctionKind,
    MemberOwner, MemberShape, OverrideCheck, OverrideKind, PropertyDescriptor, PropertyId,
    PropertyKind, SubstitutedMember, TypeRelations, TypeSubstitutor, ValueParameter, Visibility,
};
use tracing::trace;

/// A same-named function of a direct supertype, expressed in the frame of
/// the subclass.
#[derive(Clone, Debug)]
pub(crate) struct SuperFunction {
    pub member: SubstitutedMember,
    /// Binds the super class's type parameters.
    pub subst: TypeSubstitutor,
    pub visibility: Visibility,
}

impl ForeignResolver<'_> {
    pub(crate) fn relations(&mut self) -> TypeRelations<'_> {
        TypeRelations::new(&self.store, &mut self.types, &self.builtins)
    }

    /// Functions named `name` in every direct supertype of `class`.
    pub(crate) fn super_functions(&mut self, class: ClassDescId, name: Atom) -> Vec<SuperFunction> {
        let supertypes = self.store.class(class).supertypes.clone();
        let mut result = Vec::new();
        for supertype in supertypes {
            let Some(super_class) = self.types.class_of(supertype) else {
                continue;
            };
            let functions = self.class_functions(super_class, name);
            let subst = TypeSubstitutor::for_class_type(&self.store, &self.types, supertype);
            for function in functions {
                let visibility = self.store.function(function).visibility;
                let member = self.relations().substitute_member(function, &subst);
                result.push(SuperFunction {
                    member,
                    subst: subst.clone(),
                    visibility,
                });
            }
        }
        result
    }

    pub(crate) fn classify_against(&mut self, function: FunctionId, sup: &SuperFunction) -> OverrideCheck {
        let data = self.signature_of(function);
        let value_params = data.value_param_types();
        let shape = MemberShape {
            type_params: &data.type_params,
            value_params: &value_params,
            return_type: data.return_type,
        };
        self.relations().classify_override(&shape, &sup.member)
    }

    pub(crate) fn overrides_super(&mut self, function: FunctionId, sup: &SuperFunction) -> bool {
        self.classify_against(function, sup).kind != OverrideKind::Overload
    }

    /// Record which super members `function` overrides. An incompatible
    /// return type becomes a signature error.
    pub(crate) fn bind_overrides(&mut self, function: FunctionId, supers: &[SuperFunction]) {
        let mut overridden = Vec::new();
        let mut errors = Vec::new();
        for sup in supers {
            if sup.visibility == Visibility::Private {
                continue;
            }
            let check = self.classify_against(function, sup);
            if check.kind == OverrideKind::Overload {
                continue;
            }
            overridden.push((sup.member.function, check.kind));
            if !check.return_compatible {
                let super_return = self.formatter().format(sup.member.return_type);
                let subject = self.function_subject(function);
                errors.push(format!(
                    "return type is not a subtype of the overridden return type {super_return}"
                ));
                self.diagnostics.report(
                    &diagnostic_messages::INCOMPATIBLE_OVERRIDE_RETURN,
                    &subject,
                    &[&subject, &super_return],
                );
            }
        }
        let descriptor = self.store.function_mut(function);
        descriptor.overridden = overridden;
        descriptor.signature_errors.extend(errors);
    }

    /// Inherited members not overridden by any of `declared`. Supers reached
    /// through several paths collapse to one fake override per erased shape.
    pub(crate) fn fake_overrides(
        &mut self,
        class: ClassDescId,
        declared: &[FunctionId],
        supers: &[SuperFunction],
    ) -> Vec<FunctionId> {
        let mut seen: Vec<Vec<ErasedType>> = Vec::new();
        let mut result = Vec::new();
        for sup in supers {
            if sup.visibility == Visibility::Private {
                continue;
            }
            if declared.iter().any(|&d| self.overrides_super(d, sup)) {
                continue;
            }
            let erased: Vec<ErasedType> = {
                let relations = self.relations();
                sup.member
                    .value_params
                    .iter()
                    .map(|&ty| relations.erasure(ty))
                    .collect()
            };
            if seen.contains(&erased) {
                continue;
            }
            seen.push(erased);
            result.push(self.create_fake_override(class, sup));
        }
        result
    }

    fn create_fake_override(&mut self, class: ClassDescId, sup: &SuperFunction) -> FunctionId {
        let inherited = self.store.function(sup.member.function).clone();
        let fallback = self.builtins.nullable_any_type;
        let value_params: Vec<ValueParameter> = inherited
            .value_params
            .iter()
            .zip(&sup.member.value_params)
            .map(|(param, &ty)| ValueParameter {
                ty,
                vararg_element: param
                    .vararg_element
                    .map(|element| sup.subst.substitute(&mut self.types, element, fallback)),
                ..param.clone()
            })
            .collect();
        let original = match inherited.kind {
            FunctionKind::FakeOverride => inherited.original.unwrap_or(sup.member.function),
            _ => sup.member.function,
        };
        let mut fake = FunctionDescriptor::new(
            inherited.name,
            MemberOwner::Class(class),
            FunctionKind::FakeOverride,
            DescriptorOrigin::Synthesized,
        );
        fake.type_params = inherited.type_params;
        fake.value_params = value_params;
        fake.return_type = sup.member.return_type;
        fake.modality = inherited.modality;
        fake.visibility = inherited.visibility;
        fake.original = Some(original);
        fake.overridden = vec![(sup.member.function, OverrideKind::Override)];
        fake.annotations = inherited.annotations;
        fake.signature_source = inherited.signature_source;
        let id = self.store.alloc_function(fake);
        trace!(class = class.0, function = id.0, "fake override created");
        id
    }

    /// Fake override of the first visible same-named property among the
    /// direct supertypes of `class`.
    pub(crate) fn inherited_property(&mut self, class: ClassDescId, name: Atom) -> Option<PropertyId> {
        let supertypes = self.store.class(class).supertypes.clone();
        for supertype in supertypes {
            let Some(super_class) = self.types.class_of(supertype) else {
                continue;
            };
            let candidates = self.class_properties(super_class, name);
            let Some(&inherited_id) = candidates
                .iter()
                .find(|&&p| self.store.property(p).visibility != Visibility::Private)
            else {
                continue;
            };
            let subst = TypeSubstitutor::for_class_type(&self.store, &self.types, supertype);
            let inherited = self.store.property(inherited_id).clone();
            let ty = subst.substitute(&mut self.types, inherited.ty, self.builtins.nullable_any_type);
            let mut fake = PropertyDescriptor::new(
                inherited.name,
                MemberOwner::Class(class),
                PropertyKind::FakeOverride,
                DescriptorOrigin::Synthesized,
            );
            fake.ty = ty;
            fake.is_var = inherited.is_var;
            fake.modality = inherited.modality;
            fake.visibility = inherited.visibility;
            fake.overridden = vec![inherited_id];
            fake.original = Some(inherited.original.unwrap_or(inherited_id));
            fake.annotations = inherited.annotations;
            fake.signature_source = inherited.signature_source;
            return Some(self.store.alloc_property(fake));
        }
        None
    }
}

