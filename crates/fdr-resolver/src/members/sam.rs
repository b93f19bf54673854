//! Single-abstract-method interfaces: SAM constructors and SAM adapters.

use crate::context::ForeignResolver;
use fdr_common::interner::Atom;
use fdr_common::names::translate_foreign_name;
use fdr_source::{Modifiers, RawClass};
use fdr_types::{
    ClassDescId, ClassKind, DescriptorOrigin, ErasedType, FunctionDescriptor, FunctionId,
    FunctionKind, MemberOwner, Modality, NamespaceId, TypeId, TypeParamOwner, TypeProjection,
    TypeSubstitutor, ValueParameter, Variance, is_object_public_method,
};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::{debug, trace};

/// An abstract method found while scanning an interface hierarchy.
struct AbstractMethod {
    name: String,
    descriptor: String,
    generic: bool,
}

impl ForeignResolver<'_> {
    /// Whether `class` is a foreign interface with exactly one abstract
    /// method, which must not be generic.
    pub fn is_sam_interface(&mut self, class: ClassDescId) -> bool {
        self.sam_method_name(class).is_some()
    }

    fn sam_method_name(&mut self, class: ClassDescId) -> Option<Atom> {
        if let Some(&known) = self.members.sam_methods.get(&class) {
            return known;
        }
        let result = self.compute_sam_method_name(class);
        self.members.sam_methods.insert(class, result);
        result
    }

    fn compute_sam_method_name(&mut self, class: ClassDescId) -> Option<Atom> {
        let descriptor = self.store.class(class);
        if descriptor.kind != ClassKind::Interface || !descriptor.has_lazy_members() {
            return None;
        }
        let raw = self.raw_classes.get(&class).cloned()?;
        let mut found = Vec::new();
        let mut visited = FxHashSet::default();
        self.collect_abstract_methods(&raw, &mut found, &mut visited);
        match found.as_slice() {
            [only] if !only.generic => Some(self.store.intern(&only.name)),
            _ => None,
        }
    }

    fn collect_abstract_methods(
        &mut self,
        raw: &Arc<RawClass>,
        found: &mut Vec<AbstractMethod>,
        visited: &mut FxHashSet<String>,
    ) {
        if !visited.insert(raw.name.clone()) {
            return;
        }
        for method in &raw.methods {
            if !method.modifiers.contains(Modifiers::ABSTRACT)
                || method.is_static()
                || is_object_public_method(&method.name, &method.descriptor)
            {
                continue;
            }
            if found
                .iter()
                .any(|m| m.name == method.name && m.descriptor == method.descriptor)
            {
                continue;
            }
            let generic = method
                .method_signature()
                .map(|s| !s.type_parameters.is_empty())
                .unwrap_or(false);
            found.push(AbstractMethod {
                name: method.name.clone(),
                descriptor: method.descriptor.clone(),
                generic,
            });
        }
        for interface in &raw.interfaces {
            if let Some(super_raw) = self.find_raw_class(&translate_foreign_name(interface)) {
                self.collect_abstract_methods(&super_raw, found, visited);
            }
        }
    }

    /// The function descriptor of the single abstract method.
    pub(crate) fn sam_function(&mut self, class: ClassDescId) -> Option<FunctionId> {
        let name = self.sam_method_name(class)?;
        let candidates = self.class_functions(class, name);
        candidates
            .iter()
            .copied()
            .find(|&f| self.store.function(f).modality == Modality::Abstract)
            .or_else(|| candidates.first().copied())
    }

    /// `FunctionN<P1, ..., R>` matching the abstract method of a SAM type,
    /// keeping the SAM type's nullability.
    pub(crate) fn function_type_of_sam(&mut self, sam_type: TypeId) -> Option<TypeId> {
        let class = self.types.class_of(sam_type)?;
        let function = self.sam_function(class)?;
        let subst = TypeSubstitutor::for_class_type(&self.store, &self.types, sam_type);
        let fallback = self.builtins.nullable_any_type;
        let descriptor = self.store.function(function);
        let params: Vec<TypeId> = descriptor.value_params.iter().map(|p| p.ty).collect();
        let return_type = descriptor.return_type;

        let mut arguments = Vec::with_capacity(params.len() + 1);
        for ty in params {
            arguments.push(TypeProjection::invariant(subst.substitute(&mut self.types, ty, fallback)));
        }
        arguments.push(TypeProjection::invariant(subst.substitute(
            &mut self.types,
            return_type,
            fallback,
        )));
        let function_class =
            self.builtins
                .function_class(&mut self.store, &mut self.types, arguments.len() - 1)?;
        let nullable = self.types.is_nullable(sam_type);
        Some(self.types.class_type(function_class, arguments, nullable))
    }

    // =========================================================================
    // SAM constructors
    // =========================================================================

    /// `fun <T...> Name(function: FunctionN<...>): Name<T...>`, a static
    /// function of `namespace`.
    pub(crate) fn sam_constructor(&mut self, interface: ClassDescId, namespace: NamespaceId) -> Option<FunctionId> {
        if let Some(&id) = self.members.sam_constructors.get(&interface) {
            return Some(id);
        }
        if !self.is_sam_interface(interface) {
            return None;
        }
        let descriptor = self.store.class(interface);
        let name = descriptor.name;
        let interface_params = descriptor.type_params.clone();

        let own_params: Vec<_> = interface_params
            .iter()
            .enumerate()
            .map(|(index, &param)| {
                let name = self.store.type_param(param).name;
                self.store.alloc_type_param(
                    name,
                    index as u32,
                    Variance::Invariant,
                    TypeParamOwner::Detached,
                )
            })
            .collect();
        let own_types: Vec<TypeId> = own_params
            .iter()
            .map(|&p| self.types.parameter(p, false))
            .collect();
        let subst = TypeSubstitutor::for_params(&interface_params, &own_types);
        for (&old, &new) in interface_params.iter().zip(&own_params) {
            let bounds = self.store.upper_bounds(old).to_vec();
            let bounds = bounds
                .into_iter()
                .map(|b| subst.substitute(&mut self.types, b, self.builtins.nullable_any_type))
                .collect();
            self.store.set_upper_bounds(new, bounds);
        }

        let interface_type = self.types.class_type(
            interface,
            own_types.iter().map(|&t| TypeProjection::invariant(t)),
            false,
        );
        let function_type = self.function_type_of_sam(interface_type)?;

        let mut constructor = FunctionDescriptor::new(
            name,
            MemberOwner::Namespace(namespace),
            FunctionKind::SamConstructor,
            DescriptorOrigin::Synthesized,
        );
        constructor.is_static = true;
        constructor.type_params = own_params.clone();
        constructor.value_params = vec![ValueParameter {
            name: self.store.intern("function"),
            index: 0,
            ty: function_type,
            vararg_element: None,
            has_default: false,
            annotations: Vec::new(),
        }];
        constructor.return_type = interface_type;
        let id = self.store.alloc_function(constructor);
        for param in own_params {
            self.store.set_type_param_owner(param, TypeParamOwner::Function(id));
        }
        self.members.sam_constructors.insert(interface, id);
        debug!(interface = interface.0, function = id.0, "SAM constructor created");
        Some(id)
    }

    // =========================================================================
    // SAM adapters
    // =========================================================================

    /// Copies of `functions` taking function types in place of SAM
    /// parameters. An adapter is skipped when its erased shape clashes with
    /// a function already present.
    pub(crate) fn sam_adapters(&mut self, class: ClassDescId, functions: &[FunctionId]) -> Vec<FunctionId> {
        let mut shapes: Vec<Vec<ErasedType>> = functions
            .iter()
            .map(|&f| {
                let params = self.store.function(f).value_params.clone();
                self.erased_params(&params)
            })
            .collect();
        let mut result = Vec::new();
        for &function in functions {
            let descriptor = self.store.function(function).clone();
            if descriptor.is_static
                || !matches!(descriptor.kind, FunctionKind::Declared | FunctionKind::FakeOverride)
            {
                continue;
            }
            let mut changed = false;
            let mut value_params = Vec::with_capacity(descriptor.value_params.len());
            for param in &descriptor.value_params {
                let replacement = match self.types.class_of(param.ty) {
                    Some(param_class) if self.is_sam_interface(param_class) => {
                        self.function_type_of_sam(param.ty)
                    }
                    _ => None,
                };
                match replacement {
                    Some(ty) => {
                        changed = true;
                        value_params.push(ValueParameter { ty, ..param.clone() });
                    }
                    None => value_params.push(param.clone()),
                }
            }
            if !changed {
                continue;
            }
            let shape = self.erased_params(&value_params);
            if shapes.contains(&shape) {
                trace!(function = function.0, "SAM adapter clashes with an existing function");
                continue;
            }
            shapes.push(shape);

            let mut adapter = FunctionDescriptor::new(
                descriptor.name,
                MemberOwner::Class(class),
                FunctionKind::SamAdapter,
                DescriptorOrigin::Synthesized,
            );
            adapter.type_params = descriptor.type_params;
            adapter.value_params = value_params;
            adapter.return_type = descriptor.return_type;
            adapter.modality = Modality::Final;
            adapter.visibility = descriptor.visibility;
            adapter.original = Some(function);
            adapter.annotations = descriptor.annotations;
            adapter.signature_source = descriptor.signature_source;
            result.push(self.store.alloc_function(adapter));
        }
        result
    }

    fn erased_params(&mut self, params: &[ValueParameter]) -> Vec<ErasedType> {
        let relations = self.relations();
        params.iter().map(|p| relations.erasure(p.ty)).collect()
    }
}
