use super::overrides::SuperFunction;
use super::{RawMemberKey, RawMemberKind, SignatureData, member_modality, nullability_flags};
use crate::class_resolution::visibility;
use crate::context::ForeignResolver;
use crate::generics::{TypeFlags, TypeUsage, TypeVariableResolver};
use crate::policy::SearchPolicy;
use fdr_common::interner::Atom;
use fdr_source::{
    MethodSignature, Modifiers, PrimitiveKind, RawClass, RawClassKind, RawMethod, RawType,
};
use fdr_types::{
    ClassDescId, DescriptorOrigin, FunctionDescriptor, FunctionId, FunctionKind, MemberOwner,
    Modality, NamespaceId, NamespaceKind, PrimitiveType, RecursionResult, SignatureSource,
    TypeId, TypeParamOwner, ValueParameter, Visibility,
};
use std::sync::Arc;
use tracing::{debug, trace};

const CONSTRUCTOR_NAME: &str = "<init>";

impl ForeignResolver<'_> {
    /// Declared layer of a raw method or constructor, memoized by raw
    /// member identity.
    pub(crate) fn resolve_raw_method(
        &mut self,
        class: ClassDescId,
        kind: RawMemberKind,
        index: usize,
        method: &RawMethod,
        owner: MemberOwner,
    ) -> FunctionId {
        let key = RawMemberKey {
            owner: class,
            kind,
            index: index as u32,
        };
        if let Some(&id) = self.members.functions_by_raw.get(&key) {
            return id;
        }
        let is_constructor = kind == RawMemberKind::Constructor;
        let name = if is_constructor {
            self.store.intern(CONSTRUCTOR_NAME)
        } else {
            self.store.intern(&method.name)
        };
        let function_kind = if is_constructor {
            FunctionKind::Constructor
        } else {
            FunctionKind::Declared
        };
        let mut descriptor =
            FunctionDescriptor::new(name, owner, function_kind, DescriptorOrigin::Foreign);
        descriptor.visibility = visibility(method.modifiers);
        descriptor.modality = if is_constructor {
            Modality::Final
        } else {
            member_modality(method.modifiers)
        };
        descriptor.is_static = method.is_static();
        let id = self.store.alloc_function(descriptor);
        self.members.functions_by_raw.insert(key, id);

        let mut errors = Vec::new();
        let signature = match method.method_signature() {
            Ok(signature) => signature,
            Err(error) => {
                errors.push(format!("malformed generic signature: {error}"));
                method.erased_signature().unwrap_or_else(|_| MethodSignature {
                    type_parameters: Vec::new(),
                    parameters: Vec::new(),
                    return_type: RawType::Primitive(PrimitiveKind::Void),
                    throws: Vec::new(),
                })
            }
        };

        let mut scope = if method.is_static() {
            TypeVariableResolver::new()
        } else {
            TypeVariableResolver::for_class(&self.store, class)
        };
        let type_params =
            self.alloc_type_parameters(&signature.type_parameters, TypeParamOwner::Function(id));
        scope.push(type_params.clone());
        self.resolve_type_parameter_bounds(&signature.type_parameters, &type_params, &scope);

        let last = signature.parameters.len().checked_sub(1);
        let mut value_params = Vec::with_capacity(signature.parameters.len());
        for (i, raw_type) in signature.parameters.iter().enumerate() {
            let parameter_annotations = method.annotations_of_parameter(i);
            let mut flags = nullability_flags(&self.options, parameter_annotations);
            let vararg = Some(i) == last
                && method.modifiers.contains(Modifiers::VARARGS)
                && matches!(raw_type, RawType::Array(_));
            if vararg {
                flags |= TypeFlags::VARARG;
            }
            let ty = self.transform_type(raw_type, TypeUsage::MemberSignatureContravariant, flags, &scope);
            let vararg_element = if vararg { self.array_element_type(ty) } else { None };
            let annotations = self.resolve_annotations_inner(parameter_annotations);
            value_params.push(ValueParameter {
                name: self.store.intern(&method.parameter_name(i)),
                index: i as u32,
                ty,
                vararg_element,
                has_default: false,
                annotations,
            });
        }

        let return_type = if is_constructor {
            self.default_type(class)
        } else {
            let flags = nullability_flags(&self.options, &method.annotations);
            self.transform_type(
                &signature.return_type,
                TypeUsage::MemberSignatureCovariant,
                flags,
                &scope,
            )
        };
        let annotations = self.resolve_annotations_inner(&method.annotations);

        let data = SignatureData {
            return_type,
            receiver_type: None,
            value_params,
            type_params,
            errors,
            source: SignatureSource::Declared,
        };
        self.write_signature(id, data);
        self.store.function_mut(id).annotations = annotations;
        trace!(function = %method.name, id = id.0, "raw method resolved");
        id
    }

    /// Element type of an array type, for vararg parameters.
    pub(crate) fn array_element_type(&mut self, ty: TypeId) -> Option<TypeId> {
        let class = self.types.class_of(ty)?;
        if class == self.builtins.array {
            return self.types.args_of(ty).first().and_then(|a| a.ty());
        }
        PrimitiveType::ALL
            .into_iter()
            .find(|&p| self.builtins.primitive_array(p) == class)
            .map(|p| self.builtins.primitive_type(&mut self.types, p))
    }

    // =========================================================================
    // Class functions
    // =========================================================================

    pub(crate) fn class_functions(&mut self, class: ClassDescId, name: Atom) -> Vec<FunctionId> {
        let key = (MemberOwner::Class(class), name);
        if let Some(cached) = self.members.functions.get(&key) {
            return cached.clone();
        }
        if !self.store.class(class).has_lazy_members() {
            return self
                .store
                .class(class)
                .functions
                .iter()
                .copied()
                .filter(|&f| self.store.function(f).name == name)
                .collect();
        }
        match self.members.in_progress.enter((class, name)) {
            RecursionResult::Entered => {}
            result => {
                trace!(class = class.0, ?result, "member lookup re-entered");
                return Vec::new();
            }
        }
        let result = self.compute_class_functions(class, name);
        self.members.in_progress.leave((class, name));
        self.members.functions.insert(key, result.clone());
        result
    }

    fn compute_class_functions(&mut self, class: ClassDescId, name: Atom) -> Vec<FunctionId> {
        let Some(raw) = self.raw_classes.get(&class).cloned() else {
            return Vec::new();
        };
        let name_text = self.store.name(name).to_string();
        let mut declared = Vec::new();
        for (index, method) in raw.methods.iter().enumerate() {
            if method.name != name_text
                || method.is_static()
                || method
                    .modifiers
                    .intersects(Modifiers::SYNTHETIC | Modifiers::BRIDGE)
            {
                continue;
            }
            let id = self.resolve_raw_method(
                class,
                RawMemberKind::Method,
                index,
                method,
                MemberOwner::Class(class),
            );
            declared.push((id, index));
        }

        let supers = self.super_functions(class, name);
        for &(id, index) in &declared {
            self.finish_class_function(id, &raw.methods[index], &supers);
        }

        let declared: Vec<FunctionId> = declared.into_iter().map(|(id, _)| id).collect();
        let mut result = declared.clone();
        result.extend(self.fake_overrides(class, &declared, &supers));
        if self.options.sam_adapters {
            let adapters = self.sam_adapters(class, &result);
            result.extend(adapters);
        }
        debug!(class = class.0, name = %name_text, count = result.len(), "class functions resolved");
        result
    }

    fn finish_class_function(
        &mut self,
        function: FunctionId,
        method: &RawMethod,
        supers: &[SuperFunction],
    ) {
        let mut data = self.signature_of(function);
        let candidates: Vec<&SuperFunction> = supers
            .iter()
            .filter(|s| s.visibility != Visibility::Private)
            .filter(|s| self.overrides_super(function, s))
            .collect();
        if !candidates.is_empty() {
            data = self.propagate_signature(function, data, &candidates);
        }
        if let Some(text) = &method.external_signature {
            data = self.apply_external_function(function, data, text);
        }
        self.write_signature(function, data);
        self.bind_overrides(function, supers);
    }

    // =========================================================================
    // Namespace functions
    // =========================================================================

    pub(crate) fn namespace_functions(&mut self, namespace: NamespaceId, name: Atom) -> Vec<FunctionId> {
        let key = (MemberOwner::Namespace(namespace), name);
        if let Some(cached) = self.members.functions.get(&key) {
            return cached.clone();
        }
        let mut result = match self.store.namespace(namespace).kind {
            NamespaceKind::ClassStatics(class) => self.static_functions(class, namespace, name),
            NamespaceKind::Package => Vec::new(),
            NamespaceKind::Root | NamespaceKind::Deserialized | NamespaceKind::Native => self
                .store
                .namespace(namespace)
                .functions
                .iter()
                .copied()
                .filter(|&f| self.store.function(f).name == name)
                .collect(),
        };
        if self.options.sam_constructors
            && let Some(constructor) = self.sam_constructor_in(namespace, name)
        {
            result.push(constructor);
        }
        self.members.functions.insert(key, result.clone());
        result
    }

    fn static_functions(&mut self, class: ClassDescId, namespace: NamespaceId, name: Atom) -> Vec<FunctionId> {
        let Some(raw) = self.raw_classes.get(&class).cloned() else {
            return Vec::new();
        };
        let name_text = self.store.name(name).to_string();
        let mut result = Vec::new();
        for (index, method) in raw.methods.iter().enumerate() {
            if method.name != name_text || !method.is_static() {
                continue;
            }
            let id = self.resolve_raw_method(
                class,
                RawMemberKind::Method,
                index,
                method,
                MemberOwner::Namespace(namespace),
            );
            if let Some(text) = &method.external_signature {
                let data = self.signature_of(id);
                let data = self.apply_external_function(id, data, text);
                self.write_signature(id, data);
            }
            result.push(id);
        }
        result
    }

    /// SAM constructor for an interface named `name` directly inside a
    /// namespace.
    fn sam_constructor_in(&mut self, namespace: NamespaceId, name: Atom) -> Option<FunctionId> {
        let namespace_name = self.store.namespace(namespace).fq_name.to_unsafe();
        let class_name = namespace_name.child(self.store.name(name));
        let class = self.resolve_class_inner(&class_name, SearchPolicy::IgnoreNative)?;
        self.sam_constructor(class, namespace)
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub(crate) fn class_constructors(&mut self, class: ClassDescId) -> Vec<FunctionId> {
        if let Some(cached) = self.members.constructors.get(&class) {
            return cached.clone();
        }
        if !self.store.class(class).has_lazy_members() {
            return self.store.class(class).constructors.clone();
        }
        let Some(raw) = self.raw_classes.get(&class).cloned() else {
            return Vec::new();
        };
        let result = match raw.kind {
            RawClassKind::Annotation => vec![self.annotation_constructor(class, &raw)],
            RawClassKind::Interface => Vec::new(),
            RawClassKind::Class | RawClassKind::Enum => {
                let mut result = Vec::with_capacity(raw.constructors.len());
                for (index, method) in raw.constructors.iter().enumerate() {
                    let id = self.resolve_raw_method(
                        class,
                        RawMemberKind::Constructor,
                        index,
                        method,
                        MemberOwner::Class(class),
                    );
                    if let Some(text) = &method.external_signature {
                        let data = self.signature_of(id);
                        let data = self.apply_external_function(id, data, text);
                        self.write_signature(id, data);
                    }
                    result.push(id);
                }
                if result.is_empty() && raw.kind == RawClassKind::Class {
                    result.push(self.default_constructor(class));
                }
                result
            }
        };
        self.members.constructors.insert(class, result.clone());
        result
    }

    fn default_constructor(&mut self, class: ClassDescId) -> FunctionId {
        let name = self.store.intern(CONSTRUCTOR_NAME);
        let mut descriptor = FunctionDescriptor::new(
            name,
            MemberOwner::Class(class),
            FunctionKind::Constructor,
            DescriptorOrigin::Synthesized,
        );
        descriptor.return_type = self.default_type(class);
        self.store.alloc_function(descriptor)
    }

    /// An annotation class has one constructor whose parameters are its
    /// methods. A `value` array parameter is a vararg.
    fn annotation_constructor(&mut self, class: ClassDescId, raw: &Arc<RawClass>) -> FunctionId {
        let name = self.store.intern(CONSTRUCTOR_NAME);
        let mut descriptor = FunctionDescriptor::new(
            name,
            MemberOwner::Class(class),
            FunctionKind::Constructor,
            DescriptorOrigin::Synthesized,
        );
        descriptor.return_type = self.default_type(class);
        let scope = TypeVariableResolver::new();
        for (index, method) in raw.methods.iter().filter(|m| !m.is_static()).enumerate() {
            let raw_type = match method.method_signature() {
                Ok(signature) => signature.return_type,
                Err(error) => {
                    descriptor
                        .signature_errors
                        .push(format!("malformed signature of '{}': {error}", method.name));
                    continue;
                }
            };
            let vararg = method.name == "value" && matches!(raw_type, RawType::Array(_));
            let mut flags = TypeFlags::NOT_NULL;
            if vararg {
                flags |= TypeFlags::VARARG;
            }
            let ty = self.transform_type(&raw_type, TypeUsage::MemberSignatureContravariant, flags, &scope);
            let vararg_element = if vararg { self.array_element_type(ty) } else { None };
            descriptor.value_params.push(ValueParameter {
                name: self.store.intern(&method.name),
                index: index as u32,
                ty,
                vararg_element,
                has_default: method.default_value.is_some(),
                annotations: Vec::new(),
            });
        }
        self.store.alloc_function(descriptor)
    }
}
