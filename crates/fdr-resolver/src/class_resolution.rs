//! Class and namespace resolution.
//!
//! ```text
//! resolve_class(name)
//!   ├─ synthesized helper?          ──▶ None
//!   ├─ native declaration?          ──▶ search policy
//!   ├─ holder marker?               ──▶ outer's holder
//!   ├─ cached / negative?           ──▶ cached answer
//!   ├─ embedded blob?               ──▶ deserialization
//!   ├─ raw shape from the source    ──▶ none: negative entry
//!   ├─ parent (outer class or package, recursively)
//!   ├─ allocate + Materializing
//!   ├─ type parameters, supertypes, holder, annotations
//!   └─ Resolved
//! ```

use crate::cache::Lookup;
use crate::context::ForeignResolver;
use crate::generics::{TypeFlags, TypeUsage, TypeVariableResolver};
use crate::policy::SearchPolicy;
use fdr_common::diagnostics::diagnostic_messages;
use fdr_common::limits::{STACK_GROWTH, STACK_RED_ZONE};
use fdr_common::names::{FqName, FqNameUnsafe, translate_foreign_name};
use fdr_source::{BlobKind, ClassSignature, Modifiers, RawClass, RawClassKind};
use fdr_types::{
    ClassDescId, ClassDescriptor, ClassKind, ClassParent, DescriptorOrigin, FunctionDescriptor,
    FunctionKind, InvariantViolation, MemberOwner, Modality, NamespaceDescriptor, NamespaceId,
    NamespaceKind, PropertyDescriptor, PropertyKind, TypeParamOwner, TypeProjection,
    ValueParameter, Visibility, fatal,
};
use std::sync::Arc;
use tracing::{debug, trace, warn};

pub(crate) fn class_kind(kind: RawClassKind) -> ClassKind {
    match kind {
        RawClassKind::Class => ClassKind::Class,
        RawClassKind::Interface => ClassKind::Interface,
        RawClassKind::Enum => ClassKind::Enum,
        RawClassKind::Annotation => ClassKind::AnnotationClass,
    }
}

pub(crate) fn visibility(modifiers: Modifiers) -> Visibility {
    if modifiers.contains(Modifiers::PUBLIC) {
        Visibility::Public
    } else if modifiers.contains(Modifiers::PROTECTED) {
        Visibility::Protected
    } else if modifiers.contains(Modifiers::PRIVATE) {
        Visibility::Private
    } else {
        Visibility::PackagePrivate
    }
}

fn class_modality(raw: &RawClass) -> Modality {
    if raw.is_interface() || raw.modifiers.contains(Modifiers::ABSTRACT) {
        Modality::Abstract
    } else if raw.modifiers.contains(Modifiers::FINAL) || raw.kind == RawClassKind::Enum {
        Modality::Final
    } else {
        Modality::Open
    }
}

impl ForeignResolver<'_> {
    /// Resolve a class by native name. Repeated calls return the same id.
    #[tracing::instrument(level = "debug", skip(self), fields(class = %name))]
    pub fn resolve_class(&mut self, name: &FqNameUnsafe, policy: SearchPolicy) -> Option<ClassDescId> {
        self.with_postponed(|this| this.resolve_class_inner(name, policy))
    }

    /// Resolve a class by foreign binary name (`a.Outer$Inner`).
    pub fn resolve_foreign_class(&mut self, binary_name: &str) -> Option<ClassDescId> {
        let name = translate_foreign_name(binary_name);
        self.resolve_class(&name, SearchPolicy::IgnoreNative)
    }

    pub(crate) fn resolve_class_inner(
        &mut self,
        name: &FqNameUnsafe,
        policy: SearchPolicy,
    ) -> Option<ClassDescId> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            if !self.depth.enter() {
                warn!(class = %name, depth = self.depth.depth(), "class resolution too deep");
                return None;
            }
            let result = self.resolve_class_uncached(name, policy);
            self.depth.leave();
            result
        })
    }

    fn resolve_class_uncached(
        &mut self,
        name: &FqNameUnsafe,
        policy: SearchPolicy,
    ) -> Option<ClassDescId> {
        if name.is_root() || name.is_compiler_synthesized() {
            return None;
        }

        let native = self.natives.class(name);
        let fallback = match native {
            Some(_) if policy == SearchPolicy::ErrorIfNative => {
                fatal(InvariantViolation::NativeDeclarationConflict {
                    name: name.to_string(),
                })
            }
            Some(id) if policy.stops_at_native() => return Some(id),
            _ if policy.falls_back_to_native() => native,
            _ => None,
        };

        if name.is_class_object_name() {
            let outer = self.resolve_class_inner(&name.parent(), policy)?;
            return self.store.class(outer).class_object.or(fallback);
        }

        match self.cache.lookup_class(name) {
            Lookup::Hit(entry) => return Some(entry.id()),
            Lookup::Negative => return fallback,
            Lookup::Miss => {}
        }

        if let Some(blob) = self.metadata.read_embedded_blob(name, BlobKind::Class) {
            return self.deserialize_class(name, &blob).or(fallback);
        }

        let Some(raw) = self.find_raw_class(name) else {
            self.cache.record_missing_class(name);
            return fallback;
        };

        let parent = self.resolve_class_parent(name, &raw);

        // Resolving the parent may have materialized this class already.
        if let Lookup::Hit(entry) = self.cache.lookup_class(name) {
            return Some(entry.id());
        }

        Some(self.materialize_foreign_class(name, raw, parent))
    }

    fn resolve_class_parent(&mut self, name: &FqNameUnsafe, raw: &RawClass) -> ClassParent {
        if let Some(outer) = &raw.outer {
            let outer_name = translate_foreign_name(outer);
            return match self.resolve_class_inner(&outer_name, SearchPolicy::IgnoreNative) {
                Some(id) => ClassParent::Class(id),
                None => fatal(InvariantViolation::MissingParent {
                    name: name.to_string(),
                    parent: outer_name.to_string(),
                }),
            };
        }
        ClassParent::Namespace(self.package_of(name))
    }

    /// Namespace of the package enclosing a top-level class.
    pub(crate) fn package_of(&mut self, name: &FqNameUnsafe) -> NamespaceId {
        let Some(package) = name.parent().to_safe() else {
            return self.root;
        };
        match self.resolve_namespace_inner(&package, SearchPolicy::IgnoreNative) {
            Some(id) => id,
            None => {
                warn!(class = %name, package = %package, "package of class not found, using root");
                self.root
            }
        }
    }

    fn materialize_foreign_class(
        &mut self,
        name: &FqNameUnsafe,
        raw: Arc<RawClass>,
        parent: ClassParent,
    ) -> ClassDescId {
        let short = self.store.intern(name.short_name());
        let mut descriptor = ClassDescriptor::new(
            name.clone(),
            short,
            class_kind(raw.kind),
            parent,
            DescriptorOrigin::Foreign,
        );
        descriptor.modality = class_modality(&raw);
        descriptor.visibility = visibility(raw.modifiers);
        descriptor.is_inner = raw.is_inner();
        let id = self.store.alloc_class(descriptor);
        self.cache.begin_class(name, id);
        self.raw_classes.insert(id, Arc::clone(&raw));

        let signature = match raw.class_signature() {
            Ok(signature) => signature,
            Err(error) => {
                warn!(class = %name, %error, "malformed class signature");
                self.store.class_mut(id).incomplete = true;
                self.diagnostics.report(
                    &diagnostic_messages::INCOMPLETE_HIERARCHY,
                    name.as_str(),
                    &[name.as_str()],
                );
                raw.erased_class_signature()
            }
        };

        let params = self.alloc_type_parameters(&signature.type_parameters, TypeParamOwner::Class(id));
        self.store.class_mut(id).type_params = params.clone();
        let scope = TypeVariableResolver::for_class(&self.store, id);
        self.resolve_type_parameter_bounds(&signature.type_parameters, &params, &scope);

        self.resolve_supertypes(id, name, &signature, &scope);

        if raw.kind == RawClassKind::Enum {
            let entries: Vec<String> = raw
                .fields
                .iter()
                .filter(|f| f.is_enum_entry())
                .map(|f| f.name.clone())
                .collect();
            self.create_enum_holder(id, &entries, DescriptorOrigin::Synthesized);
        }

        let annotations = self.resolve_annotations_inner(&raw.annotations);
        self.store.class_mut(id).annotations = annotations;

        self.cache.complete_class(name, id);
        debug!(class = %name, id = id.0, "foreign class resolved");
        id
    }

    fn resolve_supertypes(
        &mut self,
        id: ClassDescId,
        name: &FqNameUnsafe,
        signature: &ClassSignature,
        scope: &TypeVariableResolver,
    ) {
        let mut supertypes = Vec::new();
        let mut incomplete = false;
        for raw in signature.super_class.iter().chain(&signature.interfaces) {
            let ty = self.transform_type(raw, TypeUsage::Supertype, TypeFlags::empty(), scope);
            if self.types.is_error(ty) {
                incomplete = true;
                let missing = raw
                    .class_name()
                    .map(|n| translate_foreign_name(n).to_string())
                    .unwrap_or_default();
                self.diagnostics.report(
                    &diagnostic_messages::UNRESOLVED_SUPERTYPE,
                    name.as_str(),
                    &[&missing, name.as_str()],
                );
            }
            if !supertypes.contains(&ty) {
                supertypes.push(ty);
            }
        }
        if supertypes.is_empty() {
            supertypes.push(self.builtins.any_type);
        }
        if incomplete {
            self.diagnostics.report(
                &diagnostic_messages::INCOMPLETE_HIERARCHY,
                name.as_str(),
                &[name.as_str()],
            );
        }
        trace!(class = %name, count = supertypes.len(), incomplete, "supertypes resolved");
        let class = self.store.class_mut(id);
        class.supertypes = supertypes;
        class.incomplete |= incomplete;
    }

    /// Create the holder of an enum's entries with the `values()` and
    /// `valueOf(String)` helpers.
    pub(crate) fn create_enum_holder(
        &mut self,
        enum_class: ClassDescId,
        entries: &[String],
        origin: DescriptorOrigin,
    ) -> ClassDescId {
        let holder_name = self.store.class(enum_class).fq_name.class_object_name();
        let short = self.store.intern(holder_name.short_name());
        let mut descriptor = ClassDescriptor::new(
            holder_name.clone(),
            short,
            ClassKind::ClassObject,
            ClassParent::Class(enum_class),
            origin,
        );
        descriptor.supertypes.push(self.builtins.any_type);
        let holder = self.store.alloc_class(descriptor);
        self.store.class_mut(enum_class).class_object = Some(holder);
        self.cache.insert_resolved_class(&holder_name, holder);

        let enum_type = self.default_type(enum_class);
        for entry in entries {
            let atom = self.store.intern(entry);
            let mut property = PropertyDescriptor::new(
                atom,
                MemberOwner::Class(holder),
                PropertyKind::EnumEntry,
                origin,
            );
            property.ty = enum_type;
            let id = self.store.alloc_property(property);
            self.store.class_mut(holder).properties.push(id);
        }

        let values = self.store.intern("values");
        let array_of_enum =
            self.types
                .class_type(self.builtins.array, [TypeProjection::invariant(enum_type)], false);
        let mut values_fn = FunctionDescriptor::new(
            values,
            MemberOwner::Class(holder),
            FunctionKind::EnumHelper,
            DescriptorOrigin::Synthesized,
        );
        values_fn.return_type = array_of_enum;
        let values_id = self.store.alloc_function(values_fn);

        let value_of = self.store.intern("valueOf");
        let value = self.store.intern("value");
        let mut value_of_fn = FunctionDescriptor::new(
            value_of,
            MemberOwner::Class(holder),
            FunctionKind::EnumHelper,
            DescriptorOrigin::Synthesized,
        );
        value_of_fn.value_params.push(ValueParameter {
            name: value,
            index: 0,
            ty: self.builtins.string_type,
            vararg_element: None,
            has_default: false,
            annotations: Vec::new(),
        });
        value_of_fn.return_type = enum_type;
        let value_of_id = self.store.alloc_function(value_of_fn);
        self.store
            .class_mut(holder)
            .functions
            .extend([values_id, value_of_id]);
        trace!(holder = %holder_name, entries = entries.len(), "enum holder created");
        holder
    }

    // =========================================================================
    // Namespaces
    // =========================================================================

    /// Resolve a namespace: a package, a deserialized package, or the static
    /// members of a class when no package of that name exists.
    #[tracing::instrument(level = "debug", skip(self), fields(namespace = %name))]
    pub fn resolve_namespace(&mut self, name: &FqName, policy: SearchPolicy) -> Option<NamespaceId> {
        self.with_postponed(|this| this.resolve_namespace_inner(name, policy))
    }

    pub(crate) fn resolve_namespace_inner(
        &mut self,
        name: &FqName,
        policy: SearchPolicy,
    ) -> Option<NamespaceId> {
        if name.is_root() {
            return Some(self.root);
        }
        let native = self.natives.namespace(name);
        let fallback = match native {
            Some(_) if policy == SearchPolicy::ErrorIfNative => {
                fatal(InvariantViolation::NativeDeclarationConflict {
                    name: name.to_string(),
                })
            }
            Some(id) if policy.stops_at_native() => return Some(id),
            _ if policy.falls_back_to_native() => native,
            _ => None,
        };

        match self.cache.lookup_namespace(name) {
            Lookup::Hit(id) => return Some(id),
            Lookup::Negative => return fallback,
            Lookup::Miss => {}
        }

        if let Some(blob) = self
            .metadata
            .read_embedded_blob(name.as_unsafe(), BlobKind::Package)
        {
            return self.deserialize_package(name, &blob).or(fallback);
        }

        if self.source.find_package(name).is_some() {
            let parent = self
                .resolve_namespace_inner(&name.parent(), SearchPolicy::IgnoreNative)
                .unwrap_or(self.root);
            if let Lookup::Hit(id) = self.cache.lookup_namespace(name) {
                return Some(id);
            }
            let id = self.store.alloc_namespace(NamespaceDescriptor::new(
                name.clone(),
                NamespaceKind::Package,
                Some(parent),
            ));
            self.cache.insert_namespace(name, id);
            debug!(namespace = %name, "package resolved");
            return Some(id);
        }

        if let Some(class) = self.resolve_class_inner(name.as_unsafe(), SearchPolicy::IgnoreNative)
            && self
                .raw_classes
                .get(&class)
                .is_some_and(|raw| raw.has_static_members())
            && let Some(statics) = self.class_statics_inner(class)
        {
            if let Lookup::Hit(id) = self.cache.lookup_namespace(name) {
                return Some(id);
            }
            self.cache.insert_namespace(name, statics);
            return Some(statics);
        }

        if let Lookup::Hit(id) = self.cache.lookup_namespace(name) {
            return Some(id);
        }
        self.cache.record_missing_namespace(name);
        fallback
    }
}

#[cfg(test)]
#[path = "../tests/class_resolution_tests.rs"]
mod tests;
