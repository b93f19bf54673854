use super::{RawMemberKey, RawMemberKind, member_modality, nullability_flags};
use crate::class_resolution::visibility;
use crate::context::ForeignResolver;
use crate::generics::{TypeFlags, TypeUsage, TypeVariableResolver};
use fdr_common::interner::Atom;
use fdr_source::{Modifiers, RawField};
use fdr_types::{
    ClassDescId, DescriptorOrigin, MemberOwner, Modality, NamespaceId, NamespaceKind,
    PropertyDescriptor, PropertyId, PropertyKind, RecursionResult, TypeId,
};
use tracing::trace;

impl ForeignResolver<'_> {
    pub(crate) fn resolve_raw_field(
        &mut self,
        class: ClassDescId,
        index: usize,
        field: &RawField,
        owner: MemberOwner,
    ) -> PropertyId {
        let key = RawMemberKey {
            owner: class,
            kind: RawMemberKind::Field,
            index: index as u32,
        };
        if let Some(&id) = self.members.properties_by_raw.get(&key) {
            return id;
        }
        let name = self.store.intern(&field.name);
        let mut descriptor =
            PropertyDescriptor::new(name, owner, PropertyKind::Declared, DescriptorOrigin::Foreign);
        descriptor.is_var = !field.modifiers.contains(Modifiers::FINAL);
        descriptor.visibility = visibility(field.modifiers);
        descriptor.modality = if field.is_static() {
            Modality::Final
        } else {
            member_modality(field.modifiers)
        };
        descriptor.is_static = field.is_static();
        let id = self.store.alloc_property(descriptor);
        self.members.properties_by_raw.insert(key, id);

        let is_constant = field.is_static()
            && field.modifiers.contains(Modifiers::FINAL)
            && field.constant.is_some();
        let mut flags = nullability_flags(&self.options, &field.annotations);
        if is_constant {
            flags |= TypeFlags::NOT_NULL;
        }
        let usage = if field.modifiers.contains(Modifiers::FINAL) {
            TypeUsage::MemberSignatureCovariant
        } else {
            TypeUsage::MemberSignatureInvariant
        };
        let scope = if field.is_static() {
            TypeVariableResolver::new()
        } else {
            TypeVariableResolver::for_class(&self.store, class)
        };

        let mut errors = Vec::new();
        let (ty, constant) = match field.field_type() {
            Ok(raw_type) => {
                let ty = self.transform_type(&raw_type, usage, flags, &scope);
                let constant = match (&field.constant, is_constant) {
                    (Some(value), true) => self.resolve_constant(value, Some(&raw_type)),
                    _ => None,
                };
                (ty, constant)
            }
            Err(error) => {
                errors.push(format!("malformed field type: {error}"));
                (TypeId::ERROR, None)
            }
        };
        let annotations = self.resolve_annotations_inner(&field.annotations);
        let descriptor = self.store.property_mut(id);
        descriptor.ty = ty;
        descriptor.compile_time_constant = constant;
        descriptor.annotations = annotations;
        descriptor.signature_errors = errors;

        if let Some(text) = &field.external_signature {
            self.apply_external_property(id, text);
        }
        trace!(field = %field.name, id = id.0, "raw field resolved");
        id
    }

    /// Declared instance fields named `name`; when there are none, the
    /// inherited property of a supertype as a fake override.
    pub(crate) fn class_properties(&mut self, class: ClassDescId, name: Atom) -> Vec<PropertyId> {
        let key = (MemberOwner::Class(class), name);
        if let Some(cached) = self.members.properties.get(&key) {
            return cached.clone();
        }
        if !self.store.class(class).has_lazy_members() {
            return self.eager_properties(&self.store.class(class).properties, name);
        }
        if self.members.properties_in_progress.enter((class, name)) != RecursionResult::Entered {
            return Vec::new();
        }
        let mut result = Vec::new();
        if let Some(raw) = self.raw_classes.get(&class).cloned() {
            let name_text = self.store.name(name).to_string();
            for (index, field) in raw.fields.iter().enumerate() {
                if field.name == name_text && !field.is_static() && !field.is_enum_entry() {
                    result.push(self.resolve_raw_field(class, index, field, MemberOwner::Class(class)));
                }
            }
            if result.is_empty()
                && let Some(inherited) = self.inherited_property(class, name)
            {
                result.push(inherited);
            }
        }
        self.members.properties_in_progress.leave((class, name));
        self.members.properties.insert(key, result.clone());
        result
    }

    pub(crate) fn namespace_properties(&mut self, namespace: NamespaceId, name: Atom) -> Vec<PropertyId> {
        let key = (MemberOwner::Namespace(namespace), name);
        if let Some(cached) = self.members.properties.get(&key) {
            return cached.clone();
        }
        let NamespaceKind::ClassStatics(class) = self.store.namespace(namespace).kind else {
            return self.eager_properties(&self.store.namespace(namespace).properties, name);
        };
        let mut result = Vec::new();
        if let Some(raw) = self.raw_classes.get(&class).cloned() {
            let name_text = self.store.name(name).to_string();
            for (index, field) in raw.fields.iter().enumerate() {
                if field.name == name_text && field.is_static() && !field.is_enum_entry() {
                    result.push(self.resolve_raw_field(
                        class,
                        index,
                        field,
                        MemberOwner::Namespace(namespace),
                    ));
                }
            }
        }
        self.members.properties.insert(key, result.clone());
        result
    }

    fn eager_properties(&self, properties: &[PropertyId], name: Atom) -> Vec<PropertyId> {
        properties
            .iter()
            .copied()
            .filter(|&p| self.store.property(p).name == name)
            .collect()
    }
}
