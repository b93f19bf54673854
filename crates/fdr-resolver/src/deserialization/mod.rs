//! Descriptors rebuilt from embedded serialized blobs.
//!
//! A blob is accepted only when its ABI version equals the configured one.
//! Rejected and malformed blobs are reported once per unit and the unit
//! reads as not found. Deserialized descriptors carry their members
//! eagerly; nothing is resolved lazily from raw shapes.

pub mod model;

pub use model::{
    BlobError, SerializedClass, SerializedConstructor, SerializedFunction, SerializedPackage,
    SerializedProjection, SerializedProperty, SerializedType, SerializedTypeParameter,
    SerializedValueParameter,
};

use crate::cache::Lookup;
use crate::context::ForeignResolver;
use crate::policy::SearchPolicy;
use fdr_common::diagnostics::diagnostic_messages;
use fdr_common::names::{FqName, FqNameUnsafe};
use fdr_source::EmbeddedBlob;
use fdr_types::{
    ClassDescId, ClassDescriptor, ClassKind, ClassParent, DescriptorOrigin, FunctionDescriptor,
    FunctionId, FunctionKind, InvariantViolation, MemberOwner, NamespaceDescriptor, NamespaceId,
    NamespaceKind, PropertyDescriptor, PropertyId, PropertyKind, TypeId, TypeParamId,
    TypeParamOwner, TypeProjection, ValueParameter, fatal,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Type parameters visible while rebuilding a declaration, innermost last.
type Scope = Vec<(String, TypeParamId)>;

impl ForeignResolver<'_> {
    fn decode_blob<T: DeserializeOwned>(&self, blob: &EmbeddedBlob) -> Result<T, BlobError> {
        if blob.version != self.options.abi_version {
            return Err(BlobError::IncompatibleVersion {
                found: blob.version,
                expected: self.options.abi_version,
            });
        }
        Ok(serde_json::from_str(&blob.data)?)
    }

    fn report_blob_error(&mut self, blob: &EmbeddedBlob, error: &BlobError) {
        warn!(unit = %blob.unit, %error, "embedded blob rejected");
        if !self.reported_units.insert(blob.unit.clone()) {
            return;
        }
        let unit = blob.unit.as_str();
        match error {
            BlobError::IncompatibleVersion { found, expected } => self.diagnostics.report(
                &diagnostic_messages::ABI_VERSION_MISMATCH,
                unit,
                &[unit, &found.to_string(), &expected.to_string()],
            ),
            BlobError::Malformed(cause) => self.diagnostics.report(
                &diagnostic_messages::MALFORMED_METADATA,
                unit,
                &[unit, &cause.to_string()],
            ),
        }
    }

    // =========================================================================
    // Classes
    // =========================================================================

    pub(crate) fn deserialize_class(
        &mut self,
        name: &FqNameUnsafe,
        blob: &EmbeddedBlob,
    ) -> Option<ClassDescId> {
        let serialized: SerializedClass = match self.decode_blob(blob) {
            Ok(serialized) => serialized,
            Err(error) => {
                self.report_blob_error(blob, &error);
                self.cache.record_missing_class(name);
                return None;
            }
        };

        let parent = match &serialized.outer {
            Some(outer) => {
                let outer_name = FqNameUnsafe::new(outer);
                match self.resolve_class_inner(&outer_name, SearchPolicy::IgnoreNative) {
                    Some(id) => ClassParent::Class(id),
                    None => fatal(InvariantViolation::MissingParent {
                        name: name.to_string(),
                        parent: outer_name.to_string(),
                    }),
                }
            }
            None => ClassParent::Namespace(self.package_of(name)),
        };
        if let Lookup::Hit(entry) = self.cache.lookup_class(name) {
            return Some(entry.id());
        }

        let short = self.store.intern(name.short_name());
        let mut descriptor = ClassDescriptor::new(
            name.clone(),
            short,
            serialized.kind,
            parent,
            DescriptorOrigin::Deserialized,
        );
        descriptor.modality = serialized.modality;
        descriptor.visibility = serialized.visibility;
        descriptor.is_inner = serialized.is_inner;
        let id = self.store.alloc_class(descriptor);
        self.cache.begin_class(name, id);

        let mut scope = self.outer_scope(parent, serialized.is_inner);
        let params = self.deserialize_type_parameters(
            &serialized.type_parameters,
            TypeParamOwner::Class(id),
            &mut scope,
        );
        self.store.class_mut(id).type_params = params;

        let mut supertypes: Vec<TypeId> = serialized
            .supertypes
            .iter()
            .map(|ty| self.deserialize_type(ty, &scope))
            .collect();
        if supertypes.is_empty() {
            supertypes.push(self.builtins.any_type);
        }
        let incomplete = supertypes.iter().any(|&ty| self.types.is_error(ty));
        {
            let class = self.store.class_mut(id);
            class.supertypes = supertypes;
            class.incomplete = incomplete;
        }

        let owner = MemberOwner::Class(id);
        let functions: Vec<FunctionId> = serialized
            .functions
            .iter()
            .map(|f| self.deserialize_function(f, owner, &scope))
            .collect();
        let constructors: Vec<FunctionId> = serialized
            .constructors
            .iter()
            .map(|c| self.deserialize_constructor(c, id, &scope))
            .collect();
        let properties: Vec<PropertyId> = serialized
            .properties
            .iter()
            .map(|p| self.deserialize_property(p, owner, &scope))
            .collect();
        {
            let class = self.store.class_mut(id);
            class.functions = functions;
            class.constructors = constructors;
            class.properties = properties;
        }

        if serialized.kind == ClassKind::Enum {
            self.create_enum_holder(id, &serialized.enum_entries, DescriptorOrigin::Deserialized);
        }
        self.cache.complete_class(name, id);
        debug!(class = %name, id = id.0, "class deserialized");

        for nested in &serialized.nested_classes {
            if self
                .resolve_class_inner(&name.child(nested), SearchPolicy::IgnoreNative)
                .is_none()
            {
                warn!(class = %name, nested = %nested, "nested class listed in blob not found");
            }
        }
        Some(id)
    }

    /// Type parameters of the enclosing classes an inner class can see.
    fn outer_scope(&self, parent: ClassParent, is_inner: bool) -> Scope {
        let mut chain = Vec::new();
        let mut current = match (parent, is_inner) {
            (ClassParent::Class(outer), true) => Some(outer),
            _ => None,
        };
        while let Some(class) = current {
            let descriptor = self.store.class(class);
            chain.push(class);
            current = match descriptor.parent {
                ClassParent::Class(outer) if descriptor.is_inner => Some(outer),
                _ => None,
            };
        }
        let mut scope = Scope::new();
        for class in chain.into_iter().rev() {
            for &param in &self.store.class(class).type_params {
                let name = self.store.name(self.store.type_param(param).name).to_string();
                scope.push((name, param));
            }
        }
        scope
    }

    fn deserialize_type_parameters(
        &mut self,
        serialized: &[SerializedTypeParameter],
        owner: TypeParamOwner,
        scope: &mut Scope,
    ) -> Vec<TypeParamId> {
        let params: Vec<TypeParamId> = serialized
            .iter()
            .enumerate()
            .map(|(index, param)| {
                let name = self.store.intern(&param.name);
                let id = self
                    .store
                    .alloc_type_param(name, index as u32, param.variance, owner);
                scope.push((param.name.clone(), id));
                id
            })
            .collect();
        for (param, &id) in serialized.iter().zip(&params) {
            let mut bounds: Vec<TypeId> = param
                .upper_bounds
                .iter()
                .map(|b| self.deserialize_type(b, scope))
                .collect();
            if bounds.is_empty() {
                bounds.push(self.builtins.nullable_any_type);
            }
            self.store.set_upper_bounds(id, bounds);
        }
        params
    }

    fn deserialize_type(&mut self, ty: &SerializedType, scope: &[(String, TypeParamId)]) -> TypeId {
        match ty {
            SerializedType::Parameter { name, nullable } => {
                match scope.iter().rev().find(|(n, _)| n == name) {
                    Some(&(_, param)) => self.types.parameter(param, *nullable),
                    None => {
                        warn!(parameter = %name, "unknown type parameter in blob");
                        let atom = self.store.intern(name);
                        self.types.error(atom, *nullable)
                    }
                }
            }
            SerializedType::Class {
                name,
                arguments,
                nullable,
            } => {
                let Some(class) =
                    self.resolve_class_inner(&FqNameUnsafe::new(name), SearchPolicy::PreferNative)
                else {
                    let atom = self.store.intern(name);
                    return self.types.error(atom, *nullable);
                };
                let arguments: Vec<TypeProjection> = arguments
                    .iter()
                    .map(|argument| match argument {
                        SerializedProjection::Star => TypeProjection::Star,
                        SerializedProjection::Invariant(inner) => {
                            TypeProjection::invariant(self.deserialize_type(inner, scope))
                        }
                        SerializedProjection::In(inner) => {
                            TypeProjection::contravariant(self.deserialize_type(inner, scope))
                        }
                        SerializedProjection::Out(inner) => {
                            TypeProjection::out(self.deserialize_type(inner, scope))
                        }
                    })
                    .collect();
                self.types.class_type(class, arguments, *nullable)
            }
        }
    }

    fn deserialize_value_parameters(
        &mut self,
        serialized: &[SerializedValueParameter],
        scope: &[(String, TypeParamId)],
    ) -> Vec<ValueParameter> {
        serialized
            .iter()
            .enumerate()
            .map(|(index, param)| ValueParameter {
                name: self.store.intern(&param.name),
                index: index as u32,
                ty: self.deserialize_type(&param.ty, scope),
                vararg_element: param
                    .vararg_element
                    .as_ref()
                    .map(|element| self.deserialize_type(element, scope)),
                has_default: param.has_default,
                annotations: Vec::new(),
            })
            .collect()
    }

    fn deserialize_function(
        &mut self,
        serialized: &SerializedFunction,
        owner: MemberOwner,
        scope: &Scope,
    ) -> FunctionId {
        let name = self.store.intern(&serialized.name);
        let mut descriptor = FunctionDescriptor::new(
            name,
            owner,
            FunctionKind::Declared,
            DescriptorOrigin::Deserialized,
        );
        descriptor.visibility = serialized.visibility;
        descriptor.modality = serialized.modality;
        let id = self.store.alloc_function(descriptor);

        let mut scope = scope.clone();
        let type_params = self.deserialize_type_parameters(
            &serialized.type_parameters,
            TypeParamOwner::Function(id),
            &mut scope,
        );
        let receiver_type = serialized
            .receiver
            .as_ref()
            .map(|ty| self.deserialize_type(ty, &scope));
        let value_params = self.deserialize_value_parameters(&serialized.value_parameters, &scope);
        let return_type = self.deserialize_type(&serialized.return_type, &scope);

        let function = self.store.function_mut(id);
        function.type_params = type_params;
        function.receiver_type = receiver_type;
        function.value_params = value_params;
        function.return_type = return_type;
        id
    }

    fn deserialize_constructor(
        &mut self,
        serialized: &SerializedConstructor,
        class: ClassDescId,
        scope: &Scope,
    ) -> FunctionId {
        let name = self.store.intern("<init>");
        let mut descriptor = FunctionDescriptor::new(
            name,
            MemberOwner::Class(class),
            FunctionKind::Constructor,
            DescriptorOrigin::Deserialized,
        );
        descriptor.visibility = serialized.visibility;
        descriptor.value_params = self.deserialize_value_parameters(&serialized.value_parameters, scope);
        descriptor.return_type = self.default_type(class);
        self.store.alloc_function(descriptor)
    }

    fn deserialize_property(
        &mut self,
        serialized: &SerializedProperty,
        owner: MemberOwner,
        scope: &Scope,
    ) -> PropertyId {
        let name = self.store.intern(&serialized.name);
        let mut descriptor = PropertyDescriptor::new(
            name,
            owner,
            PropertyKind::Declared,
            DescriptorOrigin::Deserialized,
        );
        descriptor.ty = self.deserialize_type(&serialized.ty, scope);
        descriptor.is_var = serialized.is_var;
        descriptor.visibility = serialized.visibility;
        descriptor.modality = serialized.modality;
        self.store.alloc_property(descriptor)
    }

    // =========================================================================
    // Packages
    // =========================================================================

    pub(crate) fn deserialize_package(&mut self, name: &FqName, blob: &EmbeddedBlob) -> Option<NamespaceId> {
        let serialized: SerializedPackage = match self.decode_blob(blob) {
            Ok(serialized) => serialized,
            Err(error) => {
                self.report_blob_error(blob, &error);
                self.cache.record_missing_namespace(name);
                return None;
            }
        };
        let parent = self
            .resolve_namespace_inner(&name.parent(), SearchPolicy::IgnoreNative)
            .unwrap_or(self.root);
        if let Lookup::Hit(id) = self.cache.lookup_namespace(name) {
            return Some(id);
        }
        let id = self.store.alloc_namespace(NamespaceDescriptor::new(
            name.clone(),
            NamespaceKind::Deserialized,
            Some(parent),
        ));
        self.cache.insert_namespace(name, id);

        let owner = MemberOwner::Namespace(id);
        let scope = Scope::new();
        let functions: Vec<FunctionId> = serialized
            .functions
            .iter()
            .map(|f| self.deserialize_function(f, owner, &scope))
            .collect();
        let properties: Vec<PropertyId> = serialized
            .properties
            .iter()
            .map(|p| self.deserialize_property(p, owner, &scope))
            .collect();
        let namespace = self.store.namespace_mut(id);
        namespace.functions = functions;
        namespace.properties = properties;
        debug!(namespace = %name, "package deserialized");
        Some(id)
    }
}

#[cfg(test)]
#[path = "../../tests/deserialization_tests.rs"]
mod tests;
