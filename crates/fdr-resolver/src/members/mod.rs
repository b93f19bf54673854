//! Member resolution: functions, constructors, properties, inner classes
//! and class statics.
//!
//! Members of foreign classes are resolved lazily, one name at a time. For
//! each raw member the effective signature is built in layers:
//!
//! ```text
//! Declared ──▶ Propagated (super members) ──▶ External (attached text)
//! ```
//!
//! Each layer may replace the types of the previous one; errors from all
//! layers accumulate on the descriptor.

mod external;
mod functions;
mod overrides;
mod propagation;
mod properties;
mod sam;

pub use external::{
    ExternalParameter, ExternalSignature, ExternalSignatureError, ExternalType,
    ExternalTypeArgument, ExternalTypeParameter, parse_external_signature,
};

use crate::context::ForeignResolver;
use crate::generics::TypeFlags;
use crate::options::ResolverOptions;
use crate::policy::SearchPolicy;
use fdr_common::interner::Atom;
use fdr_source::{Modifiers, RawAnnotation};
use fdr_types::{
    ClassDescId, ClassParent, FunctionId, MemberOwner, Modality, NamespaceDescriptor, NamespaceId,
    NamespaceKind, PropertyId, RecursionGuard, RecursionProfile, SignatureSource, TypeId,
    TypeParamId, ValueParameter,
};
use rustc_hash::FxHashMap;
use tracing::trace;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RawMemberKind {
    Method,
    Constructor,
    Field,
}

/// Identity of a raw member: its owner, kind and position in the raw class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RawMemberKey {
    pub owner: ClassDescId,
    pub kind: RawMemberKind,
    pub index: u32,
}

/// Effective signature of a function while its layers are applied.
#[derive(Clone, Debug, PartialEq)]
pub struct SignatureData {
    pub return_type: TypeId,
    pub receiver_type: Option<TypeId>,
    pub value_params: Vec<ValueParameter>,
    pub type_params: Vec<TypeParamId>,
    pub errors: Vec<String>,
    pub source: SignatureSource,
}

impl SignatureData {
    pub fn value_param_types(&self) -> Vec<TypeId> {
        self.value_params.iter().map(|p| p.ty).collect()
    }
}

pub(crate) struct MemberTables {
    functions_by_raw: FxHashMap<RawMemberKey, FunctionId>,
    properties_by_raw: FxHashMap<RawMemberKey, PropertyId>,
    functions: FxHashMap<(MemberOwner, Atom), Vec<FunctionId>>,
    properties: FxHashMap<(MemberOwner, Atom), Vec<PropertyId>>,
    constructors: FxHashMap<ClassDescId, Vec<FunctionId>>,
    statics: FxHashMap<ClassDescId, NamespaceId>,
    /// Name of the single abstract method of each interface asked about.
    sam_methods: FxHashMap<ClassDescId, Option<Atom>>,
    sam_constructors: FxHashMap<ClassDescId, FunctionId>,
    /// `(class, name)` pairs whose member lists are being computed.
    in_progress: RecursionGuard<(ClassDescId, Atom)>,
    properties_in_progress: RecursionGuard<(ClassDescId, Atom)>,
}

impl MemberTables {
    pub(crate) fn new() -> Self {
        Self {
            functions_by_raw: FxHashMap::default(),
            properties_by_raw: FxHashMap::default(),
            functions: FxHashMap::default(),
            properties: FxHashMap::default(),
            constructors: FxHashMap::default(),
            statics: FxHashMap::default(),
            sam_methods: FxHashMap::default(),
            sam_constructors: FxHashMap::default(),
            in_progress: RecursionGuard::with_profile(RecursionProfile::ClassResolution),
            properties_in_progress: RecursionGuard::with_profile(RecursionProfile::ClassResolution),
        }
    }
}

pub(crate) fn nullability_flags(
    options: &ResolverOptions,
    annotations: &[RawAnnotation],
) -> TypeFlags {
    let mut flags = TypeFlags::empty();
    for annotation in annotations {
        let name = annotation.native_name();
        if options.is_not_null_annotation(&name) {
            flags |= TypeFlags::NOT_NULL;
        } else if options.is_nullable_annotation(&name) {
            flags |= TypeFlags::NULLABLE;
        }
    }
    flags
}

pub(crate) fn member_modality(modifiers: Modifiers) -> Modality {
    if modifiers.contains(Modifiers::ABSTRACT) {
        Modality::Abstract
    } else if modifiers.contains(Modifiers::FINAL) {
        Modality::Final
    } else {
        Modality::Open
    }
}

impl ForeignResolver<'_> {
    /// Functions named `name` in a class (declared, inherited and SAM
    /// adapters) or a namespace (statics, package functions and SAM
    /// constructors).
    #[tracing::instrument(level = "debug", skip(self), fields(name = name))]
    pub fn functions(&mut self, owner: MemberOwner, name: &str) -> Vec<FunctionId> {
        self.with_postponed(|this| {
            let name = this.store.intern(name);
            match owner {
                MemberOwner::Class(class) => this.class_functions(class, name),
                MemberOwner::Namespace(namespace) => this.namespace_functions(namespace, name),
            }
        })
    }

    /// Properties named `name` in a class or namespace.
    #[tracing::instrument(level = "debug", skip(self), fields(name = name))]
    pub fn properties(&mut self, owner: MemberOwner, name: &str) -> Vec<PropertyId> {
        self.with_postponed(|this| {
            let name = this.store.intern(name);
            match owner {
                MemberOwner::Class(class) => this.class_properties(class, name),
                MemberOwner::Namespace(namespace) => this.namespace_properties(namespace, name),
            }
        })
    }

    pub fn constructors(&mut self, class: ClassDescId) -> Vec<FunctionId> {
        self.with_postponed(|this| this.class_constructors(class))
    }

    /// Nested class `name` of `class`.
    pub fn inner_class(&mut self, class: ClassDescId, name: &str) -> Option<ClassDescId> {
        self.with_postponed(|this| {
            let nested_name = this.store.class(class).fq_name.child(name);
            let nested = this.resolve_class_inner(&nested_name, SearchPolicy::IgnoreNative)?;
            (this.store.class(nested).parent == ClassParent::Class(class)).then_some(nested)
        })
    }

    /// Namespace holding the static members of a foreign class.
    pub fn class_statics(&mut self, class: ClassDescId) -> Option<NamespaceId> {
        self.with_postponed(|this| this.class_statics_inner(class))
    }

    pub(crate) fn class_statics_inner(&mut self, class: ClassDescId) -> Option<NamespaceId> {
        if let Some(&id) = self.members.statics.get(&class) {
            return Some(id);
        }
        let descriptor = self.store.class(class);
        if !descriptor.has_lazy_members() {
            return None;
        }
        let name = descriptor.fq_name.to_safe()?;
        let parent = match descriptor.parent {
            ClassParent::Namespace(namespace) => Some(namespace),
            ClassParent::Class(outer) => self.class_statics_inner(outer),
        };
        let id = self.store.alloc_namespace(NamespaceDescriptor::new(
            name,
            NamespaceKind::ClassStatics(class),
            parent,
        ));
        trace!(class = class.0, namespace = id.0, "class statics created");
        self.members.statics.insert(class, id);
        Some(id)
    }

    /// `owner.name` of a function, for diagnostics.
    pub(crate) fn function_subject(&self, function: FunctionId) -> String {
        let f = self.store.function(function);
        format!("{}.{}", self.owner_name(f.owner), self.store.name(f.name))
    }

    pub(crate) fn property_subject(&self, property: PropertyId) -> String {
        let p = self.store.property(property);
        format!("{}.{}", self.owner_name(p.owner), self.store.name(p.name))
    }

    fn owner_name(&self, owner: MemberOwner) -> &str {
        match owner {
            MemberOwner::Class(class) => self.store.class(class).fq_name.as_str(),
            MemberOwner::Namespace(namespace) => {
                self.store.namespace(namespace).fq_name.as_unsafe().as_str()
            }
        }
    }

    /// Read the current signature of a function into a [`SignatureData`].
    pub(crate) fn signature_of(&self, function: FunctionId) -> SignatureData {
        let f = self.store.function(function);
        SignatureData {
            return_type: f.return_type,
            receiver_type: f.receiver_type,
            value_params: f.value_params.clone(),
            type_params: f.type_params.clone(),
            errors: f.signature_errors.clone(),
            source: f.signature_source,
        }
    }

    pub(crate) fn write_signature(&mut self, function: FunctionId, data: SignatureData) {
        let f = self.store.function_mut(function);
        f.return_type = data.return_type;
        f.receiver_type = data.receiver_type;
        f.value_params = data.value_params;
        f.type_params = data.type_params;
        f.signature_errors = data.errors;
        f.signature_source = data.source;
    }
}

#[cfg(test)]
#[path = "../../tests/members_tests.rs"]
mod tests;
