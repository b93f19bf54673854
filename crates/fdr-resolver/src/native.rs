//! Declarations of the native language known to the resolver.
//!
//! Builtins are registered when the resolver is created; embedders add
//! their own with [`ForeignResolver::register_native_class`] and
//! [`ForeignResolver::register_native_namespace`]. Every query that crosses
//! the foreign/native boundary consults this table through its
//! [`SearchPolicy`](crate::SearchPolicy).

use crate::context::ForeignResolver;
use fdr_common::names::{FqName, FqNameUnsafe};
use fdr_types::{
    ClassDescId, ClassDescriptor, ClassKind, ClassParent, DescriptorOrigin, Modality,
    NamespaceDescriptor, NamespaceId, NamespaceKind,
};
use rustc_hash::FxHashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct NativeDeclarations {
    classes: FxHashMap<FqNameUnsafe, ClassDescId>,
    namespaces: FxHashMap<FqName, NamespaceId>,
}

impl NativeDeclarations {
    pub fn class(&self, name: &FqNameUnsafe) -> Option<ClassDescId> {
        self.classes.get(name).copied()
    }

    pub fn namespace(&self, name: &FqName) -> Option<NamespaceId> {
        self.namespaces.get(name).copied()
    }

    pub(crate) fn insert_class(&mut self, name: FqNameUnsafe, id: ClassDescId) {
        self.classes.insert(name, id);
    }

    pub(crate) fn insert_namespace(&mut self, name: FqName, id: NamespaceId) {
        self.namespaces.insert(name, id);
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}

impl ForeignResolver<'_> {
    /// Register a native package (and its enclosing packages).
    pub fn register_native_namespace(&mut self, name: &FqName) -> NamespaceId {
        if name.is_root() {
            return self.root;
        }
        if let Some(id) = self.natives.namespace(name) {
            return id;
        }
        let parent = self.register_native_namespace(&name.parent());
        let id = self.store.alloc_namespace(NamespaceDescriptor::new(
            name.clone(),
            NamespaceKind::Native,
            Some(parent),
        ));
        debug!(namespace = %name, "registered native namespace");
        self.natives.insert_namespace(name.clone(), id);
        id
    }

    /// Register a top-level native class. The class gets `Any` as its only
    /// supertype and no members; embedders fill in the rest through
    /// [`store_mut`](Self::store_mut).
    pub fn register_native_class(&mut self, name: &FqName, kind: ClassKind) -> ClassDescId {
        if let Some(id) = self.natives.class(name.as_unsafe()) {
            return id;
        }
        let package = self.register_native_namespace(&name.parent());
        let short = self.store.intern(name.short_name());
        let mut descriptor = ClassDescriptor::new(
            name.to_unsafe(),
            short,
            kind,
            ClassParent::Namespace(package),
            DescriptorOrigin::Native,
        );
        descriptor.modality = match kind {
            ClassKind::Interface | ClassKind::AnnotationClass => Modality::Abstract,
            _ => Modality::Final,
        };
        descriptor.supertypes.push(self.builtins.any_type);
        let id = self.store.alloc_class(descriptor);
        debug!(class = %name, "registered native class");
        self.natives.insert_class(name.to_unsafe(), id);
        id
    }

    pub(crate) fn register_builtins(&mut self) {
        let core = self.builtins.core;
        let core_name = self.store.namespace(core).fq_name.clone();
        self.natives.insert_namespace(core_name, core);
        for &class in self.builtins.classes() {
            let name = self.store.class(class).fq_name.clone();
            self.natives.insert_class(name, class);
        }
    }

    /// Whether `name` is a native class or namespace.
    pub fn is_native(&self, name: &FqNameUnsafe) -> bool {
        self.natives.class(name).is_some()
            || name
                .to_safe()
                .is_some_and(|safe| self.natives.namespace(&safe).is_some())
    }
}
