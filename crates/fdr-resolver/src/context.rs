//! The resolver context.
//!
//! One `ForeignResolver` per compilation owns the descriptor arena, the
//! type interner, every cache and the postponed-task queue, and is threaded
//! by `&mut` through every resolution step. A multi-threaded embedder wraps
//! the whole context in one mutex.
//!
//! Public queries go through [`ForeignResolver::with_postponed`]: the
//! outermost query frame drains the postponed tasks its call chain queued
//! before returning, so callers never observe an annotation without a type.

use crate::cache::ResolutionCache;
use crate::diagnostics::DiagnosticBag;
use crate::members::MemberTables;
use crate::native::NativeDeclarations;
use crate::options::ResolverOptions;
use crate::policy::SearchPolicy;
use crate::postponed::{PendingAction, PostponedTasks};
use fdr_common::diagnostics::{Diagnostic, diagnostic_messages};
use fdr_common::interner::Atom;
use fdr_common::names::{FqName, FqNameUnsafe};
use fdr_source::{BinaryMetadataReader, DeclarationSource, RawClass};
use fdr_types::{
    Builtins, ClassDescId, ConstantValue, DepthCounter, DescriptorStore, NamespaceDescriptor,
    NamespaceId, NamespaceKind, PropertyId, PropertyKind, TypeFormatter, TypeId, TypeInterner,
    TypeProjection,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use tracing::{debug, trace};

pub struct ForeignResolver<'s> {
    pub(crate) source: &'s dyn DeclarationSource,
    pub(crate) metadata: &'s dyn BinaryMetadataReader,
    pub(crate) options: ResolverOptions,
    pub(crate) store: DescriptorStore,
    pub(crate) types: TypeInterner,
    pub(crate) builtins: Builtins,
    pub(crate) root: NamespaceId,
    pub(crate) cache: ResolutionCache,
    pub(crate) natives: NativeDeclarations,
    /// Raw shape behind every foreign class descriptor.
    pub(crate) raw_classes: FxHashMap<ClassDescId, Arc<RawClass>>,
    /// Source answers by name, hits and misses alike.
    pub(crate) raw_lookup: FxHashMap<FqName, Option<Arc<RawClass>>>,
    pub(crate) members: MemberTables,
    pub(crate) postponed: PostponedTasks,
    pub(crate) diagnostics: DiagnosticBag,
    pub(crate) depth: DepthCounter,
    /// Units whose embedded blob was already reported as unusable.
    pub(crate) reported_units: FxHashSet<FqNameUnsafe>,
}

impl<'s> ForeignResolver<'s> {
    pub fn new(source: &'s dyn DeclarationSource, metadata: &'s dyn BinaryMetadataReader) -> Self {
        Self::with_options(source, metadata, ResolverOptions::default())
    }

    pub fn with_options(
        source: &'s dyn DeclarationSource,
        metadata: &'s dyn BinaryMetadataReader,
        options: ResolverOptions,
    ) -> Self {
        let mut store = DescriptorStore::new();
        let mut types = TypeInterner::new();
        let root = store.alloc_namespace(NamespaceDescriptor::new(
            FqName::root(),
            NamespaceKind::Root,
            None,
        ));
        let builtins = Builtins::new(&mut store, &mut types, root);
        let depth = DepthCounter::new(options.max_resolution_depth);
        let mut resolver = Self {
            source,
            metadata,
            options,
            store,
            types,
            builtins,
            root,
            cache: ResolutionCache::new(),
            natives: NativeDeclarations::default(),
            raw_classes: FxHashMap::default(),
            raw_lookup: FxHashMap::default(),
            members: MemberTables::new(),
            postponed: PostponedTasks::new(),
            diagnostics: DiagnosticBag::new(),
            depth,
            reported_units: FxHashSet::default(),
        };
        resolver.register_builtins();
        debug!(natives = resolver.natives.class_count(), "resolver created");
        resolver
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn store(&self) -> &DescriptorStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DescriptorStore {
        &mut self.store
    }

    pub fn types(&self) -> &TypeInterner {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeInterner {
        &mut self.types
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    pub fn root(&self) -> NamespaceId {
        self.root
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    pub fn diagnostics(&self) -> &DiagnosticBag {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }

    pub fn postponed(&self) -> &PostponedTasks {
        &self.postponed
    }

    pub fn formatter(&self) -> TypeFormatter<'_> {
        TypeFormatter::new(&self.store, &self.types)
    }

    /// Raw shape behind a foreign class descriptor.
    pub fn raw_class(&self, class: ClassDescId) -> Option<&RawClass> {
        self.raw_classes.get(&class).map(Arc::as_ref)
    }

    // =========================================================================
    // Source access
    // =========================================================================

    /// Ask the declaration source for a class, at most once per name.
    pub(crate) fn find_raw_class(&mut self, name: &FqNameUnsafe) -> Option<Arc<RawClass>> {
        let safe = name.to_safe()?;
        if let Some(known) = self.raw_lookup.get(&safe) {
            return known.clone();
        }
        let found = self.source.find_class(&safe);
        trace!(class = %safe, found = found.is_some(), "queried declaration source");
        self.raw_lookup.insert(safe, found.clone());
        found
    }

    /// Type of a class applied to its own type parameters.
    pub(crate) fn default_type(&mut self, class: ClassDescId) -> TypeId {
        let params = self.store.class(class).type_params.clone();
        let args: Vec<TypeProjection> = params
            .into_iter()
            .map(|p| TypeProjection::invariant(self.types.parameter(p, false)))
            .collect();
        self.types.class_type(class, args, false)
    }

    // =========================================================================
    // Postponed tasks
    // =========================================================================

    /// Run `f` as a query frame. The outermost frame drains the postponed
    /// queue, including tasks queued while draining.
    pub(crate) fn with_postponed<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let outermost = self.postponed.enter();
        let result = f(self);
        if outermost {
            while let Some(action) = self.postponed.pop() {
                self.run_pending(action);
            }
        }
        self.postponed.leave();
        result
    }

    fn run_pending(&mut self, action: PendingAction) {
        trace!(?action, "running postponed action");
        match action {
            PendingAction::SetAnnotationType { annotation, class } => {
                let ty = match self.resolve_class_inner(&class, SearchPolicy::PreferNative) {
                    Some(id) => self.types.simple(id, false),
                    None => {
                        self.diagnostics.report(
                            &diagnostic_messages::UNRESOLVED_ANNOTATION_CLASS,
                            class.as_str(),
                            &[class.as_str()],
                        );
                        let atom = self.store.intern(class.as_str());
                        self.types.error(atom, false)
                    }
                };
                self.store.set_annotation_type(annotation, ty);
            }
            PendingAction::BindEnumEntry {
                annotation,
                argument,
                element,
            } => {
                let value = self.store.annotation(annotation).argument(argument);
                let value = match (element, value) {
                    (Some(i), Some(ConstantValue::Array(items))) => items.get(i),
                    (None, value) => value,
                    _ => None,
                };
                let Some(ConstantValue::EnumEntry { class, name, .. }) = value.cloned() else {
                    return;
                };
                let entry = self.find_enum_entry(&class, name);
                if entry.is_none() {
                    let entry_name = self.store.name(name).to_string();
                    self.diagnostics.report(
                        &diagnostic_messages::UNRESOLVED_ENUM_ENTRY,
                        class.as_str(),
                        &[&entry_name, class.as_str()],
                    );
                }
                self.store
                    .bind_enum_entry(annotation, argument, element, entry);
            }
        }
    }

    fn find_enum_entry(
        &mut self,
        class: &FqNameUnsafe,
        name: Atom,
    ) -> Option<PropertyId> {
        let enum_class = self.resolve_class_inner(class, SearchPolicy::PreferNative)?;
        let holder = self.store.class(enum_class).class_object?;
        self.store
            .class(holder)
            .properties
            .iter()
            .copied()
            .find(|&p| {
                let property = self.store.property(p);
                property.kind == PropertyKind::EnumEntry && property.name == name
            })
    }
}

#[cfg(test)]
#[path = "../tests/resolver_tests.rs"]
mod tests;
