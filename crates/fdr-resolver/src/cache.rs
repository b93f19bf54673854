//! Memoization of class and namespace resolution.
//!
//! A class name moves from absent to cached exactly once. The first write
//! happens before the descriptor is filled (`Materializing`), which is what
//! makes self-referential hierarchies terminate: a recursive query for the
//! same name finds the incomplete descriptor instead of starting over.

use fdr_common::names::{FqName, FqNameUnsafe};
use fdr_types::{ClassDescId, InvariantViolation, NamespaceId, fatal};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CacheEntry {
    /// Allocated and visible, still being filled in.
    Materializing(ClassDescId),
    Resolved(ClassDescId),
}

impl CacheEntry {
    pub fn id(self) -> ClassDescId {
        match self {
            Self::Materializing(id) | Self::Resolved(id) => id,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    Hit(T),
    /// Looked up before and not found.
    Negative,
    Miss,
}

#[derive(Debug, Default)]
pub struct ResolutionCache {
    classes: FxHashMap<FqNameUnsafe, CacheEntry>,
    missing_classes: FxHashSet<FqNameUnsafe>,
    namespaces: FxHashMap<FqName, NamespaceId>,
    missing_namespaces: FxHashSet<FqName>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup_class(&self, name: &FqNameUnsafe) -> Lookup<CacheEntry> {
        if let Some(entry) = self.classes.get(name) {
            return Lookup::Hit(*entry);
        }
        if self.missing_classes.contains(name) {
            return Lookup::Negative;
        }
        Lookup::Miss
    }

    /// Insert a freshly allocated descriptor. Any existing entry for the
    /// name is a double write.
    pub fn begin_class(&mut self, name: &FqNameUnsafe, id: ClassDescId) {
        if let Some(existing) = self.classes.get(name) {
            fatal(InvariantViolation::DoubleCacheWrite {
                name: name.to_string(),
                existing: format!("{existing:?}"),
                attempted: format!("{:?}", CacheEntry::Materializing(id)),
            });
        }
        self.check_not_missing(name, id);
        trace!(class = %name, id = id.0, "materializing");
        self.classes.insert(name.clone(), CacheEntry::Materializing(id));
    }

    /// Mark a materializing entry as complete.
    pub fn complete_class(&mut self, name: &FqNameUnsafe, id: ClassDescId) {
        match self.classes.get(name).copied() {
            Some(CacheEntry::Materializing(existing)) if existing == id => {
                trace!(class = %name, id = id.0, "resolved");
                self.classes.insert(name.clone(), CacheEntry::Resolved(id));
            }
            Some(CacheEntry::Resolved(existing)) if existing == id => {}
            existing => fatal(InvariantViolation::DoubleCacheWrite {
                name: name.to_string(),
                existing: format!("{existing:?}"),
                attempted: format!("{:?}", CacheEntry::Resolved(id)),
            }),
        }
    }

    /// Record a class that is fully resolved the moment it is cached
    /// (deserialized or synthesized descriptors).
    pub fn insert_resolved_class(&mut self, name: &FqNameUnsafe, id: ClassDescId) {
        match self.classes.get(name).copied() {
            None => {
                self.check_not_missing(name, id);
                self.classes.insert(name.clone(), CacheEntry::Resolved(id));
            }
            Some(entry) if entry.id() == id => {
                self.classes.insert(name.clone(), CacheEntry::Resolved(id));
            }
            Some(existing) => fatal(InvariantViolation::DoubleCacheWrite {
                name: name.to_string(),
                existing: format!("{existing:?}"),
                attempted: format!("{:?}", CacheEntry::Resolved(id)),
            }),
        }
    }

    pub fn record_missing_class(&mut self, name: &FqNameUnsafe) {
        if let Some(existing) = self.classes.get(name) {
            fatal(InvariantViolation::DoubleCacheWrite {
                name: name.to_string(),
                existing: format!("{existing:?}"),
                attempted: "NotFound".to_string(),
            });
        }
        trace!(class = %name, "not found");
        self.missing_classes.insert(name.clone());
    }

    fn check_not_missing(&self, name: &FqNameUnsafe, id: ClassDescId) {
        if self.missing_classes.contains(name) {
            fatal(InvariantViolation::DoubleCacheWrite {
                name: name.to_string(),
                existing: "NotFound".to_string(),
                attempted: format!("{id:?}"),
            });
        }
    }

    pub fn lookup_namespace(&self, name: &FqName) -> Lookup<NamespaceId> {
        if let Some(id) = self.namespaces.get(name) {
            return Lookup::Hit(*id);
        }
        if self.missing_namespaces.contains(name) {
            return Lookup::Negative;
        }
        Lookup::Miss
    }

    pub fn insert_namespace(&mut self, name: &FqName, id: NamespaceId) {
        match self.namespaces.get(name) {
            Some(existing) if *existing == id => {}
            Some(existing) => fatal(InvariantViolation::DoubleCacheWrite {
                name: name.to_string(),
                existing: format!("{existing:?}"),
                attempted: format!("{id:?}"),
            }),
            None if self.missing_namespaces.contains(name) => {
                fatal(InvariantViolation::DoubleCacheWrite {
                    name: name.to_string(),
                    existing: "NotFound".to_string(),
                    attempted: format!("{id:?}"),
                })
            }
            None => {
                trace!(namespace = %name, id = id.0, "namespace resolved");
                self.namespaces.insert(name.clone(), id);
            }
        }
    }

    pub fn record_missing_namespace(&mut self, name: &FqName) {
        if let Some(existing) = self.namespaces.get(name) {
            fatal(InvariantViolation::DoubleCacheWrite {
                name: name.to_string(),
                existing: format!("{existing:?}"),
                attempted: "NotFound".to_string(),
            });
        }
        self.missing_namespaces.insert(name.clone());
    }

    pub fn resolved_class_count(&self) -> usize {
        self.classes
            .values()
            .filter(|e| matches!(e, CacheEntry::Resolved(_)))
            .count()
    }

    pub fn missing_class_count(&self) -> usize {
        self.missing_classes.len()
    }
}

#[cfg(test)]
#[path = "../tests/cache_tests.rs"]
mod tests;
