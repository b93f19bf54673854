//! In-memory declaration source.
//!
//! Used by embedders that already hold parsed declarations and by every
//! test in the workspace. Classes are indexed by their native name; each
//! top-level class registers its package and all enclosing packages.

use crate::error::SourceError;
use crate::metadata::{EmbeddedBlob, MemoryMetadata};
use crate::raw::{RawClass, RawPackage};
use crate::source::DeclarationSource;
use fdr_common::names::{FqName, FqNameUnsafe};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Default, Debug)]
pub struct MemorySource {
    classes: FxHashMap<FqNameUnsafe, Arc<RawClass>>,
    /// Package name -> top-level class names, in insertion order.
    packages: IndexMap<FqName, IndexSet<FqName>>,
    /// Number of `find_class` calls per requested name.
    queries: RefCell<FxHashMap<FqName, usize>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, class: RawClass) -> Result<(), SourceError> {
        let native = class.native_name();
        if self.classes.contains_key(&native) {
            return Err(SourceError::DuplicateClass(class.name));
        }
        if class.outer.is_none()
            && let Some(fq) = native.to_safe()
        {
            let package = fq.parent();
            self.add_package(package.clone());
            if let Some(members) = self.packages.get_mut(&package) {
                members.insert(fq);
            }
        }
        debug!(class = %native, "registered raw class");
        self.classes.insert(native, Arc::new(class));
        Ok(())
    }

    /// Builder form of [`add_class`](Self::add_class) for fixtures that are
    /// known not to collide.
    pub fn with_class(mut self, class: RawClass) -> Result<Self, SourceError> {
        self.add_class(class)?;
        Ok(self)
    }

    /// Register a package and all of its enclosing packages.
    pub fn add_package(&mut self, package: FqName) {
        let mut current = package;
        while !current.is_root() {
            if self.packages.contains_key(&current) {
                break;
            }
            let parent = current.parent();
            self.packages.insert(current, IndexSet::new());
            current = parent;
        }
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// How many times `find_class` was asked for `name`.
    pub fn query_count(&self, name: &FqName) -> usize {
        self.queries.borrow().get(name).copied().unwrap_or(0)
    }

    pub fn from_json(json: &str) -> Result<(Self, MemoryMetadata), SourceError> {
        let fixture: SourceFixture = serde_json::from_str(json)?;
        fixture.into_parts()
    }

    pub fn from_file(path: &Path) -> Result<(Self, MemoryMetadata), SourceError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

impl DeclarationSource for MemorySource {
    fn find_class(&self, name: &FqName) -> Option<Arc<RawClass>> {
        *self.queries.borrow_mut().entry(name.clone()).or_insert(0) += 1;
        self.classes.get(name.as_unsafe()).cloned()
    }

    fn find_package(&self, name: &FqName) -> Option<RawPackage> {
        self.packages
            .contains_key(name)
            .then(|| RawPackage { name: name.clone() })
    }

    fn list_class_names(&self, package: &FqName) -> Vec<FqName> {
        self.packages
            .get(package)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// JSON shape of a declaration fixture.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SourceFixture {
    #[serde(default)]
    pub classes: Vec<RawClass>,
    /// Packages that exist without containing any class.
    #[serde(default)]
    pub packages: Vec<FqName>,
    #[serde(default)]
    pub blobs: Vec<EmbeddedBlob>,
}

impl SourceFixture {
    pub fn into_parts(self) -> Result<(MemorySource, MemoryMetadata), SourceError> {
        let mut source = MemorySource::new();
        for package in self.packages {
            source.add_package(package);
        }
        for class in self.classes {
            source.add_class(class)?;
        }
        let mut metadata = MemoryMetadata::new();
        for blob in self.blobs {
            metadata.insert(blob);
        }
        Ok((source, metadata))
    }
}

#[cfg(test)]
#[path = "../tests/memory_tests.rs"]
mod tests;
