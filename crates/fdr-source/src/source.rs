use crate::raw::{RawClass, RawPackage};
use fdr_common::names::FqName;
use std::sync::Arc;

/// Capability interface over an external code base.
///
/// Names passed in are native names (`a.b.Outer.Inner`); implementations
/// map them to whatever spelling they store. A source is queried at most
/// once per name by the resolver: both hits and misses are cached.
pub trait DeclarationSource {
    /// Raw shape of the class with the given native name.
    fn find_class(&self, name: &FqName) -> Option<Arc<RawClass>>;

    /// Whether a foreign package with the given name exists.
    fn find_package(&self, name: &FqName) -> Option<RawPackage>;

    /// Native names of the top-level classes of a package.
    fn list_class_names(&self, package: &FqName) -> Vec<FqName>;
}

impl<T: DeclarationSource + ?Sized> DeclarationSource for &T {
    fn find_class(&self, name: &FqName) -> Option<Arc<RawClass>> {
        (**self).find_class(name)
    }

    fn find_package(&self, name: &FqName) -> Option<RawPackage> {
        (**self).find_package(name)
    }

    fn list_class_names(&self, package: &FqName) -> Vec<FqName> {
        (**self).list_class_names(package)
    }
}
