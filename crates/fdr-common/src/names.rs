//! Fully-qualified name model.
//!
//! Two name flavors exist:
//!
//! | Type | May contain synthetic segments | Example |
//! |------|-------------------------------|---------|
//! | `FqNameUnsafe` | Yes | `a.E.<class-object-for-E>` |
//! | `FqName` | No | `a.Outer.Inner` |
//!
//! Foreign binary names nest with `$` (`a.Outer$Inner`) and may use `/` as
//! the package separator (`java/util/Map$Entry`). [`translate_foreign_name`]
//! is the only place where foreign nesting becomes native nesting.

use memchr::memchr;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Prefix of the synthetic segment naming a class's holder (class object).
pub const CLASS_OBJECT_PREFIX: &str = "<class-object-for-";

/// Suffix of compiler-synthesized trait implementation helpers.
pub const TRAIT_IMPL_SUFFIX: &str = "$TImpl";

// =============================================================================
// FqNameUnsafe
// =============================================================================

/// A dotted name that may embed synthetic segments.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FqNameUnsafe(Arc<str>);

impl FqNameUnsafe {
    /// The root name (empty string).
    pub fn root() -> Self {
        Self(Arc::from(""))
    }

    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the dotted segments. The root has no segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|s| !s.is_empty())
    }

    /// Last segment, or the empty string for the root.
    pub fn short_name(&self) -> &str {
        match self.0.rfind('.') {
            Some(dot) => &self.0[dot + 1..],
            None => &self.0,
        }
    }

    /// The enclosing name. The parent of a single-segment name is the root,
    /// and the root is its own parent.
    pub fn parent(&self) -> Self {
        match self.0.rfind('.') {
            Some(dot) => Self::new(&self.0[..dot]),
            None => Self::root(),
        }
    }

    pub fn child(&self, name: &str) -> Self {
        if self.is_root() {
            Self::new(name)
        } else {
            Self(Arc::from(format!("{}.{name}", self.0)))
        }
    }

    /// A name is safe when none of its segments is synthetic.
    pub fn is_safe(&self) -> bool {
        !self.segments().any(|s| s.starts_with('<'))
    }

    pub fn to_safe(&self) -> Option<FqName> {
        self.is_safe().then(|| FqName(self.clone()))
    }

    /// Whether the last segment names a class's synthesized holder.
    pub fn is_class_object_name(&self) -> bool {
        self.short_name().starts_with(CLASS_OBJECT_PREFIX)
    }

    /// Name of the synthesized holder nested in `self`.
    pub fn class_object_name(&self) -> Self {
        self.child(&format!("{CLASS_OBJECT_PREFIX}{}>", self.short_name()))
    }

    /// Whether this names a compiler-synthesized helper that never surfaces
    /// as a declaration (trait implementation holders).
    pub fn is_compiler_synthesized(&self) -> bool {
        self.short_name().ends_with(TRAIT_IMPL_SUFFIX)
    }

    pub fn starts_with(&self, prefix: &FqNameUnsafe) -> bool {
        if prefix.is_root() {
            return true;
        }
        self.0.starts_with(prefix.as_str())
            && matches!(self.0.as_bytes().get(prefix.0.len()), None | Some(b'.'))
    }
}

impl fmt::Display for FqNameUnsafe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl fmt::Debug for FqNameUnsafe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FqNameUnsafe({self})")
    }
}

impl From<&str> for FqNameUnsafe {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// =============================================================================
// FqName
// =============================================================================

/// A dotted name guaranteed to contain only real declaration segments.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FqName(FqNameUnsafe);

impl FqName {
    pub fn root() -> Self {
        Self(FqNameUnsafe::root())
    }

    /// Create a safe name. Returns `None` when a segment is synthetic.
    pub fn new(name: &str) -> Option<Self> {
        FqNameUnsafe::new(name).to_safe()
    }

    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut name = FqNameUnsafe::root();
        for segment in segments {
            name = name.child(segment);
        }
        name.to_safe()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_root()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.segments()
    }

    pub fn short_name(&self) -> &str {
        self.0.short_name()
    }

    pub fn parent(&self) -> Self {
        Self(self.0.parent())
    }

    /// Append a segment. Synthetic segments are rejected.
    pub fn child(&self, name: &str) -> Option<Self> {
        if name.starts_with('<') {
            return None;
        }
        Some(Self(self.0.child(name)))
    }

    #[inline]
    pub fn as_unsafe(&self) -> &FqNameUnsafe {
        &self.0
    }

    #[inline]
    pub fn to_unsafe(&self) -> FqNameUnsafe {
        self.0.clone()
    }
}

impl fmt::Display for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FqName({self})")
    }
}

impl TryFrom<String> for FqName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        FqName::new(&value).ok_or_else(|| format!("'{value}' contains a synthetic segment"))
    }
}

impl From<FqName> for String {
    fn from(value: FqName) -> Self {
        value.as_str().to_string()
    }
}

// =============================================================================
// ClassId
// =============================================================================

/// Identifies a class relative to its package so that top-level and nested
/// declarations with the same dotted spelling stay distinguishable.
///
/// `a.b.Outer.Inner` has `package = a.b`, `relative = Outer.Inner`.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ClassId {
    pub package: FqName,
    pub relative: FqNameUnsafe,
}

impl ClassId {
    pub fn new(package: FqName, relative: FqNameUnsafe) -> Self {
        Self { package, relative }
    }

    pub fn top_level(fq_name: &FqName) -> Self {
        Self {
            package: fq_name.parent(),
            relative: FqNameUnsafe::new(fq_name.short_name()),
        }
    }

    /// Build a class id from a foreign binary name (`a/b/Outer$Inner` or
    /// `a.b.Outer$Inner`).
    pub fn from_foreign(binary_name: &str) -> Self {
        let dotted = binary_name.replace('/', ".");
        let (package, relative) = match dotted.rfind('.') {
            Some(dot) => (&dotted[..dot], &dotted[dot + 1..]),
            None => ("", dotted.as_str()),
        };
        Self {
            package: FqName::new(package).unwrap_or_else(FqName::root),
            relative: translate_relative(relative),
        }
    }

    pub fn is_nested(&self) -> bool {
        self.relative.as_str().contains('.')
    }

    /// Id of the directly enclosing class, if nested.
    pub fn outer(&self) -> Option<Self> {
        self.is_nested().then(|| Self {
            package: self.package.clone(),
            relative: self.relative.parent(),
        })
    }

    pub fn nested(&self, name: &str) -> Self {
        Self {
            package: self.package.clone(),
            relative: self.relative.child(name),
        }
    }

    pub fn short_name(&self) -> &str {
        self.relative.short_name()
    }

    /// The single dotted name in the native namespace scheme.
    pub fn as_fq_name(&self) -> FqNameUnsafe {
        let mut result = self.package.to_unsafe();
        for segment in self.relative.segments() {
            result = result.child(segment);
        }
        result
    }

    /// The foreign binary spelling (`a.b.Outer$Inner`).
    pub fn to_foreign(&self) -> String {
        let relative = self.relative.segments().collect::<Vec<_>>().join("$");
        if self.package.is_root() {
            relative
        } else {
            format!("{}.{relative}", self.package)
        }
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package.as_str(), self.relative.as_str())
    }
}

// =============================================================================
// Name translation
// =============================================================================

/// Translate a foreign binary class name into its canonical native name.
///
/// `java/util/Map$Entry` and `java.util.Map$Entry` both become
/// `java.util.Map.Entry`. Trait implementation helpers keep their `$TImpl`
/// segment so that [`FqNameUnsafe::is_compiler_synthesized`] still sees it.
pub fn translate_foreign_name(binary_name: &str) -> FqNameUnsafe {
    ClassId::from_foreign(binary_name).as_fq_name()
}

fn translate_relative(relative: &str) -> FqNameUnsafe {
    let mut result = FqNameUnsafe::root();
    let mut rest = relative;
    while let Some(pos) = memchr(b'$', rest.as_bytes()) {
        // `Foo$TImpl` stays a single segment
        if rest[pos..] == *TRAIT_IMPL_SUFFIX {
            break;
        }
        // `Foo$$Bar` or a trailing `$` is part of a synthetic name
        if pos == 0 || pos + 1 == rest.len() {
            break;
        }
        result = result.child(&rest[..pos]);
        rest = &rest[pos + 1..];
    }
    result.child(rest)
}

#[cfg(test)]
#[path = "../tests/names_tests.rs"]
mod tests;
