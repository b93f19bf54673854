//! Platform class map: foreign library classes that have a builtin
//! counterpart.
//!
//! A mapped foreign class never gets a descriptor of its own when it occurs
//! in a signature; the type transformer substitutes the builtin. Collection
//! interfaces map to a read-only/mutable pair and the usage context picks
//! the side.

use crate::builtins::{Builtins, CollectionPair, PrimitiveType};
use crate::ids::ClassDescId;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Iterable,
    Iterator,
    Collection,
    List,
    Set,
    Map,
    MapEntry,
    ListIterator,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PlatformClass {
    Any,
    String,
    CharSequence,
    Number,
    Throwable,
    Comparable,
    Enum,
    Annotation,
    /// Boxed primitive (`java.lang.Integer`).
    Boxed(PrimitiveType),
    Collection(CollectionKind),
}

static PLATFORM_CLASSES: Lazy<FxHashMap<&'static str, PlatformClass>> = Lazy::new(|| {
    use CollectionKind as C;
    use PlatformClass as P;
    let entries: [(&str, PlatformClass); 24] = [
        ("java.lang.Object", P::Any),
        ("java.lang.String", P::String),
        ("java.lang.CharSequence", P::CharSequence),
        ("java.lang.Number", P::Number),
        ("java.lang.Throwable", P::Throwable),
        ("java.lang.Comparable", P::Comparable),
        ("java.lang.Enum", P::Enum),
        ("java.lang.annotation.Annotation", P::Annotation),
        ("java.lang.Boolean", P::Boxed(PrimitiveType::Boolean)),
        ("java.lang.Character", P::Boxed(PrimitiveType::Char)),
        ("java.lang.Byte", P::Boxed(PrimitiveType::Byte)),
        ("java.lang.Short", P::Boxed(PrimitiveType::Short)),
        ("java.lang.Integer", P::Boxed(PrimitiveType::Int)),
        ("java.lang.Long", P::Boxed(PrimitiveType::Long)),
        ("java.lang.Float", P::Boxed(PrimitiveType::Float)),
        ("java.lang.Double", P::Boxed(PrimitiveType::Double)),
        ("java.lang.Iterable", P::Collection(C::Iterable)),
        ("java.util.Iterator", P::Collection(C::Iterator)),
        ("java.util.Collection", P::Collection(C::Collection)),
        ("java.util.List", P::Collection(C::List)),
        ("java.util.Set", P::Collection(C::Set)),
        ("java.util.Map", P::Collection(C::Map)),
        ("java.util.Map.Entry", P::Collection(C::MapEntry)),
        ("java.util.ListIterator", P::Collection(C::ListIterator)),
    ];
    entries.into_iter().collect()
});

/// Public methods of the foreign root object class, as `(name, descriptor)`.
/// A SAM interface re-declaring one of these still has a single abstract
/// method.
pub const OBJECT_PUBLIC_METHODS: &[(&str, &str)] = &[
    ("equals", "(Ljava/lang/Object;)Z"),
    ("hashCode", "()I"),
    ("toString", "()Ljava/lang/String;"),
];

/// Look up a foreign class by its native name (`java.util.Map.Entry`).
pub fn platform_class(native_name: &str) -> Option<PlatformClass> {
    PLATFORM_CLASSES.get(native_name).copied()
}

pub fn is_object_public_method(name: &str, descriptor: &str) -> bool {
    OBJECT_PUBLIC_METHODS
        .iter()
        .any(|(n, d)| *n == name && *d == descriptor)
}

impl Builtins {
    fn collection(&self, kind: CollectionKind) -> CollectionPair {
        match kind {
            CollectionKind::Iterable => self.iterable,
            CollectionKind::Iterator => self.iterator,
            CollectionKind::Collection => self.collection,
            CollectionKind::List => self.list,
            CollectionKind::Set => self.set,
            CollectionKind::Map => self.map,
            CollectionKind::MapEntry => self.map_entry,
            CollectionKind::ListIterator => self.list_iterator,
        }
    }

    /// The builtin class a platform class maps to. `read_only` picks the
    /// side of a collection pair and is ignored otherwise.
    pub fn platform_mapped(&self, class: PlatformClass, read_only: bool) -> ClassDescId {
        match class {
            PlatformClass::Any => self.any,
            PlatformClass::String => self.string,
            PlatformClass::CharSequence => self.char_sequence,
            PlatformClass::Number => self.number,
            PlatformClass::Throwable => self.throwable,
            PlatformClass::Comparable => self.comparable,
            PlatformClass::Enum => self.enum_class,
            PlatformClass::Annotation => self.annotation,
            PlatformClass::Boxed(primitive) => self.primitive(primitive),
            PlatformClass::Collection(kind) => {
                let pair = self.collection(kind);
                if read_only { pair.read_only } else { pair.mutable }
            }
        }
    }
}
