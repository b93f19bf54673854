//! Type representation and interning.
//!
//! Types are structural values interned into a [`TypeInterner`]; equal
//! structure yields the same [`TypeId`], so type equality is an integer
//! comparison. A type is a classifier (class or type parameter) applied to
//! projected arguments, plus a nullability flag.
//!
//! | Variant | Example |
//! |---------|---------|
//! | `Class` | `MutableList<out String>?` |
//! | `Parameter` | `T`, `T?` |
//! | `Error` | unresolved `a.b.Missing` |

use crate::ids::{ClassDescId, TypeParamId};
use fdr_common::interner::Atom;
use fdr_common::limits::INLINE_TYPE_ARGS;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Interned type handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// The anonymous, non-nullable error type. Always interned at index 0.
    pub const ERROR: TypeId = TypeId(0);
}

/// Declaration-site or use-site variance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variance {
    Invariant,
    In,
    Out,
}

impl Variance {
    pub fn opposite(self) -> Self {
        match self {
            Self::Invariant => Self::Invariant,
            Self::In => Self::Out,
            Self::Out => Self::In,
        }
    }

    /// Variance of a position nested under `self` with variance `inner`.
    pub fn compose(self, inner: Variance) -> Self {
        match (self, inner) {
            (Self::Invariant, _) | (_, Self::Invariant) => Self::Invariant,
            (Self::Out, v) => v,
            (Self::In, v) => v.opposite(),
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Invariant => "",
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

/// A type argument.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TypeProjection {
    /// `*`: any instantiation.
    Star,
    Type { variance: Variance, ty: TypeId },
}

impl TypeProjection {
    pub fn invariant(ty: TypeId) -> Self {
        Self::Type {
            variance: Variance::Invariant,
            ty,
        }
    }

    pub fn out(ty: TypeId) -> Self {
        Self::Type {
            variance: Variance::Out,
            ty,
        }
    }

    pub fn contravariant(ty: TypeId) -> Self {
        Self::Type {
            variance: Variance::In,
            ty,
        }
    }

    pub fn ty(self) -> Option<TypeId> {
        match self {
            Self::Star => None,
            Self::Type { ty, .. } => Some(ty),
        }
    }

    /// Projection kind; a star behaves as `out` for reading.
    pub fn variance(self) -> Variance {
        match self {
            Self::Star => Variance::Out,
            Self::Type { variance, .. } => variance,
        }
    }

    pub fn is_star(self) -> bool {
        matches!(self, Self::Star)
    }
}

pub type TypeArgs = SmallVec<[TypeProjection; INLINE_TYPE_ARGS]>;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TypeData {
    Class {
        class: ClassDescId,
        args: TypeArgs,
        nullable: bool,
    },
    Parameter {
        param: TypeParamId,
        nullable: bool,
    },
    /// Placeholder for a classifier that could not be resolved. Carries the
    /// name that failed so that diagnostics and rendering can show it.
    Error {
        name: Atom,
        nullable: bool,
    },
}

impl TypeData {
    pub fn is_nullable(&self) -> bool {
        match self {
            Self::Class { nullable, .. }
            | Self::Parameter { nullable, .. }
            | Self::Error { nullable, .. } => *nullable,
        }
    }

    fn with_nullable(&self, value: bool) -> Self {
        let mut copy = self.clone();
        match &mut copy {
            Self::Class { nullable, .. }
            | Self::Parameter { nullable, .. }
            | Self::Error { nullable, .. } => *nullable = value,
        }
        copy
    }
}

// =============================================================================
// TypeInterner
// =============================================================================

pub struct TypeInterner {
    map: FxHashMap<TypeData, TypeId>,
    types: Vec<TypeData>,
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInterner {
    pub fn new() -> Self {
        let mut interner = Self {
            map: FxHashMap::default(),
            types: Vec::with_capacity(512),
        };
        let error = interner.intern(TypeData::Error {
            name: Atom::NONE,
            nullable: false,
        });
        debug_assert_eq!(error, TypeId::ERROR);
        interner
    }

    pub fn intern(&mut self, data: TypeData) -> TypeId {
        if let Some(&id) = self.map.get(&data) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(data.clone());
        self.map.insert(data, id);
        id
    }

    /// Structure of an interned type. Unknown ids read as the error type.
    #[inline]
    pub fn lookup(&self, id: TypeId) -> &TypeData {
        self.types.get(id.0 as usize).unwrap_or(&self.types[0])
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.len() <= 1
    }

    // -------------------------------------------------------------------------
    // Constructors
    // -------------------------------------------------------------------------

    pub fn class_type(
        &mut self,
        class: ClassDescId,
        args: impl IntoIterator<Item = TypeProjection>,
        nullable: bool,
    ) -> TypeId {
        self.intern(TypeData::Class {
            class,
            args: args.into_iter().collect(),
            nullable,
        })
    }

    /// A class type without arguments.
    pub fn simple(&mut self, class: ClassDescId, nullable: bool) -> TypeId {
        self.class_type(class, [], nullable)
    }

    pub fn parameter(&mut self, param: TypeParamId, nullable: bool) -> TypeId {
        self.intern(TypeData::Parameter { param, nullable })
    }

    pub fn error(&mut self, name: Atom, nullable: bool) -> TypeId {
        self.intern(TypeData::Error { name, nullable })
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn is_nullable(&self, id: TypeId) -> bool {
        self.lookup(id).is_nullable()
    }

    pub fn is_error(&self, id: TypeId) -> bool {
        matches!(self.lookup(id), TypeData::Error { .. })
    }

    pub fn with_nullability(&mut self, id: TypeId, nullable: bool) -> TypeId {
        let data = self.lookup(id);
        if data.is_nullable() == nullable {
            return id;
        }
        let data = data.with_nullable(nullable);
        self.intern(data)
    }

    pub fn class_of(&self, id: TypeId) -> Option<ClassDescId> {
        match self.lookup(id) {
            TypeData::Class { class, .. } => Some(*class),
            _ => None,
        }
    }

    pub fn param_of(&self, id: TypeId) -> Option<TypeParamId> {
        match self.lookup(id) {
            TypeData::Parameter { param, .. } => Some(*param),
            _ => None,
        }
    }

    pub fn args_of(&self, id: TypeId) -> &[TypeProjection] {
        match self.lookup(id) {
            TypeData::Class { args, .. } => args,
            _ => &[],
        }
    }

    /// Replace the classifier of a class type, keeping arguments and
    /// nullability.
    pub fn with_class(&mut self, id: TypeId, class: ClassDescId) -> TypeId {
        match self.lookup(id).clone() {
            TypeData::Class { args, nullable, .. } => self.intern(TypeData::Class {
                class,
                args,
                nullable,
            }),
            _ => id,
        }
    }

    pub fn with_args(&mut self, id: TypeId, new_args: TypeArgs) -> TypeId {
        match self.lookup(id).clone() {
            TypeData::Class {
                class, nullable, ..
            } => self.intern(TypeData::Class {
                class,
                args: new_args,
                nullable,
            }),
            _ => id,
        }
    }
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
