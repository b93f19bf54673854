//! Arena identifiers for descriptors.
//!
//! Every descriptor lives in the [`DescriptorStore`](crate::store::DescriptorStore)
//! and is referred to by a dense `u32` index. Index 0 is reserved so that a
//! zeroed id is never mistaken for a real descriptor.

use serde::Serialize;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Sentinel value for an unallocated id.
            pub const INVALID: Self = Self(0);

            /// First valid id.
            pub const FIRST_VALID: u32 = 1;

            pub const fn is_valid(self) -> bool {
                self.0 >= Self::FIRST_VALID
            }

            /// Position in the arena vector. Invalid ids map past the end.
            #[inline]
            pub(crate) fn index(self) -> usize {
                self.0.wrapping_sub(Self::FIRST_VALID) as usize
            }

            #[inline]
            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32 + Self::FIRST_VALID)
            }
        }
    };
}

arena_id!(
    /// Class, interface, enum, annotation class or synthesized holder.
    ClassDescId
);
arena_id!(
    /// Package, class-statics namespace or the root.
    NamespaceId
);
arena_id!(
    /// Function or constructor.
    FunctionId
);
arena_id!(PropertyId);
arena_id!(TypeParamId);
arena_id!(AnnotationId);

/// Owner of a member: a class, or a namespace for static and package members.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum MemberOwner {
    Class(ClassDescId),
    Namespace(NamespaceId),
}

/// Declaration that contains a class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ClassParent {
    Namespace(NamespaceId),
    Class(ClassDescId),
}

/// Declaration that owns a type parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TypeParamOwner {
    Class(ClassDescId),
    Function(FunctionId),
    /// Type parameters of an external signature before it is accepted.
    Detached,
}
