//! Foreign generic signatures into native types.
//!
//! - `type_params`: two-phase type parameter resolution
//! - `scope`: name lookup of type variables across method, class and outer
//!   class scopes
//! - `transform`: the usage-driven type transformer

mod scope;
mod transform;
mod type_params;

pub use scope::TypeVariableResolver;

use bitflags::bitflags;

/// Where a foreign type occurs. Decides nullability, collection mutability
/// and which projections are allowed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeUsage {
    /// Return types and read-only property types.
    MemberSignatureCovariant,
    /// Value parameter types.
    MemberSignatureContravariant,
    /// Mutable property types.
    MemberSignatureInvariant,
    TypeArgument,
    UpperBound,
    Supertype,
    SupertypeArgument,
}

impl TypeUsage {
    pub fn is_member_signature(self) -> bool {
        matches!(
            self,
            Self::MemberSignatureCovariant
                | Self::MemberSignatureContravariant
                | Self::MemberSignatureInvariant
        )
    }

    /// Usage for the arguments of a type used in this position.
    pub fn argument_usage(self) -> Self {
        match self {
            Self::Supertype | Self::SupertypeArgument => Self::SupertypeArgument,
            _ => Self::TypeArgument,
        }
    }

    fn is_supertype(self) -> bool {
        matches!(self, Self::Supertype | Self::SupertypeArgument)
    }
}

bitflags! {
    /// Per-occurrence modifiers of a transformed type.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u8 {
        /// A not-null marker annotation is present.
        const NOT_NULL = 1 << 0;
        /// A nullable marker annotation is present.
        const NULLABLE = 1 << 1;
        /// The last parameter of a varargs method.
        const VARARG = 1 << 2;
    }
}

impl TypeFlags {
    pub fn nullable_in(self, usage: TypeUsage) -> bool {
        if self.contains(Self::NULLABLE) {
            return true;
        }
        usage.is_member_signature() && !self.contains(Self::NOT_NULL)
    }
}
