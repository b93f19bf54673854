//! Descriptor and type model for the fdr resolver.
//!
//! This crate owns everything the resolver produces and the pure relations
//! over it:
//!
//! - **Arena** (`DescriptorStore`): classes, namespaces, members, type
//!   parameters and annotations, addressed by dense ids
//! - **Types** (`TypeInterner`, `TypeData`): interned structural types with
//!   use-site projections and nullability
//! - **Builtins** and the **platform class map** (`core.Any`, primitives,
//!   read-only and mutable collections, function classes)
//! - **Relations**: substitution, subtyping, supertype search, erasure and
//!   override classification
//! - **Formatting** for diagnostics and tests
//!
//! Nothing here talks to a declaration source; that is `fdr-resolver`'s job.

pub mod builtins;
pub mod descriptors;
pub mod format;
pub mod ids;
pub mod invariant;
pub mod overrides;
pub mod platform;
pub mod recursion;
pub mod store;
pub mod subst;
pub mod subtype;
pub mod types;

pub use builtins::{Builtins, CollectionPair, PrimitiveType};
pub use descriptors::{
    AnnotationDescriptor, ClassDescriptor, ClassKind, ConstantValue, DescriptorOrigin,
    FunctionDescriptor, FunctionKind, Modality, NamespaceDescriptor, NamespaceKind, OverrideKind,
    PropertyDescriptor, PropertyKind, SignatureSource, TypeParameterDescriptor, ValueParameter,
    Visibility,
};
pub use format::TypeFormatter;
pub use ids::{
    AnnotationId, ClassDescId, ClassParent, FunctionId, MemberOwner, NamespaceId, PropertyId,
    TypeParamId, TypeParamOwner,
};
pub use invariant::{InvariantViolation, fatal};
pub use overrides::{MemberShape, OverrideCheck, SubstitutedMember};
pub use platform::{CollectionKind, PlatformClass, is_object_public_method, platform_class};
pub use recursion::{DepthCounter, RecursionGuard, RecursionProfile, RecursionResult};
pub use store::DescriptorStore;
pub use subst::TypeSubstitutor;
pub use subtype::{ErasedType, TypeRelations};
pub use types::{TypeArgs, TypeData, TypeId, TypeInterner, TypeProjection, Variance};
