//! Foreign-declaration resolution engine.
//!
//! [`ForeignResolver`] turns raw foreign declarations (from a
//! [`DeclarationSource`](fdr_source::DeclarationSource)) and embedded
//! serialized blobs (from a
//! [`BinaryMetadataReader`](fdr_source::BinaryMetadataReader)) into native
//! descriptors:
//!
//! - classes and namespaces, cached with negative results and a search
//!   policy against native declarations
//! - generic signatures transformed by usage context
//! - members resolved lazily by name, with signatures propagated from
//!   overridden super members and replaced by external signatures
//! - annotations with enum entries bound by postponed tasks
//! - SAM constructors and adapters for single-abstract-method interfaces
//!
//! Everything runs on one thread through `&mut ForeignResolver`.

pub mod annotations;
pub mod cache;
pub mod class_resolution;
pub mod context;
pub mod deserialization;
pub mod diagnostics;
pub mod generics;
pub mod members;
pub mod native;
pub mod options;
pub mod policy;
pub mod postponed;

pub use cache::{CacheEntry, Lookup, ResolutionCache};
pub use context::ForeignResolver;
pub use deserialization::{
    BlobError, SerializedClass, SerializedConstructor, SerializedFunction, SerializedPackage,
    SerializedProjection, SerializedProperty, SerializedType, SerializedTypeParameter,
    SerializedValueParameter,
};
pub use diagnostics::DiagnosticBag;
pub use generics::{TypeFlags, TypeUsage, TypeVariableResolver};
pub use members::{
    ExternalSignature, ExternalSignatureError, RawMemberKey, RawMemberKind, SignatureData,
    parse_external_signature,
};
pub use native::NativeDeclarations;
pub use options::{CURRENT_ABI_VERSION, OptionsError, ResolverOptions};
pub use policy::SearchPolicy;
pub use postponed::{PendingAction, PostponedTasks};
