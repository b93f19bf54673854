//! fdr: foreign-declaration resolution.
//!
//! Builds typed compiler descriptors for declarations compiled outside the
//! native language: foreign classes, their members and generic signatures,
//! annotations, and units carrying embedded serialized descriptors.
//!
//! ```no_run
//! use fdr::{FqNameUnsafe, ForeignResolver, MemoryMetadata, MemorySource, RawClass, SearchPolicy};
//!
//! let source = MemorySource::new().with_class(RawClass::class("a.Point")).unwrap();
//! let metadata = MemoryMetadata::new();
//! let mut resolver = ForeignResolver::new(&source, &metadata);
//! let point = resolver.resolve_class(&FqNameUnsafe::new("a.Point"), SearchPolicy::PreferNative);
//! assert!(point.is_some());
//! ```

pub use fdr_common as common;
pub use fdr_resolver as resolver;
pub use fdr_source as source;
pub use fdr_types as types;

pub use fdr_common::diagnostics::{Diagnostic, DiagnosticCategory, diagnostic_codes};
pub use fdr_common::names::{FqName, FqNameUnsafe};
pub use fdr_resolver::{
    CURRENT_ABI_VERSION, ForeignResolver, ResolverOptions, SearchPolicy, TypeFlags, TypeUsage,
};
pub use fdr_source::{
    AbiVersion, BlobKind, MemoryMetadata, MemorySource, Modifiers, RawAnnotation, RawClass,
    RawConstant, RawField, RawMethod,
};
pub use fdr_types::{
    ClassDescId, ClassKind, FunctionId, MemberOwner, NamespaceId, PropertyId, TypeFormatter, TypeId,
};

pub mod fixture;
pub use fixture::{Fixture, FixtureError};

pub mod tracing_config;
