//! Raw foreign declaration model for the fdr resolver.
//!
//! This crate describes what the resolver consumes, not what it produces:
//!
//! - **Raw shapes** (`RawClass`, `RawMethod`, `RawField`, `RawAnnotation`):
//!   variant data as reported by a declaration provider
//! - **Capabilities** (`DeclarationSource`, `BinaryMetadataReader`): the two
//!   collaborator interfaces the resolver queries
//! - **Signature parsing**: JVM-style generic signatures and erased
//!   descriptors parsed into `RawType` trees
//! - **In-memory providers** (`MemorySource`, `MemoryMetadata`) used by
//!   embedders and tests, loadable from JSON fixtures

pub mod error;
pub mod memory;
pub mod metadata;
pub mod raw;
pub mod signature;
pub mod source;

pub use error::{SignatureError, SourceError};
pub use memory::{MemorySource, SourceFixture};
pub use metadata::{AbiVersion, BinaryMetadataReader, BlobKind, EmbeddedBlob, MemoryMetadata};
pub use raw::{
    Modifiers, RawAnnotation, RawClass, RawClassKind, RawConstant, RawField, RawMethod,
    RawPackage,
};
pub use signature::{
    ClassSignature, MethodSignature, PrimitiveKind, RawType, RawTypeArg, RawTypeParameter,
    parse_class_signature, parse_field_signature, parse_method_signature,
};
pub use source::DeclarationSource;
