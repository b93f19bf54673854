//! Resolver configuration.
//!
//! Every field has a default, so an options file only needs to mention what
//! it changes:
//!
//! ```json
//! { "sam_adapters": false, "abi_version": { "major": 2, "minor": 0, "patch": 0 } }
//! ```

use fdr_common::limits::MAX_RESOLUTION_DEPTH;
use fdr_common::names::FqNameUnsafe;
use fdr_source::AbiVersion;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// ABI version of embedded blobs this resolver reads.
pub const CURRENT_ABI_VERSION: AbiVersion = AbiVersion::new(1, 0, 0);

#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("cannot parse resolver options: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read resolver options: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Embedded blobs with any other version are rejected.
    pub abi_version: AbiVersion,
    /// Native names of annotations marking a foreign type as not-null.
    pub not_null_annotations: Vec<String>,
    /// Native names of annotations marking a foreign type as nullable.
    pub nullable_annotations: Vec<String>,
    /// Annotations under these packages carry compiler metadata and are
    /// never surfaced as descriptors.
    pub internal_annotation_prefixes: Vec<String>,
    pub sam_adapters: bool,
    pub sam_constructors: bool,
    pub max_resolution_depth: u32,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            abi_version: CURRENT_ABI_VERSION,
            not_null_annotations: vec![
                "org.jetbrains.annotations.NotNull".to_string(),
                "javax.annotation.Nonnull".to_string(),
            ],
            nullable_annotations: vec![
                "org.jetbrains.annotations.Nullable".to_string(),
                "javax.annotation.Nullable".to_string(),
            ],
            internal_annotation_prefixes: vec!["fdr.runtime.metadata".to_string()],
            sam_adapters: true,
            sam_constructors: true,
            max_resolution_depth: MAX_RESOLUTION_DEPTH,
        }
    }
}

impl ResolverOptions {
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, OptionsError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn is_not_null_annotation(&self, name: &FqNameUnsafe) -> bool {
        self.not_null_annotations.iter().any(|a| a == name.as_str())
    }

    pub fn is_nullable_annotation(&self, name: &FqNameUnsafe) -> bool {
        self.nullable_annotations.iter().any(|a| a == name.as_str())
    }

    /// Whether an annotation is compiler-internal and filtered from results.
    pub fn is_internal_annotation(&self, name: &FqNameUnsafe) -> bool {
        self.is_not_null_annotation(name)
            || self.is_nullable_annotation(name)
            || self
                .internal_annotation_prefixes
                .iter()
                .any(|prefix| name.starts_with(&FqNameUnsafe::new(prefix)))
    }
}

#[cfg(test)]
#[path = "../tests/options_tests.rs"]
mod tests;
