//! A declaration set loaded from disk together with resolver options.
//!
//! A resolver borrows its source and metadata, so the fixture owns both and
//! hands out resolvers on demand.

use fdr_resolver::{ForeignResolver, OptionsError, ResolverOptions};
use fdr_source::{MemoryMetadata, MemorySource, SourceError};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("{0}")]
    Source(#[from] SourceError),

    #[error("{0}")]
    Options(#[from] OptionsError),
}

#[derive(Debug, Default)]
pub struct Fixture {
    pub source: MemorySource,
    pub metadata: MemoryMetadata,
    pub options: ResolverOptions,
}

impl Fixture {
    pub fn new(source: MemorySource, metadata: MemoryMetadata) -> Self {
        Self {
            source,
            metadata,
            options: ResolverOptions::default(),
        }
    }

    /// Parse a declaration fixture (`classes`, `packages`, `blobs`).
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        let (source, metadata) = MemorySource::from_json(json)?;
        Ok(Self::new(source, metadata))
    }

    pub fn from_file(path: &Path) -> Result<Self, FixtureError> {
        let (source, metadata) = MemorySource::from_file(path)?;
        debug!(path = %path.display(), classes = source.class_count(), blobs = metadata.len(), "fixture loaded");
        Ok(Self::new(source, metadata))
    }

    /// Replace the options with those read from an options file.
    pub fn with_options_file(mut self, path: &Path) -> Result<Self, FixtureError> {
        self.options = ResolverOptions::from_file(path)?;
        Ok(self)
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn resolver(&self) -> ForeignResolver<'_> {
        ForeignResolver::with_options(&self.source, &self.metadata, self.options.clone())
    }
}
