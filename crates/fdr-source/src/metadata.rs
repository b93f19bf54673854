//! Embedded serialized-descriptor blobs.
//!
//! Units compiled by the native compiler carry their descriptors in a
//! serialized blob next to the foreign bytecode. The resolver prefers the
//! blob over the raw shape when one exists and its ABI version matches.

use fdr_common::names::FqNameUnsafe;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ABI version tag written next to an embedded blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbiVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl AbiVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for AbiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlobKind {
    Class,
    Package,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedBlob {
    /// Native name of the class or package the blob describes.
    pub unit: FqNameUnsafe,
    pub kind: BlobKind,
    pub version: AbiVersion,
    /// Serialized payload.
    pub data: String,
}

/// Reads the embedded blob of a compiled unit, if it has one.
pub trait BinaryMetadataReader {
    fn read_embedded_blob(&self, unit: &FqNameUnsafe, kind: BlobKind) -> Option<EmbeddedBlob>;
}

/// In-memory blob table.
#[derive(Default, Debug)]
pub struct MemoryMetadata {
    blobs: FxHashMap<(FqNameUnsafe, BlobKind), EmbeddedBlob>,
}

impl MemoryMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, blob: EmbeddedBlob) {
        self.blobs.insert((blob.unit.clone(), blob.kind), blob);
    }

    /// Serialize `payload` as JSON and store it under `unit`.
    pub fn insert_serialized<T: Serialize>(
        &mut self,
        unit: &str,
        kind: BlobKind,
        version: AbiVersion,
        payload: &T,
    ) -> Result<(), serde_json::Error> {
        let data = serde_json::to_string(payload)?;
        self.insert(EmbeddedBlob {
            unit: FqNameUnsafe::new(unit),
            kind,
            version,
            data,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BinaryMetadataReader for MemoryMetadata {
    fn read_embedded_blob(&self, unit: &FqNameUnsafe, kind: BlobKind) -> Option<EmbeddedBlob> {
        self.blobs.get(&(unit.clone(), kind)).cloned()
    }
}
