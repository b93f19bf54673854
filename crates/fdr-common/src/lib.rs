//! Common types and utilities for the fdr foreign-declaration resolver.
//!
//! This crate provides foundational types used across all fdr crates:
//! - String interning (`Atom`, `Interner`)
//! - Fully-qualified names (`FqName`, `FqNameUnsafe`, `ClassId`) and the
//!   foreign-to-native name translation
//! - Diagnostic records and the message catalogue
//! - Resolver limits and thresholds

// String interning for member and parameter names
pub mod interner;
pub use interner::{Atom, Interner};

// Fully-qualified name model
pub mod names;
pub use names::{ClassId, FqName, FqNameUnsafe, translate_foreign_name};

// Diagnostics produced by resolution
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticMessage, format_message};

// Centralized limits and thresholds
pub mod limits;
