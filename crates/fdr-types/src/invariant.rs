//! Fatal invariant violations.
//!
//! These never describe bad input: a declaration source may be arbitrarily
//! broken and resolution still degrades to error types and diagnostics.
//! An `InvariantViolation` means the resolver itself is in an inconsistent
//! state, and continuing would hand out two descriptors for one entity.

use thiserror::Error;
use tracing::error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("cache entry for '{name}' written twice: {existing} then {attempted}")]
    DoubleCacheWrite {
        name: String,
        existing: String,
        attempted: String,
    },

    #[error("parent '{parent}' of '{name}' cannot be resolved")]
    MissingParent { name: String, parent: String },

    #[error("upper bounds of type parameter '{param}' read before initialization")]
    UninitializedBounds { param: String },

    #[error("upper bounds of type parameter '{param}' initialized twice")]
    BoundsInitializedTwice { param: String },

    #[error("'{name}' is declared natively and the search policy forbids it")]
    NativeDeclarationConflict { name: String },
}

/// Abort resolution. The violation is traced before unwinding so that it
/// survives in structured logs even when the panic is caught upstream.
#[cold]
#[track_caller]
pub fn fatal(violation: InvariantViolation) -> ! {
    error!(%violation, "resolver invariant violated");
    panic!("{violation}");
}
