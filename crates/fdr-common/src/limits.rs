//! Centralized limits and thresholds for the resolver.
//!
//! Resolution is a synchronous, deeply recursive call graph. These constants
//! bound the recursion of the pure type computations and size the stack
//! segments used when resolution nests deeply.
//!
//! # Solver recursion limits
//!
//! Limits for subtype checking and override matching are expressed through
//! [`fdr_types::recursion::RecursionProfile`]; the constants here are the
//! values those profiles read.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting of class resolution calls (outer classes, supertypes,
/// bounds) before resolution gives up with an error type.
///
/// A real class path never nests anywhere near this deep; hitting it means a
/// declaration source reports a parent chain that loops.
pub const MAX_RESOLUTION_DEPTH: u32 = 512;

/// Maximum depth of a single foreign type expression transformation.
///
/// ```text
/// Map<String, List<Map<String, List<...>>>>
/// ```
pub const MAX_TYPE_TRANSFORM_DEPTH: u32 = 100;

/// Maximum depth of a subtype check over nested type arguments.
pub const MAX_SUBTYPE_DEPTH: u32 = 100;

/// Maximum total number of subtype steps in one query.
pub const MAX_SUBTYPE_ITERATIONS: u32 = 100_000;

// =============================================================================
// Stack growth
// =============================================================================

/// Remaining stack below which resolution switches to a fresh segment.
pub const STACK_RED_ZONE: usize = 64 * 1024;

/// Size of each additional stack segment.
pub const STACK_GROWTH: usize = 1024 * 1024;

// =============================================================================
// Capacity
// =============================================================================

/// Type argument lists up to this length are stored inline.
pub const INLINE_TYPE_ARGS: usize = 4;

/// Highest function arity for which function type classes are synthesized.
pub const MAX_FUNCTION_ARITY: usize = 22;
