//! Recursion guards for cycle detection, depth limiting and iteration
//! bounding.
//!
//! Foreign hierarchies are allowed to be cyclic (a broken class path can
//! report `A extends B`, `B extends A`), so every walk over supertypes or
//! type arguments goes through one of these guards.
//!
//! # Profiles
//!
//! [`RecursionProfile`] gives each kind of walk a named limit pair:
//!
//! ```ignore
//! let guard = RecursionGuard::with_profile(RecursionProfile::SubtypeCheck);
//! ```
//!
//! # Safety
//!
//! - **Debug leak detection**: in debug builds, dropping a guard with active
//!   entries panics, catching forgotten `leave()` calls.
//! - **Overflow protection**: iteration counting saturates.

use fdr_common::limits::{
    MAX_RESOLUTION_DEPTH, MAX_SUBTYPE_DEPTH, MAX_SUBTYPE_ITERATIONS, MAX_TYPE_TRANSFORM_DEPTH,
};
use rustc_hash::FxHashSet;
use std::hash::Hash;

// ---------------------------------------------------------------------------
// RecursionProfile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Subtype checks over nested type arguments.
    ///
    /// depth = 100, iterations = 100,000
    SubtypeCheck,

    /// Walking the supertype graph to find a corresponding supertype.
    ///
    /// depth = 100, iterations = 100,000
    SupertypeSearch,

    /// Transforming one foreign type expression.
    ///
    /// depth = 100
    TypeTransform,

    /// Nested class resolution (outer classes, supertypes, bounds).
    ///
    /// depth = 512
    ClassResolution,

    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::SubtypeCheck | Self::SupertypeSearch => MAX_SUBTYPE_DEPTH,
            Self::TypeTransform => MAX_TYPE_TRANSFORM_DEPTH,
            Self::ClassResolution => MAX_RESOLUTION_DEPTH,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::SubtypeCheck | Self::SupertypeSearch => MAX_SUBTYPE_ITERATIONS,
            Self::TypeTransform | Self::ClassResolution => u32::MAX,
            Self::Custom { max_iterations, .. } => max_iterations,
        }
    }
}

// ---------------------------------------------------------------------------
// RecursionResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    /// This key is already being visited.
    Cycle,
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        matches!(self, Self::Entered)
    }

    #[inline]
    pub fn is_cycle(self) -> bool {
        matches!(self, Self::Cycle)
    }

    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

// ---------------------------------------------------------------------------
// RecursionGuard
// ---------------------------------------------------------------------------

/// Tracks the keys currently on the stack of a recursive walk.
///
/// ```ignore
/// match guard.enter(key) {
///     RecursionResult::Entered => {
///         let result = do_work();
///         guard.leave(key);
///         result
///     }
///     RecursionResult::Cycle => assume_true(),
///     _ => give_up(),
/// }
/// ```
pub struct RecursionGuard<K: Hash + Eq + Copy> {
    visiting: FxHashSet<K>,
    depth: u32,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
    exceeded: bool,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self {
            visiting: FxHashSet::default(),
            depth: 0,
            iterations: 0,
            max_depth,
            max_iterations,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth(), profile.max_iterations())
    }

    /// Try to enter the computation for `key`. On `Entered` the caller must
    /// call [`leave`](Self::leave) with the same key.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);

        if self.iterations > self.max_iterations {
            self.exceeded = true;
            return RecursionResult::IterationExceeded;
        }
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return RecursionResult::DepthExceeded;
        }
        if !self.visiting.insert(key) {
            return RecursionResult::Cycle;
        }
        self.depth += 1;
        RecursionResult::Entered
    }

    pub fn leave(&mut self, key: K) {
        let was_present = self.visiting.remove(&key);
        debug_assert!(
            was_present,
            "RecursionGuard::leave() called with a key that is not in the visiting set"
        );
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn is_visiting(&self, key: &K) -> bool {
        self.visiting.contains(key)
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Sticky for the lifetime of the guard.
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.visiting.is_empty() {
            panic!(
                "RecursionGuard dropped with {} active entries still in the visiting set",
                self.visiting.len(),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// DepthCounter
// ---------------------------------------------------------------------------

/// Depth-only guard for walks that legitimately revisit the same key
/// (the same foreign type occurs many times in one signature).
pub struct DepthCounter {
    depth: u32,
    max_depth: u32,
    exceeded: bool,
}

impl DepthCounter {
    pub fn new(max_depth: u32) -> Self {
        Self {
            depth: 0,
            max_depth,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth())
    }

    /// Returns `false` (and records it) when the limit is reached; the
    /// caller must not call `leave()` in that case.
    pub fn enter(&mut self) -> bool {
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return false;
        }
        self.depth += 1;
        true
    }

    pub fn leave(&mut self) {
        debug_assert!(self.depth > 0, "DepthCounter::leave() without enter()");
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }
}

#[cfg(test)]
#[path = "../tests/recursion_tests.rs"]
mod tests;
