//! Deferred resolution work.
//!
//! Setting an annotation's type requires resolving the annotation class,
//! which may in turn be annotated with the class currently being
//! materialized. Such work is queued here and drained by the outermost
//! query frame once the chain that produced it has finished.

use fdr_common::interner::Atom;
use fdr_common::names::FqNameUnsafe;
use fdr_types::AnnotationId;
use std::collections::VecDeque;
use tracing::trace;

#[derive(Clone, Debug, PartialEq)]
pub enum PendingAction {
    /// Resolve `class` and record it as the type of `annotation`.
    SetAnnotationType {
        annotation: AnnotationId,
        class: FqNameUnsafe,
    },
    /// Bind the enum-entry value of `argument` (or of one array element)
    /// to the entry property in the enum's holder.
    BindEnumEntry {
        annotation: AnnotationId,
        argument: Atom,
        element: Option<usize>,
    },
}

/// FIFO queue of pending actions plus the nesting depth of query frames.
#[derive(Debug, Default)]
pub struct PostponedTasks {
    queue: VecDeque<PendingAction>,
    frames: u32,
    executed: usize,
}

impl PostponedTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a query frame. Returns `true` for the outermost frame, which is
    /// the one that drains the queue.
    pub fn enter(&mut self) -> bool {
        self.frames += 1;
        self.frames == 1
    }

    pub fn leave(&mut self) {
        self.frames = self.frames.saturating_sub(1);
    }

    pub fn push(&mut self, action: PendingAction) {
        trace!(?action, pending = self.queue.len() + 1, "postponed");
        self.queue.push_back(action);
    }

    /// Next action to run, counting it as executed.
    pub fn pop(&mut self) -> Option<PendingAction> {
        let action = self.queue.pop_front()?;
        self.executed += 1;
        Some(action)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Total number of actions handed out by [`pop`](Self::pop).
    pub fn executed(&self) -> usize {
        self.executed
    }
}

#[cfg(test)]
#[path = "../tests/postponed_tests.rs"]
mod tests;
