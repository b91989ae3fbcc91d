//! The explicit stack that replaces recursion during tree traversal.

use crate::oid::Oid;

/// Trees whose sizes are being computed, most recent last.
///
/// This is, roughly, the call stack of a recursive walk.
#[derive(Debug, Default)]
pub struct WorkStack {
    oids: Vec<Oid>,
}

impl WorkStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.oids.len()
    }

    /// Returns true if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.oids.is_empty()
    }

    /// Schedule `oid` on top of the stack.
    pub fn push(&mut self, oid: Oid) {
        tracing::trace!(%oid, depth = self.oids.len(), "queue tree");
        self.oids.push(oid);
    }

    /// The entry on top of the stack, without removing it.
    pub fn peek(&self) -> Option<Oid> {
        self.oids.last().copied()
    }

    /// Remove the entry on top of the stack.
    pub fn drop_top(&mut self) -> Option<Oid> {
        self.oids.pop()
    }

    /// Discard every pending entry.
    pub fn clear(&mut self) {
        self.oids.clear();
    }

    /// Log the pending entries, bottom first.
    pub fn dump(&self) {
        tracing::trace!("work stack has {} items", self.oids.len());
        for (i, oid) in self.oids.iter().enumerate() {
            tracing::trace!("{:8} {}", i, oid);
        }
    }
}
