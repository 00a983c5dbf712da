//! Resolution path bookkeeping for cycle detection.
//!
//! The graph of services is never known up front: it is discovered one
//! edge at a time as factories call back into `resolve`. The
//! [`ResolutionPath`] records every name whose factory has started but
//! whose instance has not been memoized yet.
//!
//! It is not a call stack. Entries are not popped when a resolution
//! returns; they are pruned lazily at the start of the next `resolve`, and
//! only once the name is in the resolved cache. A name whose resolution
//! failed inside its factory therefore stays on the path for good, and
//! every later request for it reports the same cycle.

use std::collections::HashSet;

use crate::name::ServiceName;

/// Ordered record of names awaiting their first resolution.
///
/// Keeps an ordered list for reporting plus a set for membership tests.
#[derive(Debug, Default)]
pub(crate) struct ResolutionPath {
    order: Vec<ServiceName>,
    members: HashSet<ServiceName>,
}

impl ResolutionPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` as in flight.
    pub fn push(&mut self, name: ServiceName) {
        if self.members.insert(name.clone()) {
            self.order.push(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains(name)
    }

    /// Removes `name` wherever it sits in the path.
    pub fn remove(&mut self, name: &str) -> bool {
        if !self.members.remove(name) {
            return false;
        }
        self.order.retain(|n| n.as_str() != name);
        true
    }

    /// Drops every entry for which `is_resolved` holds.
    ///
    /// Returns how many entries were removed.
    pub fn prune(&mut self, mut is_resolved: impl FnMut(&ServiceName) -> bool) -> usize {
        let before = self.order.len();
        let members = &mut self.members;
        self.order.retain(|name| {
            if is_resolved(name) {
                members.remove(name);
                false
            } else {
                true
            }
        });
        before - self.order.len()
    }

    /// The whole path with its first entry repeated at the end.
    ///
    /// This is the chain reported for a detected cycle. It starts from the
    /// oldest name still in flight, not from the name being requested.
    pub fn cycle(&self) -> Vec<ServiceName> {
        let mut chain = self.order.clone();
        if let Some(first) = self.order.first() {
            chain.push(first.clone());
        }
        chain
    }

    pub fn names(&self) -> &[ServiceName] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }
}
