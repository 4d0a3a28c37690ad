//! Release ledger: every resource acquired for a render state is recorded
//! here and released in reverse acquisition order.

use super::backend::{MaterialHandle, MeshHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// The renderer's drawing surface
    Surface,
    /// Camera orbit controls
    Controls,
    Mesh(MeshHandle),
    Material(MaterialHandle),
}

#[derive(Debug, Default)]
pub struct ResourceLedger {
    entries: Vec<Resource>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, resource: Resource) {
        debug_assert!(
            !self.entries.contains(&resource),
            "{resource:?} recorded twice"
        );
        self.entries.push(resource);
    }

    /// Remove one entry ahead of a full teardown (text rebuilds). Returns
    /// `false` if it was never recorded.
    pub fn forget(&mut self, resource: Resource) -> bool {
        match self.entries.iter().rposition(|r| *r == resource) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Take every entry, most recent first
    pub fn drain_lifo(&mut self) -> Vec<Resource> {
        let mut entries = std::mem::take(&mut self.entries);
        entries.reverse();
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
