//! Identifiers and simple allocators for registry and lifecycle entities.

use serde::{Deserialize, Serialize};

/// Host-chosen key naming an animated element (a small string, e.g. `"about.header"`).
pub type TargetKey = String;

/// Handle returned by [`TriggerRegistry::register`](crate::registry::TriggerRegistry::register).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct TriggerHandle(pub u32);

/// Identity of one activation of a section. Never reused by a later activation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ScopeId(pub u32);

/// Monotonic allocator for trigger handles and scope ids.
/// Handles are ordered by allocation, which is what gives ticks their declaration order.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_trigger: u32,
    next_scope: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_trigger(&mut self) -> TriggerHandle {
        let id = TriggerHandle(self.next_trigger);
        self.next_trigger = self.next_trigger.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_scope(&mut self) -> ScopeId {
        let id = ScopeId(self.next_scope);
        self.next_scope = self.next_scope.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_trigger(), TriggerHandle(0));
        assert_eq!(alloc.alloc_trigger(), TriggerHandle(1));
        assert_eq!(alloc.alloc_scope(), ScopeId(0));
        assert_eq!(alloc.alloc_scope(), ScopeId(1));
        assert!(TriggerHandle(0) < TriggerHandle(1));
    }
}
