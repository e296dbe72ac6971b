//! Output contracts.
//!
//! Outputs carry the property changes produced this step, keyed by target, and a
//! separate list of semantic events. Hosts apply changes in order; a later change
//! for the same target supersedes an earlier one.

use serde::{Deserialize, Serialize};

use crate::ids::{ScopeId, TargetKey};
use crate::value::PropertyState;

/// One target's new rendered state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub target: TargetKey,
    pub state: PropertyState,
}

/// Discrete signals emitted while activating, stepping and reverting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MotionEvent {
    ScopeActivated {
        scope: ScopeId,
        section: String,
        bound: usize,
        skipped: usize,
    },
    ScopeReverted {
        scope: ScopeId,
        section: String,
        restored: usize,
    },
    /// Descriptor target (or trigger) was not mounted at activation; it stays inert.
    TargetSkipped {
        scope: ScopeId,
        target: TargetKey,
    },
    OneShotFired {
        scope: ScopeId,
        target: TargetKey,
    },
    OneShotCompleted {
        scope: ScopeId,
        target: TargetKey,
    },
    /// Window start lies after its end; progress is pinned to 1.
    InvalidWindow {
        target: TargetKey,
    },
    RenderContextLost {
        elapsed: f32,
    },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<MotionEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_change(&mut self, target: impl Into<TargetKey>, state: PropertyState) {
        self.changes.push(Change {
            target: target.into(),
            state,
        });
    }

    #[inline]
    pub fn push_event(&mut self, event: MotionEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }

    /// Changes addressed to `target`, in emission order.
    pub fn changes_for<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a Change> + 'a {
        self.changes.iter().filter(move |c| c.target == target)
    }
}
