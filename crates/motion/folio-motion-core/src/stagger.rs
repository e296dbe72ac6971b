//! Staggered reveal coordinator.
//!
//! Offsets are a function of declaration index only, never of the order in which
//! items happen to become visible.

use serde::{Deserialize, Serialize};

use crate::descriptor::{AnimationDescriptor, PlayMode};

/// offset(i) = base + i · interval, for i in 0..count.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StaggerPlan {
    offsets: Vec<f32>,
}

/// Build the plan for `item_count` siblings. Offsets only increase with the index
/// for a positive `interval`; callers building plans from untrusted input should
/// reject negative values first.
pub fn plan(item_count: usize, base_delay: f32, interval: f32) -> StaggerPlan {
    StaggerPlan {
        offsets: (0..item_count)
            .map(|i| base_delay + i as f32 * interval)
            .collect(),
    }
}

impl StaggerPlan {
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn offset(&self, index: usize) -> Option<f32> {
        self.offsets.get(index).copied()
    }

    pub fn offsets(&self) -> &[f32] {
        &self.offsets
    }

    /// (index, offset) pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.offsets.iter().copied().enumerate()
    }

    /// Fold each planned offset into the matching descriptor: one-shots gain it as
    /// extra delay (seconds), scrubbed items have their window moved up by it
    /// (fraction of the viewport). Items beyond the plan are left unchanged.
    pub fn apply(&self, items: &mut [AnimationDescriptor]) {
        for (d, offset) in items.iter_mut().zip(self.offsets.iter().copied()) {
            match &mut d.mode {
                PlayMode::OneShot { delay, .. } => *delay += offset,
                PlayMode::Scrubbed { .. } => d.window = d.window.delayed_by(offset),
            }
        }
    }
}
