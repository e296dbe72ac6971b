//! Host boundary: layout geometry and target resolution.
//!
//! The registry reads geometry through [`LayoutProbe`]; scopes resolve targets and
//! capture their baselines through [`TargetResolver`]. Hosts (the browser adapter,
//! tests) implement both on one type. [`LayoutSnapshot`] is the reference host
//! model used by the stage and the test suites.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::ids::TargetKey;
use crate::outputs::Change;
use crate::value::PropertyState;

/// Scroll position and height of the scrolling viewport, in px.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll_y: f32,
    pub height: f32,
}

/// Layout box of an element in document coordinates (untransformed).
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f32,
    pub height: f32,
}

/// Geometry source consulted on every registry tick.
pub trait LayoutProbe {
    fn viewport(&self) -> Viewport;
    /// `None` when the element is not mounted.
    fn rect(&self, target: &str) -> Option<Rect>;
}

/// Resolves a target key to a live element and reports its current rendered state.
pub trait TargetResolver {
    /// `None` when the target is not mounted.
    fn resolve(&mut self, target: &str) -> Option<PropertyState>;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MountedTarget {
    pub rect: Rect,
    #[serde(default)]
    pub state: PropertyState,
}

/// In-memory page model: viewport plus mounted targets with their layout and rendered state.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub viewport: Viewport,
    #[serde(default)]
    pub targets: HashMap<TargetKey, MountedTarget>,
}

impl LayoutSnapshot {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            targets: HashMap::new(),
        }
    }

    pub fn set_scroll(&mut self, scroll_y: f32) {
        self.viewport.scroll_y = scroll_y;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Mount (or move) a target. A newly mounted target starts at [`PropertyState::IDENTITY`].
    pub fn mount(&mut self, target: impl Into<TargetKey>, rect: Rect) {
        self.targets
            .entry(target.into())
            .and_modify(|t| t.rect = rect)
            .or_insert(MountedTarget {
                rect,
                state: PropertyState::IDENTITY,
            });
    }

    pub fn unmount(&mut self, target: &str) -> bool {
        self.targets.remove(target).is_some()
    }

    pub fn state(&self, target: &str) -> Option<PropertyState> {
        self.targets.get(target).map(|t| t.state)
    }

    /// Apply changes in order; changes for unmounted targets are dropped.
    pub fn apply_changes(&mut self, changes: &[Change]) {
        for ch in changes {
            if let Some(t) = self.targets.get_mut(&ch.target) {
                t.state = ch.state;
            }
        }
    }
}

impl LayoutProbe for LayoutSnapshot {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn rect(&self, target: &str) -> Option<Rect> {
        self.targets.get(target).map(|t| t.rect)
    }
}

impl TargetResolver for LayoutSnapshot {
    fn resolve(&mut self, target: &str) -> Option<PropertyState> {
        self.state(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remount_keeps_rendered_state() {
        let mut page = LayoutSnapshot::new(Viewport {
            scroll_y: 0.0,
            height: 800.0,
        });
        page.mount(
            "a",
            Rect {
                top: 10.0,
                height: 5.0,
            },
        );
        page.apply_changes(&[Change {
            target: "a".into(),
            state: PropertyState {
                opacity: 0.0,
                ..PropertyState::IDENTITY
            },
        }]);
        page.mount(
            "a",
            Rect {
                top: 20.0,
                height: 5.0,
            },
        );
        assert_eq!(page.rect("a").unwrap().top, 20.0);
        assert_eq!(page.state("a").unwrap().opacity, 0.0);
        assert!(page.unmount("a"));
        assert!(page.resolve("a").is_none());
    }
}
