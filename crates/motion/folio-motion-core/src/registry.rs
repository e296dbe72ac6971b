//! Viewport trigger registry.
//!
//! Each registration observes one element through the injected [`LayoutProbe`]
//! and reports a normalized progress whenever it changes. Geometry is re-read on
//! every tick so resizes and reflows are picked up without invalidation.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::descriptor::TriggerWindow;
use crate::ids::{IdAllocator, TargetKey, TriggerHandle};
use crate::layout::{LayoutProbe, Rect};
use crate::outputs::{MotionEvent, Outputs};

/// Progress changed for a registration during the last tick.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub handle: TriggerHandle,
    pub progress: f32,
}

/// A trigger window resolved against current geometry, in scroll offsets.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScrollRange {
    pub start: f32,
    pub end: f32,
}

impl ScrollRange {
    /// Scroll offset at which `edge.element` of the rect meets `edge.viewport` of the screen.
    pub fn resolve(rect: Rect, viewport_height: f32, window: &TriggerWindow) -> Self {
        let at = |element: f32, viewport: f32| {
            rect.top + element * rect.height - viewport * viewport_height
        };
        Self {
            start: at(window.start.element, window.start.viewport),
            end: at(window.end.element, window.end.viewport),
        }
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// Clamped progress at `scroll`. Inverted ranges pin to 1; empty ranges step at `start`.
    pub fn progress(&self, scroll: f32) -> f32 {
        if self.is_inverted() {
            return 1.0;
        }
        let span = self.end - self.start;
        let p = if span == 0.0 {
            if scroll >= self.start {
                1.0
            } else {
                0.0
            }
        } else {
            (scroll - self.start) / span
        };
        if p.is_nan() {
            0.0
        } else {
            p.clamp(0.0, 1.0)
        }
    }
}

#[derive(Debug)]
struct Entry {
    handle: TriggerHandle,
    trigger: TargetKey,
    window: TriggerWindow,
    last: Option<f32>,
    reported_inverted: bool,
}

/// Registry of scroll observations. Owns its layout probe; never global.
#[derive(Debug)]
pub struct TriggerRegistry<P> {
    probe: P,
    ids: IdAllocator,
    entries: Vec<Entry>,
    updates: Vec<ProgressUpdate>,
}

impl<P: LayoutProbe> TriggerRegistry<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            ids: IdAllocator::new(),
            entries: Vec::new(),
            updates: Vec::new(),
        }
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn probe_mut(&mut self) -> &mut P {
        &mut self.probe
    }

    /// Start observing `trigger`. Handles are allocated in increasing order.
    pub fn register(
        &mut self,
        trigger: impl Into<TargetKey>,
        window: TriggerWindow,
    ) -> TriggerHandle {
        let handle = self.ids.alloc_trigger();
        self.entries.push(Entry {
            handle,
            trigger: trigger.into(),
            window,
            last: None,
            reported_inverted: false,
        });
        handle
    }

    /// Stop observing. Returns false for unknown or already removed handles.
    pub fn unregister(&mut self, handle: TriggerHandle) -> bool {
        match self.entries.binary_search_by_key(&handle, |e| e.handle) {
            Ok(idx) => {
                self.entries.remove(idx);
                self.updates.retain(|u| u.handle != handle);
                true
            }
            Err(_) => false,
        }
    }

    pub fn is_registered(&self, handle: TriggerHandle) -> bool {
        self.entries
            .binary_search_by_key(&handle, |e| e.handle)
            .is_ok()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Last reported progress for a handle.
    pub fn progress(&self, handle: TriggerHandle) -> Option<f32> {
        self.entries
            .binary_search_by_key(&handle, |e| e.handle)
            .ok()
            .and_then(|idx| self.entries[idx].last)
    }

    /// Forget reported values so the next tick reports every observable registration.
    pub fn refresh(&mut self) {
        for e in &mut self.entries {
            e.last = None;
        }
    }

    /// Re-read geometry and collect progress changes in registration order.
    /// Inverted windows are reported once per registration into `out`.
    pub fn tick(&mut self, out: &mut Outputs) -> &[ProgressUpdate] {
        self.updates.clear();
        let viewport = self.probe.viewport();
        for e in &mut self.entries {
            let Some(rect) = self.probe.rect(&e.trigger) else {
                continue;
            };
            let range = ScrollRange::resolve(rect, viewport.height, &e.window);
            if range.is_inverted() && !e.reported_inverted {
                e.reported_inverted = true;
                warn!(
                    "trigger '{}' window starts after it ends ({} > {}); pinning progress to 1",
                    e.trigger, range.start, range.end
                );
                out.push_event(MotionEvent::InvalidWindow {
                    target: e.trigger.clone(),
                });
            }
            let progress = range.progress(viewport.scroll_y);
            if e.last != Some(progress) {
                e.last = Some(progress);
                self.updates.push(ProgressUpdate {
                    handle: e.handle,
                    progress,
                });
            }
        }
        &self.updates
    }
}
