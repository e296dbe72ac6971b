//! folio-stage
//!
//! Page-level stage: owns the reference layout model, the section lifecycle and
//! the ambient render loop, and turns each host frame into a [`StageFrame`].
//!
//! Mounting and unmounting sections may happen between frames; the changes they
//! produce (initial hidden states, restored baselines) are carried into the next
//! frame so hosts only ever apply changes from one place.

pub mod section;

use std::collections::HashMap;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use folio_motion_core::{
    Change, Config, FrameClock, LayoutSnapshot, LoopHandle, LoopStatus, MotionEvent, Outputs,
    Rect, RenderLoop, RenderLoopState, RenderSurface, ScopeId, SectionLifecycle, Viewport,
};

pub use crate::section::{SectionSpec, StaggerGroup};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageFrame {
    pub epoch: u64,
    pub dt: f32,
    /// Property changes in application order (pending lifecycle changes first, then this frame's).
    pub changes: Vec<Change>,
    pub events: Vec<MotionEvent>,
    /// Render loop transform, present when the loop advanced this frame.
    pub object: Option<RenderLoopState>,
    /// Frame budget actually consumed (`frame_ms`), after clamping.
    pub timings_ms: HashMap<String, f32>,
}

#[derive(Debug)]
pub struct Stage {
    pub epoch: u64,
    config: Config,
    lifecycle: SectionLifecycle<LayoutSnapshot>,
    /// Specs of mounted sections, in mount order.
    specs: IndexMap<String, SectionSpec>,
    render: RenderLoop,
    render_handle: Option<LoopHandle>,
    clock: FrameClock,
    pending: Outputs,
}

impl Stage {
    pub fn new(config: Config) -> Self {
        Self::with_layout(config, LayoutSnapshot::default())
    }

    pub fn with_layout(config: Config, layout: LayoutSnapshot) -> Self {
        Self {
            epoch: 0,
            render: RenderLoop::new(config.render.clone()),
            clock: FrameClock::new(config.max_frame_dt),
            config,
            lifecycle: SectionLifecycle::new(layout),
            specs: IndexMap::new(),
            render_handle: None,
            pending: Outputs::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layout(&self) -> &LayoutSnapshot {
        self.lifecycle.probe()
    }

    pub fn layout_mut(&mut self) -> &mut LayoutSnapshot {
        self.lifecycle.probe_mut()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.layout_mut().set_viewport(viewport);
    }

    pub fn set_scroll(&mut self, scroll_y: f32) {
        self.layout_mut().set_scroll(scroll_y);
    }

    /// Mount or move a target element.
    pub fn set_target(&mut self, target: &str, rect: Rect) {
        self.layout_mut().mount(target, rect);
    }

    /// Unmount a target element. Bindings on it go quiet until its section is remounted.
    pub fn remove_target(&mut self, target: &str) -> bool {
        self.layout_mut().unmount(target)
    }

    /// Activate a section. Remounting an active section reverts its previous scope first.
    pub fn mount_section(&mut self, spec: SectionSpec) -> Result<ScopeId> {
        let descriptors = spec
            .expand(&self.config)
            .with_context(|| format!("invalid section '{}'", spec.id))?;
        let start = self.pending.changes.len();
        let id = self
            .lifecycle
            .activate(&spec.id, descriptors, &mut self.pending);
        self.apply_pending_from(start);
        debug!("mounted section '{}' as {:?}", spec.id, id);
        self.specs.shift_remove(&spec.id);
        self.specs.insert(spec.id.clone(), spec);
        Ok(id)
    }

    pub fn mount_section_json(&mut self, json: &str) -> Result<ScopeId> {
        let spec = SectionSpec::from_json(json)?;
        self.mount_section(spec)
    }

    /// Revert a section, restoring its targets. Returns false if it was not mounted.
    pub fn unmount_section(&mut self, section: &str) -> bool {
        let start = self.pending.changes.len();
        let removed = self.lifecycle.deactivate(section, &mut self.pending);
        self.apply_pending_from(start);
        self.specs.shift_remove(section);
        if removed {
            debug!("unmounted section '{section}'");
        }
        removed
    }

    /// Re-activate every mounted section from its spec, e.g. after the host
    /// re-rendered its markup.
    pub fn remount_all(&mut self) -> Result<()> {
        let specs: Vec<SectionSpec> = self.specs.values().cloned().collect();
        for spec in specs {
            self.mount_section(spec)?;
        }
        Ok(())
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> + '_ {
        self.specs.keys().map(String::as_str)
    }

    pub fn lifecycle(&self) -> &SectionLifecycle<LayoutSnapshot> {
        &self.lifecycle
    }

    /// Start the render loop. While running, the existing handle is returned.
    pub fn start_render_loop(&mut self) -> LoopHandle {
        if let Some(handle) = self.render_handle.as_ref().filter(|h| h.is_running()) {
            return handle.clone();
        }
        self.clock.reset();
        let handle = self.render.start();
        self.render_handle = Some(handle.clone());
        handle
    }

    pub fn stop_render_loop(&mut self) {
        if let Some(handle) = self.render_handle.take() {
            handle.stop();
        }
    }

    pub fn render_state(&self) -> &RenderLoopState {
        self.render.state()
    }

    pub fn is_rendering(&self) -> bool {
        self.render.is_running()
    }

    /// Advance by `dt` seconds: scroll-driven sections first, then the render loop.
    pub fn step(&mut self, dt: f32, surface: &mut dyn RenderSurface) -> StageFrame {
        self.epoch = self.epoch.wrapping_add(1);
        let dt = if dt.is_nan() {
            0.0
        } else {
            dt.clamp(0.0, self.config.max_frame_dt)
        };

        let mut out = std::mem::take(&mut self.pending);
        let start = out.changes.len();
        self.lifecycle.step(dt, &mut out);
        self.layout_mut().apply_changes(&out.changes[start..]);

        let object = match self.render.tick(dt, surface) {
            LoopStatus::Advanced => Some(*self.render.state()),
            LoopStatus::ContextLost => {
                out.push_event(MotionEvent::RenderContextLost {
                    elapsed: self.render.state().elapsed,
                });
                self.render_handle = None;
                None
            }
            LoopStatus::Idle | LoopStatus::Stopped => None,
        };
        let mut timings = HashMap::new();
        timings.insert("frame_ms".to_string(), dt * 1000.0);

        StageFrame {
            epoch: self.epoch,
            dt,
            changes: out.changes,
            events: out.events,
            object,
            timings_ms: timings,
        }
    }

    /// Like [`step`](Self::step), with the delta derived from a host timestamp in ms.
    pub fn step_at(&mut self, timestamp_ms: f64, surface: &mut dyn RenderSurface) -> StageFrame {
        let dt = self.clock.delta(timestamp_ms);
        self.step(dt, surface)
    }

    fn apply_pending_from(&mut self, start: usize) {
        self.lifecycle
            .probe_mut()
            .apply_changes(&self.pending.changes[start..]);
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
