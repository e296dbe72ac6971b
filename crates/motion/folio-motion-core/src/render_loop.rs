//! Realtime render loop for the ambient 3D object.
//!
//! The loop owns its own clock and never reads scroll state. Each tick adds the
//! frame delta to `elapsed`, recomputes rotation as `elapsed * rate` and hands
//! the frame to a [`RenderSurface`]. A surface failure stops the loop and leaves
//! the last valid frame in place.

use std::cell::Cell;
use std::rc::Rc;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Bobbing wrapper transform layered over the base rotation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatEffect {
    pub speed: f32,
    pub rotation_intensity: f32,
    pub float_intensity: f32,
}

impl Default for FloatEffect {
    fn default() -> Self {
        Self {
            speed: 2.0,
            rotation_intensity: 1.0,
            float_intensity: 1.0,
        }
    }
}

impl FloatEffect {
    /// Wrapper rotation (radians) and vertical offset at `elapsed` seconds.
    pub fn sample(&self, elapsed: f32) -> ([f32; 3], f32) {
        let t = elapsed * self.speed / 4.0;
        let rotation = [
            (t.cos() / 8.0) * self.rotation_intensity,
            (t.sin() / 8.0) * self.rotation_intensity,
            (t.sin() / 20.0) * self.rotation_intensity,
        ];
        let offset_y = (t.sin() / 10.0) * self.float_intensity;
        (rotation, offset_y)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderLoopCfg {
    /// Angular rate per axis in rad/s.
    pub rate: [f32; 3],
    pub float: Option<FloatEffect>,
}

impl Default for RenderLoopCfg {
    fn default() -> Self {
        Self {
            rate: [0.2, 0.3, 0.0],
            float: Some(FloatEffect::default()),
        }
    }
}

/// Transform of the animated object after the latest tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderLoopState {
    pub elapsed: f32,
    pub rotation: [f32; 3],
    pub float_rotation: [f32; 3],
    pub float_offset: f32,
    pub frame: u64,
}

/// Per-frame hook into the renderer.
pub trait RenderSurface {
    fn present(&mut self, state: &RenderLoopState) -> Result<(), RenderError>;
}

/// Surface that accepts every frame. Used headless and in tests.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn present(&mut self, _state: &RenderLoopState) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Cancels the loop it was handed out by. Clones share the same flag.
#[derive(Clone, Debug)]
pub struct LoopHandle {
    running: Rc<Cell<bool>>,
}

impl LoopHandle {
    /// Idempotent; takes effect before the next tick.
    pub fn stop(&self) {
        self.running.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LoopStatus {
    Stopped,
    /// Running, but the frame delta was not positive.
    Idle,
    Advanced,
    /// The surface failed this tick; the loop is now stopped.
    ContextLost,
}

#[derive(Debug)]
pub struct RenderLoop {
    cfg: RenderLoopCfg,
    state: RenderLoopState,
    running: Rc<Cell<bool>>,
}

impl RenderLoop {
    pub fn new(cfg: RenderLoopCfg) -> Self {
        Self {
            cfg,
            state: RenderLoopState::default(),
            running: Rc::new(Cell::new(false)),
        }
    }

    pub fn cfg(&self) -> &RenderLoopCfg {
        &self.cfg
    }

    /// Start ticking. While already running this returns a handle to the same loop.
    pub fn start(&mut self) -> LoopHandle {
        self.running.set(true);
        LoopHandle {
            running: Rc::clone(&self.running),
        }
    }

    pub fn stop(&self) {
        self.running.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn state(&self) -> &RenderLoopState {
        &self.state
    }

    /// Advance by `dt` seconds and present. Stopped loops and non-positive deltas
    /// leave the state untouched.
    pub fn tick(&mut self, dt: f32, surface: &mut dyn RenderSurface) -> LoopStatus {
        if !self.is_running() {
            return LoopStatus::Stopped;
        }
        if !(dt > 0.0) {
            return LoopStatus::Idle;
        }
        let next = self.sample(self.state.elapsed + dt);
        match surface.present(&next) {
            Ok(()) => {
                self.state = next;
                LoopStatus::Advanced
            }
            Err(err) => {
                warn!(
                    "render surface failed at {:.3}s: {err}; stopping render loop",
                    next.elapsed
                );
                self.stop();
                LoopStatus::ContextLost
            }
        }
    }

    fn sample(&self, elapsed: f32) -> RenderLoopState {
        let [rx, ry, rz] = self.cfg.rate;
        let (float_rotation, float_offset) = match &self.cfg.float {
            Some(effect) => effect.sample(elapsed),
            None => ([0.0; 3], 0.0),
        };
        RenderLoopState {
            elapsed,
            rotation: [elapsed * rx, elapsed * ry, elapsed * rz],
            float_rotation,
            float_offset,
            frame: self.state.frame + 1,
        }
    }
}
