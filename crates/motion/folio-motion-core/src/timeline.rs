//! Animation timeline engine.
//!
//! [`evaluate`] / [`evaluate_from`] are pure: the same descriptor, baseline and
//! progress always give the same [`PropertyState`]. Per-binding mutable state
//! (scrub smoothing, one-shot latches and playback clocks) lives in
//! [`BindingTrack`], which the owning scope drives.

use crate::descriptor::{AnimationDescriptor, PlayMode, PropertyDelta, TweenDirection};
use crate::value::PropertyState;

/// Smoothed scrub values closer than this snap to the raw progress.
pub const SCRUB_SNAP_EPSILON: f32 = 1e-4;

/// The state the delta describes, applied to `baseline`.
pub fn delta_state(delta: &PropertyDelta, baseline: &PropertyState) -> PropertyState {
    PropertyState {
        x: baseline.x + delta.dx,
        y: baseline.y + delta.dy,
        scale: delta.scale.unwrap_or(baseline.scale),
        opacity: delta.opacity.unwrap_or(baseline.opacity),
    }
}

/// Interpolated state for `progress` against an untransformed, visible baseline.
pub fn evaluate(descriptor: &AnimationDescriptor, progress: f32) -> PropertyState {
    evaluate_from(descriptor, &PropertyState::IDENTITY, progress)
}

/// Interpolated state for `progress` (clamped to [0, 1]) against `baseline`.
pub fn evaluate_from(
    descriptor: &AnimationDescriptor,
    baseline: &PropertyState,
    progress: f32,
) -> PropertyState {
    let eased = descriptor.ease.apply(progress);
    let end = delta_state(&descriptor.delta, baseline);
    match descriptor.tween {
        TweenDirection::From => end.lerp(baseline, eased),
        TweenDirection::To => baseline.lerp(&end, eased),
    }
}

/// Fires once, the first time observed progress exceeds the threshold.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OneShotLatch {
    threshold: f32,
    fired: bool,
}

impl OneShotLatch {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            fired: false,
        }
    }

    /// True exactly on the observation that fires the latch.
    pub fn observe(&mut self, progress: f32) -> bool {
        if self.fired || !(progress > self.threshold) {
            return false;
        }
        self.fired = true;
        true
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn reset(&mut self) {
        self.fired = false;
    }
}

/// Scrub follower. With `lag == 0` the shown value is the raw progress.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScrubTrack {
    lag: f32,
    raw: Option<f32>,
    shown: Option<f32>,
}

impl ScrubTrack {
    pub fn new(lag: f32) -> Self {
        Self {
            lag,
            raw: None,
            shown: None,
        }
    }

    /// Record raw progress. Returns the value to show now, if it changed.
    /// The first observation always snaps.
    pub fn set_progress(&mut self, progress: f32) -> Option<f32> {
        self.raw = Some(progress);
        if self.lag <= 0.0 || self.shown.is_none() {
            if self.shown == Some(progress) {
                return None;
            }
            self.shown = Some(progress);
            return self.shown;
        }
        None
    }

    /// Move the shown value towards raw progress by one frame of exponential smoothing.
    pub fn advance(&mut self, dt: f32) -> Option<f32> {
        let (Some(raw), Some(shown)) = (self.raw, self.shown) else {
            return None;
        };
        if shown == raw || !(dt > 0.0) {
            return None;
        }
        let alpha = 1.0 - (-dt / self.lag).exp();
        let mut next = shown + (raw - shown) * alpha;
        if (raw - next).abs() < SCRUB_SNAP_EPSILON {
            next = raw;
        }
        self.shown = Some(next);
        Some(next)
    }

    pub fn shown(&self) -> Option<f32> {
        self.shown
    }

    pub fn is_settled(&self) -> bool {
        self.raw == self.shown
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlaybackPhase {
    Waiting,
    Playing,
    Done,
}

/// Time-driven playback of a fired one-shot.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OneShotTrack {
    latch: OneShotLatch,
    delay: f32,
    duration: f32,
    elapsed: f32,
    last_t: f32,
    phase: PlaybackPhase,
}

/// What a one-shot did in response to progress or time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum OneShotStep {
    Idle,
    /// Latch fired; playback clock started.
    Fired,
    /// Playback reached normalized time `t`.
    Progressed { t: f32 },
    /// Playback finished (t == 1). `fired` is set when firing and finishing happened together.
    Completed { fired: bool },
}

impl OneShotTrack {
    pub fn new(threshold: f32, delay: f32, duration: f32) -> Self {
        Self {
            latch: OneShotLatch::new(threshold),
            delay,
            duration,
            elapsed: 0.0,
            last_t: 0.0,
            phase: PlaybackPhase::Waiting,
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == PlaybackPhase::Done
    }

    /// Feed trigger progress. Later progress changes, in either direction, are ignored once fired.
    pub fn observe(&mut self, progress: f32) -> OneShotStep {
        if !self.latch.observe(progress) {
            return OneShotStep::Idle;
        }
        if self.delay <= 0.0 && self.duration <= 0.0 {
            self.phase = PlaybackPhase::Done;
            self.last_t = 1.0;
            return OneShotStep::Completed { fired: true };
        }
        self.phase = PlaybackPhase::Playing;
        OneShotStep::Fired
    }

    pub fn advance(&mut self, dt: f32) -> OneShotStep {
        if self.phase != PlaybackPhase::Playing || !(dt > 0.0) {
            return OneShotStep::Idle;
        }
        self.elapsed += dt;
        let local = self.elapsed - self.delay;
        let t = if local < 0.0 {
            0.0
        } else if self.duration <= 0.0 {
            1.0
        } else {
            (local / self.duration).min(1.0)
        };
        if t >= 1.0 {
            self.phase = PlaybackPhase::Done;
            self.last_t = 1.0;
            return OneShotStep::Completed { fired: false };
        }
        if t == self.last_t {
            return OneShotStep::Idle;
        }
        self.last_t = t;
        OneShotStep::Progressed { t }
    }

    pub fn reset(&mut self) {
        self.latch.reset();
        self.elapsed = 0.0;
        self.last_t = 0.0;
        self.phase = PlaybackPhase::Waiting;
    }
}

/// Per-binding runtime state chosen by the descriptor's mode.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BindingTrack {
    Scrub(ScrubTrack),
    OneShot(OneShotTrack),
}

impl BindingTrack {
    pub fn for_mode(mode: &PlayMode) -> Self {
        match *mode {
            PlayMode::Scrubbed { lag } => {
                BindingTrack::Scrub(ScrubTrack::new(lag.unwrap_or(0.0)))
            }
            PlayMode::OneShot {
                threshold,
                delay,
                duration,
            } => BindingTrack::OneShot(OneShotTrack::new(
                threshold.unwrap_or(0.0),
                delay,
                duration,
            )),
        }
    }

    pub fn reset(&mut self) {
        match self {
            BindingTrack::Scrub(track) => *track = ScrubTrack::new(track.lag),
            BindingTrack::OneShot(track) => track.reset(),
        }
    }
}
