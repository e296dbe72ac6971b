//! Core configuration for folio-motion-core.

use serde::{Deserialize, Serialize};

use crate::render_loop::RenderLoopCfg;

/// Defaults applied by hosts and the stage when a descriptor leaves them open.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scrub smoothing in seconds used by section specs that ask for the default lag.
    pub scrub_lag: f32,
    /// Progress a one-shot must exceed before it fires.
    pub one_shot_threshold: f32,
    /// Frame deltas above this (seconds) are clamped, e.g. after a backgrounded tab.
    pub max_frame_dt: f32,
    pub render: RenderLoopCfg,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scrub_lag: 1.0,
            one_shot_threshold: 0.0,
            max_frame_dt: 0.1,
            render: RenderLoopCfg::default(),
        }
    }
}
