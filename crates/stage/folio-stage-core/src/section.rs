//! Section specs: the declarative, serde-facing description of one page section.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use folio_motion_core::{plan, AnimationDescriptor, Config, MotionError, PlayMode};

/// Siblings revealed with deterministic offsets (`base_delay + i * interval`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StaggerGroup {
    #[serde(default)]
    pub base_delay: f32,
    #[serde(default)]
    pub interval: f32,
    pub items: Vec<AnimationDescriptor>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub id: String,
    #[serde(default)]
    pub descriptors: Vec<AnimationDescriptor>,
    #[serde(default)]
    pub groups: Vec<StaggerGroup>,
}

impl SectionSpec {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse section spec")
    }

    /// Flatten into activation order: plain descriptors first, then each group's
    /// items with their stagger offsets folded in.
    ///
    /// Scrubbed descriptors without a `lag` inherit `cfg.scrub_lag`; one-shots
    /// without a `threshold` inherit `cfg.one_shot_threshold`. An explicit 0 is kept.
    /// Groups need a finite, non-negative `base_delay` and `interval`. Every result
    /// is validated.
    pub fn expand(&self, cfg: &Config) -> Result<Vec<AnimationDescriptor>, MotionError> {
        let mut out = Vec::with_capacity(
            self.descriptors.len() + self.groups.iter().map(|g| g.items.len()).sum::<usize>(),
        );
        out.extend(self.descriptors.iter().cloned());
        for group in &self.groups {
            group.validate(&self.id)?;
            let start = out.len();
            out.extend(group.items.iter().cloned());
            plan(group.items.len(), group.base_delay, group.interval).apply(&mut out[start..]);
        }
        for d in &mut out {
            apply_defaults(d, cfg);
            d.validate()?;
        }
        Ok(out)
    }
}

impl StaggerGroup {
    fn validate(&self, section: &str) -> Result<(), MotionError> {
        for (v, field) in [(self.base_delay, "base_delay"), (self.interval, "interval")] {
            if !(v.is_finite() && v >= 0.0) {
                let target = self
                    .items
                    .first()
                    .map_or_else(|| section.to_string(), |d| d.target.clone());
                return Err(MotionError::InvalidValue { target, field });
            }
        }
        Ok(())
    }
}

fn apply_defaults(d: &mut AnimationDescriptor, cfg: &Config) {
    match &mut d.mode {
        PlayMode::Scrubbed { lag } => {
            lag.get_or_insert(cfg.scrub_lag);
        }
        PlayMode::OneShot { threshold, .. } => {
            threshold.get_or_insert(cfg.one_shot_threshold);
        }
    }
}
