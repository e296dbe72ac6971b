//! Declarative animation descriptors.
//!
//! A descriptor names one target, the property delta it animates towards (or
//! from), the easing, the scroll window that drives it and whether it is scrubbed
//! or plays once. Descriptors are validated when built or parsed so the engine
//! never sees an impossible combination.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MotionError;
use crate::ids::TargetKey;
use crate::interp::Easing;

/// One side of a trigger window: "when `element` of the trigger meets `viewport` of the screen".
///
/// Both fields are fractions: `element` of the trigger's height measured from its
/// top, `viewport` of the viewport height measured from its top. Parsed from the
/// familiar two-word form, e.g. `"top 90%"` or `"bottom top"`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TriggerEdge {
    pub element: f32,
    pub viewport: f32,
}

impl TriggerEdge {
    pub const fn new(element: f32, viewport: f32) -> Self {
        Self { element, viewport }
    }
}

fn parse_fraction(token: &str) -> Option<f32> {
    match token {
        "top" | "left" => Some(0.0),
        "center" => Some(0.5),
        "bottom" | "right" => Some(1.0),
        _ => {
            let pct: f32 = token.strip_suffix('%')?.parse().ok()?;
            pct.is_finite().then_some(pct / 100.0)
        }
    }
}

impl FromStr for TriggerEdge {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let edge = match (parts.next(), parts.next(), parts.next()) {
            (Some(el), Some(vp), None) => parse_fraction(el)
                .zip(parse_fraction(vp))
                .map(|(element, viewport)| TriggerEdge { element, viewport }),
            _ => None,
        };
        edge.ok_or_else(|| MotionError::MalformedEdge(s.to_string()))
    }
}

impl TryFrom<String> for TriggerEdge {
    type Error = MotionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TriggerEdge> for String {
    fn from(value: TriggerEdge) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TriggerEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}% {}%", self.element * 100.0, self.viewport * 100.0)
    }
}

/// Scroll range over which progress runs from 0 to 1.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriggerWindow {
    pub start: TriggerEdge,
    pub end: TriggerEdge,
}

impl TriggerWindow {
    pub const fn new(start: TriggerEdge, end: TriggerEdge) -> Self {
        Self { start, end }
    }

    /// Shift both viewport thresholds up by `offset` (fraction of the viewport height).
    /// Later stagger items therefore need more scroll before they start.
    pub fn delayed_by(mut self, offset: f32) -> Self {
        self.start.viewport -= offset;
        self.end.viewport -= offset;
        self
    }
}

impl Default for TriggerWindow {
    /// "top 90%" → "top 60%", the reveal window used by most section headers.
    fn default() -> Self {
        Self {
            start: TriggerEdge::new(0.0, 0.9),
            end: TriggerEdge::new(0.0, 0.6),
        }
    }
}

/// Which end of the progress range shows the delta.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TweenDirection {
    /// Progress 0 shows the delta, progress 1 the baseline (a reveal).
    #[default]
    From,
    /// Progress 0 shows the baseline, progress 1 the delta (a fade-out).
    To,
}

/// Property delta. Offsets are relative to the baseline; `scale` and `opacity`
/// replace the baseline value at the delta end when present.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyDelta {
    pub dx: f32,
    pub dy: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayMode {
    /// Value is a pure function of progress. `lag` (seconds) smooths catch-up;
    /// `None` leaves it to the host default and means exact tracking in the core.
    Scrubbed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lag: Option<f32>,
    },
    /// Plays once, over time, the first time progress exceeds `threshold`
    /// (`None`: host default, 0 in the core).
    OneShot {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        threshold: Option<f32>,
        #[serde(default)]
        delay: f32,
        #[serde(default)]
        duration: f32,
    },
}

impl Default for PlayMode {
    fn default() -> Self {
        PlayMode::Scrubbed { lag: None }
    }
}

impl PlayMode {
    /// Exact scrubbing with no smoothing.
    pub const EXACT: PlayMode = PlayMode::Scrubbed { lag: Some(0.0) };

    pub fn is_one_shot(&self) -> bool {
        matches!(self, PlayMode::OneShot { .. })
    }
}

/// Declares one animated target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationDescriptor {
    pub target: TargetKey,
    /// Element whose position drives progress; the target itself when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<TargetKey>,
    #[serde(default)]
    pub tween: TweenDirection,
    #[serde(default)]
    pub delta: PropertyDelta,
    #[serde(default)]
    pub ease: Easing,
    #[serde(default)]
    pub window: TriggerWindow,
    #[serde(default)]
    pub mode: PlayMode,
}

impl AnimationDescriptor {
    /// A scrubbed `from` reveal with the default window and `power2.out`.
    pub fn scrubbed(target: impl Into<TargetKey>, delta: PropertyDelta) -> Self {
        Self {
            target: target.into(),
            trigger: None,
            tween: TweenDirection::From,
            delta,
            ease: Easing::PowerOut(2),
            window: TriggerWindow::default(),
            mode: PlayMode::Scrubbed { lag: None },
        }
    }

    /// A one-shot `from` reveal firing on first visibility.
    pub fn one_shot(
        target: impl Into<TargetKey>,
        delta: PropertyDelta,
        delay: f32,
        duration: f32,
    ) -> Self {
        Self {
            mode: PlayMode::OneShot {
                threshold: None,
                delay,
                duration,
            },
            ease: Easing::EASE_OUT,
            ..Self::scrubbed(target, delta)
        }
    }

    pub fn with_trigger(mut self, trigger: impl Into<TargetKey>) -> Self {
        self.trigger = Some(trigger.into());
        self
    }

    pub fn with_tween(mut self, tween: TweenDirection) -> Self {
        self.tween = tween;
        self
    }

    pub fn with_ease(mut self, ease: Easing) -> Self {
        self.ease = ease;
        self
    }

    pub fn with_window(mut self, window: TriggerWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_mode(mut self, mode: PlayMode) -> Self {
        self.mode = mode;
        self
    }

    /// Key of the element observed by the trigger registry.
    pub fn trigger_key(&self) -> &str {
        self.trigger.as_deref().unwrap_or(&self.target)
    }

    /// Reject combinations the engine cannot honour.
    pub fn validate(&self) -> Result<(), MotionError> {
        let bad = |field: &'static str| MotionError::InvalidValue {
            target: self.target.clone(),
            field,
        };
        let finite = |v: f32, field: &'static str| {
            if v.is_finite() {
                Ok(())
            } else {
                Err(bad(field))
            }
        };
        let non_negative = |v: f32, field: &'static str| {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(bad(field))
            }
        };

        finite(self.delta.dx, "dx")?;
        finite(self.delta.dy, "dy")?;
        if let Some(scale) = self.delta.scale {
            finite(scale, "scale")?;
        }
        if let Some(opacity) = self.delta.opacity {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(bad("opacity"));
            }
        }
        finite(self.window.start.element, "window.start")?;
        finite(self.window.start.viewport, "window.start")?;
        finite(self.window.end.element, "window.end")?;
        finite(self.window.end.viewport, "window.end")?;

        match self.mode {
            PlayMode::Scrubbed { lag } => {
                non_negative(lag.unwrap_or(0.0), "lag")?;
                if self.ease.is_time_only() {
                    return Err(MotionError::InvalidCombination {
                        target: self.target.clone(),
                        reason: format!("easing '{}' cannot be scrubbed", self.ease),
                    });
                }
            }
            PlayMode::OneShot {
                threshold,
                delay,
                duration,
            } => {
                if !(0.0..1.0).contains(&threshold.unwrap_or(0.0)) {
                    return Err(bad("threshold"));
                }
                non_negative(delay, "delay")?;
                non_negative(duration, "duration")?;
            }
        }
        Ok(())
    }
}

/// Parse and validate a JSON array of descriptors.
pub fn parse_descriptors_json(json: &str) -> Result<Vec<AnimationDescriptor>, MotionError> {
    let descriptors: Vec<AnimationDescriptor> =
        serde_json::from_str(json).map_err(|e| MotionError::Parse(e.to_string()))?;
    for d in &descriptors {
        d.validate()?;
    }
    Ok(descriptors)
}

/// Direction a revealed element travels in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Distance (in px) a [`Reveal`] travels.
pub const REVEAL_DISTANCE: f32 = 100.0;

/// Fade-in preset: direction × easing, played once on first visibility.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reveal {
    pub direction: Direction,
    pub easing: Easing,
}

impl Reveal {
    pub const fn new(direction: Direction, easing: Easing) -> Self {
        Self { direction, easing }
    }

    /// Hidden-state delta: the element starts offset against its travel direction, transparent.
    pub fn delta(&self) -> PropertyDelta {
        let (dx, dy) = match self.direction {
            Direction::Up => (0.0, REVEAL_DISTANCE),
            Direction::Down => (0.0, -REVEAL_DISTANCE),
            Direction::Left => (REVEAL_DISTANCE, 0.0),
            Direction::Right => (-REVEAL_DISTANCE, 0.0),
        };
        PropertyDelta {
            dx,
            dy,
            scale: None,
            opacity: Some(0.0),
        }
    }

    pub fn descriptor(
        &self,
        target: impl Into<TargetKey>,
        delay: f32,
        duration: f32,
    ) -> Result<AnimationDescriptor, MotionError> {
        let d = AnimationDescriptor::one_shot(target, self.delta(), delay, duration)
            .with_ease(self.easing);
        d.validate()?;
        Ok(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_parsing() {
        let e: TriggerEdge = "top 90%".parse().unwrap();
        assert_eq!(e, TriggerEdge::new(0.0, 0.9));
        let e: TriggerEdge = "bottom top".parse().unwrap();
        assert_eq!(e, TriggerEdge::new(1.0, 0.0));
        let e: TriggerEdge = "center 25%".parse().unwrap();
        assert_eq!(e, TriggerEdge::new(0.5, 0.25));
        for bad in ["top", "top 90", "middle 10%", "top 10% extra", ""] {
            assert!(bad.parse::<TriggerEdge>().is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn scrubbed_spring_is_rejected() {
        let d =
            AnimationDescriptor::scrubbed("a", PropertyDelta::default()).with_ease(Easing::Spring);
        assert!(matches!(
            d.validate(),
            Err(MotionError::InvalidCombination { .. })
        ));
        let ok = AnimationDescriptor::one_shot("a", PropertyDelta::default(), 0.0, 1.0)
            .with_ease(Easing::Spring);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let mut d = AnimationDescriptor::scrubbed(
            "a",
            PropertyDelta {
                dy: f32::NAN,
                ..Default::default()
            },
        );
        assert!(d.validate().is_err());
        d.delta.dy = 0.0;
        d.delta.opacity = Some(1.5);
        assert!(d.validate().is_err());
        let d = AnimationDescriptor::one_shot("a", PropertyDelta::default(), -1.0, 1.0);
        assert!(d.validate().is_err());
    }

    #[test]
    fn reveal_offsets_follow_direction() {
        let up = Reveal::new(Direction::Up, Easing::Spring).delta();
        assert_eq!((up.dx, up.dy, up.opacity), (0.0, 100.0, Some(0.0)));
        let right = Reveal::new(Direction::Right, Easing::EASE_OUT).delta();
        assert_eq!((right.dx, right.dy), (-100.0, 0.0));
        let d = Reveal::new(Direction::Down, Easing::Spring)
            .descriptor("hero.kicker", 0.5, 1.0)
            .unwrap();
        assert_eq!(
            d.mode,
            PlayMode::OneShot {
                threshold: None,
                delay: 0.5,
                duration: 1.0
            }
        );
    }

    #[test]
    fn descriptor_json_defaults() {
        let json = r#"[
            { "target": "about.header", "delta": { "dy": 100, "opacity": 0 },
              "ease": "power2.out",
              "window": { "start": "top 90%", "end": "top 60%" },
              "mode": { "kind": "scrubbed", "lag": 1 } }
        ]"#;
        let ds = parse_descriptors_json(json).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds[0].tween, TweenDirection::From);
        assert_eq!(ds[0].trigger_key(), "about.header");
        assert_eq!(ds[0].delta.opacity, Some(0.0));
        assert_eq!(ds[0].mode, PlayMode::Scrubbed { lag: Some(1.0) });

        let bad = r#"[{ "target": "x", "ease": "spring" }]"#;
        assert!(parse_descriptors_json(bad).is_err());
    }
}
