//! Easing curves.
//!
//! Identifiers follow the tween vocabulary used by the portfolio markup
//! (`power2.out`, `easeOut`, `spring`, ...) and are parsed into a closed
//! [`Easing`] enum at construction; unknown names never reach the engine.

pub mod functions;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MotionError;

/// Closed set of easing curves. Serialized as its identifier string.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    Linear,
    /// `powerN.in`: t^(N+1)
    PowerIn(u8),
    /// `powerN.out`: 1 - (1-t)^(N+1)
    PowerOut(u8),
    PowerInOut(u8),
    /// Control points (x1, y1, x2, y2).
    CubicBezier([f32; 4]),
    /// Critically damped spring. Only meaningful for time-driven playback.
    Spring,
}

impl Easing {
    pub const EASE_IN: Easing = Easing::CubicBezier([0.42, 0.0, 1.0, 1.0]);
    pub const EASE_OUT: Easing = Easing::CubicBezier([0.0, 0.0, 0.58, 1.0]);
    pub const EASE_IN_OUT: Easing = Easing::CubicBezier([0.42, 0.0, 0.58, 1.0]);

    /// Map normalized t ∈ [0, 1] through the curve. Input is clamped.
    pub fn apply(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match *self {
            Easing::Linear => t,
            Easing::PowerIn(n) => functions::power_in(t, n as i32 + 1),
            Easing::PowerOut(n) => functions::power_out(t, n as i32 + 1),
            Easing::PowerInOut(n) => functions::power_in_out(t, n as i32 + 1),
            Easing::CubicBezier([x1, y1, x2, y2]) => functions::bezier_ease_t(t, x1, y1, x2, y2),
            Easing::Spring => functions::spring_ease_t(t),
        }
    }

    /// True for curves that model physics over time rather than a position along a range.
    pub fn is_time_only(&self) -> bool {
        matches!(self, Easing::Spring)
    }
}

impl Default for Easing {
    fn default() -> Self {
        Easing::PowerOut(1)
    }
}

fn parse_power(name: &str) -> Option<Easing> {
    let rest = name.strip_prefix("power")?;
    let (digit, kind) = match rest.split_once('.') {
        Some((d, k)) => (d, k),
        None => (rest, "out"),
    };
    let n: u8 = digit.parse().ok()?;
    if n == 0 {
        return Some(Easing::Linear);
    }
    if n > 4 {
        return None;
    }
    match kind {
        "in" => Some(Easing::PowerIn(n)),
        "out" => Some(Easing::PowerOut(n)),
        "inOut" => Some(Easing::PowerInOut(n)),
        _ => None,
    }
}

fn parse_bezier(name: &str) -> Option<Easing> {
    let inner = name
        .strip_prefix("cubicBezier(")
        .or_else(|| name.strip_prefix("cubic-bezier("))?
        .strip_suffix(')')?;
    let nums: Vec<f32> = inner
        .split(',')
        .map(|s| s.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .ok()?;
    match nums.as_slice() {
        [x1, y1, x2, y2] if nums.iter().all(|v| v.is_finite()) => {
            Some(Easing::CubicBezier([*x1, *y1, *x2, *y2]))
        }
        _ => None,
    }
}

impl FromStr for Easing {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let parsed = match name {
            "linear" | "none" => Some(Easing::Linear),
            "easeIn" => Some(Easing::EASE_IN),
            "easeOut" | "tween" => Some(Easing::EASE_OUT),
            "easeInOut" => Some(Easing::EASE_IN_OUT),
            "spring" => Some(Easing::Spring),
            _ => parse_power(name).or_else(|| parse_bezier(name)),
        };
        parsed.ok_or_else(|| MotionError::UnknownEasing(s.to_string()))
    }
}

impl TryFrom<String> for Easing {
    type Error = MotionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Easing> for String {
    fn from(value: Easing) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => write!(f, "linear"),
            Easing::PowerIn(n) => write!(f, "power{n}.in"),
            Easing::PowerOut(n) => write!(f, "power{n}.out"),
            Easing::PowerInOut(n) => write!(f, "power{n}.inOut"),
            Easing::CubicBezier([a, b, c, d]) => write!(f, "cubicBezier({a},{b},{c},{d})"),
            Easing::Spring => write!(f, "spring"),
        }
    }
}
