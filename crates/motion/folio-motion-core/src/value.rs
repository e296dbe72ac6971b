//! Animated property values.

use serde::{Deserialize, Serialize};

use crate::interp::functions::lerp_f32;

/// Rendered state of one target: translation offsets (px), uniform scale and opacity.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyState {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub opacity: f32,
}

impl PropertyState {
    /// Untransformed, fully visible.
    pub const IDENTITY: PropertyState = PropertyState {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
        opacity: 1.0,
    };

    /// Component-wise linear blend.
    #[inline]
    pub fn lerp(&self, other: &PropertyState, t: f32) -> PropertyState {
        PropertyState {
            x: lerp_f32(self.x, other.x, t),
            y: lerp_f32(self.y, other.y, t),
            scale: lerp_f32(self.scale, other.scale, t),
            opacity: lerp_f32(self.opacity, other.opacity, t),
        }
    }

    pub fn approx_eq(&self, other: &PropertyState, eps: f32) -> bool {
        (self.x - other.x).abs() <= eps
            && (self.y - other.y).abs() <= eps
            && (self.scale - other.scale).abs() <= eps
            && (self.opacity - other.opacity).abs() <= eps
    }
}

impl Default for PropertyState {
    fn default() -> Self {
        Self::IDENTITY
    }
}
