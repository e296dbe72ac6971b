//! Construction-time errors.
//!
//! Runtime conditions (unresolved targets, inverted windows, lost render contexts)
//! are handled locally and reported as [`MotionEvent`](crate::outputs::MotionEvent)s;
//! only malformed descriptors and payloads surface as [`MotionError`].

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum MotionError {
    #[error("unknown easing '{0}'")]
    UnknownEasing(String),
    #[error("malformed trigger edge '{0}': expected '<element> <viewport>', e.g. 'top 90%'")]
    MalformedEdge(String),
    #[error("invalid combination for target '{target}': {reason}")]
    InvalidCombination { target: String, reason: String },
    #[error("non-finite or negative value for '{field}' on target '{target}'")]
    InvalidValue { target: String, field: &'static str },
    #[error("descriptor json parse error: {0}")]
    Parse(String),
}

/// Failure reported by a [`RenderSurface`](crate::render_loop::RenderSurface).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    #[error("render context lost")]
    ContextLost,
    #[error("render surface error: {0}")]
    Surface(String),
}
