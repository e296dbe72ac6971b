//! Interpolation helpers:
//! - lerp_f32 (scalar blend)
//! - power curves (in / out / in-out with integer exponents)
//! - bezier_ease_t (cubic-bezier timing, inverted on x by bisection)
//! - spring_ease_t (critically damped spring, normalized to end at 1)

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn power_in(t: f32, exp: i32) -> f32 {
    t.powi(exp)
}

#[inline]
pub fn power_out(t: f32, exp: i32) -> f32 {
    1.0 - (1.0 - t).powi(exp)
}

#[inline]
pub fn power_in_out(t: f32, exp: i32) -> f32 {
    if t < 0.5 {
        (2.0 * t).powi(exp) * 0.5
    } else {
        1.0 - (2.0 * (1.0 - t)).powi(exp) * 0.5
    }
}

/// Cubic Bezier basis function
#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Given control points (x1, y1, x2, y2) and an input t in [0,1],
/// compute the eased y by inverting the x bezier via binary search.
#[inline]
pub fn bezier_ease_t(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    // Bezier(0,0,1,1) is exactly linear
    if x1 == 0.0 && y1 == 0.0 && x2 == 1.0 && y2 == 1.0 {
        return t;
    }
    // Monotonic X in [0,1] assumed for x1/x2 ∈ [0,1]
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = t;
    for _ in 0..24 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}

const SPRING_OMEGA: f32 = 8.0;

#[inline]
fn spring_raw(t: f32) -> f32 {
    1.0 - (1.0 + SPRING_OMEGA * t) * (-SPRING_OMEGA * t).exp()
}

/// x(t) = 1 - (1 + ωt)·e^(-ωt), rescaled so x(1) == 1 exactly.
#[inline]
pub fn spring_ease_t(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    spring_raw(t) / spring_raw(1.0)
}
