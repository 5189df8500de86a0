//! Scalar helpers:
//! - clamp_percent (inclusive clamp into [0,1])
//! - lerp_f64 (exact at both ends)
//! - ease_out_cubic (Penner form: time, begin, change, duration)

/// Clamp progress into [0,1]. NaN collapses to 0.
#[inline]
pub fn clamp_percent(p: f64) -> f64 {
    if p.is_nan() || p <= 0.0 {
        0.0
    } else if p >= 1.0 {
        1.0
    } else {
        p
    }
}

/// Linear interpolation of scalars. `t >= 1` returns `b` exactly.
#[inline]
pub fn lerp_f64(a: f64, b: f64, t: f64) -> f64 {
    if t >= 1.0 {
        b
    } else {
        a + (b - a) * t
    }
}

/// Cubic ease-out: fast start, settling on `begin + change` at `t == d`.
#[inline]
pub fn ease_out_cubic(t: f64, begin: f64, change: f64, d: f64) -> f64 {
    let t = t / d - 1.0;
    change * (t * t * t + 1.0) + begin
}
