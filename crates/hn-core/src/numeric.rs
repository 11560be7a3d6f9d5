use crate::CoreError;

/// Snap tolerance for asymptotic first-order trajectories (valve positions).
pub const SNAP_EPSILON: f64 = 1e-3;

/// Volumes below this are treated as an empty vessel.
pub const VOLUME_EPSILON: f64 = 1e-9;

/// One tolerance pair for everything.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: f64, b: f64, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// Clamp a fraction-valued quantity (valve position, pump speed) to [0, 1].
/// NaN clamps to 0: a garbage command closes the device rather than
/// poisoning its state.
pub fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}
