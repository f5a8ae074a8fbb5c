pub mod polynomial;

/// 2D vector type used for per-axis distances and deltas.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Clamps a parameter to the unit interval. NaN maps to `0.0`.
#[must_use]
pub fn clamp_unit(t: f64) -> f64 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_unit_bounds() {
        assert!((clamp_unit(-0.25)).abs() < TOLERANCE);
        assert!((clamp_unit(1.75) - 1.0).abs() < TOLERANCE);
        assert!((clamp_unit(0.4) - 0.4).abs() < TOLERANCE);
    }

    #[test]
    fn clamp_unit_nan_is_zero() {
        assert!(clamp_unit(f64::NAN).abs() < TOLERANCE);
    }
}
