//! Monotone piecewise cubic Hermite interpolation.
//!
//! Tangents follow the Fritsch–Butland harmonic-mean rule, which keeps every
//! segment monotone whenever the data are monotone. An easing curve built
//! this way never overshoots its control points, unlike a high-degree
//! polynomial fit.

use crate::error::{FitError, Result};

use super::fit::validate_points;
use super::spec::ControlPoint;
use super::FittedCurve;

/// Minimum spacing between consecutive knots.
const MIN_KNOT_SPACING: f64 = 1e-9;

/// Knots, values and tangents of a fitted monotone spline.
#[derive(Debug, Clone, PartialEq)]
pub struct MonotoneSpline {
    ts: Vec<f64>,
    vs: Vec<f64>,
    tangents: Vec<f64>,
}

impl MonotoneSpline {
    /// Interpolates `points` with a monotone cubic spline.
    ///
    /// # Errors
    ///
    /// - [`FitError::InsufficientData`] with fewer than two points.
    /// - [`FitError::InvalidControlPoints`] under the same rules as the
    ///   polynomial fitter.
    /// - [`FitError::DegenerateFit`] if two knots are closer than the
    ///   minimum spacing.
    pub fn fit(points: &[ControlPoint]) -> Result<FittedCurve> {
        if points.len() < 2 {
            return Err(FitError::InsufficientData {
                required: 2,
                distinct: points.len(),
            }
            .into());
        }
        validate_points(points)?;

        let ts: Vec<f64> = points.iter().map(|p| p.t).collect();
        let vs: Vec<f64> = points.iter().map(|p| p.v).collect();

        if let Some(w) = ts.windows(2).find(|w| w[1] - w[0] < MIN_KNOT_SPACING) {
            return Err(FitError::DegenerateFit(format!(
                "knots {} and {} are too close to interpolate",
                w[0], w[1]
            ))
            .into());
        }

        let tangents = tangents(&ts, &vs);
        Ok(FittedCurve::spline(Self { ts, vs, tangents }))
    }

    /// Evaluates the spline at `t`, which must already be within `[0, 1]`.
    pub(super) fn evaluate(&self, t: f64) -> f64 {
        // Index of the segment [ts[k], ts[k + 1]] containing t.
        let k = self
            .ts
            .partition_point(|&knot| knot <= t)
            .saturating_sub(1)
            .min(self.ts.len() - 2);

        let h = self.ts[k + 1] - self.ts[k];
        let s = (t - self.ts[k]) / h;
        let s2 = s * s;
        let s3 = s2 * s;

        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        h00 * self.vs[k]
            + h10 * h * self.tangents[k]
            + h01 * self.vs[k + 1]
            + h11 * h * self.tangents[k + 1]
    }
}

fn tangents(ts: &[f64], vs: &[f64]) -> Vec<f64> {
    let n = ts.len();
    let h: Vec<f64> = ts.windows(2).map(|w| w[1] - w[0]).collect();
    let slopes: Vec<f64> = vs
        .windows(2)
        .zip(&h)
        .map(|(w, &hk)| (w[1] - w[0]) / hk)
        .collect();

    let mut m = vec![0.0; n];
    m[0] = slopes[0];
    m[n - 1] = slopes[n - 2];
    for k in 1..n - 1 {
        let (d0, d1) = (slopes[k - 1], slopes[k]);
        if d0 * d1 <= 0.0 {
            continue;
        }
        let w0 = 2.0 * h[k] + h[k - 1];
        let w1 = h[k] + 2.0 * h[k - 1];
        m[k] = (w0 + w1) / (w0 / d0 + w1 / d1);
    }
    m
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::MotionError;
    use approx::assert_abs_diff_eq;

    fn pts(raw: &[(f64, f64)]) -> Vec<ControlPoint> {
        raw.iter().map(|&(t, v)| ControlPoint::new(t, v)).collect()
    }

    #[test]
    fn two_points_are_linear() {
        let curve = MonotoneSpline::fit(&pts(&[(0.0, 0.0), (1.0, 1.0)])).unwrap();
        for t in [0.0, 0.1, 0.5, 0.9, 1.0] {
            assert_abs_diff_eq!(curve.evaluate(t), t, epsilon = 1e-12);
        }
    }

    #[test]
    fn passes_through_every_knot() {
        let raw = [(0.0, 0.0), (0.1, 0.4), (0.3, 0.75), (0.6, 0.95), (1.0, 1.0)];
        let curve = MonotoneSpline::fit(&pts(&raw)).unwrap();
        for (t, v) in raw {
            assert_abs_diff_eq!(curve.evaluate(t), v, epsilon = 1e-12);
        }
    }

    #[test]
    fn monotone_data_never_overshoots() {
        // A sharp knee that a polynomial would ring around.
        let raw = [(0.0, 0.0), (0.05, 0.6), (0.1, 0.9), (0.5, 0.99), (1.0, 1.0)];
        let curve = MonotoneSpline::fit(&pts(&raw)).unwrap();
        let mut prev = curve.evaluate(0.0);
        for i in 1..=1000 {
            let v = curve.evaluate(f64::from(i) / 1000.0);
            assert!(v >= prev - 1e-12, "non-monotone at step {i}: {prev} -> {v}");
            assert!(v <= 1.0 + 1e-12, "overshoot at step {i}: {v}");
            prev = v;
        }
    }

    #[test]
    fn single_point_is_insufficient() {
        let err = MonotoneSpline::fit(&pts(&[(0.0, 0.0)])).unwrap_err();
        assert!(matches!(
            err,
            MotionError::Fit(FitError::InsufficientData { required: 2, distinct: 1 })
        ));
    }

    #[test]
    fn crowded_knots_are_degenerate() {
        let points = pts(&[(0.0, 0.0), (0.5, 0.5), (0.5 + 1e-12, 0.5), (1.0, 1.0)]);
        let err = MonotoneSpline::fit(&points).unwrap_err();
        assert!(matches!(err, MotionError::Fit(FitError::DegenerateFit(_))));
    }
}
