use tracing::debug;

use crate::error::{FitError, Result};
use crate::math::polynomial::{least_squares, LeastSquares};
use crate::math::TOLERANCE;

use super::spec::ControlPoint;
use super::FittedCurve;

/// Highest polynomial degree the fitter accepts.
pub const MAX_DEGREE: usize = 5;

/// Fits least-squares polynomials to easing control points.
pub struct PolynomialCurveFitter;

impl PolynomialCurveFitter {
    /// Fits a polynomial of `degree` to `points`.
    ///
    /// The result minimizes the squared residual over all points; with exactly
    /// `degree + 1` points it interpolates them. Fitting is deterministic, so
    /// the same input always yields bit-identical coefficients.
    ///
    /// # Errors
    ///
    /// - [`FitError::DegreeTooHigh`] if `degree` exceeds [`MAX_DEGREE`].
    /// - [`FitError::InsufficientData`] if fewer than `degree + 1` distinct
    ///   time values are given.
    /// - [`FitError::InvalidControlPoints`] if the points are not finite,
    ///   not strictly increasing in `t`, or do not span `t ∈ [0, 1]`.
    /// - [`FitError::DegenerateFit`] if the system is too ill-conditioned to
    ///   produce trustworthy coefficients.
    pub fn fit(points: &[ControlPoint], degree: usize) -> Result<FittedCurve> {
        if degree > MAX_DEGREE {
            return Err(FitError::DegreeTooHigh {
                degree,
                max: MAX_DEGREE,
            }
            .into());
        }
        let distinct = distinct_times(points);
        if distinct < degree + 1 {
            return Err(FitError::InsufficientData {
                required: degree + 1,
                distinct,
            }
            .into());
        }
        validate_points(points)?;

        let ts: Vec<f64> = points.iter().map(|p| p.t).collect();
        let vs: Vec<f64> = points.iter().map(|p| p.v).collect();

        match least_squares(&ts, &vs, degree) {
            LeastSquares::Solved(coefficients) => {
                debug!(degree, points = points.len(), "fitted easing polynomial");
                Ok(FittedCurve::polynomial(coefficients))
            }
            LeastSquares::IllConditioned(ratio) => Err(FitError::DegenerateFit(format!(
                "degree {degree} system over {} points is ill-conditioned (ratio {ratio:e})",
                points.len()
            ))
            .into()),
        }
    }
}

/// Counts distinct time values, ignoring order.
fn distinct_times(points: &[ControlPoint]) -> usize {
    let mut ts: Vec<f64> = points.iter().map(|p| p.t).collect();
    ts.sort_by(f64::total_cmp);
    ts.dedup();
    ts.len()
}

/// Checks the shape invariants shared by every fit method.
pub(super) fn validate_points(points: &[ControlPoint]) -> Result<()> {
    if let Some(p) = points.iter().find(|p| !p.t.is_finite() || !p.v.is_finite()) {
        return Err(invalid(format!("non-finite point ({}, {})", p.t, p.v)));
    }
    if let Some(w) = points.windows(2).find(|w| w[1].t <= w[0].t) {
        return Err(invalid(format!(
            "time values must be strictly increasing, found {} after {}",
            w[1].t, w[0].t
        )));
    }
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Err(invalid("no control points".into()));
    };
    if first.t.abs() > TOLERANCE {
        return Err(invalid(format!("first point must be at t = 0, got {}", first.t)));
    }
    if (last.t - 1.0).abs() > TOLERANCE {
        return Err(invalid(format!("last point must be at t = 1, got {}", last.t)));
    }
    Ok(())
}

fn invalid(message: String) -> crate::error::MotionError {
    FitError::InvalidControlPoints(message).into()
}
