mod cache;
mod fit;
mod spec;
mod spline;

pub use cache::CurveCache;
pub use fit::{PolynomialCurveFitter, MAX_DEGREE};
pub use spec::{ControlPoint, CurveKey, CurveSpec, FitMethod};
pub use spline::MonotoneSpline;

use crate::error::Result;
use crate::math::clamp_unit;
use crate::math::polynomial::horner;

/// A closed-form easing curve produced from a [`CurveSpec`].
///
/// `evaluate(t)` maps the elapsed fraction of an animation to the cumulative
/// fraction of its distance. Evaluation is pure and cheap enough to run
/// every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedCurve {
    model: CurveModel,
}

#[derive(Debug, Clone, PartialEq)]
enum CurveModel {
    Polynomial(Vec<f64>),
    Spline(MonotoneSpline),
}

impl FittedCurve {
    pub(crate) fn polynomial(coefficients: Vec<f64>) -> Self {
        Self {
            model: CurveModel::Polynomial(coefficients),
        }
    }

    pub(crate) fn spline(spline: MonotoneSpline) -> Self {
        Self {
            model: CurveModel::Spline(spline),
        }
    }

    /// Evaluates the curve at `t`.
    ///
    /// `t` is clamped to `[0, 1]`: timing jitter can push a query slightly
    /// past either end, and the curve is never extrapolated.
    #[must_use]
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = clamp_unit(t);
        match &self.model {
            CurveModel::Polynomial(c) => horner(c, t),
            CurveModel::Spline(s) => s.evaluate(t),
        }
    }

    /// Returns the polynomial coefficients in ascending order, or `None` for
    /// spline curves.
    #[must_use]
    pub fn coefficients(&self) -> Option<&[f64]> {
        match &self.model {
            CurveModel::Polynomial(c) => Some(c),
            CurveModel::Spline(_) => None,
        }
    }
}

impl CurveSpec {
    /// Fits this spec with its configured method.
    ///
    /// # Errors
    ///
    /// Returns the fitter's error if the control points cannot be fitted.
    pub fn fit(&self) -> Result<FittedCurve> {
        match self.method() {
            FitMethod::Polynomial { degree } => PolynomialCurveFitter::fit(self.points(), degree),
            FitMethod::MonotoneSpline => MonotoneSpline::fit(self.points()),
        }
    }
}
