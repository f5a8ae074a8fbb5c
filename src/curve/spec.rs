use std::hash::{DefaultHasher, Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::fit::MAX_DEGREE;

/// A control point of an easing curve in normalized `[0,1]×[0,1]` space.
///
/// `t` is the elapsed fraction of the animation, `v` the cumulative fraction
/// of the distance covered at that time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub t: f64,
    pub v: f64,
}

impl ControlPoint {
    /// Creates a new control point.
    #[must_use]
    pub fn new(t: f64, v: f64) -> Self {
        Self { t, v }
    }
}

/// How a [`CurveSpec`] is turned into a [`FittedCurve`](super::FittedCurve).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FitMethod {
    /// Least-squares polynomial of the given degree.
    Polynomial { degree: usize },
    /// Monotone piecewise cubic through every control point.
    MonotoneSpline,
}

/// Content hash of a [`CurveSpec`], used as the curve cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurveKey(u64);

impl CurveKey {
    /// Returns the raw hash value.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Ordered control points plus the method used to fit them.
///
/// Well-formed specs have strictly increasing `t`, start at `t = 0` and end
/// at `t = 1`; the fitter enforces this. Specs are immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSpec {
    points: Vec<ControlPoint>,
    method: FitMethod,
}

impl CurveSpec {
    /// Creates a spec fitted by a least-squares polynomial of `degree`.
    #[must_use]
    pub fn polynomial(points: Vec<ControlPoint>, degree: usize) -> Self {
        Self {
            points,
            method: FitMethod::Polynomial { degree },
        }
    }

    /// Creates a spec interpolated by a monotone cubic spline.
    #[must_use]
    pub fn monotone_spline(points: Vec<ControlPoint>) -> Self {
        Self {
            points,
            method: FitMethod::MonotoneSpline,
        }
    }

    /// Constant-velocity easing: `v = t`.
    #[must_use]
    pub fn linear() -> Self {
        Self::polynomial(
            vec![ControlPoint::new(0.0, 0.0), ControlPoint::new(1.0, 1.0)],
            1,
        )
    }

    /// Decelerating easing, `v = 1 - (1 - t)³`, sampled and refitted as a cubic.
    #[must_use]
    pub fn ease_out() -> Self {
        Self::sampled(|t| 1.0 - (1.0 - t).powi(3), 3)
    }

    /// Smoothstep easing, `v = 3t² - 2t³`, sampled and refitted as a cubic.
    #[must_use]
    pub fn ease_in_out() -> Self {
        Self::sampled(|t| t * t * (3.0 - 2.0 * t), 3)
    }

    fn sampled(f: impl Fn(f64) -> f64, degree: usize) -> Self {
        const SAMPLES: u32 = 8;
        let points = (0..=SAMPLES)
            .map(|i| {
                let t = f64::from(i) / f64::from(SAMPLES);
                ControlPoint::new(t, f(t))
            })
            .collect();
        Self::polynomial(points, degree.min(MAX_DEGREE))
    }

    /// Returns the control points.
    #[must_use]
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Returns the fit method.
    #[must_use]
    pub fn method(&self) -> FitMethod {
        self.method
    }

    /// Computes the content hash of this spec.
    ///
    /// Two specs with bit-identical points and the same method share a key.
    #[must_use]
    pub fn key(&self) -> CurveKey {
        let mut hasher = DefaultHasher::new();
        self.method.hash(&mut hasher);
        self.points.len().hash(&mut hasher);
        for p in &self.points {
            p.t.to_bits().hash(&mut hasher);
            p.v.to_bits().hash(&mut hasher);
        }
        CurveKey(hasher.finish())
    }
}

impl Default for CurveSpec {
    fn default() -> Self {
        Self::ease_out()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn identical_specs_share_key() {
        assert_eq!(CurveSpec::ease_out().key(), CurveSpec::ease_out().key());
    }

    #[test]
    fn method_changes_key() {
        let points = CurveSpec::linear().points().to_vec();
        let poly = CurveSpec::polynomial(points.clone(), 1);
        let spline = CurveSpec::monotone_spline(points);
        assert_ne!(poly.key(), spline.key());
    }

    #[test]
    fn point_changes_key() {
        let a = CurveSpec::polynomial(
            vec![ControlPoint::new(0.0, 0.0), ControlPoint::new(1.0, 1.0)],
            1,
        );
        let b = CurveSpec::polynomial(
            vec![ControlPoint::new(0.0, 0.0), ControlPoint::new(1.0, 0.999)],
            1,
        );
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn presets_span_unit_interval() {
        for spec in [CurveSpec::linear(), CurveSpec::ease_out(), CurveSpec::ease_in_out()] {
            let first = spec.points()[0];
            let last = spec.points()[spec.points().len() - 1];
            assert!(first.t.abs() < 1e-12 && first.v.abs() < 1e-12);
            assert!((last.t - 1.0).abs() < 1e-12 && (last.v - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn spec_deserializes_from_toml() {
        let spec: CurveSpec = toml::from_str(
            r#"
            method = { kind = "polynomial", degree = 2 }
            points = [
                { t = 0.0, v = 0.0 },
                { t = 0.5, v = 0.7 },
                { t = 1.0, v = 1.0 },
            ]
            "#,
        )
        .unwrap();
        assert_eq!(spec.method(), FitMethod::Polynomial { degree: 2 });
        assert_eq!(spec.points().len(), 3);
    }
}
