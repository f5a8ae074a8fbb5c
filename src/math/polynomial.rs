//! Dense polynomial helpers.
//!
//! Coefficients are stored in ascending order: `c[0] + c[1]*t + c[2]*t² + ...`.

use nalgebra::{DMatrix, DVector};

/// Smallest accepted ratio `min|R_ii| / max|R_ii|` of the QR factor before a
/// least-squares system is considered numerically singular.
pub const CONDITION_FLOOR: f64 = 1e-10;

/// Evaluates a polynomial at `t` using Horner's scheme.
#[must_use]
pub fn horner(coefficients: &[f64], t: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc.mul_add(t, c))
}

/// Outcome of a least-squares polynomial solve.
#[derive(Debug, Clone, PartialEq)]
pub enum LeastSquares {
    /// Coefficients in ascending order.
    Solved(Vec<f64>),
    /// The system was too ill-conditioned to trust; carries the observed
    /// conditioning ratio.
    IllConditioned(f64),
}

/// Fits a polynomial of `degree` to `(xs, ys)` by least squares.
///
/// Builds the Vandermonde matrix, factors it with Householder QR and solves
/// `R c = Qᵀ y` by back-substitution. Requires `xs.len() == ys.len()` and
/// `xs.len() > degree`; callers validate both.
#[must_use]
pub fn least_squares(xs: &[f64], ys: &[f64], degree: usize) -> LeastSquares {
    let rows = xs.len();
    let cols = degree + 1;

    let vandermonde = DMatrix::<f64>::from_fn(rows, cols, |r, c| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let power = c as i32;
        xs[r].powi(power)
    });
    let rhs = DVector::<f64>::from_iterator(rows, ys.iter().copied());

    let qr = vandermonde.qr();
    let q = qr.q();
    let r = qr.r();

    let (min_diag, max_diag) = (0..cols).fold((f64::INFINITY, 0.0_f64), |(lo, hi), i| {
        let d = r[(i, i)].abs();
        (lo.min(d), hi.max(d))
    });
    let ratio = if max_diag > 0.0 { min_diag / max_diag } else { 0.0 };
    if !ratio.is_finite() || ratio < CONDITION_FLOOR {
        return LeastSquares::IllConditioned(ratio);
    }

    let qty = q.transpose() * rhs;
    match r.solve_upper_triangular(&qty) {
        Some(solution) if solution.iter().all(|c| c.is_finite()) => {
            LeastSquares::Solved(solution.iter().copied().collect())
        }
        _ => LeastSquares::IllConditioned(ratio),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    // ── horner tests ──

    #[test]
    fn horner_cubic() {
        // 1 + 2t + 3t² + 4t³ at t = 2 → 1 + 4 + 12 + 32 = 49
        let v = horner(&[1.0, 2.0, 3.0, 4.0], 2.0);
        assert!((v - 49.0).abs() < TOL, "v={v}");
    }

    #[test]
    fn horner_empty_is_zero() {
        assert!(horner(&[], 0.7).abs() < TOL);
    }

    // ── least_squares tests ──

    #[test]
    fn exact_quadratic_is_recovered() {
        let xs = [0.0, 0.25, 0.5, 0.75, 1.0];
        let ys: Vec<f64> = xs.iter().map(|x| 0.5 - x + 2.0 * x * x).collect();
        let LeastSquares::Solved(c) = least_squares(&xs, &ys, 2) else {
            panic!("expected a solution");
        };
        assert!((c[0] - 0.5).abs() < TOL, "c={c:?}");
        assert!((c[1] + 1.0).abs() < TOL, "c={c:?}");
        assert!((c[2] - 2.0).abs() < TOL, "c={c:?}");
    }

    #[test]
    fn overdetermined_line_minimizes_residual() {
        // Symmetric noise around y = x cancels out.
        let xs = [0.0, 0.0, 1.0, 1.0];
        let ys = [0.1, -0.1, 1.1, 0.9];
        let LeastSquares::Solved(c) = least_squares(&xs, &ys, 1) else {
            panic!("expected a solution");
        };
        assert!(c[0].abs() < TOL, "c={c:?}");
        assert!((c[1] - 1.0).abs() < TOL, "c={c:?}");
    }

    #[test]
    fn near_duplicate_abscissae_are_ill_conditioned() {
        let xs = [0.0, 0.5, 0.5 + 1e-13];
        let ys = [0.0, 0.5, 0.5];
        assert!(matches!(
            least_squares(&xs, &ys, 2),
            LeastSquares::IllConditioned(_)
        ));
    }
}
