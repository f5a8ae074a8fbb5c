use crate::math::Vector2;

use super::SubPixelAccumulator;

/// Per-axis sub-pixel accumulation for 2D motion.
///
/// The x and y accumulators are fully independent: each axis may be driven
/// by its own easing curve, and one axis never borrows remainder from the
/// other.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VectorSubPixelAccumulator {
    x: SubPixelAccumulator,
    y: SubPixelAccumulator,
}

impl VectorSubPixelAccumulator {
    /// Creates an accumulator with zero remainder on both axes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a 2D delta and returns the whole pixels to emit on `(x, y)`.
    pub fn consume(&mut self, delta: Vector2) -> (i64, i64) {
        (self.x.consume(delta.x), self.y.consume(delta.y))
    }

    /// Brings the cumulative output of each axis to exactly `target`.
    pub fn flush_to(&mut self, target: (i64, i64)) -> (i64, i64) {
        (self.x.flush_to(target.0), self.y.flush_to(target.1))
    }

    /// Returns the carried remainder on both axes.
    #[must_use]
    pub fn remainder(&self) -> Vector2 {
        Vector2::new(self.x.remainder(), self.y.remainder())
    }

    /// Returns the cumulative output on both axes.
    #[must_use]
    pub fn emitted(&self) -> (i64, i64) {
        (self.x.emitted(), self.y.emitted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn axes_accumulate_independently() {
        let mut acc = VectorSubPixelAccumulator::new();
        assert_eq!(acc.consume(Vector2::new(0.6, -0.6)), (0, 0));
        assert_eq!(acc.consume(Vector2::new(0.6, -0.3)), (1, 0));
        assert_eq!(acc.consume(Vector2::new(0.0, -0.3)), (0, -1));
        let r = acc.remainder();
        assert_abs_diff_eq!(r.x, 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(r.y, -0.2, epsilon = 1e-12);
    }

    #[test]
    fn each_axis_keeps_its_own_sign() {
        let mut acc = VectorSubPixelAccumulator::new();
        let mut total = (0, 0);
        for _ in 0..10 {
            let (dx, dy) = acc.consume(Vector2::new(1.35, -2.15));
            assert!(dx >= 0 && dy <= 0, "dx={dx} dy={dy}");
            total = (total.0 + dx, total.1 + dy);
        }
        assert_eq!(total, (13, -21));
        assert_eq!(acc.emitted(), total);
    }

    #[test]
    fn flush_targets_each_axis() {
        let mut acc = VectorSubPixelAccumulator::new();
        acc.consume(Vector2::new(9.7, -3.2));
        assert_eq!(acc.flush_to((10, -3)), (1, 0));
        assert_eq!(acc.emitted(), (10, -3));
    }
}
