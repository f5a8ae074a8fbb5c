/// Converts a stream of real-valued deltas into whole-pixel deltas.
///
/// Each call adds the incoming delta to the carried remainder, emits the
/// integer part truncated toward zero and keeps the fraction. Truncation,
/// not rounding, keeps every emitted step on the same side of zero as the
/// running total, and `|remainder| < 1` holds after every `consume`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubPixelAccumulator {
    remainder: f64,
    emitted: i64,
}

impl SubPixelAccumulator {
    /// Creates an accumulator with zero remainder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds `delta` and returns the whole pixels to emit now.
    ///
    /// Non-finite deltas are ignored so a single bad sample cannot poison
    /// the remainder.
    pub fn consume(&mut self, delta: f64) -> i64 {
        if !delta.is_finite() {
            return 0;
        }
        let total = self.remainder + delta;
        let whole = total.trunc();
        self.remainder = total - whole;
        #[allow(clippy::cast_possible_truncation)]
        let output = whole as i64;
        self.emitted = self.emitted.saturating_add(output);
        output
    }

    /// Emits whatever is needed to bring the cumulative output to exactly
    /// `target`, folding the difference into the remainder.
    ///
    /// Used for the final frame of an animation. Afterwards the remainder
    /// holds the residual between the real input and `target`, which may
    /// exceed one pixel if the input never reached `target`.
    pub fn flush_to(&mut self, target: i64) -> i64 {
        let output = target.saturating_sub(self.emitted);
        #[allow(clippy::cast_precision_loss)]
        let shift = output as f64;
        self.remainder -= shift;
        self.emitted = self.emitted.saturating_add(output);
        output
    }

    /// Returns the carried fractional remainder.
    #[must_use]
    pub fn remainder(&self) -> f64 {
        self.remainder
    }

    /// Returns the sum of everything emitted so far.
    #[must_use]
    pub fn emitted(&self) -> i64 {
        self.emitted
    }
}
