use rust_decimal::Decimal;
use std::collections::VecDeque;

/// Fixed-size rolling window with extrema, mean, and standard deviation.
///
/// Extrema are recomputed by linear scan each bar; windows here are small
/// enough that a monotonic deque would buy nothing measurable.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    len: usize,
    buffer: VecDeque<Decimal>,
    sum: Decimal,
}

impl RollingWindow {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "window period must be > 0");
        Self {
            len: period,
            buffer: VecDeque::with_capacity(period),
            sum: Decimal::ZERO,
        }
    }

    pub fn push(&mut self, value: Decimal) {
        self.sum += value;
        self.buffer.push_back(value);
        if self.buffer.len() > self.len {
            if let Some(removed) = self.buffer.pop_front() {
                self.sum -= removed;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.len
    }

    /// Configured window length.
    pub fn period(&self) -> usize {
        self.len
    }

    pub fn max(&self) -> Option<Decimal> {
        self.buffer.iter().max().copied()
    }

    pub fn min(&self) -> Option<Decimal> {
        self.buffer.iter().min().copied()
    }

    /// Mean of the samples currently held (growing window at startup).
    pub fn mean(&self) -> Option<Decimal> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.sum / Decimal::from(self.buffer.len()))
        }
    }

    /// Sample standard deviation around the window mean. Zero while fewer
    /// than two samples are held.
    pub fn stddev(&self) -> Decimal {
        let n = self.buffer.len();
        if n < 2 {
            return Decimal::ZERO;
        }
        let mean = self.sum / Decimal::from(n);
        let sq_sum: Decimal = self
            .buffer
            .iter()
            .map(|v| {
                let diff = *v - mean;
                diff * diff
            })
            .sum();
        decimal_sqrt(sq_sum / Decimal::from(n - 1))
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.sum = Decimal::ZERO;
    }
}

/// Newton's method square root for Decimal.
pub fn decimal_sqrt(value: Decimal) -> Decimal {
    if value.is_zero() || value < Decimal::ZERO {
        return Decimal::ZERO;
    }
    let mut guess = value / Decimal::TWO;
    let epsilon = Decimal::new(1, 10); // 0.0000000001
    for _ in 0..100 {
        let next_guess = (guess + value / guess) / Decimal::TWO;
        let diff = (next_guess - guess).abs();
        guess = next_guess;
        if diff < epsilon {
            break;
        }
    }
    guess
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rolling_extrema() {
        let mut w = RollingWindow::new(3);
        w.push(dec!(5));
        w.push(dec!(9));
        w.push(dec!(2));
        assert_eq!(w.max(), Some(dec!(9)));
        assert_eq!(w.min(), Some(dec!(2)));
        // 9 slides out
        w.push(dec!(4));
        assert_eq!(w.max(), Some(dec!(5)));
        w.push(dec!(1));
        assert_eq!(w.max(), Some(dec!(4)));
        assert_eq!(w.min(), Some(dec!(1)));
    }

    #[test]
    fn test_stddev_sample_form() {
        let mut w = RollingWindow::new(4);
        for v in [dec!(2), dec!(4), dec!(4), dec!(6)] {
            w.push(v);
        }
        // mean 4, squared deviations 4+0+0+4, sample variance 8/3
        let expected = decimal_sqrt(dec!(8) / dec!(3));
        assert_eq!(w.stddev(), expected);
    }

    #[test]
    fn test_stddev_degenerate() {
        let mut w = RollingWindow::new(5);
        assert_eq!(w.stddev(), Decimal::ZERO);
        w.push(dec!(7));
        assert_eq!(w.stddev(), Decimal::ZERO);
    }

    #[test]
    fn test_decimal_sqrt() {
        assert!((decimal_sqrt(dec!(4)) - dec!(2)).abs() < dec!(0.0001));
        assert!((decimal_sqrt(dec!(9)) - dec!(3)).abs() < dec!(0.0001));
        assert_eq!(decimal_sqrt(Decimal::ZERO), Decimal::ZERO);
    }
}
