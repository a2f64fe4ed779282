use crate::Indicator;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;

/// Ultimate Oscillator.
///
/// Buying pressure `close - min(low, prev_close)` and true range
/// `max(high, prev_close) - min(low, prev_close)` are summed over three
/// window lengths (genuine sliding-window sums, unlike the Wilder
/// recurrence used elsewhere). The three ratios are combined with weights
/// `slow/fast : slow/intermediate : 1`, normalized, and scaled by 100.
///
/// Output is the neutral 50 until the slow window fills. If any of the
/// three true-range sums is exactly zero, the previous output is held
/// unchanged for that bar.
#[derive(Debug, Clone)]
pub struct UltimateOscillator {
    fast: usize,
    intermediate: usize,
    slow: usize,
    prev_close: Option<Decimal>,
    bp: VecDeque<Decimal>,
    tr: VecDeque<Decimal>,
    current: Decimal,
    count: usize,
}

impl UltimateOscillator {
    pub fn new(fast: usize, intermediate: usize, slow: usize) -> Self {
        assert!(
            fast > 0 && fast < intermediate && intermediate < slow,
            "periods must be ascending and positive"
        );
        Self {
            fast,
            intermediate,
            slow,
            prev_close: None,
            bp: VecDeque::with_capacity(slow),
            tr: VecDeque::with_capacity(slow),
            current: dec!(50),
            count: 0,
        }
    }

    /// Standard Ultimate Oscillator (7, 14, 28).
    pub fn default_periods() -> Self {
        Self::new(7, 14, 28)
    }

    fn tail_sum(buffer: &VecDeque<Decimal>, window: usize) -> Decimal {
        buffer.iter().rev().take(window).copied().sum()
    }

    /// Feed the next bar's high/low/close.
    pub fn next_bar(&mut self, high: Decimal, low: Decimal, close: Decimal) -> Decimal {
        let (bp, tr) = match self.prev_close {
            Some(pc) => {
                let true_low = low.min(pc);
                let true_high = high.max(pc);
                (close - true_low, true_high - true_low)
            }
            None => (close - low, high - low),
        };
        self.prev_close = Some(close);
        self.count += 1;

        self.bp.push_back(bp);
        self.tr.push_back(tr);
        if self.bp.len() > self.slow {
            self.bp.pop_front();
            self.tr.pop_front();
        }

        if self.count < self.slow {
            return self.current;
        }

        let tr_fast = Self::tail_sum(&self.tr, self.fast);
        let tr_mid = Self::tail_sum(&self.tr, self.intermediate);
        let tr_slow = Self::tail_sum(&self.tr, self.slow);

        if tr_fast.is_zero() || tr_mid.is_zero() || tr_slow.is_zero() {
            // Hold the previous value rather than divide into nothing.
            return self.current;
        }

        let bp_fast = Self::tail_sum(&self.bp, self.fast);
        let bp_mid = Self::tail_sum(&self.bp, self.intermediate);
        let bp_slow = Self::tail_sum(&self.bp, self.slow);

        let slow = Decimal::from(self.slow);
        let w_fast = slow / Decimal::from(self.fast);
        let w_mid = slow / Decimal::from(self.intermediate);
        let w_slow = Decimal::ONE;

        let weighted =
            w_fast * (bp_fast / tr_fast) + w_mid * (bp_mid / tr_mid) + w_slow * (bp_slow / tr_slow);
        self.current = dec!(100) * weighted / (w_fast + w_mid + w_slow);
        self.current
    }

    pub fn value(&self) -> Decimal {
        self.current
    }

    pub fn bars_seen(&self) -> usize {
        self.count
    }
}

impl Indicator for UltimateOscillator {
    fn next(&mut self, value: Decimal) -> Option<Decimal> {
        // Simplified: collapse high/low/close onto one value.
        let out = self.next_bar(value, value, value);
        if self.count >= self.slow {
            Some(out)
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.prev_close = None;
        self.bp.clear();
        self.tr.clear();
        self.current = dec!(50);
        self.count = 0;
    }

    fn period(&self) -> usize {
        self.slow
    }

    fn is_ready(&self) -> bool {
        self.count >= self.slow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_neutral_during_warmup() {
        let mut uo = UltimateOscillator::new(2, 3, 4);
        assert_eq!(uo.next_bar(dec!(10), dec!(9), dec!(9.5)), dec!(50));
        assert_eq!(uo.next_bar(dec!(10.5), dec!(9.5), dec!(10)), dec!(50));
        assert_eq!(uo.next_bar(dec!(11), dec!(10), dec!(10.5)), dec!(50));
    }

    #[test]
    fn test_strong_buying_pressure_reads_high() {
        let mut uo = UltimateOscillator::new(2, 3, 4);
        // Every bar closes at its high: BP == TR, all ratios 1, UO = 100.
        let mut out = dec!(50);
        for i in 0..6i64 {
            let low = Decimal::from(100 + i);
            let high = low + Decimal::ONE;
            out = uo.next_bar(high, low, high);
        }
        // All three ratios are exactly 1; only the weight normalization
        // itself carries rounding.
        assert!((out - dec!(100)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_zero_true_range_holds_previous_output() {
        let mut uo = UltimateOscillator::new(2, 3, 4);
        let mut out = dec!(50);
        for i in 0..6i64 {
            let low = Decimal::from(100 + i);
            let high = low + Decimal::TWO;
            let close = low + dec!(1.5);
            out = uo.next_bar(high, low, close);
        }
        // A hard down bar shifts the ratios away from their steady state.
        let down = uo.next_bar(dec!(107), dec!(105), dec!(105));
        assert_ne!(down, out);
        // One flat bar still leaves nonzero TR inside the fast window, so
        // the oscillator keeps computing.
        let computed = uo.next_bar(dec!(105), dec!(105), dec!(105));
        assert_ne!(computed, down);
        // A second flat bar zeroes the fast TR sum: output is held exactly.
        let held = uo.next_bar(dec!(105), dec!(105), dec!(105));
        assert_eq!(held, computed);
        let held = uo.next_bar(dec!(105), dec!(105), dec!(105));
        assert_eq!(held, computed);
    }
}
