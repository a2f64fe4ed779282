use crate::ema::Ema;
use crate::Indicator;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::VecDeque;

/// MACD (Moving Average Convergence Divergence).
///
/// Fast EMA minus slow EMA, with an EMA signal line. Returns the MACD line
/// value from `next()`; `next_output()` yields all three components.
#[derive(Debug, Clone)]
pub struct Macd {
    fast_ema: Ema,
    slow_ema: Ema,
    signal_ema: Ema,
    macd_line: Option<Decimal>,
    signal_line: Option<Decimal>,
}

/// MACD output with all three components.
#[derive(Debug, Clone, Copy)]
pub struct MacdOutput {
    pub macd: Decimal,
    pub signal: Decimal,
    pub histogram: Decimal,
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        assert!(
            fast_period < slow_period,
            "Fast period must be less than slow period"
        );
        Self {
            fast_ema: Ema::new(fast_period),
            slow_ema: Ema::new(slow_period),
            signal_ema: Ema::new(signal_period),
            macd_line: None,
            signal_line: None,
        }
    }

    /// Standard MACD (12, 26, 9).
    pub fn default_periods() -> Self {
        Self::new(12, 26, 9)
    }

    pub fn output(&self) -> Option<MacdOutput> {
        match (self.macd_line, self.signal_line) {
            (Some(macd), Some(signal)) => Some(MacdOutput {
                macd,
                signal,
                histogram: macd - signal,
            }),
            _ => None,
        }
    }

    pub fn next_output(&mut self, value: Decimal) -> Option<MacdOutput> {
        let fast = self.fast_ema.next(value);
        let slow = self.slow_ema.next(value);

        if let (Some(f), Some(s)) = (fast, slow) {
            let macd = f - s;
            self.macd_line = Some(macd);
            self.signal_line = self.signal_ema.next(macd);
        }

        self.output()
    }
}

impl Indicator for Macd {
    fn next(&mut self, value: Decimal) -> Option<Decimal> {
        self.next_output(value).map(|o| o.macd)
    }

    fn reset(&mut self) {
        self.fast_ema.reset();
        self.slow_ema.reset();
        self.signal_ema.reset();
        self.macd_line = None;
        self.signal_line = None;
    }

    fn period(&self) -> usize {
        self.slow_ema.period()
    }

    fn is_ready(&self) -> bool {
        self.signal_line.is_some()
    }
}

/// Zero-lag EMA: `2*EMA - EMA[lookback bars ago]`.
///
/// `lookback = round(factor * period)`, capped by the bars seen so far. A
/// factor of 0 gives a lookback of 0, and the correction cancels to the
/// plain EMA.
#[derive(Debug, Clone)]
pub struct ZeroLagEma {
    ema: Ema,
    lookback: usize,
    history: VecDeque<Decimal>,
    current: Option<Decimal>,
}

impl ZeroLagEma {
    pub fn new(period: usize, factor: Decimal) -> Self {
        assert!(period > 0, "zero-lag EMA period must be > 0");
        assert!(factor >= Decimal::ZERO, "zero-lag factor must be >= 0");
        let lookback = (factor * Decimal::from(period))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_usize()
            .unwrap_or(0);
        Self {
            ema: Ema::new(period),
            lookback,
            history: VecDeque::with_capacity(lookback + 1),
            current: None,
        }
    }

    pub fn value(&self) -> Option<Decimal> {
        self.current
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }
}

impl Indicator for ZeroLagEma {
    fn next(&mut self, value: Decimal) -> Option<Decimal> {
        let e = self.ema.next(value)?;
        self.history.push_back(e);
        if self.history.len() > self.lookback + 1 {
            self.history.pop_front();
        }
        // Early bars: lag as far back as the series allows.
        let lag = self.lookback.min(self.history.len() - 1);
        let lagged = self.history[self.history.len() - 1 - lag];
        self.current = Some(Decimal::TWO * e - lagged);
        self.current
    }

    fn reset(&mut self) {
        self.ema.reset();
        self.history.clear();
        self.current = None;
    }

    fn period(&self) -> usize {
        self.ema.period()
    }

    fn is_ready(&self) -> bool {
        self.current.is_some()
    }
}

/// MACD built from zero-lag EMAs, with a plain EMA signal line.
#[derive(Debug, Clone)]
pub struct ZeroLagMacd {
    fast: ZeroLagEma,
    slow: ZeroLagEma,
    signal_ema: Ema,
    macd_line: Option<Decimal>,
    signal_line: Option<Decimal>,
}

impl ZeroLagMacd {
    pub fn new(
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
        factor: Decimal,
    ) -> Self {
        assert!(
            fast_period < slow_period,
            "Fast period must be less than slow period"
        );
        Self {
            fast: ZeroLagEma::new(fast_period, factor),
            slow: ZeroLagEma::new(slow_period, factor),
            signal_ema: Ema::new(signal_period),
            macd_line: None,
            signal_line: None,
        }
    }

    pub fn output(&self) -> Option<MacdOutput> {
        match (self.macd_line, self.signal_line) {
            (Some(macd), Some(signal)) => Some(MacdOutput {
                macd,
                signal,
                histogram: macd - signal,
            }),
            _ => None,
        }
    }

    pub fn next_output(&mut self, value: Decimal) -> Option<MacdOutput> {
        let fast = self.fast.next(value);
        let slow = self.slow.next(value);

        if let (Some(f), Some(s)) = (fast, slow) {
            let macd = f - s;
            self.macd_line = Some(macd);
            self.signal_line = self.signal_ema.next(macd);
        }

        self.output()
    }
}

impl Indicator for ZeroLagMacd {
    fn next(&mut self, value: Decimal) -> Option<Decimal> {
        self.next_output(value).map(|o| o.macd)
    }

    fn reset(&mut self) {
        self.fast.reset();
        self.slow.reset();
        self.signal_ema.reset();
        self.macd_line = None;
        self.signal_line = None;
    }

    fn period(&self) -> usize {
        self.slow.period()
    }

    fn is_ready(&self) -> bool {
        self.signal_line.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_macd_output_from_first_bar() {
        let mut macd = Macd::new(3, 5, 3);
        let out = macd.next_output(dec!(10)).unwrap();
        // Both EMAs seed to the first sample, so the line starts flat.
        assert_eq!(out.macd, Decimal::ZERO);
        assert_eq!(out.signal, Decimal::ZERO);
    }

    #[test]
    fn test_macd_rises_with_uptrend() {
        let mut macd = Macd::new(3, 6, 3);
        let mut out = None;
        for i in 0..20i64 {
            out = macd.next_output(Decimal::from(100 + i * 2));
        }
        let out = out.unwrap();
        assert!(out.macd > Decimal::ZERO);
        assert!(out.histogram >= Decimal::ZERO);
    }

    #[test]
    fn test_zero_lag_factor_zero_collapses_to_ema() {
        // With factor 0 the correction term cancels: the zero-lag MACD must
        // track the standard MACD exactly, bar for bar.
        let mut standard = Macd::new(3, 6, 4);
        let mut zero_lag = ZeroLagMacd::new(3, 6, 4, Decimal::ZERO);
        let closes = [
            dec!(100), dec!(101.5), dec!(99.25), dec!(102), dec!(104),
            dec!(103.5), dec!(106), dec!(105), dec!(108), dec!(110),
        ];
        for c in closes {
            let a = standard.next_output(c).unwrap();
            let b = zero_lag.next_output(c).unwrap();
            assert_eq!(a.macd, b.macd);
            assert_eq!(a.signal, b.signal);
            assert_eq!(a.histogram, b.histogram);
        }
    }

    #[test]
    fn test_zero_lag_lookback_rounding() {
        let zl = ZeroLagEma::new(10, dec!(0.25));
        assert_eq!(zl.lookback(), 3); // round(2.5) away from zero
        let zl = ZeroLagEma::new(10, dec!(0.5));
        assert_eq!(zl.lookback(), 5);
        let zl = ZeroLagEma::new(10, Decimal::ZERO);
        assert_eq!(zl.lookback(), 0);
    }

    #[test]
    fn test_zero_lag_leads_plain_ema_in_trend() {
        let mut ema = Ema::new(5);
        let mut zl = ZeroLagEma::new(5, dec!(0.5));
        let mut e = None;
        let mut z = None;
        for i in 0..30i64 {
            let v = Decimal::from(100 + i);
            e = ema.next(v);
            z = zl.next(v);
        }
        // In a steady uptrend the zero-lag line sits above the lagging EMA.
        assert!(z.unwrap() > e.unwrap());
    }
}
