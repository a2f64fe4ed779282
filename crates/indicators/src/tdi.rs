use crate::rolling::RollingWindow;
use crate::rsi::Rsi;
use crate::sma::Sma;
use crate::Indicator;
use rust_decimal::Decimal;

/// Traders Dynamic Index: RSI smoothed into a price line and a slower
/// signal line, wrapped in volatility bands built on the same RSI stream.
///
/// The SMA lines use the growing-window startup policy, so they produce
/// values from the first RSI reading onward; readiness tracks the band
/// window filling up.
#[derive(Debug, Clone)]
pub struct Tdi {
    rsi: Rsi,
    price_line: Sma,
    signal_line: Sma,
    band_window: RollingWindow,
    band_mult: Decimal,
    current: Option<TdiOutput>,
}

#[derive(Debug, Clone, Copy)]
pub struct TdiOutput {
    pub rsi: Decimal,
    /// Fast SMA of RSI (the "price" line).
    pub price: Decimal,
    /// Slower SMA of RSI (the signal line).
    pub signal: Decimal,
    pub band_upper: Decimal,
    pub band_mid: Decimal,
    pub band_lower: Decimal,
}

impl Tdi {
    pub fn new(
        rsi_period: usize,
        price_period: usize,
        signal_period: usize,
        band_period: usize,
        band_mult: Decimal,
    ) -> Self {
        Self {
            rsi: Rsi::new(rsi_period),
            price_line: Sma::new(price_period),
            signal_line: Sma::new(signal_period),
            band_window: RollingWindow::new(band_period),
            band_mult,
            current: None,
        }
    }

    /// Common TDI parameterization (13, 2, 7, 34, 1.6185).
    pub fn default_periods() -> Self {
        Self::new(13, 2, 7, 34, Decimal::new(16185, 4))
    }

    pub fn output(&self) -> Option<TdiOutput> {
        self.current
    }

    pub fn next_close(&mut self, close: Decimal) -> Option<TdiOutput> {
        let r = self.rsi.next(close)?;

        self.band_window.push(r);
        let price = self.price_line.next(r)?;
        let signal = self.signal_line.next(r)?;
        let mid = self.band_window.mean()?;
        let sd = self.band_window.stddev();

        let out = TdiOutput {
            rsi: r,
            price,
            signal,
            band_upper: mid + self.band_mult * sd,
            band_mid: mid,
            band_lower: mid - self.band_mult * sd,
        };
        self.current = Some(out);
        Some(out)
    }
}

impl Indicator for Tdi {
    fn next(&mut self, value: Decimal) -> Option<Decimal> {
        self.next_close(value).map(|o| o.price)
    }

    fn reset(&mut self) {
        self.rsi.reset();
        self.price_line.reset();
        self.signal_line.reset();
        self.band_window.clear();
        self.current = None;
    }

    fn period(&self) -> usize {
        self.rsi.period() + self.band_window.period()
    }

    fn is_ready(&self) -> bool {
        self.rsi.is_ready() && self.band_window.is_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_no_output_until_rsi_ready() {
        let mut tdi = Tdi::new(3, 2, 4, 5, dec!(1.6185));
        assert!(tdi.next_close(dec!(100)).is_none());
        assert!(tdi.next_close(dec!(101)).is_none());
        assert!(tdi.next_close(dec!(100.5)).is_none());
        // Fourth close completes the RSI seed; lines start immediately on
        // the growing-window policy.
        assert!(tdi.next_close(dec!(101.5)).is_some());
    }

    #[test]
    fn test_bands_bracket_mid() {
        let mut tdi = Tdi::new(3, 2, 4, 5, dec!(1.6185));
        let closes = [
            dec!(100), dec!(101), dec!(100.5), dec!(102), dec!(101.5),
            dec!(103), dec!(102.5), dec!(104), dec!(103), dec!(105),
        ];
        let mut out = None;
        for c in closes {
            out = tdi.next_close(c);
        }
        let out = out.unwrap();
        assert!(out.band_upper >= out.band_mid);
        assert!(out.band_mid >= out.band_lower);
        // RSI-derived series stay in oscillator range.
        assert!(out.price >= Decimal::ZERO && out.price <= dec!(100));
        assert!(out.signal >= Decimal::ZERO && out.signal <= dec!(100));
    }

    #[test]
    fn test_price_line_tracks_rsi_faster_than_signal() {
        let mut tdi = Tdi::new(3, 2, 7, 10, dec!(1.6185));
        let mut out = None;
        // Early dips keep the Wilder loss average alive, then a sustained
        // rally sends RSI strictly rising; the short price line should sit
        // above the slower signal line.
        let closes = [
            100, 101, 100, 102, 101, 103, 104, 105, 106, 107, 108, 109, 110, 111, 112,
        ];
        for c in closes {
            out = tdi.next_close(Decimal::from(c));
        }
        let out = out.unwrap();
        assert!(out.price > out.signal);
    }
}
