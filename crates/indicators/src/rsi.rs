use crate::wilder::WilderAvg;
use crate::Indicator;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Relative Strength Index (RSI).
/// Average gain/loss use Wilder smoothing with an SMA seed.
#[derive(Debug, Clone)]
pub struct Rsi {
    len: usize,
    prev_value: Option<Decimal>,
    avg_gain: WilderAvg,
    avg_loss: WilderAvg,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "RSI period must be > 0");
        Self {
            len: period,
            prev_value: None,
            avg_gain: WilderAvg::new(period),
            avg_loss: WilderAvg::new(period),
        }
    }

    pub fn value(&self) -> Option<Decimal> {
        match (self.avg_gain.value(), self.avg_loss.value()) {
            (Some(ag), Some(al)) => {
                if al.is_zero() {
                    Some(dec!(100))
                } else {
                    let rs = ag / al;
                    Some(dec!(100) - (dec!(100) / (Decimal::ONE + rs)))
                }
            }
            _ => None,
        }
    }
}

impl Indicator for Rsi {
    fn next(&mut self, value: Decimal) -> Option<Decimal> {
        if let Some(prev) = self.prev_value {
            let change = value - prev;
            let gain = if change > Decimal::ZERO {
                change
            } else {
                Decimal::ZERO
            };
            let loss = if change < Decimal::ZERO {
                change.abs()
            } else {
                Decimal::ZERO
            };
            self.avg_gain.next(gain);
            self.avg_loss.next(loss);
        }
        self.prev_value = Some(value);
        self.value()
    }

    fn reset(&mut self) {
        self.prev_value = None;
        self.avg_gain.reset();
        self.avg_loss.reset();
    }

    fn period(&self) -> usize {
        self.len + 1 // need one extra data point for the first change
    }

    fn is_ready(&self) -> bool {
        self.avg_gain.value().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rsi_in_range() {
        let mut rsi = Rsi::new(14);
        let values = [
            dec!(44), dec!(44.34), dec!(44.09), dec!(43.61), dec!(44.33),
            dec!(44.83), dec!(45.10), dec!(45.42), dec!(45.84), dec!(46.08),
            dec!(45.89), dec!(46.03), dec!(45.61), dec!(46.28), dec!(46.28),
        ];
        let mut result = None;
        for v in &values {
            result = rsi.next(*v);
        }
        let rsi_val = result.unwrap();
        assert!(rsi_val > Decimal::ZERO && rsi_val < dec!(100));
    }

    #[test]
    fn test_rsi_all_gains_is_100() {
        let mut rsi = Rsi::new(3);
        let mut result = None;
        for i in 0..6i64 {
            result = rsi.next(Decimal::from(10 + i));
        }
        assert_eq!(result, Some(dec!(100)));
    }

    #[test]
    fn test_rsi_not_ready_during_seed() {
        let mut rsi = Rsi::new(3);
        assert_eq!(rsi.next(dec!(10)), None);
        assert_eq!(rsi.next(dec!(11)), None);
        assert_eq!(rsi.next(dec!(12)), None);
        // Fourth value completes the 3-change seed.
        assert!(rsi.next(dec!(13)).is_some());
    }
}
