use crate::Indicator;
use rust_decimal::Decimal;

/// Exponential Moving Average (EMA).
///
/// `alpha = 2 / (period + 1)`, seeded with the first sample, so output is
/// available from the very first value fed in.
#[derive(Debug, Clone)]
pub struct Ema {
    len: usize,
    multiplier: Decimal,
    current: Option<Decimal>,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "EMA period must be > 0");
        let multiplier = Decimal::TWO / (Decimal::from(period) + Decimal::ONE);
        Self {
            len: period,
            multiplier,
            current: None,
        }
    }

    pub fn value(&self) -> Option<Decimal> {
        self.current
    }
}

impl Indicator for Ema {
    fn next(&mut self, value: Decimal) -> Option<Decimal> {
        match self.current {
            None => {
                self.current = Some(value);
            }
            Some(prev) => {
                let ema = (value - prev) * self.multiplier + prev;
                self.current = Some(ema);
            }
        }
        self.current
    }

    fn reset(&mut self) {
        self.current = None;
    }

    fn period(&self) -> usize {
        self.len
    }

    fn is_ready(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ema_first_sample_seed() {
        let mut ema = Ema::new(3);
        assert_eq!(ema.next(dec!(4)), Some(dec!(4)));
    }

    #[test]
    fn test_ema_recurrence() {
        let mut ema = Ema::new(3);
        ema.next(dec!(4));
        // alpha = 0.5: (8 - 4) * 0.5 + 4 = 6
        assert_eq!(ema.next(dec!(8)), Some(dec!(6)));
        // (2 - 6) * 0.5 + 6 = 4
        assert_eq!(ema.next(dec!(2)), Some(dec!(4)));
    }
}
