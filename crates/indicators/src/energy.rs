use crate::ema::Ema;
use crate::Indicator;
use rust_decimal::Decimal;

/// Bar-to-bar direction of the energy line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyDirection {
    Rising,
    Falling,
    Flat,
}

/// Market-energy oscillator: the differential of a fast and a slow EMA of
/// close, with its bar-to-bar direction. Positive, rising energy reads as
/// bullish momentum; negative, falling energy as bearish.
#[derive(Debug, Clone)]
pub struct MarketEnergy {
    fast_ema: Ema,
    slow_ema: Ema,
    current: Option<EnergyOutput>,
}

#[derive(Debug, Clone, Copy)]
pub struct EnergyOutput {
    pub energy: Decimal,
    pub direction: EnergyDirection,
}

impl EnergyOutput {
    pub fn is_bullish(&self) -> bool {
        self.energy > Decimal::ZERO && self.direction == EnergyDirection::Rising
    }

    pub fn is_bearish(&self) -> bool {
        self.energy < Decimal::ZERO && self.direction == EnergyDirection::Falling
    }
}

impl MarketEnergy {
    pub fn new(fast_period: usize, slow_period: usize) -> Self {
        assert!(
            fast_period < slow_period,
            "Fast period must be less than slow period"
        );
        Self {
            fast_ema: Ema::new(fast_period),
            slow_ema: Ema::new(slow_period),
            current: None,
        }
    }

    pub fn output(&self) -> Option<EnergyOutput> {
        self.current
    }

    pub fn next_close(&mut self, close: Decimal) -> Option<EnergyOutput> {
        let fast = self.fast_ema.next(close)?;
        let slow = self.slow_ema.next(close)?;
        let energy = fast - slow;

        let direction = match self.current {
            None => EnergyDirection::Flat,
            Some(prev) => {
                if energy > prev.energy {
                    EnergyDirection::Rising
                } else if energy < prev.energy {
                    EnergyDirection::Falling
                } else {
                    EnergyDirection::Flat
                }
            }
        };

        let out = EnergyOutput { energy, direction };
        self.current = Some(out);
        Some(out)
    }
}

impl Indicator for MarketEnergy {
    fn next(&mut self, value: Decimal) -> Option<Decimal> {
        self.next_close(value).map(|o| o.energy)
    }

    fn reset(&mut self) {
        self.fast_ema.reset();
        self.slow_ema.reset();
        self.current = None;
    }

    fn period(&self) -> usize {
        self.slow_ema.period()
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
    fn test_uptrend_turns_bullish() {
        let mut me = MarketEnergy::new(3, 8);
        let mut out = None;
        for i in 0..20i64 {
            out = me.next_close(Decimal::from(100 + i));
        }
        let out = out.unwrap();
        assert!(out.energy > Decimal::ZERO);
        assert!(out.is_bullish());
    }

    #[test]
    fn test_downtrend_turns_bearish() {
        let mut me = MarketEnergy::new(3, 8);
        let mut out = None;
        for i in 0..20i64 {
            out = me.next_close(Decimal::from(200 - i));
        }
        let out = out.unwrap();
        assert!(out.is_bearish());
    }

    #[test]
    fn test_first_bar_is_flat() {
        let mut me = MarketEnergy::new(3, 8);
        let out = me.next_close(dec!(100)).unwrap();
        assert_eq!(out.energy, Decimal::ZERO);
        assert_eq!(out.direction, EnergyDirection::Flat);
    }
}
