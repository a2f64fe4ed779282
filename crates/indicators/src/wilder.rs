use rust_decimal::Decimal;

/// Wilder running sum.
///
/// Accumulates plainly for the first `period` samples, then decays the sum
/// itself each bar: `S = S - S/period + x`. This is the classic Wilder
/// recurrence; it is NOT a sliding-window sum (the decay removes an
/// average slice, not the sample leaving the window) and must stay that
/// way, since converting it to a true windowed sum changes every
/// downstream DI/ADX value.
#[derive(Debug, Clone)]
pub struct WilderSum {
    len: usize,
    sum: Decimal,
    count: usize,
}

impl WilderSum {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Wilder period must be > 0");
        Self {
            len: period,
            sum: Decimal::ZERO,
            count: 0,
        }
    }

    pub fn next(&mut self, value: Decimal) -> Decimal {
        if self.count < self.len {
            self.sum += value;
        } else {
            self.sum = self.sum - self.sum / Decimal::from(self.len) + value;
        }
        self.count += 1;
        self.sum
    }

    pub fn value(&self) -> Decimal {
        self.sum
    }

    /// Whether the initial accumulation phase has completed.
    pub fn is_primed(&self) -> bool {
        self.count >= self.len
    }

    pub fn period(&self) -> usize {
        self.len
    }

    pub fn reset(&mut self) {
        self.sum = Decimal::ZERO;
        self.count = 0;
    }
}

/// Wilder moving average: SMA over the first `period` samples as a seed,
/// then `A = (A*(period-1) + x) / period`.
#[derive(Debug, Clone)]
pub struct WilderAvg {
    len: usize,
    seed_sum: Decimal,
    avg: Option<Decimal>,
    count: usize,
}

impl WilderAvg {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Wilder period must be > 0");
        Self {
            len: period,
            seed_sum: Decimal::ZERO,
            avg: None,
            count: 0,
        }
    }

    pub fn next(&mut self, value: Decimal) -> Option<Decimal> {
        self.count += 1;
        match self.avg {
            None => {
                self.seed_sum += value;
                if self.count >= self.len {
                    self.avg = Some(self.seed_sum / Decimal::from(self.len));
                }
            }
            Some(prev) => {
                let period = Decimal::from(self.len);
                self.avg = Some((prev * (period - Decimal::ONE) + value) / period);
            }
        }
        self.avg
    }

    pub fn value(&self) -> Option<Decimal> {
        self.avg
    }

    pub fn reset(&mut self) {
        self.seed_sum = Decimal::ZERO;
        self.avg = None;
        self.count = 0;
    }
}
