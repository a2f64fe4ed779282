use crate::wilder::WilderSum;
use crate::Indicator;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Directional Movement engine: +DI, −DI, and ADX over one period.
///
/// TR/+DM/−DM run through the Wilder running-sum recurrence. ADX seeds at
/// the neutral 50 and is smoothed with `((period-1)*prev + dx) / period`.
/// A zero smoothed true range yields DI values of exactly 0; a zero DI sum
/// yields the neutral ADX of 50. Outputs are always defined, so callers
/// gate on `is_ready()` (or a bar count) rather than on `Option`.
#[derive(Debug, Clone)]
pub struct Dmi {
    len: usize,
    prev_high: Option<Decimal>,
    prev_low: Option<Decimal>,
    prev_close: Option<Decimal>,
    tr_sum: WilderSum,
    dm_plus_sum: WilderSum,
    dm_minus_sum: WilderSum,
    current: Option<DmiOutput>,
    count: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct DmiOutput {
    pub di_plus: Decimal,
    pub di_minus: Decimal,
    pub adx: Decimal,
}

impl Dmi {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "DMI period must be > 0");
        Self {
            len: period,
            prev_high: None,
            prev_low: None,
            prev_close: None,
            tr_sum: WilderSum::new(period),
            dm_plus_sum: WilderSum::new(period),
            dm_minus_sum: WilderSum::new(period),
            current: None,
            count: 0,
        }
    }

    /// Feed the next bar's high/low/close.
    pub fn next_bar(&mut self, high: Decimal, low: Decimal, close: Decimal) -> DmiOutput {
        let (tr, dm_plus, dm_minus) = match (self.prev_high, self.prev_low, self.prev_close) {
            (Some(ph), Some(pl), Some(pc)) => {
                let tr = (low - pc)
                    .abs()
                    .max(high - low)
                    .max((high - pc).abs());
                let up_move = high - ph;
                let down_move = pl - low;
                let dm_plus = if up_move > down_move {
                    up_move.max(Decimal::ZERO)
                } else {
                    Decimal::ZERO
                };
                let dm_minus = if down_move > up_move {
                    down_move.max(Decimal::ZERO)
                } else {
                    Decimal::ZERO
                };
                (tr, dm_plus, dm_minus)
            }
            // First bar: range only, no directional movement yet.
            _ => (high - low, Decimal::ZERO, Decimal::ZERO),
        };

        let smoothed_tr = self.tr_sum.next(tr);
        let smoothed_dm_plus = self.dm_plus_sum.next(dm_plus);
        let smoothed_dm_minus = self.dm_minus_sum.next(dm_minus);

        let (di_plus, di_minus) = if smoothed_tr.is_zero() {
            (Decimal::ZERO, Decimal::ZERO)
        } else {
            (
                dec!(100) * smoothed_dm_plus / smoothed_tr,
                dec!(100) * smoothed_dm_minus / smoothed_tr,
            )
        };

        let di_sum = di_plus + di_minus;
        let adx = if di_sum.is_zero() {
            dec!(50)
        } else {
            let prev_adx = self.current.map(|c| c.adx).unwrap_or(dec!(50));
            let dx = dec!(100) * (di_plus - di_minus).abs() / di_sum;
            let period = Decimal::from(self.len);
            ((period - Decimal::ONE) * prev_adx + dx) / period
        };

        self.prev_high = Some(high);
        self.prev_low = Some(low);
        self.prev_close = Some(close);
        self.count += 1;

        let out = DmiOutput {
            di_plus,
            di_minus,
            adx,
        };
        self.current = Some(out);
        out
    }

    pub fn output(&self) -> Option<DmiOutput> {
        self.current
    }

    /// Bars processed so far.
    pub fn bars_seen(&self) -> usize {
        self.count
    }
}

impl Indicator for Dmi {
    fn next(&mut self, value: Decimal) -> Option<Decimal> {
        // Simplified: collapse high/low/close onto one value; ADX then
        // reflects close-to-close movement only.
        Some(self.next_bar(value, value, value).adx)
    }

    fn reset(&mut self) {
        self.prev_high = None;
        self.prev_low = None;
        self.prev_close = None;
        self.tr_sum.reset();
        self.dm_plus_sum.reset();
        self.dm_minus_sum.reset();
        self.current = None;
        self.count = 0;
    }

    fn period(&self) -> usize {
        self.len
    }

    fn is_ready(&self) -> bool {
        self.count > self.len
    }
}
