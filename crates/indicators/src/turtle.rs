use crate::Indicator;
use rust_decimal::Decimal;
use std::collections::VecDeque;

/// Which breakout band price touched most recently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandTouch {
    Upper,
    Lower,
}

/// Turtle-style breakout channel.
///
/// Entry bands are the rolling extremes of the last `entry_length` bars and
/// exit bands of the last `exit_length` bars, both excluding the current
/// bar. The breakout test compares the current bar against the previous
/// bar's entry bands. The trend line mirrors the most recently touched
/// side: after an upper touch it follows the exit low (a long trailing
/// line), after a lower touch the exit high. When the same bar touches
/// both bands the upper touch wins.
///
/// Until `max(entry_length, exit_length)` bars have been seen the outputs
/// simply mirror the current bar (upper = high, lower = low, trend =
/// close); that is a defined warm-up fallback, not an error state.
#[derive(Debug, Clone)]
pub struct TurtleChannel {
    entry_length: usize,
    exit_length: usize,
    highs: VecDeque<Decimal>,
    lows: VecDeque<Decimal>,
    prev_upper: Option<Decimal>,
    prev_lower: Option<Decimal>,
    last_touch: Option<BandTouch>,
    current: Option<TurtleOutput>,
    count: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct TurtleOutput {
    /// Highest high of the entry window (prior bars only).
    pub upper: Decimal,
    /// Lowest low of the entry window (prior bars only).
    pub lower: Decimal,
    /// Highest high of the exit window.
    pub exit_upper: Decimal,
    /// Lowest low of the exit window.
    pub exit_lower: Decimal,
    /// Trailing trend line, selected by the most recent band touch.
    pub trend: Decimal,
    /// Band touched by the current bar, if any.
    pub touch: Option<BandTouch>,
}

impl TurtleChannel {
    pub fn new(entry_length: usize, exit_length: usize) -> Self {
        assert!(entry_length > 0 && exit_length > 0, "lengths must be > 0");
        let depth = entry_length.max(exit_length);
        Self {
            entry_length,
            exit_length,
            highs: VecDeque::with_capacity(depth),
            lows: VecDeque::with_capacity(depth),
            prev_upper: None,
            prev_lower: None,
            last_touch: None,
            current: None,
            count: 0,
        }
    }

    fn window_max(buffer: &VecDeque<Decimal>, window: usize) -> Decimal {
        buffer
            .iter()
            .rev()
            .take(window)
            .copied()
            .max()
            .unwrap_or(Decimal::ZERO)
    }

    fn window_min(buffer: &VecDeque<Decimal>, window: usize) -> Decimal {
        buffer
            .iter()
            .rev()
            .take(window)
            .copied()
            .min()
            .unwrap_or(Decimal::ZERO)
    }

    fn push(&mut self, high: Decimal, low: Decimal) {
        let depth = self.entry_length.max(self.exit_length);
        self.highs.push_back(high);
        self.lows.push_back(low);
        if self.highs.len() > depth {
            self.highs.pop_front();
            self.lows.pop_front();
        }
        self.count += 1;
    }

    /// Feed the next bar's high/low/close.
    pub fn next_bar(&mut self, high: Decimal, low: Decimal, close: Decimal) -> TurtleOutput {
        let warmup = self.count < self.entry_length.max(self.exit_length);

        if warmup {
            self.push(high, low);
            let out = TurtleOutput {
                upper: high,
                lower: low,
                exit_upper: high,
                exit_lower: low,
                trend: close,
                touch: None,
            };
            self.current = Some(out);
            return out;
        }

        // Bands from prior bars only: compute before pushing the current bar.
        let upper = Self::window_max(&self.highs, self.entry_length);
        let lower = Self::window_min(&self.lows, self.entry_length);
        let exit_upper = Self::window_max(&self.highs, self.exit_length);
        let exit_lower = Self::window_min(&self.lows, self.exit_length);

        // Breakout test against the previous bar's entry bands. The upper
        // check runs first, so a bar touching both counts as an upper touch.
        let mut touch = None;
        if let (Some(pu), Some(pl)) = (self.prev_upper, self.prev_lower) {
            if high >= pu {
                touch = Some(BandTouch::Upper);
            } else if low <= pl {
                touch = Some(BandTouch::Lower);
            }
        }
        if touch.is_some() {
            self.last_touch = touch;
        }

        let trend = match self.last_touch {
            Some(BandTouch::Upper) => exit_lower,
            Some(BandTouch::Lower) => exit_upper,
            None => close,
        };

        self.prev_upper = Some(upper);
        self.prev_lower = Some(lower);
        self.push(high, low);

        let out = TurtleOutput {
            upper,
            lower,
            exit_upper,
            exit_lower,
            trend,
            touch,
        };
        self.current = Some(out);
        out
    }

    pub fn output(&self) -> Option<TurtleOutput> {
        self.current
    }

    pub fn bars_seen(&self) -> usize {
        self.count
    }
}

impl Indicator for TurtleChannel {
    fn next(&mut self, value: Decimal) -> Option<Decimal> {
        // Simplified: collapse high/low/close onto one value.
        Some(self.next_bar(value, value, value).trend)
    }

    fn reset(&mut self) {
        self.highs.clear();
        self.lows.clear();
        self.prev_upper = None;
        self.prev_lower = None;
        self.last_touch = None;
        self.current = None;
        self.count = 0;
    }

    fn period(&self) -> usize {
        self.entry_length.max(self.exit_length)
    }

    fn is_ready(&self) -> bool {
        self.count >= self.entry_length.max(self.exit_length)
    }
}
