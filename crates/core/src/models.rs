use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::PathBuf;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Market Data
// ---------------------------------------------------------------------------

/// A single OHLCV bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub instrument: String,
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Bar {
    /// True range against the previous close.
    pub fn true_range(&self, prev_close: Option<Decimal>) -> Decimal {
        match prev_close {
            Some(pc) => {
                let hl = self.high - self.low;
                let hc = (self.high - pc).abs();
                let lc = (self.low - pc).abs();
                hl.max(hc).max(lc)
            }
            None => self.high - self.low,
        }
    }

    pub fn is_up_close(&self) -> bool {
        self.close > self.open
    }

    pub fn is_down_close(&self) -> bool {
        self.close < self.open
    }
}

/// Timeframe for bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    Minute(u32),
    Hour(u32),
    Daily,
}

impl Timeframe {
    /// Length of one bucket in seconds. Daily is a calendar day.
    pub fn seconds(&self) -> i64 {
        match self {
            Timeframe::Minute(n) => i64::from(*n) * 60,
            Timeframe::Hour(n) => i64::from(*n) * 3600,
            Timeframe::Daily => 86_400,
        }
    }
}

// ---------------------------------------------------------------------------
// Bar Window (bars-ago addressing)
// ---------------------------------------------------------------------------

/// Bounded view over the most recent bars of one series.
///
/// Addressing follows the bars-ago convention: offset 0 is the current bar,
/// 1 the previous, and so on. Bars older than the window capacity fall off
/// the back; reads past the window or before the first bar return `None`.
#[derive(Debug, Clone)]
pub struct BarWindow {
    capacity: usize,
    bars: VecDeque<Bar>,
    seen: usize,
}

impl BarWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "BarWindow capacity must be > 0");
        Self {
            capacity,
            bars: VecDeque::with_capacity(capacity),
            seen: 0,
        }
    }

    pub fn push(&mut self, bar: Bar) {
        self.bars.push_back(bar);
        if self.bars.len() > self.capacity {
            self.bars.pop_front();
        }
        self.seen += 1;
    }

    /// Index of the current bar, counted from the first bar ever pushed.
    /// Monotonically increasing; `None` before the first push.
    pub fn current_index(&self) -> Option<usize> {
        self.seen.checked_sub(1)
    }

    /// Number of bars currently held (≤ capacity).
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bar(&self, bars_ago: usize) -> Option<&Bar> {
        let len = self.bars.len();
        if bars_ago >= len {
            return None;
        }
        self.bars.get(len - 1 - bars_ago)
    }

    pub fn open(&self, bars_ago: usize) -> Option<Decimal> {
        self.bar(bars_ago).map(|b| b.open)
    }

    pub fn high(&self, bars_ago: usize) -> Option<Decimal> {
        self.bar(bars_ago).map(|b| b.high)
    }

    pub fn low(&self, bars_ago: usize) -> Option<Decimal> {
        self.bar(bars_ago).map(|b| b.low)
    }

    pub fn close(&self, bars_ago: usize) -> Option<Decimal> {
        self.bar(bars_ago).map(|b| b.close)
    }

    pub fn volume(&self, bars_ago: usize) -> Option<Decimal> {
        self.bar(bars_ago).map(|b| b.volume)
    }

    pub fn time(&self, bars_ago: usize) -> Option<DateTime<Utc>> {
        self.bar(bars_ago).map(|b| b.timestamp)
    }
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// Directional regime of a signal state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    #[default]
    Flat,
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalAction {
    EnterLong,
    EnterShort,
    ExitLong,
    ExitShort,
}

impl SignalAction {
    pub fn is_entry(&self) -> bool {
        matches!(self, SignalAction::EnterLong | SignalAction::EnterShort)
    }
}

/// A discrete signal emitted by an indicator plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: Uuid,
    pub instrument: String,
    pub action: SignalAction,
    /// Price-axis anchor for the signal (typically the triggering bar's
    /// high or low).
    pub price: Option<Decimal>,
    pub plugin_id: String,
    /// Index of the bar that triggered the signal.
    pub bar_index: usize,
    pub timestamp: DateTime<Utc>,
    pub note: Option<String>,
}

impl Signal {
    pub fn new(
        plugin_id: &str,
        bar: &Bar,
        bar_index: usize,
        action: SignalAction,
        price: Option<Decimal>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            instrument: bar.instrument.clone(),
            action,
            price,
            plugin_id: plugin_id.to_string(),
            bar_index,
            timestamp: bar.timestamp,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Draw / Alert commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    ArrowUp,
    ArrowDown,
    Diamond,
    Text,
    Region,
}

/// A drawing instruction for the chart surface.
///
/// Tags are unique per drawn object; issuing a command with an existing tag
/// replaces the prior object, so repainting the same bar is idempotent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawCommand {
    pub kind: MarkerKind,
    pub tag: String,
    pub bars_ago: usize,
    pub price: Decimal,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    Low,
    Medium,
    High,
}

/// A best-effort alert request. Failures are logged and ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertCommand {
    pub name: String,
    pub priority: AlertPriority,
    pub message: String,
    pub sound_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bar(high: Decimal, low: Decimal, close: Decimal) -> Bar {
        Bar {
            instrument: "ES".to_string(),
            timestamp: Utc::now(),
            open: close,
            high,
            low,
            close,
            volume: Decimal::ZERO,
        }
    }

    #[test]
    fn test_true_range_first_bar() {
        let b = bar(dec!(10), dec!(8), dec!(9));
        assert_eq!(b.true_range(None), dec!(2));
    }

    #[test]
    fn test_true_range_gap() {
        // Gap down: previous close far above today's range.
        let b = bar(dec!(10), dec!(8), dec!(9));
        assert_eq!(b.true_range(Some(dec!(14))), dec!(6));
    }

    #[test]
    fn test_bar_window_bars_ago() {
        let mut w = BarWindow::new(3);
        assert_eq!(w.current_index(), None);
        for i in 1i64..=4 {
            w.push(bar(Decimal::from(i + 1), Decimal::from(i - 1), Decimal::from(i)));
        }
        // Four bars pushed, capacity three: index keeps counting.
        assert_eq!(w.current_index(), Some(3));
        assert_eq!(w.len(), 3);
        assert_eq!(w.close(0), Some(dec!(4)));
        assert_eq!(w.close(1), Some(dec!(3)));
        assert_eq!(w.close(2), Some(dec!(2)));
        // Oldest bar has fallen off.
        assert_eq!(w.close(3), None);
    }
}
