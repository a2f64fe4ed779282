use chrono::{DateTime, Utc};
use serde::Serialize;
use trendsig_core::{Signal, SignalAction};

/// Summary of one run of a plugin over a bar series.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub plugin_id: String,
    pub bars_processed: usize,
    pub warmup_bars: usize,
    pub signals: Vec<Signal>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl RunReport {
    pub fn new(plugin_id: &str, warmup_bars: usize) -> Self {
        Self {
            plugin_id: plugin_id.to_string(),
            bars_processed: 0,
            warmup_bars,
            signals: Vec::new(),
            start: None,
            end: None,
        }
    }

    pub fn record_bar(&mut self, timestamp: DateTime<Utc>) {
        self.bars_processed += 1;
        if self.start.is_none() {
            self.start = Some(timestamp);
        }
        self.end = Some(timestamp);
    }

    pub fn record_signal(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    pub fn count(&self, action: SignalAction) -> usize {
        self.signals.iter().filter(|s| s.action == action).count()
    }

    pub fn entries(&self) -> usize {
        self.signals.iter().filter(|s| s.action.is_entry()).count()
    }

    /// Human-readable one-screen summary.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("plugin:          {}\n", self.plugin_id));
        out.push_str(&format!("bars processed:  {}\n", self.bars_processed));
        out.push_str(&format!("warm-up bars:    {}\n", self.warmup_bars));
        if let (Some(start), Some(end)) = (self.start, self.end) {
            out.push_str(&format!("range:           {} .. {}\n", start, end));
        }
        out.push_str(&format!(
            "signals:         {} ({} long entries, {} short entries, {} exits)\n",
            self.signals.len(),
            self.count(SignalAction::EnterLong),
            self.count(SignalAction::EnterShort),
            self.count(SignalAction::ExitLong) + self.count(SignalAction::ExitShort),
        ));
        for signal in &self.signals {
            out.push_str(&format!(
                "  {}  {:?}  bar {}  {}\n",
                signal.timestamp,
                signal.action,
                signal.bar_index,
                signal
                    .price
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use trendsig_core::Bar;

    fn bar() -> Bar {
        Bar {
            instrument: "ES".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            open: dec!(100),
            high: dec!(101),
            low: dec!(99),
            close: dec!(100.5),
            volume: dec!(10),
        }
    }

    #[test]
    fn test_counts_by_action() {
        let mut report = RunReport::new("test_plugin", 14);
        let b = bar();
        report.record_bar(b.timestamp);
        report.record_signal(Signal::new(
            "test_plugin",
            &b,
            0,
            SignalAction::EnterLong,
            None,
        ));
        report.record_signal(Signal::new(
            "test_plugin",
            &b,
            0,
            SignalAction::ExitLong,
            None,
        ));
        assert_eq!(report.count(SignalAction::EnterLong), 1);
        assert_eq!(report.count(SignalAction::EnterShort), 0);
        assert_eq!(report.entries(), 1);
        assert!(report.summary().contains("1 long entries"));
    }
}
