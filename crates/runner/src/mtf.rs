use crate::report::RunReport;
use chrono::Duration;
use tracing::{debug, info};
use trendsig_core::{Bar, BarEvent, MultiSeriesPlugin, Timeframe};

/// Merge a primary series with pre-resampled secondary series into one
/// ordered event stream.
///
/// A secondary bar is stamped with its bucket start but only *completes*
/// one timeframe later; its event is delivered immediately before the
/// first primary bar at or past that completion time. That gives the
/// required ordering (secondary slots refresh first, then the primary bar
/// reads their cached state) without ever letting a secondary bar carry
/// data from beyond the primary bar being processed.
pub fn interleave(primary: &[Bar], secondaries: &[(Timeframe, Vec<Bar>)]) -> Vec<BarEvent> {
    let mut events = Vec::new();
    let mut cursors: Vec<usize> = vec![0; secondaries.len()];

    for bar in primary {
        for (slot, (timeframe, series)) in secondaries.iter().enumerate() {
            let span = Duration::seconds(timeframe.seconds());
            while let Some(secondary_bar) = series.get(cursors[slot]) {
                if secondary_bar.timestamp + span <= bar.timestamp {
                    events.push(BarEvent::secondary(slot, secondary_bar.clone()));
                    cursors[slot] += 1;
                } else {
                    break;
                }
            }
        }
        events.push(BarEvent::primary(bar.clone()));
    }

    // Whatever buckets completed after the last primary bar still flush.
    for (slot, (_, series)) in secondaries.iter().enumerate() {
        for secondary_bar in &series[cursors[slot]..] {
            events.push(BarEvent::secondary(slot, secondary_bar.clone()));
        }
    }

    events
}

/// Drive a multi-series plugin over an interleaved event stream.
pub fn run_multi_series(events: &[BarEvent], plugin: &mut dyn MultiSeriesPlugin) -> RunReport {
    let mut report = RunReport::new(plugin.id(), 0);

    info!(plugin = plugin.id(), events = events.len(), "starting multi-series run");

    for event in events {
        let update = plugin.on_event(event);
        if event.slot.is_primary() {
            report.record_bar(event.bar.timestamp);
        }
        for signal in update.signals {
            debug!(plugin = plugin.id(), action = ?signal.action, "signal");
            report.record_signal(signal);
        }
    }

    info!(
        plugin = plugin.id(),
        signals = report.signals.len(),
        "multi-series run complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use trendsig_core::SeriesSlot;

    fn bar(minute: i64, close: Decimal) -> Bar {
        Bar {
            instrument: "ES".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
                + chrono::Duration::minutes(minute),
            open: close,
            high: close + Decimal::ONE,
            low: close - Decimal::ONE,
            close,
            volume: dec!(10),
        }
    }

    #[test]
    fn test_secondary_delivered_at_completion_before_primary() {
        let primary: Vec<Bar> = (0..10).map(|i| bar(i, dec!(100))).collect();
        // 5-minute secondary bars stamped at bucket starts 9:00 and 9:05.
        let secondary = vec![bar(0, dec!(100)), bar(5, dec!(101))];
        let events = interleave(&primary, &[(Timeframe::Minute(5), secondary)]);

        // 10 primary + 2 secondary events.
        assert_eq!(events.len(), 12);

        // The 9:00 bucket completes at 9:05: its event lands right before
        // the 9:05 primary bar.
        let first_secondary = events
            .iter()
            .position(|e| e.slot == SeriesSlot::Secondary(0))
            .unwrap();
        assert_eq!(first_secondary, 5);
        assert!(events[first_secondary + 1].slot.is_primary());
        assert_eq!(
            events[first_secondary + 1].bar.timestamp,
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 0).unwrap()
        );

        // The 9:05 bucket completes after the last primary bar and is
        // flushed at the end.
        assert_eq!(events.last().unwrap().slot, SeriesSlot::Secondary(0));
    }
}
