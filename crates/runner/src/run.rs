use crate::report::RunReport;
use tracing::{debug, info, warn};
use trendsig_core::{
    AlertCommand, AlertPriority, AlertSink, Bar, DrawCommand, DrawSink, IndicatorPlugin,
    MarkerKind, Signal, SignalAction,
};

/// Feed a bar series through a plugin, strictly sequentially, painting and
/// alerting each emitted signal.
///
/// Sink failures are logged and swallowed; the per-bar computation always
/// runs to completion regardless of what the host surfaces do.
pub fn run_series(
    bars: &[Bar],
    plugin: &mut dyn IndicatorPlugin,
    draw: &mut dyn DrawSink,
    alerts: &mut dyn AlertSink,
) -> RunReport {
    let mut report = RunReport::new(plugin.id(), plugin.warmup_bars());

    info!(
        plugin = plugin.id(),
        bars = bars.len(),
        "starting run"
    );

    for bar in bars {
        let update = plugin.on_bar(bar);
        report.record_bar(bar.timestamp);

        for signal in update.signals {
            debug!(
                plugin = plugin.id(),
                action = ?signal.action,
                bar_index = signal.bar_index,
                "signal"
            );
            paint_signal(draw, &signal, bar);
            send_alert(alerts, &signal, bar);
            report.record_signal(signal);
        }
    }

    info!(
        plugin = plugin.id(),
        signals = report.signals.len(),
        "run complete"
    );
    report
}

/// Tag scheme: `{plugin}.{bar_index}.{direction}`. Unique per signal and
/// stable across repaints, so redrawing replaces instead of duplicating.
fn signal_tag(signal: &Signal) -> String {
    let direction = match signal.action {
        SignalAction::EnterLong => "long",
        SignalAction::EnterShort => "short",
        SignalAction::ExitLong => "exit_long",
        SignalAction::ExitShort => "exit_short",
    };
    format!("{}.{}.{}", signal.plugin_id, signal.bar_index, direction)
}

fn paint_signal(draw: &mut dyn DrawSink, signal: &Signal, bar: &Bar) {
    let (kind, color) = match signal.action {
        SignalAction::EnterLong => (MarkerKind::ArrowUp, "green"),
        SignalAction::EnterShort => (MarkerKind::ArrowDown, "red"),
        SignalAction::ExitLong | SignalAction::ExitShort => (MarkerKind::Diamond, "gray"),
    };
    let command = DrawCommand {
        kind,
        tag: signal_tag(signal),
        bars_ago: 0,
        price: signal.price.unwrap_or(bar.close),
        color: color.to_string(),
    };
    if let Err(e) = draw.draw(command) {
        warn!(plugin = %signal.plugin_id, error = %e, "draw sink failed");
    }
}

fn send_alert(alerts: &mut dyn AlertSink, signal: &Signal, bar: &Bar) {
    let priority = if signal.action.is_entry() {
        AlertPriority::High
    } else {
        AlertPriority::Medium
    };
    let alert = AlertCommand {
        name: signal.plugin_id.clone(),
        priority,
        message: format!(
            "{:?} {} @ {}",
            signal.action, signal.instrument, bar.close
        ),
        sound_file: None,
    };
    if let Err(e) = alerts.alert(alert) {
        warn!(plugin = %signal.plugin_id, error = %e, "alert sink failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::{FailingSink, MemoryAlertSink, MemoryDrawSink};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use trendsig_core::BarUpdate;

    /// Minimal plugin: one long entry on a fixed bar index.
    struct OneShot {
        count: usize,
    }

    impl IndicatorPlugin for OneShot {
        fn id(&self) -> &str {
            "one_shot"
        }
        fn name(&self) -> &str {
            "One Shot"
        }
        fn warmup_bars(&self) -> usize {
            0
        }
        fn on_bar(&mut self, bar: &Bar) -> BarUpdate {
            let index = self.count;
            self.count += 1;
            let mut update = BarUpdate::default();
            if index == 2 {
                update.push_signal(Signal::new(
                    "one_shot",
                    bar,
                    index,
                    SignalAction::EnterLong,
                    Some(bar.low),
                ));
            }
            update
        }
        fn reset(&mut self) {
            self.count = 0;
        }
    }

    fn bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| Bar {
                instrument: "ES".to_string(),
                timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
                    + chrono::Duration::minutes(i as i64),
                open: dec!(100),
                high: dec!(101),
                low: dec!(99),
                close: dec!(100.5),
                volume: Decimal::ONE,
            })
            .collect()
    }

    #[test]
    fn test_signals_painted_and_alerted() {
        let bars = bars(5);
        let mut plugin = OneShot { count: 0 };
        let mut draw = MemoryDrawSink::new();
        let mut alerts = MemoryAlertSink::new();
        let report = run_series(&bars, &mut plugin, &mut draw, &mut alerts);

        assert_eq!(report.bars_processed, 5);
        assert_eq!(report.entries(), 1);
        assert_eq!(draw.len(), 1);
        let cmd = draw.get("one_shot.2.long").unwrap();
        assert_eq!(cmd.kind, MarkerKind::ArrowUp);
        assert_eq!(cmd.price, dec!(99));
        assert_eq!(alerts.alerts.len(), 1);
        assert_eq!(alerts.alerts[0].priority, AlertPriority::High);
    }

    #[test]
    fn test_failing_sinks_do_not_abort_the_run() {
        let bars = bars(5);
        let mut plugin = OneShot { count: 0 };
        let mut draw = FailingSink;
        let mut alerts = FailingSink;
        let report = run_series(&bars, &mut plugin, &mut draw, &mut alerts);
        // The computation completed and the signal was still recorded.
        assert_eq!(report.bars_processed, 5);
        assert_eq!(report.entries(), 1);
    }

    #[test]
    fn test_rerun_repaints_idempotently() {
        let bars = bars(5);
        let mut draw = MemoryDrawSink::new();
        let mut alerts = MemoryAlertSink::new();
        let mut plugin = OneShot { count: 0 };
        run_series(&bars, &mut plugin, &mut draw, &mut alerts);
        plugin.reset();
        run_series(&bars, &mut plugin, &mut draw, &mut alerts);
        // Same tags, same surface: the repaint replaced, not duplicated.
        assert_eq!(draw.len(), 1);
    }
}
