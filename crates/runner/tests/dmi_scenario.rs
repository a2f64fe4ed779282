//! End-to-end scenario: a steadily rising market fed through the
//! ADX-rising plugin and the standard sink pipeline.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use trendsig_core::{Bar, MarkerKind, SignalAction};
use trendsig_indicators::dmi::Dmi;
use trendsig_runner::{run_series, MemoryAlertSink, MemoryDrawSink};
use trendsig_signals::{AdxRising, AdxRisingConfig};

fn rising_bars(n: i64) -> Vec<Bar> {
    (0..n)
        .map(|i| {
            let base = Decimal::from(100 + i);
            Bar {
                instrument: "ES".to_string(),
                timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
                    + chrono::Duration::minutes(i),
                open: base - dec!(0.5),
                high: base + Decimal::ONE,
                low: base - Decimal::ONE,
                close: base,
                volume: dec!(1000),
            }
        })
        .collect()
}

#[test]
fn rising_market_signals_once_after_warmup() {
    let bars = rising_bars(50);
    let mut plugin = AdxRising::new(AdxRisingConfig {
        period: 14,
        threshold: dec!(20),
    });
    let mut draw = MemoryDrawSink::new();
    let mut alerts = MemoryAlertSink::new();

    let report = run_series(&bars, &mut plugin, &mut draw, &mut alerts);

    assert_eq!(report.bars_processed, 50);
    assert_eq!(report.count(SignalAction::EnterLong), 1);
    assert_eq!(report.count(SignalAction::EnterShort), 0);

    // The guard holds: nothing may fire on or before the period'th bar.
    let entry = report
        .signals
        .iter()
        .find(|s| s.action == SignalAction::EnterLong)
        .unwrap();
    assert!(entry.bar_index > 14);

    // The signal reached the chart and the alert sink.
    let tag = format!("adx_rising_14.{}.long", entry.bar_index);
    let drawn = draw.get(&tag).expect("entry painted");
    assert_eq!(drawn.kind, MarkerKind::ArrowUp);
    assert_eq!(alerts.alerts.len(), 1);
}

#[test]
fn dmi_engine_trends_with_the_market() {
    let bars = rising_bars(50);
    let mut dmi = Dmi::new(14);
    let mut first = None;
    let mut last = None;
    for bar in &bars {
        let out = dmi.next_bar(bar.high, bar.low, bar.close);
        if first.is_none() {
            first = Some(out);
        }
        last = Some(out);
    }

    let first = first.unwrap();
    let last = last.unwrap();

    // Neutral seed, then a climbing trend reading.
    assert_eq!(first.adx, dec!(50));
    assert!(last.adx > dec!(50));
    assert!(last.di_plus > last.di_minus);
    assert!(last.adx <= dec!(100));
}
