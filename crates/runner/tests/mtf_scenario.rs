//! End-to-end multi-timeframe scenario: minute bars resampled to a
//! five-minute confirmation series, interleaved, and fed through the
//! energy confluence plugin.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use trendsig_core::{Bar, SignalAction, Timeframe};
use trendsig_data::resample::resample;
use trendsig_runner::{interleave, run_multi_series};
use trendsig_signals::{MtfEnergyConfluence, MtfEnergyConfluenceConfig};

fn minute_bars(n: i64) -> Vec<Bar> {
    (0..n)
        .map(|i| {
            let close = Decimal::from(100 + i);
            Bar {
                instrument: "NQ".to_string(),
                timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
                    + chrono::Duration::minutes(i),
                open: close - dec!(0.25),
                high: close + dec!(0.5),
                low: close - dec!(0.5),
                close,
                volume: dec!(100),
            }
        })
        .collect()
}

#[test]
fn confluent_uptrend_signals_once_across_timeframes() {
    let primary = minute_bars(90);
    let timeframe = Timeframe::Minute(5);
    let secondary = resample(&primary, timeframe);
    assert_eq!(secondary.len(), 18);

    let events = interleave(&primary, &[(timeframe, secondary)]);
    let mut plugin = MtfEnergyConfluence::new(MtfEnergyConfluenceConfig {
        fast_period: 3,
        slow_period: 8,
        secondary_count: 1,
    });

    let report = run_multi_series(&events, &mut plugin);

    assert_eq!(report.bars_processed, 90);
    // Both timeframes agree bullish for the whole run once warmed up:
    // exactly one confluence entry, no exits.
    assert_eq!(report.count(SignalAction::EnterLong), 1);
    assert_eq!(report.count(SignalAction::EnterShort), 0);
    assert_eq!(report.count(SignalAction::ExitLong), 0);
}
