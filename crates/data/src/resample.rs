use chrono::{DateTime, TimeZone, Utc};
use trendsig_core::{Bar, Timeframe};

/// Aggregate bars into coarser buckets of `timeframe`.
///
/// Bucket boundaries are aligned to the epoch, the bucket bar is stamped
/// with the bucket start, and standard OHLCV aggregation applies: open of
/// the first bar, max high, min low, close of the last bar, summed volume.
/// Input is assumed time-sorted (the CSV loader guarantees it); a partial
/// trailing bucket is emitted as-is.
pub fn resample(bars: &[Bar], timeframe: Timeframe) -> Vec<Bar> {
    let bucket_secs = timeframe.seconds();
    let mut out: Vec<Bar> = Vec::new();
    let mut current_bucket: Option<(DateTime<Utc>, Bar)> = None;

    for bar in bars {
        let bucket_start = bucket_start(bar.timestamp, bucket_secs);

        match &mut current_bucket {
            Some((start, agg)) if *start == bucket_start => {
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
            }
            _ => {
                if let Some((_, done)) = current_bucket.take() {
                    out.push(done);
                }
                let mut agg = bar.clone();
                agg.timestamp = bucket_start;
                current_bucket = Some((bucket_start, agg));
            }
        }
    }

    if let Some((_, done)) = current_bucket {
        out.push(done);
    }
    out
}

fn bucket_start(timestamp: DateTime<Utc>, bucket_secs: i64) -> DateTime<Utc> {
    let secs = timestamp.timestamp();
    let aligned = secs - secs.rem_euclid(bucket_secs);
    Utc.timestamp_opt(aligned, 0).single().unwrap_or(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn bar(minute: u32, open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Bar {
        Bar {
            instrument: "ES".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, minute, 0).unwrap(),
            open,
            high,
            low,
            close,
            volume: dec!(10),
        }
    }

    #[test]
    fn test_five_minute_buckets() {
        let bars = vec![
            bar(30, dec!(100), dec!(101), dec!(99), dec!(100.5)),
            bar(31, dec!(100.5), dec!(103), dec!(100), dec!(102)),
            bar(34, dec!(102), dec!(102.5), dec!(101), dec!(101.5)),
            bar(35, dec!(101.5), dec!(104), dec!(101), dec!(103)),
        ];
        let out = resample(&bars, Timeframe::Minute(5));
        assert_eq!(out.len(), 2);

        let first = &out[0];
        assert_eq!(
            first.timestamp,
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
        );
        assert_eq!(first.open, dec!(100));
        assert_eq!(first.high, dec!(103));
        assert_eq!(first.low, dec!(99));
        assert_eq!(first.close, dec!(101.5));
        assert_eq!(first.volume, dec!(30));

        // Partial trailing bucket still comes out.
        assert_eq!(out[1].open, dec!(101.5));
        assert_eq!(out[1].close, dec!(103));
    }

    #[test]
    fn test_empty_input() {
        assert!(resample(&[], Timeframe::Minute(5)).is_empty());
    }
}
