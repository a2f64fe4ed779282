use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, warn};
use trendsig_core::{Bar, DataError};

const HEADER: &str = "DateTime,UO_Value,High,Low,Close,Open,\
ReachedOversold,ReachedOverbought,InLongTrend,InShortTrend";

/// One row of oscillator state for the day file.
#[derive(Debug, Clone, Copy)]
pub struct OscillatorLogRow {
    pub value: Decimal,
    pub reached_oversold: bool,
    pub reached_overbought: bool,
    pub in_long_trend: bool,
    pub in_short_trend: bool,
}

/// Best-effort per-day CSV logger for oscillator state.
///
/// Writes one file per calendar day, `UO_Data_<yyyy-MM-dd>.csv`, appending
/// one row per bar whose timestamp falls inside the trading session.
/// Prices and the oscillator value are written to two decimal places and
/// the state flags as literal `true`/`false`. Every failure is reported
/// through `tracing::warn!` and swallowed; logging never disturbs the
/// per-bar computation driving it.
#[derive(Debug)]
pub struct DayFileLogger {
    dir: PathBuf,
    session_start: NaiveTime,
    session_end: NaiveTime,
}

impl DayFileLogger {
    /// Logger with the regular 09:30–16:00 session window.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            session_start: NaiveTime::from_hms_opt(9, 30, 0).expect("valid session start"),
            session_end: NaiveTime::from_hms_opt(16, 0, 0).expect("valid session end"),
        }
    }

    pub fn with_session(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.session_start = start;
        self.session_end = end;
        self
    }

    /// Append one row for `bar`. Out-of-session bars are skipped silently;
    /// I/O failures are logged and swallowed.
    pub fn log_bar(&mut self, bar: &Bar, row: &OscillatorLogRow) {
        if let Err(e) = self.try_log(bar, row) {
            warn!(instrument = %bar.instrument, error = %e, "day-file logging failed");
        }
    }

    fn file_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("UO_Data_{}.csv", date.format("%Y-%m-%d")))
    }

    fn try_log(&mut self, bar: &Bar, row: &OscillatorLogRow) -> Result<(), DataError> {
        let time = bar.timestamp.time();
        if time < self.session_start || time > self.session_end {
            return Ok(());
        }

        let date = bar.timestamp.date_naive();
        let path = self.file_path(date);
        let is_new = !path.exists();

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        if is_new {
            debug!(path = %path.display(), "starting new day file");
            writeln!(file, "{HEADER}")?;
        }
        writeln!(
            file,
            "{},{:.2},{:.2},{:.2},{:.2},{:.2},{},{},{},{}",
            bar.timestamp.format("%Y-%m-%d %H:%M:%S"),
            row.value,
            bar.high,
            bar.low,
            bar.close,
            bar.open,
            row.reached_oversold,
            row.reached_overbought,
            row.in_long_trend,
            row.in_short_trend,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn bar_at(hour: u32, minute: u32) -> Bar {
        Bar {
            instrument: "ES".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap(),
            open: dec!(100),
            high: dec!(101.125),
            low: dec!(99.5),
            close: dec!(100.75),
            volume: dec!(1000),
        }
    }

    fn row() -> OscillatorLogRow {
        OscillatorLogRow {
            value: dec!(42.4242),
            reached_oversold: true,
            reached_overbought: false,
            in_long_trend: false,
            in_short_trend: false,
        }
    }

    #[test]
    fn test_in_session_rows_appended_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = DayFileLogger::new(dir.path());
        logger.log_bar(&bar_at(9, 30), &row());
        logger.log_bar(&bar_at(10, 0), &row());

        let content =
            std::fs::read_to_string(dir.path().join("UO_Data_2024-03-01.csv")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("DateTime,UO_Value"));
        // Two-decimal formatting and literal booleans.
        assert!(lines[1].contains("42.42"));
        assert!(lines[1].contains("101.13") || lines[1].contains("101.12"));
        assert!(lines[1].ends_with("true,false,false,false"));
    }

    #[test]
    fn test_out_of_session_bars_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = DayFileLogger::new(dir.path());
        logger.log_bar(&bar_at(8, 0), &row());
        logger.log_bar(&bar_at(16, 30), &row());
        assert!(!dir.path().join("UO_Data_2024-03-01.csv").exists());
    }

    #[test]
    fn test_unwritable_directory_is_swallowed() {
        let mut logger = DayFileLogger::new("/definitely/not/a/real/dir");
        // Must not panic.
        logger.log_bar(&bar_at(10, 0), &row());
    }
}
