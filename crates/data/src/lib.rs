pub mod csv_loader;
pub mod day_log;
pub mod resample;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use trendsig_core::{Bar, DataError, DataProvider, Timeframe};

/// A CSV-file-based data provider. Bars for instrument `X` live in
/// `<directory>/X.csv`; the requested timeframe is synthesized with the
/// resampler when it is coarser than the stored bars.
pub struct CsvDataProvider {
    pub directory: std::path::PathBuf,
}

impl CsvDataProvider {
    pub fn new(directory: impl Into<std::path::PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

#[async_trait]
impl DataProvider for CsvDataProvider {
    async fn load_bars(
        &self,
        instrument: &str,
        timeframe: Timeframe,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataError> {
        let file_path = self.directory.join(format!("{}.csv", instrument));
        if !file_path.exists() {
            return Err(DataError::NotFound(format!(
                "CSV file not found: {}",
                file_path.display()
            )));
        }
        let bars = csv_loader::load_bars_from_csv(&file_path)?;
        let filtered: Vec<Bar> = bars
            .into_iter()
            .filter(|b| b.timestamp >= start && b.timestamp <= end)
            .collect();
        if matches!(timeframe, Timeframe::Minute(1)) {
            Ok(filtered)
        } else {
            Ok(resample::resample(&filtered, timeframe))
        }
    }

    async fn available_instruments(&self) -> Result<Vec<String>, DataError> {
        let mut instruments = Vec::new();
        let entries = std::fs::read_dir(&self.directory).map_err(DataError::IoError)?;
        for entry in entries {
            let entry = entry.map_err(DataError::IoError)?;
            let path = entry.path();
            if path.extension().map(|e| e == "csv").unwrap_or(false) {
                if let Some(stem) = path.file_stem() {
                    instruments.push(stem.to_string_lossy().to_string());
                }
            }
        }
        instruments.sort();
        Ok(instruments)
    }
}
