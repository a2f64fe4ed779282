use crate::events::BarEvent;
use crate::models::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Indicator Plugin Trait
// ---------------------------------------------------------------------------

/// One named derived-series value at the current bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotPoint {
    pub series: &'static str,
    pub value: Decimal,
}

impl PlotPoint {
    pub fn new(series: &'static str, value: Decimal) -> Self {
        Self { series, value }
    }
}

/// The result of processing one bar: derived-series values plus any signals
/// that fired. Pure data: translating signals into draw/alert calls is the
/// runner's job, which keeps plugins testable without a host.
#[derive(Debug, Clone, Default)]
pub struct BarUpdate {
    pub plots: Vec<PlotPoint>,
    pub signals: Vec<Signal>,
}

impl BarUpdate {
    pub fn plot(mut self, series: &'static str, value: Decimal) -> Self {
        self.plots.push(PlotPoint::new(series, value));
        self
    }

    pub fn plot_opt(mut self, series: &'static str, value: Option<Decimal>) -> Self {
        if let Some(v) = value {
            self.plots.push(PlotPoint::new(series, v));
        }
        self
    }

    pub fn push_signal(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    pub fn series(&self, name: &str) -> Option<Decimal> {
        self.plots
            .iter()
            .find(|p| p.series == name)
            .map(|p| p.value)
    }
}

/// A configured indicator instance: a streaming per-bar computation plus a
/// signal state machine.
///
/// Processing is strictly sequential: one `on_bar` call per bar, in order,
/// and outputs at a bar depend only on that bar, prior bars, and the
/// plugin's own running state. During warm-up a plugin emits neutral or no
/// plot values and must not signal.
pub trait IndicatorPlugin: Send + Sync {
    /// Unique identifier for this configured instance.
    fn id(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Bars required before outputs are meaningful.
    fn warmup_bars(&self) -> usize;

    /// Process the next bar.
    fn on_bar(&mut self, bar: &Bar) -> BarUpdate;

    /// Reset internal state (for re-running over a fresh series).
    fn reset(&mut self);
}

/// An indicator fed by more than one bar series, discriminated by slot.
///
/// Implementations must only touch the addressed slot's sub-state on each
/// event and may combine cached secondary state only on primary events.
pub trait MultiSeriesPlugin: Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn on_event(&mut self, event: &BarEvent) -> BarUpdate;

    fn reset(&mut self);
}

// ---------------------------------------------------------------------------
// Sink Traits
// ---------------------------------------------------------------------------

/// Errors from draw/alert sinks. Callers log these and carry on; a sink
/// failure never interrupts per-bar processing.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Sink closed")]
    Closed,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Sink error: {0}")]
    Other(String),
}

/// A drawing surface that accepts tagged, replace-by-tag draw commands.
pub trait DrawSink: Send {
    fn draw(&mut self, command: DrawCommand) -> Result<(), SinkError>;
}

/// An alert/sound sink. Best-effort.
pub trait AlertSink: Send {
    fn alert(&mut self, alert: AlertCommand) -> Result<(), SinkError>;
}

// ---------------------------------------------------------------------------
// Data Provider Trait
// ---------------------------------------------------------------------------

/// Errors that can occur during data operations.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Data not found: {0}")]
    NotFound(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Provides historical market data.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Load historical bars for an instrument within a date range.
    async fn load_bars(
        &self,
        instrument: &str,
        timeframe: Timeframe,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataError>;

    /// List available instruments.
    async fn available_instruments(&self) -> Result<Vec<String>, DataError>;
}
