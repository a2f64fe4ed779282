use crate::models::Bar;
use serde::{Deserialize, Serialize};

/// Identifies which bar series an event belongs to in a multi-timeframe run.
///
/// `Primary` is the series the plugin plots and signals on; `Secondary(n)`
/// are the coarser confirmation series, numbered from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesSlot {
    Primary,
    Secondary(usize),
}

impl SeriesSlot {
    pub fn is_primary(&self) -> bool {
        matches!(self, SeriesSlot::Primary)
    }
}

/// A bar-close event tagged with the series it belongs to.
///
/// On a shared timestamp the dispatcher delivers secondary-slot events
/// before the primary-slot event, so a plugin combining timeframes reads
/// each secondary's freshest cached state when the primary bar arrives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarEvent {
    pub slot: SeriesSlot,
    pub bar: Bar,
}

impl BarEvent {
    pub fn primary(bar: Bar) -> Self {
        Self {
            slot: SeriesSlot::Primary,
            bar,
        }
    }

    pub fn secondary(index: usize, bar: Bar) -> Self {
        Self {
            slot: SeriesSlot::Secondary(index),
            bar,
        }
    }
}
