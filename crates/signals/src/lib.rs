pub mod adx_confirm;
pub mod adx_rising;
pub mod dmi_rsi;
pub mod energy_filter;
pub mod ma_cloud;
pub mod mtf_energy;
pub mod regime;
pub mod tdi_cross;
pub mod turtle_breakout;
pub mod ultimate_breakout;
pub mod zero_lag_macd;

pub use adx_confirm::{AdxTrendConfirm, AdxTrendConfirmConfig};
pub use adx_rising::{AdxRising, AdxRisingConfig};
pub use dmi_rsi::{DmiRsiDivergence, DmiRsiDivergenceConfig};
pub use energy_filter::{EnergyLineFilter, EnergyLineFilterConfig};
pub use ma_cloud::{MaCloud, MaCloudConfig};
pub use mtf_energy::{MtfEnergyConfluence, MtfEnergyConfluenceConfig};
pub use regime::RegimeGate;
pub use tdi_cross::{TdiCross, TdiCrossConfig};
pub use turtle_breakout::{TurtleBreakout, TurtleBreakoutConfig};
pub use ultimate_breakout::{UltimateBreakout, UltimateBreakoutConfig};
pub use zero_lag_macd::{ZeroLagMacdCloud, ZeroLagMacdCloudConfig};
