use crate::regime::RegimeGate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trendsig_core::{Bar, BarUpdate, IndicatorPlugin, Regime, Signal, SignalAction};
use trendsig_indicators::macd::{MacdOutput, ZeroLagMacd};

/// Zero-lag MACD crossing signals with cloud coloring.
///
/// The MACD line and its signal average form a cloud; the regime is
/// whichever line is on top. A cross of the MACD line through the signal
/// line exits the opposite side and enters the new one. With
/// `zero_lag_factor` 0 this degrades gracefully to a plain MACD.
pub struct ZeroLagMacdCloud {
    id: String,
    config: ZeroLagMacdCloudConfig,
    macd: ZeroLagMacd,
    prev: Option<MacdOutput>,
    gate: RegimeGate,
    count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZeroLagMacdCloudConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
    /// Lookback factor for the zero-lag correction; 0 disables it.
    pub zero_lag_factor: Decimal,
}

impl Default for ZeroLagMacdCloudConfig {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
            zero_lag_factor: dec!(0.5),
        }
    }
}

impl std::fmt::Debug for ZeroLagMacdCloud {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZeroLagMacdCloud")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("gate", &self.gate)
            .finish()
    }
}

impl ZeroLagMacdCloud {
    pub fn new(config: ZeroLagMacdCloudConfig) -> Self {
        let macd = ZeroLagMacd::new(
            config.fast_period,
            config.slow_period,
            config.signal_period,
            config.zero_lag_factor,
        );
        Self {
            id: format!("zl_macd_{}_{}", config.fast_period, config.slow_period),
            config,
            macd,
            prev: None,
            gate: RegimeGate::new(),
            count: 0,
        }
    }
}

impl IndicatorPlugin for ZeroLagMacdCloud {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Zero-Lag MACD Cloud"
    }

    fn warmup_bars(&self) -> usize {
        self.config.slow_period
    }

    fn on_bar(&mut self, bar: &Bar) -> BarUpdate {
        let bar_index = self.count;
        self.count += 1;

        let out = match self.macd.next_output(bar.close) {
            Some(out) => out,
            None => return BarUpdate::default(),
        };

        let mut update = BarUpdate::default()
            .plot("macd", out.macd)
            .plot("signal", out.signal)
            .plot("histogram", out.histogram);

        if let (Some(prev), true) = (self.prev, bar_index >= self.config.slow_period) {
            let bullish_cross = prev.macd <= prev.signal && out.macd > out.signal;
            let bearish_cross = prev.macd >= prev.signal && out.macd < out.signal;

            if bullish_cross && self.gate.regime() == Regime::Short {
                self.gate.exit();
                update.push_signal(Signal::new(
                    &self.id,
                    bar,
                    bar_index,
                    SignalAction::ExitShort,
                    None,
                ));
            } else if bearish_cross && self.gate.regime() == Regime::Long {
                self.gate.exit();
                update.push_signal(Signal::new(
                    &self.id,
                    bar,
                    bar_index,
                    SignalAction::ExitLong,
                    None,
                ));
            }

            match self.gate.update(bullish_cross, bearish_cross) {
                Some(Regime::Long) => update.push_signal(Signal::new(
                    &self.id,
                    bar,
                    bar_index,
                    SignalAction::EnterLong,
                    Some(bar.low),
                )),
                Some(Regime::Short) => update.push_signal(Signal::new(
                    &self.id,
                    bar,
                    bar_index,
                    SignalAction::EnterShort,
                    Some(bar.high),
                )),
                _ => {}
            }
        }
        self.prev = Some(out);

        update
    }

    fn reset(&mut self) {
        use trendsig_indicators::Indicator;
        self.macd.reset();
        self.prev = None;
        self.gate.reset();
        self.count = 0;
    }
}
