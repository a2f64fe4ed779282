use crate::regime::RegimeGate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trendsig_core::{Bar, BarUpdate, IndicatorPlugin, Regime, Signal, SignalAction};
use trendsig_indicators::ema::Ema;
use trendsig_indicators::sma::Sma;
use trendsig_indicators::Indicator;

/// Dual moving-average cloud with regime coloring.
///
/// Plots both averages plus the cloud top/bottom; the regime is bullish
/// while the fast average rides above the slow one. A crossover exits the
/// opposite side and enters the new one.
pub struct MaCloud {
    id: String,
    config: MaCloudConfig,
    fast_ma: Box<dyn Indicator>,
    slow_ma: Box<dyn Indicator>,
    prev_fast: Option<Decimal>,
    prev_slow: Option<Decimal>,
    gate: RegimeGate,
    count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaCloudConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    /// "sma" or "ema"
    pub ma_type: String,
}

impl Default for MaCloudConfig {
    fn default() -> Self {
        Self {
            fast_period: 10,
            slow_period: 20,
            ma_type: "ema".to_string(),
        }
    }
}

impl std::fmt::Debug for MaCloud {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaCloud")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("prev_fast", &self.prev_fast)
            .field("prev_slow", &self.prev_slow)
            .field("gate", &self.gate)
            .finish()
    }
}

impl MaCloud {
    pub fn new(config: MaCloudConfig) -> Self {
        let fast_ma: Box<dyn Indicator> = match config.ma_type.as_str() {
            "sma" => Box::new(Sma::new(config.fast_period)),
            _ => Box::new(Ema::new(config.fast_period)),
        };
        let slow_ma: Box<dyn Indicator> = match config.ma_type.as_str() {
            "sma" => Box::new(Sma::new(config.slow_period)),
            _ => Box::new(Ema::new(config.slow_period)),
        };
        Self {
            id: format!("ma_cloud_{}_{}", config.fast_period, config.slow_period),
            config,
            fast_ma,
            slow_ma,
            prev_fast: None,
            prev_slow: None,
            gate: RegimeGate::new(),
            count: 0,
        }
    }
}

impl IndicatorPlugin for MaCloud {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "MA Cloud"
    }

    fn warmup_bars(&self) -> usize {
        self.config.slow_period
    }

    fn on_bar(&mut self, bar: &Bar) -> BarUpdate {
        let bar_index = self.count;
        self.count += 1;

        let fast = self.fast_ma.next(bar.close);
        let slow = self.slow_ma.next(bar.close);

        let mut update = BarUpdate::default();

        if let (Some(fast_val), Some(slow_val)) = (fast, slow) {
            update = update
                .plot("fast_ma", fast_val)
                .plot("slow_ma", slow_val)
                .plot("cloud_top", fast_val.max(slow_val))
                .plot("cloud_bottom", fast_val.min(slow_val))
                .plot(
                    "regime",
                    if fast_val > slow_val {
                        Decimal::ONE
                    } else if fast_val < slow_val {
                        dec!(-1)
                    } else {
                        Decimal::ZERO
                    },
                );

            if let (Some(prev_f), Some(prev_s), true) = (
                self.prev_fast,
                self.prev_slow,
                bar_index >= self.config.slow_period,
            ) {
                let bullish_cross = prev_f <= prev_s && fast_val > slow_val;
                let bearish_cross = prev_f >= prev_s && fast_val < slow_val;

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

            self.prev_fast = Some(fast_val);
            self.prev_slow = Some(slow_val);
        }

        update
    }

    fn reset(&mut self) {
        self.fast_ma.reset();
        self.slow_ma.reset();
        self.prev_fast = None;
        self.prev_slow = None;
        self.gate.reset();
        self.count = 0;
    }
}
