use crate::regime::RegimeGate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trendsig_core::{Bar, BarUpdate, IndicatorPlugin, Regime, Signal, SignalAction};
use trendsig_indicators::ema::Ema;
use trendsig_indicators::energy::MarketEnergy;
use trendsig_indicators::Indicator;

/// Market-energy signals filtered by a price baseline.
///
/// Longs require bullish energy (positive and rising) with price above the
/// filter line; shorts mirror. One signal per energy regime; the gate
/// re-arms when the energy condition lapses. Price crossing back through
/// the filter line against the position exits it.
pub struct EnergyLineFilter {
    id: String,
    config: EnergyLineFilterConfig,
    energy: MarketEnergy,
    filter: Ema,
    prev_close: Option<Decimal>,
    prev_filter: Option<Decimal>,
    gate: RegimeGate,
    count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyLineFilterConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    pub filter_period: usize,
}

impl Default for EnergyLineFilterConfig {
    fn default() -> Self {
        Self {
            fast_period: 5,
            slow_period: 20,
            filter_period: 50,
        }
    }
}

impl std::fmt::Debug for EnergyLineFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnergyLineFilter")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("gate", &self.gate)
            .finish()
    }
}

impl EnergyLineFilter {
    pub fn new(config: EnergyLineFilterConfig) -> Self {
        let energy = MarketEnergy::new(config.fast_period, config.slow_period);
        let filter = Ema::new(config.filter_period);
        Self {
            id: format!(
                "energy_filter_{}_{}_{}",
                config.fast_period, config.slow_period, config.filter_period
            ),
            config,
            energy,
            filter,
            prev_close: None,
            prev_filter: None,
            gate: RegimeGate::new(),
            count: 0,
        }
    }
}

impl IndicatorPlugin for EnergyLineFilter {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Energy Line Filter"
    }

    fn warmup_bars(&self) -> usize {
        self.config.slow_period.max(self.config.filter_period)
    }

    fn on_bar(&mut self, bar: &Bar) -> BarUpdate {
        let bar_index = self.count;
        self.count += 1;

        let energy = self.energy.next_close(bar.close);
        let filter = self.filter.next(bar.close);

        let mut update = BarUpdate::default()
            .plot_opt("energy", energy.map(|e| e.energy))
            .plot_opt("filter", filter);

        let (energy, filter) = match (energy, filter) {
            (Some(e), Some(f)) => (e, f),
            _ => return update,
        };

        if bar_index >= self.warmup_bars() {
            // Price falling back through the filter line ends the regime.
            if self.gate.in_regime() {
                let crossed_against = match (self.gate.regime(), self.prev_close, self.prev_filter)
                {
                    (Regime::Long, Some(pc), Some(pf)) => pc >= pf && bar.close < filter,
                    (Regime::Short, Some(pc), Some(pf)) => pc <= pf && bar.close > filter,
                    _ => false,
                };
                if crossed_against {
                    let action = match self.gate.exit() {
                        Regime::Long => SignalAction::ExitLong,
                        Regime::Short => SignalAction::ExitShort,
                        Regime::Flat => unreachable!("in_regime checked above"),
                    };
                    update.push_signal(Signal::new(&self.id, bar, bar_index, action, None));
                }
            }

            let long_cond = energy.is_bullish() && bar.close > filter;
            let short_cond = energy.is_bearish() && bar.close < filter;

            match self.gate.update(long_cond, short_cond) {
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

        self.prev_close = Some(bar.close);
        self.prev_filter = Some(filter);
        update
    }

    fn reset(&mut self) {
        self.energy.reset();
        self.filter.reset();
        self.prev_close = None;
        self.prev_filter = None;
        self.gate.reset();
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bar(i: i64, close: Decimal) -> Bar {
        Bar {
            instrument: "YM".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
                + chrono::Duration::minutes(i),
            open: close,
            high: close + Decimal::ONE,
            low: close - Decimal::ONE,
            close,
            volume: dec!(10),
        }
    }

    fn config() -> EnergyLineFilterConfig {
        EnergyLineFilterConfig {
            fast_period: 3,
            slow_period: 8,
            filter_period: 10,
        }
    }

    #[test]
    fn test_uptrend_signals_long_once() {
        let mut plugin = EnergyLineFilter::new(config());
        let mut entries = 0;
        for i in 0..40i64 {
            let update = plugin.on_bar(&bar(i, Decimal::from(100 + i)));
            entries += update
                .signals
                .iter()
                .filter(|s| s.action == SignalAction::EnterLong)
                .count();
        }
        // Energy stays bullish through the whole rally: one regime, one
        // signal.
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_collapse_through_filter_exits() {
        let mut plugin = EnergyLineFilter::new(config());
        for i in 0..40i64 {
            plugin.on_bar(&bar(i, Decimal::from(100 + i)));
        }
        // Crash far below the filter line in one bar.
        let update = plugin.on_bar(&bar(40, dec!(60)));
        assert!(update
            .signals
            .iter()
            .any(|s| s.action == SignalAction::ExitLong));
    }
}
