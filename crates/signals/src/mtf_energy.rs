use crate::regime::RegimeGate;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trendsig_core::{
    Bar, BarEvent, BarUpdate, MultiSeriesPlugin, Regime, SeriesSlot, Signal, SignalAction,
};
use trendsig_indicators::energy::MarketEnergy;
use trendsig_indicators::Indicator;

/// Multi-timeframe energy confluence.
///
/// One energy engine per series slot. Secondary events only refresh their
/// own engine; all combining happens on primary events, which read each
/// secondary's latest cached output. An entry fires once per agreement
/// regime (every timeframe bullish for a long, every timeframe bearish
/// for a short) and the position exits as soon as the agreement lapses.
pub struct MtfEnergyConfluence {
    id: String,
    config: MtfEnergyConfluenceConfig,
    primary: MarketEnergy,
    secondaries: Vec<MarketEnergy>,
    gate: RegimeGate,
    count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtfEnergyConfluenceConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    /// Number of confirmation timeframes.
    pub secondary_count: usize,
}

impl Default for MtfEnergyConfluenceConfig {
    fn default() -> Self {
        Self {
            fast_period: 5,
            slow_period: 20,
            secondary_count: 1,
        }
    }
}

impl std::fmt::Debug for MtfEnergyConfluence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MtfEnergyConfluence")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("gate", &self.gate)
            .finish()
    }
}

impl MtfEnergyConfluence {
    pub fn new(config: MtfEnergyConfluenceConfig) -> Self {
        let primary = MarketEnergy::new(config.fast_period, config.slow_period);
        let secondaries = (0..config.secondary_count)
            .map(|_| MarketEnergy::new(config.fast_period, config.slow_period))
            .collect();
        Self {
            id: format!(
                "mtf_energy_{}_{}",
                config.fast_period, config.slow_period
            ),
            config,
            primary,
            secondaries,
            gate: RegimeGate::new(),
            count: 0,
        }
    }

    fn all_bullish(&self, primary_bullish: bool) -> bool {
        primary_bullish
            && self
                .secondaries
                .iter()
                .all(|s| s.output().map_or(false, |o| o.is_bullish()))
    }

    fn all_bearish(&self, primary_bearish: bool) -> bool {
        primary_bearish
            && self
                .secondaries
                .iter()
                .all(|s| s.output().map_or(false, |o| o.is_bearish()))
    }
}

impl MultiSeriesPlugin for MtfEnergyConfluence {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "MTF Energy Confluence"
    }

    fn on_event(&mut self, event: &BarEvent) -> BarUpdate {
        match event.slot {
            SeriesSlot::Secondary(index) => {
                // Only the addressed timeframe's sub-state moves here.
                if let Some(engine) = self.secondaries.get_mut(index) {
                    engine.next_close(event.bar.close);
                }
                BarUpdate::default()
            }
            SeriesSlot::Primary => {
                let bar = &event.bar;
                let bar_index = self.count;
                self.count += 1;

                let out = self.primary.next_close(bar.close);
                let mut update = BarUpdate::default()
                    .plot_opt("energy", out.map(|o| o.energy))
                    .plot(
                        "confluence",
                        if self.all_bullish(out.map_or(false, |o| o.is_bullish())) {
                            dec!(1)
                        } else if self.all_bearish(out.map_or(false, |o| o.is_bearish())) {
                            dec!(-1)
                        } else {
                            dec!(0)
                        },
                    );

                if bar_index < self.config.slow_period {
                    return update;
                }

                let long_cond = self.all_bullish(out.map_or(false, |o| o.is_bullish()));
                let short_cond = self.all_bearish(out.map_or(false, |o| o.is_bearish()));

                // Agreement gone: flatten before considering entries.
                if self.gate.in_regime() {
                    let lapsed = match self.gate.regime() {
                        Regime::Long => !long_cond,
                        Regime::Short => !short_cond,
                        Regime::Flat => false,
                    };
                    if lapsed {
                        let action = match self.gate.exit() {
                            Regime::Long => SignalAction::ExitLong,
                            Regime::Short => SignalAction::ExitShort,
                            Regime::Flat => unreachable!("in_regime checked above"),
                        };
                        update.push_signal(Signal::new(&self.id, bar, bar_index, action, None));
                    }
                }

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

                update
            }
        }
    }

    fn reset(&mut self) {
        self.primary.reset();
        for engine in &mut self.secondaries {
            engine.reset();
        }
        self.gate.reset();
        self.count = 0;
    }
}
