use crate::regime::RegimeGate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trendsig_core::{Bar, BarUpdate, IndicatorPlugin, Regime, Signal, SignalAction};
use trendsig_indicators::dmi::Dmi;

/// ADX-rising signals gated by bar close direction.
///
/// Same rising-trend machinery as [`crate::adx_rising::AdxRising`], but an
/// entry additionally requires the bar to close in the signal direction,
/// and an opposite-direction close while in a regime forces an exit. The
/// close-direction test is a trend-confirmation heuristic carried over
/// as-is from the indicator this reimplements.
pub struct AdxTrendConfirm {
    id: String,
    config: AdxTrendConfirmConfig,
    dmi: Dmi,
    prev_adx: Option<Decimal>,
    gate: RegimeGate,
    count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdxTrendConfirmConfig {
    pub period: usize,
    pub threshold: Decimal,
}

impl Default for AdxTrendConfirmConfig {
    fn default() -> Self {
        Self {
            period: 14,
            threshold: dec!(20),
        }
    }
}

impl std::fmt::Debug for AdxTrendConfirm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdxTrendConfirm")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("gate", &self.gate)
            .finish()
    }
}

impl AdxTrendConfirm {
    pub fn new(config: AdxTrendConfirmConfig) -> Self {
        let dmi = Dmi::new(config.period);
        Self {
            id: format!("adx_confirm_{}", config.period),
            config,
            dmi,
            prev_adx: None,
            gate: RegimeGate::new(),
            count: 0,
        }
    }
}

impl IndicatorPlugin for AdxTrendConfirm {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "ADX Trend Confirm"
    }

    fn warmup_bars(&self) -> usize {
        self.config.period + 1
    }

    fn on_bar(&mut self, bar: &Bar) -> BarUpdate {
        let bar_index = self.count;
        self.count += 1;

        let out = self.dmi.next_bar(bar.high, bar.low, bar.close);
        let rising = match self.prev_adx {
            Some(prev) => out.adx > prev,
            None => false,
        };
        self.prev_adx = Some(out.adx);

        let mut update = BarUpdate::default()
            .plot("di_plus", out.di_plus)
            .plot("di_minus", out.di_minus)
            .plot("adx", out.adx);

        if bar_index <= self.config.period {
            return update;
        }

        // An opposite-direction close knocks the machine flat before any
        // new entry is considered.
        if self.gate.in_regime() {
            let reversal = match self.gate.regime() {
                Regime::Long => bar.is_down_close(),
                Regime::Short => bar.is_up_close(),
                Regime::Flat => false,
            };
            if reversal {
                let action = match self.gate.exit() {
                    Regime::Long => SignalAction::ExitLong,
                    Regime::Short => SignalAction::ExitShort,
                    Regime::Flat => unreachable!(),
                };
                update.push_signal(Signal::new(&self.id, bar, bar_index, action, None));
            }
        }

        let strong = out.adx > self.config.threshold;
        let long_cond =
            rising && strong && out.di_plus > out.di_minus && bar.is_up_close();
        let short_cond =
            rising && strong && out.di_minus > out.di_plus && bar.is_down_close();

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

    fn reset(&mut self) {
        use trendsig_indicators::Indicator;
        self.dmi.reset();
        self.prev_adx = None;
        self.gate.reset();
        self.count = 0;
    }
}
