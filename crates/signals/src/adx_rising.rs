use crate::regime::RegimeGate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trendsig_core::{Bar, BarUpdate, IndicatorPlugin, Regime, Signal, SignalAction};
use trendsig_indicators::dmi::Dmi;

/// ADX-rising momentum signals.
///
/// Goes long while ADX is rising above the strength threshold with DI+
/// leading, short with DI− leading. One signal per rising run; the gate
/// re-arms when ADX stops rising, and the machine drops back to flat when
/// ADX sinks below the threshold.
pub struct AdxRising {
    id: String,
    config: AdxRisingConfig,
    dmi: Dmi,
    prev_adx: Option<Decimal>,
    gate: RegimeGate,
    count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdxRisingConfig {
    pub period: usize,
    /// Minimum ADX for a trend to count as established.
    pub threshold: Decimal,
}

impl Default for AdxRisingConfig {
    fn default() -> Self {
        Self {
            period: 14,
            threshold: dec!(20),
        }
    }
}

impl std::fmt::Debug for AdxRising {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdxRising")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("prev_adx", &self.prev_adx)
            .field("gate", &self.gate)
            .finish()
    }
}

impl AdxRising {
    pub fn new(config: AdxRisingConfig) -> Self {
        let dmi = Dmi::new(config.period);
        Self {
            id: format!("adx_rising_{}", config.period),
            config,
            dmi,
            prev_adx: None,
            gate: RegimeGate::new(),
            count: 0,
        }
    }
}

impl IndicatorPlugin for AdxRising {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "ADX Rising"
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

        // No signal until a full period has been seen.
        if bar_index <= self.config.period {
            return update;
        }

        let strong = out.adx > self.config.threshold;
        let long_cond = rising && strong && out.di_plus > out.di_minus;
        let short_cond = rising && strong && out.di_minus > out.di_plus;

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

        // Trend strength gone: flatten the machine.
        if out.adx < self.config.threshold && self.gate.in_regime() {
            let action = match self.gate.exit() {
                Regime::Long => SignalAction::ExitLong,
                Regime::Short => SignalAction::ExitShort,
                Regime::Flat => unreachable!("in_regime checked above"),
            };
            update.push_signal(Signal::new(&self.id, bar, bar_index, action, None));
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bar(i: i64, open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Bar {
        Bar {
            instrument: "ES".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
                + chrono::Duration::minutes(i),
            open,
            high,
            low,
            close,
            volume: dec!(1000),
        }
    }

    fn rising_bar(i: i64) -> Bar {
        let base = Decimal::from(100 + i);
        bar(i, base - dec!(0.5), base + Decimal::ONE, base - Decimal::ONE, base)
    }

    #[test]
    fn test_no_signal_during_warmup() {
        let mut plugin = AdxRising::new(AdxRisingConfig {
            period: 14,
            threshold: dec!(20),
        });
        for i in 0..=14 {
            let update = plugin.on_bar(&rising_bar(i));
            assert!(update.signals.is_empty(), "signal during warm-up at bar {i}");
        }
    }

    #[test]
    fn test_single_long_signal_in_persistent_uptrend() {
        let mut plugin = AdxRising::new(AdxRisingConfig::default());
        let mut entries = 0;
        for i in 0..50 {
            let update = plugin.on_bar(&rising_bar(i));
            entries += update
                .signals
                .iter()
                .filter(|s| s.action == SignalAction::EnterLong)
                .count();
        }
        // A monotone uptrend is one continuous rising regime.
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_plots_always_present() {
        let mut plugin = AdxRising::new(AdxRisingConfig::default());
        let update = plugin.on_bar(&rising_bar(0));
        assert!(update.series("adx").is_some());
        assert!(update.series("di_plus").is_some());
        assert!(update.series("di_minus").is_some());
    }
}
