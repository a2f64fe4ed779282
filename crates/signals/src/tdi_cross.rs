use crate::regime::RegimeGate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trendsig_core::{Bar, BarUpdate, IndicatorPlugin, Regime, Signal, SignalAction};
use trendsig_indicators::tdi::{Tdi, TdiOutput};

/// TDI line-cross signals gated by the volatility bands.
///
/// The RSI price line crossing its signal line enters, but only away from
/// the exhausted side of the band envelope: longs below the upper band,
/// shorts above the lower band. The opposite cross exits.
pub struct TdiCross {
    id: String,
    config: TdiCrossConfig,
    tdi: Tdi,
    prev: Option<TdiOutput>,
    gate: RegimeGate,
    count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TdiCrossConfig {
    pub rsi_period: usize,
    pub price_period: usize,
    pub signal_period: usize,
    pub band_period: usize,
    pub band_mult: Decimal,
}

impl Default for TdiCrossConfig {
    fn default() -> Self {
        Self {
            rsi_period: 13,
            price_period: 2,
            signal_period: 7,
            band_period: 34,
            band_mult: dec!(1.6185),
        }
    }
}

impl std::fmt::Debug for TdiCross {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TdiCross")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("gate", &self.gate)
            .finish()
    }
}

impl TdiCross {
    pub fn new(config: TdiCrossConfig) -> Self {
        let tdi = Tdi::new(
            config.rsi_period,
            config.price_period,
            config.signal_period,
            config.band_period,
            config.band_mult,
        );
        Self {
            id: format!("tdi_{}_{}", config.rsi_period, config.band_period),
            config,
            tdi,
            prev: None,
            gate: RegimeGate::new(),
            count: 0,
        }
    }
}

impl IndicatorPlugin for TdiCross {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "TDI Cross"
    }

    fn warmup_bars(&self) -> usize {
        self.config.rsi_period + self.config.band_period
    }

    fn on_bar(&mut self, bar: &Bar) -> BarUpdate {
        let bar_index = self.count;
        self.count += 1;

        let out = match self.tdi.next_close(bar.close) {
            Some(out) => out,
            None => return BarUpdate::default(),
        };

        let mut update = BarUpdate::default()
            .plot("rsi", out.rsi)
            .plot("price_line", out.price)
            .plot("signal_line", out.signal)
            .plot("band_upper", out.band_upper)
            .plot("band_mid", out.band_mid)
            .plot("band_lower", out.band_lower);

        if let (Some(prev), true) = (self.prev, bar_index >= self.warmup_bars()) {
            let bullish_cross = prev.price <= prev.signal && out.price > out.signal;
            let bearish_cross = prev.price >= prev.signal && out.price < out.signal;

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

            let long_cond = bullish_cross && out.price < out.band_upper;
            let short_cond = bearish_cross && out.price > out.band_lower;

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
        self.prev = Some(out);

        update
    }

    fn reset(&mut self) {
        use trendsig_indicators::Indicator;
        self.tdi.reset();
        self.prev = None;
        self.gate.reset();
        self.count = 0;
    }
}
