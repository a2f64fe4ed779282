use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trendsig_core::{Bar, BarUpdate, BarWindow, IndicatorPlugin, Regime, Signal, SignalAction};
use trendsig_indicators::dmi::Dmi;
use trendsig_indicators::rsi::Rsi;
use trendsig_indicators::sma::Sma;
use trendsig_indicators::Indicator;

/// DI-crossing signals confirmed by divergence growth and RSI.
///
/// A DI crossing arms a pending setup. For up to `lookback_bars` bars the
/// plugin watches how far both DI lines have diverged from their values at
/// the crossing; once the combined divergence clears the threshold while
/// RSI sits on the right side of its signal average, one signal fires and
/// the setup is spent. If confirmation never arrives inside the window the
/// setup expires silently. Only a fresh crossing arms the next setup.
pub struct DmiRsiDivergence {
    id: String,
    config: DmiRsiDivergenceConfig,
    dmi: Dmi,
    rsi: Rsi,
    rsi_signal: Sma,
    prev_di_plus: Option<Decimal>,
    prev_di_minus: Option<Decimal>,
    pending: Option<PendingCross>,
    window: BarWindow,
}

#[derive(Debug, Clone, Copy)]
struct PendingCross {
    direction: Regime,
    bar_index: usize,
    di_plus_at: Decimal,
    di_minus_at: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DmiRsiDivergenceConfig {
    pub period: usize,
    pub rsi_period: usize,
    pub rsi_signal_period: usize,
    /// Combined DI divergence (points) required to confirm a crossing.
    pub divergence: Decimal,
    /// Bars after a crossing in which confirmation may still arrive.
    pub lookback_bars: usize,
}

impl Default for DmiRsiDivergenceConfig {
    fn default() -> Self {
        Self {
            period: 14,
            rsi_period: 14,
            rsi_signal_period: 9,
            divergence: dec!(10),
            lookback_bars: 15,
        }
    }
}

impl std::fmt::Debug for DmiRsiDivergence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DmiRsiDivergence")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("pending", &self.pending)
            .finish()
    }
}

impl DmiRsiDivergence {
    pub fn new(config: DmiRsiDivergenceConfig) -> Self {
        let dmi = Dmi::new(config.period);
        let rsi = Rsi::new(config.rsi_period);
        let rsi_signal = Sma::new(config.rsi_signal_period);
        // Deep enough to look back to the crossing bar of any live setup.
        let window = BarWindow::new(config.lookback_bars + 2);
        Self {
            id: format!("dmi_rsi_{}_{}", config.period, config.rsi_period),
            config,
            dmi,
            rsi,
            rsi_signal,
            prev_di_plus: None,
            prev_di_minus: None,
            pending: None,
            window,
        }
    }
}

impl IndicatorPlugin for DmiRsiDivergence {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "DMI/RSI Divergence"
    }

    fn warmup_bars(&self) -> usize {
        self.config.period.max(self.config.rsi_period + 1)
    }

    fn on_bar(&mut self, bar: &Bar) -> BarUpdate {
        self.window.push(bar.clone());
        let bar_index = self.window.current_index().expect("bar just pushed");

        let out = self.dmi.next_bar(bar.high, bar.low, bar.close);
        let rsi = self.rsi.next(bar.close);
        let rsi_signal = rsi.and_then(|r| self.rsi_signal.next(r));

        let mut update = BarUpdate::default()
            .plot("di_plus", out.di_plus)
            .plot("di_minus", out.di_minus)
            .plot("adx", out.adx)
            .plot_opt("rsi", rsi)
            .plot_opt("rsi_signal", rsi_signal);

        // Crossing detection needs a prior bar and a warmed-up engine.
        if let (Some(pp), Some(pm), true) = (
            self.prev_di_plus,
            self.prev_di_minus,
            bar_index > self.config.period,
        ) {
            if pp <= pm && out.di_plus > out.di_minus {
                self.pending = Some(PendingCross {
                    direction: Regime::Long,
                    bar_index,
                    di_plus_at: out.di_plus,
                    di_minus_at: out.di_minus,
                });
            } else if pp >= pm && out.di_plus < out.di_minus {
                self.pending = Some(PendingCross {
                    direction: Regime::Short,
                    bar_index,
                    di_plus_at: out.di_plus,
                    di_minus_at: out.di_minus,
                });
            }
        }
        self.prev_di_plus = Some(out.di_plus);
        self.prev_di_minus = Some(out.di_minus);

        if let Some(pending) = self.pending {
            if bar_index - pending.bar_index > self.config.lookback_bars {
                // Confirmation window closed without a signal.
                self.pending = None;
            } else if let (Some(r), Some(rs)) = (rsi, rsi_signal) {
                let (spread, confirmed) = match pending.direction {
                    Regime::Long => (
                        (out.di_plus - pending.di_plus_at)
                            + (pending.di_minus_at - out.di_minus),
                        r > rs,
                    ),
                    Regime::Short => (
                        (out.di_minus - pending.di_minus_at)
                            + (pending.di_plus_at - out.di_plus),
                        r < rs,
                    ),
                    Regime::Flat => (Decimal::ZERO, false),
                };
                if spread > self.config.divergence && confirmed {
                    let action = match pending.direction {
                        Regime::Long => SignalAction::EnterLong,
                        _ => SignalAction::EnterShort,
                    };
                    let price = match pending.direction {
                        Regime::Long => bar.low,
                        _ => bar.high,
                    };
                    let bars_since = bar_index - pending.bar_index;
                    let note = match self.window.time(bars_since) {
                        Some(crossed_at) => format!(
                            "di spread {spread:.2}, cross {bars_since} bars ago at {crossed_at}"
                        ),
                        None => format!("di spread {spread:.2}"),
                    };
                    update.push_signal(
                        Signal::new(&self.id, bar, bar_index, action, Some(price))
                            .with_note(note),
                    );
                    self.pending = None;
                }
            }
        }

        update
    }

    fn reset(&mut self) {
        self.dmi.reset();
        self.rsi.reset();
        self.rsi_signal.reset();
        self.prev_di_plus = None;
        self.prev_di_minus = None;
        self.pending = None;
        self.window = BarWindow::new(self.config.lookback_bars + 2);
    }
}
