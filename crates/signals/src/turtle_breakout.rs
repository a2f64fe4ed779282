use crate::regime::RegimeGate;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trendsig_core::{Bar, BarUpdate, IndicatorPlugin, Regime, Signal, SignalAction};
use trendsig_indicators::turtle::{TurtleChannel, TurtleOutput};

/// Turtle channel breakout signals.
///
/// A bar reaching the previous bar's entry band enters in that direction
/// (upper band first when a wide bar touches both). While in a position,
/// price reaching the previous bar's opposite exit band closes it. One
/// entry per breakout run: consecutive bars riding the band do not
/// re-signal until the breakout condition lapses and re-qualifies.
pub struct TurtleBreakout {
    id: String,
    config: TurtleBreakoutConfig,
    channel: TurtleChannel,
    prev: Option<TurtleOutput>,
    gate: RegimeGate,
    count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurtleBreakoutConfig {
    pub entry_length: usize,
    pub exit_length: usize,
}

impl Default for TurtleBreakoutConfig {
    fn default() -> Self {
        Self {
            entry_length: 20,
            exit_length: 10,
        }
    }
}

impl std::fmt::Debug for TurtleBreakout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurtleBreakout")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("gate", &self.gate)
            .finish()
    }
}

impl TurtleBreakout {
    pub fn new(config: TurtleBreakoutConfig) -> Self {
        let channel = TurtleChannel::new(config.entry_length, config.exit_length);
        Self {
            id: format!(
                "turtle_{}_{}",
                config.entry_length, config.exit_length
            ),
            config,
            channel,
            prev: None,
            gate: RegimeGate::new(),
            count: 0,
        }
    }
}

impl IndicatorPlugin for TurtleBreakout {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Turtle Breakout"
    }

    fn warmup_bars(&self) -> usize {
        self.config.entry_length.max(self.config.exit_length) + 1
    }

    fn on_bar(&mut self, bar: &Bar) -> BarUpdate {
        let bar_index = self.count;
        self.count += 1;

        let out = self.channel.next_bar(bar.high, bar.low, bar.close);

        let mut update = BarUpdate::default()
            .plot("upper", out.upper)
            .plot("lower", out.lower)
            .plot("exit_upper", out.exit_upper)
            .plot("exit_lower", out.exit_lower)
            .plot("trend", out.trend);

        let prev = self.prev.replace(out);
        let warm = bar_index >= self.config.entry_length.max(self.config.exit_length);
        let prev = match (prev, warm) {
            (Some(prev), true) => prev,
            _ => return update,
        };

        // Exit first: a position is closed before any fresh breakout is
        // considered on the same bar.
        if self.gate.in_regime() {
            let (stopped, action) = match self.gate.regime() {
                Regime::Long => (bar.low <= prev.exit_lower, SignalAction::ExitLong),
                Regime::Short => (bar.high >= prev.exit_upper, SignalAction::ExitShort),
                Regime::Flat => (false, SignalAction::ExitLong),
            };
            if stopped {
                self.gate.exit();
                update.push_signal(Signal::new(&self.id, bar, bar_index, action, None));
            }
        }

        let long_cond = bar.high >= prev.upper;
        let short_cond = bar.low <= prev.lower;

        match self.gate.update(long_cond, short_cond) {
            Some(Regime::Long) => update.push_signal(Signal::new(
                &self.id,
                bar,
                bar_index,
                SignalAction::EnterLong,
                Some(bar.high),
            )),
            Some(Regime::Short) => update.push_signal(Signal::new(
                &self.id,
                bar,
                bar_index,
                SignalAction::EnterShort,
                Some(bar.low),
            )),
            _ => {}
        }

        update
    }

    fn reset(&mut self) {
        use trendsig_indicators::Indicator;
        self.channel.reset();
        self.prev = None;
        self.gate.reset();
        self.count = 0;
    }
}
