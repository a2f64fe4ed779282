use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trendsig_core::{Bar, BarUpdate, IndicatorPlugin, Signal, SignalAction};
use trendsig_data::day_log::{DayFileLogger, OscillatorLogRow};
use trendsig_indicators::ultimate::UltimateOscillator;
use trendsig_indicators::Indicator;

/// Ultimate Oscillator exhaustion-reversal signals.
///
/// Dipping to the oversold level arms a long latch; the long fires on the
/// strict cross back above that level and the latch is spent until the
/// oscillator dips again. Overbought mirrors for shorts. While in a trend,
/// an opposite-direction close with the oscillator back across the midline
/// exits (the close-direction test is a trend heuristic carried over
/// as-is from the indicator this reimplements).
///
/// With a logger attached, every in-session bar is appended to the per-day
/// CSV with the oscillator value and latch/trend flags.
pub struct UltimateBreakout {
    id: String,
    config: UltimateBreakoutConfig,
    uo: UltimateOscillator,
    prev_uo: Option<Decimal>,
    reached_oversold: bool,
    reached_overbought: bool,
    in_long_trend: bool,
    in_short_trend: bool,
    logger: Option<DayFileLogger>,
    count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UltimateBreakoutConfig {
    pub fast: usize,
    pub intermediate: usize,
    pub slow: usize,
    pub oversold: Decimal,
    pub overbought: Decimal,
}

impl Default for UltimateBreakoutConfig {
    fn default() -> Self {
        Self {
            fast: 7,
            intermediate: 14,
            slow: 28,
            oversold: dec!(30),
            overbought: dec!(70),
        }
    }
}

impl std::fmt::Debug for UltimateBreakout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UltimateBreakout")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("reached_oversold", &self.reached_oversold)
            .field("reached_overbought", &self.reached_overbought)
            .field("in_long_trend", &self.in_long_trend)
            .field("in_short_trend", &self.in_short_trend)
            .finish()
    }
}

impl UltimateBreakout {
    pub fn new(config: UltimateBreakoutConfig) -> Self {
        let uo = UltimateOscillator::new(config.fast, config.intermediate, config.slow);
        Self {
            id: format!("ultimate_{}_{}_{}", config.fast, config.intermediate, config.slow),
            config,
            uo,
            prev_uo: None,
            reached_oversold: false,
            reached_overbought: false,
            in_long_trend: false,
            in_short_trend: false,
            logger: None,
            count: 0,
        }
    }

    /// Attach a per-day CSV logger for bar-by-bar oscillator state.
    pub fn with_logger(mut self, logger: DayFileLogger) -> Self {
        self.logger = Some(logger);
        self
    }
}

impl IndicatorPlugin for UltimateBreakout {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Ultimate Breakout"
    }

    fn warmup_bars(&self) -> usize {
        self.config.slow
    }

    fn on_bar(&mut self, bar: &Bar) -> BarUpdate {
        let bar_index = self.count;
        self.count += 1;

        let uo = self.uo.next_bar(bar.high, bar.low, bar.close);
        let prev_uo = self.prev_uo.replace(uo);

        let mut update = BarUpdate::default().plot("uo", uo);

        if bar_index + 1 >= self.config.slow {
            if uo <= self.config.oversold {
                self.reached_oversold = true;
            }
            if uo >= self.config.overbought {
                self.reached_overbought = true;
            }

            if let Some(prev) = prev_uo {
                let crossed_up = prev <= self.config.oversold && uo > self.config.oversold;
                let crossed_down = prev >= self.config.overbought && uo < self.config.overbought;

                if self.reached_oversold && crossed_up && !self.in_long_trend {
                    self.in_long_trend = true;
                    self.in_short_trend = false;
                    self.reached_oversold = false;
                    update.push_signal(Signal::new(
                        &self.id,
                        bar,
                        bar_index,
                        SignalAction::EnterLong,
                        Some(bar.low),
                    ));
                } else if self.reached_overbought && crossed_down && !self.in_short_trend {
                    self.in_short_trend = true;
                    self.in_long_trend = false;
                    self.reached_overbought = false;
                    update.push_signal(Signal::new(
                        &self.id,
                        bar,
                        bar_index,
                        SignalAction::EnterShort,
                        Some(bar.high),
                    ));
                }
            }

            // Trend exits on an opposite close once momentum has crossed
            // back through the midline.
            if self.in_long_trend && bar.is_down_close() && uo < dec!(50) {
                self.in_long_trend = false;
                update.push_signal(Signal::new(
                    &self.id,
                    bar,
                    bar_index,
                    SignalAction::ExitLong,
                    None,
                ));
            } else if self.in_short_trend && bar.is_up_close() && uo > dec!(50) {
                self.in_short_trend = false;
                update.push_signal(Signal::new(
                    &self.id,
                    bar,
                    bar_index,
                    SignalAction::ExitShort,
                    None,
                ));
            }
        }

        if let Some(logger) = &mut self.logger {
            logger.log_bar(
                bar,
                &OscillatorLogRow {
                    value: uo,
                    reached_oversold: self.reached_oversold,
                    reached_overbought: self.reached_overbought,
                    in_long_trend: self.in_long_trend,
                    in_short_trend: self.in_short_trend,
                },
            );
        }

        update
    }

    fn reset(&mut self) {
        self.uo.reset();
        self.prev_uo = None;
        self.reached_oversold = false;
        self.reached_overbought = false;
        self.in_long_trend = false;
        self.in_short_trend = false;
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
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
                + chrono::Duration::minutes(i),
            open,
            high,
            low,
            close,
            volume: dec!(100),
        }
    }

    fn config() -> UltimateBreakoutConfig {
        UltimateBreakoutConfig {
            fast: 2,
            intermediate: 3,
            slow: 4,
            oversold: dec!(30),
            overbought: dec!(70),
        }
    }

    /// Bars that close hard at their lows (heavy selling pressure).
    fn weak_bar(i: i64, base: Decimal) -> Bar {
        bar(i, base + dec!(0.9), base + Decimal::ONE, base, base + dec!(0.05))
    }

    /// Bars that close hard at their highs (heavy buying pressure).
    fn strong_bar(i: i64, base: Decimal) -> Bar {
        bar(i, base + dec!(0.1), base + Decimal::ONE, base, base + dec!(0.95))
    }

    #[test]
    fn test_oversold_latch_then_cross_fires_exactly_one_long() {
        let mut plugin = UltimateBreakout::new(config());
        let mut entries = 0;
        // Sell-off: UO dives under 30 and arms the latch.
        for i in 0..8 {
            let update = plugin.on_bar(&weak_bar(i, Decimal::from(110 - i)));
            entries += update.signals.iter().filter(|s| s.action.is_entry()).count();
        }
        assert_eq!(entries, 0);
        // Recovery: UO crosses back above 30, fires once, and stays quiet
        // while the trend persists.
        for i in 8..20 {
            let update = plugin.on_bar(&strong_bar(i, Decimal::from(94 + i)));
            entries += update
                .signals
                .iter()
                .filter(|s| s.action == SignalAction::EnterLong)
                .count();
        }
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_no_long_without_prior_oversold_dip() {
        let mut plugin = UltimateBreakout::new(config());
        // Straight rally from neutral: the latch never arms, so the
        // cross above 30 never happens from below and nothing fires.
        let mut entries = 0;
        for i in 0..20 {
            let update = plugin.on_bar(&strong_bar(i, Decimal::from(100 + i)));
            entries += update.signals.iter().filter(|s| s.action.is_entry()).count();
        }
        assert_eq!(entries, 0);
    }
}
