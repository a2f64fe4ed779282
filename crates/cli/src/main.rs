use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};
use trendsig_core::{DataProvider, IndicatorPlugin, Timeframe};
use trendsig_data::day_log::DayFileLogger;
use trendsig_data::{csv_loader, resample, CsvDataProvider};
use trendsig_runner::{
    interleave, run_multi_series, run_series, TracingAlertSink, TracingDrawSink,
};
use trendsig_signals::*;

#[derive(Parser)]
#[command(name = "trendsig")]
#[command(about = "Run streaming technical-analysis signal engines over historical bars")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one indicator over a CSV bar file and print the signal report
    Run {
        /// Path to CSV data file
        #[arg(short, long)]
        data: PathBuf,

        /// Indicator name (see `trendsig indicators`)
        #[arg(short, long)]
        indicator: String,

        /// TOML file with the indicator's configuration (defaults apply
        /// when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory for per-day oscillator log files (ultimate only)
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Print the report as JSON instead of the text summary
        #[arg(long)]
        json: bool,
    },

    /// Run the multi-timeframe energy confluence over a CSV bar file
    RunMtf {
        /// Path to CSV data file (primary series)
        #[arg(short, long)]
        data: PathBuf,

        /// Secondary timeframe in minutes
        #[arg(short, long, default_value = "5")]
        secondary_minutes: u32,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the report as JSON instead of the text summary
        #[arg(long)]
        json: bool,
    },

    /// List available indicators
    Indicators,

    /// List instruments available in a data directory
    Instruments {
        /// Directory containing per-instrument CSV files
        #[arg(short, long)]
        data_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Run {
            data,
            indicator,
            config,
            log_dir,
            json,
        } => run_indicator(&data, &indicator, config.as_deref(), log_dir, json)?,
        Commands::RunMtf {
            data,
            secondary_minutes,
            config,
            json,
        } => run_mtf(&data, secondary_minutes, config.as_deref(), json)?,
        Commands::Indicators => {
            println!("Available indicators:");
            println!("  adx_rising    - ADX rising with DI direction");
            println!("  adx_confirm   - ADX rising gated by bar close direction");
            println!("  dmi_rsi       - DI crossing with divergence + RSI confirmation");
            println!("  ultimate      - Ultimate Oscillator exhaustion reversals");
            println!("  zl_macd       - Zero-lag MACD cloud crossings");
            println!("  ma_cloud      - Dual moving-average cloud");
            println!("  turtle        - Turtle channel breakout");
            println!("  tdi           - TDI line cross with band gating");
            println!("  energy_filter - Market energy with price filter line");
            println!("  mtf_energy    - Multi-timeframe energy confluence (run-mtf)");
        }
        Commands::Instruments { data_dir } => {
            let provider = CsvDataProvider::new(data_dir);
            let instruments = provider.available_instruments().await?;
            println!("Available instruments:");
            for instrument in instruments {
                println!("  {instrument}");
            }
        }
    }

    Ok(())
}

fn load_config<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&raw)?)
        }
        None => Ok(T::default()),
    }
}

fn build_plugin(
    name: &str,
    config: Option<&Path>,
    log_dir: Option<PathBuf>,
) -> Result<Box<dyn IndicatorPlugin>> {
    let plugin: Box<dyn IndicatorPlugin> = match name {
        "adx_rising" => Box::new(AdxRising::new(load_config::<AdxRisingConfig>(config)?)),
        "adx_confirm" => Box::new(AdxTrendConfirm::new(load_config::<AdxTrendConfirmConfig>(
            config,
        )?)),
        "dmi_rsi" => Box::new(DmiRsiDivergence::new(
            load_config::<DmiRsiDivergenceConfig>(config)?,
        )),
        "ultimate" => {
            let mut plugin =
                UltimateBreakout::new(load_config::<UltimateBreakoutConfig>(config)?);
            if let Some(dir) = log_dir {
                plugin = plugin.with_logger(DayFileLogger::new(dir));
            }
            Box::new(plugin)
        }
        "zl_macd" => Box::new(ZeroLagMacdCloud::new(
            load_config::<ZeroLagMacdCloudConfig>(config)?,
        )),
        "ma_cloud" => Box::new(MaCloud::new(load_config::<MaCloudConfig>(config)?)),
        "turtle" => Box::new(TurtleBreakout::new(load_config::<TurtleBreakoutConfig>(
            config,
        )?)),
        "tdi" => Box::new(TdiCross::new(load_config::<TdiCrossConfig>(config)?)),
        "energy_filter" => Box::new(EnergyLineFilter::new(
            load_config::<EnergyLineFilterConfig>(config)?,
        )),
        other => anyhow::bail!(
            "Unknown indicator '{other}' (see `trendsig indicators` for the list)"
        ),
    };
    Ok(plugin)
}

fn run_indicator(
    data: &Path,
    indicator: &str,
    config: Option<&Path>,
    log_dir: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let bars = csv_loader::load_bars_from_csv(data)?;
    tracing::info!(bars = bars.len(), "loaded historical data");
    if bars.is_empty() {
        anyhow::bail!("No bars loaded from CSV file");
    }

    let mut plugin = build_plugin(indicator, config, log_dir)?;
    let mut draw = TracingDrawSink;
    let mut alerts = TracingAlertSink;

    let report = run_series(&bars, plugin.as_mut(), &mut draw, &mut alerts);
    print_report(&report, json)
}

fn run_mtf(data: &Path, secondary_minutes: u32, config: Option<&Path>, json: bool) -> Result<()> {
    let bars = csv_loader::load_bars_from_csv(data)?;
    tracing::info!(bars = bars.len(), "loaded historical data");
    if bars.is_empty() {
        anyhow::bail!("No bars loaded from CSV file");
    }

    let timeframe = Timeframe::Minute(secondary_minutes);
    let secondary = resample::resample(&bars, timeframe);
    tracing::info!(
        secondary_bars = secondary.len(),
        minutes = secondary_minutes,
        "resampled secondary series"
    );

    let events = interleave(&bars, &[(timeframe, secondary)]);
    let mut plugin =
        MtfEnergyConfluence::new(load_config::<MtfEnergyConfluenceConfig>(config)?);

    let report = run_multi_series(&events, &mut plugin);
    print_report(&report, json)
}

fn print_report(report: &trendsig_runner::RunReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report.summary());
    }
    Ok(())
}
