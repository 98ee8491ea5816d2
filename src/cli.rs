//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_export::CsvExportSink;
use crate::adapters::fallback_adapter::FallbackDataPort;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::message_report::MessageSink;
use crate::adapters::universe_adapter::{ConfiguredSymbols, ProviderSymbols, SymbolListFile};
use crate::domain::config::{IndicatorSettings, ScanConfig};
use crate::domain::config_validation::validate_scan_config;
use crate::domain::error::ScanError;
use crate::domain::scan::{run_scan, ScanOptions};
use crate::domain::universe::{shape_universe, Universe};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::result_sink::ResultSink;
use crate::ports::symbol_source::SymbolSource;

#[derive(Parser, Debug)]
#[command(name = "breakscan", about = "Daily equity breakout screener")]
pub struct Cli {
    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan the universe and deliver ranked breakout signals
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory of <SYMBOL>.csv bar files
        #[arg(long)]
        data: Option<PathBuf>,
        /// Comma-separated symbol list
        #[arg(long)]
        codes: Option<String>,
        #[arg(long)]
        concurrency: Option<usize>,
        /// CSV export path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a scan configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data: Option<PathBuf>,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ScanOverrides {
    pub data: Option<PathBuf>,
    pub codes: Option<String>,
    pub concurrency: Option<usize>,
    pub output: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);

    match cli.command {
        Command::Scan {
            config,
            data,
            codes,
            concurrency,
            output,
        } => run_scan_command(
            &config,
            &ScanOverrides {
                data,
                codes,
                concurrency,
                output,
            },
        ),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config, data } => run_list_symbols(config.as_ref(), data),
    }
}

/// Log to stderr so stdout stays free for the scan message.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // a subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn get_usize(
    adapter: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, ScanError> {
    let value = adapter.get_int(section, key, default as i64)?;
    usize::try_from(value)
        .map_err(|_| ScanError::invalid(section, key, format!("{key} must not be negative")))
}

fn get_optional_usize(
    adapter: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<usize>, ScanError> {
    adapter
        .get_string(section, key)
        .map(|raw| {
            raw.parse::<usize>().map_err(|_| {
                ScanError::invalid(section, key, format!("{key} must be a non-negative integer"))
            })
        })
        .transpose()
}

fn get_optional_secs(
    adapter: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, ScanError> {
    adapter
        .get_string(section, key)
        .map(|raw| match raw.parse::<f64>() {
            Ok(secs) if secs.is_finite() && secs >= 0.0 => Ok(secs),
            _ => Err(ScanError::invalid(
                section,
                key,
                format!("{key} must be a non-negative number of seconds"),
            )),
        })
        .transpose()
}

/// Defaults overlaid with `[scan]` and `[indicators]` values.
pub fn build_scan_config(adapter: &dyn ConfigPort) -> Result<ScanConfig, ScanError> {
    let d = ScanConfig::default();
    let di = IndicatorSettings::default();

    Ok(ScanConfig {
        lookback_days: get_usize(adapter, "scan", "lookback_days", d.lookback_days)?,
        week_lookback_days: get_usize(adapter, "scan", "week_lookback_days", d.week_lookback_days)?,
        volume_multiplier: adapter.get_double("scan", "volume_multiplier", d.volume_multiplier)?,
        near_breakout_threshold: adapter.get_double(
            "scan",
            "near_breakout_threshold",
            d.near_breakout_threshold,
        )?,
        max_extension: adapter.get_double("scan", "max_extension", d.max_extension)?,
        atr_multiplier: adapter.get_double("scan", "atr_multiplier", d.atr_multiplier)?,
        reward_ratio: adapter.get_double("scan", "reward_ratio", d.reward_ratio)?,
        risk_budget: adapter.get_double("scan", "risk_budget", d.risk_budget)?,
        min_price: adapter.get_double("scan", "min_price", d.min_price)?,
        min_avg_volume: adapter.get_double("scan", "min_avg_volume", d.min_avg_volume)?,
        min_history: get_usize(adapter, "scan", "min_history", d.min_history)?,
        history_days: get_usize(adapter, "scan", "history_days", d.history_days)?,
        entry_buffer: adapter.get_double("scan", "entry_buffer", d.entry_buffer)?,
        confirmed_rsi_floor: adapter.get_double(
            "scan",
            "confirmed_rsi_floor",
            d.confirmed_rsi_floor,
        )?,
        near_rsi_floor: adapter.get_double("scan", "near_rsi_floor", d.near_rsi_floor)?,
        near_volume_multiplier: adapter.get_double(
            "scan",
            "near_volume_multiplier",
            d.near_volume_multiplier,
        )?,
        indicators: IndicatorSettings {
            ema_fast: get_usize(adapter, "indicators", "ema_fast", di.ema_fast)?,
            ema_slow: get_usize(adapter, "indicators", "ema_slow", di.ema_slow)?,
            rsi_period: get_usize(adapter, "indicators", "rsi_period", di.rsi_period)?,
            atr_period: get_usize(adapter, "indicators", "atr_period", di.atr_period)?,
        },
    })
}

/// Worker count and timeouts from `[data]`, with an optional concurrency override.
pub fn build_scan_options(
    adapter: &dyn ConfigPort,
    concurrency_override: Option<usize>,
) -> Result<ScanOptions, ScanError> {
    let d = ScanOptions::default();

    let concurrency = match concurrency_override {
        Some(n) => n,
        None => get_usize(adapter, "data", "concurrency", d.concurrency)?,
    };
    if concurrency == 0 {
        return Err(ScanError::invalid(
            "data",
            "concurrency",
            "concurrency must be at least 1",
        ));
    }

    // 0 disables the per-symbol timeout
    let fetch_timeout = match get_optional_secs(adapter, "data", "fetch_timeout_secs")? {
        Some(secs) if secs == 0.0 => None,
        Some(secs) => Some(Duration::from_secs_f64(secs)),
        None => d.fetch_timeout,
    };
    let deadline =
        get_optional_secs(adapter, "data", "scan_timeout_secs")?.map(Duration::from_secs_f64);

    Ok(ScanOptions {
        concurrency,
        fetch_timeout,
        deadline,
    })
}

/// CSV bar directory, optionally backed by an offline directory.
pub fn build_data_port(
    adapter: &dyn ConfigPort,
    data_override: Option<PathBuf>,
) -> Result<Arc<dyn DataPort + Send + Sync>, ScanError> {
    let path = data_override
        .or_else(|| adapter.get_string("data", "path").map(PathBuf::from))
        .ok_or_else(|| ScanError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?;
    let primary = CsvAdapter::new(path);

    Ok(match adapter.get_string("data", "fallback_path") {
        Some(fallback) => Arc::new(FallbackDataPort::new(
            primary,
            CsvAdapter::new(PathBuf::from(fallback)),
        )),
        None => Arc::new(primary),
    })
}

/// Symbols from `--codes`, then `[universe] codes`, then `[universe] file`
/// (read from its `column`, `Symbol` by default), then everything the data
/// port lists; suffix and limit applied last.
pub fn resolve_universe(
    adapter: &dyn ConfigPort,
    codes_override: Option<&str>,
    data_port: &dyn DataPort,
) -> Result<Universe, ScanError> {
    let source: Box<dyn SymbolSource + '_> = match codes_override {
        Some(codes) => Box::new(ConfiguredSymbols::new(codes)),
        None => match (
            adapter.get_string("universe", "codes"),
            adapter.get_string("universe", "file"),
        ) {
            (Some(codes), _) => Box::new(ConfiguredSymbols::new(codes)),
            (None, Some(file)) => {
                let column = adapter
                    .get_string("universe", "column")
                    .unwrap_or_else(|| SymbolListFile::DEFAULT_COLUMN.to_string());
                Box::new(SymbolListFile::new(PathBuf::from(file)).with_column(&column))
            }
            (None, None) => Box::new(ProviderSymbols::new(data_port)),
        },
    };

    let codes = source.symbols()?;
    let suffix = adapter.get_string("universe", "suffix");
    let limit = get_optional_usize(adapter, "universe", "limit")?;
    Ok(shape_universe(codes, suffix.as_deref(), limit))
}

/// Message sink always; CSV export when a path is configured.
pub fn build_sinks(
    adapter: &dyn ConfigPort,
    output_override: Option<PathBuf>,
) -> Vec<Box<dyn ResultSink>> {
    let suffix = adapter.get_string("universe", "suffix");
    let message_path = adapter.get_string("output", "message").map(PathBuf::from);

    let mut sinks: Vec<Box<dyn ResultSink>> = vec![Box::new(MessageSink::new(message_path, suffix))];
    if let Some(csv_path) =
        output_override.or_else(|| adapter.get_string("output", "csv").map(PathBuf::from))
    {
        sinks.push(Box::new(CsvExportSink::new(csv_path)));
    }
    sinks
}

fn run_scan_command(config_path: &Path, overrides: &ScanOverrides) -> ExitCode {
    info!(config = %config_path.display(), "loading config");
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match scan_with_config(&adapter, overrides) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Full scan pipeline against an already loaded config.
pub fn scan_with_config(
    adapter: &dyn ConfigPort,
    overrides: &ScanOverrides,
) -> Result<(), ScanError> {
    let config = build_scan_config(adapter)?;
    validate_scan_config(&config)?;
    let options = build_scan_options(adapter, overrides.concurrency)?;
    let data_port = build_data_port(adapter, overrides.data.clone())?;

    let universe = resolve_universe(adapter, overrides.codes.as_deref(), &*data_port)?;
    if universe.is_empty() {
        warn!("symbol universe is empty");
    }

    let report = run_scan(&universe.codes, data_port, &config, &options);
    for skipped in &report.skipped {
        debug!(code = %skipped.code, reason = %skipped.reason, "skipped");
    }

    for sink in build_sinks(adapter, overrides.output.clone()) {
        sink.deliver(&report)?;
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let checked = build_scan_config(&adapter).and_then(|config| {
        validate_scan_config(&config)?;
        build_scan_options(&adapter, None)?;
        Ok(config)
    });

    match checked {
        Ok(config) => {
            eprintln!("Config is valid.");
            eprintln!(
                "  lookback: {} days (weekly {}), history: {} bars (minimum {})",
                config.lookback_days,
                config.week_lookback_days,
                config.history_days,
                config.required_history()
            );
            eprintln!(
                "  indicators: EMA {}/{}, RSI {}, ATR {}",
                config.indicators.ema_fast,
                config.indicators.ema_slow,
                config.indicators.rsi_period,
                config.indicators.atr_period
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_list_symbols(config_path: Option<&PathBuf>, data: Option<PathBuf>) -> ExitCode {
    let adapter = match config_path {
        Some(path) => match load_config(path) {
            Ok(a) => Some(a),
            Err(code) => return code,
        },
        None => None,
    };

    let data_port = match (&adapter, data) {
        (Some(a), data) => build_data_port(a, data),
        (None, Some(data)) => Ok(Arc::new(CsvAdapter::new(data)) as Arc<dyn DataPort + Send + Sync>),
        (None, None) => {
            eprintln!("error: --config or --data is required for list-symbols");
            return ExitCode::from(2);
        }
    };

    let symbols = match data_port.and_then(|port| port.list_symbols()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}
