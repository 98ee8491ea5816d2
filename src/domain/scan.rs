//! Scan orchestration: per-symbol pipeline, bounded parallel fan-out, ranking.
//!
//! Per symbol: fetch → indicator frame → baseline → classify → trade plan.
//! Every way a symbol can drop out is a [`SkipReason`]; nothing here aborts
//! the scan. Results are ranked once, after every symbol has been evaluated.

use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::baseline::{compute_baseline, Baseline};
use crate::domain::classifier::{classify, is_eligible, Classification, SignalInput};
use crate::domain::config::ScanConfig;
use crate::domain::indicator::frame::compute_frame;
use crate::domain::ohlcv::{normalize_series, OhlcvBar};
use crate::domain::trade_plan::{derive_trade_plan, round2, TradePlan};
use crate::ports::data_port::DataPort;

/// One qualifying symbol. Monetary fields are rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub symbol: String,
    pub classification: Classification,
    pub date: NaiveDate,
    /// Today's close.
    pub cmp: f64,
    pub daily_resistance: f64,
    pub weekly_resistance: f64,
    pub avg_volume: f64,
    pub entry: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub quantity: u64,
    pub risk_per_unit: f64,
    pub rsi: f64,
    /// Today's volume over average volume; the ranking key.
    pub volume_multiple: f64,
}

impl ScanResult {
    /// `plan` is already rounded.
    fn new(
        symbol: &str,
        date: NaiveDate,
        classification: Classification,
        input: &SignalInput,
        plan: &TradePlan,
    ) -> Self {
        let Baseline {
            daily_resistance,
            weekly_resistance,
            avg_volume,
        } = input.baseline;

        Self {
            symbol: symbol.to_string(),
            classification,
            date,
            cmp: round2(input.close),
            daily_resistance: round2(daily_resistance),
            weekly_resistance: round2(weekly_resistance),
            avg_volume,
            entry: plan.entry_price,
            stop_loss: plan.stop_loss,
            target: plan.target,
            quantity: plan.quantity,
            risk_per_unit: plan.risk_per_unit,
            rsi: input.rsi,
            volume_multiple: input.volume_multiple(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    DataUnavailable(String),
    Timeout,
    InsufficientHistory { bars: usize, minimum: usize },
    IndicatorsUndefined,
    Ineligible,
    NoSignal,
    NonPositiveRisk,
    DeadlineExceeded,
}

impl SkipReason {
    /// Skips caused by the data provider rather than by the screen itself.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, SkipReason::DataUnavailable(_) | SkipReason::Timeout)
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DataUnavailable(reason) => write!(f, "data unavailable ({reason})"),
            SkipReason::Timeout => write!(f, "fetch timed out"),
            SkipReason::InsufficientHistory { bars, minimum } => {
                write!(f, "only {bars} bars, minimum {minimum} required")
            }
            SkipReason::IndicatorsUndefined => write!(f, "indicators undefined on scan date"),
            SkipReason::Ineligible => write!(f, "below price or liquidity floor"),
            SkipReason::NoSignal => write!(f, "no signal"),
            SkipReason::NonPositiveRisk => write!(f, "non-positive risk"),
            SkipReason::DeadlineExceeded => write!(f, "scan deadline exceeded"),
        }
    }
}

pub type SymbolOutcome = Result<ScanResult, SkipReason>;

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub code: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScanReport {
    /// Ranked by volume multiple, highest first.
    pub results: Vec<ScanResult>,
    pub skipped: Vec<SkippedSymbol>,
}

impl ScanReport {
    pub fn scanned(&self) -> usize {
        self.results.len() + self.skipped.len()
    }

    pub fn count(&self, classification: Classification) -> usize {
        self.results
            .iter()
            .filter(|r| r.classification == classification)
            .count()
    }

    /// Latest bar date among the results.
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.results.iter().map(|r| r.date).max()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    /// Worker threads evaluating symbols.
    pub concurrency: usize,
    /// Per-symbol fetch timeout; `None` waits for the provider.
    pub fetch_timeout: Option<Duration>,
    /// Overall scan budget; symbols not started in time are skipped.
    pub deadline: Option<Duration>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            fetch_timeout: Some(Duration::from_secs(10)),
            deadline: None,
        }
    }
}

/// Run the signal pipeline on one chronological series. Pure.
pub fn evaluate_symbol(code: &str, bars: &[OhlcvBar], config: &ScanConfig) -> SymbolOutcome {
    let minimum = config.required_history();
    if bars.len() < minimum {
        return Err(SkipReason::InsufficientHistory {
            bars: bars.len(),
            minimum,
        });
    }

    let frame = compute_frame(bars, &config.indicators).map_err(|_| {
        SkipReason::InsufficientHistory {
            bars: bars.len(),
            minimum,
        }
    })?;
    let baseline = compute_baseline(bars, config.lookback_days, config.week_lookback_days)
        .map_err(|_| SkipReason::InsufficientHistory {
            bars: bars.len(),
            minimum,
        })?;

    let input =
        SignalInput::from_series(bars, &frame, baseline).ok_or(SkipReason::IndicatorsUndefined)?;

    if !is_eligible(&input, config) {
        return Err(SkipReason::Ineligible);
    }

    let classification = classify(&input, config);
    if !classification.is_signal() {
        return Err(SkipReason::NoSignal);
    }

    let plan = derive_trade_plan(classification, &input, frame.atr.last(), config)
        .map(|plan| plan.rounded())
        .filter(TradePlan::has_positive_risk)
        .ok_or(SkipReason::NonPositiveRisk)?;

    // bars is non-empty past the history check
    let date = bars[bars.len() - 1].date;
    Ok(ScanResult::new(code, date, classification, &input, &plan))
}

/// Sort by volume multiple descending, ties by symbol ascending.
pub fn rank_results(results: &mut [ScanResult]) {
    results.sort_by(|a, b| {
        b.volume_multiple
            .total_cmp(&a.volume_multiple)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
}

/// Caps live fetch threads, counting ones abandoned after a timeout.
struct FetchSlots {
    in_flight: Mutex<usize>,
    freed: Condvar,
    limit: usize,
}

impl FetchSlots {
    fn new(limit: usize) -> Arc<Self> {
        Arc::new(Self {
            in_flight: Mutex::new(0),
            freed: Condvar::new(),
            limit: limit.max(1),
        })
    }

    fn acquire(self: &Arc<Self>, wait: Duration) -> Option<FetchPermit> {
        let guard = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut in_flight, _) = self
            .freed
            .wait_timeout_while(guard, wait, |n| *n >= self.limit)
            .unwrap_or_else(PoisonError::into_inner);
        if *in_flight >= self.limit {
            return None;
        }
        *in_flight += 1;
        Some(FetchPermit(Arc::clone(self)))
    }
}

/// Held by the fetch thread until the provider returns.
struct FetchPermit(Arc<FetchSlots>);

impl Drop for FetchPermit {
    fn drop(&mut self) {
        let mut in_flight = self.0.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        *in_flight = in_flight.saturating_sub(1);
        self.0.freed.notify_one();
    }
}

fn fetch_with_timeout(
    data_port: &Arc<dyn DataPort + Send + Sync>,
    slots: &Arc<FetchSlots>,
    code: &str,
    history: usize,
    timeout: Option<Duration>,
) -> Result<Vec<OhlcvBar>, SkipReason> {
    let Some(timeout) = timeout else {
        return data_port
            .fetch_bars(code, history)
            .map_err(|e| SkipReason::DataUnavailable(e.to_string()));
    };

    // time spent waiting for a slot counts against the fetch timeout
    let waiting = Instant::now();
    let permit = slots.acquire(timeout).ok_or(SkipReason::Timeout)?;
    let remaining = timeout.saturating_sub(waiting.elapsed());
    if remaining.is_zero() {
        return Err(SkipReason::Timeout);
    }

    let (tx, rx) = mpsc::channel();
    let port = Arc::clone(data_port);
    let owned = code.to_string();
    thread::Builder::new()
        .name(format!("fetch-{code}"))
        .spawn(move || {
            let _permit = permit;
            // receiver may be gone after a timeout
            let _ = tx.send(port.fetch_bars(&owned, history));
        })
        .map_err(|e| SkipReason::DataUnavailable(e.to_string()))?;

    match rx.recv_timeout(remaining) {
        Ok(Ok(bars)) => Ok(bars),
        Ok(Err(e)) => Err(SkipReason::DataUnavailable(e.to_string())),
        Err(RecvTimeoutError::Timeout) => Err(SkipReason::Timeout),
        Err(RecvTimeoutError::Disconnected) => {
            Err(SkipReason::DataUnavailable("fetch worker exited".into()))
        }
    }
}

fn scan_symbol(
    code: &str,
    data_port: &Arc<dyn DataPort + Send + Sync>,
    slots: &Arc<FetchSlots>,
    config: &ScanConfig,
    options: &ScanOptions,
    started: Instant,
) -> SymbolOutcome {
    if options.deadline.is_some_and(|d| started.elapsed() >= d) {
        return Err(SkipReason::DeadlineExceeded);
    }

    let history = config.history_days.max(config.required_history());
    let bars = normalize_series(fetch_with_timeout(
        data_port,
        slots,
        code,
        history,
        options.fetch_timeout,
    )?);

    evaluate_symbol(code, &bars, config)
}

fn log_outcome(code: &str, outcome: &SymbolOutcome) {
    match outcome {
        Ok(result) => debug!(
            code,
            classification = %result.classification,
            volume_multiple = result.volume_multiple,
            "signal"
        ),
        Err(reason) if reason.is_fetch_failure() => warn!(code, %reason, "skipping symbol"),
        Err(reason) => debug!(code, %reason, "skipping symbol"),
    }
}

/// Scan every symbol and return the ranked results plus per-symbol skips.
pub fn run_scan(
    symbols: &[String],
    data_port: Arc<dyn DataPort + Send + Sync>,
    config: &ScanConfig,
    options: &ScanOptions,
) -> ScanReport {
    let started = Instant::now();
    let concurrency = options.concurrency.max(1);
    info!(symbols = symbols.len(), concurrency, "starting scan");
    let slots = FetchSlots::new(concurrency);

    let evaluate = |code: &String| {
        let outcome = scan_symbol(code, &data_port, &slots, config, options, started);
        log_outcome(code, &outcome);
        (code.clone(), outcome)
    };

    let pool = if concurrency > 1 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency)
            .thread_name(|i| format!("breakscan-{i}"))
            .build()
            .map_err(|e| warn!(error = %e, "falling back to sequential scan"))
            .ok()
    } else {
        None
    };

    let outcomes: Vec<(String, SymbolOutcome)> = match pool {
        Some(pool) => pool.install(|| symbols.par_iter().map(evaluate).collect()),
        None => symbols.iter().map(evaluate).collect(),
    };

    let mut report = ScanReport::default();
    for (code, outcome) in outcomes {
        match outcome {
            Ok(result) => report.results.push(result),
            Err(reason) => report.skipped.push(SkippedSymbol { code, reason }),
        }
    }
    rank_results(&mut report.results);

    info!(
        confirmed = report.count(Classification::ConfirmedBreakout),
        near = report.count(Classification::NearBreakout),
        skipped = report.skipped.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "scan complete"
    );

    report
}
