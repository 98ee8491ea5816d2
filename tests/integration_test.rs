mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use approx::assert_relative_eq;
use breakscan::domain::classifier::Classification;
use breakscan::domain::config::ScanConfig;
use breakscan::domain::error::ScanError;
use breakscan::domain::scan::{evaluate_symbol, run_scan, ScanOptions, SkipReason};
use breakscan::ports::data_port::DataPort;
use common::*;

fn port(mock: MockDataPort) -> Arc<dyn DataPort + Send + Sync> {
    Arc::new(mock)
}

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn confirmed_breakout_end_to_end() {
    let mock = MockDataPort::new().with_bars("TCS", breakout_series("TCS"));
    let report = run_scan(
        &codes(&["TCS"]),
        port(mock),
        &ScanConfig::default(),
        &ScanOptions::default(),
    );

    assert!(report.skipped.is_empty());
    assert_eq!(report.results.len(), 1);
    let r = &report.results[0];
    assert_eq!(r.symbol, "TCS");
    assert_eq!(r.classification, Classification::ConfirmedBreakout);
    assert_eq!(r.date, start_date() + chrono::Duration::days(79));
    assert_eq!(r.cmp, 141.0);
    assert_eq!(r.daily_resistance, 140.0);
    assert_eq!(r.weekly_resistance, 140.0);
    assert_eq!(r.entry, 141.78);
    assert_eq!(r.stop_loss, 140.11);
    assert_eq!(r.target, 145.13);
    assert_eq!(r.risk_per_unit, 1.67);
    assert_eq!(r.quantity, 598);
    assert_relative_eq!(r.avg_volume, 200_000.0);
    assert_relative_eq!(r.volume_multiple, 2.0);
    assert_relative_eq!(r.rsi, 80.0, epsilon = 1e-9);
}

#[test]
fn near_breakout_end_to_end() {
    let mock = MockDataPort::new().with_bars("INFY", near_series("INFY"));
    let report = run_scan(
        &codes(&["INFY"]),
        port(mock),
        &ScanConfig::default(),
        &ScanOptions::default(),
    );

    assert_eq!(report.results.len(), 1);
    let r = &report.results[0];
    assert_eq!(r.classification, Classification::NearBreakout);
    assert_eq!(r.cmp, 139.2);
    // anchored on resistance, not today's high
    assert_eq!(r.entry, 140.28);
    assert_eq!(r.stop_loss, 138.74);
    assert_eq!(r.quantity, 648);
    assert_relative_eq!(r.volume_multiple, 1.0);
}

#[test]
fn flat_series_yields_no_signal() {
    let mock = MockDataPort::new().with_bars("FLAT", flat_series("FLAT", 80));
    let report = run_scan(
        &codes(&["FLAT"]),
        port(mock),
        &ScanConfig::default(),
        &ScanOptions::default(),
    );

    assert!(report.results.is_empty());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].reason, SkipReason::NoSignal);
}

#[test]
fn ranked_by_volume_multiple_then_symbol() {
    let mock = MockDataPort::new()
        .with_bars("AAA", trend_series("AAA", 2.0, 300_000))
        .with_bars("BBB", breakout_series("BBB"))
        .with_bars("CCC", near_series("CCC"))
        .with_bars("ZZZ", trend_series("ZZZ", 2.0, 300_000));
    let report = run_scan(
        &codes(&["CCC", "ZZZ", "AAA", "BBB"]),
        port(mock),
        &ScanConfig::default(),
        &ScanOptions::default(),
    );

    let order: Vec<&str> = report.results.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(order, vec!["BBB", "AAA", "ZZZ", "CCC"]);
    assert_eq!(report.count(Classification::ConfirmedBreakout), 3);
    assert_eq!(report.count(Classification::NearBreakout), 1);
}

#[test]
fn failures_are_skips_not_errors() {
    let mut short = breakout_series("SHORT");
    short.drain(..21);
    let mock = MockDataPort::new()
        .with_bars("TCS", breakout_series("TCS"))
        .with_bars("SHORT", short)
        .with_error("DOWN", "connection refused");
    let report = run_scan(
        &codes(&["DOWN", "TCS", "SHORT", "MISSING"]),
        port(mock),
        &ScanConfig::default(),
        &ScanOptions::default(),
    );

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.scanned(), 4);

    let reason = |code: &str| {
        report
            .skipped
            .iter()
            .find(|s| s.code == code)
            .map(|s| s.reason.clone())
            .unwrap()
    };
    assert!(matches!(reason("DOWN"), SkipReason::DataUnavailable(msg) if msg.contains("connection refused")));
    assert!(matches!(reason("MISSING"), SkipReason::DataUnavailable(_)));
    assert_eq!(
        reason("SHORT"),
        SkipReason::InsufficientHistory {
            bars: 59,
            minimum: 60
        }
    );
}

#[test]
fn slow_provider_times_out() {
    let mock = MockDataPort::new()
        .with_bars("SLOW", breakout_series("SLOW"))
        .with_delay(Duration::from_millis(500));
    let options = ScanOptions {
        concurrency: 1,
        fetch_timeout: Some(Duration::from_millis(20)),
        deadline: None,
    };
    let report = run_scan(&codes(&["SLOW"]), port(mock), &ScanConfig::default(), &options);

    assert!(report.results.is_empty());
    assert_eq!(report.skipped[0].reason, SkipReason::Timeout);
}

/// Slow provider that records the most fetches it saw running at once.
struct CountingPort {
    inner: MockDataPort,
    delay: Duration,
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl CountingPort {
    fn new(inner: MockDataPort, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            inner,
            delay,
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }
}

impl DataPort for CountingPort {
    fn fetch_bars(&self, code: &str, history: usize) -> Result<Vec<OhlcvBar>, ScanError> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        thread::sleep(self.delay);
        self.current.fetch_sub(1, Ordering::SeqCst);
        self.inner.fetch_bars(code, history)
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScanError> {
        self.inner.list_symbols()
    }
}

#[test]
fn timed_out_fetches_stay_within_concurrency() {
    let symbols: Vec<String> = (0..10).map(|i| format!("S{i}")).collect();
    for concurrency in [1, 2] {
        let counting = CountingPort::new(MockDataPort::new(), Duration::from_millis(300));
        let options = ScanOptions {
            concurrency,
            fetch_timeout: Some(Duration::from_millis(10)),
            deadline: None,
        };
        let report = run_scan(
            &symbols,
            counting.clone(),
            &ScanConfig::default(),
            &options,
        );

        assert_eq!(report.skipped.len(), 10);
        assert!(report.skipped.iter().all(|s| s.reason == SkipReason::Timeout));
        assert!(counting.peak.load(Ordering::SeqCst) <= concurrency);
    }
}

#[test]
fn finished_fetches_free_their_slot() {
    let mock = MockDataPort::new()
        .with_bars("TCS", breakout_series("TCS"))
        .with_bars("INFY", near_series("INFY"))
        .with_bars("FLAT", flat_series("FLAT", 80));
    let counting = CountingPort::new(mock, Duration::from_millis(20));
    let options = ScanOptions {
        concurrency: 1,
        fetch_timeout: Some(Duration::from_secs(5)),
        deadline: None,
    };
    let report = run_scan(
        &codes(&["TCS", "INFY", "FLAT"]),
        counting.clone(),
        &ScanConfig::default(),
        &options,
    );

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.skipped[0].reason, SkipReason::NoSignal);
    assert_eq!(counting.peak.load(Ordering::SeqCst), 1);
}

#[test]
fn no_timeout_waits_for_provider() {
    let mock = MockDataPort::new()
        .with_bars("SLOW", breakout_series("SLOW"))
        .with_delay(Duration::from_millis(30));
    let options = ScanOptions {
        concurrency: 1,
        fetch_timeout: None,
        deadline: None,
    };
    let report = run_scan(&codes(&["SLOW"]), port(mock), &ScanConfig::default(), &options);
    assert_eq!(report.results.len(), 1);
}

#[test]
fn expired_deadline_skips_everything() {
    let mock = MockDataPort::new()
        .with_bars("TCS", breakout_series("TCS"))
        .with_bars("INFY", near_series("INFY"));
    let options = ScanOptions {
        deadline: Some(Duration::ZERO),
        ..ScanOptions::default()
    };
    let report = run_scan(&codes(&["TCS", "INFY"]), port(mock), &ScanConfig::default(), &options);

    assert!(report.results.is_empty());
    assert!(report
        .skipped
        .iter()
        .all(|s| s.reason == SkipReason::DeadlineExceeded));
}

#[test]
fn parallel_matches_sequential() {
    let build = || {
        MockDataPort::new()
            .with_bars("A", breakout_series("A"))
            .with_bars("B", near_series("B"))
            .with_bars("C", flat_series("C", 80))
            .with_bars("D", trend_series("D", 2.0, 250_000))
            .with_error("E", "boom")
    };
    let universe = codes(&["A", "B", "C", "D", "E"]);
    let config = ScanConfig::default();

    let sequential = run_scan(
        &universe,
        port(build()),
        &config,
        &ScanOptions {
            concurrency: 1,
            ..ScanOptions::default()
        },
    );
    let parallel = run_scan(
        &universe,
        port(build()),
        &config,
        &ScanOptions {
            concurrency: 4,
            ..ScanOptions::default()
        },
    );
    assert_eq!(sequential, parallel);

    let again = run_scan(&universe, port(build()), &config, &ScanOptions::default());
    assert_eq!(parallel, again);
}

#[test]
fn long_history_is_trimmed_to_request() {
    // 40 extra leading bars far above today's price; outside the fetched window
    let mut bars: Vec<OhlcvBar> = (0..40).map(|i| make_bar("TCS", i, 500.0, 200_000)).collect();
    for (i, mut bar) in breakout_series("TCS").into_iter().enumerate() {
        bar.date = start_date() + chrono::Duration::days(40 + i as i64);
        bars.push(bar);
    }
    let mock = MockDataPort::new().with_bars("TCS", bars);
    let config = ScanConfig {
        history_days: 80,
        ..ScanConfig::default()
    };
    let report = run_scan(&codes(&["TCS"]), port(mock), &config, &ScanOptions::default());

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].classification, Classification::ConfirmedBreakout);
}

#[test]
fn unordered_bars_are_normalized() {
    let mut bars = breakout_series("TCS");
    bars.reverse();
    let mock = MockDataPort::new().with_bars("TCS", bars);
    let report = run_scan(
        &codes(&["TCS"]),
        port(mock),
        &ScanConfig::default(),
        &ScanOptions::default(),
    );
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].cmp, 141.0);
}

#[test]
fn price_floor_makes_symbol_ineligible() {
    let config = ScanConfig {
        min_price: 500.0,
        ..ScanConfig::default()
    };
    let outcome = evaluate_symbol("TCS", &breakout_series("TCS"), &config);
    assert_eq!(outcome, Err(SkipReason::Ineligible));
}

#[test]
fn zero_stop_distance_is_discarded() {
    let config = ScanConfig {
        atr_multiplier: 0.0,
        ..ScanConfig::default()
    };
    let outcome = evaluate_symbol("TCS", &breakout_series("TCS"), &config);
    assert_eq!(outcome, Err(SkipReason::NonPositiveRisk));
}

#[test]
fn low_volume_breakout_is_no_signal() {
    // above resistance but only 1.0x average volume; too far above for near
    let outcome = evaluate_symbol(
        "TCS",
        &trend_series("TCS", 2.0, 200_000),
        &ScanConfig::default(),
    );
    assert_eq!(outcome, Err(SkipReason::NoSignal));
}

#[test]
fn empty_universe_gives_empty_report() {
    let report = run_scan(
        &[],
        port(MockDataPort::new()),
        &ScanConfig::default(),
        &ScanOptions::default(),
    );
    assert!(report.results.is_empty());
    assert!(report.skipped.is_empty());
    assert_eq!(report.as_of(), None);
}
