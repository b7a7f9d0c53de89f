use metrics::{
    Counter, CounterFn, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
};
use rust_decimal::Decimal;
use splitbill::config::Settings;
use splitbill::error::{AppError, Result};
use splitbill::models::LedgerRow;
use splitbill::observability::{get_metrics, run_span, LatencyTimer, LogConfig, LogFormat, Metrics};
use splitbill::rates::{RetryPolicy, RetryingRateProvider};
use splitbill::services::BalanceAggregator;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

#[derive(Default)]
struct Tally(AtomicU64);

impl CounterFn for Tally {
    fn increment(&self, value: u64) {
        self.0.fetch_add(value, Ordering::SeqCst);
    }

    fn absolute(&self, value: u64) {
        self.0.store(value, Ordering::SeqCst);
    }
}

/// Sums counters by name, ignoring labels.
#[derive(Default)]
struct CountingRecorder {
    counters: Mutex<HashMap<String, Arc<Tally>>>,
}

impl CountingRecorder {
    fn count(&self, name: &str) -> u64 {
        self.counters
            .lock()
            .unwrap()
            .get(name)
            .map_or(0, |tally| tally.0.load(Ordering::SeqCst))
    }
}

impl Recorder for CountingRecorder {
    fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

    fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
        let tally = Arc::clone(
            self.counters
                .lock()
                .unwrap()
                .entry(key.name().to_string())
                .or_default(),
        );
        Counter::from_arc(tally)
    }

    fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}

#[test]
fn test_log_config_default() {
    let config = LogConfig::default();
    assert_eq!(config.level, "info");
    assert_eq!(config.format, LogFormat::Pretty);
    assert!(config.include_target);
    assert!(!config.include_file);
    assert!(!config.include_line);
}

#[test]
fn test_log_format_from_str() {
    assert_eq!(LogFormat::from("json"), LogFormat::Json);
    assert_eq!(LogFormat::from("JSON"), LogFormat::Json);
    assert_eq!(LogFormat::from("compact"), LogFormat::Compact);
    assert_eq!(LogFormat::from("pretty"), LogFormat::Pretty);
    assert_eq!(LogFormat::from("unknown"), LogFormat::Pretty);
}

#[test]
fn test_run_span_carries_name() {
    let span = run_span(Uuid::new_v4());
    if let Some(metadata) = span.metadata() {
        assert_eq!(metadata.name(), "split_bill");
    }
}

#[test]
fn test_metrics_creation() {
    let metrics = Metrics::new();
    assert!(metrics.is_initialized());
    assert!(get_metrics().is_initialized());
}

#[test]
fn test_metrics_record_without_recorder() {
    let metrics = Metrics::default();
    metrics.record_bill_aggregated("EUR", true);
    metrics.record_bill_skipped("no_beneficiaries");
    metrics.record_rate_lookup("EUR", "CZK", false);
    metrics.record_rate_lookup("EUR", "CZK", true);
    metrics.record_rate_failure("GBP", "CZK");
    metrics.record_rate_attempt_failure("GBP", "CZK");
    metrics.record_settlement(4, 3);
    metrics.record_settlement_latency(1.5);
}

#[test]
fn test_latency_timer() {
    let timer = LatencyTimer::new();
    std::thread::sleep(Duration::from_millis(10));
    let elapsed = timer.elapsed_ms();
    assert!(elapsed >= 10.0);
    assert!(elapsed < 1000.0);
}

#[test]
fn test_settings_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.settlement.base_currency, "CZK");
    assert_eq!(settings.settlement.language, "en");
    assert!(settings.settlement.explain);
    assert_eq!(settings.settlement.decimal_places, 2);
    assert!(settings.exchange.rates.is_empty());
    assert_eq!(settings.logging.level, "info");
}

#[test]
fn test_retry_policy_from_settings() {
    let mut settings = Settings::default();
    settings.exchange.max_attempts = 0;
    settings.exchange.timeout_ms = 750;

    let policy = RetryPolicy::from(&settings.exchange);
    assert_eq!(policy.max_attempts, 1);
    assert_eq!(policy.timeout, Duration::from_millis(750));
    assert_eq!(policy.backoff, Duration::from_millis(200));
}

#[test]
fn test_failed_lookup_counts_once_with_every_attempt_recorded() {
    let always_down = |from: &str, to: &str| -> Result<Decimal> {
        Err(AppError::provider_unavailable(from, to, "service unavailable"))
    };
    let provider = RetryingRateProvider::new(
        always_down,
        RetryPolicy {
            max_attempts: 3,
            backoff: Duration::ZERO,
            timeout: Duration::from_millis(500),
        },
    );
    let rows = vec![LedgerRow::bill("Jan", Decimal::from(4), "EUR", "Petr")];

    let recorder = CountingRecorder::default();
    let result = metrics::with_local_recorder(&recorder, || {
        BalanceAggregator::new("CZK").aggregate_rows(&rows, &provider)
    });

    assert!(matches!(result, Err(AppError::RateUnavailable { attempts: 3, .. })));
    assert_eq!(recorder.count("splitbill_rate_failures_total"), 1);
    assert_eq!(recorder.count("splitbill_rate_attempt_failures_total"), 3);
    assert_eq!(recorder.count("splitbill_rate_lookups_total"), 1);
}
