use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::sync::OnceLock;
use std::time::Instant;

/// Global metrics instance.
pub static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Metrics collector for settlement runs.
///
/// Recording goes through the `metrics` facade and is a no-op until the
/// embedding application installs a recorder.
#[derive(Debug, Clone)]
pub struct Metrics {
    initialized: bool,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self { initialized: true }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn record_bill_aggregated(&self, currency: &str, converted: bool) {
        counter!("splitbill_bills_total", "currency" => currency.to_string(), "converted" => converted.to_string()).increment(1);
    }

    pub fn record_bill_skipped(&self, reason: &str) {
        counter!("splitbill_bills_skipped_total", "reason" => reason.to_string()).increment(1);
    }

    pub fn record_rate_lookup(&self, from: &str, to: &str, cache_hit: bool) {
        counter!("splitbill_rate_lookups_total", "from" => from.to_string(), "to" => to.to_string(), "cache_hit" => cache_hit.to_string()).increment(1);
    }

    pub fn record_rate_failure(&self, from: &str, to: &str) {
        counter!("splitbill_rate_failures_total", "from" => from.to_string(), "to" => to.to_string()).increment(1);
    }

    /// One failed attempt inside a retrying provider; the lookup itself may
    /// still succeed.
    pub fn record_rate_attempt_failure(&self, from: &str, to: &str) {
        counter!("splitbill_rate_attempt_failures_total", "from" => from.to_string(), "to" => to.to_string()).increment(1);
    }

    pub fn record_settlement(&self, participant_count: u64, payment_count: u64) {
        counter!("splitbill_settlements_total").increment(1);
        histogram!("splitbill_settlement_participant_count").record(participant_count as f64);
        histogram!("splitbill_settlement_payment_count").record(payment_count as f64);
    }

    pub fn record_settlement_latency(&self, duration_ms: f64) {
        histogram!("splitbill_settlement_duration_ms").record(duration_ms);
    }
}

/// Timer for measuring operation latency.
pub struct LatencyTimer {
    start: Instant,
}

impl LatencyTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for LatencyTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Registers metric descriptions with the installed recorder.
pub fn describe_metrics() {
    describe_counter!("splitbill_bills_total", Unit::Count, "Bills aggregated into balances");
    describe_counter!("splitbill_bills_skipped_total", Unit::Count, "Bills that contributed nothing");
    describe_counter!("splitbill_rate_lookups_total", Unit::Count, "Exchange rate lookups");
    describe_counter!("splitbill_rate_failures_total", Unit::Count, "Failed exchange rate lookups");
    describe_counter!("splitbill_rate_attempt_failures_total", Unit::Count, "Failed attempts inside retried rate lookups");
    describe_counter!("splitbill_settlements_total", Unit::Count, "Settlement runs");
    describe_histogram!("splitbill_settlement_participant_count", Unit::Count, "People with a nonzero balance per run");
    describe_histogram!("splitbill_settlement_payment_count", Unit::Count, "Payments emitted per run");
    describe_histogram!("splitbill_settlement_duration_ms", Unit::Milliseconds, "Settlement run latency in milliseconds");
}

/// Returns the global metrics instance.
pub fn get_metrics() -> &'static Metrics {
    METRICS.get_or_init(Metrics::new)
}
