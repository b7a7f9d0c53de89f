use crate::config::ExchangeSettings;
use crate::error::{AppError, Result};
use crate::observability::get_metrics;
use crate::rates::ExchangeRateProvider;
use anyhow::anyhow;
use rust_decimal::Decimal;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Bounded retry with a fixed per-call timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(200),
            timeout: Duration::from_secs(5),
        }
    }
}

impl From<&ExchangeSettings> for RetryPolicy {
    fn from(settings: &ExchangeSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            backoff: Duration::from_millis(settings.backoff_ms),
            timeout: Duration::from_millis(settings.timeout_ms),
        }
    }
}

/// Wraps a slow or unreliable provider.
///
/// Each attempt runs on a worker thread so a hung lookup can be abandoned
/// after `timeout`. Only transient failures (see `AppError::is_transient`)
/// are retried; any other error is returned from the first attempt. When
/// every attempt fails transiently the caller gets
/// `AppError::RateUnavailable` for the pair.
///
/// A worker that outlives its timeout is detached, not killed. It finishes
/// in the background and its late answer is dropped. `pending_lookups`
/// reports how many workers are still running.
pub struct RetryingRateProvider<P> {
    inner: Arc<P>,
    policy: RetryPolicy,
    in_flight: Arc<AtomicUsize>,
}

/// Decrements the in-flight count when a worker ends, even by panic.
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<P> RetryingRateProvider<P>
where
    P: ExchangeRateProvider + Send + Sync + 'static,
{
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self {
            inner: Arc::new(inner),
            policy,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Worker threads still running, including abandoned ones.
    pub fn pending_lookups(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn attempt(&self, from: &str, to: &str) -> Result<Decimal> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let (from_code, to_code) = (from.to_string(), to.to_string());

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let guard = InFlight(Arc::clone(&self.in_flight));
        thread::Builder::new()
            .name(format!("rate-{}-{}", from, to))
            .spawn(move || {
                let _guard = guard;
                let _ = tx.send(inner.rate(&from_code, &to_code));
            })
            .map_err(|e| {
                AppError::Internal(anyhow!("Failed to spawn rate lookup worker: {}", e))
            })?;

        match rx.recv_timeout(self.policy.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(AppError::provider_unavailable(
                from,
                to,
                format!("timed out after {:?}", self.policy.timeout),
            )),
            Err(RecvTimeoutError::Disconnected) => Err(AppError::Internal(anyhow!(
                "Rate lookup worker for {} -> {} terminated",
                from,
                to
            ))),
        }
    }
}

impl<P> ExchangeRateProvider for RetryingRateProvider<P>
where
    P: ExchangeRateProvider + Send + Sync + 'static,
{
    fn rate(&self, from: &str, to: &str) -> Result<Decimal> {
        let attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=attempts {
            match self.attempt(from, to) {
                Ok(rate) => {
                    debug!(from, to, attempt, %rate, "Exchange rate resolved");
                    return Ok(rate);
                }
                Err(e) if e.is_transient() => {
                    warn!(from, to, attempt, error = %e, "Exchange rate lookup failed");
                    get_metrics().record_rate_attempt_failure(from, to);
                    if attempt < attempts && !self.policy.backoff.is_zero() {
                        thread::sleep(self.policy.backoff);
                    }
                }
                Err(e) => {
                    debug!(from, to, attempt, error = %e, "Exchange rate lookup failed permanently");
                    return Err(e);
                }
            }
        }

        Err(AppError::RateUnavailable {
            from: from.to_string(),
            to: to.to_string(),
            attempts,
        })
    }
}
