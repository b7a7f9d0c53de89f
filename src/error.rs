use thiserror::Error;

/// Errors surfaced by the settlement engine.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// The rate provider could not price a currency pair.
    #[error("Exchange rate {from} -> {to} unavailable: {reason}")]
    ExchangeRate {
        from: String,
        to: String,
        reason: String,
    },

    /// The provider could not answer this time, e.g. a timeout or an
    /// unreachable service. Retried by `RetryingRateProvider`.
    #[error("Exchange rate provider unavailable for {from} -> {to}: {reason}")]
    ProviderUnavailable {
        from: String,
        to: String,
        reason: String,
    },

    /// Every attempt of a retrying provider failed.
    #[error("Exchange rate {from} -> {to} unavailable after {attempts} attempts")]
    RateUnavailable {
        from: String,
        to: String,
        attempts: u32,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn exchange_rate(from: &str, to: &str, reason: impl Into<String>) -> Self {
        AppError::ExchangeRate {
            from: from.to_string(),
            to: to.to_string(),
            reason: reason.into(),
        }
    }

    pub fn provider_unavailable(from: &str, to: &str, reason: impl Into<String>) -> Self {
        AppError::ProviderUnavailable {
            from: from.to_string(),
            to: to.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the same request may succeed if repeated.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::ProviderUnavailable { .. })
    }

    /// Returns the currency pair for rate failures.
    pub fn currency_pair(&self) -> Option<(&str, &str)> {
        match self {
            AppError::ExchangeRate { from, to, .. }
            | AppError::ProviderUnavailable { from, to, .. }
            | AppError::RateUnavailable { from, to, .. } => Some((from.as_str(), to.as_str())),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_rate_error_carries_pair() {
        let err = AppError::exchange_rate("EUR", "CZK", "unknown currency");
        assert_eq!(err.currency_pair(), Some(("EUR", "CZK")));
        assert_eq!(
            err.to_string(),
            "Exchange rate EUR -> CZK unavailable: unknown currency"
        );
    }

    #[test]
    fn test_only_provider_outages_are_transient() {
        let outage = AppError::provider_unavailable("USD", "CZK", "connection reset");
        assert!(outage.is_transient());
        assert_eq!(outage.currency_pair(), Some(("USD", "CZK")));

        assert!(!AppError::exchange_rate("GBP", "CZK", "no rate configured").is_transient());
        assert!(!AppError::Validation("bad row".to_string()).is_transient());
    }

    #[test]
    fn test_validation_error_has_no_pair() {
        let err = AppError::Validation("bad row".to_string());
        assert!(err.currency_pair().is_none());
    }
}
