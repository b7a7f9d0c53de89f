use crate::error::Result;
use rust_decimal::Decimal;

/// Source of exchange rates.
///
/// `rate(from, to)` returns the multiplier such that
/// `amount_in_from * rate == amount_in_to`. Implementations report failures
/// as `AppError::ExchangeRate` carrying the pair.
#[cfg_attr(test, mockall::automock)]
pub trait ExchangeRateProvider {
    fn rate(&self, from: &str, to: &str) -> Result<Decimal>;
}

impl<F> ExchangeRateProvider for F
where
    F: Fn(&str, &str) -> Result<Decimal>,
{
    fn rate(&self, from: &str, to: &str) -> Result<Decimal> {
        self(from, to)
    }
}
