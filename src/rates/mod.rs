pub mod provider;
pub mod retry;
pub mod static_table;

pub use provider::ExchangeRateProvider;
pub use retry::{RetryPolicy, RetryingRateProvider};
pub use static_table::StaticRateTable;

#[cfg(test)]
pub use provider::MockExchangeRateProvider;
