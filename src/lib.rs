//! Settles shared expenses with at most n-1 payments among n people.
//!
//! Bills are normalized into one base currency and folded into per-person
//! net balances ([`services::BalanceAggregator`]). A greedy solver then
//! matches the largest debtor against the largest creditor until everyone
//! is settled ([`services::SettlementSolver`]).

pub mod config;
pub mod error;
pub mod i18n;
pub mod models;
pub mod observability;
pub mod rates;
pub mod services;

pub use config::{Settings, SplitOptions};
pub use error::{AppError, Result};
pub use models::{LedgerRow, Payment};
pub use rates::ExchangeRateProvider;
pub use services::{SplitBillOutput, SplitBillService};
