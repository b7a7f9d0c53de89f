pub mod balance;
pub mod bill;
pub mod currency;
pub mod payment;
pub mod term;

pub use balance::{Balance, BalanceSheet};
pub use bill::{implicit_roster, parse_ledger, Beneficiaries, Bill, LedgerRow};
pub use currency::{CurrencyAliases, OutputCurrency};
pub use payment::Payment;
pub use term::{Sign, Term};

use rust_decimal::{Decimal, RoundingStrategy};

/// Balances at or below this magnitude count as settled.
pub const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

/// Rounds a money amount for display, midpoint away from zero.
pub fn round_money(amount: Decimal, decimal_places: u32) -> Decimal {
    amount.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}
