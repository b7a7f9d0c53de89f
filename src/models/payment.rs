use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A payment that settles part of the group's debts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
    pub currency: String,
}

impl Payment {
    pub fn new(from: String, to: String, amount: Decimal, currency: String) -> Self {
        Self {
            from,
            to,
            amount,
            currency,
        }
    }

    /// Amount rounded for display.
    pub fn rounded_amount(&self, decimal_places: u32) -> Decimal {
        crate::models::round_money(self.amount, decimal_places)
    }

    /// Tuple form used by tests and tabular output.
    pub fn as_tuple(&self) -> (&str, &str, Decimal) {
        (self.from.as_str(), self.to.as_str(), self.amount)
    }
}
