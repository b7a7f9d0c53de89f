use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sign {
    Plus,
    Minus,
}

/// One contribution to a person's balance, kept symbolic for explanation.
///
/// The value is `sign * amount * multiplier / denominator`, e.g. a payer who
/// covered 300 for three people including themselves gets `-300*2/3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub sign: Sign,
    pub amount: Decimal,
    pub multiplier: u32,
    pub denominator: u32,
}

impl Term {
    /// One share of a bill split `denominator` ways.
    pub fn share(amount: Decimal, denominator: u32) -> Self {
        Self::signed(Sign::Plus, amount, 1, denominator)
    }

    /// The full amount paid by someone not among the beneficiaries.
    pub fn paid(amount: Decimal) -> Self {
        Self::signed(Sign::Minus, amount, 1, 1)
    }

    /// What a payer who is also a beneficiary covered for the others.
    pub fn paid_for_others(amount: Decimal, others: u32, denominator: u32) -> Self {
        Self::signed(Sign::Minus, amount, others, denominator)
    }

    /// Keeps `amount` non-negative by folding its sign into `sign`.
    fn signed(sign: Sign, amount: Decimal, multiplier: u32, denominator: u32) -> Self {
        let sign = match (sign, amount.is_sign_negative() && !amount.is_zero()) {
            (s, false) => s,
            (Sign::Plus, true) => Sign::Minus,
            (Sign::Minus, true) => Sign::Plus,
        };
        Self {
            sign,
            amount: amount.abs(),
            multiplier,
            denominator,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.sign == Sign::Minus
    }

    /// Numeric value of the term; `None` for a zero denominator or overflow.
    pub fn value(&self) -> Option<Decimal> {
        let magnitude = self
            .amount
            .checked_mul(Decimal::from(self.multiplier))?
            .checked_div(Decimal::from(self.denominator))?;
        Some(match self.sign {
            Sign::Plus => magnitude,
            Sign::Minus => -magnitude,
        })
    }

    /// Renders the unsigned part, e.g. `300*2/3`, `300/3` or `300`.
    pub fn magnitude(&self) -> String {
        let amount = self.amount.normalize();
        match (self.multiplier, self.denominator) {
            (1, 1) => amount.to_string(),
            (1, d) => format!("{}/{}", amount, d),
            (m, 1) => format!("{}*{}", amount, m),
            (m, d) => format!("{}*{}/{}", amount, m, d),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sign {
            Sign::Plus => write!(f, "{}", self.magnitude()),
            Sign::Minus => write!(f, "-{}", self.magnitude()),
        }
    }
}
