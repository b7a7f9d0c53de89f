use crate::models::{BalanceSheet, Payment, TOLERANCE};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Greedy settlement: at most n-1 payments for n people with a nonzero
/// balance.
///
/// The working list is kept sorted by `(balance, person)`. Each round pops
/// the largest entry and, if it still owes money, moves its whole balance
/// onto the smallest entry. The popped person is settled for good, which
/// bounds the number of payments.
#[derive(Debug, Clone)]
pub struct SettlementSolver {
    tolerance: Decimal,
}

impl Default for SettlementSolver {
    fn default() -> Self {
        Self {
            tolerance: TOLERANCE,
        }
    }
}

impl SettlementSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(tolerance: Decimal) -> Self {
        Self {
            tolerance: tolerance.abs(),
        }
    }

    /// Settles a balance sheet.
    pub fn settle(&self, sheet: &BalanceSheet, currency: &str) -> Vec<Payment> {
        self.settle_balances(
            sheet
                .iter()
                .map(|(person, balance, _)| (person.to_string(), balance)),
            currency,
        )
    }

    /// Settles `(person, balance)` pairs, consuming them.
    ///
    /// Emitted payments read `(popped person, current head, amount)`.
    pub fn settle_balances<I>(&self, balances: I, currency: &str) -> Vec<Payment>
    where
        I: IntoIterator<Item = (String, Decimal)>,
    {
        let mut working: Vec<(Decimal, String)> = balances
            .into_iter()
            .filter(|(_, balance)| balance.abs() > self.tolerance)
            .map(|(person, balance)| (balance, person))
            .collect();
        working.sort();

        let mut payments = Vec::with_capacity(working.len().saturating_sub(1));

        while working.len() > 1 {
            let Some((amount, who)) = working.pop() else {
                break;
            };

            if amount > self.tolerance {
                let head = &mut working[0];
                head.0 += amount;
                debug!(from = %who, to = %head.1, %amount, "Payment emitted");
                payments.push(Payment::new(who, head.1.clone(), amount, currency.to_string()));
            } else {
                debug!(person = %who, %amount, "Discarded non-positive remainder");
            }

            working.sort();
        }

        if let Some((residue, who)) = working.first() {
            if residue.abs() > self.tolerance {
                warn!(person = %who, %residue, "Settlement left a nonzero residue");
            }
        }

        payments
    }
}
