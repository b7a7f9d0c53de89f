use crate::error::{AppError, Result};
use crate::models::{Term, TOLERANCE};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A person's net balance after aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub person: String,
    /// Positive = still owes the group, negative = is owed by the group.
    pub net_balance: Decimal,
}

impl Balance {
    pub fn new(person: String, net_balance: Decimal) -> Self {
        Self {
            person,
            net_balance,
        }
    }

    /// Mirrored view: positive = is owed money by the group.
    pub fn position(&self) -> Decimal {
        -self.net_balance
    }

    pub fn is_settled(&self) -> bool {
        self.net_balance.abs() <= TOLERANCE
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Entry {
    net_balance: Decimal,
    terms: Vec<Term>,
}

/// Balances and explanation terms keyed by person, in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    entries: IndexMap<String, Entry>,
}

impl BalanceSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to a person's balance, inserting them at zero first.
    /// The balance is left untouched if the sum would overflow.
    pub fn increment(&mut self, person: &str, amount: Decimal) -> Result<()> {
        let entry = self.entry(person);
        entry.net_balance = entry.net_balance.checked_add(amount).ok_or_else(|| {
            AppError::Validation(format!(
                "Balance of {} overflows when adding {}",
                person, amount
            ))
        })?;
        Ok(())
    }

    /// Builds a sheet from `(person, amount)` pairs; repeated people accumulate.
    pub fn from_balances<I>(balances: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Decimal)>,
    {
        let mut sheet = BalanceSheet::new();
        for (person, amount) in balances {
            sheet.increment(&person, amount)?;
        }
        Ok(sheet)
    }

    /// Appends an explanation term for a person.
    pub fn push_term(&mut self, person: &str, term: Term) {
        self.entry(person).terms.push(term);
    }

    fn entry(&mut self, person: &str) -> &mut Entry {
        self.entries.entry(person.to_string()).or_default()
    }

    pub fn get(&self, person: &str) -> Option<Decimal> {
        self.entries.get(person).map(|e| e.net_balance)
    }

    pub fn terms(&self, person: &str) -> &[Term] {
        self.entries
            .get(person)
            .map(|e| e.terms.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn people(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Balances in first-appearance order.
    pub fn balances(&self) -> Vec<Balance> {
        self.entries
            .iter()
            .map(|(person, e)| Balance::new(person.clone(), e.net_balance))
            .collect()
    }

    /// Iterates `(person, balance, terms)` in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal, &[Term])> {
        self.entries
            .iter()
            .map(|(person, e)| (person.as_str(), e.net_balance, e.terms.as_slice()))
    }

    /// Sum of all balances. Zero up to rounding for a complete ledger;
    /// `None` if an intermediate sum overflows.
    pub fn total(&self) -> Option<Decimal> {
        self.entries
            .values()
            .try_fold(Decimal::ZERO, |acc, e| acc.checked_add(e.net_balance))
    }

    pub fn is_balanced(&self) -> bool {
        self.total().map_or(false, |total| total.abs() <= TOLERANCE)
    }

    /// People whose balance is not zero within tolerance.
    pub fn unsettled(&self) -> Vec<Balance> {
        self.balances()
            .into_iter()
            .filter(|b| !b.is_settled())
            .collect()
    }
}
