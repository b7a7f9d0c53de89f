#![allow(dead_code)]

use rust_decimal::Decimal;
use splitbill::error::{AppError, Result};
use splitbill::models::{BalanceSheet, LedgerRow, Payment};
use std::cell::RefCell;
use std::collections::HashMap;

/// Builds rows from `payer; item; amount; currency; beneficiaries` lines.
pub fn ledger(text: &str) -> Vec<LedgerRow> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let cells: Vec<&str> = line.splitn(5, ';').map(str::trim).collect();
            LedgerRow::new(
                cells[0],
                cells[1],
                cells[2].parse::<Decimal>().expect("amount"),
                cells[3],
                cells[4],
            )
        })
        .collect()
}

/// Net amount a person ends up receiving through the payments.
pub fn will_get(name: &str, payments: &[Payment]) -> Decimal {
    let received: Decimal = payments
        .iter()
        .filter(|p| p.to == name)
        .map(|p| p.amount)
        .sum();
    let paid: Decimal = payments
        .iter()
        .filter(|p| p.from == name)
        .map(|p| p.amount)
        .sum();
    received - paid
}

/// Balances left after applying payments to a sheet.
pub fn apply_payments(sheet: &BalanceSheet, payments: &[Payment]) -> Vec<(String, Decimal)> {
    sheet
        .iter()
        .map(|(person, balance, _)| (person.to_string(), balance + will_get(person, payments)))
        .collect()
}

/// Payments as an unordered set of tuples.
pub fn payment_set(payments: &[Payment]) -> Vec<(String, String, Decimal)> {
    let mut set: Vec<(String, String, Decimal)> = payments
        .iter()
        .map(|p| (p.from.clone(), p.to.clone(), p.amount))
        .collect();
    set.sort();
    set
}

/// Provider backed by a fixed table that records every call.
pub struct RecordingProvider {
    rates: HashMap<String, Decimal>,
    pub calls: RefCell<Vec<(String, String)>>,
}

impl RecordingProvider {
    pub fn new(rates: &[(&str, Decimal)]) -> Self {
        Self {
            rates: rates.iter().map(|(c, r)| (c.to_string(), *r)).collect(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl splitbill::ExchangeRateProvider for RecordingProvider {
    fn rate(&self, from: &str, to: &str) -> Result<Decimal> {
        self.calls
            .borrow_mut()
            .push((from.to_string(), to.to_string()));
        self.rates
            .get(from)
            .copied()
            .ok_or_else(|| AppError::exchange_rate(from, to, "unknown currency"))
    }
}
