use crate::error::{AppError, Result};
use crate::rates::ExchangeRateProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Fixed rates into one settlement currency.
///
/// Each entry says how many units of the settlement currency one unit of the
/// keyed currency is worth. Inverse and cross rates are derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticRateTable {
    settlement: String,
    rates: HashMap<String, Decimal>,
}

impl StaticRateTable {
    pub fn new(settlement: &str) -> Self {
        Self {
            settlement: settlement.trim().to_ascii_uppercase(),
            rates: HashMap::new(),
        }
    }

    /// Builds a table from configured rates.
    pub fn from_rates(settlement: &str, rates: &HashMap<String, Decimal>) -> Result<Self> {
        let mut table = Self::new(settlement);
        for (code, rate) in rates {
            table.insert(code, *rate)?;
        }
        Ok(table)
    }

    /// Parses `"USD:20,EUR:27.09"`.
    pub fn parse(settlement: &str, rates: &str) -> Result<Self> {
        let mut table = Self::new(settlement);
        for pair in rates.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (code, rate) = pair.split_once(':').ok_or_else(|| bad_format(pair))?;
            let rate = Decimal::from_str(rate.trim()).map_err(|_| bad_format(pair))?;
            table.insert(code, rate)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, code: &str, rate: Decimal) -> Result<()> {
        if rate <= Decimal::ZERO {
            return Err(AppError::Validation(format!(
                "Exchange rate for {} must be positive, got {}",
                code.trim(),
                rate
            )));
        }
        self.rates.insert(code.trim().to_ascii_uppercase(), rate);
        Ok(())
    }

    pub fn settlement(&self) -> &str {
        &self.settlement
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    fn to_settlement(&self, code: &str) -> Option<Decimal> {
        if code == self.settlement {
            Some(Decimal::ONE)
        } else {
            self.rates.get(code).copied()
        }
    }
}

fn bad_format(pair: &str) -> AppError {
    AppError::Validation(format!(
        "Bad format of exchange rate string: '{}'. Should be for example 'CUR:12.3'",
        pair
    ))
}

impl ExchangeRateProvider for StaticRateTable {
    fn rate(&self, from: &str, to: &str) -> Result<Decimal> {
        let from_code = from.trim().to_ascii_uppercase();
        let to_code = to.trim().to_ascii_uppercase();
        if from_code == to_code {
            return Ok(Decimal::ONE);
        }

        let from_rate = self
            .to_settlement(&from_code)
            .ok_or_else(|| AppError::exchange_rate(from, to, format!("no rate configured for {}", from_code)))?;
        let to_rate = self
            .to_settlement(&to_code)
            .ok_or_else(|| AppError::exchange_rate(from, to, format!("no rate configured for {}", to_code)))?;

        from_rate
            .checked_div(to_rate)
            .ok_or_else(|| AppError::exchange_rate(from, to, "rate overflow"))
    }
}
