use crate::error::{AppError, Result};
use crate::models::{
    implicit_roster, parse_ledger, BalanceSheet, Bill, CurrencyAliases, LedgerRow, Term,
};
use crate::observability::get_metrics;
use crate::rates::ExchangeRateProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// A bill after currency normalization and beneficiary expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBill {
    pub payer: String,
    pub item: Option<String>,
    /// Amount as entered, in `original_currency`.
    pub original_amount: Decimal,
    pub original_currency: String,
    /// Canonical code of `original_currency`.
    pub currency: String,
    pub rate: Decimal,
    /// Amount in the base currency.
    pub amount: Decimal,
    pub beneficiaries: Vec<String>,
}

impl NormalizedBill {
    /// Share of one beneficiary. Zero for a bill without beneficiaries.
    pub fn share(&self) -> Decimal {
        if self.beneficiaries.is_empty() {
            return Decimal::ZERO;
        }
        self.amount / Decimal::from(self.beneficiaries.len() as u64)
    }
}

/// Output of the aggregation phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedLedger {
    pub sheet: BalanceSheet,
    /// Label for every emitted payment: the base code or its local symbol.
    pub output_currency: String,
    pub bills: Vec<NormalizedBill>,
}

/// Turns bills into per-person net balances in one base currency.
pub struct BalanceAggregator {
    base_currency: String,
    aliases: CurrencyAliases,
    roster: Vec<String>,
}

impl BalanceAggregator {
    pub fn new(base_currency: &str) -> Self {
        let aliases = CurrencyAliases::default();
        Self {
            base_currency: aliases.canonical(base_currency),
            aliases,
            roster: Vec::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: CurrencyAliases) -> Self {
        self.base_currency = aliases.canonical(&self.base_currency);
        self.aliases = aliases;
        self
    }

    /// Roster for the `All`/`AllBut` shortcuts.
    pub fn with_roster(mut self, people: Vec<String>) -> Self {
        self.roster = people;
        self
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    /// Parses raw rows and aggregates them.
    pub fn aggregate_rows<P>(&self, rows: &[LedgerRow], provider: &P) -> Result<AggregatedLedger>
    where
        P: ExchangeRateProvider + ?Sized,
    {
        let bills = parse_ledger(rows)?;
        self.aggregate(&bills, provider)
    }

    /// Aggregates bills in input order.
    ///
    /// The payer's balance drops by the full amount and every beneficiary
    /// gains one share, so the balances always sum to zero. The provider is
    /// called at most once per distinct currency pair.
    pub fn aggregate<P>(&self, bills: &[Bill], provider: &P) -> Result<AggregatedLedger>
    where
        P: ExchangeRateProvider + ?Sized,
    {
        let roster = if self.roster.is_empty() {
            implicit_roster(bills)
        } else {
            self.roster.clone()
        };

        let mut output = self.aliases.output_label(&self.base_currency);
        let mut rates: HashMap<String, Decimal> = HashMap::new();
        let mut sheet = BalanceSheet::new();
        let mut normalized = Vec::with_capacity(bills.len());

        for bill in bills {
            let raw_currency = bill.currency.as_deref().unwrap_or(&self.base_currency);
            if output.observe(raw_currency) {
                info!(label = output.label(), "Output currency label switched to local symbol");
            }
            let currency = self.aliases.canonical(raw_currency);

            let beneficiaries = bill.beneficiaries.resolve(&roster);
            if beneficiaries.is_empty() {
                warn!(payer = %bill.payer, item = ?bill.item, "Bill has no beneficiaries, skipping");
                get_metrics().record_bill_skipped("no_beneficiaries");
                continue;
            }

            let rate = if currency == self.base_currency {
                Decimal::ONE
            } else {
                self.lookup_rate(&currency, provider, &mut rates)?
            };
            let amount = bill.amount.checked_mul(rate).ok_or_else(|| {
                AppError::Validation(format!(
                    "Amount {} {} overflows after conversion to {}",
                    bill.amount, currency, self.base_currency
                ))
            })?;

            let bill = NormalizedBill {
                payer: bill.payer.clone(),
                item: bill.item.clone(),
                original_amount: bill.amount,
                original_currency: raw_currency.to_string(),
                currency,
                rate,
                amount,
                beneficiaries,
            };
            apply(&mut sheet, &bill)?;

            debug!(
                payer = %bill.payer,
                amount = %bill.amount,
                currency = %bill.currency,
                beneficiaries = bill.beneficiaries.len(),
                "Bill aggregated"
            );
            get_metrics().record_bill_aggregated(&bill.currency, bill.rate != Decimal::ONE);
            normalized.push(bill);
        }

        if !sheet.is_balanced() {
            warn!(total = ?sheet.total(), "Balances do not sum to zero");
        }
        info!(
            bills = normalized.len(),
            people = sheet.len(),
            output_currency = output.label(),
            "Ledger aggregated"
        );

        Ok(AggregatedLedger {
            sheet,
            output_currency: output.into_label(),
            bills: normalized,
        })
    }

    fn lookup_rate<P>(
        &self,
        currency: &str,
        provider: &P,
        cache: &mut HashMap<String, Decimal>,
    ) -> Result<Decimal>
    where
        P: ExchangeRateProvider + ?Sized,
    {
        if let Some(rate) = cache.get(currency) {
            get_metrics().record_rate_lookup(currency, &self.base_currency, true);
            return Ok(*rate);
        }

        get_metrics().record_rate_lookup(currency, &self.base_currency, false);
        let rate = provider
            .rate(currency, &self.base_currency)
            .map_err(|e| {
                get_metrics().record_rate_failure(currency, &self.base_currency);
                e
            })?;
        if rate <= Decimal::ZERO {
            get_metrics().record_rate_failure(currency, &self.base_currency);
            return Err(AppError::exchange_rate(
                currency,
                &self.base_currency,
                format!("provider returned non-positive rate {}", rate),
            ));
        }

        debug!(from = currency, to = %self.base_currency, %rate, "Exchange rate fetched");
        cache.insert(currency.to_string(), rate);
        Ok(rate)
    }
}

/// Posts one bill: balance adjustments plus explanation terms.
fn apply(sheet: &mut BalanceSheet, bill: &NormalizedBill) -> Result<()> {
    let shares = bill.beneficiaries.len() as u32;
    let share = bill.share();

    sheet.increment(&bill.payer, -bill.amount)?;

    let payer_shares = bill
        .beneficiaries
        .iter()
        .filter(|person| **person == bill.payer)
        .count() as u32;
    if payer_shares == 0 {
        sheet.push_term(&bill.payer, Term::paid(bill.amount));
    } else if payer_shares < shares {
        sheet.push_term(
            &bill.payer,
            Term::paid_for_others(bill.amount, shares - payer_shares, shares),
        );
    }

    for person in &bill.beneficiaries {
        sheet.increment(person, share)?;
        if *person != bill.payer {
            sheet.push_term(person, Term::share(bill.amount, shares));
        }
    }
    Ok(())
}
