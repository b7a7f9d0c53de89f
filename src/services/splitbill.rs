use crate::config::{Settings, SplitOptions};
use crate::error::Result;
use crate::i18n::Language;
use crate::models::{round_money, Balance, CurrencyAliases, LedgerRow, Payment};
use crate::observability::{get_metrics, run_span, LatencyTimer};
use crate::rates::{ExchangeRateProvider, RetryPolicy, RetryingRateProvider, StaticRateTable};
use crate::services::{BalanceAggregator, Explanation, ExplanationFormatter, SettlementSolver};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{info, warn};
use uuid::Uuid;

/// One cell of the rendered settlement table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Amount(Decimal),
    Empty,
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// Result of a settlement run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub language: Language,
    pub explain: bool,
    pub decimal_places: u32,
    pub output_currency: String,
    pub payments: Vec<Payment>,
    pub balances: Vec<Balance>,
    pub explanations: Vec<Explanation>,
}

impl SettlementReport {
    /// Renders the table: one `[from, to, amount, currency]` row per payment,
    /// then, when explanations are on, a blank row, a localized header and
    /// one `[person, balance, explanation]` row per person.
    pub fn rows(&self) -> Vec<Vec<Cell>> {
        let strings = self.language.strings();
        let mut rows: Vec<Vec<Cell>> = self
            .payments
            .iter()
            .map(|p| {
                vec![
                    Cell::Text(p.from.clone()),
                    Cell::Text(p.to.clone()),
                    Cell::Amount(p.rounded_amount(self.decimal_places)),
                    Cell::Text(p.currency.clone()),
                ]
            })
            .collect();

        if rows.is_empty() {
            rows.push(vec![Cell::from(strings.nothing_to_settle)]);
        }

        if self.explain {
            rows.push(vec![Cell::Empty]);
            rows.push(
                strings
                    .explanation_header()
                    .iter()
                    .map(|label| Cell::from(*label))
                    .collect(),
            );
            for explanation in &self.explanations {
                rows.push(vec![
                    Cell::Text(explanation.person.clone()),
                    Cell::Amount(round_money(explanation.net_balance, self.decimal_places)),
                    Cell::Text(explanation.text.clone()),
                ]);
            }
        }

        rows
    }

    /// Localized header for the payment rows.
    pub fn payment_header(&self) -> Vec<Cell> {
        self.language
            .strings()
            .payment_header()
            .iter()
            .map(|label| Cell::from(*label))
            .collect()
    }
}

/// What a settlement run hands back to its caller.
///
/// An unsupported language is reported as a message in place of the table
/// rather than as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SplitBillOutput {
    Table(SettlementReport),
    Message(String),
}

impl SplitBillOutput {
    pub fn report(&self) -> Option<&SettlementReport> {
        match self {
            SplitBillOutput::Table(report) => Some(report),
            SplitBillOutput::Message(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            SplitBillOutput::Table(_) => None,
            SplitBillOutput::Message(message) => Some(message),
        }
    }
}

/// Runs the whole pipeline: aggregate, settle, explain.
#[derive(Debug, Clone, Default)]
pub struct SplitBillService {
    aliases: CurrencyAliases,
    solver: SettlementSolver,
    formatter: ExplanationFormatter,
}

impl SplitBillService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_aliases(mut self, aliases: CurrencyAliases) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_solver(mut self, solver: SettlementSolver) -> Self {
        self.solver = solver;
        self
    }

    pub fn split_bill<P>(
        &self,
        rows: &[LedgerRow],
        options: &SplitOptions,
        provider: &P,
    ) -> Result<SplitBillOutput>
    where
        P: ExchangeRateProvider + ?Sized,
    {
        let run_id = Uuid::new_v4();
        let _span = run_span(run_id).entered();
        let timer = LatencyTimer::new();

        options.check()?;
        let language = match Language::from_str(&options.language) {
            Ok(language) => language,
            Err(e) => {
                warn!(language = %options.language, "Unsupported language requested");
                return Ok(SplitBillOutput::Message(e.to_string()));
            }
        };

        let ledger = BalanceAggregator::new(&options.base_currency)
            .with_aliases(self.aliases.clone())
            .with_roster(options.people.clone())
            .aggregate_rows(rows, provider)?;

        let participants = ledger.sheet.unsettled().len();
        let payments = self.solver.settle(&ledger.sheet, &ledger.output_currency);
        let explanations = if options.explain {
            self.formatter.explain(&ledger.sheet)
        } else {
            Vec::new()
        };

        let metrics = get_metrics();
        metrics.record_settlement(participants as u64, payments.len() as u64);
        metrics.record_settlement_latency(timer.elapsed_ms());
        info!(
            participants,
            payments = payments.len(),
            currency = %ledger.output_currency,
            "Settlement computed"
        );

        Ok(SplitBillOutput::Table(SettlementReport {
            run_id,
            generated_at: Utc::now(),
            language,
            explain: options.explain,
            decimal_places: options.decimal_places,
            output_currency: ledger.output_currency,
            payments,
            balances: ledger.sheet.balances(),
            explanations,
        }))
    }

    /// Runs with options and fixed exchange rates taken from configuration,
    /// looked up under the configured retry policy.
    pub fn split_bill_with_settings(
        &self,
        rows: &[LedgerRow],
        settings: &Settings,
    ) -> Result<SplitBillOutput> {
        let options = settings.split_options();
        let base = self.aliases.canonical(&options.base_currency);
        let rates = StaticRateTable::from_rates(&base, &settings.exchange.rates)?;
        let provider = RetryingRateProvider::new(rates, RetryPolicy::from(&settings.exchange));
        self.split_bill(rows, &options, &provider)
    }
}
