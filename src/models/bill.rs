use crate::error::{AppError, Result};
use indexmap::IndexSet;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One raw ledger row: payer, item, amount, currency, beneficiaries.
///
/// Cells are optional because rows come from a table where any cell can be
/// blank. Rows are never mutated by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub payer: Option<String>,
    pub item: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub beneficiaries: Option<String>,
}

impl LedgerRow {
    pub fn new(
        payer: &str,
        item: &str,
        amount: Decimal,
        currency: &str,
        beneficiaries: &str,
    ) -> Self {
        Self {
            payer: Some(payer.to_string()),
            item: Some(item.to_string()),
            amount: Some(amount),
            currency: Some(currency.to_string()),
            beneficiaries: Some(beneficiaries.to_string()),
        }
    }

    /// A row without an item description.
    pub fn bill(payer: &str, amount: Decimal, currency: &str, beneficiaries: &str) -> Self {
        Self {
            item: None,
            ..Self::new(payer, "", amount, currency, beneficiaries)
        }
    }

    /// Returns true if every cell is absent or whitespace. A zero amount
    /// counts as an empty cell.
    pub fn is_blank(&self) -> bool {
        blank(&self.payer)
            && blank(&self.item)
            && self.amount.map_or(true, |amount| amount.is_zero())
            && blank(&self.currency)
            && blank(&self.beneficiaries)
    }
}

fn blank(cell: &Option<String>) -> bool {
    cell.as_deref().map_or(true, |s| s.trim().is_empty())
}

fn trimmed(cell: &Option<String>) -> Option<String> {
    cell.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Who a bill was paid for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Beneficiaries {
    /// Explicit names. Duplicates are kept; each occurrence is one share.
    Listed(Vec<String>),
    /// Everyone on the roster.
    All,
    /// Everyone on the roster except the named people.
    AllBut(Vec<String>),
}

impl Beneficiaries {
    const ALL: &'static str = "All";
    const ALL_BUT: &'static str = "AllBut";

    /// Parses a beneficiaries cell.
    pub fn parse(field: &str) -> Self {
        let field = field.trim();
        if field == Self::ALL {
            return Beneficiaries::All;
        }
        if let Some(rest) = field.strip_prefix(Self::ALL_BUT) {
            if rest.is_empty() || rest.starts_with(|c: char| c.is_whitespace() || c == ',') {
                let excluded = if rest.contains(',') {
                    split_names(rest)
                } else {
                    rest.split_whitespace().map(str::to_string).collect()
                };
                return Beneficiaries::AllBut(excluded);
            }
        }
        Beneficiaries::Listed(split_names(field))
    }

    /// Names mentioned explicitly, used to build an implicit roster.
    pub fn named(&self) -> &[String] {
        match self {
            Beneficiaries::Listed(names) => names,
            Beneficiaries::All | Beneficiaries::AllBut(_) => &[],
        }
    }

    /// Expands shortcuts against the roster.
    pub fn resolve(&self, roster: &[String]) -> Vec<String> {
        match self {
            Beneficiaries::Listed(names) => names.clone(),
            Beneficiaries::All => roster.to_vec(),
            Beneficiaries::AllBut(excluded) => roster
                .iter()
                .filter(|person| !excluded.contains(person))
                .cloned()
                .collect(),
        }
    }
}

fn split_names(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// A validated ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub payer: String,
    pub item: Option<String>,
    pub amount: Decimal,
    /// Currency as written in the ledger; `None` means the base currency.
    pub currency: Option<String>,
    pub beneficiaries: Beneficiaries,
}

impl Bill {
    /// Validates a raw row. Blank rows yield `Ok(None)`.
    pub fn from_row(index: usize, row: &LedgerRow) -> Result<Option<Self>> {
        if row.is_blank() {
            return Ok(None);
        }

        let payer = trimmed(&row.payer).ok_or_else(|| {
            AppError::Validation(format!("Row {}: payer cannot be empty", index + 1))
        })?;
        let amount = row.amount.ok_or_else(|| {
            AppError::Validation(format!("Row {}: amount is missing", index + 1))
        })?;

        Ok(Some(Self {
            payer,
            item: trimmed(&row.item),
            amount,
            currency: trimmed(&row.currency),
            beneficiaries: Beneficiaries::parse(row.beneficiaries.as_deref().unwrap_or("")),
        }))
    }
}

/// Parses every non-blank row, keeping input order.
pub fn parse_ledger(rows: &[LedgerRow]) -> Result<Vec<Bill>> {
    let mut bills = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        if let Some(bill) = Bill::from_row(index, row)? {
            bills.push(bill);
        }
    }
    Ok(bills)
}

/// Everyone named explicitly in the ledger, in first-appearance order.
pub fn implicit_roster(bills: &[Bill]) -> Vec<String> {
    let mut roster = IndexSet::new();
    for bill in bills {
        roster.insert(bill.payer.clone());
        for name in bill.beneficiaries.named() {
            roster.insert(name.clone());
        }
    }
    roster.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_listed_trims_entries() {
        assert_eq!(
            Beneficiaries::parse(" Alice , Bob,Carol "),
            Beneficiaries::Listed(names(&["Alice", "Bob", "Carol"]))
        );
    }

    #[test]
    fn test_parse_keeps_duplicates() {
        assert_eq!(
            Beneficiaries::parse("Alice,Alice,Bob"),
            Beneficiaries::Listed(names(&["Alice", "Alice", "Bob"]))
        );
    }

    #[test]
    fn test_parse_empty_field() {
        assert_eq!(Beneficiaries::parse("  "), Beneficiaries::Listed(vec![]));
        assert_eq!(Beneficiaries::parse(" , ,"), Beneficiaries::Listed(vec![]));
    }

    #[test]
    fn test_parse_shortcuts() {
        assert_eq!(Beneficiaries::parse("All"), Beneficiaries::All);
        assert_eq!(
            Beneficiaries::parse("AllBut Jan Petr"),
            Beneficiaries::AllBut(names(&["Jan", "Petr"]))
        );
        assert_eq!(
            Beneficiaries::parse("AllBut Jan, Petr"),
            Beneficiaries::AllBut(names(&["Jan", "Petr"]))
        );
        assert_eq!(Beneficiaries::parse("AllBut"), Beneficiaries::AllBut(vec![]));
    }

    #[test]
    fn test_parse_name_starting_with_shortcut() {
        assert_eq!(
            Beneficiaries::parse("Allbright,AllButton"),
            Beneficiaries::Listed(names(&["Allbright", "AllButton"]))
        );
    }

    #[test]
    fn test_resolve_against_roster() {
        let roster = names(&["Jan", "Matěj", "Petr", "Martin"]);
        assert_eq!(Beneficiaries::All.resolve(&roster), roster);
        assert_eq!(
            Beneficiaries::AllBut(names(&["Jan"])).resolve(&roster),
            names(&["Matěj", "Petr", "Martin"])
        );
    }

    #[test]
    fn test_blank_row_is_skipped() {
        let row = LedgerRow {
            payer: Some("  ".to_string()),
            ..LedgerRow::default()
        };
        assert!(row.is_blank());
        assert!(Bill::from_row(0, &row).unwrap().is_none());
    }

    #[test]
    fn test_zero_amount_alone_is_blank() {
        let row = LedgerRow {
            amount: Some(Decimal::ZERO),
            ..LedgerRow::default()
        };
        assert!(row.is_blank());
        assert!(Bill::from_row(0, &row).unwrap().is_none());

        let with_payer = LedgerRow {
            payer: Some("Alice".to_string()),
            ..row
        };
        assert!(!with_payer.is_blank());
    }

    #[test]
    fn test_missing_payer_is_rejected() {
        let row = LedgerRow::bill("", dec!(10), "CZK", "Bob");
        let err = Bill::from_row(2, &row).unwrap_err();
        assert!(err.to_string().contains("Row 3"));
    }

    #[test]
    fn test_missing_amount_is_rejected() {
        let row = LedgerRow {
            payer: Some("Alice".to_string()),
            beneficiaries: Some("Bob".to_string()),
            ..LedgerRow::default()
        };
        assert!(matches!(
            Bill::from_row(0, &row),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_implicit_roster_order() {
        let bills = parse_ledger(&[
            LedgerRow::bill("Petr", dec!(10), "CZK", "Jan, Petr"),
            LedgerRow::default(),
            LedgerRow::bill("Martin", dec!(10), "CZK", "All"),
        ])
        .unwrap();

        assert_eq!(bills.len(), 2);
        assert_eq!(implicit_roster(&bills), names(&["Petr", "Jan", "Martin"]));
    }
}
