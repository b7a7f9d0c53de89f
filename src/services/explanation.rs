use crate::models::{BalanceSheet, Term};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a person's balance came about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub person: String,
    pub net_balance: Decimal,
    pub text: String,
}

/// Renders explanation terms as `300/3 + 50 - 300*2/3`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplanationFormatter;

impl ExplanationFormatter {
    /// One explanation per person, in first-appearance order.
    pub fn explain(&self, sheet: &BalanceSheet) -> Vec<Explanation> {
        sheet
            .iter()
            .map(|(person, net_balance, terms)| Explanation {
                person: person.to_string(),
                net_balance,
                text: self.render(terms),
            })
            .collect()
    }

    pub fn render(&self, terms: &[Term]) -> String {
        let Some((first, rest)) = terms.split_first() else {
            return "0".to_string();
        };

        let mut text = first.to_string();
        for term in rest {
            let op = if term.is_negative() { " - " } else { " + " };
            text.push_str(op);
            text.push_str(&term.magnitude());
        }
        text
    }
}
