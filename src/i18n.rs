use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Languages the settlement table can be labelled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Cs,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Cs];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Cs => "cs",
        }
    }

    pub fn strings(&self) -> &'static Strings {
        match self {
            Language::En => &EN,
            Language::Cs => &CS,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = LanguageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "cs" => Ok(Language::Cs),
            _ => Err(LanguageParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported language '{0}'. Supported languages: {}", supported_codes())]
pub struct LanguageParseError(String);

fn supported_codes() -> String {
    Language::ALL
        .iter()
        .map(Language::code)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Labels used when rendering the settlement table.
#[derive(Debug)]
pub struct Strings {
    pub from: &'static str,
    pub to: &'static str,
    pub amount: &'static str,
    pub currency: &'static str,
    pub person: &'static str,
    pub balance: &'static str,
    pub explanation: &'static str,
    pub nothing_to_settle: &'static str,
}

impl Strings {
    pub fn payment_header(&self) -> [&'static str; 4] {
        [self.from, self.to, self.amount, self.currency]
    }

    pub fn explanation_header(&self) -> [&'static str; 3] {
        [self.person, self.balance, self.explanation]
    }
}

static EN: Strings = Strings {
    from: "Who",
    to: "To whom",
    amount: "How much",
    currency: "Currency",
    person: "Person",
    balance: "Should pay",
    explanation: "Explanation",
    nothing_to_settle: "Nothing to settle",
};

static CS: Strings = Strings {
    from: "Kdo",
    to: "Komu",
    amount: "Kolik",
    currency: "Měna",
    person: "Osoba",
    balance: "Má zaplatit",
    explanation: "Vysvětlení",
    nothing_to_settle: "Není co vyrovnávat",
};
