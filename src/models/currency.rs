use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Alias table and output-label state for one settlement run.
///
/// Some currencies are written with a local symbol instead of the ISO 4217
/// code (e.g. "Kč" for CZK). The symbol is canonicalized before comparison and
/// rate lookup. If the base currency's local symbol shows up in the ledger, the
/// output label switches to it for the rest of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyAliases {
    aliases: HashMap<String, String>,
    native: HashMap<String, String>,
}

impl Default for CurrencyAliases {
    fn default() -> Self {
        Self::new()
            .with_alias("Kč", "CZK", true)
            .with_alias("€", "EUR", true)
            .with_alias("£", "GBP", true)
    }
}

impl CurrencyAliases {
    /// Creates an empty alias table.
    pub fn new() -> Self {
        Self {
            aliases: HashMap::new(),
            native: HashMap::new(),
        }
    }

    /// Registers `alias` as another name for `iso`. When `native` is set the
    /// alias also becomes the local display label of `iso`.
    pub fn with_alias(mut self, alias: &str, iso: &str, native: bool) -> Self {
        let iso = iso.trim().to_ascii_uppercase();
        let alias = alias.trim().to_string();
        if native {
            self.native.insert(iso.clone(), alias.clone());
        }
        self.aliases.insert(alias, iso);
        self
    }

    /// Resolves a currency as written in the ledger to its canonical code.
    pub fn canonical(&self, code: &str) -> String {
        let trimmed = code.trim();
        match self.aliases.get(trimmed) {
            Some(iso) => iso.clone(),
            None => trimmed.to_ascii_uppercase(),
        }
    }

    /// Returns the local symbol designated for an ISO code.
    pub fn native_alias(&self, iso: &str) -> Option<&str> {
        self.native
            .get(&iso.trim().to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Starts tracking the output label for a run settled in `base`.
    pub fn output_label(&self, base: &str) -> OutputCurrency {
        let base = self.canonical(base);
        OutputCurrency {
            native: self.native_alias(&base).map(str::to_string),
            label: base,
            overridden: false,
        }
    }
}

/// The currency label shown on emitted payments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputCurrency {
    label: String,
    native: Option<String>,
    overridden: bool,
}

impl OutputCurrency {
    /// Observes the currency of a bill as written. Returns true if this bill
    /// switched the label to the base currency's local symbol. Sticky.
    pub fn observe(&mut self, raw_code: &str) -> bool {
        if self.overridden {
            return false;
        }
        match &self.native {
            Some(native) if native == raw_code.trim() => {
                self.label = native.clone();
                self.overridden = true;
                true
            }
            _ => false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_overridden(&self) -> bool {
        self.overridden
    }

    pub fn into_label(self) -> String {
        self.label
    }
}
