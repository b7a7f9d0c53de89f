use crate::error::{AppError, Result};
use crate::observability::{LogConfig, LogFormat};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub settlement: SettlementSettings,
    #[serde(default)]
    pub exchange: ExchangeSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SettlementSettings {
    pub base_currency: String,
    pub language: String,
    pub explain: bool,
    pub decimal_places: u32,
    pub people: Vec<String>,
}

impl Default for SettlementSettings {
    fn default() -> Self {
        Self {
            base_currency: "CZK".to_string(),
            language: "en".to_string(),
            explain: true,
            decimal_places: 2,
            people: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExchangeSettings {
    pub max_attempts: u32,
    pub timeout_ms: u64,
    pub backoff_ms: u64,
    /// Units of the base currency per unit of the keyed currency.
    pub rates: HashMap<String, Decimal>,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout_ms: 5000,
            backoff_ms: 200,
            rates: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
    pub include_file: bool,
    pub include_line: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            include_file: false,
            include_line: false,
        }
    }
}

impl LoggingSettings {
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            level: self.level.clone(),
            format: LogFormat::from(self.format.as_str()),
            include_file: self.include_file,
            include_line: self.include_line,
            ..LogConfig::default()
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("SPLITBILL").separator("__"));

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Per-invocation options taken from the settlement section.
    pub fn split_options(&self) -> SplitOptions {
        SplitOptions {
            base_currency: self.settlement.base_currency.clone(),
            language: self.settlement.language.clone(),
            explain: self.settlement.explain,
            decimal_places: self.settlement.decimal_places,
            people: self.settlement.people.clone(),
        }
    }
}

/// Options for one settlement run. All fields have defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SplitOptions {
    #[validate(length(min = 1, message = "base currency cannot be empty"))]
    pub base_currency: String,
    /// Checked separately; an unknown value becomes a message, not an error.
    pub language: String,
    pub explain: bool,
    #[validate(range(max = 10, message = "decimal places must be at most 10"))]
    pub decimal_places: u32,
    /// Roster for the `All`/`AllBut` shortcuts. Empty means everyone named.
    pub people: Vec<String>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Settings::default().split_options()
    }
}

impl SplitOptions {
    pub fn with_base_currency(mut self, base_currency: &str) -> Self {
        self.base_currency = base_currency.to_string();
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn with_explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    pub fn with_people(mut self, people: &[&str]) -> Self {
        self.people = people.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if self.base_currency.trim().is_empty() {
            return Err(AppError::Validation(
                "base currency cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = SplitOptions::default();
        assert_eq!(options.base_currency, "CZK");
        assert_eq!(options.language, "en");
        assert!(options.explain);
        assert_eq!(options.decimal_places, 2);
        assert!(options.people.is_empty());
    }

    #[test]
    fn test_options_validation() {
        assert!(SplitOptions::default().check().is_ok());
        assert!(SplitOptions::default()
            .with_base_currency("")
            .check()
            .is_err());
        assert!(SplitOptions::default()
            .with_base_currency("   ")
            .check()
            .is_err());

        let options = SplitOptions {
            decimal_places: 11,
            ..SplitOptions::default()
        };
        assert!(matches!(options.check(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: SplitOptions =
            serde_json::from_str(r#"{"base_currency": "EUR", "explain": false}"#).unwrap();
        assert_eq!(options.base_currency, "EUR");
        assert!(!options.explain);
        assert_eq!(options.language, "en");
    }

    #[test]
    fn test_logging_settings_to_log_config() {
        let settings = LoggingSettings {
            level: "debug".to_string(),
            format: "json".to_string(),
            include_file: true,
            include_line: false,
        };
        let config = settings.to_log_config();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.include_file);
        assert!(!config.include_line);
        assert!(config.include_target);
    }
}
