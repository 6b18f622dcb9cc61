use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::category::default_categories;

pub const DEFAULT_MONTHLY_CAP: f64 = 500.0;
pub const MAX_MONTHLY_CAP: f64 = 999_999.0;

/// Fixed set of base currencies the ledger can report in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    RWF,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::USD, Currency::EUR, Currency::RWF];

    pub fn code(self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::RWF => "RWF",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|currency| currency.code() == s)
            .ok_or_else(|| format!("unsupported currency `{s}`"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub base_currency: Currency,
    /// Opaque conversion table; carried along, never validated.
    #[serde(default = "Settings::default_rates")]
    pub rates: BTreeMap<String, f64>,
    pub monthly_cap: f64,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_currency: Currency::default(),
            rates: Self::default_rates(),
            monthly_cap: DEFAULT_MONTHLY_CAP,
            categories: default_categories(),
        }
    }
}

impl Settings {
    pub fn default_rates() -> BTreeMap<String, f64> {
        BTreeMap::from([("RWF".to_string(), 1200.0), ("EUR".to_string(), 0.92)])
    }

    /// Formats an amount with the base currency code, two decimals.
    pub fn format_money(&self, amount: f64) -> String {
        format!("{} {:.2}", self.base_currency, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_parses_only_known_codes() {
        assert_eq!("EUR".parse::<Currency>(), Ok(Currency::EUR));
        assert!("eur".parse::<Currency>().is_err());
        assert!("GBP".parse::<Currency>().is_err());
    }

    #[test]
    fn settings_without_rates_get_defaults() {
        let json = r#"{"baseCurrency":"RWF","monthlyCap":750,"categories":["Food"]}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.base_currency, Currency::RWF);
        assert_eq!(settings.rates.get("EUR"), Some(&0.92));
    }

    #[test]
    fn money_formatting_uses_base_currency() {
        let settings = Settings::default();
        assert_eq!(settings.format_money(12.5), "USD 12.50");
    }
}
