use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{category, settings::Settings, transaction::TransactionRecord, Currency};

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Version assumed for documents written before versioning existed.
pub const LEGACY_SCHEMA_VERSION: u32 = 0;

/// Field the view list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Date,
    Amount,
    Description,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Date => "date",
            SortField::Amount => "amount",
            SortField::Description => "description",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "date" => Ok(SortField::Date),
            "amount" => Ok(SortField::Amount),
            "description" => Ok(SortField::Description),
            other => Err(format!("unknown sort field `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub dir: SortDirection,
}

/// View state consumed by the query engine. Never imported from files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UiPreferences {
    #[serde(default)]
    pub sort: SortSpec,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub case_sensitive: bool,
}

/// Everything persisted under the ledger key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default = "LedgerSnapshot::legacy_version")]
    pub version: u32,
    pub records: Vec<TransactionRecord>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub ui: UiPreferences,
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION,
            records: Vec::new(),
            settings: Settings::default(),
            ui: UiPreferences::default(),
        }
    }
}

impl LedgerSnapshot {
    pub fn legacy_version() -> u32 {
        LEGACY_SCHEMA_VERSION
    }

    pub fn record(&self, id: &str) -> Option<&TransactionRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn record_mut(&mut self, id: &str) -> Option<&mut TransactionRecord> {
        self.records.iter_mut().find(|record| record.id == id)
    }

    pub fn remove_record(&mut self, id: &str) -> Option<TransactionRecord> {
        let index = self.records.iter().position(|record| record.id == id)?;
        Some(self.records.remove(index))
    }

    /// Brings an older snapshot up to the current schema. Returns the steps
    /// applied so callers can log them.
    pub fn migrate(&mut self) -> Vec<String> {
        let mut steps = Vec::new();
        if self.version == LEGACY_SCHEMA_VERSION {
            steps.push(format!(
                "stamped legacy snapshot as schema v{CURRENT_SCHEMA_VERSION}"
            ));
            self.version = CURRENT_SCHEMA_VERSION;
        }
        if self.settings.categories.is_empty() {
            category::ensure_defaults(&mut self.settings.categories);
            steps.push("restored default categories".to_string());
        }
        steps
    }
}

/// Settings subset written to export files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSettings {
    pub base_currency: Currency,
    pub monthly_cap: f64,
    pub categories: Vec<String>,
}

/// Shape of a user-facing export. Omits view state and the rate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: u32,
    pub records: Vec<TransactionRecord>,
    pub settings: ExportSettings,
    pub export_date: DateTime<Utc>,
}

impl ExportDocument {
    pub fn from_snapshot(snapshot: &LedgerSnapshot, exported_at: DateTime<Utc>) -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION,
            records: snapshot.records.clone(),
            settings: ExportSettings {
                base_currency: snapshot.settings.base_currency,
                monthly_cap: snapshot.settings.monthly_cap,
                categories: snapshot.settings.categories.clone(),
            },
            export_date: exported_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unversioned_snapshot_reads_as_legacy_and_migrates() {
        let json = r#"{
            "records": [],
            "settings": {"baseCurrency":"USD","monthlyCap":500},
            "ui": {"sort":{"field":"amount","dir":"asc"},"search":null,"caseSensitive":false}
        }"#;
        let mut snapshot: LedgerSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.version, LEGACY_SCHEMA_VERSION);
        assert_eq!(snapshot.ui.sort.field, SortField::Amount);

        let steps = snapshot.migrate();
        assert_eq!(snapshot.version, CURRENT_SCHEMA_VERSION);
        assert_eq!(steps.len(), 2);
        assert_eq!(snapshot.settings.categories.len(), 6);
    }

    #[test]
    fn default_sort_is_newest_first() {
        let ui = UiPreferences::default();
        assert_eq!(ui.sort.field, SortField::Date);
        assert_eq!(ui.sort.dir, SortDirection::Desc);
    }

    #[test]
    fn export_document_omits_ui_and_rates() {
        let snapshot = LedgerSnapshot::default();
        let doc = ExportDocument::from_snapshot(&snapshot, Utc::now());
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("ui").is_none());
        assert!(json["settings"].get("rates").is_none());
        assert!(json.get("exportDate").is_some());
    }
}
