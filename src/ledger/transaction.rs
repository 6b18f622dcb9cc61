use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound for a single record amount.
pub const MAX_AMOUNT: f64 = 999_999.99;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One ledger entry. `date` is kept textual (`YYYY-MM-DD` shape) since the
/// validator and the importer admit strings that are not real calendar days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub date: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransactionRecord {
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Self::generate_id(),
            description: description.into(),
            amount,
            category: category.into(),
            date: date.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Fresh identifier restricted to `[A-Za-z0-9_]`.
    pub fn generate_id() -> String {
        format!("txn_{}", Uuid::new_v4().simple())
    }

    /// Calendar date when `date` names a real day.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }

    /// Amount as shown to search and highlighting (`12`, `12.5`, `0.99`).
    pub fn amount_text(&self) -> String {
        self.amount.to_string()
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Raw form input for a new or edited record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDraft {
    /// `Some` when editing an existing record.
    pub id: Option<String>,
    pub description: String,
    pub amount: String,
    pub category: String,
    pub date: String,
}

impl RecordDraft {
    pub fn new(
        description: impl Into<String>,
        amount: impl Into<String>,
        category: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            description: description.into(),
            amount: amount.into(),
            category: category.into(),
            date: date.into(),
        }
    }

    pub fn editing(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Trims the free-text inputs the way the entry form does before validation.
    pub fn normalized(&self) -> Self {
        Self {
            id: self.id.clone(),
            description: self.description.trim().to_string(),
            amount: self.amount.trim().to_string(),
            category: self.category.clone(),
            date: self.date.clone(),
        }
    }

    /// Draft for editing `record`. Imported amounts may carry more than two
    /// decimals; the draft rounds them to cents so an edit of another field
    /// still validates.
    pub fn from_record(record: &TransactionRecord) -> Self {
        let cents = (record.amount * 100.0).round() / 100.0;
        Self {
            id: Some(record.id.clone()),
            description: record.description.clone(),
            amount: cents.to_string(),
            category: record.category.clone(),
            date: record.date.clone(),
        }
    }
}
