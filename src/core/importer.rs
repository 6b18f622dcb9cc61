//! Untrusted JSON in, trusted ledger contents out.
//!
//! Import applies its own coercion rules rather than the form validator:
//! rows are dropped, stripped, truncated or clamped until they fit, and only
//! a document with no usable rows at all is refused.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::core::utils::truncate_chars;
use crate::errors::ImportError;
use crate::ledger::{
    category::{FALLBACK_CATEGORY, MAX_CATEGORIES, MAX_CATEGORY_LEN},
    transaction::DATE_FORMAT,
    Settings, TransactionRecord, CURRENT_SCHEMA_VERSION, MAX_AMOUNT, MAX_MONTHLY_CAP,
};

/// Largest import file accepted, in bytes.
pub const MAX_IMPORT_BYTES: u64 = 5 * 1024 * 1024;

const MAX_ID_LEN: usize = 50;
const MAX_DESCRIPTION_LEN: usize = 200;
const MAX_RECORD_CATEGORY_LEN: usize = 50;

static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("import date pattern"));

/// Result of a successful sanitation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedLedger {
    pub records: Vec<TransactionRecord>,
    pub settings: Settings,
    /// Rows present in the document that did not make it through.
    pub discarded: usize,
}

/// Outcome announced to the user after a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub accepted: usize,
    pub discarded: usize,
}

impl From<&SanitizedLedger> for ImportReport {
    fn from(ledger: &SanitizedLedger) -> Self {
        Self {
            accepted: ledger.records.len(),
            discarded: ledger.discarded,
        }
    }
}

/// Rejects files by name and size before any content is read.
pub fn check_file(name: &str, size: u64, limit: u64) -> Result<(), ImportError> {
    if !name.ends_with(".json") {
        return Err(ImportError::WrongFileType(name.to_string()));
    }
    if size > limit {
        return Err(ImportError::FileTooLarge { size, limit });
    }
    Ok(())
}

/// Parses document text into an untyped JSON value.
pub fn parse_document(text: &str) -> Result<Value, ImportError> {
    serde_json::from_str(text).map_err(|err| ImportError::InvalidStructure(err.to_string()))
}

/// Produces trusted records and merged settings from an arbitrary JSON value.
///
/// `current` supplies every settings field the document does not validly
/// override. View preferences are never read from the document.
pub fn sanitize_import(
    raw: &Value,
    current: &Settings,
    now: DateTime<Utc>,
) -> Result<SanitizedLedger, ImportError> {
    let document = raw.as_object().ok_or_else(|| {
        ImportError::InvalidStructure("expected a JSON object at the top level".into())
    })?;
    check_version(document)?;
    let rows = document
        .get("records")
        .and_then(Value::as_array)
        .ok_or_else(|| ImportError::InvalidStructure("missing or invalid records array".into()))?;

    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        match sanitize_row(row, now) {
            Some(record) if seen.insert(record.id.clone()) => records.push(record),
            Some(record) => debug!(index, id = %record.id, "dropping row with duplicate id"),
            None => debug!(index, "dropping unusable row"),
        }
    }

    if records.is_empty() {
        return Err(ImportError::NoValidRecords);
    }

    let settings = merge_settings(current, document.get("settings"));
    let discarded = rows.len() - records.len();
    info!(accepted = records.len(), discarded, "import sanitized");
    Ok(SanitizedLedger {
        records,
        settings,
        discarded,
    })
}

fn check_version(document: &Map<String, Value>) -> Result<(), ImportError> {
    match document.get("version") {
        None | Some(Value::Null) => Ok(()),
        Some(value) => {
            let version = value.as_u64().ok_or_else(|| {
                ImportError::InvalidStructure("version must be a non-negative integer".into())
            })?;
            if version > u64::from(CURRENT_SCHEMA_VERSION) {
                return Err(ImportError::UnsupportedVersion(
                    u32::try_from(version).unwrap_or(u32::MAX),
                ));
            }
            Ok(())
        }
    }
}

fn sanitize_row(row: &Value, now: DateTime<Utc>) -> Option<TransactionRecord> {
    let row = row.as_object()?;
    let id = row.get("id").filter(|v| is_truthy(v))?;
    let description = row.get("description").filter(|v| is_truthy(v))?;
    let amount = row.get("amount")?.as_f64()?;
    if amount.is_nan() || amount < 0.0 {
        return None;
    }

    let id: String = truncate_chars(
        &coerce_text(id)
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
            .collect::<String>(),
        MAX_ID_LEN,
    );
    let description = truncate_chars(
        &coerce_text(description)
            .chars()
            .filter(|c| !matches!(c, '<' | '>' | '"' | '\'' | '&'))
            .collect::<String>(),
        MAX_DESCRIPTION_LEN,
    );
    if id.is_empty() || description.is_empty() {
        return None;
    }

    let category = row
        .get("category")
        .filter(|v| is_truthy(v))
        .map(coerce_text)
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string());
    let date = match row.get("date").and_then(Value::as_str) {
        Some(text) if DATE_SHAPE.is_match(text) => text.to_string(),
        _ => now.date_naive().format(DATE_FORMAT).to_string(),
    };
    let created_at = row
        .get("createdAt")
        .and_then(Value::as_str)
        .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
        .map(|stamp| stamp.with_timezone(&Utc))
        .unwrap_or(now);

    Some(TransactionRecord {
        id,
        description,
        amount: amount.min(MAX_AMOUNT),
        category: truncate_chars(&strip_name(&category), MAX_RECORD_CATEGORY_LEN),
        date,
        created_at,
        updated_at: now,
    })
}

fn merge_settings(current: &Settings, incoming: Option<&Value>) -> Settings {
    let mut settings = current.clone();
    let Some(incoming) = incoming.and_then(Value::as_object) else {
        return settings;
    };

    if let Some(code) = incoming.get("baseCurrency").and_then(Value::as_str) {
        match code.parse() {
            Ok(currency) => settings.base_currency = currency,
            Err(reason) => debug!(%reason, "keeping current base currency"),
        }
    }
    if let Some(cap) = incoming.get("monthlyCap").and_then(Value::as_f64) {
        if cap.is_finite() && cap > 0.0 {
            settings.monthly_cap = cap.min(MAX_MONTHLY_CAP);
        }
    }
    if let Some(list) = incoming.get("categories").and_then(Value::as_array) {
        settings.categories = sanitize_categories(list);
    }
    settings
}

fn sanitize_categories(list: &[Value]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for name in list.iter().filter_map(Value::as_str) {
        let cleaned = truncate_chars(&strip_name(name), MAX_CATEGORY_LEN);
        let cleaned = cleaned.trim();
        if cleaned.is_empty() || categories.iter().any(|c| c == cleaned) {
            continue;
        }
        categories.push(cleaned.to_string());
        if categories.len() == MAX_CATEGORIES {
            break;
        }
    }
    categories
}

/// Keeps `[A-Za-z0-9 -]`.
fn strip_name(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-'))
        .collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text form of any JSON value, matching how a browser stringifies it.
fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number
            .as_i64()
            .map(|n| n.to_string())
            .or_else(|| number.as_u64().map(|n| n.to_string()))
            .or_else(|| number.as_f64().map(|n| n.to_string()))
            .unwrap_or_default(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => coerce_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn coerce_text_matches_browser_stringification() {
        assert_eq!(coerce_text(&json!(12)), "12");
        assert_eq!(coerce_text(&json!(12.5)), "12.5");
        assert_eq!(coerce_text(&json!([1, "a", null])), "1,a,");
        assert_eq!(coerce_text(&json!({"a": 1})), "[object Object]");
    }

    #[test]
    fn truthiness_follows_loose_rules() {
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!([])));
    }

    #[test]
    fn numeric_ids_are_stringified() {
        let raw = json!({"records": [{"id": 42, "description": "Tea", "amount": 2}]});
        let result = sanitize_import(&raw, &Settings::default(), now()).unwrap();
        assert_eq!(result.records[0].id, "42");
        assert_eq!(result.records[0].category, "Other");
        assert_eq!(result.records[0].date, "2024-01-10");
    }

    #[test]
    fn rows_reduced_to_empty_are_discarded() {
        let raw = json!({"records": [
            {"id": "!!!", "description": "Tea", "amount": 2},
            {"id": "ok", "description": "<>&", "amount": 2},
            {"id": "keep", "description": "Tea", "amount": 2}
        ]});
        let result = sanitize_import(&raw, &Settings::default(), now()).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.discarded, 2);
    }

    #[test]
    fn later_duplicate_ids_are_dropped() {
        let raw = json!({"records": [
            {"id": "a", "description": "First", "amount": 1},
            {"id": "a", "description": "Second", "amount": 2}
        ]});
        let result = sanitize_import(&raw, &Settings::default(), now()).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].description, "First");
    }

    #[test]
    fn newer_document_versions_are_refused() {
        let raw = json!({"version": 99, "records": []});
        assert_eq!(
            sanitize_import(&raw, &Settings::default(), now()),
            Err(ImportError::UnsupportedVersion(99))
        );
    }

    #[test]
    fn file_gate_checks_extension_then_size() {
        assert!(matches!(
            check_file("data.txt", 10, MAX_IMPORT_BYTES),
            Err(ImportError::WrongFileType(_))
        ));
        assert!(matches!(
            check_file("data.json", MAX_IMPORT_BYTES + 1, MAX_IMPORT_BYTES),
            Err(ImportError::FileTooLarge { .. })
        ));
        assert!(check_file("data.json", MAX_IMPORT_BYTES, MAX_IMPORT_BYTES).is_ok());
    }
}
