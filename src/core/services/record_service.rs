//! Business logic helpers for managing transaction records.

use chrono::{DateTime, Utc};

use crate::core::validator;
use crate::errors::{FieldErrors, LedgerError, ValidationError};
use crate::ledger::{LedgerSnapshot, RecordDraft, TransactionRecord};

use super::ServiceResult;

pub const UNKNOWN_CATEGORY_MESSAGE: &str = "Category must be one of the configured categories";

/// Provides validated create/update/delete helpers for ledger records.
pub struct RecordService;

impl RecordService {
    /// Field errors for `draft` against the snapshot's configured categories.
    pub fn check(snapshot: &LedgerSnapshot, draft: &RecordDraft) -> FieldErrors {
        let draft = draft.normalized();
        let mut errors = validator::validate_draft(&draft);
        if !errors.contains("category")
            && !snapshot.settings.categories.iter().any(|c| *c == draft.category)
        {
            errors.insert("category", UNKNOWN_CATEGORY_MESSAGE);
        }
        errors
    }

    /// Inserts a new record or updates the one named by `draft.id`, returning
    /// the record id. Nothing changes when validation fails.
    pub fn upsert(
        snapshot: &mut LedgerSnapshot,
        draft: &RecordDraft,
        now: DateTime<Utc>,
    ) -> ServiceResult<String> {
        let errors = Self::check(snapshot, draft);
        if !errors.is_empty() {
            return Err(ValidationError(errors).into());
        }
        let draft = draft.normalized();
        let amount: f64 = draft
            .amount
            .parse()
            .map_err(|_| LedgerError::InvalidInput(format!("amount `{}`", draft.amount)))?;

        match draft.id {
            Some(id) => {
                let record = snapshot
                    .record_mut(&id)
                    .ok_or_else(|| LedgerError::RecordNotFound(id.clone()))?;
                record.description = draft.description;
                record.amount = amount;
                record.category = draft.category;
                record.date = draft.date;
                record.touch(now);
                Ok(id)
            }
            None => {
                let record = TransactionRecord::new(
                    draft.description,
                    amount,
                    draft.category,
                    draft.date,
                    now,
                );
                let id = record.id.clone();
                snapshot.records.push(record);
                Ok(id)
            }
        }
    }

    /// Removes the record identified by `id`, returning it.
    pub fn remove(snapshot: &mut LedgerSnapshot, id: &str) -> ServiceResult<TransactionRecord> {
        snapshot
            .remove_record(id)
            .ok_or_else(|| LedgerError::RecordNotFound(id.to_string()))
    }

    pub fn find<'a>(snapshot: &'a LedgerSnapshot, id: &str) -> Option<&'a TransactionRecord> {
        snapshot.record(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validator::DESCRIPTION_MESSAGE;

    fn draft(description: &str, amount: &str, category: &str) -> RecordDraft {
        RecordDraft::new(description, amount, category, "2024-01-05")
    }

    #[test]
    fn upsert_inserts_then_updates() {
        let mut snapshot = LedgerSnapshot::default();
        let now = Utc::now();
        let id = RecordService::upsert(&mut snapshot, &draft("  Lunch ", "12.5", "Food"), now)
            .unwrap();
        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.records[0].description, "Lunch");
        assert!(id.starts_with("txn_"));

        let later = now + chrono::Duration::seconds(5);
        let edit = draft("Dinner", "20", "Food").editing(id.clone());
        RecordService::upsert(&mut snapshot, &edit, later).unwrap();
        let record = RecordService::find(&snapshot, &id).unwrap();
        assert_eq!(record.description, "Dinner");
        assert_eq!(record.amount, 20.0);
        assert_eq!(record.created_at, now);
        assert_eq!(record.updated_at, later);
    }

    #[test]
    fn invalid_draft_leaves_snapshot_untouched() {
        let mut snapshot = LedgerSnapshot::default();
        let err = RecordService::upsert(&mut snapshot, &draft("", "abc", "Food"), Utc::now())
            .unwrap_err();
        match err {
            LedgerError::Validation(ValidationError(fields)) => {
                assert_eq!(fields.get("description"), Some(DESCRIPTION_MESSAGE));
                assert!(fields.contains("amount"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(snapshot.records.is_empty());
    }

    #[test]
    fn category_must_be_configured() {
        let snapshot = LedgerSnapshot::default();
        let errors = RecordService::check(&snapshot, &draft("Rent", "800", "Housing"));
        assert_eq!(errors.get("category"), Some(UNKNOWN_CATEGORY_MESSAGE));
    }

    #[test]
    fn editing_unknown_id_fails() {
        let mut snapshot = LedgerSnapshot::default();
        let edit = draft("Bus", "2", "Transport").editing("txn_missing");
        let err = RecordService::upsert(&mut snapshot, &edit, Utc::now()).unwrap_err();
        assert!(matches!(err, LedgerError::RecordNotFound(ref id) if id == "txn_missing"));
    }

    #[test]
    fn remove_returns_deleted_record() {
        let mut snapshot = LedgerSnapshot::default();
        let id = RecordService::upsert(&mut snapshot, &draft("Tea", "2", "Food"), Utc::now())
            .unwrap();
        let removed = RecordService::remove(&mut snapshot, &id).unwrap();
        assert_eq!(removed.id, id);
        assert!(RecordService::remove(&mut snapshot, &id).is_err());
    }
}
