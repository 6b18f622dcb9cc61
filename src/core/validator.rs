//! Field-level checks for record submissions. Validation only inspects; it
//! never rewrites the candidate.
//!
//! The date rule is a shape check: month 01-12 and day 01-31 are checked per
//! component, so `2024-02-30` passes here even though it names no real day.
//! Statistics treat such dates as unparseable.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::errors::FieldErrors;
use crate::ledger::{RecordDraft, MAX_AMOUNT};

static DESCRIPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\S(?:.*\S)?$").expect("description pattern"));
static AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0|[1-9][0-9]*)(\.[0-9]{1,2})?$").expect("amount pattern"));
static DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01])$").expect("date pattern")
});
static CATEGORY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]+(?:[ -][A-Za-z]+)*$").expect("category pattern"));

pub const DESCRIPTION_MESSAGE: &str = "Description must be non-empty and not just whitespace";
pub const DUPLICATE_WORDS_MESSAGE: &str = "Duplicate consecutive words not allowed";
pub const AMOUNT_MESSAGE: &str =
    "Amount must be a valid positive number with up to 2 decimal places";
pub const AMOUNT_RANGE_MESSAGE: &str = "Amount must not exceed 999999.99";
pub const DATE_MESSAGE: &str = "Date must be in YYYY-MM-DD format";
pub const CATEGORY_MESSAGE: &str = "Category must contain only letters, spaces, and hyphens";
pub const GENERAL_MESSAGE: &str = "Invalid record format";

/// Validates a typed draft. An empty result means the draft is valid.
pub fn validate_draft(draft: &RecordDraft) -> FieldErrors {
    check_fields(
        Some(&draft.description),
        Some(&draft.amount),
        Some(&draft.date),
        Some(&draft.category),
    )
}

/// Validates an untyped candidate, e.g. a form payload decoded from JSON.
/// Anything other than an object yields a single `general` error.
pub fn validate_value(candidate: &Value) -> FieldErrors {
    let Some(object) = candidate.as_object() else {
        let mut errors = FieldErrors::new();
        errors.insert("general", GENERAL_MESSAGE);
        return errors;
    };
    let field = |name: &str| object.get(name).and_then(scalar_text);
    check_fields(
        field("description").as_deref(),
        field("amount").as_deref(),
        field("date").as_deref(),
        field("category").as_deref(),
    )
}

fn check_fields(
    description: Option<&str>,
    amount: Option<&str>,
    date: Option<&str>,
    category: Option<&str>,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    match description {
        Some(text) if !text.is_empty() => {
            if !DESCRIPTION.is_match(text) {
                errors.insert("description", DESCRIPTION_MESSAGE);
            }
            if has_repeated_word(text) {
                errors.insert("description", DUPLICATE_WORDS_MESSAGE);
            }
        }
        _ => errors.insert("description", DESCRIPTION_MESSAGE),
    }

    match amount {
        Some(text) if AMOUNT.is_match(text) => {
            if text.parse::<f64>().map_or(true, |value| value > MAX_AMOUNT) {
                errors.insert("amount", AMOUNT_RANGE_MESSAGE);
            }
        }
        _ => errors.insert("amount", AMOUNT_MESSAGE),
    }

    if !date.is_some_and(|text| DATE.is_match(text)) {
        errors.insert("date", DATE_MESSAGE);
    }

    if !category.is_some_and(|text| CATEGORY.is_match(text)) {
        errors.insert("category", CATEGORY_MESSAGE);
    }

    errors
}

/// Text form of a JSON scalar; `null`, arrays and objects count as missing.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// True when a word is immediately repeated ("the the"). Words are runs of
/// `[A-Za-z0-9_]`; the separator between the pair must be whitespace only.
pub fn has_repeated_word(text: &str) -> bool {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let mut previous: Option<&str> = None;
    let mut rest = text;

    while !rest.is_empty() {
        let word_start = match rest.find(is_word) {
            Some(index) => index,
            None => break,
        };
        let gap = &rest[..word_start];
        if !gap.is_empty() && !gap.chars().all(char::is_whitespace) {
            previous = None;
        }
        let after_gap = &rest[word_start..];
        let word_len = after_gap.find(|c: char| !is_word(c)).unwrap_or(after_gap.len());
        let word = &after_gap[..word_len];

        if let Some(prev) = previous {
            if !gap.is_empty() && prev == word {
                return true;
            }
        }
        previous = Some(word);
        rest = &after_gap[word_len..];
    }
    false
}
