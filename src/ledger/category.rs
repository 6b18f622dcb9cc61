use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::CategoryError;

/// Categories every fresh ledger starts with.
pub const DEFAULT_CATEGORIES: [&str; 6] =
    ["Food", "Books", "Transport", "Entertainment", "Fees", "Other"];

/// Fallback for imported rows without a category.
pub const FALLBACK_CATEGORY: &str = "Other";

pub const MAX_CATEGORIES: usize = 20;
pub const MAX_CATEGORY_LEN: usize = 30;

static CATEGORY_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9\s-]*$").expect("category name pattern"));

/// Checks a user-entered category name against `existing` and returns the
/// trimmed name to store.
pub fn check_new_category(existing: &[String], name: &str) -> Result<String, CategoryError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CategoryError::Empty);
    }
    if trimmed.chars().count() > MAX_CATEGORY_LEN {
        return Err(CategoryError::TooLong(MAX_CATEGORY_LEN));
    }
    if !CATEGORY_NAME.is_match(trimmed) {
        return Err(CategoryError::Malformed);
    }
    if existing.iter().any(|category| category == trimmed) {
        return Err(CategoryError::Duplicate(trimmed.to_string()));
    }
    if existing.len() >= MAX_CATEGORIES {
        return Err(CategoryError::LimitReached(MAX_CATEGORIES));
    }
    Ok(trimmed.to_string())
}

/// Appends any missing bootstrap category, keeping existing order.
pub fn ensure_defaults(categories: &mut Vec<String>) {
    for default in DEFAULT_CATEGORIES {
        if !categories.iter().any(|c| c == default) {
            categories.push(default.to_string());
        }
    }
}

pub fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}
