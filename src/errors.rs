use std::{collections::BTreeMap, fmt};

use thiserror::Error;

/// Field name to human-readable message. Empty means the candidate passed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Field-level rejection of a record submission. State is left untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Validation failed: {0}")]
pub struct ValidationError(pub FieldErrors);

impl ValidationError {
    pub fn fields(&self) -> &FieldErrors {
        &self.0
    }
}

/// Reasons an import is refused as a whole.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("Invalid file structure: {0}")]
    InvalidStructure(String),
    #[error("No valid records found")]
    NoValidRecords,
    #[error("File too large ({size} bytes, max {limit})")]
    FileTooLarge { size: u64, limit: u64 },
    #[error("Please select a JSON file (got `{0}`)")]
    WrongFileType(String),
    #[error("File read error: {0}")]
    ReadFailure(String),
    #[error("Unsupported document version {0}")]
    UnsupportedVersion(u32),
}

/// Durable write or read failure. In-memory state stays authoritative.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        PersistenceError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Serde(err.to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error("Category name cannot be empty")]
    Empty,
    #[error("Category name too long (max {0} characters)")]
    TooLong(usize),
    #[error(
        "Category name must start with a letter and contain only letters, numbers, spaces, and hyphens"
    )]
    Malformed,
    #[error("Category `{0}` already exists")]
    Duplicate(String),
    #[error("Maximum {0} categories allowed")]
    LimitReached(usize),
    #[error("Category not found: {0}")]
    NotFound(String),
}

/// Error type that captures every recoverable ledger failure.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Import failed: {0}")]
    Import(#[from] ImportError),
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error("Record not found: {0}")]
    RecordNotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_display_in_field_order() {
        let mut errors = FieldErrors::new();
        errors.insert("date", "bad date");
        errors.insert("amount", "bad amount");
        assert_eq!(errors.to_string(), "amount: bad amount; date: bad date");
    }

    #[test]
    fn import_error_converts_into_ledger_error() {
        let err: LedgerError = ImportError::NoValidRecords.into();
        assert_eq!(err.to_string(), "Import failed: No valid records found");
    }
}
