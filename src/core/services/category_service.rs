use crate::errors::CategoryError;
use crate::ledger::{category, LedgerSnapshot};

use super::ServiceResult;

pub struct CategoryService;

impl CategoryService {
    /// Appends a new category and returns the stored (trimmed) name.
    pub fn add(snapshot: &mut LedgerSnapshot, name: &str) -> ServiceResult<String> {
        let name = category::check_new_category(&snapshot.settings.categories, name)?;
        snapshot.settings.categories.push(name.clone());
        Ok(name)
    }

    /// Drops the category from the configured list. Records that use it keep
    /// their category text.
    pub fn remove(snapshot: &mut LedgerSnapshot, name: &str) -> ServiceResult<()> {
        let before = snapshot.settings.categories.len();
        snapshot.settings.categories.retain(|category| category != name);
        if snapshot.settings.categories.len() == before {
            return Err(CategoryError::NotFound(name.to_string()).into());
        }
        Ok(())
    }

    pub fn list(snapshot: &LedgerSnapshot) -> &[String] {
        &snapshot.settings.categories
    }

    /// Number of records filed under `name`.
    pub fn usage(snapshot: &LedgerSnapshot, name: &str) -> usize {
        snapshot
            .records
            .iter()
            .filter(|record| record.category == name)
            .count()
    }
}
