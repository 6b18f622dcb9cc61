#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use chrono::NaiveDate;
use finance_core::{
    config::Config,
    core::{ledger_manager::LedgerManager, time::ManualClock},
    ledger::RecordDraft,
    storage::MemoryStore,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh data directory that outlives the test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// File-backed manager in its own data directory.
pub fn setup_file_manager() -> (LedgerManager, PathBuf) {
    let base = temp_base();
    let manager = LedgerManager::open(Some(base.clone())).expect("open file-backed manager");
    (manager, base)
}

/// In-memory manager whose clock starts at midnight UTC on `date`.
pub fn manager_at(date: NaiveDate) -> (LedgerManager, MemoryStore, Arc<ManualClock>) {
    let backend = MemoryStore::new();
    let clock = Arc::new(ManualClock::at_date(date));
    let manager = LedgerManager::new(Box::new(backend.clone()), clock.clone(), &Config::default());
    (manager, backend, clock)
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub fn draft(description: &str, amount: &str, category: &str, date: &str) -> RecordDraft {
    RecordDraft::new(description, amount, category, date)
}
