pub mod json_backend;
pub mod ledger_store;
pub mod memory;
pub mod throttle;

use crate::errors::PersistenceError;

pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Abstraction over string-keyed persistence. Values are opaque text.
pub trait KeyValueStore: Send + Sync {
    /// Returns `Ok(None)` when nothing is stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

pub use json_backend::FileStore;
pub use ledger_store::{LedgerStore, WriteOutcome, STORAGE_KEY};
pub use memory::MemoryStore;
pub use throttle::ThrottledWriter;
