//! Ledger data model: records, settings, view preferences, and the
//! serializable snapshot that ties them together.

pub mod category;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod settings;
pub mod transaction;

pub use category::{DEFAULT_CATEGORIES, MAX_CATEGORIES, MAX_CATEGORY_LEN};
pub use ledger::{
    ExportDocument, ExportSettings, LedgerSnapshot, SortDirection, SortField, SortSpec,
    UiPreferences, CURRENT_SCHEMA_VERSION,
};
pub use settings::{Currency, Settings, MAX_MONTHLY_CAP};
pub use transaction::{RecordDraft, TransactionRecord, MAX_AMOUNT};
