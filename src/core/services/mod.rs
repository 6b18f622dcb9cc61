pub mod category_service;
pub mod record_service;
pub mod settings_service;
pub mod summary_service;

pub use category_service::CategoryService;
pub use record_service::RecordService;
pub use settings_service::SettingsService;
pub use summary_service::SummaryService;

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, LedgerError>;
