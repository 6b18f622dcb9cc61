use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::{Config, ConfigManager};
use crate::core::importer::{self, ImportReport};
use crate::core::query::{self, ViewRow};
use crate::core::services::{CategoryService, RecordService, SettingsService, SummaryService};
use crate::core::stats::Stats;
use crate::core::time::{Clock, SystemClock};
use crate::core::validator;
use crate::errors::{FieldErrors, ImportError, LedgerError, PersistenceError};
use crate::ledger::{
    Currency, ExportDocument, LedgerSnapshot, RecordDraft, Settings, SortDirection, SortField,
    SortSpec, TransactionRecord, UiPreferences, CURRENT_SCHEMA_VERSION,
};
use crate::storage::{
    json_backend::save_text_to_path, FileStore, KeyValueStore, LedgerStore, MemoryStore,
};

/// Facade that coordinates ledger state, persistence, and import/export.
/// Every operation the UI layer needs goes through here.
pub struct LedgerManager {
    store: LedgerStore,
    max_import_bytes: u64,
}

impl LedgerManager {
    pub fn new(backend: Box<dyn KeyValueStore>, clock: Arc<dyn Clock>, config: &Config) -> Self {
        Self {
            store: LedgerStore::open(backend, clock, config.save_throttle()),
            max_import_bytes: config.max_import_bytes,
        }
    }

    /// File-backed manager under `base` (or the default data directory),
    /// honouring `config.json` there. An unreadable config means defaults.
    pub fn open(base: Option<PathBuf>) -> Result<Self, LedgerError> {
        let base = crate::core::utils::PathResolver::resolve_base(base);
        let config_manager = ConfigManager::with_base_dir(base.clone())?;
        let config = config_manager.load().unwrap_or_else(|err| {
            warn!(
                path = %config_manager.path().display(),
                error = %err,
                "config unreadable; using defaults"
            );
            Config::default()
        });
        let backend = FileStore::new(Some(base))?;
        Ok(Self::new(Box::new(backend), Arc::new(SystemClock), &config))
    }

    /// Volatile manager with default settings.
    pub fn in_memory() -> Self {
        Self::new(
            Box::new(MemoryStore::new()),
            Arc::new(SystemClock),
            &Config::default(),
        )
    }

    pub fn snapshot(&self) -> &LedgerSnapshot {
        self.store.load()
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.snapshot().records
    }

    pub fn settings(&self) -> &Settings {
        &self.snapshot().settings
    }

    pub fn ui(&self) -> &UiPreferences {
        &self.snapshot().ui
    }

    pub fn find_record(&self, id: &str) -> Option<&TransactionRecord> {
        RecordService::find(self.snapshot(), id)
    }

    pub fn validate_record(&self, draft: &RecordDraft) -> FieldErrors {
        RecordService::check(self.snapshot(), draft)
    }

    /// Validates an untyped candidate such as a decoded form payload.
    pub fn validate_candidate(&self, candidate: &Value) -> FieldErrors {
        validator::validate_value(candidate)
    }

    /// Adds a record, or updates it when `draft.id` is set. Returns its id.
    pub fn add_or_update_record(&mut self, draft: &RecordDraft) -> Result<String, LedgerError> {
        let now = self.store.clock().now();
        self.store
            .try_mutate(|snapshot| RecordService::upsert(snapshot, draft, now))
    }

    pub fn delete_record(&mut self, id: &str) -> Result<TransactionRecord, LedgerError> {
        self.store
            .try_mutate(|snapshot| RecordService::remove(snapshot, id))
    }

    /// Current ordered, filtered rows.
    pub fn view(&self) -> Vec<ViewRow<'_>> {
        query::view(self.records(), self.ui())
    }

    /// Sets or clears the search. A pattern that does not compile leaves the
    /// list unfiltered.
    pub fn set_search(&mut self, text: Option<&str>, case_sensitive: bool) -> Vec<ViewRow<'_>> {
        let ui = &mut self.store.snapshot_mut().ui;
        ui.search = text.filter(|t| !t.is_empty()).map(str::to_string);
        ui.case_sensitive = case_sensitive;
        self.view()
    }

    /// Re-selecting the active field flips direction; a new field starts
    /// ascending.
    pub fn set_sort(&mut self, field: SortField) -> Vec<ViewRow<'_>> {
        let ui = &mut self.store.snapshot_mut().ui;
        ui.sort = if ui.sort.field == field {
            SortSpec {
                field,
                dir: ui.sort.dir.toggled(),
            }
        } else {
            SortSpec {
                field,
                dir: SortDirection::Asc,
            }
        };
        self.view()
    }

    /// Serialized export document (pretty JSON).
    pub fn export_snapshot(&self) -> Result<String, LedgerError> {
        let document = ExportDocument::from_snapshot(self.snapshot(), self.store.clock().now());
        serde_json::to_string_pretty(&document)
            .map_err(|err| LedgerError::Persistence(PersistenceError::from(err)))
    }

    pub fn export_to_path(&self, path: &Path) -> Result<(), LedgerError> {
        let json = self.export_snapshot()?;
        save_text_to_path(path, &json)?;
        info!(path = %path.display(), records = self.records().len(), "ledger exported");
        Ok(())
    }

    /// Replaces all records with the sanitized contents of `text` and merges
    /// its settings. View preferences are kept. On error nothing changes.
    pub fn import_document(&mut self, text: &str) -> Result<ImportReport, LedgerError> {
        let raw = importer::parse_document(text)?;
        let now = self.store.clock().now();
        let current = self.snapshot();
        let sanitized = importer::sanitize_import(&raw, &current.settings, now)?;
        let report = ImportReport::from(&sanitized);

        let mut snapshot = LedgerSnapshot {
            version: CURRENT_SCHEMA_VERSION,
            records: sanitized.records,
            settings: sanitized.settings,
            ui: current.ui.clone(),
        };
        snapshot.migrate();
        self.store.replace(snapshot)?;
        info!(
            accepted = report.accepted,
            discarded = report.discarded,
            "ledger imported"
        );
        Ok(report)
    }

    /// Gates the file by name and size before reading it, then imports it.
    pub fn import_file(&mut self, path: &Path) -> Result<ImportReport, LedgerError> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let size = fs::metadata(path)
            .map_err(|err| ImportError::ReadFailure(err.to_string()))?
            .len();
        importer::check_file(&name, size, self.max_import_bytes)?;
        let bytes = fs::read(path).map_err(|err| ImportError::ReadFailure(err.to_string()))?;
        let text =
            String::from_utf8(bytes).map_err(|err| ImportError::ReadFailure(err.to_string()))?;
        self.import_document(&text)
    }

    pub fn add_category(&mut self, name: &str) -> Result<String, LedgerError> {
        self.store
            .try_mutate(|snapshot| CategoryService::add(snapshot, name))
    }

    pub fn remove_category(&mut self, name: &str) -> Result<(), LedgerError> {
        self.store
            .try_mutate(|snapshot| CategoryService::remove(snapshot, name))
    }

    pub fn set_base_currency(&mut self, currency: Currency) -> Result<(), LedgerError> {
        self.store.try_mutate(|snapshot| {
            SettingsService::set_base_currency(snapshot, currency);
            Ok::<_, LedgerError>(())
        })
    }

    /// Returns the stored (clamped) cap.
    pub fn set_monthly_cap(&mut self, cap: f64) -> Result<f64, LedgerError> {
        self.store
            .try_mutate(|snapshot| SettingsService::set_monthly_cap(snapshot, cap))
    }

    /// Current date according to the manager's clock.
    pub fn today(&self) -> NaiveDate {
        self.store.clock().today()
    }

    pub fn get_stats(&self) -> Stats {
        SummaryService::stats(self.snapshot(), self.store.clock().today())
    }

    /// Factory reset of both memory and durable state.
    pub fn clear_all(&mut self) -> Result<(), LedgerError> {
        self.store.clear_all()?;
        Ok(())
    }

    /// Writes a throttled write now if one is waiting.
    pub fn flush(&mut self) -> Result<bool, LedgerError> {
        Ok(self.store.flush()?)
    }

    /// Writes a throttled write if its interval has elapsed.
    pub fn tick(&mut self) -> Result<bool, LedgerError> {
        Ok(self.store.tick()?)
    }
}
