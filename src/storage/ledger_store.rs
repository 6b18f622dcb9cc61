//! Owner of the canonical in-memory snapshot and its durable copy.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::core::time::Clock;
use crate::errors::{LedgerError, PersistenceError};
use crate::ledger::{LedgerSnapshot, Settings, CURRENT_SCHEMA_VERSION};

use super::{KeyValueStore, ThrottledWriter};

/// Namespaced key the snapshot is stored under.
pub const STORAGE_KEY: &str = "finance_core:data:v1";

/// What happened to a persist request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Parked behind the throttle; `tick` or `flush` will write it.
    Deferred,
}

pub struct LedgerStore {
    backend: Box<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    key: String,
    snapshot: LedgerSnapshot,
    writer: ThrottledWriter,
}

impl LedgerStore {
    /// Reads the persisted snapshot once. Unreadable, corrupt or
    /// newer-schema data is logged and replaced by factory defaults.
    pub fn open(
        backend: Box<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        throttle: std::time::Duration,
    ) -> Self {
        Self::open_with_key(backend, clock, throttle, STORAGE_KEY)
    }

    pub fn open_with_key(
        backend: Box<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        throttle: std::time::Duration,
        key: &str,
    ) -> Self {
        let snapshot = read_snapshot(backend.as_ref(), key);
        Self {
            backend,
            clock,
            key: key.to_string(),
            snapshot,
            writer: ThrottledWriter::new(throttle),
        }
    }

    /// Cached snapshot. Never re-reads the backend.
    pub fn load(&self) -> &LedgerSnapshot {
        &self.snapshot
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Queues the current snapshot for a durable write.
    pub fn persist(&mut self) -> Result<WriteOutcome, PersistenceError> {
        let payload = serde_json::to_string(&self.snapshot)?;
        let now = self.clock.now();
        match self.writer.offer(payload, now) {
            Some(payload) => {
                self.write(&payload)?;
                Ok(WriteOutcome::Written)
            }
            None => {
                debug!("write deferred by throttle");
                Ok(WriteOutcome::Deferred)
            }
        }
    }

    /// Swaps in a whole new snapshot and persists it.
    pub fn replace(&mut self, snapshot: LedgerSnapshot) -> Result<WriteOutcome, PersistenceError> {
        self.snapshot = snapshot;
        self.persist()
    }

    /// Runs `change` against the snapshot and persists when it succeeds.
    /// A failing `change` must leave the snapshot untouched; nothing is
    /// written in that case. A failed write keeps the in-memory change.
    pub fn try_mutate<T, E>(
        &mut self,
        change: impl FnOnce(&mut LedgerSnapshot) -> Result<T, E>,
    ) -> Result<T, LedgerError>
    where
        E: Into<LedgerError>,
    {
        let value = match change(&mut self.snapshot) {
            Ok(value) => value,
            Err(err) => return Err(err.into()),
        };
        self.persist()?;
        Ok(value)
    }

    pub fn mutate_settings<T>(
        &mut self,
        change: impl FnOnce(&mut Settings) -> T,
    ) -> Result<T, PersistenceError> {
        let value = change(&mut self.snapshot.settings);
        self.persist()?;
        Ok(value)
    }

    /// Mutable access without persisting, for view-only state.
    pub(crate) fn snapshot_mut(&mut self) -> &mut LedgerSnapshot {
        &mut self.snapshot
    }

    /// Writes a deferred payload if its interval has elapsed. Returns
    /// whether anything was written.
    pub fn tick(&mut self) -> Result<bool, PersistenceError> {
        match self.writer.take_due(self.clock.now()) {
            Some(payload) => self.write_deferred(payload).map(|_| true),
            None => Ok(false),
        }
    }

    /// Writes any deferred payload immediately.
    pub fn flush(&mut self) -> Result<bool, PersistenceError> {
        match self.writer.take_pending() {
            Some(payload) => self.write_deferred(payload).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn has_pending_write(&self) -> bool {
        self.writer.has_pending()
    }

    /// Resets the durable copy and then memory to factory defaults. The
    /// defaults are written first; on failure neither side changes and any
    /// deferred write stays queued.
    pub fn clear_all(&mut self) -> Result<(), PersistenceError> {
        let defaults = LedgerSnapshot::default();
        let payload = serde_json::to_string(&defaults)?;
        self.write(&payload)?;
        self.writer.discard_pending();
        self.snapshot = defaults;
        info!(key = %self.key, "ledger cleared");
        Ok(())
    }

    fn write_deferred(&mut self, payload: String) -> Result<(), PersistenceError> {
        if let Err(err) = self.write(&payload) {
            warn!(error = %err, "deferred write failed; will retry");
            self.writer.requeue(payload);
            return Err(err);
        }
        Ok(())
    }

    fn write(&mut self, payload: &str) -> Result<(), PersistenceError> {
        match self.backend.set(&self.key, payload) {
            Ok(()) => {
                self.writer.mark_written(self.clock.now());
                Ok(())
            }
            Err(err) => {
                error!(key = %self.key, error = %err, "failed to persist ledger");
                Err(err)
            }
        }
    }
}

impl Drop for LedgerStore {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            warn!(error = %err, "pending ledger write lost on shutdown");
        }
    }
}

fn read_snapshot(backend: &dyn KeyValueStore, key: &str) -> LedgerSnapshot {
    let raw = match backend.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return LedgerSnapshot::default(),
        Err(err) => {
            warn!(key, error = %err, "stored ledger unreadable; starting empty");
            return LedgerSnapshot::default();
        }
    };
    let mut snapshot: LedgerSnapshot = match serde_json::from_str(&raw) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!(key, error = %err, "stored ledger corrupt; starting empty");
            return LedgerSnapshot::default();
        }
    };
    if snapshot.version > CURRENT_SCHEMA_VERSION {
        warn!(
            key,
            version = snapshot.version,
            "stored ledger is newer than supported; starting empty"
        );
        return LedgerSnapshot::default();
    }
    for step in snapshot.migrate() {
        debug!(key, step = %step, "migrated stored ledger");
    }
    snapshot
}
