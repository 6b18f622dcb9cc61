#![doc(test(attr(deny(warnings))))]

//! Finance Core keeps a personal expense ledger: validated records, a
//! search/sort view, budget statistics, and JSON import/export over a
//! throttled key-value store.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Finance Core tracing initialized.");
    });
}
