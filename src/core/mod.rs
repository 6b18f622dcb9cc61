pub mod importer;
pub mod ledger_manager;
pub mod pattern;
pub mod query;
pub mod services;
pub mod stats;
pub mod time;
pub mod utils;
pub mod validator;
