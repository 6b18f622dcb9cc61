//! Line-oriented shell over [`LedgerManager`](crate::core::ledger_manager::LedgerManager).

pub mod commands;
pub mod core;
pub mod io;
pub mod output;
mod shell;
mod shell_context;

pub use shell::{run_cli, SCRIPT_ENV};
pub use shell_context::{CliMode, ShellContext};
