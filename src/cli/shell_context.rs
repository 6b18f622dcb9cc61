use dialoguer::theme::ColorfulTheme;

use crate::core::ledger_manager::LedgerManager;

use super::commands::{self, CommandRegistry};
use super::core::CliError;
use super::output::{self, OutputPreferences};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub manager: LedgerManager,
    pub theme: ColorfulTheme,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    /// Opens the ledger in the default data directory.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let manager = LedgerManager::open(None)?;
        Ok(Self::with_manager(mode, manager))
    }

    pub fn with_manager(mode: CliMode, manager: LedgerManager) -> Self {
        output::set_preferences(OutputPreferences {
            plain: mode == CliMode::Script,
        });
        Self {
            mode,
            registry: CommandRegistry::new(commands::all_definitions()),
            manager,
            theme: ColorfulTheme::default(),
            last_command: None,
            running: true,
        }
    }

    pub fn prompt(&self) -> String {
        format!("finance [{} records]> ", self.manager.records().len())
    }
}
