pub mod records;
pub mod settings;
pub mod system;
pub mod transfer;

use crate::cli::core::{CommandResult, ShellContext};

/// Every shell command, in the order `help` lists them.
pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(records::definitions());
    commands.extend(settings::definitions());
    commands.extend(transfer::definitions());
    commands.extend(system::definitions());
    commands
}

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// A shell command. `choices` lists the fixed words its first argument
/// accepts, offered by tab completion.
#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
    pub choices: &'static [&'static str],
}

impl CommandDefinition {
    pub fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
            choices: &[],
        }
    }

    pub fn with_choices(self, choices: &'static [&'static str]) -> Self {
        Self { choices, ..self }
    }
}

/// Ordered command table. Lookups ignore ASCII case.
pub struct CommandRegistry {
    commands: Vec<CommandDefinition>,
}

impl CommandRegistry {
    pub fn new(commands: Vec<CommandDefinition>) -> Self {
        Self { commands }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands
            .iter()
            .find(|definition| definition.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.commands.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().map(|definition| definition.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_keeps_help_order() {
        let registry = CommandRegistry::new(all_definitions());
        assert_eq!(registry.get("LIST").map(|d| d.name), Some("list"));
        assert!(registry.get("lst").is_none());
        assert_eq!(registry.names().next(), Some("add"));
        assert_eq!(registry.names().last(), Some("exit"));
    }

    #[test]
    fn argument_choices_are_registered() {
        let registry = CommandRegistry::new(all_definitions());
        let choices = |name| registry.get(name).map(|d| d.choices).unwrap_or_default();
        assert_eq!(choices("category"), ["add", "rm"]);
        assert_eq!(choices("sort"), ["date", "amount", "description"]);
        assert!(choices("list").is_empty());
    }
}
