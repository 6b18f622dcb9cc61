use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;

use super::{CommandDefinition, CommandRegistry};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("help", "Show available commands", "help [command]", cmd_help),
        CommandDefinition::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(command) = args.first().map(|name| name.to_lowercase()) {
        match context.command(&command) {
            Some(definition) => print_command(definition),
            None => context.suggest_command(args[0]),
        }
        return Ok(());
    }
    print_overview(&context.registry);
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}

fn print_overview(registry: &CommandRegistry) {
    output::section("Commands");
    for definition in registry.iter() {
        output::line(format!("  {:<12} {}", definition.name, definition.description));
    }
}

fn print_command(definition: &CommandDefinition) {
    output::section(definition.name);
    output::line(format!("  {}", definition.description));
    output::line(format!("  usage: {}", definition.usage));
}
