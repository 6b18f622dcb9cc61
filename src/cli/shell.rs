use std::io::{self, BufRead};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use shell_words::split;

use crate::cli::commands::CommandRegistry;
use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output::{info as output_info, warning as output_warning};

/// Environment variable that switches the shell to reading commands from stdin.
pub const SCRIPT_ENV: &str = "FINANCE_CORE_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    output_info("Type `help` for commands, `exit` to quit.");
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    let helper = CommandHelper::new(&context.registry);
    editor.set_helper(Some(helper));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    loop {
        if !context.running {
            break;
        }
        let prompt = context.prompt();
        let line = editor.readline(&prompt);

        match line {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                editor.add_history_entry(trimmed).ok();

                match handle_line(context, trimmed) {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(err) => context.report_error(err)?,
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output_info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    finish(context);
    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !context.running {
            break;
        }
        let line = line?;
        match handle_line(context, &line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    finish(context);
    Ok(())
}

fn finish(context: &mut ShellContext) {
    match context.manager.flush() {
        Ok(_) => {}
        Err(err) => output_warning(format!("Unsaved changes could not be written: {err}")),
    }
}

pub(crate) fn handle_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    let tokens = match split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output_warning(format!("Could not read that line: {err}."));
            return Ok(LoopControl::Continue);
        }
    };

    if tokens.is_empty() {
        return Ok(LoopControl::Continue);
    }

    let raw = &tokens[0];
    let command = raw.to_lowercase();
    let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();

    context.last_command = Some(line.trim().to_string());

    let outcome = context.dispatch(&command, raw, &args);
    context.settle_writes();
    match outcome {
        Ok(LoopControl::Exit) => {
            context.running = false;
            Ok(LoopControl::Exit)
        }
        other => other,
    }
}

/// Tab completion for command names and their fixed first arguments.
struct CommandHelper {
    commands: Vec<(&'static str, &'static [&'static str])>,
}

impl CommandHelper {
    fn new(registry: &CommandRegistry) -> Self {
        Self {
            commands: registry
                .iter()
                .map(|definition| (definition.name, definition.choices))
                .collect(),
        }
    }

    /// Start of the word under the cursor and the words that may complete it.
    fn candidates(&self, head: &str) -> (usize, Vec<&'static str>) {
        let start = head.rfind(char::is_whitespace).map_or(0, |idx| idx + 1);
        let needle = head[start..].to_ascii_lowercase();
        let words: Vec<&str> = head[..start].split_whitespace().collect();

        let options: Vec<&'static str> = match words.as_slice() {
            [] => self.names().collect(),
            [command] if command.eq_ignore_ascii_case("help") => self.names().collect(),
            [command] => self
                .commands
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(command))
                .map(|(_, choices)| choices.to_vec())
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        let matching = options
            .into_iter()
            .filter(|option| option.to_ascii_lowercase().starts_with(&needle))
            .collect();
        (start, matching)
    }

    fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().map(|(name, _)| *name)
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, words) = self.candidates(&line[..pos]);
        let pairs = words
            .into_iter()
            .map(|word| Pair {
                display: word.to_string(),
                replacement: word.to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {}

impl Validator for CommandHelper {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::all_definitions;
    use crate::core::ledger_manager::LedgerManager;

    fn helper() -> CommandHelper {
        CommandHelper::new(&CommandRegistry::new(all_definitions()))
    }

    #[test]
    fn quoted_arguments_stay_together() {
        let tokens = split("add \"Lunch out\" 12.50 Food").unwrap();
        assert_eq!(tokens, ["add", "Lunch out", "12.50", "Food"]);
    }

    #[test]
    fn unbalanced_quotes_leave_state_alone() {
        let mut context = ShellContext::with_manager(CliMode::Script, LedgerManager::in_memory());
        let outcome = handle_line(&mut context, "add \"Lunch 3 Food").unwrap();
        assert_eq!(outcome, LoopControl::Continue);
        assert!(context.manager.records().is_empty());
    }

    #[test]
    fn completes_command_names() {
        assert_eq!(helper().candidates("li"), (0, vec!["list"]));
        assert_eq!(helper().candidates("  ca"), (2, vec!["categories", "category", "cap"]));
    }

    #[test]
    fn completes_first_argument_choices() {
        assert_eq!(helper().candidates("category r"), (9, vec!["rm"]));
        assert_eq!(helper().candidates("sort "), (5, vec!["date", "amount", "description"]));
        assert_eq!(helper().candidates("currency e"), (9, vec!["EUR"]));
        assert_eq!(helper().candidates("help exp"), (5, vec!["export"]));
    }

    #[test]
    fn no_completion_past_the_first_argument() {
        assert!(helper().candidates("category add F").1.is_empty());
        assert!(helper().candidates("list x").1.is_empty());
    }
}
