use std::path::Path;

use crate::cli::core::{usage_error, CommandResult, ShellContext};
use crate::cli::io;

use super::CommandDefinition;

const EXPORT_USAGE: &str = "export <path.json>";
const IMPORT_USAGE: &str = "import <path.json>";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("export", "Write all records to a JSON file", EXPORT_USAGE, cmd_export),
        CommandDefinition::new("import", "Replace records with a JSON file", IMPORT_USAGE, cmd_import),
        CommandDefinition::new("clear", "Erase all data and restore defaults", "clear", cmd_clear),
    ]
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [path] = args else {
        return Err(usage_error(EXPORT_USAGE));
    };
    context.manager.export_to_path(Path::new(path))?;
    io::print_success(format!(
        "Exported {} record(s) to {}.",
        context.manager.records().len(),
        path
    ));
    Ok(())
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [path] = args else {
        return Err(usage_error(IMPORT_USAGE));
    };
    if !context.manager.records().is_empty()
        && !context.confirm("Importing replaces all current records. Continue?")?
    {
        io::print_info("Import cancelled.");
        return Ok(());
    }
    let report = context.manager.import_file(Path::new(path))?;
    io::print_success(format!("Imported {} record(s).", report.accepted));
    if report.discarded > 0 {
        io::print_warning(format!(
            "Skipped {} unusable record(s).",
            report.discarded
        ));
    }
    Ok(())
}

fn cmd_clear(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if !context.confirm("Erase all records and settings?")? {
        io::print_info("Nothing cleared.");
        return Ok(());
    }
    context.manager.clear_all()?;
    io::print_success("All data cleared.");
    Ok(())
}
