use crate::cli::core::{usage_error, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::core::query::{highlight, ViewRow};
use crate::ledger::{transaction::DATE_FORMAT, RecordDraft, SortField};

use super::CommandDefinition;

const ADD_USAGE: &str = "add <description> <amount> <category> [date]";
const EDIT_USAGE: &str = "edit <id> <description|amount|category|date> <value>";
const DELETE_USAGE: &str = "delete <id>";
const SEARCH_USAGE: &str = "search [pattern] [--case]";
const SORT_USAGE: &str = "sort <date|amount|description>";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("add", "Record a new expense", ADD_USAGE, cmd_add),
        CommandDefinition::new("edit", "Change one field of a record", EDIT_USAGE, cmd_edit),
        CommandDefinition::new("delete", "Delete a record", DELETE_USAGE, cmd_delete),
        CommandDefinition::new("list", "Show records (current search and sort)", "list", cmd_list),
        CommandDefinition::new("search", "Filter records by pattern", SEARCH_USAGE, cmd_search)
            .with_choices(&["--case"]),
        CommandDefinition::new("sort", "Sort by a field; repeat to flip", SORT_USAGE, cmd_sort)
            .with_choices(&["date", "amount", "description"]),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (description, amount, category, date) = match args {
        [description, amount, category] => (
            *description,
            *amount,
            *category,
            context.manager.today().format(DATE_FORMAT).to_string(),
        ),
        [description, amount, category, date] => {
            (*description, *amount, *category, date.to_string())
        }
        _ => return Err(usage_error(ADD_USAGE)),
    };
    let draft = RecordDraft::new(description, amount, category, date);
    let id = context.manager.add_or_update_record(&draft)?;
    io::print_success(format!("Record added ({}).", short_id(&id)));
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [id, field, value] = args else {
        return Err(usage_error(EDIT_USAGE));
    };
    let id = resolve_id(context, id)?;
    let record = context
        .manager
        .find_record(&id)
        .ok_or_else(|| CommandError::InvalidArguments(format!("no record `{id}`")))?;
    let mut draft = RecordDraft::from_record(record);
    match field.to_lowercase().as_str() {
        "description" => draft.description = value.to_string(),
        "amount" => draft.amount = value.to_string(),
        "category" => draft.category = value.to_string(),
        "date" => draft.date = value.to_string(),
        _ => return Err(usage_error(EDIT_USAGE)),
    }
    context.manager.add_or_update_record(&draft)?;
    io::print_success(format!("Record {} updated.", short_id(&id)));
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [id] = args else {
        return Err(usage_error(DELETE_USAGE));
    };
    let id = resolve_id(context, id)?;
    let description = context
        .manager
        .find_record(&id)
        .map(|record| record.description.clone())
        .unwrap_or_default();
    if !context.confirm(&format!("Delete `{description}`?"))? {
        io::print_info("Nothing deleted.");
        return Ok(());
    }
    context.manager.delete_record(&id)?;
    io::print_success(format!("Deleted `{description}`."));
    Ok(())
}

fn cmd_list(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    print_rows(context, &context.manager.view());
    Ok(())
}

fn cmd_search(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let case_sensitive = args.contains(&"--case");
    let pattern: Vec<&str> = args.iter().copied().filter(|arg| *arg != "--case").collect();
    let text = pattern.join(" ");
    let matching = context
        .manager
        .set_search(Some(text.as_str()), case_sensitive)
        .len();
    if text.is_empty() {
        io::print_info("Search cleared.");
    } else {
        io::print_info(format!("{matching} matching record(s)."));
    }
    print_rows(context, &context.manager.view());
    Ok(())
}

fn cmd_sort(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [field] = args else {
        return Err(usage_error(SORT_USAGE));
    };
    let field: SortField = field.parse().map_err(|_| usage_error(SORT_USAGE))?;
    context.manager.set_sort(field);
    let sort = context.manager.ui().sort;
    io::print_info(format!(
        "Sorted by {} ({}).",
        sort.field.as_str(),
        sort.dir.as_str()
    ));
    print_rows(context, &context.manager.view());
    Ok(())
}

fn print_rows(context: &ShellContext, rows: &[ViewRow<'_>]) {
    let total = context.manager.records().len();
    if rows.is_empty() {
        io::print_info(if total == 0 {
            "No records yet."
        } else {
            "No records match the current search."
        });
        return;
    }
    let (open, close) = output::match_markers();
    let currency = context.manager.settings().base_currency;
    for row in rows {
        let record = row.record;
        output::line(format!(
            "{:<12}  {:<10}  {} {:>10}  {:<14}  {}",
            short_id(&record.id),
            record.date,
            currency,
            highlight(&record.amount_text(), &row.spans.amount, open, close),
            record.category,
            highlight(&record.description, &row.spans.description, open, close),
        ));
    }
    io::print_info(format!("Showing {} of {} record(s).", rows.len(), total));
}

/// Ids are shown shortened; accept an exact id or a unique prefix.
fn resolve_id(context: &ShellContext, input: &str) -> Result<String, CommandError> {
    let records = context.manager.records();
    if records.iter().any(|record| record.id == input) {
        return Ok(input.to_string());
    }
    let matches: Vec<&str> = records
        .iter()
        .map(|record| record.id.as_str())
        .filter(|id| id.starts_with(input))
        .collect();
    match matches.as_slice() {
        [single] => Ok(single.to_string()),
        [] => Err(CommandError::InvalidArguments(format!("no record `{input}`"))),
        _ => Err(CommandError::InvalidArguments(format!(
            "`{input}` matches {} records; use more characters",
            matches.len()
        ))),
    }
}

fn short_id(id: &str) -> &str {
    match id.char_indices().nth(12) {
        Some((cut, _)) if id.starts_with("txn_") => &id[..cut],
        _ => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_trims_generated_ids_only() {
        assert_eq!(short_id("txn_0123456789abcdef"), "txn_01234567");
        assert_eq!(short_id("imported-7"), "imported-7");
    }
}
