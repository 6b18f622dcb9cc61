use crate::cli::core::{usage_error, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::core::services::CategoryService;
use crate::ledger::Currency;

use super::CommandDefinition;

const CATEGORY_USAGE: &str = "category <add|rm> <name>";
const CAP_USAGE: &str = "cap <amount>";
const CURRENCY_USAGE: &str = "currency <USD|EUR|RWF>";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("stats", "Totals, recent spending and budget", "stats", cmd_stats),
        CommandDefinition::new("categories", "List categories and their use", "categories", cmd_categories),
        CommandDefinition::new("category", "Add or remove a category", CATEGORY_USAGE, cmd_category)
            .with_choices(&["add", "rm"]),
        CommandDefinition::new("cap", "Set the monthly spending cap", CAP_USAGE, cmd_cap),
        CommandDefinition::new("currency", "Set the base currency", CURRENCY_USAGE, cmd_currency)
            .with_choices(&["USD", "EUR", "RWF"]),
    ]
}

fn cmd_stats(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let stats = context.manager.get_stats();
    let settings = context.manager.settings();
    output::section("Summary");
    io::print_info(format!("Total spent  : {}", settings.format_money(stats.total)));
    io::print_info(format!("Records      : {}", stats.count));
    io::print_info(format!(
        "Last 7 days  : {} ({} record(s))",
        settings.format_money(stats.recent_total),
        stats.recent_count
    ));
    let (top, top_total) = &stats.top_category;
    io::print_info(format!(
        "Top category : {} ({})",
        top,
        settings.format_money(*top_total)
    ));
    io::print_info(format!(
        "Budget       : {:.1}% of {}",
        stats.budget_percent,
        settings.format_money(settings.monthly_cap)
    ));
    if stats.over_budget {
        io::print_warning(format!(
            "Over budget by {}.",
            settings.format_money(stats.total - settings.monthly_cap)
        ));
    }
    Ok(())
}

fn cmd_categories(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let snapshot = context.manager.snapshot();
    output::section("Categories");
    for name in CategoryService::list(snapshot) {
        let used = CategoryService::usage(snapshot, name);
        output::line(format!("  {name:<30} {used} record(s)"));
    }
    Ok(())
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [action, name @ ..] = args else {
        return Err(usage_error(CATEGORY_USAGE));
    };
    let name = name.join(" ");
    match action.to_lowercase().as_str() {
        "add" => {
            let stored = context.manager.add_category(&name)?;
            io::print_success(format!("Category `{stored}` added."));
        }
        "rm" | "remove" => {
            let used = CategoryService::usage(context.manager.snapshot(), &name);
            context.manager.remove_category(&name)?;
            io::print_success(format!("Category `{name}` removed."));
            if used > 0 {
                io::print_hint(format!("{used} record(s) still use `{name}`."));
            }
        }
        _ => return Err(usage_error(CATEGORY_USAGE)),
    }
    Ok(())
}

fn cmd_cap(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [amount] = args else {
        return Err(usage_error(CAP_USAGE));
    };
    let amount: f64 = amount
        .parse()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid amount `{amount}`")))?;
    let stored = context.manager.set_monthly_cap(amount)?;
    io::print_success(format!(
        "Monthly cap set to {}.",
        context.manager.settings().format_money(stored)
    ));
    Ok(())
}

fn cmd_currency(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [code] = args else {
        return Err(usage_error(CURRENCY_USAGE));
    };
    let currency: Currency = code
        .to_uppercase()
        .parse()
        .map_err(CommandError::InvalidArguments)?;
    context.manager.set_base_currency(currency)?;
    io::print_success(format!("Base currency set to {currency}."));
    Ok(())
}
