use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;

use crate::core::errors::{EntityKind, LedgerError};
use crate::core::services::{AccountService, AnalyticsService, CategoryService, OperationService};
use crate::domain::{EntryKind, NamedEntity, Operation, OperationDraft};
use crate::ledger::DateRange;
use crate::storage::{import_operations, StorageBackend};
use crate::utils::build_info;

use super::context::{CommandError, CommandResult, ShellContext};
use super::output;

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
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
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "account",
            "Create, rename, delete, and inspect accounts",
            "account <add <name> [id]|rename <id> <name>|delete <id>|list|show <id>>",
            cmd_account,
        ),
        CommandDefinition::new(
            "category",
            "Manage income and expense categories",
            "category <add <income|expense> <name> [id]|rename <id> <name>|delete <id>|list>",
            cmd_category,
        ),
        CommandDefinition::new(
            "op",
            "Record, delete, or list operations",
            "op <add <income|expense> <account> <amount> <date> <category> [description]|delete <id>|list [account]>",
            cmd_operation,
        ),
        CommandDefinition::new(
            "recompute",
            "Rebuild balances from stored operations",
            "recompute [<account>|all]",
            cmd_recompute,
        ),
        CommandDefinition::new(
            "report",
            "Income/expense analytics for a date range",
            "report <diff|categories|totals> <start> <end>",
            cmd_report,
        ),
        CommandDefinition::new(
            "check",
            "List dangling references and balance drift",
            "check",
            cmd_check,
        ),
        CommandDefinition::new("save", "Save the current book", "save [name]", cmd_save),
        CommandDefinition::new("load", "Load a saved book", "load <name>", cmd_load),
        CommandDefinition::new("books", "List saved books", "books", cmd_books),
        CommandDefinition::new(
            "import",
            "Record operations from a JSON file",
            "import <path>",
            cmd_import,
        ),
        CommandDefinition::new("version", "Show build information", "version", cmd_version),
        CommandDefinition::new("help", "Show available commands", "help [command]", cmd_help),
        CommandDefinition::new("exit", "Leave the shell", "exit", cmd_exit),
    ]
}

fn usage(context: &ShellContext, command: &str) -> CommandError {
    let usage = context
        .registry()
        .get(command)
        .map(|definition| definition.usage)
        .unwrap_or(command);
    CommandError::InvalidArguments(format!("usage: {}", usage))
}

fn cmd_account(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        ["add", name] => {
            let account = AccountService::create(&mut context.book, None, name)?;
            output::success(format!("Account {} `{}` created.", account.id, account.name));
            Ok(())
        }
        ["add", name, id] => {
            let account = AccountService::create(&mut context.book, Some(parse_id(id)?), name)?;
            output::success(format!("Account {} `{}` created.", account.id, account.name));
            Ok(())
        }
        ["rename", id, name] => {
            let id = parse_id(id)?;
            AccountService::rename(&mut context.book, id, name)?;
            output::success(format!("Account {} renamed to `{}`.", id, name.trim()));
            Ok(())
        }
        ["delete", id] => {
            let id = parse_id(id)?;
            if !context.confirm(&format!("Delete account {}?", id))? {
                output::info("Operation cancelled.");
                return Ok(());
            }
            match AccountService::delete(&mut context.book, id) {
                Some(account) => {
                    output::success(format!("Account {} `{}` deleted.", id, account.name));
                    let dangling = context.book.ledger.operations_for(id).count();
                    if dangling > 0 {
                        output::warning(format!(
                            "{} operation(s) still reference account {}.",
                            dangling, id
                        ));
                    }
                }
                None => output::warning(format!("Account {} does not exist.", id)),
            }
            Ok(())
        }
        ["list"] => {
            let context = &*context;
            let rows = AccountService::list(&context.book)
                .into_iter()
                .map(|account| {
                    vec![
                        account.id.to_string(),
                        account.name.clone(),
                        context.amount(account.balance()),
                    ]
                })
                .collect::<Vec<_>>();
            output::print_table(&["ID", "Name", "Balance"], &rows);
            Ok(())
        }
        ["show", id] => {
            let id = parse_id(id)?;
            let context = &*context;
            let account = AccountService::get(&context.book, id)
                .ok_or_else(|| LedgerError::not_found(EntityKind::Account, id))?;
            output::section(account.name());
            output::info(format!("Balance: {}", context.amount(account.balance())));
            let rows = context
                .book
                .ledger
                .operations_for(id)
                .map(|operation| operation_row(context, operation))
                .collect::<Vec<_>>();
            output::print_table(OPERATION_HEADERS, &rows);
            Ok(())
        }
        _ => Err(usage(context, "account")),
    }
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        ["add", kind, name] | ["add", kind, name, _] => {
            let kind = parse_kind(kind)?;
            let id = match args.get(3) {
                Some(raw) => Some(parse_id(raw)?),
                None => None,
            };
            let category = CategoryService::create(&mut context.book, id, kind, name)?;
            output::success(format!(
                "Category {} `{}` ({}) created.",
                category.id, category.name, category.kind
            ));
            Ok(())
        }
        ["rename", id, name] => {
            let id = parse_id(id)?;
            CategoryService::rename(&mut context.book, id, name)?;
            output::success(format!("Category {} renamed to `{}`.", id, name.trim()));
            Ok(())
        }
        ["delete", id] => {
            let id = parse_id(id)?;
            if !context.confirm(&format!("Delete category {}?", id))? {
                output::info("Operation cancelled.");
                return Ok(());
            }
            match CategoryService::delete(&mut context.book, id) {
                Some(category) => {
                    output::success(format!("Category {} `{}` deleted.", id, category.name))
                }
                None => output::warning(format!("Category {} does not exist.", id)),
            }
            Ok(())
        }
        ["list"] => {
            let rows = CategoryService::list(&context.book)
                .into_iter()
                .map(|category| {
                    vec![
                        category.id.to_string(),
                        category.kind.to_string(),
                        category.name.clone(),
                    ]
                })
                .collect::<Vec<_>>();
            output::print_table(&["ID", "Kind", "Name"], &rows);
            Ok(())
        }
        _ => Err(usage(context, "category")),
    }
}

const OPERATION_HEADERS: &[&str] = &[
    "ID",
    "Date",
    "Kind",
    "Account",
    "Category",
    "Amount",
    "Description",
];

fn operation_row(context: &ShellContext, operation: &Operation) -> Vec<String> {
    vec![
        operation.id.to_string(),
        operation.date.format(&context.config.date_format).to_string(),
        operation.kind.to_string(),
        operation.account_id.to_string(),
        operation.category_id.to_string(),
        context.amount(operation.signed_amount()),
        operation.description.clone(),
    ]
}

fn cmd_operation(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        ["add", kind, account, amount, date, category, description @ ..] => {
            let draft = OperationDraft::new(
                parse_kind(kind)?,
                parse_id(account)?,
                parse_amount(amount)?,
                parse_date(date)?,
                parse_id(category)?,
            )
            .with_description(description.join(" "));
            let recorded = OperationService::record(&mut context.book, draft)?;
            output::success(format!(
                "Operation {} recorded ({}).",
                recorded.operation.id,
                context.amount(recorded.operation.signed_amount())
            ));
            if let Some(orphan) = recorded.orphaned {
                output::warning(format!("{}; balance not adjusted.", orphan));
            }
            Ok(())
        }
        ["delete", id] => {
            let id = parse_id(id)?;
            let was_posted = context
                .book
                .ledger
                .operation(id)
                .is_some_and(|operation| operation.is_posted());
            let removed = OperationService::delete(&mut context.book, id)?;
            if was_posted && context.book.accounts().contains(removed.account_id) {
                output::success(format!(
                    "Operation {} deleted; account {} adjusted.",
                    removed.id, removed.account_id
                ));
            } else {
                output::success(format!(
                    "Operation {} deleted; no balance changed.",
                    removed.id
                ));
            }
            Ok(())
        }
        ["list"] => {
            let context = &*context;
            let rows = OperationService::list(&context.book)
                .into_iter()
                .map(|operation| operation_row(context, operation))
                .collect::<Vec<_>>();
            output::print_table(OPERATION_HEADERS, &rows);
            Ok(())
        }
        ["list", account] => {
            let account = parse_id(account)?;
            let context = &*context;
            let rows = context
                .book
                .ledger
                .operations_for(account)
                .map(|operation| operation_row(context, operation))
                .collect::<Vec<_>>();
            output::print_table(OPERATION_HEADERS, &rows);
            Ok(())
        }
        _ => Err(usage(context, "op")),
    }
}

fn cmd_recompute(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["all"] => {
            let repaired = OperationService::recompute_all(&mut context.book);
            output::success(format!("Recomputed all accounts; {} balance(s) repaired.", repaired));
            Ok(())
        }
        [id] => {
            let id = parse_id(id)?;
            let balance = OperationService::recompute(&mut context.book, id)?;
            output::success(format!(
                "Account {} balance is {}.",
                id,
                context.amount(balance)
            ));
            Ok(())
        }
        _ => Err(usage(context, "recompute")),
    }
}

fn cmd_report(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [report, start, end] = args else {
        return Err(usage(context, "report"));
    };
    let range = DateRange::new(parse_date(start)?, parse_date(end)?);
    match *report {
        "diff" => {
            let difference = AnalyticsService::income_expense_difference(&context.book, range)?;
            output::info(format!("Income minus expense: {}", context.amount(difference)));
        }
        "categories" => {
            let context = &*context;
            let rows = AnalyticsService::group_by_category(&context.book, range)?
                .into_iter()
                .map(|(id, total)| {
                    let name = context
                        .book
                        .categories
                        .get(id)
                        .map(|category| category.name.clone())
                        .unwrap_or_else(|| "(unknown)".into());
                    vec![id.to_string(), name, context.amount(total)]
                })
                .collect::<Vec<_>>();
            output::print_table(&["ID", "Category", "Total"], &rows);
        }
        "totals" => {
            let totals = AnalyticsService::totals(&context.book, range)?;
            output::info(format!("Income:  {}", context.amount(totals.income)));
            output::info(format!("Expense: {}", context.amount(totals.expense)));
            output::info(format!("Net:     {}", context.amount(totals.net)));
        }
        _ => return Err(usage(context, "report")),
    }
    Ok(())
}

fn cmd_check(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let warnings = context.book.warnings();
    if warnings.is_empty() {
        output::success("Book is consistent.");
    } else {
        for warning in warnings {
            output::warning(warning);
        }
    }
    Ok(())
}

fn cmd_save(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = match args {
        [name] => name.to_string(),
        [] => context
            .book_name
            .clone()
            .unwrap_or_else(|| context.book.name.clone()),
        _ => return Err(usage(context, "save")),
    };
    context.book.name = name.clone();
    let path = context.storage.save(&context.book, &name)?;
    context.remember_book(&name)?;
    output::success(format!("Book `{}` saved to {}.", name, path.display()));
    Ok(())
}

fn cmd_load(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name] = args else {
        return Err(usage(context, "load"));
    };
    let book = context.storage.load(name)?;
    let warnings = book.warnings();
    context.book = book;
    context.remember_book(name)?;
    output::success(format!("Book `{}` loaded.", name));
    if !warnings.is_empty() {
        output::warning(format!(
            "{} consistency warning(s); run `check` for details.",
            warnings.len()
        ));
    }
    Ok(())
}

fn cmd_books(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let names = context.storage.list()?;
    if names.is_empty() {
        output::info("No saved books.");
        return Ok(());
    }
    for name in names {
        output::info(name);
    }
    Ok(())
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [path] = args else {
        return Err(usage(context, "import"));
    };
    let drafts = import_operations(Path::new(path))?;
    let report = OperationService::import(&mut context.book, drafts)?;
    output::success(format!("Imported {} operation(s).", report.recorded.len()));
    for orphan in &report.orphaned {
        output::warning(orphan);
    }
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info(build_info::current().summary());
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let [name] = args {
        let definition = context.registry().get(name).ok_or_else(|| {
            CommandError::InvalidArguments(format!("unknown command `{}`", name))
        })?;
        output::info(format!("{}: {}", definition.name, definition.description));
        output::info(format!("usage: {}", definition.usage));
        return Ok(());
    }
    output::section("Commands");
    let rows = context
        .registry()
        .iter()
        .map(|definition| vec![definition.name.to_string(), definition.description.to_string()])
        .collect::<Vec<_>>();
    output::print_table(&["Command", "Description"], &rows);
    Ok(())
}

fn cmd_exit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.running = false;
    Ok(())
}

fn parse_id(raw: &str) -> Result<u64, CommandError> {
    raw.parse::<u64>()
        .map_err(|_| CommandError::InvalidArguments(format!("`{}` is not a valid id", raw)))
}

fn parse_amount(raw: &str) -> Result<i64, CommandError> {
    raw.parse::<i64>()
        .map_err(|_| CommandError::InvalidArguments(format!("`{}` is not a valid amount", raw)))
}

fn parse_kind(raw: &str) -> Result<EntryKind, CommandError> {
    Ok(raw.parse::<EntryKind>()?)
}

/// Accepts ISO dates and the day-first `dd.mm.yyyy` form.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d.%m.%Y"))
        .map_err(|_| {
            CommandError::InvalidArguments(format!(
                "`{}` is not a date (use YYYY-MM-DD or dd.mm.yyyy)",
                raw
            ))
        })
}
