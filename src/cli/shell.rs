use std::{
    collections::BTreeMap,
    io::{self, BufRead},
    path::PathBuf,
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use crate::core::errors::CliError;

use super::commands::CommandRegistry;
use super::context::{CliMode, CommandError, LoopControl, ShellContext};
use super::output;

/// Set to any value to read commands from stdin without prompts or colour.
pub const SCRIPT_ENV: &str = "FINANCE_CORE_CLI_SCRIPT";

const HISTORY_FILE: &str = "history.txt";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        colored::control::set_override(false);
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    tracing::debug!(?mode, "shell started");

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

/// One input line after quoting rules are applied.
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Blank,
    Comment,
    Command { name: String, args: Vec<String> },
}

impl Line {
    fn parse(input: &str) -> Result<Self, CommandError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Line::Blank);
        }
        if trimmed.starts_with('#') {
            return Ok(Line::Comment);
        }
        let mut words = shell_words::split(trimmed).map_err(|err| {
            CommandError::InvalidArguments(format!("cannot parse `{}`: {}", trimmed, err))
        })?;
        if words.is_empty() {
            return Ok(Line::Blank);
        }
        let name = words.remove(0);
        Ok(Line::Command { name, args: words })
    }
}

fn execute(context: &mut ShellContext, input: &str) -> Result<LoopControl, CommandError> {
    let Line::Command { name, args } = Line::parse(input)? else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let control = context.dispatch(&name.to_ascii_lowercase(), &name, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<ShellHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(ShellHelper::from_registry(context.registry())));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    let history = context.storage.root().join(HISTORY_FILE);
    if editor.load_history(&history).is_err() {
        tracing::debug!(path = %history.display(), "no shell history yet");
    }

    while context.running {
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    editor.add_history_entry(line.trim()).ok();
                }
                match execute(context, &line) {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(err) => output::error(err),
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm("Exit shell?").unwrap_or(true) {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    save_history(&mut editor, history);
    Ok(())
}

fn save_history(editor: &mut Editor<ShellHelper, DefaultHistory>, path: PathBuf) {
    if let Err(err) = editor.save_history(&path) {
        tracing::warn!(path = %path.display(), error = %err, "shell history not saved");
    }
}

/// Reads stdin to the end or until `exit`. Errors name the offending line and
/// never stop the script.
fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    for (index, line) in io::stdin().lock().lines().enumerate() {
        let line = line?;
        match execute(context, &line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => output::error(format!("line {}: {}", index + 1, err)),
        }
    }
    Ok(())
}

/// Completes command names in the first word and subcommand keywords in the
/// second. Keywords come from each command's usage string.
struct ShellHelper {
    keywords: BTreeMap<&'static str, Vec<&'static str>>,
}

impl ShellHelper {
    fn from_registry(registry: &CommandRegistry) -> Self {
        let keywords = registry
            .iter()
            .map(|definition| (definition.name, subcommands(definition.usage)))
            .collect();
        Self { keywords }
    }

    fn candidates(&self, previous: &[&str], needle: &str) -> Vec<&'static str> {
        let pool: Vec<&'static str> = match previous {
            [] => self.keywords.keys().copied().collect(),
            [command] => self
                .keywords
                .get(command.to_ascii_lowercase().as_str())
                .cloned()
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        let needle = needle.to_ascii_lowercase();
        pool.into_iter()
            .filter(|word| word.starts_with(&needle))
            .collect()
    }
}

/// Keywords of the first alternation group, e.g. `diff`, `categories` and
/// `totals` for `report <diff|categories|totals> <start> <end>`. Placeholders
/// such as `<id>` are skipped.
fn subcommands(usage: &'static str) -> Vec<&'static str> {
    let Some((_, rest)) = usage.split_once(' ') else {
        return Vec::new();
    };
    if !rest.starts_with(['<', '[']) {
        return Vec::new();
    }

    let mut depth = 0usize;
    let mut start = 1;
    let mut alternatives = Vec::new();
    for (idx, ch) in rest.char_indices() {
        match ch {
            '<' | '[' => depth += 1,
            '>' | ']' => {
                depth -= 1;
                if depth == 0 {
                    alternatives.push(&rest[start..idx]);
                    break;
                }
            }
            '|' if depth == 1 => {
                alternatives.push(&rest[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if alternatives.len() < 2 {
        return Vec::new();
    }
    alternatives
        .into_iter()
        .filter_map(|alternative| alternative.split_whitespace().next())
        .filter(|word| word.chars().all(|ch| ch.is_ascii_lowercase()))
        .collect()
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map_or(0, |idx| idx + 1);
        let previous: Vec<&str> = prefix[..start].split_whitespace().collect();
        let pairs = self
            .candidates(&previous, &prefix[start..])
            .into_iter()
            .map(|word| Pair {
                display: word.to_string(),
                replacement: word.to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}
