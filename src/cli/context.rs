//! Shell state shared by all command handlers.

use dialoguer::{theme::ColorfulTheme, Confirm};
use strsim::levenshtein;
use thiserror::Error;

use crate::{
    config::{Config, ConfigManager},
    core::{
        errors::{CliError, LedgerError},
        utils::PathResolver,
    },
    ledger::Book,
    storage::{JsonStorage, StorageBackend},
};

use super::commands::{self, CommandRegistry};
use super::output;

const UNTITLED: &str = "untitled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
}

pub type CommandResult = Result<(), CommandError>;

pub struct ShellContext {
    pub mode: CliMode,
    pub book: Book,
    pub book_name: Option<String>,
    pub config: Config,
    pub(crate) storage: JsonStorage,
    config_manager: ConfigManager,
    registry: CommandRegistry,
    pub(crate) running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let base = PathResolver::base_dir();
        let storage = JsonStorage::new(Some(base.clone()))?;
        let config_manager = ConfigManager::with_base_dir(base)?;
        let config = config_manager.load()?;

        let mut context = Self {
            mode,
            book: Book::new(UNTITLED),
            book_name: None,
            config,
            storage,
            config_manager,
            registry: CommandRegistry::new(commands::definitions()),
            running: true,
        };
        context.auto_load_last();
        Ok(context)
    }

    fn auto_load_last(&mut self) {
        if self.mode != CliMode::Interactive {
            return;
        }
        let Some(name) = self.config.last_opened_book.clone() else {
            return;
        };
        if let Ok(book) = self.storage.load(&name) {
            self.book = book;
            self.book_name = Some(name.clone());
            output::success(format!("Automatically loaded last book `{}`.", name));
        }
    }

    pub fn prompt(&self) -> String {
        format!("finance({})> ", self.book_name.as_deref().unwrap_or(UNTITLED))
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        match self.registry.get(command).map(|definition| definition.handler) {
            Some(handler) => {
                handler(self, args)?;
                if self.running {
                    Ok(LoopControl::Continue)
                } else {
                    Ok(LoopControl::Exit)
                }
            }
            None => {
                self.suggest(raw);
                Ok(LoopControl::Continue)
            }
        }
    }

    fn suggest(&self, raw: &str) {
        let needle = raw.to_ascii_lowercase();
        let closest = self
            .registry
            .names()
            .map(|name| (levenshtein(&needle, name), name))
            .min_by_key(|(distance, _)| *distance);
        match closest {
            Some((distance, name)) if distance <= 2 => output::warning(format!(
                "Unknown command `{}`. Did you mean `{}`?",
                raw, name
            )),
            _ => output::warning(format!(
                "Unknown command `{}`. Type `help` for the command list.",
                raw
            )),
        }
    }

    /// Asks before destructive actions. Script mode always proceeds.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }

    pub(crate) fn amount(&self, value: i64) -> String {
        output::format_amount(value, &self.config.currency_symbol)
    }

    pub(crate) fn remember_book(&mut self, name: &str) -> CommandResult {
        self.book_name = Some(name.to_string());
        self.config.last_opened_book = Some(name.to_string());
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    pub(crate) fn registry(&self) -> &CommandRegistry {
        &self.registry
    }
}
