mod commands;
mod context;
pub mod output;
mod shell;

pub use commands::{CommandDefinition, CommandRegistry};
pub use context::{CliMode, CommandError, ShellContext};
pub use shell::{run_cli, SCRIPT_ENV};
