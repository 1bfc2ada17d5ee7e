//! Command dispatch: bridges CLI args -> runtime scenarios -> output formatting.

pub mod combined;
pub mod config_cmd;
pub mod counter;
pub mod dialog;
pub mod navigate;

use std::path::Path;

use screenplay_config::Config;

use crate::cli::Command;
use crate::error::CliError;
use crate::output::Presentation;

/// Dispatch a command to the appropriate handler.
pub fn dispatch(
    cmd: Command,
    cfg: &Config,
    config_path: &Path,
    presentation: &Presentation,
) -> Result<(), CliError> {
    match cmd {
        Command::Counter(args) => counter::handle(&args, cfg, presentation),
        Command::Combined(args) => combined::handle(&args, cfg, presentation),
        Command::Navigate(args) => navigate::handle(&args, cfg, presentation),
        Command::Dialog(args) => dialog::handle(&args, cfg, presentation),
        Command::Config(args) => config_cmd::handle(&args, cfg, config_path, presentation),
        // Completions are handled before configuration is loaded
        Command::Completions(_) => Ok(()),
    }
}
