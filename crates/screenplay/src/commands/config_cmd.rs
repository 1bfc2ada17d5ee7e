//! Config subcommand handlers.

use std::path::Path;

use screenplay_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, OutputFormat};
use crate::error::CliError;
use crate::output::{self, Presentation};

pub fn handle(
    args: &ConfigArgs,
    cfg: &Config,
    path: &Path,
    p: &Presentation,
) -> Result<(), CliError> {
    match &args.command {
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), p.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let rendered = match p.format {
                OutputFormat::Table => toml::to_string_pretty(cfg)?,
                OutputFormat::Json => serde_json::to_string_pretty(cfg)?,
            };
            output::print_output(rendered.trim_end(), p.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            config::save_config_to(&Config::default(), path)
                .map_err(|e| CliError::config(path, e))?;
            tracing::info!(path = %path.display(), "wrote default config");
            output::print_output(&format!("Wrote {}", path.display()), p.quiet);
            Ok(())
        }
    }
}
