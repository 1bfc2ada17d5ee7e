mod cli;
mod commands;
mod error;
mod output;

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use screenplay_config::{Config, Logging};

use crate::cli::{Cli, ColorMode, Command, ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output::Presentation;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Set up stderr logging plus an optional file layer from config.
///
/// `RUST_LOG` wins, then `-v`, then the configured filter. The returned
/// guard flushes the file writer and must outlive the command.
fn init_tracing(verbosity: u8, logging: &Logging) -> Option<WorkerGuard> {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match &logging.filter {
        Some(directive) if verbosity == 0 => EnvFilter::new(directive),
        _ => EnvFilter::new(level),
    });

    let (file_layer, guard) = match &logging.file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("screenplay.log"));
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .init();

    guard
}

fn run(cli: Cli) -> Result<(), CliError> {
    // Completions never depend on configuration
    if let Command::Completions(args) = &cli.command {
        use clap::CommandFactory;
        use clap_complete::generate;

        let mut cmd = Cli::command();
        generate(args.shell, &mut cmd, "screenplay", &mut std::io::stdout());
        return Ok(());
    }

    let path = config_path(&cli.global);
    let cfg = match screenplay_config::load_config_from(&path) {
        Ok(cfg) => cfg,
        // `config init --force` must be able to replace a broken file
        Err(_) if is_config_init(&cli.command) => Config::default(),
        Err(err) => return Err(CliError::config(&path, err)),
    };
    let _guard = init_tracing(cli.global.verbose, &cfg.logging);

    let presentation = presentation(&cli.global, &cfg);
    tracing::debug!(command = ?cli.command, config = %path.display(), "dispatching command");
    commands::dispatch(cli.command, &cfg, &path, &presentation)
}

fn is_config_init(command: &Command) -> bool {
    matches!(
        command,
        Command::Config(ConfigArgs {
            command: ConfigCommand::Init { .. }
        })
    )
}

fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(screenplay_config::config_path)
}

/// CLI flags win over config defaults. Config values were validated on load.
fn presentation(global: &GlobalOpts, cfg: &Config) -> Presentation {
    let format = global.output.unwrap_or(match cfg.defaults.output.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Table,
    });
    let color = global.color.unwrap_or(match cfg.defaults.color.as_str() {
        "always" => ColorMode::Always,
        "never" => ColorMode::Never,
        _ => ColorMode::Auto,
    });
    Presentation {
        format,
        color: output::should_color(color),
        quiet: global.quiet,
    }
}
