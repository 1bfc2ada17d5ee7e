//! Clap derive structures for the `screenplay` CLI.
//!
//! Every subcommand drives the runtime through a scripted scenario and
//! prints what happened, so the lifecycle can be inspected from a shell.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use screenplay_core::{CounterStrategy, SwitchPolicy};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// screenplay -- drive view-model lifecycles from the command line
#[derive(Debug, Parser)]
#[command(
    name = "screenplay",
    version,
    about = "Exercise screen lifecycles, conductors and commands from the command line",
    long_about = "Runs scripted scenarios against the screenplay runtime.\n\n\
        Counters show derived command gating, `combined` shows command\n\
        aggregation, `navigate` drives a one-active conductor and `dialog`\n\
        shows a screen modally with a scripted response.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "SCREENPLAY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (overrides the config default)
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output (overrides the config default)
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default)
    Table,
    /// Pretty-printed JSON
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run increment/decrement/reset steps against one counter screen
    Counter(CounterArgs),

    /// Reset several counters at once through a combined command
    Combined(CombinedArgs),

    /// Navigate between pages of a one-active conductor
    #[command(alias = "nav")]
    Navigate(NavigateArgs),

    /// Show a screen as a modal dialog with a scripted response
    Dialog(DialogArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Counter ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CounterStep {
    #[value(alias = "inc")]
    Increment,
    #[value(alias = "dec")]
    Decrement,
    Reset,
    /// Deactivate and re-activate the counter
    Cycle,
}

#[derive(Debug, Args)]
pub struct CounterArgs {
    /// Steps to run, in order
    #[arg(value_enum, required = true)]
    pub steps: Vec<CounterStep>,

    /// Starting total
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(i64).range(0..))]
    pub seed: i64,

    /// How the counter's total is wired (deferred, two-pass)
    #[arg(long)]
    pub strategy: Option<CounterStrategy>,
}

// ── Combined ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CombinedArgs {
    /// Starting totals, one counter per value
    #[arg(required = true, value_parser = clap::value_parser!(i64).range(0..))]
    pub seeds: Vec<i64>,

    /// How many times to invoke the combined reset
    #[arg(long, default_value = "1")]
    pub times: u32,

    /// How each counter's total is wired (deferred, two-pass)
    #[arg(long)]
    pub strategy: Option<CounterStrategy>,
}

// ── Navigate ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum PageArg {
    Dashboard,
    Reports,
    Settings,
    /// Never registered with the navigator, fails on purpose
    Unknown,
}

#[derive(Debug, Args)]
pub struct NavigateArgs {
    /// Pages to visit, in order
    #[arg(value_enum, required = true)]
    pub pages: Vec<PageArg>,

    /// What happens to the previous page on switch
    /// (keep-previous, deactivate-previous)
    #[arg(long)]
    pub policy: Option<SwitchPolicy>,

    /// Close the active page after the last visit
    #[arg(long)]
    pub close_last: bool,
}

// ── Dialog ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    OkCancel,
    YesNo,
    YesNoCancel,
}

#[derive(Debug, Args)]
pub struct DialogArgs {
    /// Option set to present
    #[arg(long, value_enum, default_value = "ok-cancel")]
    pub preset: Preset,

    /// Scripted response: an option index, or `dismiss`
    #[arg(long, default_value = "0")]
    pub respond: String,

    /// Dialog title
    #[arg(long)]
    pub title: Option<String>,

    /// Resolve a dismissal to the cancel option (overrides config)
    #[arg(long)]
    pub dismiss_as_cancel: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Display current resolved configuration
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
