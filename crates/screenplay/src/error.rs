//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use screenplay_config::ConfigError;
use screenplay_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const LIFECYCLE: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFIG: i32 = 5;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Lifecycle ────────────────────────────────────────────────────

    #[error("Screen '{screen}' could not start")]
    #[diagnostic(
        code(screenplay::lifecycle),
        help("{reason}\nRun with -vv to see each lifecycle transition.")
    )]
    Lifecycle { screen: String, reason: String },

    #[error("Screen '{screen}' is no longer usable")]
    #[diagnostic(
        code(screenplay::disposed),
        help("Disposed and faulted screens cannot be activated again; build a new one.")
    )]
    Unusable { screen: String },

    // ── Conductors ───────────────────────────────────────────────────

    #[error("'{conductor}' has no page of kind '{kind}'")]
    #[diagnostic(
        code(screenplay::unknown_kind),
        help("Registered pages: {available}")
    )]
    UnknownKind {
        conductor: String,
        kind: String,
        available: String,
    },

    #[error("Screen '{screen}' is not conducted by '{conductor}'")]
    #[diagnostic(code(screenplay::not_a_child))]
    NotAChild { conductor: String, screen: String },

    // ── Dialog ───────────────────────────────────────────────────────

    #[error("Dialog option {index} does not exist")]
    #[diagnostic(
        code(screenplay::invalid_choice),
        help("Pick an index below {available}, or pass --respond dismiss")
    )]
    InvalidChoice { index: usize, available: usize },

    // ── Runtime ──────────────────────────────────────────────────────

    #[error("Operation failed: {message}")]
    #[diagnostic(code(screenplay::operation_failed))]
    Operation { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(screenplay::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration could not be loaded")]
    #[diagnostic(
        code(screenplay::config),
        help("Fix or remove the file at {path}, or regenerate it with: screenplay config init --force")
    )]
    Config {
        path: String,
        #[source]
        source: ConfigError,
    },

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(screenplay::config_exists),
        help("Pass --force to overwrite it.")
    )]
    ConfigExists { path: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render JSON: {0}")]
    #[diagnostic(code(screenplay::json))]
    Json(#[from] serde_json::Error),

    #[error("Could not render TOML: {0}")]
    #[diagnostic(code(screenplay::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Lifecycle { .. } | Self::Unusable { .. } => exit_code::LIFECYCLE,
            Self::UnknownKind { .. } | Self::NotAChild { .. } => exit_code::NOT_FOUND,
            Self::InvalidChoice { .. } | Self::Validation { .. } => exit_code::USAGE,
            Self::Config { .. } | Self::ConfigExists { .. } => exit_code::CONFIG,
            _ => exit_code::GENERAL,
        }
    }

    pub fn config(path: &std::path::Path, source: ConfigError) -> Self {
        Self::Config {
            path: path.display().to_string(),
            source,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InitializationFailed { screen, source }
            | CoreError::ActivationFailed { screen, source } => match *source {
                // Surface the innermost cause the user can act on.
                inner @ (CoreError::UnknownKind { .. } | CoreError::InvalidChoice { .. }) => {
                    inner.into()
                }
                inner => CliError::Lifecycle {
                    screen,
                    reason: inner.to_string(),
                },
            },

            CoreError::TransitionInProgress { screen } => CliError::Lifecycle {
                screen,
                reason: "a lifecycle transition re-entered itself".into(),
            },

            CoreError::Faulted { screen } | CoreError::Disposed { screen } => {
                CliError::Unusable { screen }
            }

            CoreError::UnknownKind { conductor, kind } => CliError::UnknownKind {
                conductor,
                kind,
                available: String::new(),
            },

            CoreError::NotAChild { conductor, screen } => CliError::NotAChild { conductor, screen },

            CoreError::InvalidChoice { index, available } => {
                CliError::InvalidChoice { index, available }
            }

            CoreError::ReleaseFailed { scope, reason } => CliError::Operation {
                message: format!("releasing '{scope}': {reason}"),
            },

            CoreError::OperationFailed { message } => CliError::Operation { message },
        }
    }
}
