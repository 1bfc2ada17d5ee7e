//! Configuration for the screenplay runtime and its demo CLI.
//!
//! A TOML file in the platform config directory, layered over built-in
//! defaults and `SCREENPLAY_`-prefixed environment variables, translated to
//! `screenplay_core::RuntimeSettings`. The core crate never reads files;
//! the binary loads a [`Config`] here and hands the settings in.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use screenplay_core::{CounterStrategy, RuntimeSettings, SwitchPolicy};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Conductor and dialog behavior.
    #[serde(default)]
    pub runtime: Runtime,

    /// Defaults for the demo CLI.
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub logging: Logging,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Runtime {
    /// What a one-active conductor does with the previous member on switch.
    #[serde(default)]
    pub switch_policy: SwitchPolicy,

    /// Resolve dismissed dialogs to their last (cancel) option.
    #[serde(default)]
    pub dismiss_as_cancel: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Counter wiring used when the CLI is not told otherwise.
    #[serde(default)]
    pub strategy: CounterStrategy,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            strategy: CounterStrategy::default(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Logging {
    /// `tracing` filter directive used when neither `-v` nor `RUST_LOG`
    /// is given (e.g. `"screenplay_core=debug"`).
    pub filter: Option<String>,

    /// Also write logs to this file.
    pub file: Option<PathBuf>,
}

const OUTPUT_FORMATS: [&str; 2] = ["table", "json"];
const COLOR_MODES: [&str; 3] = ["auto", "always", "never"];

impl Config {
    /// Reject values the CLI cannot act on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_one_of("defaults.output", &self.defaults.output, &OUTPUT_FORMATS)?;
        check_one_of("defaults.color", &self.defaults.color, &COLOR_MODES)?;
        Ok(())
    }

    /// Settings handed to the core runtime.
    pub fn runtime_settings(&self) -> RuntimeSettings {
        RuntimeSettings {
            switch_policy: self.runtime.switch_policy,
            dismiss_as_cancel: self.runtime.dismiss_as_cancel,
        }
    }
}

fn check_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), ConfigError> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(ConfigError::Validation {
        field: field.into(),
        reason: format!("expected one of {}, got '{value}'", allowed.join(", ")),
    })
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("rs", "screenplay", "screenplay").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("screenplay");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` + environment. A missing file yields defaults.
///
/// Environment keys use `__` between sections, e.g.
/// `SCREENPLAY_RUNTIME__SWITCH_POLICY=deactivate-previous`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SCREENPLAY_").split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

/// Load config, falling back to defaults on any error.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    cfg.validate()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
