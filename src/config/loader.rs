//! Configuration file loading with precedence handling.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Number of worker timer files read when nothing else is configured.
pub const DEFAULT_WORKER_COUNT: u32 = 8;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/qprof/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Directory holding the worker `timer<N>.txt` files.
    #[serde(default)]
    pub timer_dir: Option<PathBuf>,

    /// Number of worker timer files (`timer0.txt` .. `timer<N-1>.txt`).
    #[serde(default)]
    pub worker_count: Option<u32>,

    /// Prefix containing the `output/` directory of run logs.
    #[serde(default)]
    pub run_prefix: Option<PathBuf>,

    /// Directory step reports are written into.
    #[serde(default)]
    pub report_dir: Option<PathBuf>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, and env vars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Directory holding worker timer files.
    pub timer_dir: PathBuf,
    /// Number of worker timer files.
    pub worker_count: u32,
    /// Prefix of the run output directory.
    pub run_prefix: PathBuf,
    /// Directory for step reports.
    pub report_dir: PathBuf,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            timer_dir: PathBuf::from("."),
            worker_count: DEFAULT_WORKER_COUNT,
            run_prefix: PathBuf::from("."),
            report_dir: PathBuf::from("."),
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/qprof/qprof.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("qprof").join("qprof.log")
    } else {
        PathBuf::from("qprof.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
/// Returns `Err` if file exists but cannot be read or parsed.
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/qprof/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("qprof").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `QPROF_CONFIG` environment variable
/// 3. Default path `~/.config/qprof/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var("QPROF_CONFIG") {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `QPROF_TIMER_DIR`: Override timer directory
/// - `QPROF_RUN_PREFIX`: Override run output prefix
/// - `QPROF_REPORT_DIR`: Override report directory
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(dir) = std::env::var("QPROF_TIMER_DIR") {
        config.timer_dir = PathBuf::from(dir);
    }
    if let Ok(prefix) = std::env::var("QPROF_RUN_PREFIX") {
        config.run_prefix = PathBuf::from(prefix);
    }
    if let Ok(dir) = std::env::var("QPROF_REPORT_DIR") {
        config.report_dir = PathBuf::from(dir);
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        timer_dir: config.timer_dir.unwrap_or(defaults.timer_dir),
        worker_count: config.worker_count.unwrap_or(defaults.worker_count),
        run_prefix: config.run_prefix.unwrap_or(defaults.run_prefix),
        report_dir: config.report_dir.unwrap_or(defaults.report_dir),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Resolve the full precedence chain: Defaults → Config File → Env Vars.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn resolve(config_path: Option<PathBuf>) -> Result<ResolvedConfig, ConfigError> {
    let config_file = load_config_with_precedence(config_path)?;
    Ok(apply_env_overrides(merge_config(config_file)))
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
