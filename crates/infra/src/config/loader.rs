//! Configuration loader
//!
//! Loads engine configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads `.env` (if present) into the process environment
//! 2. If any `SYNCBRIDGE_*` variable is set, builds the config from defaults
//!    plus those variables
//! 3. Otherwise probes multiple paths for a config file (JSON or TOML)
//! 4. Falls back to built-in defaults when no file exists
//!
//! The result is always passed through [`Config::validate`].
//!
//! ## Environment Variables
//! - `SYNCBRIDGE_SYNC_TIMEOUT_SECS`: Per-job timeout (0 disables)
//! - `SYNCBRIDGE_CONNECT_TIMEOUT_SECS`: Adapter connect timeout
//! - `SYNCBRIDGE_TEST_CONNECTION_TIMEOUT_SECS`: Connectivity probe timeout
//! - `SYNCBRIDGE_DEFAULT_BATCH_SIZE` / `SYNCBRIDGE_MAX_BATCH_SIZE`
//! - `SYNCBRIDGE_SYNC_CONCURRENCY`: `parallel` or `exclusive_per_system`
//! - `SYNCBRIDGE_HISTORY_RETENTION_DAYS` / `SYNCBRIDGE_HISTORY_MAX_ENTRIES`
//! - `SYNCBRIDGE_HTTP_TIMEOUT_SECS`, `SYNCBRIDGE_HTTP_MAX_ATTEMPTS`,
//!   `SYNCBRIDGE_HTTP_BACKOFF_MS`
//! - `SYNCBRIDGE_LOG_LEVEL`, `SYNCBRIDGE_LOG_JSON`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./syncbridge.{json,toml}` then `./config.{json,toml}`
//! 2. The same names in the parent and grandparent directories
//! 3. The same names relative to the executable location

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use syncbridge_domain::{Config, Result, SyncBridgeError};

const ENV_PREFIX: &str = "SYNCBRIDGE_";
const FILE_STEMS: [&str; 2] = ["syncbridge", "config"];
const FILE_EXTENSIONS: [&str; 2] = ["json", "toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `SyncBridgeError::Config` if:
/// - An environment variable has an invalid value
/// - A found config file cannot be read or parsed
/// - The resulting configuration fails validation
pub fn load() -> Result<Config> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            tracing::warn!(error = %err, "Ignoring unreadable .env file");
        }
    }

    let config = if env_configured() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        config
    } else {
        match probe_config_paths() {
            Some(path) => load_from_file(Some(path))?,
            None => {
                tracing::info!("No configuration found, using defaults");
                Config::default()
            }
        }
    };

    config.validate()?;
    Ok(config)
}

/// Build configuration from defaults overlaid with `SYNCBRIDGE_*` variables
///
/// Unset variables keep their defaults.
///
/// # Errors
/// Returns `SyncBridgeError::Config` if a variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    let engine = &mut config.engine;
    apply(&mut engine.sync_timeout_secs, "SYNCBRIDGE_SYNC_TIMEOUT_SECS")?;
    apply(&mut engine.connect_timeout_secs, "SYNCBRIDGE_CONNECT_TIMEOUT_SECS")?;
    apply(&mut engine.test_connection_timeout_secs, "SYNCBRIDGE_TEST_CONNECTION_TIMEOUT_SECS")?;
    apply(&mut engine.default_batch_size, "SYNCBRIDGE_DEFAULT_BATCH_SIZE")?;
    apply(&mut engine.max_batch_size, "SYNCBRIDGE_MAX_BATCH_SIZE")?;
    apply(&mut engine.concurrency, "SYNCBRIDGE_SYNC_CONCURRENCY")?;

    apply(&mut config.history.retention_days, "SYNCBRIDGE_HISTORY_RETENTION_DAYS")?;
    apply(&mut config.history.max_entries, "SYNCBRIDGE_HISTORY_MAX_ENTRIES")?;

    apply(&mut config.http.timeout_secs, "SYNCBRIDGE_HTTP_TIMEOUT_SECS")?;
    apply(&mut config.http.max_attempts, "SYNCBRIDGE_HTTP_MAX_ATTEMPTS")?;
    apply(&mut config.http.base_backoff_ms, "SYNCBRIDGE_HTTP_BACKOFF_MS")?;

    if let Some(level) = env_string("SYNCBRIDGE_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("SYNCBRIDGE_LOG_JSON", config.logging.json);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `SyncBridgeError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SyncBridgeError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SyncBridgeError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SyncBridgeError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, format chosen by extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SyncBridgeError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SyncBridgeError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(SyncBridgeError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.extend([exe_dir.to_path_buf(), exe_dir.join("..")]);
        }
    }

    roots
        .iter()
        .flat_map(|root| {
            FILE_STEMS.iter().flat_map(move |stem| {
                FILE_EXTENSIONS.iter().map(move |ext| root.join(format!("{stem}.{ext}")))
            })
        })
        .find(|path| path.exists())
}

fn env_configured() -> bool {
    std::env::vars_os().any(|(key, _)| key.to_string_lossy().starts_with(ENV_PREFIX))
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Overwrite `target` with the parsed variable when it is set.
fn apply<T>(target: &mut T, key: &str) -> Result<()>
where
    T: FromStr,
    T::Err: Display,
{
    if let Some(raw) = env_string(key) {
        *target = raw
            .parse()
            .map_err(|e| SyncBridgeError::Config(format!("Invalid value for {key}: {e}")))?;
    }
    Ok(())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
