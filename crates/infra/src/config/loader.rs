//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Loads a `.env` file into the process environment, if one exists
//! 2. Attempts to load from environment variables
//! 3. If incomplete, falls back to loading from file
//! 4. Probes multiple paths for config files
//! 5. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! Required:
//! - `PKCE_AUTH_AUTHORIZATION_ENDPOINT`: Provider authorization endpoint
//! - `PKCE_AUTH_TOKEN_ENDPOINT`: Provider token endpoint
//! - `PKCE_AUTH_END_SESSION_ENDPOINT`: Provider end-session endpoint
//! - `PKCE_AUTH_CLIENT_ID`: OAuth client id
//! - `PKCE_AUTH_REDIRECT_URI`: Callback URI registered with the provider
//! - `PKCE_AUTH_LOGOUT_SUCCESS_URI`: Where the provider returns after logout
//! - `PKCE_AUTH_SCOPE`: Space-delimited default scope
//!
//! Optional:
//! - `PKCE_AUTH_CACHE_STRATEGY`: `persistent` (default) or `session_scoped`
//!   (`localStorage` / `sessionStorage` are accepted too)
//! - `PKCE_AUTH_CACHE_PREFIX`: Namespace for storage keys
//! - `PKCE_AUTH_STORAGE_PATH`: File backing the persistent store
//! - `PKCE_AUTH_REQUEST_TIMEOUT`: Token endpoint timeout in seconds
//! - `PKCE_AUTH_LOG_LEVEL`: Default log filter (`info` when unset)
//! - `PKCE_AUTH_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./pkce-auth.toml` or `./pkce-auth.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names in the parent directory
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use pkce_auth_domain::{
    AuthEndpoints, AuthError, AuthSettings, CacheStrategy, Config, LoggingConfig, Result,
};
use url::Url;

const CONFIG_FILE_NAMES: [&str; 4] = ["pkce-auth.toml", "pkce-auth.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables (after reading `.env`).
/// If any required variables are missing, falls back to loading from a
/// config file. The result is validated either way.
///
/// # Errors
/// Returns `AuthError::Configuration` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing or invalid
pub fn load() -> Result<Config> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) => tracing::debug!(error = %e, "No .env file loaded"),
    }

    // Try loading from environment first
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            // Fall back to file
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// All required environment variables must be present. Returns an error
/// if any are missing.
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `AuthError::Configuration` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let endpoints = AuthEndpoints {
        authorization_endpoint: env_url("PKCE_AUTH_AUTHORIZATION_ENDPOINT")?,
        token_endpoint: env_url("PKCE_AUTH_TOKEN_ENDPOINT")?,
        end_session_endpoint: env_url("PKCE_AUTH_END_SESSION_ENDPOINT")?,
    };

    let mut auth = AuthSettings::new(
        endpoints,
        env_var("PKCE_AUTH_CLIENT_ID")?,
        env_url("PKCE_AUTH_REDIRECT_URI")?,
        env_url("PKCE_AUTH_LOGOUT_SUCCESS_URI")?,
        env_var("PKCE_AUTH_SCOPE")?,
    );

    if let Some(strategy) = env_opt("PKCE_AUTH_CACHE_STRATEGY") {
        auth = auth.with_cache_strategy(strategy.parse::<CacheStrategy>()?);
    }
    if let Some(prefix) = env_opt("PKCE_AUTH_CACHE_PREFIX") {
        auth = auth.with_cache_prefix(prefix);
    }

    let request_timeout_seconds = env_opt("PKCE_AUTH_REQUEST_TIMEOUT")
        .map(|s| {
            s.parse::<u64>().map_err(|e| {
                AuthError::Configuration(format!("Invalid request timeout: {}", e))
            })
        })
        .transpose()?;

    let logging = LoggingConfig {
        level: env_opt("PKCE_AUTH_LOG_LEVEL").unwrap_or_else(|| LoggingConfig::default().level),
        json: env_bool("PKCE_AUTH_LOG_JSON", false),
    };

    let config = Config {
        auth,
        logging,
        storage_path: env_opt("PKCE_AUTH_STORAGE_PATH").map(PathBuf::from),
        request_timeout_seconds,
    };
    config.validate()?;

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `AuthError::Configuration` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing or invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(AuthError::Configuration(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            AuthError::Configuration(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| AuthError::Configuration(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;

    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `AuthError::Configuration` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| AuthError::Configuration(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| AuthError::Configuration(format!("Invalid JSON format: {}", e))),
        _ => Err(AuthError::Configuration(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches for config files in the following locations (in order):
/// 1. Current working directory
/// 2. Parent directory
/// 3. Relative to executable location
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
            dirs.push(exe_dir.join(".."));
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `AuthError::Configuration` if the variable is not set or blank.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        AuthError::Configuration(format!("Missing required environment variable: {}", key))
    })
}

/// Get optional environment variable; blank values count as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Get required environment variable parsed as a URL
///
/// # Errors
/// Returns `AuthError::Configuration` if the variable is missing or not a
/// valid absolute URL.
fn env_url(key: &str) -> Result<Url> {
    let value = env_var(key)?;
    Url::parse(&value)
        .map_err(|e| AuthError::Configuration(format!("Invalid URL in {}: {}", key, e)))
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Returns
/// The parsed boolean value, or `default` if not set.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
