//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from the
//! environment and from files.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use pkce_auth_domain::{AuthError, CacheStrategy};
use pkce_auth_infra::config;
use tempfile::NamedTempFile;

static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

const REQUIRED_VARS: [(&str, &str); 7] = [
    ("PKCE_AUTH_AUTHORIZATION_ENDPOINT", "https://idp.example.com/oauth2/authorize"),
    ("PKCE_AUTH_TOKEN_ENDPOINT", "https://idp.example.com/oauth2/token"),
    ("PKCE_AUTH_END_SESSION_ENDPOINT", "https://idp.example.com/oauth2/logout"),
    ("PKCE_AUTH_CLIENT_ID", "env-client"),
    ("PKCE_AUTH_REDIRECT_URI", "http://localhost:8765/callback"),
    ("PKCE_AUTH_LOGOUT_SUCCESS_URI", "http://localhost:8765/"),
    ("PKCE_AUTH_SCOPE", "openid profile offline_access"),
];

const OPTIONAL_VARS: [&str; 6] = [
    "PKCE_AUTH_CACHE_STRATEGY",
    "PKCE_AUTH_CACHE_PREFIX",
    "PKCE_AUTH_STORAGE_PATH",
    "PKCE_AUTH_REQUEST_TIMEOUT",
    "PKCE_AUTH_LOG_LEVEL",
    "PKCE_AUTH_LOG_JSON",
];

fn set_required_vars() {
    for (key, value) in REQUIRED_VARS {
        std::env::set_var(key, value);
    }
}

fn clear_vars() {
    for (key, _) in REQUIRED_VARS {
        std::env::remove_var(key);
    }
    for key in OPTIONAL_VARS {
        std::env::remove_var(key);
    }
}

/// Validates loading a complete configuration from the environment.
///
/// # Test Steps
/// 1. Set every required variable plus all optional ones
/// 2. Load via `load_from_env`
/// 3. Verify endpoints, cache options, storage path, timeout and logging
#[test]
fn test_load_config_from_env() {
    let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
    clear_vars();
    set_required_vars();
    std::env::set_var("PKCE_AUTH_CACHE_STRATEGY", "sessionStorage");
    std::env::set_var("PKCE_AUTH_CACHE_PREFIX", "desk");
    std::env::set_var("PKCE_AUTH_STORAGE_PATH", "/var/lib/desk/auth.json");
    std::env::set_var("PKCE_AUTH_REQUEST_TIMEOUT", "15");
    std::env::set_var("PKCE_AUTH_LOG_LEVEL", "pkce_auth_common=debug");
    std::env::set_var("PKCE_AUTH_LOG_JSON", "true");

    let result = config::load_from_env();
    clear_vars();
    let config = result.expect("complete environment loads");

    assert_eq!(
        config.auth.endpoints.token_endpoint.as_str(),
        "https://idp.example.com/oauth2/token"
    );
    assert_eq!(config.auth.client_id, "env-client");
    assert_eq!(config.auth.scope, "openid profile offline_access");
    assert_eq!(config.auth.cache_strategy, CacheStrategy::SessionScoped);
    assert_eq!(config.auth.auth_cache_key(), "desk:auth");
    assert_eq!(config.storage_path, Some(PathBuf::from("/var/lib/desk/auth.json")));
    assert_eq!(config.request_timeout_seconds, Some(15));
    assert_eq!(config.logging.level, "pkce_auth_common=debug");
    assert!(config.logging.json);
}

/// Validates defaults when only the required variables are set.
#[test]
fn test_load_config_from_env_defaults() {
    let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
    clear_vars();
    set_required_vars();

    let result = config::load_from_env();
    clear_vars();
    let config = result.expect("required environment loads");

    assert_eq!(config.auth.cache_strategy, CacheStrategy::Persistent);
    assert_eq!(config.auth.auth_cache_key(), "auth");
    assert_eq!(config.storage_path, None);
    assert_eq!(config.request_timeout_seconds, None);
    assert_eq!(config.logging.level, "info");
    assert!(!config.logging.json);
}

/// Validates that a missing required variable is reported by name.
#[test]
fn test_load_config_from_env_missing_variable() {
    let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
    clear_vars();
    set_required_vars();
    std::env::remove_var("PKCE_AUTH_CLIENT_ID");

    let result = config::load_from_env();
    clear_vars();

    let err = result.unwrap_err();
    assert!(matches!(err, AuthError::Configuration(_)));
    assert!(err.to_string().contains("PKCE_AUTH_CLIENT_ID"));
}

/// Validates that malformed optional values are rejected.
#[test]
fn test_load_config_from_env_invalid_values() {
    let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
    clear_vars();
    set_required_vars();

    std::env::set_var("PKCE_AUTH_CACHE_STRATEGY", "cookie");
    let bad_strategy = config::load_from_env();
    std::env::remove_var("PKCE_AUTH_CACHE_STRATEGY");

    std::env::set_var("PKCE_AUTH_REQUEST_TIMEOUT", "soon");
    let bad_timeout = config::load_from_env();
    std::env::set_var("PKCE_AUTH_REQUEST_TIMEOUT", "0");
    let zero_timeout = config::load_from_env();
    clear_vars();

    assert!(bad_strategy.unwrap_err().to_string().contains("CacheStrategy"));
    assert!(bad_timeout.unwrap_err().to_string().contains("request timeout"));
    assert!(matches!(zero_timeout, Err(AuthError::Configuration(_))));
}

/// Validates loading a configuration from a JSON file.
#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "auth": {
            "endpoints": {
                "authorization_endpoint": "https://idp.example.com/authorize",
                "token_endpoint": "https://idp.example.com/token",
                "end_session_endpoint": "https://idp.example.com/logout"
            },
            "client_id": "json-client",
            "redirect_uri": "https://app.example.com/callback",
            "logout_success_uri": "https://app.example.com/",
            "scope": "openid",
            "cache_strategy": "localStorage",
            "cache_prefix": "web"
        },
        "logging": { "level": "warn" },
        "request_timeout_seconds": 30
    }"#;

    let mut temp_file =
        tempfile::Builder::new().suffix(".json").tempfile().expect("Failed to create temp file");
    temp_file.write_all(json_content.as_bytes()).expect("Failed to write to temp file");

    let config = config::load_from_file(Some(temp_file.path().to_path_buf()))
        .expect("Failed to load config from JSON file");

    assert_eq!(config.auth.client_id, "json-client");
    assert_eq!(config.auth.cache_strategy, CacheStrategy::Persistent);
    assert_eq!(config.auth.auth_request_key(), "web:auth:request");
    assert_eq!(config.logging.level, "warn");
    assert!(!config.logging.json);
    assert_eq!(config.request_timeout_seconds, Some(30));
}

/// Validates that syntax errors are surfaced with the format name.
#[test]
fn test_load_config_invalid_file_contents() {
    let mut toml_file = tempfile::Builder::new().suffix(".toml").tempfile().expect("temp file");
    toml_file.write_all(b"[auth\nclient_id = ").expect("write");
    let toml_err = config::load_from_file(Some(toml_file.path().to_path_buf())).unwrap_err();
    assert!(toml_err.to_string().contains("Invalid TOML format"));

    let mut json_file = tempfile::Builder::new().suffix(".json").tempfile().expect("temp file");
    json_file.write_all(b"{\"auth\": {}}").expect("write");
    let json_err = config::load_from_file(Some(json_file.path().to_path_buf())).unwrap_err();
    assert!(json_err.to_string().contains("Invalid JSON format"));
}

/// Validates that a file without an extension is parsed as JSON.
#[test]
fn test_load_config_without_extension_defaults_to_json() {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(b"not json").expect("write");

    let err = config::load_from_file(Some(temp_file.path().to_path_buf())).unwrap_err();
    assert!(err.to_string().contains("Invalid JSON format"));
}
