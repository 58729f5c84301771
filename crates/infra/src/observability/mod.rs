//! Tracing subscriber bootstrap
//!
//! Installs a global `tracing` subscriber driven by [`LoggingConfig`].
//! `RUST_LOG` takes precedence over the configured level so operators can
//! raise verbosity (for example `RUST_LOG=pkce_auth_common=debug`) without
//! touching the config file.

use pkce_auth_domain::{AuthError, LoggingConfig, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// # Errors
/// Returns `AuthError::Configuration` if the level is not a valid filter
/// directive or a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry.with(fmt::layer().json().with_target(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    installed.map_err(|e| {
        AuthError::Configuration(format!("Failed to install tracing subscriber: {}", e))
    })
}

/// Resolve the filter: `RUST_LOG` if set and valid, else the configured level.
fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.level).map_err(|e| {
        AuthError::Configuration(format!("Invalid log level '{}': {}", config.level, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_rejects_garbage_level() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig { level: "pkce_auth=verbose".to_string(), json: false };
        assert!(matches!(build_filter(&config), Err(AuthError::Configuration(_))));
    }

    #[test]
    fn test_init_tracing_twice_fails() {
        let config = LoggingConfig::default();
        // The first call may lose to another test's subscriber; the second
        // must always fail.
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
