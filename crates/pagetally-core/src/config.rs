use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so only malformed values fail.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("PAGETALLY_ENV", "development"))?;

    let bind_addr = or_default("PAGETALLY_BIND_ADDR", "127.0.0.1:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("PAGETALLY_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("PAGETALLY_LOG_LEVEL", "info");
    let pages_dir = PathBuf::from(or_default("PAGETALLY_PAGES_DIR", "./pages"));
    let store_dir = PathBuf::from(or_default("PAGETALLY_STORE_DIR", "./data"));

    let show_more_label = or_default("PAGETALLY_SHOW_MORE_LABEL", "Show more")
        .trim()
        .to_string();
    if show_more_label.is_empty() {
        return Err(invalid(
            "PAGETALLY_SHOW_MORE_LABEL",
            "label must not be empty".to_string(),
        ));
    }

    let pagination_settle_ms = parse_u64("PAGETALLY_PAGINATION_SETTLE_MS", "1500")?;
    let pagination_max_clicks = match lookup("PAGETALLY_PAGINATION_MAX_CLICKS") {
        Ok(raw) if !raw.trim().is_empty() => Some(
            raw.trim()
                .parse::<usize>()
                .map_err(|e| invalid("PAGETALLY_PAGINATION_MAX_CLICKS", e.to_string()))?,
        ),
        _ => None,
    };
    let playlist_settle_ms = parse_u64("PAGETALLY_PLAYLIST_SETTLE_MS", "1000")?;

    let order_delimiters = parse_delimiters(&or_default("PAGETALLY_ORDER_DELIMITERS", "•,·"));
    if order_delimiters.is_empty() {
        return Err(invalid(
            "PAGETALLY_ORDER_DELIMITERS",
            "at least one delimiter is required".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        pages_dir,
        store_dir,
        show_more_label,
        pagination_settle_ms,
        pagination_max_clicks,
        playlist_settle_ms,
        order_delimiters,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PAGETALLY_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

/// Splits a comma-separated delimiter list, dropping blank entries.
fn parse_delimiters(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
