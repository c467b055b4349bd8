use std::path::PathBuf;

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
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("LEADGEN_ENV", "development"))?;
    let log_level = or_default("LEADGEN_LOG_LEVEL", "info");

    let api_base_url = parse_base_url(&or_default(
        "LEADGEN_API_URL",
        "http://localhost:8000/api",
    ))?;
    let request_timeout_secs = parse_u64("LEADGEN_REQUEST_TIMEOUT_SECS", "120")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "LEADGEN_REQUEST_TIMEOUT_SECS",
            "must be at least 1".to_string(),
        ));
    }
    let user_agent = or_default("LEADGEN_USER_AGENT", "leadgen/0.1 (campaign-orchestrator)");

    let session_dir = PathBuf::from(or_default("LEADGEN_SESSION_DIR", "./.leadgen/session"));
    let export_dir = PathBuf::from(or_default("LEADGEN_EXPORT_DIR", "."));

    let max_leads_per_channel = parse_u32("LEADGEN_MAX_LEADS_PER_CHANNEL", "10")?;
    if max_leads_per_channel == 0 {
        return Err(invalid(
            "LEADGEN_MAX_LEADS_PER_CHANNEL",
            "must be at least 1".to_string(),
        ));
    }
    let keyword_preselect_count = parse_usize("LEADGEN_KEYWORD_PRESELECT", "3")?;

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        request_timeout_secs,
        user_agent,
        session_dir,
        export_dir,
        max_leads_per_channel,
        keyword_preselect_count,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LEADGEN_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Require an `http(s)://` URL and strip trailing slashes so endpoint paths
/// can be appended directly.
fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_scheme = trimmed.starts_with("http://") || trimmed.starts_with("https://");
    let has_host = trimmed
        .split_once("://")
        .is_some_and(|(_, rest)| !rest.is_empty());
    if !has_scheme || !has_host {
        return Err(ConfigError::InvalidEnvVar {
            var: "LEADGEN_API_URL".to_string(),
            reason: format!("expected an http(s) URL, got '{raw}'"),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
