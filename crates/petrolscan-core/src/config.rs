use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Characters escaped in the user and password of a database URL. The RFC 3986
/// unreserved marks pass through.
const USERINFO: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
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
/// Returns `ConfigError` if values are invalid.
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
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected a boolean, got '{raw}'"),
            }),
        }
    };

    let database_url = match lookup("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => database_url_from_parts(&or_default)?,
    };

    let env = parse_environment(&or_default("PETROLSCAN_ENV", "development"))?;
    let log_level = or_default("PETROLSCAN_LOG_LEVEL", "info");
    let stations_path = PathBuf::from(or_default(
        "PETROLSCAN_STATIONS_PATH",
        "./config/stations.yaml",
    ));
    let dataset_dir = PathBuf::from(or_default("PETROLSCAN_DATASET_DIR", "./storage/datasets"));
    let skip_ungeocoded = parse_bool("PETROLSCAN_SKIP_UNGEOCODED", false)?;

    let db_max_connections = parse_u32("PETROLSCAN_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("PETROLSCAN_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("PETROLSCAN_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "PETROLSCAN_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        });
    }

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        stations_path,
        dataset_dir,
        skip_ungeocoded,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Assemble a Postgres URL from the discrete `DB_*` variables used by older
/// deployments when `DATABASE_URL` is absent.
fn database_url_from_parts<F>(or_default: &F) -> Result<String, ConfigError>
where
    F: Fn(&str, &str) -> String,
{
    let hostname = or_default("DB_HOSTNAME", "localhost");
    let port = or_default("DB_PORT", "5432");
    let username = or_default("DB_USERNAME", "postgres");
    let password = or_default("DB_PASSWORD", "");
    let database = or_default("DB_DATABASE", "petrolscan");

    port.parse::<u16>().map_err(|e| ConfigError::InvalidEnvVar {
        var: "DB_PORT".to_string(),
        reason: e.to_string(),
    })?;

    let username = utf8_percent_encode(&username, USERINFO);
    if password.is_empty() {
        Ok(format!("postgres://{username}@{hostname}:{port}/{database}"))
    } else {
        let password = utf8_percent_encode(&password, USERINFO);
        Ok(format!(
            "postgres://{username}:{password}@{hostname}:{port}/{database}"
        ))
    }
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PETROLSCAN_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
