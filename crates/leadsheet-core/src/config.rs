use crate::app_config::{AppConfig, Environment};
use crate::records::RowLayout;
use crate::ConfigError;

const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";
const DEFAULT_DRIVE_BASE_URL: &str = "https://www.googleapis.com";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let access_token = require("LEADSHEET_ACCESS_TOKEN")?;

    let env = parse_environment(&or_default("LEADSHEET_ENV", "development"))?;
    let log_level = or_default("LEADSHEET_LOG_LEVEL", "info");

    // Spreadsheet-creation policy: this address is always granted writer
    // access on new documents. Overridable so test environments don't share
    // documents with the production collaborator.
    let collaborator_email = or_default("LEADSHEET_COLLABORATOR_EMAIL", "alina.tvvv@gmail.com");

    let row_layout = parse_row_layout(&or_default("LEADSHEET_ROW_LAYOUT", "standard"))?;

    let sheets_base_url = or_default("LEADSHEET_SHEETS_BASE_URL", DEFAULT_SHEETS_BASE_URL);
    let drive_base_url = or_default("LEADSHEET_DRIVE_BASE_URL", DEFAULT_DRIVE_BASE_URL);
    let request_timeout_secs = parse_u64("LEADSHEET_REQUEST_TIMEOUT_SECS", "30")?;

    Ok(AppConfig {
        env,
        log_level,
        access_token,
        collaborator_email,
        row_layout,
        sheets_base_url,
        drive_base_url,
        request_timeout_secs,
    })
}

fn parse_environment(raw: &str) -> Result<Environment, ConfigError> {
    match raw {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LEADSHEET_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

fn parse_row_layout(raw: &str) -> Result<RowLayout, ConfigError> {
    match raw {
        "standard" => Ok(RowLayout::Standard),
        "compact" => Ok(RowLayout::Compact),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LEADSHEET_ROW_LAYOUT".to_string(),
            reason: format!("unknown row layout \"{other}\" (expected standard or compact)"),
        }),
    }
}
