// In crates/app-config/src/lib.rs

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use core_types::BacktestParams;
use std::path::Path;

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{AppSettings, BackendSettings, Settings};

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Built-in defaults (local backend, `info` logging).
/// 2. Reads from a `config/base.toml` file, if present.
/// 3. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 4. Merges settings from environment variables.
pub fn load_settings() -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let settings = with_defaults(Config::builder(), &environment)?
        .add_source(File::with_name("config/base").required(false))
        .add_source(File::with_name(&format!("config/{}", environment)).required(false))
        // e.g. `APP_BACKEND__BASE_URL=https://...`. The prefix is `APP`, separator is `__`.
        .add_source(Environment::with_prefix("APP").prefix_separator("_").separator("__"))
        .build()?;

    finish(settings)
}

/// Builds settings from a TOML document layered over the built-in defaults.
pub fn settings_from_toml(content: &str) -> Result<Settings> {
    let settings = with_defaults(Config::builder(), "development")?
        .add_source(File::from_str(content, FileFormat::Toml))
        .build()?;

    finish(settings)
}

/// Loads a set of backtest parameters from a TOML file.
///
/// Only `ticker` is required; every other field falls back to its default.
pub fn load_params_file(path: impl AsRef<Path>) -> Result<BacktestParams> {
    let content = std::fs::read_to_string(path)?;
    parse_params(&content)
}

pub fn parse_params(content: &str) -> Result<BacktestParams> {
    let params: BacktestParams = toml::from_str(content)?;
    Ok(params)
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
    environment: &str,
) -> Result<ConfigBuilder<DefaultState>> {
    Ok(builder
        .set_default("app.environment", environment)?
        .set_default("app.log_level", "info")?
        .set_default("backend.base_url", "http://localhost:8000")?
        .set_default("backend.timeout_secs", 120)?)
}

/// Level names accepted by `tracing::Level::from_str`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn finish(config: Config) -> Result<Settings> {
    // Deserialize the configuration into our `Settings` struct.
    let settings: Settings = config.try_deserialize()?;

    let url = settings.backend.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(Error::Invalid(format!(
            "backend.base_url must be an http(s) URL, got '{}'",
            settings.backend.base_url
        )));
    }
    if settings.backend.timeout_secs == 0 {
        return Err(Error::Invalid("backend.timeout_secs must be positive".into()));
    }
    if !LOG_LEVELS.iter().any(|l| l.eq_ignore_ascii_case(settings.app.log_level.trim())) {
        return Err(Error::Invalid(format!(
            "app.log_level must be one of {}, got '{}'",
            LOG_LEVELS.join(", "),
            settings.app.log_level
        )));
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::FridayType;

    #[test]
    fn defaults_apply_without_any_file() {
        let settings = settings_from_toml("").unwrap();
        assert_eq!(settings.app.log_level, "info");
        assert_eq!(settings.app.environment, "development");
        assert_eq!(settings.backend.base_url, "http://localhost:8000");
        assert_eq!(settings.backend.timeout_secs, 120);
    }

    #[test]
    fn file_overrides_defaults() {
        let settings = settings_from_toml(
            r#"
            [app]
            log_level = "debug"

            [backend]
            base_url = "https://strangle.example.com"
            timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(settings.app.log_level, "debug");
        assert_eq!(settings.backend.base_url, "https://strangle.example.com");
        assert_eq!(settings.backend.timeout_secs, 30);
    }

    #[test]
    fn rejects_non_http_backend() {
        let err = settings_from_toml("[backend]\nbase_url = \"localhost:8000\"").unwrap_err();
        assert!(matches!(err, Error::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_log_level() {
        let err = settings_from_toml("[app]\nlog_level = \"verbose\"").unwrap_err();
        assert!(matches!(err, Error::Invalid(msg) if msg.contains("verbose")));

        let settings = settings_from_toml("[app]\nlog_level = \"DEBUG\"").unwrap();
        assert_eq!(settings.app.log_level, "DEBUG");
    }

    #[test]
    fn params_file_fills_defaults() {
        let params = parse_params(
            r#"
            ticker = "VALE3"
            years = 3
            friday_type = "terceira"
            "#,
        )
        .unwrap();
        assert_eq!(params.ticker, "VALE3");
        assert_eq!(params.years, 3);
        assert_eq!(params.days_before, 21);
        assert_eq!(params.friday_type, FridayType::Terceira);
    }

    #[test]
    fn params_file_requires_ticker() {
        assert!(matches!(parse_params("years = 2"), Err(Error::TomlError(_))));
    }
}
