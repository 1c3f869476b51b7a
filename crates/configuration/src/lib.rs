use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_logging;
pub use settings::{
    AnalyticsSettings, ApiSettings, Config, LogFormat, LoggingSettings, PollingSettings,
};

/// The file read when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Prefix of environment overrides, e.g. `BANKDASH__API__BASE_URL`.
pub const ENV_PREFIX: &str = "BANKDASH";

/// Loads the application configuration.
///
/// Sources, lowest precedence first: built-in defaults, the TOML file at `path`
/// (or `config.toml`), then `BANKDASH__SECTION__KEY` environment variables.
/// A missing default file is not an error; a missing explicit file is.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_with(path, environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

fn load_with(path: Option<&Path>, environment: config::Environment) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(environment)
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}

/// Parses a TOML document on top of the built-in defaults.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn empty_document_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api.base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.analytics.window, 21);
        assert_eq!(config.polling.interval, Duration::from_secs(2));
        assert_eq!(config.polling.completion_marker, "Training Complete");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse_config(
            r#"
            [api]
            base_url = "http://backend:9000/api/v1"
            timeout = "5s"

            [polling]
            interval = "500ms"
            max_duration = "10m"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://backend:9000/api/v1");
        assert_eq!(config.api.timeout, Duration::from_secs(5));
        assert_eq!(config.polling.interval, Duration::from_millis(500));
        assert_eq!(config.polling.max_duration, Some(Duration::from_secs(600)));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.analytics, AnalyticsSettings::default());
    }

    #[test]
    fn invalid_values_fail_validation() {
        let err = parse_config("[analytics]\nwindow = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));

        let err =
            parse_config("[analytics]\nup_threshold = -0.01\ndown_threshold = 0.01\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));

        let err = parse_config("[api]\nbase_url = \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn explicit_file_is_loaded_and_must_exist() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[analytics]\nwindow = 63\nfallback_days = 30").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.analytics.window, 63);
        assert_eq!(config.analytics.fallback_days, 30);

        let missing = file.path().with_extension("missing.toml");
        assert!(matches!(
            load_config(Some(&missing)),
            Err(ConfigError::LoadError(_))
        ));
    }

    #[test]
    fn environment_overrides_the_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[analytics]\nwindow = 63").unwrap();

        let mut vars = config::Map::new();
        vars.insert("BANKDASH__ANALYTICS__WINDOW".to_string(), "10".to_string());
        vars.insert(
            "BANKDASH__API__BASE_URL".to_string(),
            "http://backend:9000/api/v1".to_string(),
        );
        let config = load_with(Some(file.path()), environment().source(Some(vars))).unwrap();

        assert_eq!(config.analytics.window, 10);
        assert_eq!(config.api.base_url, "http://backend:9000/api/v1");
    }

    #[test]
    fn example_config_is_valid() {
        let config = parse_config(include_str!("../../../config.example.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
