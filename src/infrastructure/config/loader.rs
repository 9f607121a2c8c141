use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::{CalibrationConfig, Config};

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {field}: {value}. Must be between 0 and 1")]
    OutOfUnitRange { field: &'static str, value: f64 },

    #[error("Invalid lookback: {0}. Must be at least 1")]
    InvalidLookback(usize),

    #[error("Invalid min_transactions: {min_transactions}. Must be between 1 and lookback ({lookback})")]
    InvalidMinTransactions {
        min_transactions: usize,
        lookback: usize,
    },

    #[error("base_know_threshold ({base}) is below know_floor ({floor})")]
    KnowBelowFloor { base: f64, floor: f64 },

    #[error("base_uncertainty_threshold ({base}) is above uncertainty_ceiling ({ceiling})")]
    UncertaintyAboveCeiling { base: f64, ceiling: f64 },

    #[error("Invalid query_timeout_ms: {0}. Must be at least 1")]
    InvalidQueryTimeout(u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .calibration/config.yaml (project config)
    /// 3. .calibration/local.yaml (local overrides, optional)
    /// 4. Environment variables (CALIBRATION_* prefix, `__` separates nested keys)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".calibration/config.yaml"))
            .merge(Yaml::file(".calibration/local.yaml"))
            .merge(Env::prefixed("CALIBRATION_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Self::validate_calibration(&config.calibration)
    }

    /// Validate the calibration section on its own.
    pub fn validate_calibration(calibration: &CalibrationConfig) -> Result<(), ConfigError> {
        let unit_fields = [
            ("base_know_threshold", calibration.base_know_threshold),
            ("base_uncertainty_threshold", calibration.base_uncertainty_threshold),
            ("autonomy_factor", calibration.autonomy_factor),
            ("know_floor", calibration.know_floor),
            ("uncertainty_ceiling", calibration.uncertainty_ceiling),
        ];
        // NaN fails `contains` and is rejected here too.
        for (field, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfUnitRange { field, value });
            }
        }

        if calibration.lookback == 0 {
            return Err(ConfigError::InvalidLookback(calibration.lookback));
        }

        if calibration.min_transactions == 0 || calibration.min_transactions > calibration.lookback {
            return Err(ConfigError::InvalidMinTransactions {
                min_transactions: calibration.min_transactions,
                lookback: calibration.lookback,
            });
        }

        if calibration.base_know_threshold < calibration.know_floor {
            return Err(ConfigError::KnowBelowFloor {
                base: calibration.base_know_threshold,
                floor: calibration.know_floor,
            });
        }

        if calibration.base_uncertainty_threshold > calibration.uncertainty_ceiling {
            return Err(ConfigError::UncertaintyAboveCeiling {
                base: calibration.base_uncertainty_threshold,
                ceiling: calibration.uncertainty_ceiling,
            });
        }

        if calibration.query_timeout_ms == 0 {
            return Err(ConfigError::InvalidQueryTimeout(calibration.query_timeout_ms));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database.path, ".calibration/calibration.db");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.calibration.lookback, 20);
        assert_eq!(config.calibration.min_transactions, 5);
        assert!((config.calibration.autonomy_factor - 0.15).abs() < f64::EPSILON);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
database:
  path: /custom/path.db
  max_connections: 2
logging:
  level: debug
  format: pretty
calibration:
  base_know_threshold: 0.75
  lookback: 30
  query_timeout_ms: 250
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.database.path, "/custom/path.db");
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.logging.format, "pretty");
        assert!((config.calibration.base_know_threshold - 0.75).abs() < f64::EPSILON);
        assert_eq!(config.calibration.lookback, 30);
        assert_eq!(config.calibration.query_timeout_ms, 250);
        // Unspecified keys keep their defaults.
        assert_eq!(config.calibration.min_transactions, 5);
        assert!((config.calibration.know_floor - 0.55).abs() < f64::EPSILON);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_out_of_range_factor() {
        let mut config = Config::default();
        config.calibration.autonomy_factor = 1.5;

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::OutOfUnitRange {
                field: "autonomy_factor",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_nan_threshold() {
        let mut config = Config::default();
        config.calibration.know_floor = f64::NAN;

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::OutOfUnitRange { field: "know_floor", .. })
        ));
    }

    #[test]
    fn test_validate_zero_lookback() {
        let mut config = Config::default();
        config.calibration.lookback = 0;

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLookback(0))
        ));
    }

    #[test]
    fn test_validate_min_transactions_bounds() {
        let mut config = Config::default();
        config.calibration.min_transactions = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMinTransactions { .. })
        ));

        config.calibration.min_transactions = 21;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMinTransactions {
                min_transactions: 21,
                lookback: 20
            })
        ));

        config.calibration.min_transactions = 20;
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_base_outside_floors() {
        let mut config = Config::default();
        config.calibration.base_know_threshold = 0.5;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::KnowBelowFloor { .. })
        ));

        let mut config = Config::default();
        config.calibration.base_uncertainty_threshold = 0.6;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::UncertaintyAboveCeiling { .. })
        ));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.calibration.query_timeout_ms = 0;

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidQueryTimeout(0))
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "verbose"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogFormat(_))
        ));
    }

    #[test]
    fn test_validate_database_settings() {
        let mut config = Config::default();
        config.database.path = String::new();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyDatabasePath)
        ));

        let mut config = Config::default();
        config.database.max_connections = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxConnections(0))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "calibration:\n  min_transactions: 3\n  lookback: 10\nlogging:\n  level: warn"
        )
        .unwrap();
        file.flush().unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.calibration.min_transactions, 3);
        assert_eq!(config.calibration.lookback, 10);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "calibration:\n  know_floor: 0.9").unwrap();
        file.flush().unwrap();

        let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("know_floor"));
    }

    #[test]
    fn test_env_override() {
        temp_env::with_vars(
            [
                ("CALIBRATION_CALIBRATION__LOOKBACK", Some("40")),
                ("CALIBRATION_CALIBRATION__AUTONOMY_FACTOR", Some("0.1")),
                ("CALIBRATION_LOGGING__LEVEL", Some("debug")),
            ],
            || {
                let config = ConfigLoader::load().unwrap();
                assert_eq!(config.calibration.lookback, 40);
                assert!((config.calibration.autonomy_factor - 0.1).abs() < f64::EPSILON);
                assert_eq!(config.logging.level, "debug");
            },
        );
    }

    #[test]
    fn test_hierarchical_merging() {
        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(
            base_file,
            "calibration:\n  lookback: 10\n  min_transactions: 4\nlogging:\n  level: info\n  format: pretty"
        )
        .unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "calibration:\n  lookback: 12\nlogging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.calibration.lookback, 12, "Override should win");
        assert_eq!(
            config.calibration.min_transactions, 4,
            "Base value should persist when not overridden"
        );
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
    }
}
