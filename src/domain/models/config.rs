use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Calibration and threshold knobs
    #[serde(default)]
    pub calibration: CalibrationConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".calibration/calibration.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// `sqlx` connection URL for the configured path.
    pub fn url(&self) -> String {
        if self.path.starts_with("sqlite:") {
            self.path.clone()
        } else {
            format!("sqlite:{}", self.path)
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

/// Calibration window, base thresholds and safety floors.
///
/// Loaded once and passed by value into each service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CalibrationConfig {
    /// Knowledge an uncalibrated agent must report before proceeding
    #[serde(default = "default_base_know_threshold")]
    pub base_know_threshold: f64,

    /// Uncertainty an uncalibrated agent may report and still proceed
    #[serde(default = "default_base_uncertainty_threshold")]
    pub base_uncertainty_threshold: f64,

    /// Grounded points required before a phase is adjusted
    #[serde(default = "default_min_transactions")]
    pub min_transactions: usize,

    /// Number of most recent grounded points averaged
    #[serde(default = "default_lookback")]
    pub lookback: usize,

    /// Maximum threshold shift granted to a perfectly calibrated agent
    #[serde(default = "default_autonomy_factor")]
    pub autonomy_factor: f64,

    /// Lowest knowledge threshold ever produced
    #[serde(default = "default_know_floor")]
    pub know_floor: f64,

    /// Highest uncertainty threshold ever produced
    #[serde(default = "default_uncertainty_ceiling")]
    pub uncertainty_ceiling: f64,

    /// Deadline for each storage query in milliseconds
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

const fn default_base_know_threshold() -> f64 {
    0.70
}

const fn default_base_uncertainty_threshold() -> f64 {
    0.35
}

const fn default_min_transactions() -> usize {
    5
}

const fn default_lookback() -> usize {
    20
}

const fn default_autonomy_factor() -> f64 {
    0.15
}

const fn default_know_floor() -> f64 {
    0.55
}

const fn default_uncertainty_ceiling() -> f64 {
    0.50
}

const fn default_query_timeout_ms() -> u64 {
    500
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            base_know_threshold: default_base_know_threshold(),
            base_uncertainty_threshold: default_base_uncertainty_threshold(),
            min_transactions: default_min_transactions(),
            lookback: default_lookback(),
            autonomy_factor: default_autonomy_factor(),
            know_floor: default_know_floor(),
            uncertainty_ceiling: default_uncertainty_ceiling(),
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

impl CalibrationConfig {
    pub fn query_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.query_timeout_ms)
    }
}
