use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the suite.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub data: DataConfig,
    pub generation: GenerationConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let customer_file = env::var("SUITE_CUSTOMER_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("customers.json"));
        let report_dir = env::var("SUITE_REPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let seed = match env::var("SUITE_RNG_SEED") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidSeed { value: raw.clone() })?,
            ),
            _ => None,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            data: DataConfig {
                customer_file,
                report_dir,
            },
            generation: GenerationConfig { seed },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Where customer records are read from and reports are written to.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub customer_file: PathBuf,
    pub report_dir: PathBuf,
}

/// Controls for the random source handed to the generators.
#[derive(Debug, Clone, Default)]
pub struct GenerationConfig {
    /// Fixed seed for reproducible runs; `None` draws a fresh seed per run.
    pub seed: Option<u64>,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidSeed { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSeed { value } => {
                write!(f, "SUITE_RNG_SEED must be a valid u64 (got '{}')", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
