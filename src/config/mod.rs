use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

const COUNTRY_CODES_FILE: &str = "country_codes.csv";
const COUNTRY_INFO_FILE: &str = "country_info.csv";
const NOTABLE_ACCOUNTS_FILE: &str = "notable_accounts.txt";

/// Distinguishes runtime behavior for different stages of the pipeline.
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

/// Top-level configuration for the badge pipeline.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub reference: ReferenceConfig,
    pub assignment: AssignmentConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let reference_dir = env::var("APP_REFERENCE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let worker_threads = match env::var("APP_WORKER_THREADS") {
            Ok(raw) => {
                let parsed = raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidWorkerThreads { value: raw.clone() })?;
                if parsed == 0 {
                    return Err(ConfigError::InvalidWorkerThreads { value: raw });
                }
                Some(parsed)
            }
            Err(_) => None,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            reference: ReferenceConfig { reference_dir },
            assignment: AssignmentConfig { worker_threads },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Location of the static reference tables consumed by the geographic and fun rules.
#[derive(Debug, Clone)]
pub struct ReferenceConfig {
    pub reference_dir: PathBuf,
}

impl ReferenceConfig {
    pub fn new(reference_dir: impl Into<PathBuf>) -> Self {
        Self {
            reference_dir: reference_dir.into(),
        }
    }

    pub fn reference_dir(&self) -> &Path {
        &self.reference_dir
    }

    pub fn country_codes_path(&self) -> PathBuf {
        self.reference_dir.join(COUNTRY_CODES_FILE)
    }

    pub fn country_info_path(&self) -> PathBuf {
        self.reference_dir.join(COUNTRY_INFO_FILE)
    }

    pub fn notable_accounts_path(&self) -> PathBuf {
        self.reference_dir.join(NOTABLE_ACCOUNTS_FILE)
    }
}

/// Sizing for the population-wide assignment pass.
#[derive(Debug, Clone, Default)]
pub struct AssignmentConfig {
    /// `None` uses the global rayon pool.
    pub worker_threads: Option<usize>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidWorkerThreads { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidWorkerThreads { value } => write!(
                f,
                "APP_WORKER_THREADS must be a positive integer (found '{}')",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
