use std::env;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_RESULT_LIMIT: usize = 4;
pub const DEFAULT_MATCH_CALIBRATION: u32 = 25;

/// Distinguishes runtime behavior for different stages of the tool.
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

/// Top-level configuration for the quiz engine and its front ends.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub quiz: QuizConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let result_limit = match env::var("APP_RESULT_LIMIT") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or(ConfigError::InvalidResultLimit(raw))?,
            Err(_) => DEFAULT_RESULT_LIMIT,
        };

        let match_calibration = match env::var("APP_MATCH_CALIBRATION") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|calibration| *calibration > 0)
                .ok_or(ConfigError::InvalidMatchCalibration(raw))?,
            Err(_) => DEFAULT_MATCH_CALIBRATION,
        };

        let questionnaire_path = non_empty_path("APP_QUESTIONNAIRE_PATH");
        let catalog_path = non_empty_path("APP_CATALOG_PATH");
        let rules_path = non_empty_path("APP_RULES_PATH");

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            quiz: QuizConfig {
                result_limit,
                match_calibration,
                questionnaire_path,
                catalog_path,
                rules_path,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn non_empty_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

/// Ranking knobs and optional overrides for the built-in quiz data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    pub result_limit: usize,
    pub match_calibration: u32,
    pub questionnaire_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub rules_path: Option<PathBuf>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            result_limit: DEFAULT_RESULT_LIMIT,
            match_calibration: DEFAULT_MATCH_CALIBRATION,
            questionnaire_path: None,
            catalog_path: None,
            rules_path: None,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidResultLimit(String),
    InvalidMatchCalibration(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidResultLimit(raw) => {
                write!(f, "APP_RESULT_LIMIT must be a positive integer, got '{raw}'")
            }
            ConfigError::InvalidMatchCalibration(raw) => {
                write!(
                    f,
                    "APP_MATCH_CALIBRATION must be a positive integer, got '{raw}'"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
