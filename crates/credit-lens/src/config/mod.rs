use crate::report::{BureauSelector, ReportError};
use std::env;

/// Distinguishes runtime behavior for different stages of the service.
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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub report: ReportConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("CREDIT_LENS_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let default_bureau = env::var("CREDIT_LENS_DEFAULT_BUREAU").ok();
        let default_bureau = BureauSelector::parse(default_bureau.as_deref())
            .map_err(|source| ConfigError::InvalidBureau { source })?;

        let log_level = env::var("CREDIT_LENS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            report: ReportConfig { default_bureau },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Defaults applied when a report request leaves options unset.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub default_bureau: BureauSelector,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("CREDIT_LENS_DEFAULT_BUREAU must name a known bureau or 'all'")]
    InvalidBureau {
        #[source]
        source: ReportError,
    },
}
