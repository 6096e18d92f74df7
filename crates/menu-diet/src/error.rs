use crate::config::ConfigError;
use crate::diet::{MenuImportError, RepositoryError, SuitabilityServiceError};
use crate::telemetry::TelemetryError;
use std::fmt;

/// Aggregate error for hosts wiring config, telemetry, imports, and the service together.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Json(serde_json::Error),
    MenuImport(MenuImportError),
    Repository(RepositoryError),
    Suitability(SuitabilityServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Json(err) => write!(f, "json error: {}", err),
            AppError::MenuImport(err) => write!(f, "menu import error: {}", err),
            AppError::Repository(err) => write!(f, "repository error: {}", err),
            AppError::Suitability(err) => write!(f, "suitability error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::MenuImport(err) => Some(err),
            AppError::Repository(err) => Some(err),
            AppError::Suitability(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<MenuImportError> for AppError {
    fn from(value: MenuImportError) -> Self {
        Self::MenuImport(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Repository(value)
    }
}

impl From<SuitabilityServiceError> for AppError {
    fn from(value: SuitabilityServiceError) -> Self {
        Self::Suitability(value)
    }
}
