//! Error types and handling for the proposal search client

use thiserror::Error;

/// Application error types
#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    /// Backend answered with a non-2xx status
    #[error("Search failed: {reason}")]
    Http { status: u16, reason: String },
    #[error("Response parse failed: {0}")]
    Parse(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Build an HTTP error from a response status, using the canonical reason phrase
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        let reason = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_str().to_string());
        AppError::Http {
            status: status.as_u16(),
            reason,
        }
    }

    /// Stable machine-readable code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Config(_) => "config_error",
            AppError::Network(_) => "network_error",
            AppError::Http { .. } => "http_error",
            AppError::Parse(_) => "parse_error",
            AppError::Timeout(_) => "timeout",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Process exit code for CLI mode
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::InvalidInput(_) | AppError::Config(_) => 1,
            AppError::Network(_) | AppError::Http { .. } | AppError::Parse(_) => 2,
            AppError::Timeout(_) => 4,
            AppError::Internal(_) => 5,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Convert anyhow::Error to AppError
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{:#}", err))
    }
}

/// Convert reqwest::Error to AppError
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else if err.is_decode() {
            AppError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            AppError::from_status(status)
        } else {
            AppError::Network(err.to_string())
        }
    }
}

/// Convert serde_json::Error to AppError
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(format!("invalid URL: {}", err))
    }
}

/// Reject date filters that are not `YYYY-MM-DD`
pub fn validate_date_filter(value: &str) -> Result<(), AppError> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| AppError::InvalidInput(format!("Date must be YYYY-MM-DD, got '{}'", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_uses_reason_phrase() {
        let err = AppError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Search failed: Internal Server Error");
        assert_eq!(err.error_code(), "http_error");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_http_error_without_reason_falls_back_to_code() {
        let status = reqwest::StatusCode::from_u16(599).unwrap();
        let err = AppError::from_status(status);
        assert_eq!(err.to_string(), "Search failed: 599");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::InvalidInput("x".into()).exit_code(), 1);
        assert_eq!(AppError::Config("x".into()).exit_code(), 1);
        assert_eq!(AppError::Network("x".into()).exit_code(), 2);
        assert_eq!(AppError::Timeout("x".into()).exit_code(), 4);
        assert_eq!(AppError::Internal("x".into()).exit_code(), 5);
    }

    #[test]
    fn test_validate_date_filter() {
        assert!(validate_date_filter("2023-05-01").is_ok());
        assert!(validate_date_filter("01.05.2023").is_err());
        assert!(validate_date_filter("2023-13-01").is_err());
    }
}
