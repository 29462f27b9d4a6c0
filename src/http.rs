//! HTTP client utilities
//!
//! Provides a reqwest::Client configured with a request timeout. Proxy
//! environment variables (HTTP_PROXY, HTTPS_PROXY, NO_PROXY) are honored
//! by reqwest itself.

use crate::error::AppError;
use reqwest::Client;
use std::time::Duration;

/// Build a reqwest Client with the given per-request timeout
pub fn client_with_timeout(timeout: Duration) -> Result<Client, AppError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .user_agent(concat!("akta-search/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_with_short_timeout() {
        assert!(client_with_timeout(Duration::from_millis(250)).is_ok());
    }
}
