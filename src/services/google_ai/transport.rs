use async_trait::async_trait;
use thiserror::Error;

use super::models::GenerateContentRequest;

/// Raw HTTP outcome of one attempt: a status line was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure before any HTTP status was received.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Failed to read response body: {message}")]
    Body { message: String },
}

#[cfg(feature = "reqwest")]
impl TransportError {
    pub fn from_reqwest_error(error: reqwest::Error, timeout: std::time::Duration) -> Self {
        if error.is_timeout() {
            TransportError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            }
        } else if error.is_body() || error.is_decode() {
            TransportError::Body {
                message: error.to_string(),
            }
        } else {
            TransportError::Network {
                message: error.to_string(),
            }
        }
    }
}

/// Sends one generateContent POST. Implementations must not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &GenerateContentRequest,
    ) -> Result<TransportResponse, TransportError>;
}

#[cfg(feature = "reqwest")]
pub use self::reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use super::*;
    use reqwest::Client;
    use std::time::Duration;

    /// [`HttpTransport`] over a pooled `reqwest::Client`.
    #[derive(Clone)]
    pub struct ReqwestTransport {
        client: Client,
        timeout: Duration,
    }

    impl ReqwestTransport {
        pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
            let client = Client::builder().timeout(timeout).build()?;
            Ok(Self { client, timeout })
        }
    }

    #[async_trait]
    impl HttpTransport for ReqwestTransport {
        async fn post_json(
            &self,
            url: &str,
            api_key: &str,
            body: &GenerateContentRequest,
        ) -> Result<TransportResponse, TransportError> {
            let response = self
                .client
                .post(url)
                .header("x-goog-api-key", api_key)
                .header("Content-Type", "application/json")
                .json(body)
                .send()
                .await
                .map_err(|e| TransportError::from_reqwest_error(e, self.timeout))?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| TransportError::from_reqwest_error(e, self.timeout))?;

            Ok(TransportResponse { status, body })
        }
    }
}
