use thiserror::Error;

use super::transport::TransportError;

/// Terminal outcome of a `generate` call.
///
/// Retryable conditions never surface directly: they are retried inside the
/// client and only become `RetriesExhausted` or `TransportFailure` once the
/// attempt budget is spent.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Upstream rejected request with status {status}: {message}")]
    UpstreamRejected {
        status: u16,
        message: String,
        body: String,
    },

    #[error("Retries exhausted after {attempts} attempts (last status {last_status})")]
    RetriesExhausted { attempts: u32, last_status: u16 },

    #[error("Transport failure after {attempts} attempts: {source}")]
    TransportFailure {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error("Empty generation: {reason}")]
    EmptyGeneration { reason: String },

    #[error("Request cancelled")]
    Cancelled,

    /// Only produced while constructing a client, never by `generate`.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl GenerationError {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::InvalidRequest { .. } => "invalid_request",
            GenerationError::UpstreamRejected { .. } => "upstream_rejected",
            GenerationError::RetriesExhausted { .. } => "retries_exhausted",
            GenerationError::TransportFailure { .. } => "transport_failure",
            GenerationError::EmptyGeneration { .. } => "empty_generation",
            GenerationError::Cancelled => "cancelled",
            GenerationError::ConfigurationError { .. } => "configuration",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, GenerationError::Cancelled)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GenerationError::UpstreamRejected { status, .. } => Some(*status),
            GenerationError::RetriesExhausted { last_status, .. } => Some(*last_status),
            _ => None,
        }
    }

    /// Short message suitable for end users. Upstream bodies are never included.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::InvalidRequest { message } => {
                format!("Invalid request: {message}")
            }
            GenerationError::UpstreamRejected { status, .. } => match status {
                401 | 403 => {
                    "The generation service rejected the API key. Please check your configuration."
                        .to_string()
                }
                404 => "The configured model could not be found.".to_string(),
                _ => "The generation service rejected the request.".to_string(),
            },
            GenerationError::RetriesExhausted { .. } => {
                "The generation service is busy. Please try again later.".to_string()
            }
            GenerationError::TransportFailure { .. } => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            GenerationError::EmptyGeneration { .. } => {
                "No answer was generated. Try rephrasing your prompt.".to_string()
            }
            GenerationError::Cancelled => "Request cancelled.".to_string(),
            GenerationError::ConfigurationError { message } => {
                format!("Configuration error: {message}")
            }
        }
    }

    /// Builds an `UpstreamRejected` from a raw error body, pulling
    /// `error.message` out of JSON envelopes when present.
    pub fn from_status_and_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("HTTP {status}"));

        GenerationError::UpstreamRejected {
            status,
            message,
            body: body.to_string(),
        }
    }
}

/// Failure of a single HTTP attempt.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("HTTP {status}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl Retryable for AttemptError {
    /// 429 and every 5xx are transient, as are all transport failures.
    fn is_retryable(&self) -> bool {
        match self {
            AttemptError::Status { status, .. } => is_retryable_status(*status),
            AttemptError::Transport(_) => true,
        }
    }
}

pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || status >= 500
}

/// Classifies an error for [`super::retry::RetryHandler`].
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Terminal outcome of the retry loop, before it is mapped onto
/// [`GenerationError`] by the client.
#[derive(Debug, Error)]
pub enum RetryError<E: std::error::Error + 'static> {
    #[error("Maximum retry attempts exceeded after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },

    #[error("Non-retryable error: {source}")]
    NonRetryable { source: E },

    #[error("Retry cancelled")]
    Cancelled,
}
