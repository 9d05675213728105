use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::errors::{AttemptError, GenerationError, RetryError};
use super::models::{GenerateContentResponse, GenerationRequest, GenerationResult};
use super::retry::{RetryConfig, RetryHandler};
use super::transport::{HttpTransport, TransportResponse};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-05-20";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct GroundingConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Per-attempt timeout; elapsed timeouts count as transport failures.
    pub timeout: Duration,
}

impl GroundingConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.api_key.is_empty() {
            return Err(GenerationError::ConfigurationError {
                message: "API key is required".to_string(),
            });
        }

        if self.base_url.is_empty() {
            return Err(GenerationError::ConfigurationError {
                message: "Base URL cannot be empty".to_string(),
            });
        }

        if self.model.is_empty() {
            return Err(GenerationError::ConfigurationError {
                message: "Model name cannot be empty".to_string(),
            });
        }

        if self.timeout.is_zero() {
            return Err(GenerationError::ConfigurationError {
                message: "Timeout must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// Client for the generateContent endpoint with retry and grounding extraction.
///
/// Holds no per-call state: every `generate` owns its own retry bookkeeping,
/// so one client can be shared across tasks.
#[derive(Clone)]
pub struct GroundedClient {
    config: GroundingConfig,
    retry_config: RetryConfig,
    transport: Arc<dyn HttpTransport>,
}

impl GroundedClient {
    #[cfg(feature = "reqwest")]
    pub fn new(config: GroundingConfig) -> Result<Self, GenerationError> {
        config.validate()?;

        let transport = super::transport::ReqwestTransport::new(config.timeout).map_err(|e| {
            GenerationError::ConfigurationError {
                message: format!("Failed to create HTTP client: {e}"),
            }
        })?;

        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(
        config: GroundingConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, GenerationError> {
        config.validate()?;

        Ok(Self {
            config,
            retry_config: RetryConfig::default(),
            transport,
        })
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Result<Self, GenerationError> {
        retry_config.validate()?;
        self.retry_config = retry_config;
        Ok(self)
    }

    pub fn config(&self) -> &GroundingConfig {
        &self.config
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        self.run(request, None).await
    }

    /// Like [`generate`](Self::generate), but aborts the in-flight attempt or
    /// pending backoff as soon as `cancel` fires.
    pub async fn generate_with_cancel(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult, GenerationError> {
        self.run(request, Some(cancel)).await
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<GenerationResult, GenerationError> {
        if request.user_prompt().trim().is_empty() {
            return Err(GenerationError::InvalidRequest {
                message: "User prompt must not be empty".to_string(),
            });
        }

        let payload = request.to_wire();
        let url = self.config.endpoint_url();

        tracing::debug!(
            model = %self.config.model,
            grounding = request.search_grounding(),
            has_system_prompt = request.system_prompt().is_some(),
            "Sending generateContent request"
        );

        let mut handler = RetryHandler::new(self.retry_config.clone());
        let outcome = handler
            .retry(|_| self.send_once(&url, &payload), cancel)
            .await;

        let response = match outcome {
            Ok(response) => response,
            Err(retry_error) => return Err(into_generation_error(retry_error, handler.attempts())),
        };

        parse_response(response.status, &response.body)
    }

    async fn send_once(
        &self,
        url: &str,
        payload: &super::models::GenerateContentRequest,
    ) -> Result<TransportResponse, AttemptError> {
        let response = self
            .transport
            .post_json(url, &self.config.api_key, payload)
            .await?;

        if response.is_success() {
            Ok(response)
        } else {
            Err(AttemptError::Status {
                status: response.status,
                body: response.body,
            })
        }
    }
}

fn into_generation_error(error: RetryError<AttemptError>, attempts: u32) -> GenerationError {
    match error {
        RetryError::NonRetryable {
            source: AttemptError::Status { status, body },
        } => {
            tracing::error!(status, body = %body, "Upstream rejected request");
            GenerationError::from_status_and_body(status, &body)
        }
        RetryError::Exhausted {
            attempts,
            last: AttemptError::Status { status, body },
        } => {
            tracing::error!(attempts, status, body = %body, "Retries exhausted");
            GenerationError::RetriesExhausted {
                attempts,
                last_status: status,
            }
        }
        RetryError::Exhausted {
            last: AttemptError::Transport(source),
            ..
        }
        | RetryError::NonRetryable {
            source: AttemptError::Transport(source),
        } => {
            tracing::error!(attempts, error = %source, "Transport failure");
            GenerationError::TransportFailure { attempts, source }
        }
        RetryError::Cancelled => {
            tracing::info!(attempts, "Generation cancelled");
            GenerationError::Cancelled
        }
    }
}

/// Turns a 2xx body into a [`GenerationResult`].
///
/// An embedded `error` object wins over any candidates; a body without usable
/// text is `EmptyGeneration`, never an empty success.
pub fn parse_response(status: u16, body: &str) -> Result<GenerationResult, GenerationError> {
    let envelope: serde_json::Value =
        serde_json::from_str(body).map_err(|e| GenerationError::EmptyGeneration {
            reason: format!("Malformed response body: {e}"),
        })?;

    // Checked on the raw envelope so a malformed candidate list cannot mask it.
    if let Some(error) = envelope.get("error").filter(|e| !e.is_null()) {
        let embedded_status = error
            .get("code")
            .and_then(|code| code.as_u64())
            .and_then(|code| u16::try_from(code).ok())
            .unwrap_or(status);
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());

        tracing::error!(status = embedded_status, body = %body, "Error embedded in success response");
        return Err(GenerationError::UpstreamRejected {
            status: embedded_status,
            message,
            body: body.to_string(),
        });
    }

    let response: GenerateContentResponse =
        serde_json::from_value(envelope).map_err(|e| GenerationError::EmptyGeneration {
            reason: format!("Malformed response envelope: {e}"),
        })?;

    if response.candidates.is_empty() {
        return Err(GenerationError::EmptyGeneration {
            reason: "No candidates in response".to_string(),
        });
    }

    let text = match response.extract_text() {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => {
            return Err(GenerationError::EmptyGeneration {
                reason: match response.get_finish_reason() {
                    Some(reason) => format!("No text content in response (finish reason {reason})"),
                    None => "No text content in response".to_string(),
                },
            })
        }
    };

    let sources = response.extract_sources();

    tracing::debug!(
        total_tokens = ?response.get_token_usage(),
        finish_reason = ?response.get_finish_reason(),
        sources = sources.len(),
        "Generation succeeded"
    );

    Ok(GenerationResult { text, sources })
}
