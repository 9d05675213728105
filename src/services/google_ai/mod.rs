pub mod client;
pub mod errors;
pub mod models;
pub mod retry;
pub mod transport;

pub use client::{parse_response, GroundedClient, GroundingConfig};
pub use errors::{AttemptError, GenerationError, RetryError, Retryable};
pub use models::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationRequest,
    GenerationResult, GroundingMetadata, Part, Source, Tool, UsageMetadata,
};
pub use retry::{JitteredBackoff, RetryConfig, RetryHandler, RetryState};
pub use transport::{HttpTransport, TransportError, TransportResponse};

#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
