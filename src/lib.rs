#[cfg(feature = "reqwest")]
pub mod cli;
pub mod config;
pub mod services;

pub mod env;
pub mod logging;

pub use logging::{init_logging, LoggingConfig};
pub use services::google_ai::{
    GenerationError, GenerationRequest, GenerationResult, GroundedClient, GroundingConfig,
    RetryConfig, Source,
};
