pub mod google_ai;

pub use google_ai::{
    GenerationError, GenerationRequest, GenerationResult, GroundedClient, GroundingConfig, Source,
};
