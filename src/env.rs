//! Environment variable constants used throughout the application
//!
//! This module centralizes all environment variable names to ensure consistency
//! and make it easier to manage configuration across the codebase.

/// Logging configuration
pub mod logging {
    /// Log level configuration (e.g., "debug", "info", "warn", "error")
    pub const LOG_LEVEL: &str = "GROUNDGEN_LOG_LEVEL";

    /// Log file path for file-based logging
    pub const LOG_FILE: &str = "GROUNDGEN_LOG_FILE";

    /// Emit logs as JSON lines
    pub const LOG_JSON: &str = "GROUNDGEN_LOG_JSON";

    /// Disable colored output (follows the NO_COLOR standard)
    pub const NO_COLOR: &str = "NO_COLOR";
}

/// Generative-language API configuration
pub mod apis {
    /// API key for the generateContent endpoint
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";

    /// Model identifier override
    pub const MODEL: &str = "GROUNDGEN_MODEL";

    /// Base URL override (useful for proxies and local stubs)
    pub const BASE_URL: &str = "GROUNDGEN_BASE_URL";

    /// Per-attempt request timeout in seconds
    pub const TIMEOUT: &str = "GROUNDGEN_TIMEOUT";
}
