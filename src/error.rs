//! Error types for the rating and attribution engine
//!
//! Engine operations return the typed [`EngineError`] so callers can tell
//! rejected input apart from soft numerical failures. Configuration loading
//! and the binary use anyhow for context-rich reporting.

/// Result type alias for application-level code (config loading, CLI)
pub type Result<T> = anyhow::Result<T>;

/// Result type alias for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Errors raised by engine computations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Volatility solver did not converge after {iterations} iterations")]
    ConvergenceFailure { iterations: u32 },

    #[error("Coalition of {sources} sources exceeds the enumeration limit of {max}")]
    CoalitionTooLarge { sources: usize, max: usize },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidInput`]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`EngineError::Configuration`]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Stable label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidInput { .. } => "invalid_input",
            EngineError::ConvergenceFailure { .. } => "convergence_failure",
            EngineError::CoalitionTooLarge { .. } => "coalition_too_large",
            EngineError::Configuration { .. } => "configuration",
        }
    }
}
