use thiserror::Error;

use crate::api::ApiError;

/// Errors surfaced by the challenge handler and zone record manager
#[derive(Debug, Error)]
pub enum ChallengeError {
    /// Credentials missing or unusable, or the API client could not be built
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An operation was invoked before the setup it depends on
    #[error("{0}")]
    Precondition(String),

    /// A fatal DNS provider call failed
    #[error("{message}: {source}")]
    ProviderOperation {
        message: String,
        #[source]
        source: ApiError,
    },
}

impl ChallengeError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// Wrap a provider call failure
    pub fn provider(message: impl Into<String>, source: ApiError) -> Self {
        Self::ProviderOperation {
            message: message.into(),
            source,
        }
    }
}
