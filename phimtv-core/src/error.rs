use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A single upstream provider failed or timed out. Recovered inside the
    /// aggregator; only surfaces in logs.
    #[error("Provider unavailable: {provider}: {reason}")]
    ProviderUnavailable { provider: &'static str, reason: String },

    /// Every provider failed or none had a matching record.
    #[error("No data found")]
    NoDataFound,

    /// The native or embedded player failed to start or continue. Recoverable
    /// via user-initiated retry; the playback session stays alive.
    #[error("Stream load error: {0}")]
    StreamLoad(String),

    /// A progress report to the backend failed. Logged and discarded; the
    /// next periodic tick retries with fresher data.
    #[error("Sync write failure: {0}")]
    SyncWrite(String),

    /// No valid user session for a user-scoped operation. Callers degrade to
    /// device-local behavior rather than blocking playback.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::provider::ProviderError> for Error {
    fn from(err: crate::provider::ProviderError) -> Self {
        Self::ProviderUnavailable {
            provider: err.provider(),
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
