// Provider Error Types

use phimtv_providers::ProviderClientError;

/// Per-provider fetch failure. Always recovered inside the aggregator;
/// a failing provider simply contributes nothing to the merged result.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider}: request failed: {source}")]
    Client {
        provider: &'static str,
        #[source]
        source: ProviderClientError,
    },

    #[error("{provider}: timed out after {timeout_ms} ms")]
    Timeout { provider: &'static str, timeout_ms: u64 },

    #[error("{provider}: malformed response: {reason}")]
    Malformed { provider: &'static str, reason: String },
}

impl ProviderError {
    #[must_use]
    pub fn client(provider: &'static str, source: ProviderClientError) -> Self {
        Self::Client { provider, source }
    }

    /// Which provider failed.
    #[must_use]
    pub fn provider(&self) -> &'static str {
        match self {
            Self::Client { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::Malformed { provider, .. } => provider,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
