use std::time::Duration;

use thiserror::Error;

/// Boxed provider error carried as the source of a [`FetchError`].
pub type ProviderError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure to build the exporter. Fatal: the process must not start serving.
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("Invalid region: {0:?}")]
    InvalidRegion(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of one inventory listing. Non-fatal: the cycle produces no samples.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Provider request failed: {0}")]
    Provider(#[source] ProviderError),

    #[error("Provider request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed record #{index}: {reason}")]
    MalformedRecord { index: usize, reason: String },
}

impl FetchError {
    /// Short label value for the failure counter.
    pub fn reason(&self) -> &'static str {
        match self {
            FetchError::Provider(_) => "provider",
            FetchError::Timeout(_) => "timeout",
            FetchError::MalformedRecord { .. } => "malformed_record",
        }
    }
}
