//! Error types raised by platform API requests.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by [`PlatformClient`](crate::PlatformClient) requests.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The platform does not know the requested user or challenge.
    #[error("resource not found: {url}")]
    NotFound { url: String },

    /// The platform rejected the configured api key.
    #[error("api key rejected by the platform")]
    Unauthorized,

    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("request to the platform failed")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode platform response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
