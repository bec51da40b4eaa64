//! Error types for contest source operations.

use thiserror::Error;

/// Errors that can occur while fetching a platform's contest listing.
///
/// Adapters recover from all of these locally: a failed fetch is logged and
/// yields an empty listing, never a propagated error.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::ParseError(err.to_string())
        } else {
            SourceError::RequestFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::ParseError(err.to_string())
    }
}
