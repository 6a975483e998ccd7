//! Errors raised by the lookup collaborators.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Permission denied")]
    PermissionDenied,

    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),

    #[error("Lookup timed out")]
    Timeout,

    #[error("Lookup not supported: {0}")]
    Unsupported(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),
}

impl LookupError {
    /// Short message for display next to a degraded widget.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "Location sharing is turned off.",
            Self::PositionUnavailable(_) => "Your location could not be determined.",
            Self::Timeout => "The lookup took too long.",
            Self::Unsupported(_) => "This lookup is not available here.",
            Self::Network(_) => "Network error. Check your connection.",
            Self::Api { status, .. } if *status >= 500 => {
                "The service is having trouble. Please try again later."
            }
            Self::Api { .. } => "The service rejected the request.",
            Self::Parse(_) => "Received an unexpected response.",
            Self::NotFound(_) => "Nothing matched.",
            Self::MissingConfiguration(_) => "This feature is not configured.",
        }
    }

    /// Whether repeating the same call could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout => true,
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500 || *status == 429 || *status == 408,
            _ => false,
        }
    }
}
