//! Error types for the storefront API client

use thiserror::Error;

/// How a failure should be presented to the user
///
/// Every failure surfaces as exactly one notification tagged with one of
/// these categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    /// The request did not complete or the server failed (5xx, timeouts)
    Network,
    /// Rejected locally before any request was sent
    Validation,
    /// The server disagrees with the client's view (unknown id, stock exceeded)
    Inconsistency,
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::Validation => write!(f, "validation"),
            Self::Inconsistency => write!(f, "inconsistency"),
        }
    }
}

/// Errors that can occur when talking to the storefront API
///
/// `Clone + PartialEq` so the error can travel inside reducer actions.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Client configuration is unusable (bad base URL, TLS setup)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input rejected locally, no request was sent
    #[error("Validation failed: {0}")]
    Validation(String),

    /// HTTP request failed before a response arrived
    #[error("Request failed: {0}")]
    Network(String),

    /// Resource does not exist on the server
    #[error("Not found: {message}")]
    NotFound {
        /// Body returned by the server
        message: String,
    },

    /// Server refused the request (400, 409, 422)
    #[error("Rejected (status {status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Body returned by the server
        message: String,
    },

    /// Any other non-success status
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Body returned by the server
        message: String,
    },

    /// Response body did not have the expected shape
    #[error("Response parsing failed: {0}")]
    Decode(String),
}

impl ApiError {
    /// Category used when the failure is shown to the user
    #[must_use]
    pub const fn category(&self) -> FailureCategory {
        match self {
            Self::Validation(_) => FailureCategory::Validation,
            Self::NotFound { .. } | Self::Rejected { .. } => FailureCategory::Inconsistency,
            Self::InvalidConfig(_) | Self::Network(_) | Self::Status { .. } | Self::Decode(_) => {
                FailureCategory::Network
            },
        }
    }

    /// HTTP status, when the server answered
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Rejected { status, .. } | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(
            ApiError::Validation("quantity".into()).category(),
            FailureCategory::Validation
        );
        assert_eq!(
            ApiError::NotFound { message: String::new() }.category(),
            FailureCategory::Inconsistency
        );
        assert_eq!(
            ApiError::Rejected { status: 409, message: "stock".into() }.category(),
            FailureCategory::Inconsistency
        );
        assert_eq!(
            ApiError::Status { status: 503, message: String::new() }.category(),
            FailureCategory::Network
        );
        assert_eq!(ApiError::Network("timeout".into()).category(), FailureCategory::Network);
    }

    #[test]
    fn status_is_exposed_for_server_answers() {
        assert_eq!(ApiError::NotFound { message: String::new() }.status(), Some(404));
        assert_eq!(ApiError::Decode("eof".into()).status(), None);
    }
}
