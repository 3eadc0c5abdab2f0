//! Client error types

use thiserror::Error;

/// Errors that can occur when calling the portal API
#[derive(Error, Debug)]
pub enum ClientError {
    /// Server could not be reached
    #[error("Portal API unavailable: {0}")]
    Unavailable(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Missing, invalid or expired token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success status, with the server's `detail` message
    #[error("API error {status}: {detail}")]
    Api { status: u16, detail: String },

    /// Response body did not match the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Whether the stored token should be discarded
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { detail, .. } => detail.clone(),
            ClientError::Unauthorized(detail) => detail.clone(),
            ClientError::Unavailable(_) | ClientError::Timeout | ClientError::Request(_) => {
                "Network or server error. Please try again.".to_string()
            }
            ClientError::Decode(_) => "The server sent an unexpected response.".to_string(),
        }
    }

    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_connect() {
            ClientError::Unavailable(e.to_string())
        } else if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Request(e)
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_detail() {
        let err = ClientError::Api {
            status: 400,
            detail: "Email already registered".to_string(),
        };
        assert_eq!(err.user_message(), "Email already registered");
        assert_eq!(err.to_string(), "API error 400: Email already registered");
        assert!(!err.is_auth_failure());

        let err = ClientError::Unauthorized("Invalid token".to_string());
        assert!(err.is_auth_failure());
        assert_eq!(ClientError::Timeout.user_message(), "Network or server error. Please try again.");
    }
}
