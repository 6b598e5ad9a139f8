//! Error types for Google Photos provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Google Photos provider errors
#[derive(Error, Debug)]
pub enum GooglePhotosError {
    /// Access token missing, expired or lacking scope
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// API request returned an error
    #[error("Google Photos API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for Google Photos operations
pub type Result<T> = std::result::Result<T, GooglePhotosError>;

impl From<GooglePhotosError> for BridgeError {
    fn from(error: GooglePhotosError) -> Self {
        match error {
            GooglePhotosError::BridgeError(e) => e,
            GooglePhotosError::AuthenticationFailed(message) => BridgeError::Unauthorized(message),
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}
