use bridge_traits::error::BridgeError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to list {context}: {source}")]
    Listing {
        context: String,
        #[source]
        source: BridgeError,
    },

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: BridgeError,
    },

    #[error("Invalid remote timestamp '{value}': {message}")]
    InvalidTimestamp { value: String, message: String },
}

impl SyncError {
    /// A listing the service refused because of the credentials
    pub fn is_auth(&self) -> bool {
        matches!(self, SyncError::Listing { source, .. } if source.is_unauthorized())
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: BridgeError) -> Self {
        SyncError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// Why a single deletion did not happen. Never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeleteFailure {
    #[error("permission denied")]
    PermissionDenied,

    #[error("entry already gone")]
    AlreadyGone,

    #[error("{0}")]
    Io(String),
}

impl From<&BridgeError> for DeleteFailure {
    fn from(error: &BridgeError) -> Self {
        match error.io_kind() {
            Some(io::ErrorKind::PermissionDenied) => DeleteFailure::PermissionDenied,
            Some(io::ErrorKind::NotFound) => DeleteFailure::AlreadyGone,
            _ => DeleteFailure::Io(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_failure_classification() {
        let denied = BridgeError::from(io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(DeleteFailure::from(&denied), DeleteFailure::PermissionDenied);

        let gone = BridgeError::from(io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(DeleteFailure::from(&gone), DeleteFailure::AlreadyGone);

        let other = BridgeError::OperationFailed("disk on fire".to_string());
        assert!(matches!(DeleteFailure::from(&other), DeleteFailure::Io(msg) if msg.contains("disk on fire")));
    }

    #[test]
    fn test_auth_failures_are_recognized() {
        let rejected = SyncError::Listing {
            context: "albums".to_string(),
            source: BridgeError::Unauthorized("token expired".to_string()),
        };
        assert!(rejected.is_auth());

        let flaky = SyncError::Listing {
            context: "albums".to_string(),
            source: BridgeError::OperationFailed("HTTP 503".to_string()),
        };
        assert!(!flaky.is_auth());
        assert!(!SyncError::filesystem("/photos", BridgeError::Unauthorized("x".to_string())).is_auth());
    }

    #[test]
    fn test_filesystem_error_display() {
        let error = SyncError::filesystem(
            "/photos/Trip",
            BridgeError::OperationFailed("read-only".to_string()),
        );
        assert_eq!(
            error.to_string(),
            "Filesystem error at /photos/Trip: Bridge operation failed: read-only"
        );
    }
}
