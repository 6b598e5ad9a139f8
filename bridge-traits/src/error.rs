use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// Credentials were rejected. Retrying with the same token cannot help.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// The underlying `io::ErrorKind`, when this error came from the filesystem.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            BridgeError::Io(e) => Some(e.kind()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BridgeError::Unauthorized(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_kind_is_exposed() {
        let error = BridgeError::from(io::Error::new(io::ErrorKind::PermissionDenied, "nope"));
        assert_eq!(error.io_kind(), Some(io::ErrorKind::PermissionDenied));

        let error = BridgeError::OperationFailed("boom".to_string());
        assert_eq!(error.io_kind(), None);
    }

    #[test]
    fn test_unauthorized_is_distinct() {
        let error = BridgeError::Unauthorized("token expired".to_string());
        assert!(error.is_unauthorized());
        assert_eq!(error.io_kind(), None);
        assert_eq!(error.to_string(), "Unauthorized: token expired");

        assert!(!BridgeError::OperationFailed("HTTP 500".to_string()).is_unauthorized());
    }
}
