//! Error types for Shamba
//!
//! This module defines all error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Shamba operations
///
/// Covers configuration loading, the local answer table, the remote
/// prediction endpoint and the session gate.
#[derive(Error, Debug)]
pub enum ShambaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The prediction endpoint could not produce an answer
    ///
    /// Covers transport failures, non-success HTTP statuses and
    /// response bodies that cannot be decoded.
    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),

    /// Local answer table errors (unreadable file, invalid entries)
    #[error("Knowledge table error: {0}")]
    Knowledge(String),

    /// Session token storage errors
    #[error("Session error: {0}")]
    Session(String),

    /// Login was attempted with unusable credentials
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// An operation requiring a session was attempted while logged out
    #[error("Not logged in. Run `shamba login` first")]
    NotLoggedIn,

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type alias for Shamba operations
///
/// Uses `anyhow::Error` so errors can carry context; callers that care
/// about the kind downcast to [`ShambaError`].
pub type Result<T> = anyhow::Result<T>;

/// Returns `true` if the error chain contains [`ShambaError::RemoteUnavailable`]
pub fn is_remote_unavailable(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<ShambaError>(),
        Some(ShambaError::RemoteUnavailable(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = ShambaError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_remote_unavailable_display() {
        let error = ShambaError::RemoteUnavailable("connection refused".to_string());
        assert_eq!(error.to_string(), "Remote unavailable: connection refused");
    }

    #[test]
    fn test_knowledge_error_display() {
        let error = ShambaError::Knowledge("entry 3 has an empty answer".to_string());
        assert_eq!(
            error.to_string(),
            "Knowledge table error: entry 3 has an empty answer"
        );
    }

    #[test]
    fn test_invalid_credentials_display() {
        let error = ShambaError::InvalidCredentials("Please fill in all fields".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid credentials: Please fill in all fields"
        );
    }

    #[test]
    fn test_not_logged_in_display() {
        assert!(ShambaError::NotLoggedIn
            .to_string()
            .contains("shamba login"));
    }

    #[test]
    fn test_keyring_error_conversion() {
        let error: ShambaError = keyring::Error::NoEntry.into();
        assert!(matches!(error, ShambaError::Keyring(_)));
        assert!(error.to_string().starts_with("Keyring error"));
    }

    #[test]
    fn test_is_remote_unavailable_through_anyhow() {
        let err: anyhow::Error = ShambaError::RemoteUnavailable("down".to_string()).into();
        assert!(is_remote_unavailable(&err));

        let other: anyhow::Error = ShambaError::Config("bad".to_string()).into();
        assert!(!is_remote_unavailable(&other));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ShambaError>();
    }
}
