//! Error types for spxsift.
//!
//! This module provides error handling following the thiserror pattern.
//! The taxonomy is deliberately small: only unreadable input and unresolved
//! lookups surface as errors. Heuristic misses inside the correlation and
//! reconstruction engines never produce errors; they degrade to omitted
//! fields or fallback strategies instead.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for spxsift operations.
#[derive(Error, Debug)]
pub enum SiftError {
    /// Log file not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Permission denied when accessing the log file.
    #[error("Permission denied: {path}")]
    PermissionDenied {
        /// Path where access was denied.
        path: PathBuf,
    },

    /// Requested session ID was not found in the log.
    #[error("Session not found: {session_id}")]
    SessionNotFound {
        /// Session ID that was not found.
        session_id: String,
    },

    /// Requested thread ID was not found in the log.
    #[error("Thread not found: {thread_id}")]
    ThreadNotFound {
        /// Thread ID that was not found.
        thread_id: String,
    },

    /// The log contains no authoritative session start events, so thread
    /// analysis has nothing to anchor on.
    #[error("No SessionStarted events found; thread analysis is unavailable")]
    NoSessionStartEvents,

    /// Configuration error.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Human-readable error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {context}")]
    IoError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {context}")]
    SerializationError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying serde_json error.
        #[source]
        source: serde_json::Error,
    },
}

impl SiftError {
    /// Create a new I/O error with context.
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            context: context.into(),
            source,
        }
    }

    /// Create a new session-not-found error.
    #[must_use]
    pub fn session_not_found(session_id: impl Into<String>) -> Self {
        Self::SessionNotFound {
            session_id: session_id.into(),
        }
    }

    /// Create a new thread-not-found error.
    #[must_use]
    pub fn thread_not_found(thread_id: impl Into<String>) -> Self {
        Self::ThreadNotFound {
            thread_id: thread_id.into(),
        }
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. }
            | Self::SessionNotFound { .. }
            | Self::ThreadNotFound { .. }
            | Self::NoSessionStartEvents => 3,
            Self::PermissionDenied { .. } => 4,
            Self::InvalidConfig { .. } => 5,
            Self::IoError { .. } => 74,
            Self::SerializationError { .. } => 1,
        }
    }

    /// Check if this error is a not-found style result rather than a failure
    /// of the analysis machinery itself.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::SessionNotFound { .. }
                | Self::ThreadNotFound { .. }
                | Self::NoSessionStartEvents
        )
    }
}

/// Result type alias for spxsift operations.
pub type Result<T> = std::result::Result<T, SiftError>;

impl From<std::io::Error> for SiftError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            context: "I/O operation failed".to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for SiftError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            context: "JSON operation failed".to_string(),
            source: err,
        }
    }
}

/// Exit codes for CLI operations.
pub mod exit_codes {
    /// Operation completed successfully.
    pub const EXIT_SUCCESS: i32 = 0;
    /// General/unspecified error.
    pub const EXIT_GENERAL_ERROR: i32 = 1;
    /// Specified file, session, or thread not found.
    pub const EXIT_NOT_FOUND: i32 = 3;
    /// Insufficient permissions.
    pub const EXIT_PERMISSION_DENIED: i32 = 4;
    /// Invalid configuration.
    pub const EXIT_CONFIG_ERROR: i32 = 5;
    /// I/O error (BSD standard).
    pub const EXIT_IO_ERROR: i32 = 74;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let not_found = SiftError::FileNotFound {
            path: PathBuf::from("/test.log"),
        };
        assert_eq!(not_found.exit_code(), 3);

        let session = SiftError::session_not_found("abc");
        assert_eq!(session.exit_code(), 3);

        let config = SiftError::InvalidConfig {
            message: "bad".to_string(),
        };
        assert_eq!(config.exit_code(), 5);
    }

    #[test]
    fn test_is_not_found() {
        assert!(SiftError::session_not_found("abc").is_not_found());
        assert!(SiftError::NoSessionStartEvents.is_not_found());
        assert!(!SiftError::InvalidConfig {
            message: "bad".to_string()
        }
        .is_not_found());
    }
}
