//! Error types and handling infrastructure for keyaction.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! custom error types. The binary layers `anyhow` on top for context.
//!
//! ## Design Principles
//!
//! - **Local and recoverable**: nothing in the core is fatal to the host process
//! - **Diagnosable**: rejected registrations carry the reason they were rejected
//! - **Consistency**: standardized Result type across all modules

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for keyaction operations.
#[derive(Error, Debug)]
pub enum KeyActionError {
    /// File system related errors (directory unreadable, permission denied, etc.)
    #[error("File operation failed: {message}")]
    FileError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Action has neither keyboard nor gamepad codes bound
    #[error("Action has no bound keys")]
    NoBoundKeys,

    /// Action has no executable action or idle form
    #[error("Action has no ActionOrIdle form")]
    MissingActionOrIdle,

    /// A structurally identical action is already registered
    #[error("Action is already registered")]
    DuplicateAction,

    /// The external executor could not perform the resolved action
    #[error("Action execution failed: {message}")]
    ExecutionError { message: String },

    /// A configuration document could not be parsed
    #[error("Failed to parse {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    /// Configuration related errors (settings, form table)
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// The session worker is gone or its channel closed
    #[error("Session closed: {message}")]
    SessionClosed { message: String },
}

/// Standard Result type for keyaction operations.
pub type Result<T> = std::result::Result<T, KeyActionError>;

impl KeyActionError {
    /// Create a FileError from an io::Error with additional context
    pub fn file_error(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileError {
            message: message.into(),
            source,
        }
    }

    /// Create an ExecutionError with a descriptive message
    pub fn execution(message: impl Into<String>) -> Self {
        Self::ExecutionError {
            message: message.into(),
        }
    }

    /// Create a ParseError for the given document
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a ConfigError with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a SessionClosed error with a descriptive message
    pub fn session_closed(message: impl Into<String>) -> Self {
        Self::SessionClosed {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for KeyActionError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::FileError {
                message: "File not found".to_string(),
                source: err,
            },
            std::io::ErrorKind::PermissionDenied => Self::FileError {
                message: "Permission denied".to_string(),
                source: err,
            },
            _ => Self::FileError {
                message: "IO operation failed".to_string(),
                source: err,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let parse = KeyActionError::parse("/actions/bad.json", "expected value at line 1");
        assert_eq!(
            parse.to_string(),
            "Failed to parse /actions/bad.json: expected value at line 1"
        );

        assert_eq!(
            KeyActionError::MissingActionOrIdle.to_string(),
            "Action has no ActionOrIdle form"
        );

        let exec = KeyActionError::execution("idle not playable");
        assert_eq!(exec.to_string(), "Action execution failed: idle not playable");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: KeyActionError = io_err.into();

        match err {
            KeyActionError::FileError { message, .. } => {
                assert_eq!(message, "Permission denied");
            }
            _ => panic!("Expected FileError variant"),
        }
    }
}
