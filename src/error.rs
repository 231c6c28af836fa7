//! Global error handling for prompt-perfect
//!
//! A single error type shared by the tree engine, the prompt assembler and
//! the delivery layer.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::clipboard::ClipboardError;

/// Global error type for prompt-perfect operations
#[derive(Error, Debug)]
pub enum PromptError {
    /// A path vanished or never existed
    #[error("Path not found: {}", path.display())]
    PathNotFound { path: PathBuf },

    /// A path could not be read
    #[error("Permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    /// Malformed line in an ignore-rule source
    #[error("Invalid ignore pattern '{pattern}': {reason}")]
    InvalidIgnorePattern { pattern: String, reason: String },

    /// A setting holds a value outside its domain
    #[error("Setting '{key}' is out of range: {value}")]
    ConfigurationOutOfRange { key: String, value: String },

    /// The assembled prompt is longer than allowed
    #[error("Token limit exceeded. Required: {required}, Limit: {limit}")]
    TokenLimitExceeded { required: usize, limit: usize },

    /// Clipboard errors
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON processing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unexpected error
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl PromptError {
    /// Classify an IO error raised while touching `path`
    pub fn from_io(path: impl Into<PathBuf>, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::PathNotFound { path: path.into() },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path: path.into() },
            _ => Self::Io(err),
        }
    }
}

/// Specialized Result type for prompt-perfect operations
pub type Result<T> = std::result::Result<T, PromptError>;

/// Creates a PromptError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::PromptError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

/// Extension trait for adding context to errors
pub trait ResultExt<T, E> {
    /// Add additional context to an error
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;
}

impl<T, E: std::error::Error + 'static> ResultExt<T, E> for std::result::Result<T, E> {
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|e| {
            let context = f();
            PromptError::Unexpected(format!("{}: {}", context, e))
        })
    }
}

// The binary reports failures through io::Error
impl From<PromptError> for io::Error {
    fn from(err: PromptError) -> Self {
        let kind = match &err {
            PromptError::PathNotFound { .. } => io::ErrorKind::NotFound,
            PromptError::PermissionDenied { .. } => io::ErrorKind::PermissionDenied,
            PromptError::Io(e) => e.kind(),
            PromptError::InvalidArgument(_) | PromptError::Config(_) => {
                io::ErrorKind::InvalidInput
            }
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_classifies_kinds() {
        let missing = PromptError::from_io("a/b", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(missing, PromptError::PathNotFound { ref path } if path.ends_with("b")));

        let denied = PromptError::from_io("a", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(denied, PromptError::PermissionDenied { .. }));

        let other = PromptError::from_io("a", io::Error::from(io::ErrorKind::InvalidData));
        assert!(matches!(other, PromptError::Io(_)));
    }

    #[test]
    fn test_token_limit_message() {
        let err = PromptError::TokenLimitExceeded {
            required: 120,
            limit: 100,
        };
        assert_eq!(
            err.to_string(),
            "Token limit exceeded. Required: 120, Limit: 100"
        );
    }

    #[test]
    fn test_macros_build_variants() {
        fn check(flag: bool) -> Result<()> {
            ensure!(flag, InvalidArgument, "flag was {}", flag);
            Ok(())
        }
        assert!(check(true).is_ok());
        let err = check(false).unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument: flag was false");
    }

    #[test]
    fn test_into_io_error_keeps_kind() {
        let err: io::Error = PromptError::PathNotFound {
            path: PathBuf::from("x"),
        }
        .into();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
