//! Error types for waitval-core
//!
//! Every error here is fatal to the wait. A poll that finds no matching row
//! is not an error; it is [`crate::poll::PollOutcome::Exhausted`].

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for waitval-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connecting, preparing, executing or reading failed
    Database,
    /// The wait was configured incorrectly
    Configuration,
    /// The credentials file could not be used
    Credentials,
    /// The current user could not be determined
    Identity,
}

/// Main error type for waitval-core
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    /// Error reported by the database layer
    #[error(transparent)]
    Database(#[from] waitval_rdbc::Error),

    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Credentials file could not be read or parsed
    #[error("failed to read credentials from {}: {message}", path.display())]
    Credentials {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Current user lookup failed
    #[error("failed to get current user: {message}")]
    Identity {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Database(_) => ErrorCategory::Database,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Credentials { .. } => ErrorCategory::Credentials,
            Self::Identity { .. } => ErrorCategory::Identity,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a credentials error with source
    pub fn credentials_with_source(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Credentials {
            path: path.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an identity error with source
    pub fn identity_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Identity {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database => write!(f, "database"),
            Self::Configuration => write!(f, "configuration"),
            Self::Credentials => write!(f, "credentials"),
            Self::Identity => write!(f, "identity"),
        }
    }
}
