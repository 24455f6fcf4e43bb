//! Error types for waitval-rdbc
//!
//! Every variant maps to one step of a poll iteration so the caller can
//! report which step failed:
//! - connecting (descriptor problems, refused or timed out connections)
//! - preparing and executing the statement
//! - reading rows back from the result set

use std::fmt;
use thiserror::Error;

/// Result type for waitval-rdbc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Could not establish or close a connection
    Connection,
    /// Statement preparation failed
    Prepare,
    /// Statement execution failed
    Query,
    /// A row could not be read from the result set
    Scan,
    /// Connection descriptor or options are invalid
    Configuration,
}

/// Main error type for waitval-rdbc
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    /// Connection failed
    #[error("connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Statement could not be prepared
    #[error("prepare error: {message}")]
    Prepare {
        message: String,
        sql: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Statement execution failed
    #[error("query error: {message}")]
    Query {
        message: String,
        sql: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Reading a row failed
    #[error("scan error: {message}")]
    Scan {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl Error {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Connection { .. } => ErrorCategory::Connection,
            Self::Prepare { .. } => ErrorCategory::Prepare,
            Self::Query { .. } => ErrorCategory::Query,
            Self::Scan { .. } => ErrorCategory::Scan,
            Self::Configuration { .. } => ErrorCategory::Configuration,
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error with source
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a prepare error carrying the offending SQL
    pub fn prepare_with_source(
        sql: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Prepare {
            message: "failed to prepare statement".into(),
            sql: Some(sql.into()),
            source: Some(Box::new(source)),
        }
    }

    /// Create a query error carrying the offending SQL
    pub fn query_with_source(
        sql: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Query {
            message: "failed to execute statement".into(),
            sql: Some(sql.into()),
            source: Some(Box::new(source)),
        }
    }

    /// Create a scan error
    pub fn scan(message: impl Into<String>) -> Self {
        Self::Scan {
            message: message.into(),
            source: None,
        }
    }

    /// Create a scan error with source
    pub fn scan_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Scan {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// SQL text attached to prepare and query errors
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Prepare { sql, .. } | Self::Query { sql, .. } => sql.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection => write!(f, "connection"),
            Self::Prepare => write!(f, "prepare"),
            Self::Query => write!(f, "query"),
            Self::Scan => write!(f, "scan"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}
