//! Connection traits for waitval-rdbc
//!
//! - Connection: runs one statement and streams its rows to a visitor
//! - ConnectionFactory: opens connections from a [`ConnectionConfig`]
//!
//! A connection is opened, used for a single statement and closed again.
//! There is no pooling; every poll iteration starts from a fresh connect.

use async_trait::async_trait;
use std::ops::ControlFlow;
use std::time::Duration;

use crate::dsn;
use crate::error::Result;
use crate::types::Row;

/// Callback receiving rows in result-set order
///
/// Returning [`ControlFlow::Break`] stops reading; the rest of the result
/// set is discarded when the connection closes.
pub type RowVisitor<'a> = dyn FnMut(Row) -> ControlFlow<()> + Send + 'a;

/// A connection to a database
#[async_trait]
pub trait Connection: Send {
    /// Prepare `sql`, execute it without parameters and hand each row to
    /// `visit`.
    ///
    /// Column metadata is read once per execution. Returns the number of
    /// rows handed to the visitor.
    async fn query_each(&mut self, sql: &str, visit: &mut RowVisitor<'_>) -> Result<usize>;

    /// Close the connection, releasing any statement still held
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Factory for creating connections
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Create a new connection
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Connection>>;
}

/// Configuration for creating connections
#[derive(Clone)]
pub struct ConnectionConfig {
    /// Connection descriptor, e.g. `user:pass@tcp(localhost:3306)/db`
    pub descriptor: String,
    /// Upper bound on establishing the connection
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Redact credentials from the descriptor to prevent leaking passwords to logs.
        f.debug_struct("ConnectionConfig")
            .field("descriptor", &dsn::redact(&self.descriptor))
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            descriptor: String::new(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ConnectionConfig {
    /// Create configuration with just a descriptor
    pub fn new(descriptor: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.into(),
            ..Default::default()
        }
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Descriptor with the password masked, safe for logs
    pub fn redacted(&self) -> String {
        dsn::redact(&self.descriptor)
    }
}
