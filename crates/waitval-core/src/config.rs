//! Wait configuration
//!
//! Built once at startup and shared read-only with the poll loop.

use std::time::Duration;
use waitval_rdbc::connection::ConnectionConfig;

use crate::target::TargetSpec;

/// Delay between poll iterations
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default query when none is given
pub const DEFAULT_QUERY: &str = "select 1";

/// Everything one wait needs
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Resolved connection settings
    pub connection: ConnectionConfig,
    /// Statement executed on every iteration
    pub query: String,
    /// Values to wait for
    pub target: TargetSpec,
    /// Sleep between iterations that found no match
    pub poll_interval: Duration,
}

impl WaitConfig {
    /// Create a configuration; surrounding whitespace is trimmed from the descriptor
    pub fn new(descriptor: &str, query: impl Into<String>, target: TargetSpec) -> Self {
        Self {
            connection: ConnectionConfig::new(descriptor.trim()),
            query: query.into(),
            target,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the delay between iterations
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connection = self.connection.with_connect_timeout(timeout);
        self
    }
}
