//! # waitval-rdbc
//!
//! Relational database connectivity for waitval.
//!
//! This crate owns everything driver-facing: the [`Value`] sum type that
//! driver-reported columns are folded into, rows, the connection traits the
//! poll loop talks to, connection descriptor parsing and the MySQL backend.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::ops::ControlFlow;
//! use waitval_rdbc::prelude::*;
//!
//! let config = ConnectionConfig::new("root:pw@tcp(127.0.0.1:3306)/app");
//! let mut conn = MySqlConnectionFactory::new().connect(&config).await?;
//!
//! conn.query_each("SELECT ready FROM flags", &mut |row: Row| {
//!     println!("{:?}", row.iter().collect::<Vec<_>>());
//!     ControlFlow::Continue(())
//! })
//! .await?;
//! conn.close().await?;
//! ```
//!
//! ## Feature Flags
//!
//! - `mysql` (default) - MySQL/MariaDB support via mysql_async

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod connection;
pub mod dsn;
pub mod error;
pub mod types;

#[cfg(feature = "mysql")]
pub mod mysql;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::connection::{Connection, ConnectionConfig, ConnectionFactory, RowVisitor};
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::types::{Row, Value};

    #[cfg(feature = "mysql")]
    pub use crate::mysql::{MySqlConnection, MySqlConnectionFactory};
}

pub use error::{Error, Result};
pub use types::{Row, Value};
