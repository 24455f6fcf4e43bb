//! # waitval-core
//!
//! Block until a database query returns one of a set of expected values.
//!
//! The pieces, leaf first:
//!
//! - [`normalize`]: renders driver values to the text they are compared by
//! - [`target`]: the values to wait for and the per-row match decision
//! - [`poll`]: the connect / query / evaluate / sleep loop
//! - [`resolver`]: splices credentials from an options file into the
//!   connection descriptor
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use waitval_core::prelude::*;
//! use waitval_rdbc::mysql::MySqlConnectionFactory;
//!
//! let target = TargetSpec::new(vec!["1".into()], "")?;
//! let config = WaitConfig::new("root@tcp(127.0.0.1:3306)/app", "SELECT ready FROM flags", target);
//!
//! let found = PollDriver::new(config, MySqlConnectionFactory::new()).run().await?;
//! println!("{} = {}", found.column, found.value);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod normalize;
pub mod poll;
pub mod resolver;
pub mod target;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{WaitConfig, DEFAULT_POLL_INTERVAL, DEFAULT_QUERY};
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::normalize::{normalize, NormalizedValue};
    pub use crate::poll::{PollDriver, PollOutcome, Sleeper, TokioSleeper};
    pub use crate::resolver::{
        patch_descriptor, resolve_descriptor, Credentials, IdentityProvider, SystemIdentity,
    };
    pub use crate::target::{evaluate, Evaluation, Match, NormalizedRow, TargetSpec};
}

pub use error::{Error, Result};
