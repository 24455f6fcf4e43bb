//! The poll loop
//!
//! Each iteration opens a fresh connection, runs the query and streams rows
//! through [`evaluate`] until one matches. An iteration that reads the whole
//! result set without a match sleeps for the poll interval and starts over.
//! There is no retry limit: the loop ends on a match or on the first error.

use async_trait::async_trait;
use std::ops::ControlFlow;
use std::time::Duration;
use tracing::{debug, info, warn};
use waitval_rdbc::connection::{Connection, ConnectionFactory};
use waitval_rdbc::Row;

use crate::config::WaitConfig;
use crate::error::Result;
use crate::target::{evaluate, Evaluation, Match, NormalizedRow};

/// Suspends the loop between iterations
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Sleep for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Wall-clock sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Result of a single poll iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A row held a target value
    Matched(Match),
    /// The result set ended without a match
    Exhausted,
}

#[derive(Debug)]
enum PollState {
    Polling { iteration: u64 },
    Done(Match),
}

/// Drives poll iterations until a target value shows up
pub struct PollDriver<F, S = TokioSleeper> {
    config: WaitConfig,
    factory: F,
    sleeper: S,
}

impl<F: ConnectionFactory> PollDriver<F> {
    /// Create a driver that sleeps on the tokio timer
    pub fn new(config: WaitConfig, factory: F) -> Self {
        Self::with_sleeper(config, factory, TokioSleeper)
    }
}

impl<F: ConnectionFactory, S: Sleeper> PollDriver<F, S> {
    /// Create a driver with a custom sleeper
    pub fn with_sleeper(config: WaitConfig, factory: F, sleeper: S) -> Self {
        Self {
            config,
            factory,
            sleeper,
        }
    }

    /// The configuration this driver polls with
    pub fn config(&self) -> &WaitConfig {
        &self.config
    }

    /// The sleeper used between iterations
    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Poll until a row matches
    ///
    /// Returns the match, or the first error hit while connecting, preparing,
    /// executing or reading.
    pub async fn run(&self) -> Result<Match> {
        info!(
            values = %self.config.target.describe(),
            field = self.config.target.field().unwrap_or(""),
            "Waiting for values"
        );

        let mut state = PollState::Polling { iteration: 1 };
        loop {
            state = match state {
                PollState::Polling { iteration } => match self.poll_once().await? {
                    PollOutcome::Matched(found) => {
                        debug!(iteration, "Wait finished");
                        PollState::Done(found)
                    }
                    PollOutcome::Exhausted => {
                        debug!(iteration, interval = ?self.config.poll_interval, "No match, retrying");
                        self.sleeper.sleep(self.config.poll_interval).await;
                        PollState::Polling {
                            iteration: iteration.saturating_add(1),
                        }
                    }
                },
                PollState::Done(found) => return Ok(found),
            };
        }
    }

    /// Run a single iteration: connect, query, evaluate, close
    ///
    /// The connection is closed on every path, including query errors.
    pub async fn poll_once(&self) -> Result<PollOutcome> {
        let mut conn = self.factory.connect(&self.config.connection).await?;

        let target = &self.config.target;
        let mut found = None;
        let read = conn
            .query_each(&self.config.query, &mut |row: Row| {
                match evaluate(&NormalizedRow::from(&row), target) {
                    Evaluation::Matched(m) => {
                        found = Some(m);
                        ControlFlow::Break(())
                    }
                    Evaluation::NoMatch => ControlFlow::Continue(()),
                }
            })
            .await;

        if let Err(e) = conn.close().await {
            warn!(error = %e, "Failed to close connection");
        }

        let rows = read?;
        debug!(rows, matched = found.is_some(), "Query finished");

        Ok(match found {
            Some(m) => PollOutcome::Matched(m),
            None => PollOutcome::Exhausted,
        })
    }
}
