//! Tests for the waitval-core poll loop

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use waitval_core::prelude::*;
use waitval_rdbc::connection::{Connection, ConnectionConfig, ConnectionFactory, RowVisitor};
use waitval_rdbc::{Row, Value};

// ==================== Test doubles ====================

/// What one poll iteration sees
enum Step {
    Rows(Vec<Row>),
    ConnectFails,
    PrepareFails,
    ScanFailsAfter(Vec<Row>),
}

#[derive(Default)]
struct Counters {
    connects: AtomicUsize,
    closes: AtomicUsize,
    rows_read: AtomicUsize,
}

struct ScriptedFactory {
    steps: Mutex<VecDeque<Step>>,
    counters: Arc<Counters>,
}

impl ScriptedFactory {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            counters: Arc::new(Counters::default()),
        }
    }
}

#[async_trait]
impl ConnectionFactory for ScriptedFactory {
    async fn connect(&self, _config: &ConnectionConfig) -> waitval_rdbc::Result<Box<dyn Connection>> {
        self.counters.connects.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::ConnectFails) | None => {
                Err(waitval_rdbc::Error::connection("connection refused"))
            }
            Some(step) => Ok(Box::new(ScriptedConnection {
                step,
                counters: Arc::clone(&self.counters),
            })),
        }
    }
}

struct ScriptedConnection {
    step: Step,
    counters: Arc<Counters>,
}

impl ScriptedConnection {
    fn feed(&self, rows: &[Row], visit: &mut RowVisitor<'_>) -> usize {
        let mut count = 0;
        for row in rows {
            count += 1;
            self.counters.rows_read.fetch_add(1, Ordering::SeqCst);
            if visit(row.clone()).is_break() {
                break;
            }
        }
        count
    }
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn query_each(&mut self, sql: &str, visit: &mut RowVisitor<'_>) -> waitval_rdbc::Result<usize> {
        match &self.step {
            Step::Rows(rows) => Ok(self.feed(rows, visit)),
            Step::PrepareFails => Err(waitval_rdbc::Error::prepare_with_source(
                sql,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "syntax error"),
            )),
            Step::ScanFailsAfter(rows) => {
                self.feed(rows, visit);
                Err(waitval_rdbc::Error::scan("Failed to read values"))
            }
            Step::ConnectFails => unreachable!("connect failures never produce a connection"),
        }
    }

    async fn close(self: Box<Self>) -> waitval_rdbc::Result<()> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    fn count(&self) -> usize {
        self.sleeps.lock().unwrap().len()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

// ==================== Helpers ====================

fn row(cells: &[(&str, Value)]) -> Row {
    let columns: Arc<[String]> = cells.iter().map(|(c, _)| (*c).to_owned()).collect();
    Row::new(columns, cells.iter().map(|(_, v)| v.clone()).collect())
}

fn config(targets: &[&str], field: &str) -> WaitConfig {
    let target = TargetSpec::new(targets.iter().map(|t| (*t).to_owned()).collect(), field).unwrap();
    WaitConfig::new("tcp(127.0.0.1:3306)/db", "SELECT status FROM deploy", target)
}

fn driver(
    config: WaitConfig,
    steps: Vec<Step>,
) -> (PollDriver<ScriptedFactory, RecordingSleeper>, Arc<Counters>) {
    let factory = ScriptedFactory::new(steps);
    let counters = Arc::clone(&factory.counters);
    (
        PollDriver::with_sleeper(config, factory, RecordingSleeper::default()),
        counters,
    )
}

// ==================== Matching ====================

#[tokio::test]
async fn test_match_on_first_iteration_without_sleep() {
    let (driver, counters) = driver(
        config(&["1", "2"], ""),
        vec![Step::Rows(vec![row(&[("status", Value::Int(1))])])],
    );

    let found = driver.run().await.unwrap();

    assert_eq!(
        found,
        Match {
            column: "status".into(),
            value: "1".into()
        }
    );
    assert_eq!(driver.sleeper().count(), 0);
    assert_eq!(counters.connects.load(Ordering::SeqCst), 1);
    assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_two_empty_iterations_then_match() {
    let (driver, counters) = driver(
        config(&["ready"], ""),
        vec![
            Step::Rows(Vec::new()),
            Step::Rows(Vec::new()),
            Step::Rows(vec![row(&[("state", Value::Text("ready".into()))])]),
        ],
    );

    let found = driver.run().await.unwrap();

    assert_eq!(found.column, "state");
    assert_eq!(driver.sleeper().count(), 2);
    assert!(driver
        .sleeper()
        .sleeps
        .lock()
        .unwrap()
        .iter()
        .all(|d| *d == Duration::from_secs(1)));
    assert_eq!(counters.connects.load(Ordering::SeqCst), 3);
    assert_eq!(counters.closes.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_null_column_matches_null_target() {
    let (driver, _) = driver(
        config(&["null"], ""),
        vec![Step::Rows(vec![row(&[
            ("id", Value::Int(4)),
            ("finished_at", Value::Null),
        ])])],
    );

    let found = driver.run().await.unwrap();
    assert_eq!(
        found,
        Match {
            column: "finished_at".into(),
            value: "null".into()
        }
    );
}

#[tokio::test]
async fn test_rows_after_match_are_not_read() {
    let (driver, counters) = driver(
        config(&["yes"], ""),
        vec![Step::Rows(vec![
            row(&[("v", Value::Text("no".into()))]),
            row(&[("v", Value::Bytes(b"yes".to_vec()))]),
            row(&[("v", Value::Text("yes".into()))]),
        ])],
    );

    let outcome = driver.poll_once().await.unwrap();

    assert!(matches!(outcome, PollOutcome::Matched(_)));
    assert_eq!(counters.rows_read.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_field_filter_limits_columns() {
    let (driver, _) = driver(
        config(&["1"], "b"),
        vec![
            Step::Rows(vec![row(&[("a", Value::Int(1)), ("b", Value::Int(0))])]),
            Step::Rows(vec![row(&[("a", Value::Int(0)), ("b", Value::Int(1))])]),
        ],
    );

    assert_eq!(driver.poll_once().await.unwrap(), PollOutcome::Exhausted);
    assert_eq!(
        driver.poll_once().await.unwrap(),
        PollOutcome::Matched(Match {
            column: "b".into(),
            value: "1".into()
        })
    );
}

#[tokio::test]
async fn test_unsupported_column_does_not_abort() {
    let (driver, _) = driver(
        config(&["7"], ""),
        vec![Step::Rows(vec![row(&[
            ("shape", Value::unsupported("GEOMETRY")),
            ("id", Value::Int(7)),
        ])])],
    );

    let found = driver.run().await.unwrap();
    assert_eq!(found.column, "id");
}

#[tokio::test]
async fn test_float_column_matches_after_retry() {
    let (driver, _) = driver(
        config(&["0.5", "true"], ""),
        vec![
            Step::Rows(vec![row(&[("ratio", Value::Float(0.25))])]),
            Step::Rows(vec![row(&[("ratio", Value::Float(0.5))])]),
        ],
    );

    let found = driver.run().await.unwrap();
    assert_eq!(found.value, "0.5");
    assert_eq!(driver.sleeper().count(), 1);
}

// ==================== Fatal errors ====================

#[tokio::test]
async fn test_connect_failure_is_fatal() {
    let (driver, counters) = driver(config(&["1"], ""), vec![Step::ConnectFails]);

    let err = driver.run().await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Database);
    assert_eq!(driver.sleeper().count(), 0);
    assert_eq!(counters.connects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_connect_failure_after_retry_is_fatal() {
    let (driver, _) = driver(
        config(&["1"], ""),
        vec![Step::Rows(Vec::new()), Step::ConnectFails],
    );

    assert!(driver.run().await.is_err());
    assert_eq!(driver.sleeper().count(), 1);
}

#[tokio::test]
async fn test_prepare_failure_is_fatal_and_closes() {
    let (driver, counters) = driver(config(&["1"], ""), vec![Step::PrepareFails]);

    let err = driver.run().await.unwrap_err();

    match err {
        Error::Database(inner) => {
            assert_eq!(inner.category(), waitval_rdbc::error::ErrorCategory::Prepare);
            assert_eq!(inner.sql(), Some("SELECT status FROM deploy"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
    assert_eq!(driver.sleeper().count(), 0);
}

#[tokio::test]
async fn test_scan_failure_is_fatal_and_closes() {
    let (driver, counters) = driver(
        config(&["1"], ""),
        vec![Step::ScanFailsAfter(vec![row(&[("x", Value::Int(0))])])],
    );

    let err = driver.run().await.unwrap_err();

    assert!(err.to_string().contains("Failed to read values"));
    assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
}

