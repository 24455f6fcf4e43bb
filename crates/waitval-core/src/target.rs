//! Wait targets and row evaluation

use tracing::{debug, info};
use waitval_rdbc::Row;

use crate::error::{Error, Result};
use crate::normalize::{normalize, NormalizedValue};

/// Values to wait for, optionally restricted to one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    targets: Vec<String>,
    field: Option<String>,
}

impl TargetSpec {
    /// Create a target spec
    ///
    /// An empty `field` means any column may match. Fails when `targets` is
    /// empty: such a wait could never finish.
    pub fn new(targets: Vec<String>, field: impl Into<String>) -> Result<Self> {
        if targets.is_empty() {
            return Err(Error::config("Need at least one value"));
        }
        let field = field.into();
        Ok(Self {
            targets,
            field: (!field.is_empty()).then_some(field),
        })
    }

    /// Target values, in the order given
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Column filter, `None` when any column qualifies
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Whether `column` takes part in matching
    pub fn accepts_column(&self, column: &str) -> bool {
        self.field.as_deref().map_or(true, |f| f == column)
    }

    /// Whether `value` is one of the targets (exact, case-sensitive)
    pub fn contains(&self, value: &NormalizedValue) -> bool {
        value
            .as_str()
            .is_some_and(|v| self.targets.iter().any(|t| t == v))
    }

    /// Targets joined the way they are shown at startup: `{a}|{b}`
    pub fn describe(&self) -> String {
        format!("{{{}}}", self.targets.join("}|{"))
    }
}

/// A column whose value equals one of the targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Column name
    pub column: String,
    /// Normalized value that matched
    pub value: String,
}

/// Result of evaluating one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// The first qualifying column holding a target value
    Matched(Match),
    /// No qualifying column holds a target value
    NoMatch,
}

/// One fetched row in comparable form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    cells: Vec<(String, NormalizedValue)>,
}

impl NormalizedRow {
    /// Build from `(column, value)` pairs in column order
    pub fn new(cells: Vec<(String, NormalizedValue)>) -> Self {
        Self { cells }
    }

    /// `(column, value)` pairs in column order
    pub fn cells(&self) -> &[(String, NormalizedValue)] {
        &self.cells
    }
}

impl From<&Row> for NormalizedRow {
    fn from(row: &Row) -> Self {
        Self::new(
            row.iter()
                .map(|(column, value)| {
                    let normalized = normalize(value);
                    if normalized.is_absent() {
                        debug!(column, kind = value.kind(), "Column has no comparable value");
                    }
                    (column.to_owned(), normalized)
                })
                .collect(),
        )
    }
}

/// Decide whether a row satisfies the wait
///
/// Columns are checked in order and the first one holding a target wins.
pub fn evaluate(row: &NormalizedRow, spec: &TargetSpec) -> Evaluation {
    for (column, value) in row.cells() {
        if !spec.accepts_column(column) {
            continue;
        }
        if spec.contains(value) {
            info!(field = %column, value = %value, "Got value");
            return Evaluation::Matched(Match {
                column: column.clone(),
                value: value.to_string(),
            });
        }
    }
    Evaluation::NoMatch
}
