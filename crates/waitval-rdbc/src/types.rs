//! Value types for waitval-rdbc
//!
//! Drivers report columns in their own type systems. Backends fold those
//! into [`Value`], which keeps only the categories a comparison needs:
//! - integers and floating point
//! - booleans
//! - text and raw bytes
//! - SQL NULL
//! - anything else, tagged with the driver's type name

use std::sync::Arc;

/// SQL value as read back from a result set
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Signed 64-bit integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Text string
    Text(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// Column type the backend has no comparable representation for
    Unsupported {
        /// Driver-specific type name
        type_name: String,
    },
}

impl Value {
    /// Short name of the value category, used in debug logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Unsupported { .. } => "unsupported",
        }
    }

    /// Create an unsupported value
    pub fn unsupported(type_name: impl Into<String>) -> Self {
        Self::Unsupported {
            type_name: type_name.into(),
        }
    }
}

/// Database row as ordered column values
///
/// Column names are fetched once per query execution and shared by every
/// row of that result set.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Create a new row
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Iterate `(column, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}
