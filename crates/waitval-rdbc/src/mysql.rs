//! MySQL backend implementation for waitval-rdbc
//!
//! Runs statements over the binary protocol and folds `mysql_async` values
//! into [`Value`]. Temporal values come back as the text MySQL itself prints
//! so they can be matched against what an operator sees in the `mysql`
//! client.

use async_trait::async_trait;
use mysql_async::consts::ColumnType;
use mysql_async::prelude::*;
use mysql_async::{Column, Conn, Opts, OptsBuilder, SslOpts, Statement};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::connection::{Connection, ConnectionConfig, ConnectionFactory, RowVisitor};
use crate::dsn::{self, Address};
use crate::error::{Error, Result};
use crate::types::{Row, Value};

/// Convert a MySQL value to a waitval Value
fn mysql_value_to_value(val: mysql_async::Value, column: &Column) -> Value {
    match val {
        mysql_async::Value::NULL => Value::Null,
        mysql_async::Value::Bytes(b) => Value::Bytes(b),
        mysql_async::Value::Int(n) => Value::Int(n),
        mysql_async::Value::UInt(n) => match i64::try_from(n) {
            Ok(n) => Value::Int(n),
            Err(_) => Value::Text(n.to_string()),
        },
        // Widen through the shortest f32 text so FLOAT 0.1 stays 0.1
        mysql_async::Value::Float(f) => {
            Value::Float(f.to_string().parse().unwrap_or_else(|_| f64::from(f)))
        }
        mysql_async::Value::Double(d) => Value::Float(d),
        mysql_async::Value::Date(year, month, day, hour, min, sec, micro) => {
            let date = format!("{:04}-{:02}-{:02}", year, month, day);
            if column.column_type() == ColumnType::MYSQL_TYPE_DATE {
                Value::Text(date)
            } else {
                Value::Text(format!(
                    "{} {:02}:{:02}:{:02}{}",
                    date,
                    hour,
                    min,
                    sec,
                    fraction(micro, column.decimals())
                ))
            }
        }
        mysql_async::Value::Time(neg, days, hour, min, sec, micro) => {
            let hours = u64::from(days) * 24 + u64::from(hour);
            Value::Text(format!(
                "{}{:02}:{:02}:{:02}{}",
                if neg { "-" } else { "" },
                hours,
                min,
                sec,
                fraction(micro, column.decimals())
            ))
        }
    }
}

/// Fractional seconds rendered to the column's declared precision
fn fraction(micro: u32, decimals: u8) -> String {
    let digits = usize::from(decimals.min(6));
    if digits == 0 {
        return String::new();
    }
    let full = format!("{:06}", micro);
    format!(".{}", &full[..digits])
}

/// Driver options plus the connect timeout a descriptor asked for
struct DriverOptions {
    opts: Opts,
    connect_timeout: Option<Duration>,
}

/// Build driver options from a descriptor
fn opts_from_descriptor(descriptor: &str) -> Result<DriverOptions> {
    if dsn::is_url(descriptor) {
        let opts = Opts::from_url(descriptor)
            .map_err(|e| Error::config(format!("Invalid MySQL URL: {}", e)))?;
        return Ok(DriverOptions {
            opts,
            connect_timeout: None,
        });
    }

    let parsed = dsn::parse(descriptor)?;
    let settings = parsed.settings()?;

    let mut builder = OptsBuilder::default()
        .user(parsed.user)
        .pass(parsed.password)
        .db_name(parsed.database);

    builder = match parsed.address {
        Address::Tcp { host, port } => builder.ip_or_hostname(host).tcp_port(port),
        Address::Unix { path } => builder.socket(Some(path)),
    };
    if let Some(socket) = settings.socket.clone() {
        builder = builder.socket(Some(socket));
    }

    if settings.tls.enabled {
        let ssl = SslOpts::default()
            .with_danger_accept_invalid_certs(!settings.tls.verify_ca)
            .with_danger_skip_domain_validation(!settings.tls.verify_identity);
        builder = builder.ssl_opts(Some(ssl));
    }

    let init = settings.session_statements();
    if !init.is_empty() {
        builder = builder.init(init);
    }

    Ok(DriverOptions {
        opts: builder.into(),
        connect_timeout: settings.timeout,
    })
}

/// MySQL connection implementation
pub struct MySqlConnection {
    conn: Conn,
}

impl MySqlConnection {
    /// Create a new MySQL connection from an existing connection
    pub fn new(conn: Conn) -> Self {
        Self { conn }
    }

    /// Create a new connection from configuration
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let DriverOptions {
            opts,
            connect_timeout,
        } = opts_from_descriptor(&config.descriptor)?;
        let connect_timeout = connect_timeout.unwrap_or(config.connect_timeout);

        let conn = tokio::time::timeout(connect_timeout, Conn::new(opts))
            .await
            .map_err(|_| {
                Error::connection(format!(
                    "Timed out after {:?} connecting to {}",
                    connect_timeout,
                    config.redacted()
                ))
            })?
            .map_err(|e| {
                Error::connection_with_source(
                    format!("Failed to connect to MySQL at {}", config.redacted()),
                    e,
                )
            })?;

        Ok(Self::new(conn))
    }

    /// Execute a prepared statement and stream its rows to `visit`
    async fn read_rows(
        &mut self,
        stmt: &Statement,
        sql: &str,
        visit: &mut RowVisitor<'_>,
    ) -> Result<usize> {
        let mut result = self
            .conn
            .exec_iter(stmt.clone(), ())
            .await
            .map_err(|e| Error::query_with_source(sql, e))?;

        let columns: Vec<Column> = result.columns_ref().to_vec();
        let names: Arc<[String]> = columns
            .iter()
            .map(|c| c.name_str().into_owned())
            .collect();

        let mut count = 0;
        while let Some(row) = result
            .next()
            .await
            .map_err(|e| Error::scan_with_source("Failed to read values", e))?
        {
            let values: Vec<Value> = columns
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    let val: mysql_async::Value = row.get(i).unwrap_or(mysql_async::Value::NULL);
                    mysql_value_to_value(val, column)
                })
                .collect();

            count += 1;
            if visit(Row::new(Arc::clone(&names), values)).is_break() {
                break;
            }
        }

        Ok(count)
    }
}

#[async_trait]
impl Connection for MySqlConnection {
    async fn query_each(&mut self, sql: &str, visit: &mut RowVisitor<'_>) -> Result<usize> {
        let stmt = self
            .conn
            .prep(sql)
            .await
            .map_err(|e| Error::prepare_with_source(sql, e))?;

        let outcome = self.read_rows(&stmt, sql, visit).await;

        // The statement is released whether or not reading succeeded
        if let Err(e) = self.conn.close(stmt).await {
            debug!(error = %e, "Failed to close prepared statement");
        }

        outcome
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.conn
            .disconnect()
            .await
            .map_err(|e| Error::connection_with_source("Failed to close connection", e))
    }
}

/// MySQL connection factory
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlConnectionFactory;

impl MySqlConnectionFactory {
    /// Create a new MySQL connection factory
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConnectionFactory for MySqlConnectionFactory {
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Connection>> {
        let conn = MySqlConnection::connect(config).await?;
        Ok(Box::new(conn))
    }
}
