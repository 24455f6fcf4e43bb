//! Connection descriptor parsing
//!
//! Descriptors use the layout common to MySQL client tooling:
//!
//! ```text
//! [user[:password]@][net[(address)]]/dbname[?param=value&...]
//! ```
//!
//! `net` is `tcp` (the default) or `unix`. The database name follows the last
//! `/`, and the user information ends at the last `@` before it, so passwords
//! may contain `@` but not `/`. Descriptors starting with `mysql://` are URLs
//! and are handed to the driver untouched.
//!
//! Parameters are interpreted by [`Dsn::settings`]. Recognised keys:
//!
//! | key               | value                                         |
//! |-------------------|-----------------------------------------------|
//! | `tls`             | `true`, `false` or `skip-verify`              |
//! | `require_ssl`     | boolean, same as `tls=true`                   |
//! | `verify_ca`       | boolean, check the certificate chain          |
//! | `verify_identity` | boolean, check the certificate host name      |
//! | `timeout`         | connect timeout such as `5s` or `1m30s`       |
//! | `socket`          | unix socket path                              |
//! | `charset`         | connection character set                      |
//! | `collation`       | connection collation                          |
//!
//! Any other key is a configuration error. Values are percent-decoded, so a
//! `/` inside a value has to be written as `%2F`.

use std::time::Duration;

use crate::error::{Error, Result};

/// Default MySQL port
pub const DEFAULT_PORT: u16 = 3306;

/// Default host when the descriptor names no address
pub const DEFAULT_HOST: &str = "127.0.0.1";

const URL_SCHEME: &str = "mysql://";

/// Network address of the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// TCP host and port
    Tcp {
        /// Host name or IP literal (IPv6 without brackets)
        host: String,
        /// TCP port
        port: u16,
    },
    /// Unix domain socket path
    Unix {
        /// Socket path
        path: String,
    },
}

impl Default for Address {
    fn default() -> Self {
        Self::Tcp {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
        }
    }
}

/// Parsed connection descriptor
#[derive(Clone, PartialEq, Eq)]
pub struct Dsn {
    /// User name
    pub user: Option<String>,
    /// Password
    pub password: Option<String>,
    /// Server address
    pub address: Address,
    /// Database name, `None` when the descriptor ends in a bare `/`
    pub database: Option<String>,
    /// Trailing `key=value` parameters, decoded, in order
    pub params: Vec<(String, String)>,
}

impl std::fmt::Debug for Dsn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dsn")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("address", &self.address)
            .field("database", &self.database)
            .field("params", &self.params)
            .finish()
    }
}

impl Dsn {
    /// Interpret the descriptor parameters
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::default();
        for (key, value) in &self.params {
            match key.as_str() {
                "tls" => settings.tls = parse_tls(value)?,
                "require_ssl" => settings.tls.enabled = parse_bool(key, value)?,
                "verify_ca" => settings.tls.verify_ca = parse_bool(key, value)?,
                "verify_identity" => settings.tls.verify_identity = parse_bool(key, value)?,
                "timeout" => settings.timeout = Some(parse_timeout(value)?),
                "socket" if !value.is_empty() => settings.socket = Some(value.clone()),
                "socket" => return Err(Error::config("descriptor parameter 'socket' is empty")),
                "charset" => settings.charset = Some(parse_identifier(key, value)?),
                "collation" => settings.collation = Some(parse_identifier(key, value)?),
                other => {
                    return Err(Error::config(format!(
                        "unsupported descriptor parameter '{}'",
                        other
                    )))
                }
            }
        }
        Ok(settings)
    }
}

/// TLS requirements taken from descriptor parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tls {
    /// Encrypt the connection
    pub enabled: bool,
    /// Check the server certificate chain
    pub verify_ca: bool,
    /// Check that the certificate names the server host
    pub verify_identity: bool,
}

impl Default for Tls {
    fn default() -> Self {
        Self {
            enabled: false,
            verify_ca: true,
            verify_identity: true,
        }
    }
}

/// Connection settings carried in descriptor parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// TLS requirements
    pub tls: Tls,
    /// Connect timeout overriding the configured one
    pub timeout: Option<Duration>,
    /// Unix socket path
    pub socket: Option<String>,
    /// Connection character set
    pub charset: Option<String>,
    /// Connection collation
    pub collation: Option<String>,
}

impl Settings {
    /// Statements run on every new connection
    pub fn session_statements(&self) -> Vec<String> {
        match (&self.charset, &self.collation) {
            (Some(charset), Some(collation)) => {
                vec![format!("SET NAMES {} COLLATE {}", charset, collation)]
            }
            (Some(charset), None) => vec![format!("SET NAMES {}", charset)],
            (None, Some(collation)) => vec![format!("SET collation_connection = {}", collation)],
            (None, None) => Vec::new(),
        }
    }
}

fn parse_tls(value: &str) -> Result<Tls> {
    match value {
        "skip-verify" => Ok(Tls {
            enabled: true,
            verify_ca: false,
            verify_identity: false,
        }),
        "preferred" => Err(Error::config(
            "tls=preferred is not supported: use tls=true or tls=skip-verify",
        )),
        other => match parse_bool("tls", other) {
            Ok(enabled) => Ok(Tls {
                enabled,
                ..Tls::default()
            }),
            Err(_) => Err(Error::config(format!(
                "unknown tls mode '{}': expected true, false or skip-verify",
                other
            ))),
        },
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "1" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(Error::config(format!(
            "invalid boolean '{}' for descriptor parameter '{}'",
            value, key
        ))),
    }
}

fn parse_timeout(value: &str) -> Result<Duration> {
    let timeout = humantime::parse_duration(value)
        .map_err(|e| Error::config(format!("invalid timeout '{}': {}", value, e)))?;
    if timeout.is_zero() {
        return Err(Error::config("timeout must be greater than zero"));
    }
    Ok(timeout)
}

// Spliced into SET statements, so only plain names are accepted
fn parse_identifier(key: &str, value: &str) -> Result<String> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(value.to_owned())
    } else {
        Err(Error::config(format!(
            "invalid value '{}' for descriptor parameter '{}': expected a single name",
            value, key
        )))
    }
}

/// Whether the descriptor is a `mysql://` URL rather than a DSN
pub fn is_url(descriptor: &str) -> bool {
    descriptor.starts_with(URL_SCHEME)
}

/// Parse a DSN-style descriptor
pub fn parse(descriptor: &str) -> Result<Dsn> {
    let slash = descriptor.rfind('/').ok_or_else(|| {
        Error::config("invalid descriptor: missing the slash separating the database name")
    })?;
    let (head, tail) = (&descriptor[..slash], &descriptor[slash + 1..]);

    let (credentials, location) = match head.rfind('@') {
        Some(at) => (Some(&head[..at]), &head[at + 1..]),
        None => (None, head),
    };

    let (user, password) = match credentials {
        Some(info) => match info.split_once(':') {
            Some((user, password)) => (Some(user.to_owned()), Some(password.to_owned())),
            None => (Some(info.to_owned()), None),
        },
        None => (None, None),
    };

    let address = parse_location(location)?;

    let (database, query) = match tail.split_once('?') {
        Some((db, query)) => (db, Some(query)),
        None => (tail, None),
    };

    let params = query
        .map(|q| {
            q.split('&')
                .filter(|pair| !pair.is_empty())
                .map(|pair| {
                    if !pair.contains('=') {
                        return Err(Error::config(format!(
                            "invalid descriptor parameter '{}': expected key=value",
                            pair
                        )));
                    }
                    Ok(url::form_urlencoded::parse(pair.as_bytes())
                        .next()
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .unwrap_or_default())
                })
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();

    Ok(Dsn {
        user,
        password,
        address,
        database: (!database.is_empty()).then(|| database.to_owned()),
        params,
    })
}

fn parse_location(location: &str) -> Result<Address> {
    if location.is_empty() {
        return Ok(Address::default());
    }

    let (net, addr) = match location.find('(') {
        Some(open) => {
            let inner = location[open + 1..].strip_suffix(')').ok_or_else(|| {
                Error::config(format!(
                    "invalid descriptor address '{}': missing closing parenthesis",
                    location
                ))
            })?;
            (&location[..open], inner)
        }
        None => (location, ""),
    };

    match net {
        "tcp" | "" => parse_tcp(addr),
        "unix" if !addr.is_empty() => Ok(Address::Unix {
            path: addr.to_owned(),
        }),
        "unix" => Err(Error::config("invalid descriptor: unix network needs a socket path")),
        other => Err(Error::config(format!(
            "unsupported network '{}': expected tcp or unix",
            other
        ))),
    }
}

fn parse_tcp(addr: &str) -> Result<Address> {
    if addr.is_empty() {
        return Ok(Address::default());
    }

    let (host, port) = if let Some(rest) = addr.strip_prefix('[') {
        let (host, after) = rest.split_once(']').ok_or_else(|| {
            Error::config(format!("invalid IPv6 address '{}': missing ']'", addr))
        })?;
        (host, after.strip_prefix(':'))
    } else {
        match addr.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (addr, None),
        }
    };

    let port = match port {
        Some(p) => p
            .parse::<u16>()
            .map_err(|_| Error::config(format!("invalid port '{}' in address '{}'", p, addr)))?,
        None => DEFAULT_PORT,
    };

    let host = if host.is_empty() { DEFAULT_HOST } else { host };

    Ok(Address::Tcp {
        host: host.to_owned(),
        port,
    })
}

/// Mask the password in a descriptor, leaving everything else intact
pub fn redact(descriptor: &str) -> String {
    if is_url(descriptor) {
        return match url::Url::parse(descriptor) {
            Ok(mut parsed) => {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("***"));
                }
                parsed.to_string()
            }
            Err(_) => "***".to_string(),
        };
    }

    let head_end = descriptor.rfind('/').unwrap_or(descriptor.len());
    match descriptor[..head_end].rfind('@') {
        Some(at) => match descriptor[..at].split_once(':') {
            Some((user, _)) => format!("{}:***{}", user, &descriptor[at..]),
            None => descriptor.to_owned(),
        },
        None => descriptor.to_owned(),
    }
}
