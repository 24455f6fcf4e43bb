//! Connection descriptor resolution
//!
//! A MySQL client options file (`my.cnf` style INI) can supply the user and
//! password. They are spliced in front of the host/database part of the
//! descriptor, which is everything after its last `@`.

use ini::{Ini, ParseOption};
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};

/// INI section holding client credentials
pub const CLIENT_SECTION: &str = "client";

// Backslashes are part of the value, as the MySQL client reads them
fn parse_option() -> ParseOption {
    ParseOption {
        enabled_escape: false,
        ..ParseOption::default()
    }
}

/// Source of the current process user name
pub trait IdentityProvider: Send + Sync {
    /// Name of the user the process runs as
    fn current_user(&self) -> Result<String>;
}

/// Identity of the operating system user running the process
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentity;

impl IdentityProvider for SystemIdentity {
    fn current_user(&self) -> Result<String> {
        whoami::fallible::username()
            .map_err(|e| Error::identity_with_source("user lookup failed", e))
    }
}

/// User and password read from a credentials file
pub struct Credentials {
    user: Option<String>,
    password: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    /// Create credentials; a missing user is resolved later from the identity
    pub fn new(user: Option<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.filter(|u| !u.is_empty()),
            password: SecretString::from(password.into()),
        }
    }

    /// Load the `[client]` section of an options file
    pub fn load(path: &Path) -> Result<Self> {
        let conf = Ini::load_from_file_opt(path, parse_option())
            .map_err(|e| Error::credentials_with_source(path, "cannot parse file", e))?;
        Ok(Self::from_ini(&conf))
    }

    /// Parse options file contents
    pub fn parse(contents: &str) -> Result<Self> {
        let conf = Ini::load_from_str_opt(contents, parse_option())
            .map_err(|e| Error::credentials_with_source("<inline>", "cannot parse contents", e))?;
        Ok(Self::from_ini(&conf))
    }

    fn from_ini(conf: &Ini) -> Self {
        let section = conf.section(Some(CLIENT_SECTION));
        let get = |key: &str| section.and_then(|s| s.get(key)).map(str::to_owned);
        Self::new(get("user"), get("password").unwrap_or_default())
    }

    /// User name from the file, if it had one
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Password from the file, empty when absent
    pub fn password(&self) -> &SecretString {
        &self.password
    }
}

/// Put `user:password@` in front of the part of `descriptor` after its last `@`
pub fn patch_descriptor(descriptor: &str, user: &str, password: &SecretString) -> String {
    let location = descriptor.rsplit('@').next().unwrap_or(descriptor);
    format!("{}:{}@{}", user, password.expose_secret(), location)
}

/// Produce the descriptor the poll loop connects with
///
/// Without a credentials file the descriptor is returned as given.
pub fn resolve_descriptor(
    descriptor: &str,
    credentials: Option<&Path>,
    identity: &dyn IdentityProvider,
) -> Result<String> {
    let Some(path) = credentials else {
        return Ok(descriptor.to_owned());
    };

    let creds = Credentials::load(path)?;
    debug!(path = %path.display(), has_user = creds.user().is_some(), "Loaded credentials");
    resolve_with(descriptor, &creds, identity)
}

/// Apply already loaded credentials to a descriptor
pub fn resolve_with(
    descriptor: &str,
    creds: &Credentials,
    identity: &dyn IdentityProvider,
) -> Result<String> {
    let user = match creds.user() {
        Some(user) => user.to_owned(),
        None => identity.current_user()?,
    };
    Ok(patch_descriptor(descriptor, &user, creds.password()))
}
