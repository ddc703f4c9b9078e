//! Connection settings and connection reports.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default MySQL port.
pub const DEFAULT_PORT: u16 = 3306;

/// How to reach the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectConfig {
    /// Full `mysql://` URL; takes precedence over the individual fields.
    pub url: Option<String>,
    /// Server host. When unset, the URL from the environment is used if present.
    pub host: Option<String>,
    /// Server port.
    pub port: u16,
    /// User name.
    pub user: String,
    /// Password.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Default database; schema introspection reads this one.
    pub database: Option<String>,
    /// Pool size.
    pub max_connections: u32,
    /// How long to wait for a pooled connection.
    pub acquire_timeout: Duration,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: None,
            port: DEFAULT_PORT,
            user: "root".to_string(),
            password: None,
            database: None,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

impl ConnectConfig {
    /// Config for a full connection URL.
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Sets the host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the user and password.
    #[must_use]
    pub fn with_credentials(mut self, user: impl Into<String>, password: Option<String>) -> Self {
        self.user = user.into();
        self.password = password;
        self
    }

    /// Sets the default database.
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Sets the pool size.
    #[must_use]
    pub const fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}

/// Result of a successful connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectReport {
    /// `SELECT VERSION()`.
    pub server_version: String,
    /// `SELECT DATABASE()`; `None` when no default database is selected.
    pub database: Option<String>,
}
