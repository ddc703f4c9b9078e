//! Resolution of connection options.

use crate::error::MySqlError;
use crate::types::ConnectConfig;
use sqlx::mysql::MySqlConnectOptions;
use std::str::FromStr;

/// Environment variable consulted first for a connection URL.
pub const DATABASE_URL_ENV_VAR: &str = "SQLREFINE_DATABASE_URL";

/// Conventional variable consulted second.
pub const FALLBACK_DATABASE_URL_ENV_VAR: &str = "DATABASE_URL";

/// Where the connection options came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// `ConnectConfig::url`.
    ExplicitUrl,
    /// `ConnectConfig::host` and friends.
    ExplicitFields,
    /// One of the URL environment variables.
    Environment,
    /// Local defaults (`localhost:3306`).
    Defaults,
}

/// Builds connect options for `config`.
///
/// Resolution order:
/// 1. `config.url` if set.
/// 2. The individual fields if `config.host` is set.
/// 3. `SQLREFINE_DATABASE_URL`, then `DATABASE_URL`.
/// 4. The individual fields against `localhost`.
///
/// # Errors
///
/// Returns `MySqlError::InvalidUrl` when a URL does not parse.
pub fn resolve_connect_options(
    config: &ConnectConfig,
) -> Result<(MySqlConnectOptions, Source), MySqlError> {
    resolve_with(config, |name| std::env::var(name).ok())
}

fn resolve_with(
    config: &ConnectConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(MySqlConnectOptions, Source), MySqlError> {
    if let Some(url) = &config.url {
        return Ok((parse_url(url)?, Source::ExplicitUrl));
    }
    if let Some(host) = &config.host {
        return Ok((from_fields(config, host), Source::ExplicitFields));
    }
    if let Some(url) = [DATABASE_URL_ENV_VAR, FALLBACK_DATABASE_URL_ENV_VAR]
        .into_iter()
        .filter_map(|name| lookup(name))
        .find(|url| !url.trim().is_empty())
    {
        return Ok((parse_url(&url)?, Source::Environment));
    }
    Ok((from_fields(config, "localhost"), Source::Defaults))
}

fn parse_url(url: &str) -> Result<MySqlConnectOptions, MySqlError> {
    MySqlConnectOptions::from_str(url.trim()).map_err(|e| MySqlError::InvalidUrl(e.to_string()))
}

fn from_fields(config: &ConnectConfig, host: &str) -> MySqlConnectOptions {
    let mut options = MySqlConnectOptions::new()
        .host(host)
        .port(config.port)
        .username(&config.user);
    if let Some(password) = &config.password {
        options = options.password(password);
    }
    if let Some(database) = &config.database {
        options = options.database(database);
    }
    options
}
