//! Server configuration read from the process environment.

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use axum::http::HeaderValue;

/// Errors raised while reading configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Origins allowed by CORS, already validated as header values.
    pub cors_origins: Vec<HeaderValue>,
    pub request_timeout_secs: u64,
    /// How long in-flight requests may drain after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    /// Upper bound on JSON request bodies (document patches included).
    pub max_body_bytes: usize,
    /// PostgreSQL URL. Without it documents are kept in memory.
    pub database_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
            cors_origins: vec![HeaderValue::from_static("http://localhost:5173")],
            request_timeout_secs: 30,
            shutdown_timeout_secs: 30,
            max_body_bytes: 256 * 1024,
            database_url: None,
        }
    }
}

impl ServerConfig {
    /// Load from environment variables, falling back to [`Default`] values.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    /// | `MAX_BODY_BYTES`        | `262144`                |
    /// | `DATABASE_URL`          | unset (in-memory store) |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let cors_origins = match read("CORS_ORIGINS") {
            Some(raw) => parse_origins(&raw)?,
            None => defaults.cors_origins,
        };

        Ok(Self {
            host: parse_or("HOST", read("HOST"), defaults.host)?,
            port: parse_or("PORT", read("PORT"), defaults.port)?,
            cors_origins,
            request_timeout_secs: parse_or(
                "REQUEST_TIMEOUT_SECS",
                read("REQUEST_TIMEOUT_SECS"),
                defaults.request_timeout_secs,
            )?,
            shutdown_timeout_secs: parse_or(
                "SHUTDOWN_TIMEOUT_SECS",
                read("SHUTDOWN_TIMEOUT_SECS"),
                defaults.shutdown_timeout_secs,
            )?,
            max_body_bytes: parse_or(
                "MAX_BODY_BYTES",
                read("MAX_BODY_BYTES"),
                defaults.max_body_bytes,
            )?,
            database_url: read("DATABASE_URL"),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = raw else {
        return Ok(default);
    };
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value,
    })
}

/// Comma-separated origins; blanks are skipped. CORS runs with credentials,
/// so the `*` wildcard is rejected and origins must be listed explicitly.
fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            let invalid = |reason: String| ConfigError::Invalid {
                var: "CORS_ORIGINS",
                value: origin.to_string(),
                reason,
            };
            if origin == "*" {
                return Err(invalid(
                    "wildcard origin cannot be combined with credentials".to_string(),
                ));
            }
            HeaderValue::from_str(origin).map_err(|e| invalid(e.to_string()))
        })
        .collect()
}
