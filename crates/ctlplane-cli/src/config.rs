//! TOML configuration, loaded via the `config` crate with `CTLPLANE_`-
//! prefixed environment overrides.

use ::config::{Config as ConfigSource, Environment, File};
use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub tls_cert: Option<PathBuf>,
    pub tls_key: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8088, tls_cert: None, tls_key: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub dsn: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { dsn: "memory://".into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Duration syntax `<n>{m,h,d,y}`, e.g. `"1h"`.
    pub expiration_time: String,
    pub max_variables: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { expiration_time: "1h".into(), max_variables: 32 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub max_token_age: String,
    pub clock_skew: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { max_token_age: "15m".into(), clock_skew: "30s".into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditLogConfig {
    pub path: PathBuf,
}

impl Default for AuditLogConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("audit.tlog") }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub auth: AuthConfig,
    pub audit_log: AuditLogConfig,
    pub single_user_mode: bool,
    pub default_tenant_id: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            session: SessionConfig::default(),
            auth: AuthConfig::default(),
            audit_log: AuditLogConfig::default(),
            single_user_mode: false,
            default_tenant_id: "default".into(),
        }
    }
}

/// Load configuration: built-in defaults, overridden by `path` if present,
/// overridden again by `CTLPLANE_*` environment variables.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut builder = ConfigSource::builder();
    if let Some(path) = path {
        if path.exists() {
            builder = builder.add_source(File::from(path));
        }
    }
    let source = builder
        .add_source(Environment::with_prefix("CTLPLANE").separator("__").try_parsing(true))
        .build()
        .context("failed to assemble configuration sources")?;
    source.try_deserialize().context("failed to deserialize configuration")
}

/// Parse the spec's duration syntax: an integer followed by one of
/// `m` (minutes), `h` (hours), `d` (days), `y` (365-day years), or `s`
/// (seconds) for the shorter auth windows.
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    let split_at = raw
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| anyhow::anyhow!("duration {raw:?} has no unit"))?;
    let (digits, unit) = raw.split_at(split_at);
    let n: i64 = digits.parse().with_context(|| format!("invalid duration magnitude in {raw:?}"))?;
    let duration = match unit {
        "s" => Duration::seconds(n),
        "m" => Duration::minutes(n),
        "h" => Duration::hours(n),
        "d" => Duration::days(n),
        "y" => Duration::days(n * 365),
        other => anyhow::bail!("unrecognized duration unit {other:?} in {raw:?}"),
    };
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_a_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.default_tenant_id, "default");
    }

    #[test]
    fn duration_parses_each_unit() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::seconds(30));
        assert_eq!(parse_duration("15m").unwrap(), Duration::minutes(15));
        assert_eq!(parse_duration("1h").unwrap(), Duration::hours(1));
        assert_eq!(parse_duration("7d").unwrap(), Duration::days(7));
        assert_eq!(parse_duration("1y").unwrap(), Duration::days(365));
    }

    #[test]
    fn duration_rejects_missing_unit() {
        assert!(parse_duration("42").is_err());
    }

    #[test]
    fn duration_rejects_unknown_unit() {
        assert!(parse_duration("5w").is_err());
    }
}
