//! Server configuration read from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::convert::DEFAULT_RENDER_TIMEOUT;
use crate::issuance::ExistingFieldsPolicy;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ARTIFACT_DIR: &str = "./data/certificates";
const DEFAULT_CHROMIUM_PATH: &str = "chromium";

/// Invalid configuration value.
#[derive(Debug, thiserror::Error)]
#[error("Invalid value for {key}: '{value}' ({reason})")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Runtime configuration of the certificate server.
#[derive(Debug, Clone)]
pub struct Config {
    /// `BIND_ADDR`: address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
    /// `DATABASE_URL`: PostgreSQL record store; in-memory when unset.
    pub database_url: Option<String>,
    /// `DATABASE_MAX_CONNECTIONS`
    pub database_max_connections: u32,
    /// `ARTIFACT_DIR`: directory holding rendered documents.
    pub artifact_dir: PathBuf,
    /// `ARTIFACT_BASE_URL`: public prefix of document URLs.
    pub artifact_base_url: String,
    /// `ARTIFACT_MIRROR_DIR`: optional directory receiving a copy of every document.
    pub artifact_mirror_dir: Option<PathBuf>,
    /// `CHROMIUM_PATH`: browser used for PDF conversion.
    pub chromium_path: PathBuf,
    /// `RENDER_TIMEOUT_SECS`
    pub render_timeout: Duration,
    /// `EXISTING_FIELDS_POLICY`: `stored` or `echo`.
    pub existing_fields_policy: ExistingFieldsPolicy,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr: SocketAddr = parse_or("BIND_ADDR", get("BIND_ADDR"), DEFAULT_BIND_ADDR.parse().ok())?;
        let database_max_connections = parse_or(
            "DATABASE_MAX_CONNECTIONS",
            get("DATABASE_MAX_CONNECTIONS"),
            Some(DEFAULT_MAX_CONNECTIONS),
        )?;
        if database_max_connections == 0 {
            return Err(ConfigError {
                key: "DATABASE_MAX_CONNECTIONS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let render_timeout_secs: u64 = parse_or(
            "RENDER_TIMEOUT_SECS",
            get("RENDER_TIMEOUT_SECS"),
            Some(DEFAULT_RENDER_TIMEOUT.as_secs()),
        )?;

        let existing_fields_policy = match get("EXISTING_FIELDS_POLICY") {
            Some(value) => {
                let parsed = value.parse::<ExistingFieldsPolicy>();
                parsed.map_err(|reason| ConfigError {
                    key: "EXISTING_FIELDS_POLICY",
                    value,
                    reason,
                })?
            }
            None => ExistingFieldsPolicy::default(),
        };

        let artifact_base_url = get("ARTIFACT_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}/certificates", bind_addr.port()));

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL"),
            database_max_connections,
            artifact_dir: get("ARTIFACT_DIR")
                .unwrap_or_else(|| DEFAULT_ARTIFACT_DIR.to_string())
                .into(),
            artifact_base_url,
            artifact_mirror_dir: get("ARTIFACT_MIRROR_DIR").map(PathBuf::from),
            chromium_path: get("CHROMIUM_PATH")
                .unwrap_or_else(|| DEFAULT_CHROMIUM_PATH.to_string())
                .into(),
            render_timeout: Duration::from_secs(render_timeout_secs),
            existing_fields_policy,
        })
    }
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: Option<T>) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|e| ConfigError {
                key,
                reason: e.to_string(),
                value,
            })
        }
        None => default.ok_or_else(|| ConfigError {
            key,
            value: String::new(),
            reason: "missing".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert!(config.database_url.is_none());
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.artifact_dir, PathBuf::from("./data/certificates"));
        assert_eq!(config.artifact_base_url, "http://localhost:3000/certificates");
        assert!(config.artifact_mirror_dir.is_none());
        assert_eq!(config.chromium_path, PathBuf::from("chromium"));
        assert_eq!(config.render_timeout, Duration::from_secs(30));
        assert_eq!(config.existing_fields_policy, ExistingFieldsPolicy::Stored);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DATABASE_URL", "postgres://localhost/certificates"),
            ("ARTIFACT_BASE_URL", "https://cdn.example.com/certs"),
            ("ARTIFACT_MIRROR_DIR", "/tmp/mirror"),
            ("RENDER_TIMEOUT_SECS", "5"),
            ("EXISTING_FIELDS_POLICY", "echo"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/certificates")
        );
        assert_eq!(config.artifact_base_url, "https://cdn.example.com/certs");
        assert_eq!(config.artifact_mirror_dir, Some(PathBuf::from("/tmp/mirror")));
        assert_eq!(config.render_timeout, Duration::from_secs(5));
        assert_eq!(config.existing_fields_policy, ExistingFieldsPolicy::Echo);
    }

    #[test]
    fn test_base_url_follows_bind_port() {
        let config = config(&[("BIND_ADDR", "0.0.0.0:9090")]).unwrap();
        assert_eq!(config.artifact_base_url, "http://localhost:9090/certificates");
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = config(&[("DATABASE_URL", ""), ("ARTIFACT_MIRROR_DIR", "  ")]).unwrap();
        assert!(config.database_url.is_none());
        assert!(config.artifact_mirror_dir.is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = config(&[("BIND_ADDR", "not-an-addr")]).unwrap_err();
        assert_eq!(err.key, "BIND_ADDR");

        let err = config(&[("RENDER_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert_eq!(err.key, "RENDER_TIMEOUT_SECS");

        let err = config(&[("EXISTING_FIELDS_POLICY", "overwrite")]).unwrap_err();
        assert_eq!(err.key, "EXISTING_FIELDS_POLICY");
        assert!(err.to_string().contains("overwrite"));

        let err = config(&[("DATABASE_MAX_CONNECTIONS", "0")]).unwrap_err();
        assert_eq!(err.key, "DATABASE_MAX_CONNECTIONS");
    }
}
