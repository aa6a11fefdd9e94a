use anyhow::Result;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::{BoxError, ErrorList};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub instance_id: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Bearer token accepted by `/protected`
    pub api_token: String,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub addr: String,
    pub timeout_ms: u64,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Every invalid variable is reported, not just the first one.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut errors: Vec<BoxError> = Vec::new();

        let port = parse_or(&lookup, "API_PORT", 8080u16, &mut errors);
        let timeout_ms = parse_or(&lookup, "UPSTREAM_TIMEOUT_MS", 2000u64, &mut errors);
        if timeout_ms == 0 {
            errors.push("UPSTREAM_TIMEOUT_MS must be greater than zero".into());
        }

        let api_token = lookup("API_TOKEN").unwrap_or_else(|| "changeme".to_string());
        if api_token.trim().is_empty() {
            errors.push("API_TOKEN must not be empty".into());
        }

        if !errors.is_empty() {
            return Err(anyhow::Error::new(ErrorList::new(errors))
                .context("Failed to parse configuration"));
        }

        Ok(Config {
            server: ServerConfig {
                host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port,
                // Used only for debugging/observability. If unset, fall back to HOSTNAME if
                // present (e.g. Docker/Kubernetes), otherwise "unknown".
                instance_id: lookup("INSTANCE_ID")
                    .or_else(|| lookup("HOSTNAME"))
                    .unwrap_or_else(|| "unknown".to_string()),
            },
            auth: AuthConfig { api_token },
            upstream: UpstreamConfig {
                addr: lookup("UPSTREAM_ADDR").unwrap_or_else(|| "127.0.0.1:9".to_string()),
                timeout_ms,
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T, errors: &mut Vec<BoxError>) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.parse() {
        Ok(value) => value,
        Err(e) => {
            errors.push(format!("{} must be a valid number ({:?}: {})", key, raw, e).into());
            default
        }
    }
}
