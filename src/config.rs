//! Runtime configuration, read from the environment (and `.env` if present).

use std::time::Duration;

use thiserror::Error;

use crate::assign::DEFAULT_MAX_ATTEMPTS;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SOLVER_TIMEOUT_MS: u64 = 2000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Required environment variable '{0}' is not set")]
    Missing(&'static str),

    #[error("Environment variable '{name}' has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub admin_password: String,
    pub port: u16,
    pub solver_attempts: usize,
    pub solver_timeout: Duration,
}

fn parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        _ => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let admin_password = lookup("ADMIN_PASSWORD")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("ADMIN_PASSWORD"))?;
        let port = parsed(&lookup, "PORT", DEFAULT_PORT)?;
        let solver_attempts = parsed(&lookup, "SOLVER_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        let timeout_ms = parsed(&lookup, "SOLVER_TIMEOUT_MS", DEFAULT_SOLVER_TIMEOUT_MS)?;

        Ok(Config {
            admin_password,
            port,
            solver_attempts,
            solver_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[("ADMIN_PASSWORD", "pw")])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.solver_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.solver_timeout, Duration::from_millis(DEFAULT_SOLVER_TIMEOUT_MS));
    }

    #[test]
    fn password_is_required() {
        assert_eq!(
            Config::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::Missing("ADMIN_PASSWORD")
        );
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = Config::from_lookup(lookup(&[("ADMIN_PASSWORD", "pw"), ("PORT", "eighty")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "PORT",
                value: "eighty".to_string()
            }
        );
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("ADMIN_PASSWORD", "pw"),
            ("PORT", "9000"),
            ("SOLVER_ATTEMPTS", "25"),
            ("SOLVER_TIMEOUT_MS", "150"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.solver_attempts, 25);
        assert_eq!(config.solver_timeout, Duration::from_millis(150));
    }
}
