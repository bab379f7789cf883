//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the listen address carries a port
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ConfigError>>
//! - Runs before the listener is bound

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem with a [`ServerConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("listen address is empty")]
    EmptyListenAddr,

    #[error("listen address {0:?} has no valid port")]
    MissingPort(String),

    #[error("timeout {name} must be greater than zero")]
    ZeroTimeout { name: &'static str },
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let addr = config.listen_addr.trim();
    if addr.is_empty() {
        errors.push(ConfigError::EmptyListenAddr);
    } else {
        let has_port = addr
            .rsplit_once(':')
            .map(|(_, port)| port.parse::<u16>().is_ok())
            .unwrap_or(false);
        if !has_port {
            errors.push(ConfigError::MissingPort(config.listen_addr.clone()));
        }
    }

    let timeouts = [
        ("read_secs", config.timeouts.read_secs),
        ("write_secs", config.timeouts.write_secs),
        ("idle_secs", config.timeouts.idle_secs),
        ("grace_secs", config.timeouts.grace_secs),
    ];
    for (name, value) in timeouts {
        if value == 0 {
            errors.push(ConfigError::ZeroTimeout { name });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
