//! Unified error type for server startup and shutdown.

use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;

/// Fatal server errors. Anything returned here ends the process.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be bound.
    #[error("could not listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration failed validation.
    #[error("invalid configuration: {}", join_errors(.0))]
    Config(Vec<ConfigError>),

    /// Socket-level failure outside of bind.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Connections were still open when the grace period ran out.
    #[error("could not gracefully shut down: {remaining} connection(s) still open after {grace:?}")]
    ShutdownTimeout { remaining: usize, grace: Duration },
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_joined() {
        let err = ServerError::Config(vec![
            ConfigError::EmptyListenAddr,
            ConfigError::ZeroTimeout { name: "idle_secs" },
        ]);
        assert_eq!(
            err.to_string(),
            "invalid configuration: listen address is empty, timeout idle_secs must be greater than zero"
        );
    }

    #[test]
    fn shutdown_timeout_message() {
        let err = ServerError::ShutdownTimeout {
            remaining: 2,
            grace: Duration::from_secs(30),
        };
        assert_eq!(
            err.to_string(),
            "could not gracefully shut down: 2 connection(s) still open after 30s"
        );
    }
}
