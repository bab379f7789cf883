//! Configuration schema definitions.
//!
//! All types derive Serde traits so a config can be built from any source,
//! though the binary only fills `listen_addr` from the command line.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the fault server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address. A leading `:` (e.g. `:8000`) binds every interface.
    pub listen_addr: String,

    /// Transport and shutdown timeouts.
    pub timeouts: TimeoutConfig,

    /// Number of random records loaded into the people store at startup.
    pub seed_people: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: ":8000".to_string(),
            timeouts: TimeoutConfig::default(),
            seed_people: 0,
        }
    }
}

impl ServerConfig {
    /// Build a config that listens on the given address, everything else default.
    pub fn with_listen_addr(listen_addr: impl Into<String>) -> Self {
        Self {
            listen_addr: listen_addr.into(),
            ..Self::default()
        }
    }

    /// The address to hand to the socket layer.
    ///
    /// `:8000` becomes `0.0.0.0:8000`; anything else is passed through so host
    /// names still resolve at bind time.
    pub fn bind_address(&self) -> String {
        if self.listen_addr.starts_with(':') {
            format!("0.0.0.0{}", self.listen_addr)
        } else {
            self.listen_addr.clone()
        }
    }
}

/// Timeout configuration, in whole seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for reading request headers.
    pub read_secs: u64,

    /// Deadline for producing a response once a request is read.
    pub write_secs: u64,

    /// How long a keep-alive connection may sit without a request.
    pub idle_secs: u64,

    /// Grace period for in-flight requests during shutdown.
    pub grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_secs: 5,
            write_secs: 10,
            idle_secs: 15,
            grace_secs: 30,
        }
    }
}

impl TimeoutConfig {
    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }

    pub fn write(&self) -> Duration {
        Duration::from_secs(self.write_secs)
    }

    pub fn idle(&self) -> Duration {
        Duration::from_secs(self.idle_secs)
    }

    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }
}
