//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! CLI flags (--listen-addr)
//!     → schema.rs (ServerConfig with defaults)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → handed to HttpServer at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the server starts
//! - All fields have defaults (5s read, 10s write, 15s idle, 30s grace)
//! - Validation separates syntactic (serde) from semantic checks

pub mod schema;
pub mod validation;

pub use schema::{ServerConfig, TimeoutConfig};
pub use validation::{validate_config, ConfigError};
