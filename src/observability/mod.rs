//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!
//! logging.rs installs the subscriber:
//!     → EnvFilter (RUST_LOG, default fault_server=info)
//!     → fmt layer on stdout
//! ```
//!
//! # Design Decisions
//! - Request id is carried as a field on the access log line
//! - Connection-level chatter stays at debug/trace

pub mod logging;
