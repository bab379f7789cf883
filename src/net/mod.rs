//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind, accept)
//!     → connection.rs (HTTP/1 with read/write/idle timeouts, drain on shutdown)
//!     → Hand off to the axum router
//!
//! Connection States:
//!     Active → Draining → Closed
//! ```
//!
//! # Design Decisions
//! - Timeouts are enforced here, by the transport, never by handlers
//! - Each connection is tracked so shutdown can wait for (or abort) it

pub mod connection;
pub mod listener;

pub use connection::{ConnectionTracker, TransportError};
pub use listener::bind;
