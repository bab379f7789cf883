//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Validate config → Bind listener → health = true → Healthy
//!     (HttpServer::run validates again for library callers)
//!
//! Shutdown (shutdown.rs):
//!     Signal received → health = false → Stop accepting → Drain connections → Stopped
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - The health flag is the only process-wide mutable state
//! - Phases only move forward: Starting → Healthy → ShuttingDown → Stopped
//! - Shutdown has a deadline: connections still open after the grace period are aborted

pub mod health;
pub mod shutdown;
pub mod signals;
pub mod state;

pub use health::{HealthFlag, HEALTHY};
pub use shutdown::Shutdown;
pub use state::{Phase, PhaseTracker};
