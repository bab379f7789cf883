//! Process-wide health flag.
//!
//! Written only by the server lifecycle; read by `/healthz` and anything else
//! that wants to know whether traffic should be routed here. A single scalar
//! with no composite invariant, so an atomic is all the synchronization needed.

use std::sync::atomic::{AtomicBool, Ordering};

/// The flag the binary's server reports through.
pub static HEALTHY: HealthFlag = HealthFlag::new();

/// Atomic readiness flag.
#[derive(Debug)]
pub struct HealthFlag(AtomicBool);

impl HealthFlag {
    /// A flag that starts unhealthy.
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.0.store(healthy, Ordering::SeqCst);
    }

    pub fn is_healthy(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Default for HealthFlag {
    fn default() -> Self {
        Self::new()
    }
}
