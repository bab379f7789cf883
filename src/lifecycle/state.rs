//! Server lifecycle state machine.
//!
//! # States
//! ```text
//! Starting → Healthy → ShuttingDown → Stopped
//! ```
//!
//! Transitions are one-directional. A request to move to an earlier (or the
//! same) phase is ignored, so there is no way back into `Healthy` once shutdown
//! has begun.

use tokio::sync::watch;

/// Lifecycle phase of a server instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// Created, listener not yet serving.
    Starting,
    /// Accepting connections.
    Healthy,
    /// Listener closed, draining in-flight connections.
    ShuttingDown,
    /// All connections closed or aborted.
    Stopped,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Starting => "starting",
            Phase::Healthy => "healthy",
            Phase::ShuttingDown => "shutting-down",
            Phase::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Holds the current phase and lets observers watch it change.
#[derive(Debug)]
pub struct PhaseTracker {
    tx: watch::Sender<Phase>,
}

impl PhaseTracker {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Phase::Starting);
        Self { tx }
    }

    /// Current phase.
    pub fn current(&self) -> Phase {
        *self.tx.borrow()
    }

    /// Subscribe to phase changes.
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.tx.subscribe()
    }

    /// Move forward to `next`. Returns false if that would not be a forward move.
    pub fn advance(&self, next: Phase) -> bool {
        let moved = self.tx.send_if_modified(|current| {
            if next > *current {
                *current = next;
                true
            } else {
                false
            }
        });
        if moved {
            tracing::debug!(phase = %next, "Lifecycle phase changed");
        }
        moved
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_only_move_forward() {
        let phase = PhaseTracker::new();
        assert_eq!(phase.current(), Phase::Starting);

        assert!(phase.advance(Phase::Healthy));
        assert!(phase.advance(Phase::ShuttingDown));
        assert!(!phase.advance(Phase::Healthy));
        assert_eq!(phase.current(), Phase::ShuttingDown);

        assert!(phase.advance(Phase::Stopped));
        assert!(!phase.advance(Phase::Stopped));
        assert_eq!(phase.current(), Phase::Stopped);
    }

    #[test]
    fn skipping_ahead_is_allowed() {
        let phase = PhaseTracker::new();
        assert!(phase.advance(Phase::Stopped));
        assert!(!phase.advance(Phase::ShuttingDown));
    }

    #[tokio::test]
    async fn subscribers_observe_changes() {
        let phase = PhaseTracker::new();
        let mut rx = phase.subscribe();

        phase.advance(Phase::Healthy);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), Phase::Healthy);
    }

    #[test]
    fn display_names() {
        assert_eq!(Phase::ShuttingDown.to_string(), "shutting-down");
        assert_eq!(Phase::Stopped.to_string(), "stopped");
    }
}
