//! Fault simulation handlers.
//!
//! Each endpoint produces a controlled failure for exercising client-side
//! resilience logic:
//!
//! ```text
//! GET /throw            → random 4xx from a fixed table      (errors.rs)
//! GET /slowproc/{num}   → CPU-bound delay, JSON string body  (slow.rs)
//! GET /hang             → never responds                     (unresponsive.rs)
//! GET /shutdown, /crash → process exits immediately          (unresponsive.rs)
//! ```
//!
//! None of these carry cancellation hooks. Slow and hung requests are bounded
//! only by the transport's write deadline or the client going away.

pub mod errors;
pub mod slow;
pub mod unresponsive;

pub use errors::throw_error;
pub use slow::slow_process;
pub use unresponsive::{crash, hang};
