//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (net::connection)
//!     → request.rs (assign X-Request-Id)
//!     → middleware/access_log.rs (one line per request, on completion)
//!     → server.rs router
//!     → faults/* or people/* handler
//!     → response.rs helpers (content type, newline-terminated bodies)
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, RequestIdExt, X_REQUEST_ID};
pub use server::{build_router, AppState, HttpServer};
