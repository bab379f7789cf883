//! Fault-injection HTTP server library.
//!
//! A deliberately unreliable backend for exercising client resilience:
//! random error statuses, slow responses, hung requests and abrupt exits,
//! served behind request tracing, access logging and graceful shutdown.

pub mod config;
pub mod error;
pub mod faults;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod people;

pub use config::ServerConfig;
pub use error::ServerError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
