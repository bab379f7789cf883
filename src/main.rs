//! Fault-injection HTTP server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ net::listener ──▶ net::connection ──▶ http::request
//!                     (accept)         (read/write/idle    (X-Request-Id)
//!                                       timeouts)              │
//!                                                              ▼
//!                                                     http::middleware
//!                                                       (access log)
//!                                                              │
//!                                                              ▼
//!                                                       http::server
//!                                                         (router)
//!                                                      │            │
//!                                                      ▼            ▼
//!                                                   faults       people
//!
//!     SIGINT/SIGTERM ──▶ lifecycle ──▶ health=false, stop accepting, drain (30s)
//! ```

use std::process::ExitCode;

use clap::Parser;

use fault_server::config::{validate_config, ServerConfig};
use fault_server::http::HttpServer;
use fault_server::lifecycle::{signals, Shutdown};
use fault_server::net;
use fault_server::observability::logging;
use fault_server::ServerError;

#[derive(Parser, Debug)]
#[command(name = "fault-server")]
#[command(about = "HTTP backend that misbehaves on request", long_about = None)]
struct Cli {
    /// Server listen address
    #[arg(long, default_value = ":8000")]
    listen_addr: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    tracing::info!("Server is starting...");

    let config = ServerConfig::with_listen_addr(cli.listen_addr);
    if let Err(errors) = validate_config(&config) {
        let e = ServerError::Config(errors);
        tracing::error!(error = %e, "Could not start server");
        return ExitCode::FAILURE;
    }

    let listener = match net::bind(&config).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Could not start server");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config);
    match server.run(listener, server_shutdown).await {
        Ok(()) => {
            tracing::info!("Server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}
