//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Create the axum Router with every handler
//! - Wire up middleware (request id, access log, CORS header)
//! - Accept connections and hand them to the transport
//! - Flip the health flag and drain connections on shutdown

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinSet;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{validate_config, ServerConfig};
use crate::error::ServerError;
use crate::faults;
use crate::http::middleware::access_log_middleware;
use crate::http::request::request_id_middleware;
use crate::lifecycle::{HealthFlag, Phase, PhaseTracker, HEALTHY};
use crate::net::connection::{serve_connection, ConnectionTracker};
use crate::people::handlers::{create_person, delete_person, get_person, list_people};
use crate::people::PeopleStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub people: Arc<PeopleStore>,
    pub health: &'static HealthFlag,
}

impl AppState {
    pub fn new(people: PeopleStore, health: &'static HealthFlag) -> Self {
        Self {
            people: Arc::new(people),
            health,
        }
    }
}

/// Build the router with all middleware layers.
///
/// Layer order, outermost first: request id → access log → CORS header → routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/people", get(list_people))
        .route(
            "/people/{id}",
            get(get_person).post(create_person).delete(delete_person),
        )
        .route("/throw", get(faults::throw_error))
        .route("/hang", get(faults::hang))
        .route("/slowproc/{num}", get(faults::slow_process))
        .route("/shutdown", get(faults::crash))
        .route("/crash", get(faults::crash))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(middleware::from_fn(access_log_middleware))
        .layer(middleware::from_fn(request_id_middleware))
}

/// `GET /healthz`
async fn healthz(State(state): State<AppState>) -> StatusCode {
    if state.health.is_healthy() {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// The fault server.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    health: &'static HealthFlag,
    phase: PhaseTracker,
    connections: ConnectionTracker,
}

impl HttpServer {
    /// Create a server that reports through the process-wide health flag.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_health(config, &HEALTHY)
    }

    /// Create a server that reports through the given health flag.
    pub fn with_health(config: ServerConfig, health: &'static HealthFlag) -> Self {
        let people = PeopleStore::seeded(config.seed_people);
        let state = AppState::new(people, health);
        let router = build_router(state);
        Self {
            router,
            config,
            health,
            phase: PhaseTracker::new(),
            connections: ConnectionTracker::new(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Watch the server's lifecycle phase.
    pub fn phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Live connection bookkeeping for this server.
    pub fn connections(&self) -> ConnectionTracker {
        self.connections.clone()
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    ///
    /// Returns once every connection has closed. If the grace period runs out
    /// first, the remaining connections are aborted and
    /// [`ServerError::ShutdownTimeout`] is returned.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        validate_config(&self.config).map_err(ServerError::Config)?;

        let addr = listener.local_addr()?;
        let timeouts = self.config.timeouts.clone();
        let tracker = self.connections.clone();
        let mut connections = JoinSet::new();

        self.health.set_healthy(true);
        self.phase.advance(Phase::Healthy);
        tracing::info!(address = %addr, "Server is ready to handle requests");

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        connections.spawn(serve_connection(
                            stream,
                            peer,
                            self.router.clone(),
                            timeouts.clone(),
                            tracker.track(),
                            tracker.drain_receiver(),
                        ));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to accept connection");
                    }
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
                _ = shutdown.recv() => {
                    self.health.set_healthy(false);
                    break;
                }
            }
        }

        self.phase.advance(Phase::ShuttingDown);
        tracing::info!(
            active_connections = tracker.active_count(),
            "Server is shutting down..."
        );

        drop(listener);
        tracker.begin_drain();

        let grace = timeouts.grace();
        let drained = tokio::time::timeout(grace, async {
            while connections.join_next().await.is_some() {}
        })
        .await;

        let result = match drained {
            Ok(()) => Ok(()),
            Err(_) => {
                let remaining = connections.len();
                connections.abort_all();
                while connections.join_next().await.is_some() {}
                Err(ServerError::ShutdownTimeout { remaining, grace })
            }
        };

        self.phase.advance(Phase::Stopped);
        result
    }
}
