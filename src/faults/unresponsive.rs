//! Handlers that never answer: a hung request and a process crash.

use axum::response::Response;

/// `GET /hang`
///
/// Parks the task on a future that never resolves. Only the transport's
/// write deadline (or the client hanging up) ends the request.
pub async fn hang() -> Response {
    tracing::debug!("Request parked indefinitely");
    std::future::pending::<Response>().await
}

/// `GET /shutdown` and `GET /crash`
///
/// Exits with status zero on the spot, without draining or cleanup, so the
/// client sees its connection drop.
pub async fn crash() -> Response {
    tracing::warn!("Server should be shutting down...");
    std::process::exit(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn hang_never_completes() {
        let outcome = tokio::time::timeout(Duration::from_millis(200), hang()).await;
        assert!(outcome.is_err());
    }
}
