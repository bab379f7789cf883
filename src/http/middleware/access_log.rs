//! Access logging middleware.
//!
//! Emits exactly one line per request once the handler is done with it. The
//! line is written from a drop guard, so a handler that panics, or one that the
//! transport abandons at the write deadline, is still logged.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request},
    middleware::Next,
    response::Response,
};

use crate::http::request::RequestIdExt;

/// Fields captured before the handler runs.
#[derive(Debug)]
struct AccessRecord {
    request_id: String,
    method: String,
    path: String,
    remote_addr: String,
    user_agent: String,
}

impl AccessRecord {
    fn from_request(request: &Request<Body>) -> Self {
        Self {
            request_id: request
                .request_id()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            remote_addr: request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.to_string())
                .unwrap_or_default(),
            user_agent: request
                .headers()
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string(),
        }
    }
}

impl Drop for AccessRecord {
    fn drop(&mut self) {
        tracing::info!(
            request_id = %self.request_id,
            method = %self.method,
            path = %self.path,
            remote_addr = %self.remote_addr,
            user_agent = %self.user_agent,
            "request"
        );
    }
}

pub async fn access_log_middleware(request: Request<Body>, next: Next) -> Response {
    let _record = AccessRecord::from_request(&request);
    next.run(request).await
}
