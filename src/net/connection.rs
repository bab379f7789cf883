//! Connection lifecycle and transport timeouts.
//!
//! # Responsibilities
//! - Serve one TCP connection over HTTP/1.1
//! - Enforce the read (header), write (response) and idle deadlines
//! - Drain gracefully when the server begins shutting down
//! - Track live connections for shutdown bookkeeping

use std::convert::Infallible;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tower::ServiceExt;

use crate::config::TimeoutConfig;

/// Global atomic counter for connection IDs.
/// Relaxed ordering is enough: we only need uniqueness.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// How often a connection re-checks its read and idle deadlines.
const DEADLINE_POLL: Duration = Duration::from_millis(250);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Error returned from the per-request service.
///
/// hyper treats any service error as fatal for the connection, so returning one
/// closes the socket without writing a response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("response not written within {0:?}")]
    WriteTimeout(Duration),
}

/// Tracks live connections and broadcasts the drain signal.
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    active_count: Arc<AtomicU64>,
    drain_tx: Arc<watch::Sender<bool>>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            active_count: Arc::new(AtomicU64::new(0)),
            drain_tx: Arc::new(tx),
        }
    }

    /// Record a new connection. Returns a guard that decrements on drop.
    pub fn track(&self) -> ConnectionGuard {
        self.active_count.fetch_add(1, Ordering::SeqCst);
        ConnectionGuard {
            active_count: Arc::clone(&self.active_count),
            id: ConnectionId::new(),
        }
    }

    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }

    /// Receiver that flips to `true` when connections should drain.
    pub fn drain_receiver(&self) -> watch::Receiver<bool> {
        self.drain_tx.subscribe()
    }

    /// Tell every connection to stop keep-alive and close after its current response.
    pub fn begin_drain(&self) {
        self.drain_tx.send_replace(true);
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that tracks a connection's lifetime.
#[derive(Debug)]
pub struct ConnectionGuard {
    active_count: Arc<AtomicU64>,
    id: ConnectionId,
}

impl ConnectionGuard {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.active_count.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(connection_id = %self.id, "Connection closed");
    }
}

/// Sentinel for "no request is being read".
const NOT_READING: u64 = u64::MAX;

/// Request activity on one connection.
///
/// A connection is always in one of three phases:
/// - reading: from accept, or from the first byte after a response, until
///   the request is dispatched (read deadline applies)
/// - in flight: a handler is running (write deadline applies)
/// - idle: a response went out and nothing has arrived since (idle deadline applies)
#[derive(Debug)]
struct Activity {
    opened: Instant,
    in_flight: AtomicUsize,
    last_active_ms: AtomicU64,
    read_started_ms: AtomicU64,
}

impl Activity {
    fn new() -> Self {
        Self {
            opened: Instant::now(),
            in_flight: AtomicUsize::new(0),
            last_active_ms: AtomicU64::new(0),
            read_started_ms: AtomicU64::new(0),
        }
    }

    fn now_ms(&self) -> u64 {
        self.opened.elapsed().as_millis() as u64
    }

    fn begin(self: &Arc<Self>) -> InFlight {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.read_started_ms.store(NOT_READING, Ordering::SeqCst);
        InFlight(Arc::clone(self))
    }

    /// Bytes arrived on the socket. Starts the read phase if the connection was idle.
    fn bytes_received(&self) {
        if self.in_flight.load(Ordering::SeqCst) == 0 {
            let _ = self.read_started_ms.compare_exchange(
                NOT_READING,
                self.now_ms(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            );
        }
    }

    fn stamp(&self) {
        self.last_active_ms.store(self.now_ms(), Ordering::SeqCst);
    }

    /// How long the pending request has been reading, if one is.
    fn reading_for(&self) -> Option<Duration> {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            return None;
        }
        match self.read_started_ms.load(Ordering::SeqCst) {
            NOT_READING => None,
            started => Some(Duration::from_millis(self.now_ms().saturating_sub(started))),
        }
    }

    /// Time since the last response; zero unless the connection is idle.
    fn idle_for(&self) -> Duration {
        if self.in_flight.load(Ordering::SeqCst) > 0
            || self.read_started_ms.load(Ordering::SeqCst) != NOT_READING
        {
            return Duration::ZERO;
        }
        let last = self.last_active_ms.load(Ordering::SeqCst);
        Duration::from_millis(self.now_ms().saturating_sub(last))
    }

    /// Whether hyper's graceful shutdown would keep the current request.
    ///
    /// hyper closes a connection it considers idle, and a request whose
    /// headers are still arriving looks idle to it. Wait for dispatch instead.
    fn ready_to_drain(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
            || self.read_started_ms.load(Ordering::SeqCst) == NOT_READING
    }
}

struct InFlight(Arc<Activity>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.stamp();
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// TCP stream that reports inbound bytes to the connection's [`Activity`].
struct TrackedStream {
    inner: TcpStream,
    activity: Arc<Activity>,
}

impl AsyncRead for TrackedStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
        if matches!(poll, Poll::Ready(Ok(()))) && buf.filled().len() > before {
            this.activity.bytes_received();
        }
        poll
    }
}

impl AsyncWrite for TrackedStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

/// Serve a single accepted connection until it closes.
///
/// The write deadline covers the whole handler. When it passes, the handler
/// future is dropped and the connection is torn down; the client sees the
/// socket close rather than an HTTP error. The read deadline closes a
/// connection whose request never finishes arriving, and the idle deadline
/// closes one that has gone quiet between requests.
pub async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    router: Router,
    timeouts: TimeoutConfig,
    guard: ConnectionGuard,
    mut drain: watch::Receiver<bool>,
) {
    let conn_id = guard.id();
    let activity = Arc::new(Activity::new());
    let read_timeout = timeouts.read();
    let write_timeout = timeouts.write();
    let idle_timeout = timeouts.idle();

    tracing::debug!(connection_id = %conn_id, peer_addr = %peer, "Connection accepted");

    let service = {
        let activity = Arc::clone(&activity);
        service_fn(move |mut request: Request<Incoming>| {
            let router = router.clone();
            let in_flight = activity.begin();
            request.extensions_mut().insert(ConnectInfo(peer));
            async move {
                let _in_flight = in_flight;
                let outcome =
                    tokio::time::timeout(write_timeout, router.oneshot(request.map(Body::new)))
                        .await;
                match outcome {
                    Ok(response) => Ok::<Response, TransportError>(unwrap_infallible(response)),
                    Err(_) => {
                        tracing::warn!(
                            connection_id = %conn_id,
                            timeout = ?write_timeout,
                            "Write timeout elapsed, closing connection"
                        );
                        Err(TransportError::WriteTimeout(write_timeout))
                    }
                }
            }
        })
    };

    let io = TrackedStream {
        inner: stream,
        activity: Arc::clone(&activity),
    };
    // Read and idle deadlines are phase-dependent, so hyper's own header timer stays off.
    let conn = http1::Builder::new()
        .header_read_timeout(None)
        .serve_connection(TokioIo::new(io), service);
    tokio::pin!(conn);

    let mut drain_requested = *drain.borrow();
    let mut closing = false;
    let mut deadline_check = tokio::time::interval(DEADLINE_POLL);

    loop {
        if drain_requested && !closing && activity.ready_to_drain() {
            closing = true;
            tracing::trace!(connection_id = %conn_id, "Draining connection");
            conn.as_mut().graceful_shutdown();
        }

        tokio::select! {
            result = conn.as_mut() => {
                if let Err(e) = result {
                    tracing::debug!(connection_id = %conn_id, error = %e, "Connection ended with error");
                }
                break;
            }
            _ = drain.changed(), if !drain_requested => {
                drain_requested = true;
            }
            _ = deadline_check.tick() => {
                if let Some(reading) = activity.reading_for() {
                    if reading >= read_timeout {
                        tracing::debug!(connection_id = %conn_id, "Read timeout elapsed");
                        break;
                    }
                } else if !closing && activity.idle_for() >= idle_timeout {
                    closing = true;
                    tracing::debug!(connection_id = %conn_id, "Idle timeout elapsed");
                    conn.as_mut().graceful_shutdown();
                }
            }
        }
    }

    drop(guard);
}

fn unwrap_infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn connection_tracker_counts() {
        let tracker = ConnectionTracker::new();
        assert_eq!(tracker.active_count(), 0);

        let guard1 = tracker.track();
        assert_eq!(tracker.active_count(), 1);

        let guard2 = tracker.track();
        assert_eq!(tracker.active_count(), 2);

        drop(guard1);
        assert_eq!(tracker.active_count(), 1);

        drop(guard2);
        assert_eq!(tracker.active_count(), 0);
    }

    #[tokio::test]
    async fn drain_reaches_existing_receivers() {
        let tracker = ConnectionTracker::new();
        let mut rx = tracker.drain_receiver();
        assert!(!*rx.borrow());

        tracker.begin_drain();
        rx.changed().await.unwrap();
        assert!(*rx.borrow());

        // Late subscribers see the current value immediately.
        assert!(*tracker.drain_receiver().borrow());
    }

    #[test]
    fn fresh_connection_is_reading() {
        let activity = Activity::new();
        assert!(activity.reading_for().is_some());
        assert_eq!(activity.idle_for(), Duration::ZERO);
        assert!(!activity.ready_to_drain());
    }

    #[test]
    fn phases_follow_requests() {
        let activity = Arc::new(Activity::new());

        let in_flight = activity.begin();
        assert!(activity.reading_for().is_none());
        assert_eq!(activity.idle_for(), Duration::ZERO);
        assert!(activity.ready_to_drain());

        // Body bytes read by a running handler do not start a new read phase.
        activity.bytes_received();
        assert!(activity.reading_for().is_none());

        drop(in_flight);
        std::thread::sleep(Duration::from_millis(20));
        assert!(activity.reading_for().is_none());
        assert!(activity.idle_for() >= Duration::from_millis(20));
        assert!(activity.ready_to_drain());

        activity.bytes_received();
        assert!(activity.reading_for().is_some());
        assert_eq!(activity.idle_for(), Duration::ZERO);
        assert!(!activity.ready_to_drain());
    }
}
