//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use fault_server::config::ServerConfig;
use fault_server::http::HttpServer;
use fault_server::lifecycle::{HealthFlag, Phase, Shutdown};
use fault_server::net::ConnectionTracker;
use fault_server::ServerError;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A server running on an ephemeral localhost port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub health: &'static HealthFlag,
    pub phase: watch::Receiver<Phase>,
    pub connections: ConnectionTracker,
    pub handle: JoinHandle<Result<(), ServerError>>,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for `run` to return.
    pub async fn stop(self) -> Result<(), ServerError> {
        self.shutdown.trigger();
        self.handle.await.expect("server task panicked")
    }
}

/// Start a server with the given config and wait until it reports healthy.
pub async fn start_server(config: ServerConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let health: &'static HealthFlag = Box::leak(Box::new(HealthFlag::new()));
    let server = HttpServer::with_health(config, health);
    let mut phase = server.phase();
    let connections = server.connections();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    tokio::time::timeout(
        Duration::from_secs(5),
        phase.wait_for(|p| *p == Phase::Healthy),
    )
    .await
    .expect("server did not become healthy")
    .expect("phase channel closed");

    TestServer {
        addr,
        shutdown,
        health,
        phase,
        connections,
        handle,
    }
}

/// Config with the default timeouts except for the write deadline.
#[allow(dead_code)]
pub fn config_with_write_timeout(secs: u64) -> ServerConfig {
    let mut config = ServerConfig::with_listen_addr("127.0.0.1:0");
    config.timeouts.write_secs = secs;
    config
}

/// Read from a raw socket until a full response head has arrived.
///
/// Returns whatever was read, possibly empty if the server closed the socket.
#[allow(dead_code)]
pub async fn read_response_head(stream: &mut tokio::net::TcpStream) -> String {
    use tokio::io::AsyncReadExt;

    let mut buf = [0u8; 1024];
    let mut response = Vec::new();
    while !response.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => response.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&response).into_owned()
}

/// Non-pooled client so every request opens its own connection.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap()
}
