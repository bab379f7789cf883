//! TCP listener setup.

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::ServerError;

/// Bind the configured listen address.
///
/// Host names are resolved here, so `localhost:8000` works as well as
/// `127.0.0.1:8000` or the port-only `:8000` form.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;

    tracing::info!(
        address = %listener.local_addr()?,
        "Listener bound"
    );

    Ok(listener)
}
