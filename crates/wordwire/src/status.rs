//! Read-only status endpoint.
//!
//! One GET, one JSON document: live connection count plus every room
//! with its participants, state, attempt counter, and hint history.
//! This is an operator's peephole, not part of the protocol — no
//! routing, no methods, the request is read and discarded.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use wordwire_transport::TransportError;

use crate::{Dispatcher, WordwireError};

/// A bound status listener, created at build time so tests can bind
/// port 0 and discover the address.
pub(crate) struct StatusListener {
    listener: TcpListener,
}

impl StatusListener {
    pub(crate) fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }
}

/// Binds the status endpoint.
pub(crate) async fn bind(addr: &str) -> Result<StatusListener, WordwireError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(TransportError::BindFailed)?;
    tracing::info!(addr, "status endpoint listening");
    Ok(StatusListener { listener })
}

/// Serves snapshots forever. Each request gets a fresh snapshot taken
/// under the dispatcher lock, serialized after the lock is released.
pub(crate) async fn serve(
    status: StatusListener,
    dispatcher: Arc<Mutex<Dispatcher>>,
) {
    loop {
        let (stream, _) = match status.listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::error!(error = %e, "status accept failed");
                continue;
            }
        };
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            if let Err(e) = respond(stream, dispatcher).await {
                tracing::debug!(error = %e, "status response failed");
            }
        });
    }
}

async fn respond(
    mut stream: TcpStream,
    dispatcher: Arc<Mutex<Dispatcher>>,
) -> std::io::Result<()> {
    // Read and discard whatever request line arrived.
    let mut buf = [0u8; 1024];
    let _ = stream.read(&mut buf).await?;

    let snapshot = dispatcher.lock().await.snapshot();
    let body = match serde_json::to_string_pretty(&snapshot) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "snapshot serialization failed");
            "{}".to_string()
        }
    };

    let response = format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {}",
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
