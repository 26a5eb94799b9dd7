//! `WordwireServer` builder and accept loops.
//!
//! This is the entry point for running the relay. It ties together all
//! the layers: transport → protocol → session → rooms, with the
//! dispatcher in the middle.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use wordwire_protocol::WireCodec;
use wordwire_session::Authenticator;
use wordwire_transport::{
    TcpTransport, Transport, UnixTransport,
};

use crate::handler::handle_connection;
use crate::{status, Dispatcher, WordwireError};

/// The password clients must present, unless the builder overrides it.
pub const DEFAULT_PASSWORD: &str = "0123456789Sa!%^-";

/// Shared server state handed to each connection handler task.
pub(crate) struct ServerState<A: Authenticator> {
    /// Both registries, serialized behind one lock.
    pub(crate) dispatcher: Arc<Mutex<Dispatcher>>,
    pub(crate) auth: A,
    pub(crate) codec: WireCodec,
}

/// Builder for configuring and starting a Wordwire server.
///
/// # Example
///
/// ```rust,ignore
/// let server = WordwireServer::builder()
///     .tcp_addr("0.0.0.0:55555")
///     .unix_path("/tmp/wordwire.sock")
///     .build(SharedPassword::new(DEFAULT_PASSWORD))
///     .await?;
/// server.run().await
/// ```
pub struct WordwireServerBuilder {
    tcp_addr: String,
    unix_path: Option<PathBuf>,
    status_addr: Option<String>,
}

impl WordwireServerBuilder {
    /// Creates a builder with the stock addresses: TCP on port 55555,
    /// no Unix socket, no status endpoint.
    pub fn new() -> Self {
        Self {
            tcp_addr: "127.0.0.1:55555".to_string(),
            unix_path: None,
            status_addr: None,
        }
    }

    /// Sets the TCP listen address.
    pub fn tcp_addr(mut self, addr: &str) -> Self {
        self.tcp_addr = addr.to_string();
        self
    }

    /// Also listens on a Unix domain socket at the given path.
    pub fn unix_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.unix_path = Some(path.into());
        self
    }

    /// Also serves the read-only JSON status snapshot at the given
    /// HTTP address.
    pub fn status_addr(mut self, addr: &str) -> Self {
        self.status_addr = Some(addr.to_string());
        self
    }

    /// Binds all configured listeners and assembles the server.
    pub async fn build<A: Authenticator>(
        self,
        auth: A,
    ) -> Result<WordwireServer<A>, WordwireError> {
        let tcp = TcpTransport::bind(&self.tcp_addr).await?;

        let unix = match &self.unix_path {
            Some(path) => Some(UnixTransport::bind(path).await?),
            None => None,
        };

        let status = match &self.status_addr {
            Some(addr) => Some(status::bind(addr).await?),
            None => None,
        };

        let state = Arc::new(ServerState {
            dispatcher: Arc::new(Mutex::new(Dispatcher::new())),
            auth,
            codec: WireCodec::default(),
        });

        Ok(WordwireServer {
            tcp,
            unix,
            status,
            state,
        })
    }
}

impl Default for WordwireServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound, not-yet-running Wordwire server.
pub struct WordwireServer<A: Authenticator> {
    tcp: TcpTransport,
    unix: Option<UnixTransport>,
    status: Option<status::StatusListener>,
    state: Arc<ServerState<A>>,
}

/// Cheap handle for driving the server from outside `run()` — today
/// that means shutdown.
#[derive(Clone)]
pub struct ServerHandle {
    dispatcher: Arc<Mutex<Dispatcher>>,
}

impl ServerHandle {
    /// Broadcasts the shutdown notice and clears both registries.
    /// Every pump task flushes the notice and closes its transport.
    pub async fn shutdown(&self) {
        self.dispatcher.lock().await.shutdown();
    }
}

impl<A: Authenticator> WordwireServer<A> {
    /// Creates a new builder.
    pub fn builder() -> WordwireServerBuilder {
        WordwireServerBuilder::new()
    }

    /// The address the TCP listener actually bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.tcp.local_addr()
    }

    /// The address the status endpoint bound to, if configured.
    pub fn status_addr(&self) -> Option<std::net::SocketAddr> {
        self.status.as_ref().and_then(|s| s.local_addr().ok())
    }

    /// Returns a handle usable after `run()` consumes the server.
    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            dispatcher: Arc::clone(&self.state.dispatcher),
        }
    }

    /// Runs the accept loops until the process is terminated.
    ///
    /// The Unix listener and the status endpoint (when configured) run
    /// as background tasks; the TCP loop runs in place.
    pub async fn run(self) -> Result<(), WordwireError> {
        tracing::info!("Wordwire server running");

        if let Some(listener) = self.status {
            let dispatcher = Arc::clone(&self.state.dispatcher);
            tokio::spawn(status::serve(listener, dispatcher));
        }

        if let Some(unix) = self.unix {
            let state = Arc::clone(&self.state);
            tokio::spawn(accept_loop(unix, state));
        }

        accept_loop(self.tcp, self.state).await;
        Ok(())
    }
}

/// Accepts connections forever, one handler task per connection. A
/// handler failure never touches the listener or other connections.
async fn accept_loop<T, A>(mut transport: T, state: Arc<ServerState<A>>)
where
    T: Transport,
    A: Authenticator,
{
    loop {
        match transport.accept().await {
            Ok(conn) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(conn, state).await {
                        tracing::debug!(
                            error = %e,
                            "connection ended with error"
                        );
                    }
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "accept failed");
            }
        }
    }
}
