//! Transport abstraction layer for Wordwire.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract
//! over the two supported byte streams — TCP ([`TcpTransport`]) and a
//! local domain socket ([`UnixTransport`]) — so the server's accept and
//! handler loops are written once.
//!
//! Framing is the codec's problem, not the transport's: every message
//! is a self-delimiting buffer, written in one `send` and surfaced by
//! one `recv`.

#![allow(async_fn_in_trait)]

mod error;
mod tcp;
mod unix;

pub use error::TransportError;
pub use tcp::{TcpConnection, TcpTransport};
pub use unix::{UnixConnection, UnixTransport};

use std::fmt;

/// Opaque identifier for an accepted connection, assigned before the
/// handshake. Distinct from the one-byte player id, which only exists
/// after authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;

    /// Waits for and accepts the next incoming connection.
    fn accept(
        &mut self,
    ) -> impl std::future::Future<Output = Result<Self::Connection, TransportError>>
    + Send;
}

/// A single connection that can send and receive message buffers.
pub trait Connection: Send + Sync + 'static {
    /// Writes one encoded message to the peer.
    fn send(
        &self,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next message buffer from the peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed. A
    /// partially received message at close time is discarded with it.
    fn recv(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>, TransportError>>
    + Send;

    /// Closes the connection.
    fn close(
        &self,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
