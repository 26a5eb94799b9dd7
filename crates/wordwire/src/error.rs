//! Unified error type for the Wordwire server.

use wordwire_protocol::ProtocolError;
use wordwire_room::RoomError;
use wordwire_session::SessionError;
use wordwire_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From`
/// impls, so `?` converts sub-crate errors on the way up.
#[derive(Debug, thiserror::Error)]
pub enum WordwireError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, illegal record).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (handshake, id allocation).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (missing room, bad state, id allocation).
    #[error(transparent)]
    Room(#[from] RoomError),
}
