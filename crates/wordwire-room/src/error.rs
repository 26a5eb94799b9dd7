//! Error types for the room layer.

use wordwire_protocol::RoomId;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist (never created, or already destroyed).
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The operation needs a pending room, but this one already left
    /// `AwaitingAcceptance`.
    #[error("room {0} is no longer awaiting acceptance")]
    NotAwaitingAcceptance(RoomId),

    /// The operation needs an `Active` room (guesses and hints only
    /// flow once the match has started).
    #[error("room {0} is not active")]
    NotActive(RoomId),

    /// All 255 room ids are in use.
    #[error("room id space exhausted (255 live rooms)")]
    CapacityExhausted,
}
