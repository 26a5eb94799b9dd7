//! Error types for the session layer.

/// Errors that can occur during handshake and connection registration.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The supplied password does not match the server's.
    /// The connection stays open and may retry the handshake.
    #[error("incorrect password")]
    IncorrectPassword,

    /// The first message skipped the authentication exchange entirely.
    /// The connection is terminated.
    #[error("connection is not authenticated")]
    Unauthorized,

    /// All 255 connection ids are in use.
    #[error("connection id space exhausted (255 live connections)")]
    CapacityExhausted,
}
