//! Authentication hook for the handshake.
//!
//! The handshake only needs one question answered: "is this password
//! good?" The [`Authenticator`] trait keeps that question behind a
//! seam so tests can plug in their own answer and a deployment could
//! swap the shared secret for something stronger without touching the
//! handler.

use crate::SessionError;

/// Validates the password presented during the handshake.
pub trait Authenticator: Send + Sync + 'static {
    /// Checks the supplied password.
    ///
    /// # Errors
    /// [`SessionError::IncorrectPassword`] when the password does not
    /// match.
    fn verify(&self, supplied: &str) -> Result<(), SessionError>;
}

/// The stock authenticator: a single shared static password.
///
/// This is deliberately weak — the protocol's authentication is a
/// shared secret, nothing more.
pub struct SharedPassword {
    password: String,
}

impl SharedPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }
}

impl Authenticator for SharedPassword {
    fn verify(&self, supplied: &str) -> Result<(), SessionError> {
        if supplied == self.password {
            Ok(())
        } else {
            Err(SessionError::IncorrectPassword)
        }
    }
}
