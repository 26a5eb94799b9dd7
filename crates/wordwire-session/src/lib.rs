//! Connection lifecycle for Wordwire.
//!
//! This crate handles who is connected and how they got in:
//!
//! 1. **Authentication** — the password handshake seam
//!    ([`Authenticator`], [`SharedPassword`])
//! 2. **Registration** — the id-keyed registry of live connections
//!    ([`ConnectionRegistry`], [`ClientSender`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Dispatcher (above)   ← looks up outbound handles by player id
//!     ↕
//! Session layer (this crate)
//!     ↕
//! Protocol layer (below)  ← provides PlayerId and Message
//! ```

mod auth;
mod error;
mod registry;

pub use auth::{Authenticator, SharedPassword};
pub use error::SessionError;
pub use registry::{ClientSender, ConnectionRegistry};
