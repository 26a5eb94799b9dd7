//! # Wordwire
//!
//! Relay server for two-player word-guessing matches over a bespoke
//! binary protocol, carried on TCP or a local domain socket.
//!
//! One player challenges another with a secret word and a hint; the
//! server relays guesses one way and hints the other until the secret
//! is guessed, the guesser gives up, someone refuses, or a transport
//! drops. The wire format is a schema-driven binary codec (see
//! `wordwire-protocol`); this crate supplies the server side: the
//! password handshake, the per-connection handlers, and the dispatcher
//! that owns the connection and room registries.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use wordwire::{WordwireServer, DEFAULT_PASSWORD};
//! use wordwire_session::SharedPassword;
//!
//! # async fn run() -> Result<(), wordwire::WordwireError> {
//! let server = WordwireServer::<SharedPassword>::builder()
//!     .tcp_addr("127.0.0.1:55555")
//!     .unix_path("/tmp/wordwire.sock")
//!     .build(SharedPassword::new(DEFAULT_PASSWORD))
//!     .await?;
//! server.run().await
//! # }
//! ```

mod dispatcher;
mod error;
mod handler;
mod server;
mod status;

pub use dispatcher::{Dispatcher, StatusSnapshot};
pub use error::WordwireError;
pub use server::{
    ServerHandle, WordwireServer, WordwireServerBuilder, DEFAULT_PASSWORD,
};
