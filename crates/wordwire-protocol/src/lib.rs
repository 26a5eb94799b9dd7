//! Wire protocol for Wordwire.
//!
//! This crate defines the "language" that clients and the relay server
//! speak:
//!
//! - **Schema** ([`Schema`], [`WIRE_SCHEMA`]) — the ordered catalogue
//!   of declared fields, their categories, and byte widths.
//! - **Codec** ([`WireCodec`]) — the schema-driven binary
//!   encoder/decoder, presence bitmask and all.
//! - **Records and messages** ([`Fields`], [`Message`]) — the flat wire
//!   record and the tagged view keyed by message code.
//! - **Errors** ([`ProtocolError`]) — truncation, illegal lengths, and
//!   code/field violations.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw buffers) and the
//! dispatcher (game semantics). It knows nothing about connections or
//! rooms — only how bytes become messages and back.
//!
//! ```text
//! Transport (bytes) → Protocol (Message) → Dispatcher (registries, rooms)
//! ```

mod codec;
mod error;
mod fields;
mod message;
mod schema;
mod types;

pub use codec::WireCodec;
pub use error::ProtocolError;
pub use fields::Fields;
pub use message::{code, Message, GIVE_UP_SENTINEL};
pub use schema::{FieldId, Schema, WIRE_SCHEMA};
pub use types::{PlayerId, RoomId};
