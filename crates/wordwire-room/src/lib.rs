//! Room lifecycle management for Wordwire.
//!
//! A room is the server-side state of one two-player word-guessing
//! match: the secret, the two participants, the attempt counter, and
//! the hint history, plus the state machine that gates what each side
//! may do when.
//!
//! # Key types
//!
//! - [`Room`] — one match and its state transitions
//! - [`MatchState`] — `AwaitingAcceptance → Active → {Finished, Abandoned}`
//! - [`AttemptOutcome`] — what one guess did to the match
//! - [`RoomRegistry`] — creates/destroys rooms, owns room id allocation
//! - [`RoomSummary`] — one row of the status snapshot

mod error;
mod manager;
mod room;

pub use error::RoomError;
pub use manager::{RoomRegistry, RoomSummary};
pub use room::{AttemptOutcome, MatchState, Room};
