//! One room: the state for a single two-player match.

use serde::{Deserialize, Serialize};
use wordwire_protocol::{PlayerId, RoomId, GIVE_UP_SENTINEL};

use crate::RoomError;

// ---------------------------------------------------------------------------
// MatchState
// ---------------------------------------------------------------------------

/// The lifecycle state of a match.
///
/// ```text
/// AwaitingAcceptance ──(accept)──→ Active ──(correct guess)──→ Finished
///         │                          │
///         │ (refuse / disconnect)    │ (give-up sentinel)
///         ▼                          ▼
///     [destroyed]                Abandoned
/// ```
///
/// `Finished` and `Abandoned` are terminal — the registry destroys the
/// room as soon as either is reached. Refusal and disconnects destroy
/// the room without passing through a terminal state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchState {
    /// Challenge relayed to the target; nobody has accepted yet.
    AwaitingAcceptance,
    /// Both sides confirmed; guesses and hints flow.
    Active,
    /// The secret was guessed.
    Finished,
    /// The guesser gave up.
    Abandoned,
}

impl MatchState {
    /// `true` once the match can no longer continue.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Abandoned)
    }
}

impl std::fmt::Display for MatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingAcceptance => write!(f, "AwaitingAcceptance"),
            Self::Active => write!(f, "Active"),
            Self::Finished => write!(f, "Finished"),
            Self::Abandoned => write!(f, "Abandoned"),
        }
    }
}

// ---------------------------------------------------------------------------
// AttemptOutcome
// ---------------------------------------------------------------------------

/// What one registered guess did to the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The guess matched the secret; the match is `Finished`.
    Correct,
    /// The guess was the give-up sentinel; the match is `Abandoned`.
    GaveUp,
    /// Anything else. Carries the updated attempt count for the relay
    /// to the hint-giver.
    Incorrect(u64),
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// Server-side state for one pending or active match.
///
/// The initiator chose the secret and gives hints; the target guesses.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    secret: String,
    initiator: PlayerId,
    target: PlayerId,
    attempts: u64,
    hints: Vec<String>,
    state: MatchState,
}

impl Room {
    /// Creates a room in `AwaitingAcceptance`, seeded with the first
    /// hint from the challenge.
    pub fn new(
        id: RoomId,
        secret: String,
        initiator: PlayerId,
        target: PlayerId,
        first_hint: String,
    ) -> Self {
        Self {
            id,
            secret,
            initiator,
            target,
            attempts: 0,
            hints: vec![first_hint],
            state: MatchState::AwaitingAcceptance,
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    /// The hint-giver.
    pub fn initiator(&self) -> PlayerId {
        self.initiator
    }

    /// The guesser.
    pub fn target(&self) -> PlayerId {
        self.target
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    /// The hint that accompanied the challenge. Every room has one.
    pub fn first_hint(&self) -> &str {
        &self.hints[0]
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    /// `true` if the player is one of the two participants.
    pub fn involves(&self, player: PlayerId) -> bool {
        self.initiator == player || self.target == player
    }

    /// The other participant, if `player` is one of the two.
    pub fn counterpart(&self, player: PlayerId) -> Option<PlayerId> {
        if player == self.initiator {
            Some(self.target)
        } else if player == self.target {
            Some(self.initiator)
        } else {
            None
        }
    }

    /// Confirms the challenge: `AwaitingAcceptance → Active`.
    ///
    /// # Errors
    /// [`RoomError::NotAwaitingAcceptance`] in any other state.
    pub fn accept(&mut self) -> Result<(), RoomError> {
        if self.state != MatchState::AwaitingAcceptance {
            return Err(RoomError::NotAwaitingAcceptance(self.id));
        }
        self.state = MatchState::Active;
        tracing::info!(room_id = %self.id, "match started");
        Ok(())
    }

    /// Registers one guess. Every guess counts against the attempt
    /// counter, the give-up sentinel included.
    ///
    /// # Errors
    /// [`RoomError::NotActive`] unless the match is `Active`.
    pub fn register_attempt(
        &mut self,
        attempt: &str,
    ) -> Result<AttemptOutcome, RoomError> {
        if self.state != MatchState::Active {
            return Err(RoomError::NotActive(self.id));
        }
        self.attempts += 1;

        if attempt == GIVE_UP_SENTINEL {
            self.state = MatchState::Abandoned;
            tracing::info!(room_id = %self.id, "guesser gave up");
            return Ok(AttemptOutcome::GaveUp);
        }
        if attempt == self.secret {
            self.state = MatchState::Finished;
            tracing::info!(
                room_id = %self.id,
                attempts = self.attempts,
                "secret guessed"
            );
            return Ok(AttemptOutcome::Correct);
        }
        Ok(AttemptOutcome::Incorrect(self.attempts))
    }

    /// Appends a hint to the history.
    ///
    /// # Errors
    /// [`RoomError::NotActive`] unless the match is `Active`.
    pub fn add_hint(&mut self, hint: String) -> Result<(), RoomError> {
        if self.state != MatchState::Active {
            return Err(RoomError::NotActive(self.id));
        }
        self.hints.push(hint);
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
