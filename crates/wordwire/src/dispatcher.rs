//! The protocol dispatcher: the server-side state machine.
//!
//! Every decoded client message lands here, serialized through one
//! async mutex, so the two registries mutate atomically per message —
//! the multi-task equivalent of the single-threaded event loop this
//! protocol was designed around.
//!
//! The contract for bad input is uniform: a message that references a
//! missing room, arrives in the wrong match state, or comes from the
//! wrong participant is answered with a generic error notice and
//! otherwise ignored. Nothing a client sends can corrupt registry
//! state or take down another connection.

use serde::Serialize;
use wordwire_protocol::{Message, PlayerId, RoomId};
use wordwire_room::{AttemptOutcome, RoomRegistry, RoomSummary};
use wordwire_session::{ClientSender, ConnectionRegistry, SessionError};

/// Owns both registries. Lives behind `Mutex<Dispatcher>` in the
/// server state; handlers lock, mutate, and release without awaiting
/// any I/O in between.
pub struct Dispatcher {
    connections: ConnectionRegistry,
    rooms: RoomRegistry,
}

/// Read-only view served by the status endpoint.
#[derive(Debug, Serialize)]
pub struct StatusSnapshot {
    /// Number of authenticated connections.
    pub connections: usize,
    /// Every live room, pending and active.
    pub rooms: Vec<RoomSummary>,
}

impl Dispatcher {
    /// Creates a dispatcher with empty registries.
    pub fn new() -> Self {
        Self {
            connections: ConnectionRegistry::new(),
            rooms: RoomRegistry::new(),
        }
    }

    /// Registers a freshly authenticated connection and assigns its id.
    ///
    /// # Errors
    /// [`SessionError::CapacityExhausted`] when all 255 ids are taken.
    pub fn register(
        &mut self,
        sender: ClientSender,
    ) -> Result<PlayerId, SessionError> {
        self.connections.allocate_and_register(sender)
    }

    /// Read access to the room registry (status page, tests).
    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    /// Read access to the connection registry.
    pub fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }

    /// Snapshot for the status endpoint.
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            connections: self.connections.len(),
            rooms: self.rooms.summaries(),
        }
    }

    /// Processes one decoded message from an authenticated sender.
    ///
    /// Where a message carries the sender's own id (challenge, accept,
    /// refuse), the authenticated registry id wins over the wire field
    /// — a client cannot act as someone else.
    pub fn handle_message(&mut self, sender: PlayerId, message: Message) {
        tracing::debug!(
            player_id = %sender,
            code = message.code(),
            "handling message"
        );
        match message {
            Message::PlayerListRequest { .. } => {
                self.handle_player_list(sender);
            }
            Message::Challenge {
                target,
                secret,
                hint,
                ..
            } => self.handle_challenge(sender, target, secret, hint),
            Message::AcceptChallenge { initiator, .. } => {
                self.handle_accept(sender, initiator);
            }
            Message::RefuseChallenge { initiator, .. } => {
                self.handle_refuse(sender, initiator);
            }
            Message::Attempt { room_id, attempt } => {
                self.handle_attempt(sender, room_id, attempt);
            }
            Message::HintSubmit { room_id, hint } => {
                self.handle_hint(sender, room_id, hint);
            }
            other => {
                tracing::debug!(
                    player_id = %sender,
                    code = other.code(),
                    "unexpected message code from client"
                );
                self.send_to(sender, Message::GenericError);
            }
        }
    }

    /// Tears down everything a closed connection leaves behind: the
    /// registry entry and every room it participated in, with the
    /// surviving counterpart notified per room.
    pub fn handle_disconnect(&mut self, player: PlayerId) {
        if self.connections.remove(player).is_none() {
            return;
        }
        tracing::info!(player_id = %player, "client disconnected");

        for room_id in self.rooms.rooms_involving(player) {
            if let Some(room) = self.rooms.remove(room_id) {
                if let Some(other) = room.counterpart(player) {
                    self.send_to(other, Message::PeerDisconnected);
                }
            }
        }
    }

    /// Broadcasts the shutdown notice and clears both registries.
    /// Dropping the senders ends every pump task, which closes the
    /// transports after the notice is flushed.
    pub fn shutdown(&mut self) {
        tracing::info!(
            connections = self.connections.len(),
            rooms = self.rooms.len(),
            "server shutting down"
        );
        for (_, sender) in self.connections.iter() {
            let _ = sender.send(Message::ShuttingDown);
        }
        self.rooms.clear();
        self.connections.clear();
    }

    // -----------------------------------------------------------------
    // Per-code handlers
    // -----------------------------------------------------------------

    fn handle_player_list(&mut self, sender: PlayerId) {
        let occupied = self.rooms.occupied_players();
        let ids = self
            .connections
            .ids()
            .into_iter()
            .filter(|id| *id != sender && !occupied.contains(id))
            .collect();
        self.send_to(sender, Message::PlayerList { ids });
    }

    fn handle_challenge(
        &mut self,
        sender: PlayerId,
        target: PlayerId,
        secret: String,
        hint: String,
    ) {
        if target == sender || !self.connections.contains(target) {
            tracing::debug!(
                player_id = %sender,
                %target,
                "challenge target unavailable"
            );
            self.send_to(sender, Message::GenericError);
            return;
        }

        match self.rooms.create(secret, sender, target, hint) {
            Ok(room_id) => {
                tracing::info!(
                    initiator = %sender,
                    %target,
                    %room_id,
                    "challenge relayed"
                );
                self.send_to(
                    target,
                    Message::ChallengeNotice {
                        target,
                        initiator: sender,
                    },
                );
            }
            Err(e) => {
                tracing::warn!(
                    player_id = %sender,
                    error = %e,
                    "challenge rejected"
                );
                self.send_to(sender, Message::GenericError);
            }
        }
    }

    fn handle_accept(&mut self, sender: PlayerId, initiator: PlayerId) {
        let Some(room_id) = self.rooms.find_pending(initiator, sender)
        else {
            tracing::debug!(
                player_id = %sender,
                %initiator,
                "accept without a pending challenge"
            );
            self.send_to(sender, Message::GenericError);
            return;
        };

        // The initiator may have vanished between challenge and accept.
        // A room referencing a dead connection is invalid: tear it down
        // and tell the survivor.
        if !self.connections.contains(initiator) {
            self.rooms.remove(room_id);
            self.send_to(sender, Message::PeerDisconnected);
            return;
        }

        let first_hint = {
            let Some(room) = self.rooms.get_mut(room_id) else {
                return;
            };
            if room.accept().is_err() {
                self.send_to(sender, Message::GenericError);
                return;
            }
            room.first_hint().to_owned()
        };

        // Both sides learn the match is starting; only the guesser
        // gets the first hint.
        self.send_to(
            sender,
            Message::MatchStarting {
                room_id,
                hint: Some(first_hint),
            },
        );
        self.send_to(
            initiator,
            Message::MatchStarting {
                room_id,
                hint: None,
            },
        );
    }

    fn handle_refuse(&mut self, sender: PlayerId, initiator: PlayerId) {
        let Some(room_id) = self.rooms.find_pending(initiator, sender)
        else {
            self.send_to(sender, Message::GenericError);
            return;
        };

        self.rooms.remove(room_id);
        tracing::info!(
            player_id = %sender,
            %initiator,
            %room_id,
            "challenge refused"
        );
        self.send_to(initiator, Message::ChallengeRefused);
    }

    fn handle_attempt(
        &mut self,
        sender: PlayerId,
        room_id: RoomId,
        attempt: String,
    ) {
        let Some(room) = self.rooms.get(room_id) else {
            self.send_to(sender, Message::GenericError);
            return;
        };
        if room.target() != sender {
            tracing::debug!(
                player_id = %sender,
                %room_id,
                "attempt from a non-guesser"
            );
            self.send_to(sender, Message::GenericError);
            return;
        }
        let initiator = room.initiator();

        if !self.connections.contains(initiator) {
            self.rooms.remove(room_id);
            self.send_to(sender, Message::PeerDisconnected);
            return;
        }

        let outcome = {
            let Some(room) = self.rooms.get_mut(room_id) else {
                return;
            };
            room.register_attempt(&attempt)
        };

        match outcome {
            Ok(AttemptOutcome::Correct) => {
                self.end_match(room_id, Message::MatchFinished);
            }
            Ok(AttemptOutcome::GaveUp) => {
                self.end_match(room_id, Message::MatchAbandoned);
            }
            Ok(AttemptOutcome::Incorrect(attempt_count)) => {
                self.send_to(
                    initiator,
                    Message::AttemptRelay {
                        attempt,
                        attempt_count,
                    },
                );
            }
            Err(e) => {
                tracing::debug!(
                    player_id = %sender,
                    %room_id,
                    error = %e,
                    "attempt rejected"
                );
                self.send_to(sender, Message::GenericError);
            }
        }
    }

    fn handle_hint(
        &mut self,
        sender: PlayerId,
        room_id: RoomId,
        hint: String,
    ) {
        let Some(room) = self.rooms.get(room_id) else {
            self.send_to(sender, Message::GenericError);
            return;
        };
        if room.initiator() != sender {
            tracing::debug!(
                player_id = %sender,
                %room_id,
                "hint from a non-initiator"
            );
            self.send_to(sender, Message::GenericError);
            return;
        }
        let target = room.target();

        if !self.connections.contains(target) {
            self.rooms.remove(room_id);
            self.send_to(sender, Message::PeerDisconnected);
            return;
        }

        let result = {
            let Some(room) = self.rooms.get_mut(room_id) else {
                return;
            };
            room.add_hint(hint.clone())
        };

        match result {
            Ok(()) => self.send_to(target, Message::HintRelay { hint }),
            Err(e) => {
                tracing::debug!(
                    player_id = %sender,
                    %room_id,
                    error = %e,
                    "hint rejected"
                );
                self.send_to(sender, Message::GenericError);
            }
        }
    }

    /// Destroys the room and sends both participants the closing
    /// notice (match finished or abandoned).
    fn end_match(&mut self, room_id: RoomId, notice: Message) {
        if let Some(room) = self.rooms.remove(room_id) {
            self.send_to(room.initiator(), notice.clone());
            self.send_to(room.target(), notice);
        }
    }

    /// Pushes a message onto a player's outbound channel. Silently
    /// drops it if the player is gone — their pump task is dead and
    /// the disconnect path is already tearing them down.
    fn send_to(&self, player: PlayerId, message: Message) {
        if let Some(sender) = self.connections.get(player) {
            let _ = sender.send(message);
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
