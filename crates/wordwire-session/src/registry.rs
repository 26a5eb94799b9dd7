//! The connection registry: maps live player ids to outbound handles.
//!
//! This is the server's record of who is connected. A connection enters
//! the registry when its handshake succeeds and leaves when its
//! transport closes. The registry also owns id allocation — ids are
//! drawn pseudo-randomly from `[1, 255]`, so a reconnecting client is
//! unlikely to inherit a recently freed id.
//!
//! # Concurrency note
//!
//! `ConnectionRegistry` is not thread-safe by itself — it uses a plain
//! `HashMap`. It is owned by the dispatcher, which lives behind a
//! single async mutex, so every mutation is already serialized there.

use std::collections::HashMap;

use rand::Rng;
use tokio::sync::mpsc;
use wordwire_protocol::{Message, PlayerId};

use crate::SessionError;

/// Outbound handle for one connection: messages pushed here are
/// encoded and written by that connection's pump task. Pushing never
/// blocks, so the registry can be used under a lock.
pub type ClientSender = mpsc::UnboundedSender<Message>;

/// How many ids exist in the one-byte space (0 is never assigned).
const ID_SPACE: usize = u8::MAX as usize;

/// Random draws attempted before falling back to a linear scan. The
/// scan guarantees termination at high occupancy, where random probing
/// degenerates.
const MAX_RANDOM_DRAWS: usize = 64;

/// Maps live player ids to their outbound handles.
pub struct ConnectionRegistry {
    connections: HashMap<PlayerId, ClientSender>,
}

impl ConnectionRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    /// Allocates a fresh id and registers the connection under it.
    ///
    /// # Errors
    /// Returns [`SessionError::CapacityExhausted`] when all 255 ids are
    /// occupied.
    pub fn allocate_and_register(
        &mut self,
        sender: ClientSender,
    ) -> Result<PlayerId, SessionError> {
        let id = self.allocate_id()?;
        self.connections.insert(id, sender);
        tracing::info!(player_id = %id, "connection registered");
        Ok(id)
    }

    /// Looks up the outbound handle for a player.
    pub fn get(&self, id: PlayerId) -> Option<&ClientSender> {
        self.connections.get(&id)
    }

    /// `true` if the player is currently registered.
    pub fn contains(&self, id: PlayerId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Removes a connection, freeing its id for reuse.
    pub fn remove(&mut self, id: PlayerId) -> Option<ClientSender> {
        let removed = self.connections.remove(&id);
        if removed.is_some() {
            tracing::info!(player_id = %id, "connection removed");
        }
        removed
    }

    /// All live player ids, ascending.
    pub fn ids(&self) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> =
            self.connections.keys().copied().collect();
        ids.sort_by_key(|id| id.0);
        ids
    }

    /// Iterates over `(id, sender)` pairs in arbitrary order.
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (PlayerId, &ClientSender)> {
        self.connections.iter().map(|(id, sender)| (*id, sender))
    }

    /// Removes every connection, dropping the senders so the pump
    /// tasks wind down.
    pub fn clear(&mut self) {
        self.connections.clear();
    }

    /// Returns the number of live connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// `true` if no connection is registered.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Draws an unoccupied id from `[1, 255]`.
    ///
    /// Random probing first; once the bounded draws are spent (which
    /// only happens near full occupancy), a linear scan picks the first
    /// free slot so allocation terminates deterministically.
    fn allocate_id(&self) -> Result<PlayerId, SessionError> {
        if self.connections.len() >= ID_SPACE {
            return Err(SessionError::CapacityExhausted);
        }

        let mut rng = rand::rng();
        for _ in 0..MAX_RANDOM_DRAWS {
            let candidate = PlayerId(rng.random_range(1..=u8::MAX));
            if !self.connections.contains_key(&candidate) {
                return Ok(candidate);
            }
        }

        (1..=u8::MAX)
            .map(PlayerId)
            .find(|id| !self.connections.contains_key(id))
            .ok_or(SessionError::CapacityExhausted)
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
