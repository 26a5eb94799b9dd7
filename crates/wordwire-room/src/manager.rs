//! Room registry: creates, tracks, and destroys rooms.

use std::collections::HashMap;

use rand::Rng;
use serde::Serialize;
use wordwire_protocol::{PlayerId, RoomId};

use crate::{MatchState, Room, RoomError};

/// How many ids exist in the one-byte space (0 is never assigned).
const ID_SPACE: usize = u8::MAX as usize;

/// Random draws attempted before the deterministic linear-scan
/// fallback kicks in.
const MAX_RANDOM_DRAWS: usize = 64;

/// Owns every live room, keyed by room id.
///
/// Like the connection registry, this is plain single-owner state: the
/// dispatcher holds it behind its mutex, so no internal locking.
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
}

/// One room's row in the status snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub initiator: PlayerId,
    pub target: PlayerId,
    pub state: MatchState,
    pub secret: String,
    pub attempts: u64,
    pub hints: Vec<String>,
}

impl RoomRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
        }
    }

    /// Creates a room in `AwaitingAcceptance` and returns its id.
    ///
    /// # Errors
    /// [`RoomError::CapacityExhausted`] when all 255 room ids are live.
    pub fn create(
        &mut self,
        secret: String,
        initiator: PlayerId,
        target: PlayerId,
        first_hint: String,
    ) -> Result<RoomId, RoomError> {
        let id = self.allocate_id()?;
        let room = Room::new(id, secret, initiator, target, first_hint);
        self.rooms.insert(id, room);
        tracing::info!(
            room_id = %id,
            %initiator,
            %target,
            "room created, awaiting acceptance"
        );
        Ok(id)
    }

    pub fn get(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    pub fn get_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(&id)
    }

    /// Destroys a room, returning its final state.
    pub fn remove(&mut self, id: RoomId) -> Option<Room> {
        let removed = self.rooms.remove(&id);
        if removed.is_some() {
            tracing::info!(room_id = %id, "room destroyed");
        }
        removed
    }

    /// Finds the pending (`AwaitingAcceptance`) room for an
    /// initiator/target pair.
    ///
    /// Nothing prevents two pending rooms for the same pair; when that
    /// happens the lowest room id wins, deterministically.
    pub fn find_pending(
        &self,
        initiator: PlayerId,
        target: PlayerId,
    ) -> Option<RoomId> {
        self.rooms
            .values()
            .filter(|room| {
                room.state() == MatchState::AwaitingAcceptance
                    && room.initiator() == initiator
                    && room.target() == target
            })
            .map(Room::id)
            .min_by_key(|id| id.0)
    }

    /// Every room the player participates in, pending or active.
    pub fn rooms_involving(&self, player: PlayerId) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self
            .rooms
            .values()
            .filter(|room| room.involves(player))
            .map(Room::id)
            .collect();
        ids.sort_by_key(|id| id.0);
        ids
    }

    /// Ids of every player currently tied up in a room (either side,
    /// any state). These players are excluded from the challengeable
    /// list.
    pub fn occupied_players(&self) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self
            .rooms
            .values()
            .flat_map(|room| [room.initiator(), room.target()])
            .collect();
        ids.sort_by_key(|id| id.0);
        ids.dedup();
        ids
    }

    /// Snapshot rows for the status endpoint, ascending by room id.
    pub fn summaries(&self) -> Vec<RoomSummary> {
        let mut rows: Vec<RoomSummary> = self
            .rooms
            .values()
            .map(|room| RoomSummary {
                room_id: room.id(),
                initiator: room.initiator(),
                target: room.target(),
                state: room.state(),
                secret: room.secret().to_owned(),
                attempts: room.attempts(),
                hints: room.hints().to_vec(),
            })
            .collect();
        rows.sort_by_key(|row| row.room_id.0);
        rows
    }

    /// Returns the number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// `true` if no room is live.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Destroys every room (server shutdown).
    pub fn clear(&mut self) {
        self.rooms.clear();
    }

    /// Draws an unoccupied id from `[1, 255]`, same scheme as the
    /// connection registry: bounded random probing, then a linear scan
    /// so allocation terminates at high occupancy.
    fn allocate_id(&self) -> Result<RoomId, RoomError> {
        if self.rooms.len() >= ID_SPACE {
            return Err(RoomError::CapacityExhausted);
        }

        let mut rng = rand::rng();
        for _ in 0..MAX_RANDOM_DRAWS {
            let candidate = RoomId(rng.random_range(1..=u8::MAX));
            if !self.rooms.contains_key(&candidate) {
                return Ok(candidate);
            }
        }

        (1..=u8::MAX)
            .map(RoomId)
            .find(|id| !self.rooms.contains_key(id))
            .ok_or(RoomError::CapacityExhausted)
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create(
        reg: &mut RoomRegistry,
        initiator: u8,
        target: u8,
    ) -> RoomId {
        reg.create(
            "APPLE".into(),
            PlayerId(initiator),
            PlayerId(target),
            "fruit".into(),
        )
        .unwrap()
    }

    #[test]
    fn test_create_yields_id_in_range_and_pending_state() {
        let mut reg = RoomRegistry::new();
        let id = create(&mut reg, 1, 2);
        assert!(id.0 >= 1);
        let room = reg.get(id).unwrap();
        assert_eq!(room.state(), MatchState::AwaitingAcceptance);
        assert_eq!(room.first_hint(), "fruit");
    }

    #[test]
    fn test_create_yields_distinct_ids() {
        let mut reg = RoomRegistry::new();
        let a = create(&mut reg, 1, 2);
        let b = create(&mut reg, 3, 4);
        assert_ne!(a, b);
    }

    #[test]
    fn test_create_at_capacity_reports_exhaustion() {
        let mut reg = RoomRegistry::new();
        for _ in 0..255 {
            create(&mut reg, 1, 2);
        }
        let result = reg.create(
            "APPLE".into(),
            PlayerId(1),
            PlayerId(2),
            "fruit".into(),
        );
        assert!(matches!(result, Err(RoomError::CapacityExhausted)));
    }

    #[test]
    fn test_remove_frees_the_room() {
        let mut reg = RoomRegistry::new();
        let id = create(&mut reg, 1, 2);
        assert!(reg.remove(id).is_some());
        assert!(reg.get(id).is_none());
        assert!(reg.remove(id).is_none());
    }

    #[test]
    fn test_find_pending_matches_the_pair_in_order() {
        let mut reg = RoomRegistry::new();
        let id = create(&mut reg, 1, 2);
        assert_eq!(reg.find_pending(PlayerId(1), PlayerId(2)), Some(id));
        // The pair is directional: target cannot be looked up as
        // initiator.
        assert_eq!(reg.find_pending(PlayerId(2), PlayerId(1)), None);
        assert_eq!(reg.find_pending(PlayerId(1), PlayerId(9)), None);
    }

    #[test]
    fn test_find_pending_ignores_active_rooms() {
        let mut reg = RoomRegistry::new();
        let id = create(&mut reg, 1, 2);
        reg.get_mut(id).unwrap().accept().unwrap();
        assert_eq!(reg.find_pending(PlayerId(1), PlayerId(2)), None);
    }

    #[test]
    fn test_find_pending_duplicate_pair_picks_lowest_id() {
        let mut reg = RoomRegistry::new();
        let a = create(&mut reg, 1, 2);
        let b = create(&mut reg, 1, 2);
        let lowest = if a.0 < b.0 { a } else { b };
        assert_eq!(
            reg.find_pending(PlayerId(1), PlayerId(2)),
            Some(lowest)
        );
    }

    #[test]
    fn test_rooms_involving_covers_both_sides() {
        let mut reg = RoomRegistry::new();
        let a = create(&mut reg, 1, 2);
        let b = create(&mut reg, 3, 1);
        create(&mut reg, 4, 5);

        let rooms = reg.rooms_involving(PlayerId(1));
        assert_eq!(rooms.len(), 2);
        assert!(rooms.contains(&a));
        assert!(rooms.contains(&b));
    }

    #[test]
    fn test_occupied_players_deduplicates() {
        let mut reg = RoomRegistry::new();
        create(&mut reg, 1, 2);
        create(&mut reg, 1, 3);
        assert_eq!(
            reg.occupied_players(),
            vec![PlayerId(1), PlayerId(2), PlayerId(3)]
        );
    }

    #[test]
    fn test_summaries_reflect_room_state() {
        let mut reg = RoomRegistry::new();
        let id = create(&mut reg, 1, 2);
        let room = reg.get_mut(id).unwrap();
        room.accept().unwrap();
        room.register_attempt("PEAR").unwrap();

        let rows = reg.summaries();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].room_id, id);
        assert_eq!(rows[0].state, MatchState::Active);
        assert_eq!(rows[0].secret, "APPLE");
        assert_eq!(rows[0].attempts, 1);
        assert_eq!(rows[0].hints, vec!["fruit".to_string()]);
    }
}
