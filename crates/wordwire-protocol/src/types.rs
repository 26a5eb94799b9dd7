//! Identity newtypes shared by every layer of the server.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A connected player's id, assigned at handshake time.
///
/// Ids live in `[1, 255]` — the wire encodes them in a single byte and
/// 0 is reserved as "never assigned". The registry enforces the range;
/// the type only guarantees one-byte width.
///
/// `#[serde(transparent)]` keeps the JSON form of a `PlayerId(42)` a
/// plain `42` in the status snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u8);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A room's id, assigned when a challenge is relayed.
///
/// Same one-byte id space as [`PlayerId`], allocated independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u8);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }

    #[test]
    fn test_room_id_display() {
        assert_eq!(RoomId(3).to_string(), "R-3");
    }

    #[test]
    fn test_ids_work_as_map_keys() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(PlayerId(1), "alice");
        map.insert(PlayerId(2), "bob");
        assert_eq!(map[&PlayerId(1)], "alice");
    }
}
