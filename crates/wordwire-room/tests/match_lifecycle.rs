//! Integration tests walking full match lifecycles through the
//! registry, the way the dispatcher drives them.

use wordwire_protocol::{PlayerId, RoomId};
use wordwire_room::{AttemptOutcome, MatchState, RoomError, RoomRegistry};

const INITIATOR: PlayerId = PlayerId(10);
const TARGET: PlayerId = PlayerId(20);

fn challenge(reg: &mut RoomRegistry) -> RoomId {
    reg.create("APPLE".into(), INITIATOR, TARGET, "fruit".into())
        .unwrap()
}

#[test]
fn test_challenge_accept_guess_finish_destroys_room() {
    let mut reg = RoomRegistry::new();

    // Challenge relayed: room exists, pending.
    let id = challenge(&mut reg);
    assert_eq!(reg.find_pending(INITIATOR, TARGET), Some(id));

    // Target accepts: match starts, first hint goes to the guesser.
    let room = reg.get_mut(id).unwrap();
    room.accept().unwrap();
    assert_eq!(room.first_hint(), "fruit");

    // Wrong guesses relay the running count to the hint-giver.
    assert_eq!(
        room.register_attempt("PEAR").unwrap(),
        AttemptOutcome::Incorrect(1)
    );

    // The exact secret finishes the match; the dispatcher then
    // destroys the room.
    assert_eq!(
        room.register_attempt("APPLE").unwrap(),
        AttemptOutcome::Correct
    );
    assert!(room.state().is_terminal());
    reg.remove(id).unwrap();

    // A later message referencing the room finds nothing.
    assert!(reg.get(id).is_none());
    assert!(reg.is_empty());
}

#[test]
fn test_give_up_abandons_and_destroys_room() {
    let mut reg = RoomRegistry::new();
    let id = challenge(&mut reg);
    let room = reg.get_mut(id).unwrap();
    room.accept().unwrap();

    assert_eq!(
        room.register_attempt("<igiveup>").unwrap(),
        AttemptOutcome::GaveUp
    );
    assert_eq!(room.state(), MatchState::Abandoned);
    let room = reg.remove(id).unwrap();
    assert_eq!(room.attempts(), 1);
    assert!(reg.get(id).is_none());
}

#[test]
fn test_refusal_destroys_pending_room() {
    let mut reg = RoomRegistry::new();
    let id = challenge(&mut reg);

    // Refusal: the dispatcher resolves the pending pair and destroys
    // the room without it ever becoming active.
    let pending = reg.find_pending(INITIATOR, TARGET).unwrap();
    let room = reg.remove(pending).unwrap();
    assert_eq!(room.state(), MatchState::AwaitingAcceptance);
    assert_eq!(pending, id);
    assert!(reg.is_empty());
}

#[test]
fn test_disconnect_tears_down_every_room_of_a_player() {
    let mut reg = RoomRegistry::new();
    let a = challenge(&mut reg);
    let b = reg
        .create("PLUM".into(), PlayerId(30), INITIATOR, "also fruit".into())
        .unwrap();
    let unrelated = reg
        .create("WOLF".into(), PlayerId(40), PlayerId(50), "howls".into())
        .unwrap();

    // Initiator drops: both of their rooms go, each surviving
    // counterpart gets notified by the dispatcher.
    let torn_down = reg.rooms_involving(INITIATOR);
    assert_eq!(torn_down, {
        let mut expected = vec![a, b];
        expected.sort_by_key(|id| id.0);
        expected
    });
    for id in torn_down {
        let room = reg.remove(id).unwrap();
        assert!(room.counterpart(INITIATOR).is_some());
    }

    assert!(reg.get(unrelated).is_some());
    assert_eq!(reg.len(), 1);
}

#[test]
fn test_hints_accumulate_while_active_only() {
    let mut reg = RoomRegistry::new();
    let id = challenge(&mut reg);
    let room = reg.get_mut(id).unwrap();

    assert!(matches!(
        room.add_hint("too early".into()),
        Err(RoomError::NotActive(_))
    ));

    room.accept().unwrap();
    room.add_hint("green or red".into()).unwrap();
    room.add_hint("keeps doctors away".into()).unwrap();
    assert_eq!(
        room.hints(),
        &["fruit", "green or red", "keeps doctors away"]
    );
}
