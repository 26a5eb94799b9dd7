//! The typed message catalogue: one variant per legal wire shape.
//!
//! The wire itself carries a flat [`Fields`] record; which field
//! combinations are legal is defined here, keyed by the `code` field.
//! Codes 10, 16, and 17 are used in both directions with different
//! field sets, so they map to two variants each and
//! [`Message::from_fields`] disambiguates by which fields are present.

use crate::{Fields, PlayerId, ProtocolError, RoomId};

/// The literal attempt a guesser sends to abandon a match.
pub const GIVE_UP_SENTINEL: &str = "<igiveup>";

/// Wire message codes. Kept together so the catalogue below and the
/// dispatcher agree on one set of numbers.
pub mod code {
    pub const AUTH: u64 = 10;
    pub const AUTH_OK: u64 = 1;
    pub const GENERIC_ERROR: u64 = 20;
    pub const UNAUTHORIZED: u64 = 21;
    pub const INCORRECT_PASSWORD: u64 = 22;
    pub const SHUTTING_DOWN: u64 = 30;
    pub const PLAYER_LIST_REQUEST: u64 = 11;
    pub const PLAYER_LIST: u64 = 19;
    pub const CHALLENGE: u64 = 12;
    pub const CHALLENGE_NOTICE: u64 = 13;
    pub const ACCEPT_CHALLENGE: u64 = 14;
    pub const MATCH_STARTING: u64 = 15;
    pub const REFUSE_CHALLENGE: u64 = 23;
    pub const CHALLENGE_REFUSED: u64 = 25;
    pub const PEER_DISCONNECTED: u64 = 24;
    pub const ATTEMPT: u64 = 16;
    pub const MATCH_FINISHED: u64 = 3;
    pub const MATCH_ABANDONED: u64 = 18;
    pub const HINT: u64 = 17;
}

/// A decoded protocol message.
///
/// Each variant declares exactly the fields its code legalizes —
/// nothing optional except where the wire itself is (the first hint on
/// a match-starting notice goes to the guesser only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Code 10, server → client: authentication required.
    AuthChallenge,
    /// Code 10, client → server: password response.
    AuthResponse { password: String },
    /// Code 1: authentication succeeded; here is your id.
    AuthOk { id: PlayerId },
    /// Code 20: generic error notice.
    GenericError,
    /// Code 21: unauthorized, connection closing.
    Unauthorized,
    /// Code 22: incorrect password.
    IncorrectPassword,
    /// Code 30: server shutting down.
    ShuttingDown,
    /// Code 11: request the list of challengeable players.
    PlayerListRequest { id: PlayerId },
    /// Code 19: the player list.
    PlayerList { ids: Vec<PlayerId> },
    /// Code 12: issue a challenge with a secret and first hint.
    Challenge {
        initiator: PlayerId,
        target: PlayerId,
        secret: String,
        hint: String,
    },
    /// Code 13: a challenge notice relayed to the target.
    ChallengeNotice {
        target: PlayerId,
        initiator: PlayerId,
    },
    /// Code 14: the target accepts a pending challenge.
    AcceptChallenge {
        initiator: PlayerId,
        target: PlayerId,
    },
    /// Code 15: the match is starting. The guesser's copy carries the
    /// first hint; the hint-giver's does not.
    MatchStarting {
        room_id: RoomId,
        hint: Option<String>,
    },
    /// Code 23: the target refuses a pending challenge.
    RefuseChallenge {
        initiator: PlayerId,
        target: PlayerId,
    },
    /// Code 25: the challenge was refused.
    ChallengeRefused,
    /// Code 24: the counterpart disconnected.
    PeerDisconnected,
    /// Code 16, client → server: a guess for the room's secret.
    Attempt { room_id: RoomId, attempt: String },
    /// Code 16, server → client: an incorrect guess relayed to the
    /// hint-giver, with the running attempt count.
    AttemptRelay {
        attempt: String,
        attempt_count: u64,
    },
    /// Code 3: the secret was guessed; match finished.
    MatchFinished,
    /// Code 18: the guesser gave up; match abandoned.
    MatchAbandoned,
    /// Code 17, client → server: an additional hint for the guesser.
    HintSubmit { room_id: RoomId, hint: String },
    /// Code 17, server → client: a hint relayed to the guesser.
    HintRelay { hint: String },
}

impl Message {
    /// The wire code this message encodes as.
    pub fn code(&self) -> u64 {
        match self {
            Self::AuthChallenge | Self::AuthResponse { .. } => code::AUTH,
            Self::AuthOk { .. } => code::AUTH_OK,
            Self::GenericError => code::GENERIC_ERROR,
            Self::Unauthorized => code::UNAUTHORIZED,
            Self::IncorrectPassword => code::INCORRECT_PASSWORD,
            Self::ShuttingDown => code::SHUTTING_DOWN,
            Self::PlayerListRequest { .. } => code::PLAYER_LIST_REQUEST,
            Self::PlayerList { .. } => code::PLAYER_LIST,
            Self::Challenge { .. } => code::CHALLENGE,
            Self::ChallengeNotice { .. } => code::CHALLENGE_NOTICE,
            Self::AcceptChallenge { .. } => code::ACCEPT_CHALLENGE,
            Self::MatchStarting { .. } => code::MATCH_STARTING,
            Self::RefuseChallenge { .. } => code::REFUSE_CHALLENGE,
            Self::ChallengeRefused => code::CHALLENGE_REFUSED,
            Self::PeerDisconnected => code::PEER_DISCONNECTED,
            Self::Attempt { .. } | Self::AttemptRelay { .. } => {
                code::ATTEMPT
            }
            Self::MatchFinished => code::MATCH_FINISHED,
            Self::MatchAbandoned => code::MATCH_ABANDONED,
            Self::HintSubmit { .. } | Self::HintRelay { .. } => code::HINT,
        }
    }

    /// Flattens this message into its wire record.
    pub fn to_fields(&self) -> Fields {
        let mut f = Fields {
            code: Some(self.code()),
            ..Fields::default()
        };
        match self {
            Self::AuthChallenge
            | Self::GenericError
            | Self::Unauthorized
            | Self::IncorrectPassword
            | Self::ShuttingDown
            | Self::ChallengeRefused
            | Self::PeerDisconnected
            | Self::MatchFinished
            | Self::MatchAbandoned => {}
            Self::AuthResponse { password } => {
                f.password = Some(password.clone());
            }
            Self::AuthOk { id } => {
                f.id = Some(u64::from(id.0));
            }
            Self::PlayerListRequest { id } => {
                f.id = Some(u64::from(id.0));
            }
            Self::PlayerList { ids } => {
                f.id_list = Some(ids.iter().map(|id| id.0).collect());
            }
            Self::Challenge {
                initiator,
                target,
                secret,
                hint,
            } => {
                f.id = Some(u64::from(initiator.0));
                f.id_list = Some(vec![target.0]);
                f.secret = Some(secret.clone());
                f.hint = Some(hint.clone());
            }
            Self::ChallengeNotice { target, initiator } => {
                f.id = Some(u64::from(target.0));
                f.id_list = Some(vec![initiator.0]);
            }
            Self::AcceptChallenge { initiator, target }
            | Self::RefuseChallenge { initiator, target } => {
                f.id = Some(u64::from(target.0));
                f.id_list = Some(vec![initiator.0]);
            }
            Self::MatchStarting { room_id, hint } => {
                f.room_id = Some(u64::from(room_id.0));
                f.hint = hint.clone();
            }
            Self::Attempt { room_id, attempt } => {
                f.room_id = Some(u64::from(room_id.0));
                f.attempt = Some(attempt.clone());
            }
            Self::AttemptRelay {
                attempt,
                attempt_count,
            } => {
                f.attempt = Some(attempt.clone());
                f.attempt_count = Some(*attempt_count);
            }
            Self::HintSubmit { room_id, hint } => {
                f.room_id = Some(u64::from(room_id.0));
                f.hint = Some(hint.clone());
            }
            Self::HintRelay { hint } => {
                f.hint = Some(hint.clone());
            }
        }
        f
    }

    /// Interprets a wire record as a typed message.
    ///
    /// # Errors
    /// - [`ProtocolError::MissingCode`] — no `code` field
    /// - [`ProtocolError::UnknownCode`] — code outside the catalogue
    /// - [`ProtocolError::MissingField`] — a field the code requires is
    ///   absent (an empty `idList` counts as absent where one entry is
    ///   required)
    /// - [`ProtocolError::ValueOutOfRange`] — an id of 0 or above 255
    pub fn from_fields(fields: Fields) -> Result<Self, ProtocolError> {
        let raw_code = fields.code.ok_or(ProtocolError::MissingCode)?;
        let msg = match raw_code {
            code::AUTH => match fields.password {
                Some(password) => Self::AuthResponse { password },
                None => Self::AuthChallenge,
            },
            code::AUTH_OK => Self::AuthOk {
                id: PlayerId(require_u8(fields.id, raw_code, "id")?),
            },
            code::GENERIC_ERROR => Self::GenericError,
            code::UNAUTHORIZED => Self::Unauthorized,
            code::INCORRECT_PASSWORD => Self::IncorrectPassword,
            code::SHUTTING_DOWN => Self::ShuttingDown,
            code::PLAYER_LIST_REQUEST => Self::PlayerListRequest {
                id: PlayerId(require_u8(fields.id, raw_code, "id")?),
            },
            code::PLAYER_LIST => Self::PlayerList {
                ids: fields
                    .id_list
                    .ok_or(missing(raw_code, "idList"))?
                    .into_iter()
                    .map(PlayerId)
                    .collect(),
            },
            code::CHALLENGE => Self::Challenge {
                initiator: PlayerId(require_u8(fields.id, raw_code, "id")?),
                target: first_of_list(&fields.id_list, raw_code)?,
                secret: fields.secret.ok_or(missing(raw_code, "secret"))?,
                hint: fields.hint.ok_or(missing(raw_code, "hint"))?,
            },
            code::CHALLENGE_NOTICE => Self::ChallengeNotice {
                target: PlayerId(require_u8(fields.id, raw_code, "id")?),
                initiator: first_of_list(&fields.id_list, raw_code)?,
            },
            code::ACCEPT_CHALLENGE => Self::AcceptChallenge {
                initiator: first_of_list(&fields.id_list, raw_code)?,
                target: PlayerId(require_u8(fields.id, raw_code, "id")?),
            },
            code::MATCH_STARTING => Self::MatchStarting {
                room_id: RoomId(require_u8(
                    fields.room_id,
                    raw_code,
                    "roomId",
                )?),
                hint: fields.hint,
            },
            code::REFUSE_CHALLENGE => Self::RefuseChallenge {
                initiator: first_of_list(&fields.id_list, raw_code)?,
                target: PlayerId(require_u8(fields.id, raw_code, "id")?),
            },
            code::CHALLENGE_REFUSED => Self::ChallengeRefused,
            code::PEER_DISCONNECTED => Self::PeerDisconnected,
            code::ATTEMPT => match fields.attempt_count {
                Some(attempt_count) => Self::AttemptRelay {
                    attempt: fields
                        .attempt
                        .ok_or(missing(raw_code, "attempt"))?,
                    attempt_count,
                },
                None => Self::Attempt {
                    room_id: RoomId(require_u8(
                        fields.room_id,
                        raw_code,
                        "roomId",
                    )?),
                    attempt: fields
                        .attempt
                        .ok_or(missing(raw_code, "attempt"))?,
                },
            },
            code::MATCH_FINISHED => Self::MatchFinished,
            code::MATCH_ABANDONED => Self::MatchAbandoned,
            code::HINT => {
                let hint =
                    fields.hint.ok_or(missing(raw_code, "hint"))?;
                match fields.room_id {
                    Some(_) => Self::HintSubmit {
                        room_id: RoomId(require_u8(
                            fields.room_id,
                            raw_code,
                            "roomId",
                        )?),
                        hint,
                    },
                    None => Self::HintRelay { hint },
                }
            }
            other => return Err(ProtocolError::UnknownCode(other)),
        };
        Ok(msg)
    }
}

fn missing(code: u64, field: &'static str) -> ProtocolError {
    ProtocolError::MissingField {
        code: code as u8,
        field,
    }
}

/// Requires a present numeric field holding a valid one-byte id
/// (player or room — both exclude 0).
fn require_u8(
    value: Option<u64>,
    code: u64,
    field: &'static str,
) -> Result<u8, ProtocolError> {
    let value = value.ok_or(missing(code, field))?;
    match u8::try_from(value) {
        Ok(id) if id != 0 => Ok(id),
        _ => Err(ProtocolError::ValueOutOfRange { field, value }),
    }
}

/// Requires a non-empty `idList` and takes its first entry.
fn first_of_list(
    list: &Option<Vec<u8>>,
    code: u64,
) -> Result<PlayerId, ProtocolError> {
    match list.as_deref() {
        Some([first, ..]) if *first != 0 => Ok(PlayerId(*first)),
        Some([first, ..]) => Err(ProtocolError::ValueOutOfRange {
            field: "idList",
            value: u64::from(*first),
        }),
        _ => Err(missing(code, "idList")),
    }
}

// =========================================================================
// Tests
// =========================================================================
