//! The wire schema: the ordered catalogue of every field the protocol
//! can carry.
//!
//! The schema is the single source of truth for the wire layout. Encode
//! and decode both walk it in the same fixed order — numerics, then
//! strings, then numeric lists, then booleans — so the presence bitmask
//! bits line up on both sides. Adding, removing, or reordering a field
//! breaks wire compatibility with every deployed client; that coupling
//! is the price of the dense format.

// ---------------------------------------------------------------------------
// FieldId
// ---------------------------------------------------------------------------

/// Names one declared protocol field.
///
/// Used by the codec to move values between the [`Fields`](crate::Fields)
/// record and the wire without stringly-typed lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    // Numerics
    Id,
    Code,
    RoomId,
    AttemptCount,
    // Strings
    Attempt,
    Hint,
    Password,
    Secret,
    // Numeric lists
    IdList,
    // Booleans
    IsWordGuessed,
}

impl FieldId {
    /// The field's wire name, used in error reports and logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Code => "code",
            Self::RoomId => "roomId",
            Self::AttemptCount => "attemptCount",
            Self::Attempt => "attempt",
            Self::Hint => "hint",
            Self::Password => "password",
            Self::Secret => "secret",
            Self::IdList => "idList",
            Self::IsWordGuessed => "isWordGuessed",
        }
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Ordered catalogue of declared fields, their categories, and widths.
///
/// Immutable and shared by every encode/decode call. Numeric fields
/// carry an independently configured byte width; strings and numeric
/// lists are length-prefixed with a single byte; booleans are packed
/// into a trailing bitmask block of `boolean_bytes` bytes.
#[derive(Debug)]
pub struct Schema {
    /// Width in bytes of the leading field-presence bitmask.
    pub properties_bytes: usize,
    /// Numeric fields in declared order, each with its byte width.
    pub numerics: &'static [(FieldId, usize)],
    /// String fields in declared order.
    pub strings: &'static [FieldId],
    /// Numeric-list fields in declared order (one byte per element).
    pub numeric_lists: &'static [FieldId],
    /// Boolean fields in declared order.
    pub booleans: &'static [FieldId],
    /// Width in bytes of the trailing boolean-value bitmask.
    pub boolean_bytes: usize,
}

impl Schema {
    /// Total number of declared fields across all categories.
    ///
    /// The presence bitmask carries one bit per declared field, so this
    /// count fixes how far each presence bit is shifted.
    pub fn field_count(&self) -> u32 {
        (self.numerics.len()
            + self.strings.len()
            + self.numeric_lists.len()
            + self.booleans.len()) as u32
    }
}

/// The production schema.
///
/// Field order is wire-normative:
/// `id`, `code`, `roomId`, `attemptCount` (numerics, 1 byte each), then
/// `attempt`, `hint`, `password`, `secret` (strings), then `idList`
/// (numeric list), then `isWordGuessed` (boolean). Ten fields total,
/// covered by a 2-byte presence mask and a 1-byte boolean block.
pub static WIRE_SCHEMA: Schema = Schema {
    properties_bytes: 2,
    numerics: &[
        (FieldId::Id, 1),
        (FieldId::Code, 1),
        (FieldId::RoomId, 1),
        (FieldId::AttemptCount, 1),
    ],
    strings: &[
        FieldId::Attempt,
        FieldId::Hint,
        FieldId::Password,
        FieldId::Secret,
    ],
    numeric_lists: &[FieldId::IdList],
    booleans: &[FieldId::IsWordGuessed],
    boolean_bytes: 1,
};
