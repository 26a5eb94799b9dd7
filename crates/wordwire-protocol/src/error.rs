//! Error types for the protocol layer.

/// Errors raised while encoding or decoding wire records, or while
/// interpreting a record as a typed message.
///
/// Two families matter to callers:
/// - *malformed*: the buffer itself is unusable (truncated input,
///   invalid string bytes). Fatal to that single message.
/// - *violation*: the buffer decoded fine but the record is not a legal
///   message (unknown code, required field missing). Answered with a
///   generic error notice; the connection stays open.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Decode ran out of input before a field's expected end.
    #[error("truncated message: {field} needs {needed} more byte(s) at offset {offset}")]
    Truncated {
        field: &'static str,
        offset: usize,
        needed: usize,
    },

    /// A decoded string field is not valid UTF-8.
    #[error("string field {field} is not valid UTF-8")]
    InvalidString { field: &'static str },

    /// A string field exceeds the 255-byte limit of the one-byte length
    /// prefix.
    #[error("string field {field} is {len} bytes, limit is 255")]
    StringTooLong { field: &'static str, len: usize },

    /// A numeric-list field exceeds 255 elements.
    #[error("list field {field} has {len} elements, limit is 255")]
    ListTooLong { field: &'static str, len: usize },

    /// A numeric value does not fit the field's declared byte width.
    #[error("value {value} of {field} does not fit in {width} byte(s)")]
    ValueTooWide {
        field: &'static str,
        value: u64,
        width: usize,
    },

    /// The record carries no `code` field, so it cannot be interpreted.
    #[error("message has no code field")]
    MissingCode,

    /// The record's `code` is not part of the protocol.
    #[error("unknown message code {0}")]
    UnknownCode(u64),

    /// A field required for the record's code is absent.
    #[error("message code {code} requires field {field}")]
    MissingField { code: u8, field: &'static str },

    /// A field's value is outside the range its code allows (e.g. an id
    /// of 0 or above 255).
    #[error("field {field} value {value} is out of range")]
    ValueOutOfRange { field: &'static str, value: u64 },
}

impl ProtocolError {
    /// `true` for errors meaning the buffer itself was unusable, as
    /// opposed to a well-formed record with an illegal field set.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::Truncated { .. } | Self::InvalidString { .. }
        )
    }
}
