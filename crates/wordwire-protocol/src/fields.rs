//! The flat wire record: every declared field, all optional.
//!
//! [`Fields`] is the in-memory image of one encoded message — exactly
//! what the codec reads and writes. Which combinations of fields are
//! legal is not this type's business; that lives in
//! [`Message`](crate::Message), the tagged view keyed by `code`.

use crate::FieldId;

/// One decoded (or to-be-encoded) wire record.
///
/// All fields optional; absence means the presence bit is clear on the
/// wire. Numeric values are widened to `u64` here — their declared byte
/// width in the [`Schema`](crate::Schema) bounds what the codec will
/// accept at encode time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    pub id: Option<u64>,
    pub code: Option<u64>,
    pub room_id: Option<u64>,
    pub attempt_count: Option<u64>,
    pub attempt: Option<String>,
    pub hint: Option<String>,
    pub password: Option<String>,
    pub secret: Option<String>,
    /// List elements are `u8` by construction — the wire allots one
    /// byte per element, so out-of-range values are unrepresentable
    /// rather than silently truncated.
    pub id_list: Option<Vec<u8>>,
    pub is_word_guessed: Option<bool>,
}

impl Fields {
    /// Reads a numeric field by id. `None` for absent fields and for
    /// ids that are not numeric.
    pub fn numeric(&self, field: FieldId) -> Option<u64> {
        match field {
            FieldId::Id => self.id,
            FieldId::Code => self.code,
            FieldId::RoomId => self.room_id,
            FieldId::AttemptCount => self.attempt_count,
            _ => None,
        }
    }

    pub fn set_numeric(&mut self, field: FieldId, value: u64) {
        match field {
            FieldId::Id => self.id = Some(value),
            FieldId::Code => self.code = Some(value),
            FieldId::RoomId => self.room_id = Some(value),
            FieldId::AttemptCount => self.attempt_count = Some(value),
            _ => debug_assert!(false, "{} is not numeric", field.name()),
        }
    }

    pub fn string(&self, field: FieldId) -> Option<&str> {
        match field {
            FieldId::Attempt => self.attempt.as_deref(),
            FieldId::Hint => self.hint.as_deref(),
            FieldId::Password => self.password.as_deref(),
            FieldId::Secret => self.secret.as_deref(),
            _ => None,
        }
    }

    pub fn set_string(&mut self, field: FieldId, value: String) {
        match field {
            FieldId::Attempt => self.attempt = Some(value),
            FieldId::Hint => self.hint = Some(value),
            FieldId::Password => self.password = Some(value),
            FieldId::Secret => self.secret = Some(value),
            _ => debug_assert!(false, "{} is not a string", field.name()),
        }
    }

    pub fn numeric_list(&self, field: FieldId) -> Option<&[u8]> {
        match field {
            FieldId::IdList => self.id_list.as_deref(),
            _ => None,
        }
    }

    pub fn set_numeric_list(&mut self, field: FieldId, value: Vec<u8>) {
        match field {
            FieldId::IdList => self.id_list = Some(value),
            _ => debug_assert!(false, "{} is not a list", field.name()),
        }
    }

    pub fn boolean(&self, field: FieldId) -> Option<bool> {
        match field {
            FieldId::IsWordGuessed => self.is_word_guessed,
            _ => None,
        }
    }

    pub fn set_boolean(&mut self, field: FieldId, value: bool) {
        match field {
            FieldId::IsWordGuessed => self.is_word_guessed = Some(value),
            _ => debug_assert!(false, "{} is not a boolean", field.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_round_trip_by_field_id() {
        let mut f = Fields::default();
        f.set_numeric(FieldId::RoomId, 7);
        f.set_string(FieldId::Secret, "APPLE".into());
        f.set_numeric_list(FieldId::IdList, vec![3, 9]);
        f.set_boolean(FieldId::IsWordGuessed, true);

        assert_eq!(f.numeric(FieldId::RoomId), Some(7));
        assert_eq!(f.string(FieldId::Secret), Some("APPLE"));
        assert_eq!(f.numeric_list(FieldId::IdList), Some(&[3, 9][..]));
        assert_eq!(f.boolean(FieldId::IsWordGuessed), Some(true));
    }

    #[test]
    fn test_absent_fields_read_as_none() {
        let f = Fields::default();
        assert_eq!(f.numeric(FieldId::Id), None);
        assert_eq!(f.string(FieldId::Hint), None);
        assert_eq!(f.numeric_list(FieldId::IdList), None);
        assert_eq!(f.boolean(FieldId::IsWordGuessed), None);
    }

    #[test]
    fn test_category_mismatch_reads_as_none() {
        let mut f = Fields::default();
        f.set_string(FieldId::Hint, "fruit".into());
        assert_eq!(f.numeric(FieldId::Hint), None);
        assert_eq!(f.boolean(FieldId::Hint), None);
    }
}
