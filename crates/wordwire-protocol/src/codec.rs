//! Schema-driven binary codec.
//!
//! Every message on the wire is one self-delimiting buffer:
//!
//! ```text
//! ┌──────────────────┬──────────┬─────────┬────────────┬─────────────┐
//! │ presence bitmask │ numerics │ strings │ numeric    │ boolean     │
//! │ properties_bytes │ (widths  │ (1-byte │ lists      │ bitmask     │
//! │ big-endian       │  per     │ len +   │ (1-byte    │ boolean_    │
//! │                  │  field)  │ bytes)  │ len + u8s) │ bytes       │
//! └──────────────────┴──────────┴─────────┴────────────┴─────────────┘
//! ```
//!
//! The presence bitmask carries one bit per declared field, walked in
//! schema order (numerics, strings, numeric lists, booleans). The last
//! declared field sits in the least-significant bit, so the presence
//! bit for 1-based field index `idx` out of `n` declared fields is
//! `(mask >> (n - idx)) & 1`. The boolean block at the tail packs the
//! boolean *values* with the same alignment rule, indexed locally
//! within the boolean group; absent booleans contribute 0 to both
//! masks.
//!
//! Decode is the exact inverse walk. Every read is bounds-checked:
//! running out of input yields [`ProtocolError::Truncated`], never a
//! panic or a zero-fill.

use crate::{Fields, Message, ProtocolError, Schema, WIRE_SCHEMA};

/// Encoder/decoder bound to one [`Schema`].
///
/// Stateless apart from the schema reference; cheap to copy around.
/// [`WireCodec::default`] binds the production schema.
#[derive(Debug, Clone, Copy)]
pub struct WireCodec {
    schema: &'static Schema,
}

impl Default for WireCodec {
    fn default() -> Self {
        Self {
            schema: &WIRE_SCHEMA,
        }
    }
}

impl WireCodec {
    /// Creates a codec over a custom schema. Production code uses
    /// [`WireCodec::default`]; this exists for schema-shape tests.
    pub fn with_schema(schema: &'static Schema) -> Self {
        Self { schema }
    }

    /// The exact encoded size of `fields` under this codec's schema.
    ///
    /// Mirrors the encode walk so the output buffer is allocated once.
    pub fn encoded_len(&self, fields: &Fields) -> usize {
        let mut size = self.schema.properties_bytes;
        for (field, width) in self.schema.numerics {
            if fields.numeric(*field).is_some() {
                size += width;
            }
        }
        for field in self.schema.strings {
            if let Some(s) = fields.string(*field) {
                size += 1 + s.len();
            }
        }
        for field in self.schema.numeric_lists {
            if let Some(list) = fields.numeric_list(*field) {
                size += 1 + list.len();
            }
        }
        size + self.schema.boolean_bytes
    }

    /// Encodes a wire record into one self-delimiting buffer.
    ///
    /// # Errors
    /// - [`ProtocolError::ValueTooWide`] — numeric exceeds its width
    /// - [`ProtocolError::StringTooLong`] / [`ProtocolError::ListTooLong`]
    ///   — length does not fit the one-byte prefix
    pub fn encode(&self, fields: &Fields) -> Result<Vec<u8>, ProtocolError> {
        let mut out = Vec::with_capacity(self.encoded_len(fields));
        out.resize(self.schema.properties_bytes, 0);

        let mut mask: u64 = 0;

        for (field, width) in self.schema.numerics {
            mask <<= 1;
            if let Some(value) = fields.numeric(*field) {
                mask |= 1;
                put_uint(&mut out, value, *width, field.name())?;
            }
        }

        for field in self.schema.strings {
            mask <<= 1;
            if let Some(s) = fields.string(*field) {
                mask |= 1;
                let bytes = s.as_bytes();
                if bytes.len() > u8::MAX as usize {
                    return Err(ProtocolError::StringTooLong {
                        field: field.name(),
                        len: bytes.len(),
                    });
                }
                out.push(bytes.len() as u8);
                out.extend_from_slice(bytes);
            }
        }

        for field in self.schema.numeric_lists {
            mask <<= 1;
            if let Some(list) = fields.numeric_list(*field) {
                mask |= 1;
                if list.len() > u8::MAX as usize {
                    return Err(ProtocolError::ListTooLong {
                        field: field.name(),
                        len: list.len(),
                    });
                }
                out.push(list.len() as u8);
                out.extend_from_slice(list);
            }
        }

        let mut booleans: u64 = 0;
        for field in self.schema.booleans {
            mask <<= 1;
            booleans <<= 1;
            if let Some(value) = fields.boolean(*field) {
                mask |= 1;
                booleans |= u64::from(value);
            }
        }
        if self.schema.boolean_bytes > 0 {
            put_uint(
                &mut out,
                booleans,
                self.schema.boolean_bytes,
                "boolean block",
            )?;
        }

        write_uint_at(&mut out, 0, mask, self.schema.properties_bytes);
        Ok(out)
    }

    /// Decodes one buffer back into a wire record.
    ///
    /// Trailing bytes beyond the schema walk are ignored — each message
    /// is self-delimiting, and the transport hands over whole buffers.
    ///
    /// # Errors
    /// [`ProtocolError::Truncated`] when the buffer ends before a field
    /// it claims to carry; [`ProtocolError::InvalidString`] for string
    /// bytes that are not UTF-8.
    pub fn decode(&self, buf: &[u8]) -> Result<Fields, ProtocolError> {
        let mut reader = Reader { buf, offset: 0 };
        let total = self.schema.field_count();

        let mask =
            reader.uint(self.schema.properties_bytes, "presence mask")?;
        let mut idx: u32 = 1;
        let mut fields = Fields::default();

        for (field, width) in self.schema.numerics {
            if bit_set(mask, total, idx) {
                let value = reader.uint(*width, field.name())?;
                fields.set_numeric(*field, value);
            }
            idx += 1;
        }

        for field in self.schema.strings {
            if bit_set(mask, total, idx) {
                let len = reader.uint(1, field.name())? as usize;
                let bytes = reader.take(len, field.name())?;
                let s = std::str::from_utf8(bytes).map_err(|_| {
                    ProtocolError::InvalidString {
                        field: field.name(),
                    }
                })?;
                fields.set_string(*field, s.to_owned());
            }
            idx += 1;
        }

        for field in self.schema.numeric_lists {
            if bit_set(mask, total, idx) {
                let len = reader.uint(1, field.name())? as usize;
                let bytes = reader.take(len, field.name())?;
                fields.set_numeric_list(*field, bytes.to_vec());
            }
            idx += 1;
        }

        if self.schema.boolean_bytes > 0 {
            let booleans =
                reader.uint(self.schema.boolean_bytes, "boolean block")?;
            let group = self.schema.booleans.len() as u32;
            let mut bool_idx: u32 = 1;
            for field in self.schema.booleans {
                if bit_set(mask, total, idx) {
                    fields.set_boolean(
                        *field,
                        bit_set(booleans, group, bool_idx),
                    );
                }
                idx += 1;
                bool_idx += 1;
            }
        }

        Ok(fields)
    }

    /// Encodes a typed message: [`Message::to_fields`] then [`encode`].
    ///
    /// [`encode`]: WireCodec::encode
    pub fn encode_message(
        &self,
        message: &Message,
    ) -> Result<Vec<u8>, ProtocolError> {
        self.encode(&message.to_fields())
    }

    /// Decodes a buffer all the way to a typed message.
    pub fn decode_message(
        &self,
        buf: &[u8],
    ) -> Result<Message, ProtocolError> {
        Message::from_fields(self.decode(buf)?)
    }
}

/// Tests the 1-based presence bit `idx` out of `total` declared fields.
/// The last declared field occupies the least-significant bit.
fn bit_set(mask: u64, total: u32, idx: u32) -> bool {
    (mask >> (total - idx)) & 1 == 1
}

/// Appends `value` as a big-endian unsigned integer of `width` bytes.
fn put_uint(
    out: &mut Vec<u8>,
    value: u64,
    width: usize,
    field: &'static str,
) -> Result<(), ProtocolError> {
    if width < 8 && value >> (width * 8) != 0 {
        return Err(ProtocolError::ValueTooWide {
            field,
            value,
            width,
        });
    }
    for shift in (0..width).rev() {
        out.push((value >> (shift * 8)) as u8);
    }
    Ok(())
}

/// Overwrites `width` bytes at `offset` with a big-endian `value`.
/// Used to fill in the presence mask once the body walk has built it.
fn write_uint_at(out: &mut [u8], offset: usize, value: u64, width: usize) {
    for (i, shift) in (0..width).rev().enumerate() {
        out[offset + i] = (value >> (shift * 8)) as u8;
    }
}

/// Bounds-checked cursor over the input buffer.
struct Reader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    /// Consumes `n` bytes, or reports exactly how many were missing.
    fn take(
        &mut self,
        n: usize,
        field: &'static str,
    ) -> Result<&'a [u8], ProtocolError> {
        let remaining = self.buf.len() - self.offset;
        if remaining < n {
            return Err(ProtocolError::Truncated {
                field,
                offset: self.offset,
                needed: n - remaining,
            });
        }
        let slice = &self.buf[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    /// Consumes a big-endian unsigned integer of `width` bytes.
    fn uint(
        &mut self,
        width: usize,
        field: &'static str,
    ) -> Result<u64, ProtocolError> {
        let bytes = self.take(width, field)?;
        Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldId, Schema};

    fn codec() -> WireCodec {
        WireCodec::default()
    }

    /// A record exercising every category of the production schema.
    fn full_record() -> Fields {
        Fields {
            id: Some(42),
            code: Some(12),
            room_id: Some(7),
            attempt_count: Some(3),
            attempt: Some("PEAR".into()),
            hint: Some("fruit".into()),
            password: Some("hunter2".into()),
            secret: Some("APPLE".into()),
            id_list: Some(vec![1, 255, 9]),
            is_word_guessed: Some(true),
        }
    }

    // =====================================================================
    // Round trips
    // =====================================================================

    #[test]
    fn test_decode_encode_round_trips_full_record() {
        let c = codec();
        let bytes = c.encode(&full_record()).unwrap();
        assert_eq!(bytes.len(), c.encoded_len(&full_record()));
        assert_eq!(c.decode(&bytes).unwrap(), full_record());
    }

    #[test]
    fn test_decode_encode_round_trips_empty_record() {
        let c = codec();
        let bytes = c.encode(&Fields::default()).unwrap();
        // 2-byte mask + 1-byte boolean block, nothing else.
        assert_eq!(bytes, vec![0, 0, 0]);
        assert_eq!(c.decode(&bytes).unwrap(), Fields::default());
    }

    #[test]
    fn test_decode_encode_round_trips_each_single_field() {
        let c = codec();
        let singles = [
            Fields { id: Some(200), ..Fields::default() },
            Fields { code: Some(16), ..Fields::default() },
            Fields { room_id: Some(255), ..Fields::default() },
            Fields { attempt_count: Some(0), ..Fields::default() },
            Fields { attempt: Some("<igiveup>".into()), ..Fields::default() },
            Fields { hint: Some(String::new()), ..Fields::default() },
            Fields { password: Some("0123456789Sa!%^-".into()), ..Fields::default() },
            Fields { secret: Some("zürich".into()), ..Fields::default() },
            Fields { id_list: Some(vec![]), ..Fields::default() },
            Fields { is_word_guessed: Some(false), ..Fields::default() },
        ];
        for record in singles {
            let bytes = c.encode(&record).unwrap();
            assert_eq!(c.decode(&bytes).unwrap(), record, "{record:?}");
        }
    }

    // =====================================================================
    // Exact wire bytes
    // =====================================================================

    #[test]
    fn test_encode_auth_ok_exact_bytes() {
        // {id: 42, code: 1}: id is field 1 of 10 (bit 9), code is field
        // 2 (bit 8) → mask 0x0300; numerics in declared order; trailing
        // boolean block always present.
        let c = codec();
        let bytes = c
            .encode(&Fields {
                id: Some(42),
                code: Some(1),
                ..Fields::default()
            })
            .unwrap();
        assert_eq!(bytes, vec![0x03, 0x00, 42, 1, 0x00]);
    }

    #[test]
    fn test_encode_single_string_sets_single_presence_bit() {
        // secret is field 8 of 10 → bit (10 - 8) = 2 → mask 0x0004.
        let c = codec();
        let bytes = c
            .encode(&Fields {
                secret: Some("AB".into()),
                ..Fields::default()
            })
            .unwrap();
        assert_eq!(bytes, vec![0x00, 0x04, 2, b'A', b'B', 0x00]);
        assert_eq!(u16::from_be_bytes([bytes[0], bytes[1]]).count_ones(), 1);
    }

    #[test]
    fn test_encode_boolean_value_lands_in_trailing_block() {
        // isWordGuessed is the last field → presence bit 0; its value
        // is packed into the boolean block, not the presence mask.
        let c = codec();
        let bytes = c
            .encode(&Fields {
                is_word_guessed: Some(true),
                ..Fields::default()
            })
            .unwrap();
        assert_eq!(bytes, vec![0x00, 0x01, 0x01]);

        let bytes = c
            .encode(&Fields {
                is_word_guessed: Some(false),
                ..Fields::default()
            })
            .unwrap();
        // Present (mask bit set) but false (block bit clear).
        assert_eq!(bytes, vec![0x00, 0x01, 0x00]);
    }

    #[test]
    fn test_encode_id_list_one_byte_per_element() {
        let c = codec();
        let bytes = c
            .encode(&Fields {
                id_list: Some(vec![5, 250]),
                ..Fields::default()
            })
            .unwrap();
        // idList is field 9 of 10 → bit 1 → mask 0x0002.
        assert_eq!(bytes, vec![0x00, 0x02, 2, 5, 250, 0x00]);
    }

    // =====================================================================
    // Malformed input
    // =====================================================================

    #[test]
    fn test_decode_every_truncation_errors_without_panic() {
        // Every strict prefix of a valid encoding must fail cleanly:
        // the walk always ends with the boolean block, so no prefix is
        // itself a complete message.
        let c = codec();
        let bytes = c.encode(&full_record()).unwrap();
        for cut in 0..bytes.len() {
            let result = c.decode(&bytes[..cut]);
            assert!(
                matches!(result, Err(ProtocolError::Truncated { .. })),
                "prefix of {cut} bytes should be truncated, got {result:?}"
            );
        }
    }

    #[test]
    fn test_decode_string_length_past_end_is_truncated() {
        // Hand-built: hint present (field 6 → bit 4 → mask 0x0010),
        // claiming 5 bytes but carrying 2.
        let c = codec();
        let result = c.decode(&[0x00, 0x10, 5, b'h', b'i']);
        assert!(matches!(
            result,
            Err(ProtocolError::Truncated { field: "hint", .. })
        ));
    }

    #[test]
    fn test_decode_invalid_utf8_string_is_rejected() {
        let c = codec();
        let result = c.decode(&[0x00, 0x10, 1, 0xFF, 0x00]);
        assert!(matches!(
            result,
            Err(ProtocolError::InvalidString { field: "hint" })
        ));
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let c = codec();
        let mut bytes = c
            .encode(&Fields {
                code: Some(20),
                ..Fields::default()
            })
            .unwrap();
        bytes.extend_from_slice(&[0xDE, 0xAD]);
        assert_eq!(
            c.decode(&bytes).unwrap(),
            Fields {
                code: Some(20),
                ..Fields::default()
            }
        );
    }

    // =====================================================================
    // Encode-side rejections
    // =====================================================================

    #[test]
    fn test_encode_string_over_255_bytes_is_rejected() {
        let c = codec();
        let result = c.encode(&Fields {
            secret: Some("x".repeat(256)),
            ..Fields::default()
        });
        assert!(matches!(
            result,
            Err(ProtocolError::StringTooLong { field: "secret", len: 256 })
        ));
    }

    #[test]
    fn test_encode_string_of_exactly_255_bytes_is_accepted() {
        let c = codec();
        let record = Fields {
            hint: Some("h".repeat(255)),
            ..Fields::default()
        };
        let bytes = c.encode(&record).unwrap();
        assert_eq!(c.decode(&bytes).unwrap(), record);
    }

    #[test]
    fn test_encode_list_over_255_elements_is_rejected() {
        let c = codec();
        let result = c.encode(&Fields {
            id_list: Some(vec![1; 256]),
            ..Fields::default()
        });
        assert!(matches!(
            result,
            Err(ProtocolError::ListTooLong { field: "idList", len: 256 })
        ));
    }

    #[test]
    fn test_encode_numeric_wider_than_declared_is_rejected() {
        // attemptCount is one byte wide in the production schema.
        let c = codec();
        let result = c.encode(&Fields {
            attempt_count: Some(256),
            ..Fields::default()
        });
        assert!(matches!(
            result,
            Err(ProtocolError::ValueTooWide {
                field: "attemptCount",
                value: 256,
                width: 1,
            })
        ));
    }

    // =====================================================================
    // Non-production schema shapes
    // =====================================================================

    /// Three numerics of different widths, no strings/lists/booleans.
    static WIDE_SCHEMA: Schema = Schema {
        properties_bytes: 1,
        numerics: &[
            (FieldId::Id, 1),
            (FieldId::RoomId, 2),
            (FieldId::AttemptCount, 4),
        ],
        strings: &[],
        numeric_lists: &[],
        booleans: &[],
        boolean_bytes: 0,
    };

    #[test]
    fn test_multi_byte_widths_encode_big_endian() {
        let c = WireCodec::with_schema(&WIDE_SCHEMA);
        let record = Fields {
            id: Some(0xAB),
            room_id: Some(0x0102),
            attempt_count: Some(0xDEADBEEF),
            ..Fields::default()
        };
        let bytes = c.encode(&record).unwrap();
        assert_eq!(
            bytes,
            vec![0b111, 0xAB, 0x01, 0x02, 0xDE, 0xAD, 0xBE, 0xEF]
        );
        assert_eq!(c.decode(&bytes).unwrap(), record);
    }

    #[test]
    fn test_sparse_presence_skips_absent_widths() {
        // Only the middle (2-byte) field present: bit index 2 of 3.
        let c = WireCodec::with_schema(&WIDE_SCHEMA);
        let record = Fields {
            room_id: Some(0xFFFF),
            ..Fields::default()
        };
        let bytes = c.encode(&record).unwrap();
        assert_eq!(bytes, vec![0b010, 0xFF, 0xFF]);
        assert_eq!(c.decode(&bytes).unwrap(), record);
    }

    #[test]
    fn test_wide_schema_rejects_value_overflow() {
        let c = WireCodec::with_schema(&WIDE_SCHEMA);
        let result = c.encode(&Fields {
            room_id: Some(0x1_0000),
            ..Fields::default()
        });
        assert!(matches!(
            result,
            Err(ProtocolError::ValueTooWide { width: 2, .. })
        ));
    }
}
