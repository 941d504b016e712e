//! Low-level protobuf wire format primitives.
//!
//! ## Wire Format Overview
//!
//! Each protobuf field is encoded as:
//! - A varint "tag" containing the field number and wire type
//! - The field data (format depends on wire type)
//!
//! Wire types:
//! - 0: VARINT (int32, int64, uint32, uint64, sint32, sint64, bool, enum)
//! - 1: I64 (fixed64, sfixed64, double)
//! - 2: LEN (string, bytes, embedded messages, packed repeated fields)
//! - 3: SGROUP (deprecated)
//! - 4: EGROUP (deprecated)
//! - 5: I32 (fixed32, sfixed32, float)

mod value;

use crate::error::{Error, Result};
use crate::FieldNum;
use bytes::BufMut;

pub use value::{Fixed32, Fixed64, Varint};

/// Protobuf wire types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Variable-length integer
    Varint = 0,
    /// 64-bit fixed-width
    I64 = 1,
    /// Length-delimited (strings, bytes, embedded messages)
    Len = 2,
    /// Start group (deprecated)
    StartGroup = 3,
    /// End group (deprecated)
    EndGroup = 4,
    /// 32-bit fixed-width
    I32 = 5,
}

impl TryFrom<u8> for WireType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::I64),
            2 => Ok(WireType::Len),
            3 => Ok(WireType::StartGroup),
            4 => Ok(WireType::EndGroup),
            5 => Ok(WireType::I32),
            _ => Err(Error::unknown_type(format!("unknown wire type {}", value))),
        }
    }
}

/// Maximum valid protobuf field number (2^29 - 1)
pub const MAX_FIELD_NUMBER: FieldNum = 536_870_911;

/// Decode a varint from the given bytes.
///
/// Groups beyond the 64th bit are consumed but their bits are discarded, so
/// an overlong encoding wraps rather than failing. Running out of bytes while
/// the continuation bit is still set is an error.
///
/// Returns the decoded value and the number of bytes consumed.
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize)> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    for (i, &byte) in data.iter().enumerate() {
        if shift < 64 {
            result |= u64::from(byte & 0x7F) << shift;
        }
        shift = shift.saturating_add(7);

        if byte & 0x80 == 0 {
            return Ok((result, i + 1));
        }
    }

    Err(Error::malformed(data.len(), "buffer ended inside a varint"))
}

/// Encode a varint into the buffer.
pub fn encode_varint(mut value: u64, buf: &mut impl BufMut) {
    while value >= 0x80 {
        buf.put_u8((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Number of bytes `value` occupies as a varint.
pub fn encoded_len_varint(value: u64) -> usize {
    // 1 byte per started group of 7 bits, at least one byte for zero
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

/// Encode a field tag: `(field << 3) | wire_type`.
pub fn encode_tag(field: FieldNum, wire_type: WireType, buf: &mut impl BufMut) {
    encode_varint((u64::from(field) << 3) | wire_type as u64, buf);
}

/// Split a decoded tag into its field number and raw 3-bit wire type.
///
/// Field numbers wider than 32 bits are truncated; the wire type is
/// returned raw so callers decide what to do with values 6 and 7.
pub fn decode_tag(tag: u64) -> (FieldNum, u8) {
    ((tag >> 3) as FieldNum, (tag & 0x07) as u8)
}

/// Forward-only reader over a borrowed buffer that reports errors at
/// absolute offsets.
#[derive(Debug)]
pub(crate) struct WireReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> WireReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    fn remaining(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    pub(crate) fn read_varint(&mut self) -> Result<u64> {
        let (value, len) = decode_varint(self.remaining()).map_err(|_| {
            Error::malformed(self.position, "buffer ended inside a varint")
        })?;
        self.position += len;
        Ok(value)
    }

    fn read_array<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        let bytes = self
            .remaining()
            .get(..N)
            .and_then(|b| <[u8; N]>::try_from(b).ok())
            .ok_or_else(|| {
                Error::malformed(
                    self.position,
                    format!(
                        "not enough bytes for {} (need {}, have {})",
                        what,
                        N,
                        self.remaining().len()
                    ),
                )
            })?;
        self.position += N;
        Ok(bytes)
    }

    pub(crate) fn read_fixed32(&mut self) -> Result<u32> {
        self.read_array::<4>("I32").map(u32::from_le_bytes)
    }

    pub(crate) fn read_fixed64(&mut self) -> Result<u64> {
        self.read_array::<8>("I64").map(u64::from_le_bytes)
    }

    /// Read a varint length prefix followed by that many raw bytes.
    pub(crate) fn read_length_delimited(&mut self) -> Result<&'a [u8]> {
        let start = self.position;
        let length = self.read_varint()?;
        let available = self.remaining().len();

        let length = usize::try_from(length)
            .ok()
            .filter(|&len| len <= available)
            .ok_or_else(|| {
                Error::malformed(
                    start,
                    format!(
                        "not enough bytes for LEN field (need {}, have {})",
                        length, available
                    ),
                )
            })?;

        let bytes = &self.remaining()[..length];
        self.position += length;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_varint_single_byte() {
        let data = [0x08]; // Value 8
        let (value, len) = decode_varint(&data).unwrap();
        assert_eq!(value, 8);
        assert_eq!(len, 1);
    }

    #[test]
    fn test_decode_varint_multi_byte() {
        let data = [0xAC, 0x02]; // Value 300
        let (value, len) = decode_varint(&data).unwrap();
        assert_eq!(value, 300);
        assert_eq!(len, 2);
    }

    #[test]
    fn test_decode_varint_max() {
        // Maximum 64-bit varint (all 1s)
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
        let (value, len) = decode_varint(&data).unwrap();
        assert_eq!(value, u64::MAX);
        assert_eq!(len, 10);
    }

    #[test]
    fn test_decode_varint_overlong_wraps() {
        // 12 groups: bits past 64 are dropped, the value is still 1
        let data = [0x81, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x00];
        let (value, len) = decode_varint(&data).unwrap();
        assert_eq!(value, 1);
        assert_eq!(len, 12);
    }

    #[test]
    fn test_decode_varint_truncated() {
        assert!(decode_varint(&[0x96]).is_err());
        assert!(decode_varint(&[]).is_err());
    }

    #[test]
    fn test_encode_varint() {
        let mut buf = Vec::new();
        encode_varint(300, &mut buf);
        assert_eq!(buf, [0xAC, 0x02]);

        buf.clear();
        encode_varint(0, &mut buf);
        assert_eq!(buf, [0x00]);

        buf.clear();
        encode_varint(u64::MAX, &mut buf);
        assert_eq!(buf.len(), 10);
        assert_eq!(decode_varint(&buf).unwrap(), (u64::MAX, 10));
    }

    #[test]
    fn test_encoded_len_varint() {
        assert_eq!(encoded_len_varint(0), 1);
        assert_eq!(encoded_len_varint(127), 1);
        assert_eq!(encoded_len_varint(128), 2);
        assert_eq!(encoded_len_varint(300), 2);
        assert_eq!(encoded_len_varint(u64::MAX), 10);
    }

    #[test]
    fn test_wire_type_conversion() {
        assert_eq!(WireType::try_from(0).unwrap(), WireType::Varint);
        assert_eq!(WireType::try_from(1).unwrap(), WireType::I64);
        assert_eq!(WireType::try_from(2).unwrap(), WireType::Len);
        assert_eq!(WireType::try_from(3).unwrap(), WireType::StartGroup);
        assert_eq!(WireType::try_from(4).unwrap(), WireType::EndGroup);
        assert_eq!(WireType::try_from(5).unwrap(), WireType::I32);
        assert!(WireType::try_from(7).is_err());

        let err = WireType::try_from(6).unwrap_err();
        assert!(matches!(err, Error::InvalidType { field: None, .. }));
        assert!(err.to_string().contains("unknown wire type 6"));
    }

    #[test]
    fn test_tags() {
        let mut buf = Vec::new();
        encode_tag(1, WireType::Varint, &mut buf);
        encode_tag(2, WireType::Len, &mut buf);
        encode_tag(16, WireType::I32, &mut buf);
        assert_eq!(buf, [0x08, 0x12, 0x85, 0x01]);

        assert_eq!(decode_tag(0x08), (1, 0));
        assert_eq!(decode_tag(0x12), (2, 2));
        assert_eq!(decode_tag(0x85), (16, 5));

        let mut buf = Vec::new();
        encode_tag(MAX_FIELD_NUMBER, WireType::I64, &mut buf);
        let (tag, _) = decode_varint(&buf).unwrap();
        assert_eq!(decode_tag(tag), (MAX_FIELD_NUMBER, 1));
    }

    #[test]
    fn test_reader_fixed_width() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09];
        let mut reader = WireReader::new(&data);
        assert_eq!(reader.read_fixed32().unwrap(), 0x0403_0201);
        assert_eq!(reader.position(), 4);
        assert!(reader.read_fixed64().is_err());
        // a failed read leaves the position untouched
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn test_reader_length_delimited() {
        let data = [0x05, b'h', b'e', b'l', b'l', b'o', 0x03, b'a'];
        let mut reader = WireReader::new(&data);
        assert_eq!(reader.read_length_delimited().unwrap(), b"hello");
        let err = reader.read_length_delimited().unwrap_err();
        assert!(matches!(err, Error::MalformedBuffer { offset: 6, .. }));
    }
}
