//! The decoded wire message container.
//!
//! A [`WireMessage`] holds the fields of one protobuf message bucketed by
//! their physical representation: varint, fixed32, fixed64 and
//! length-delimited bytes. It knows nothing about the logical types of its
//! fields; the typed `decode_*`/`encode_*` helpers and the dynamic
//! [`decode_as`](WireMessage::decode_as) / [`encode_as`](WireMessage::encode_as)
//! pair apply an interpretation chosen by the caller.
//!
//! ## Bucket priority
//!
//! The wire format never gives one field two physical representations. The
//! typed `encode_*` setters keep it that way by dropping whatever other
//! representation the field had. The raw `set_*` setters only touch their
//! own bucket, so mixing them can leave a field in more than one bucket;
//! untyped lookups then check varint, fixed32, fixed64 and bytes in that
//! order.
//!
//! ## Example
//!
//! ```
//! use dynwire_core::WireMessage;
//!
//! let mut m = WireMessage::new();
//! m.encode_bool(1, true);
//! m.encode_int64(2, 10);
//!
//! let bytes = m.marshal();
//! assert_eq!(bytes, [0x08, 0x01, 0x10, 0x0a]);
//!
//! let decoded = WireMessage::parse(&bytes)?;
//! assert_eq!(decoded.decode_bool(1), Some(true));
//! assert_eq!(decoded.decode_int64(2), Some(10));
//! # Ok::<(), dynwire_core::Error>(())
//! ```

mod dynamic;
mod parse;

use crate::error::{Error, Result};
use crate::scalar::ScalarType;
use crate::wire::{
    encode_tag, encode_varint, encoded_len_varint, Fixed32, Fixed64, Varint, WireType,
};
use crate::FieldNum;
use bytes::{BufMut, Bytes};
use std::collections::{BTreeMap, BTreeSet};

pub use parse::ParseConfig;

/// A protobuf message split into its raw fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireMessage {
    varint: BTreeMap<FieldNum, Varint>,
    fixed32: BTreeMap<FieldNum, Fixed32>,
    fixed64: BTreeMap<FieldNum, Fixed64>,
    bytes: BTreeMap<FieldNum, Bytes>,
}

/// A raw field borrowed from a [`WireMessage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireField<'a> {
    /// Varint wire type
    Varint(Varint),
    /// Fixed32 wire type
    Fixed32(Fixed32),
    /// Fixed64 wire type
    Fixed64(Fixed64),
    /// Length-delimited wire type
    Bytes(&'a Bytes),
}

impl WireField<'_> {
    /// The wire type the field is stored as
    pub fn wire_type(&self) -> WireType {
        match self {
            WireField::Varint(_) => WireType::Varint,
            WireField::Fixed32(_) => WireType::I32,
            WireField::Fixed64(_) => WireType::I64,
            WireField::Bytes(_) => WireType::Len,
        }
    }
}

impl WireMessage {
    /// Creates an empty message
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every field
    pub fn reset(&mut self) {
        self.varint.clear();
        self.fixed32.clear();
        self.fixed64.clear();
        self.bytes.clear();
    }

    // Low-level wire interface

    /// Stores a raw varint for `field`
    pub fn set_varint(&mut self, field: FieldNum, value: Varint) {
        self.varint.insert(field, value);
    }

    /// Stores a raw fixed32 for `field`
    pub fn set_fixed32(&mut self, field: FieldNum, value: Fixed32) {
        self.fixed32.insert(field, value);
    }

    /// Stores a raw fixed64 for `field`
    pub fn set_fixed64(&mut self, field: FieldNum, value: Fixed64) {
        self.fixed64.insert(field, value);
    }

    /// Stores a raw byte sequence for `field`
    pub fn set_bytes(&mut self, field: FieldNum, value: impl Into<Bytes>) {
        self.bytes.insert(field, value.into());
    }

    /// Removes `field` from every bucket. Returns true if anything was removed.
    pub fn remove(&mut self, field: FieldNum) -> bool {
        let removed = [
            self.varint.remove(&field).is_some(),
            self.fixed32.remove(&field).is_some(),
            self.fixed64.remove(&field).is_some(),
            self.bytes.remove(&field).is_some(),
        ];
        removed.contains(&true)
    }

    /// Number of stored entries across all buckets
    pub fn field_count(&self) -> usize {
        self.varint.len() + self.fixed32.len() + self.fixed64.len() + self.bytes.len()
    }

    /// Returns true if the message has no fields
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    /// All field numbers present in any bucket, ascending and without
    /// duplicates
    pub fn field_nums(&self) -> Vec<FieldNum> {
        let fields: BTreeSet<FieldNum> = self
            .varint
            .keys()
            .chain(self.fixed32.keys())
            .chain(self.fixed64.keys())
            .chain(self.bytes.keys())
            .copied()
            .collect();
        fields.into_iter().collect()
    }

    /// Looks `field` up in every bucket, in priority order
    pub fn field(&self, field: FieldNum) -> Option<WireField<'_>> {
        self.varint(field)
            .map(WireField::Varint)
            .or_else(|| self.fixed32(field).map(WireField::Fixed32))
            .or_else(|| self.fixed64(field).map(WireField::Fixed64))
            .or_else(|| self.bytes(field).map(WireField::Bytes))
    }

    /// The raw varint stored for `field`
    pub fn varint(&self, field: FieldNum) -> Option<Varint> {
        self.varint.get(&field).copied()
    }

    /// The raw fixed32 stored for `field`
    pub fn fixed32(&self, field: FieldNum) -> Option<Fixed32> {
        self.fixed32.get(&field).copied()
    }

    /// The raw fixed64 stored for `field`
    pub fn fixed64(&self, field: FieldNum) -> Option<Fixed64> {
        self.fixed64.get(&field).copied()
    }

    /// The raw byte sequence stored for `field`
    pub fn bytes(&self, field: FieldNum) -> Option<&Bytes> {
        self.bytes.get(&field)
    }

    // Typed decoding

    /// Decodes `field` as a protobuf `int32`
    pub fn decode_int32(&self, field: FieldNum) -> Option<i32> {
        self.varint(field).map(Varint::as_int32)
    }

    /// Decodes `field` as a protobuf `int64`
    pub fn decode_int64(&self, field: FieldNum) -> Option<i64> {
        self.varint(field).map(Varint::as_int64)
    }

    /// Decodes `field` as a protobuf `uint32`
    pub fn decode_uint32(&self, field: FieldNum) -> Option<u32> {
        self.varint(field).map(Varint::as_uint32)
    }

    /// Decodes `field` as a protobuf `uint64`
    pub fn decode_uint64(&self, field: FieldNum) -> Option<u64> {
        self.varint(field).map(Varint::as_uint64)
    }

    /// Decodes `field` as a protobuf `sint32`
    pub fn decode_sint32(&self, field: FieldNum) -> Option<i32> {
        self.varint(field).map(Varint::as_sint32)
    }

    /// Decodes `field` as a protobuf `sint64`
    pub fn decode_sint64(&self, field: FieldNum) -> Option<i64> {
        self.varint(field).map(Varint::as_sint64)
    }

    /// Decodes `field` as a protobuf `bool`
    pub fn decode_bool(&self, field: FieldNum) -> Option<bool> {
        self.varint(field).map(Varint::as_bool)
    }

    /// Decodes `field` as a protobuf enum number
    pub fn decode_enum(&self, field: FieldNum) -> Option<u64> {
        self.varint(field).map(Varint::as_enum)
    }

    /// Decodes `field` as a protobuf `fixed32`
    pub fn decode_fixed32(&self, field: FieldNum) -> Option<u32> {
        self.fixed32(field).map(Fixed32::as_fixed32)
    }

    /// Decodes `field` as a protobuf `sfixed32`
    pub fn decode_sfixed32(&self, field: FieldNum) -> Option<i32> {
        self.fixed32(field).map(Fixed32::as_sfixed32)
    }

    /// Decodes `field` as a protobuf `float`
    pub fn decode_float(&self, field: FieldNum) -> Option<f32> {
        self.fixed32(field).map(Fixed32::as_float)
    }

    /// Decodes `field` as a protobuf `fixed64`
    pub fn decode_fixed64(&self, field: FieldNum) -> Option<u64> {
        self.fixed64(field).map(Fixed64::as_fixed64)
    }

    /// Decodes `field` as a protobuf `sfixed64`
    pub fn decode_sfixed64(&self, field: FieldNum) -> Option<i64> {
        self.fixed64(field).map(Fixed64::as_sfixed64)
    }

    /// Decodes `field` as a protobuf `double`
    pub fn decode_double(&self, field: FieldNum) -> Option<f64> {
        self.fixed64(field).map(Fixed64::as_double)
    }

    /// Decodes `field` as a protobuf `bytes`
    pub fn decode_bytes(&self, field: FieldNum) -> Option<Bytes> {
        self.bytes(field).cloned()
    }

    /// Decodes `field` as a protobuf `string`.
    ///
    /// Fails with [`Error::FieldMissing`] if the field is absent and with
    /// [`Error::InvalidType`] if its bytes are not UTF-8.
    pub fn decode_string(&self, field: FieldNum) -> Result<String> {
        let bytes = self
            .bytes(field)
            .ok_or_else(|| Error::field_missing(field, ScalarType::String))?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::invalid_type(field, format!("string is not valid UTF-8: {}", e)))
    }

    /// Parses the bytes of `field` as an embedded message.
    ///
    /// Embedded messages are stored opaquely and only parsed when asked for;
    /// parse failures of the nested buffer are returned as is.
    pub fn decode_message(&self, field: FieldNum) -> Result<WireMessage> {
        self.decode_message_with_config(field, &ParseConfig::default())
    }

    /// Parses the bytes of `field` as an embedded message using `config`
    pub fn decode_message_with_config(
        &self,
        field: FieldNum,
        config: &ParseConfig,
    ) -> Result<WireMessage> {
        let bytes = self
            .bytes(field)
            .ok_or_else(|| Error::field_missing(field, ScalarType::Message))?;
        WireMessage::parse_bytes_with_config(bytes.clone(), config)
    }

    // Typed setters replace any other representation of the field

    fn put_varint(&mut self, field: FieldNum, value: Varint) {
        self.fixed32.remove(&field);
        self.fixed64.remove(&field);
        self.bytes.remove(&field);
        self.varint.insert(field, value);
    }

    fn put_fixed32(&mut self, field: FieldNum, value: Fixed32) {
        self.varint.remove(&field);
        self.fixed64.remove(&field);
        self.bytes.remove(&field);
        self.fixed32.insert(field, value);
    }

    fn put_fixed64(&mut self, field: FieldNum, value: Fixed64) {
        self.varint.remove(&field);
        self.fixed32.remove(&field);
        self.bytes.remove(&field);
        self.fixed64.insert(field, value);
    }

    fn put_bytes(&mut self, field: FieldNum, value: Bytes) {
        self.varint.remove(&field);
        self.fixed32.remove(&field);
        self.fixed64.remove(&field);
        self.bytes.insert(field, value);
    }

    // Typed encoding

    /// Encodes `field` as a protobuf `int32`.
    ///
    /// Like every `encode_*` method, this replaces the field's value in
    /// any other bucket.
    pub fn encode_int32(&mut self, field: FieldNum, value: i32) {
        self.put_varint(field, Varint::from_int32(value));
    }

    /// Encodes `field` as a protobuf `int64`
    pub fn encode_int64(&mut self, field: FieldNum, value: i64) {
        self.put_varint(field, Varint::from_int64(value));
    }

    /// Encodes `field` as a protobuf `uint32`
    pub fn encode_uint32(&mut self, field: FieldNum, value: u32) {
        self.put_varint(field, Varint::from_uint32(value));
    }

    /// Encodes `field` as a protobuf `uint64`
    pub fn encode_uint64(&mut self, field: FieldNum, value: u64) {
        self.put_varint(field, Varint::from_uint64(value));
    }

    /// Encodes `field` as a protobuf `sint32`
    pub fn encode_sint32(&mut self, field: FieldNum, value: i32) {
        self.put_varint(field, Varint::from_sint32(value));
    }

    /// Encodes `field` as a protobuf `sint64`
    pub fn encode_sint64(&mut self, field: FieldNum, value: i64) {
        self.put_varint(field, Varint::from_sint64(value));
    }

    /// Encodes `field` as a protobuf `bool`
    pub fn encode_bool(&mut self, field: FieldNum, value: bool) {
        self.put_varint(field, Varint::from_bool(value));
    }

    /// Encodes `field` as a protobuf enum number
    pub fn encode_enum(&mut self, field: FieldNum, value: u64) {
        self.put_varint(field, Varint::from_enum(value));
    }

    /// Encodes `field` as a protobuf `fixed32`
    pub fn encode_fixed32(&mut self, field: FieldNum, value: u32) {
        self.put_fixed32(field, Fixed32::from_fixed32(value));
    }

    /// Encodes `field` as a protobuf `sfixed32`
    pub fn encode_sfixed32(&mut self, field: FieldNum, value: i32) {
        self.put_fixed32(field, Fixed32::from_sfixed32(value));
    }

    /// Encodes `field` as a protobuf `float`
    pub fn encode_float(&mut self, field: FieldNum, value: f32) {
        self.put_fixed32(field, Fixed32::from_float(value));
    }

    /// Encodes `field` as a protobuf `fixed64`
    pub fn encode_fixed64(&mut self, field: FieldNum, value: u64) {
        self.put_fixed64(field, Fixed64::from_fixed64(value));
    }

    /// Encodes `field` as a protobuf `sfixed64`
    pub fn encode_sfixed64(&mut self, field: FieldNum, value: i64) {
        self.put_fixed64(field, Fixed64::from_sfixed64(value));
    }

    /// Encodes `field` as a protobuf `double`
    pub fn encode_double(&mut self, field: FieldNum, value: f64) {
        self.put_fixed64(field, Fixed64::from_double(value));
    }

    /// Encodes `field` as a protobuf `bytes`
    pub fn encode_bytes(&mut self, field: FieldNum, value: impl Into<Bytes>) {
        self.put_bytes(field, value.into());
    }

    /// Encodes `field` as a protobuf `string`
    pub fn encode_string(&mut self, field: FieldNum, value: impl Into<String>) {
        self.put_bytes(field, Bytes::from(value.into()));
    }

    /// Serializes `message` and stores it as the embedded message `field`
    pub fn encode_message(&mut self, field: FieldNum, message: &WireMessage) {
        self.put_bytes(field, Bytes::from(message.marshal()));
    }

    // Serialization

    /// Number of bytes [`marshal`](Self::marshal) produces
    pub fn encoded_len(&self) -> usize {
        let tag_len = |field: FieldNum| encoded_len_varint(u64::from(field) << 3);

        let varints: usize = self
            .varint
            .iter()
            .map(|(&f, v)| tag_len(f) + encoded_len_varint(v.0))
            .sum();
        let fixed32s: usize = self.fixed32.keys().map(|&f| tag_len(f) + 4).sum();
        let fixed64s: usize = self.fixed64.keys().map(|&f| tag_len(f) + 8).sum();
        let bytes: usize = self
            .bytes
            .iter()
            .map(|(&f, b)| tag_len(f) + encoded_len_varint(b.len() as u64) + b.len())
            .sum();

        varints + fixed32s + fixed64s + bytes
    }

    /// Writes every field to `buf`.
    ///
    /// Fields are emitted in ascending field-number order; a field present in
    /// several buckets is emitted once per bucket, in priority order.
    pub fn marshal_to(&self, buf: &mut impl BufMut) {
        for field in self.field_nums() {
            if let Some(v) = self.varint(field) {
                encode_tag(field, WireType::Varint, buf);
                encode_varint(v.0, buf);
            }
            if let Some(v) = self.fixed32(field) {
                encode_tag(field, WireType::I32, buf);
                buf.put_u32_le(v.0);
            }
            if let Some(v) = self.fixed64(field) {
                encode_tag(field, WireType::I64, buf);
                buf.put_u64_le(v.0);
            }
            if let Some(b) = self.bytes(field) {
                encode_tag(field, WireType::Len, buf);
                encode_varint(b.len() as u64, buf);
                buf.put_slice(b);
            }
        }
    }

    /// Serializes the message into a new buffer
    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.marshal_to(&mut buf);
        buf
    }

    /// Moves every field of `other` into `self`, replacing values stored
    /// under the same field number in the same bucket
    pub fn merge_message(&mut self, other: WireMessage) {
        self.varint.extend(other.varint);
        self.fixed32.extend(other.fixed32);
        self.fixed64.extend(other.fixed64);
        self.bytes.extend(other.bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_message() -> WireMessage {
        let mut m = WireMessage::new();
        m.encode_int32(1, 32_423);
        m.encode_int64(2, -98_327);
        m.encode_uint32(3, 1);
        m.encode_uint64(4, 962_329);
        m.encode_sint32(5, -231);
        m.encode_sint64(6, -3_932_764_127);
        m.encode_bool(7, true);
        m.encode_enum(8, 3);
        m.encode_fixed64(9, 342_647_260_612);
        m.encode_sfixed64(10, -324);
        m.encode_double(11, 3.1456);
        m.encode_fixed32(12, 445_545);
        m.encode_sfixed32(13, -30_423);
        m.encode_float(14, 3.227_799);
        m.encode_string(15, "hello");
        m.encode_bytes(16, vec![0xde, 0xad]);
        m
    }

    #[test]
    fn test_typed_accessors() {
        let m = reference_message();
        assert_eq!(m.decode_int32(1), Some(32_423));
        assert_eq!(m.decode_int64(2), Some(-98_327));
        assert_eq!(m.decode_uint32(3), Some(1));
        assert_eq!(m.decode_uint64(4), Some(962_329));
        assert_eq!(m.decode_sint32(5), Some(-231));
        assert_eq!(m.decode_sint64(6), Some(-3_932_764_127));
        assert_eq!(m.decode_bool(7), Some(true));
        assert_eq!(m.decode_enum(8), Some(3));
        assert_eq!(m.decode_fixed64(9), Some(342_647_260_612));
        assert_eq!(m.decode_sfixed64(10), Some(-324));
        assert_eq!(m.decode_double(11), Some(3.1456));
        assert_eq!(m.decode_fixed32(12), Some(445_545));
        assert_eq!(m.decode_sfixed32(13), Some(-30_423));
        assert_eq!(m.decode_float(14), Some(3.227_799));
        assert_eq!(m.decode_string(15).unwrap(), "hello");
        assert_eq!(&m.decode_bytes(16).unwrap()[..], [0xde, 0xad]);
    }

    #[test]
    fn test_accessor_uses_implied_bucket() {
        let m = reference_message();
        // field 9 is a fixed64, so varint and fixed32 views see nothing
        assert_eq!(m.decode_int64(9), None);
        assert_eq!(m.decode_float(9), None);
        assert!(m.decode_string(9).is_err());
    }

    #[test]
    fn test_field_counts() {
        let mut m = reference_message();
        assert_eq!(m.field_count(), 16);
        assert_eq!(m.field_nums(), (1..=16).collect::<Vec<_>>());

        assert!(m.remove(3));
        assert!(!m.remove(3));
        assert_eq!(m.field_count(), 15);

        m.reset();
        assert!(m.is_empty());
        assert!(m.field_nums().is_empty());
    }

    #[test]
    fn test_bucket_priority() {
        let mut m = WireMessage::new();
        m.set_bytes(4, vec![1, 2, 3]);
        m.set_fixed64(4, Fixed64(64));
        m.set_fixed32(4, Fixed32(32));
        assert_eq!(m.field(4), Some(WireField::Fixed32(Fixed32(32))));

        m.set_varint(4, Varint(7));
        assert_eq!(m.field(4), Some(WireField::Varint(Varint(7))));
        assert_eq!(m.field(4).unwrap().wire_type(), WireType::Varint);

        // field_nums does not repeat the ambiguous field
        assert_eq!(m.field_nums(), vec![4]);
        assert_eq!(m.field_count(), 4);

        assert!(m.remove(4));
        assert_eq!(m.field(4), None);
    }

    #[test]
    fn test_typed_encode_replaces_other_bucket() {
        let mut m = WireMessage::new();
        m.encode_string(1, "a");
        m.encode_int32(1, 5);
        assert_eq!(m.field_count(), 1);
        assert_eq!(m.bytes(1), None);
        assert_eq!(m.marshal(), [0x08, 0x05]);

        m.encode_double(1, 1.0);
        m.encode_fixed32(1, 2);
        assert_eq!(m.field_count(), 1);
        assert_eq!(m.field(1), Some(WireField::Fixed32(Fixed32(2))));

        m.encode_message(1, &WireMessage::new());
        assert_eq!(m.field_count(), 1);
        assert_eq!(m.marshal(), [0x0a, 0x00]);
    }

    #[test]
    fn test_raw_setters_only_touch_their_bucket() {
        let mut m = WireMessage::new();
        m.encode_string(1, "a");
        m.set_varint(1, Varint(5));
        assert_eq!(m.field_count(), 2);
        assert_eq!(m.marshal(), [0x08, 0x05, 0x0a, 0x01, b'a']);
    }

    #[test]
    fn test_marshal_known_bytes() {
        let mut m = WireMessage::new();
        m.encode_bool(1, true);
        m.encode_int64(2, 10);
        assert_eq!(m.marshal(), [0x08, 0x01, 0x10, 0x0a]);

        let mut m = WireMessage::new();
        m.encode_fixed32(1, 1);
        m.encode_string(2, "hi");
        m.encode_sfixed64(3, -1);
        assert_eq!(
            m.marshal(),
            [
                0x0d, 0x01, 0x00, 0x00, 0x00, // field 1, I32
                0x12, 0x02, b'h', b'i', // field 2, LEN
                0x19, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, // field 3, I64
            ]
        );
    }

    #[test]
    fn test_marshal_orders_by_field_number() {
        let mut m = WireMessage::new();
        m.encode_string(1, "a");
        m.encode_int32(3, 3);
        m.encode_float(2, 0.0);
        assert_eq!(
            m.marshal(),
            [0x0a, 0x01, b'a', 0x15, 0x00, 0x00, 0x00, 0x00, 0x18, 0x03]
        );
    }

    #[test]
    fn test_encoded_len_matches_marshal() {
        let m = reference_message();
        assert_eq!(m.encoded_len(), m.marshal().len());
        assert_eq!(WireMessage::new().encoded_len(), 0);
    }

    #[test]
    fn test_negative_int32_is_ten_bytes() {
        let mut m = WireMessage::new();
        m.encode_int32(1, -1);
        let bytes = m.marshal();
        assert_eq!(bytes.len(), 11);
        assert_eq!(bytes[0], 0x08);
    }

    #[test]
    fn test_nested_message() {
        let mut inner = WireMessage::new();
        inner.encode_sint32(1, -5);
        inner.encode_string(2, "inner");

        let mut outer = WireMessage::new();
        outer.encode_message(5, &inner);
        outer.encode_bool(6, false);

        let decoded = outer.decode_message(5).unwrap();
        assert_eq!(decoded, inner);
        assert_eq!(decoded.decode_sint32(1), Some(-5));

        assert!(matches!(
            outer.decode_message(7),
            Err(Error::FieldMissing { field: 7, scalar: ScalarType::Message })
        ));
    }

    #[test]
    fn test_invalid_utf8_string() {
        let mut m = WireMessage::new();
        m.set_bytes(1, vec![0xff, 0xfe]);
        assert!(matches!(
            m.decode_string(1),
            Err(Error::InvalidType { field: Some(1), .. })
        ));
        assert_eq!(&m.decode_bytes(1).unwrap()[..], [0xff, 0xfe]);
    }

    #[test]
    fn test_merge_message() {
        let mut a = WireMessage::new();
        a.encode_int32(1, 1);
        a.encode_int32(2, 2);
        let mut b = WireMessage::new();
        b.encode_int32(2, 20);
        b.encode_string(3, "three");

        a.merge_message(b);
        assert_eq!(a.decode_int32(1), Some(1));
        assert_eq!(a.decode_int32(2), Some(20));
        assert_eq!(a.decode_string(3).unwrap(), "three");
    }
}
