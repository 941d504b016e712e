//! Wire-level value carriers.
//!
//! A carrier holds the raw bits of one field as they appear on the wire and
//! exposes lossless views of them as protobuf scalar types. Views never
//! validate: every bit pattern is accepted and reinterpreted by truncation,
//! sign reinterpretation, zig-zag or IEEE-754 bit casting.

/// Payload of a varint-wiretype field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Varint(pub u64);

/// Payload of a fixed32-wiretype field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Fixed32(pub u32);

/// Payload of a fixed64-wiretype field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Fixed64(pub u64);

impl Varint {
    /// The value as a protobuf `int32` (truncating)
    pub fn as_int32(self) -> i32 {
        self.0 as i32
    }

    /// The value as a protobuf `int64`
    pub fn as_int64(self) -> i64 {
        self.0 as i64
    }

    /// The value as a protobuf `uint32` (truncating)
    pub fn as_uint32(self) -> u32 {
        self.0 as u32
    }

    /// The value as a protobuf `uint64`
    pub fn as_uint64(self) -> u64 {
        self.0
    }

    /// The value as a zig-zag encoded protobuf `sint32`
    pub fn as_sint32(self) -> i32 {
        let v = self.0 as u32;
        ((v >> 1) as i32) ^ -((v & 1) as i32)
    }

    /// The value as a zig-zag encoded protobuf `sint64`
    pub fn as_sint64(self) -> i64 {
        ((self.0 >> 1) as i64) ^ -((self.0 & 1) as i64)
    }

    /// The value as a protobuf `bool`; any nonzero value is true
    pub fn as_bool(self) -> bool {
        self.0 != 0
    }

    /// The value as a protobuf enum number, with no symbolic mapping
    pub fn as_enum(self) -> u64 {
        self.0
    }

    /// Negative values sign-extend to ten bytes on the wire, as protobuf
    /// `int32` requires.
    pub fn from_int32(i: i32) -> Self {
        Self(i64::from(i) as u64)
    }

    /// Encodes a protobuf `int64`
    pub fn from_int64(i: i64) -> Self {
        Self(i as u64)
    }

    /// Encodes a protobuf `uint32`
    pub fn from_uint32(i: u32) -> Self {
        Self(u64::from(i))
    }

    /// Encodes a protobuf `uint64`
    pub fn from_uint64(i: u64) -> Self {
        Self(i)
    }

    /// Zig-zag encodes a protobuf `sint32`
    pub fn from_sint32(i: i32) -> Self {
        Self(u64::from(((i << 1) ^ (i >> 31)) as u32))
    }

    /// Zig-zag encodes a protobuf `sint64`
    pub fn from_sint64(i: i64) -> Self {
        Self(((i << 1) ^ (i >> 63)) as u64)
    }

    /// Encodes a protobuf `bool` as 1 or 0
    pub fn from_bool(b: bool) -> Self {
        Self(u64::from(b))
    }

    /// Encodes a protobuf enum number
    pub fn from_enum(i: u64) -> Self {
        Self(i)
    }
}

impl Fixed32 {
    /// The value as a protobuf `fixed32`
    pub fn as_fixed32(self) -> u32 {
        self.0
    }

    /// The value as a protobuf `sfixed32`
    pub fn as_sfixed32(self) -> i32 {
        self.0 as i32
    }

    /// The bits reinterpreted as an IEEE-754 single
    pub fn as_float(self) -> f32 {
        f32::from_bits(self.0)
    }

    /// Encodes a protobuf `fixed32`
    pub fn from_fixed32(i: u32) -> Self {
        Self(i)
    }

    /// Encodes a protobuf `sfixed32`
    pub fn from_sfixed32(i: i32) -> Self {
        Self(i as u32)
    }

    /// Stores the IEEE-754 bit pattern of `f` unchanged, NaN payloads included
    pub fn from_float(f: f32) -> Self {
        Self(f.to_bits())
    }
}

impl Fixed64 {
    /// The value as a protobuf `fixed64`
    pub fn as_fixed64(self) -> u64 {
        self.0
    }

    /// The value as a protobuf `sfixed64`
    pub fn as_sfixed64(self) -> i64 {
        self.0 as i64
    }

    /// The bits reinterpreted as an IEEE-754 double
    pub fn as_double(self) -> f64 {
        f64::from_bits(self.0)
    }

    /// Encodes a protobuf `fixed64`
    pub fn from_fixed64(i: u64) -> Self {
        Self(i)
    }

    /// Encodes a protobuf `sfixed64`
    pub fn from_sfixed64(i: i64) -> Self {
        Self(i as u64)
    }

    /// Stores the IEEE-754 bit pattern of `f` unchanged, NaN payloads included
    pub fn from_double(f: f64) -> Self {
        Self(f.to_bits())
    }
}

impl From<u64> for Varint {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<u32> for Fixed32 {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<u64> for Fixed64 {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
