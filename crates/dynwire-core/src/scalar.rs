//! Protobuf scalar types and dynamically typed field values.
//!
//! [`ScalarType`] names a logical protobuf type using the numbering of
//! `google.protobuf.FieldDescriptorProto.Type`. Each type maps to at most one
//! physical [`WireType`]; the mapping is a `const fn` and never changes at
//! runtime. `group` is the only type without a mapping, and is rejected
//! wherever a wire type is needed.
//!
//! [`Value`] carries the native Rust value for a field. Several scalar types
//! share a native type (`int32`, `sint32` and `sfixed32` all carry an
//! [`i32`]), so the scalar type chosen at encode time decides the wire
//! representation, not the value variant.

use crate::error::{Error, Result};
use crate::message::WireMessage;
use crate::wire::WireType;
use crate::FieldNum;
use bytes::Bytes;
use prost_types::field_descriptor_proto::Type as DescriptorType;
use std::fmt;
use std::str::FromStr;

/// A logical protobuf field type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i32)]
pub enum ScalarType {
    /// IEEE-754 double, fixed64 wire type
    Double = 1,
    /// IEEE-754 single, fixed32 wire type
    Float = 2,
    /// Signed 64-bit varint
    Int64 = 3,
    /// Unsigned 64-bit varint
    Uint64 = 4,
    /// Signed 32-bit varint, sign-extended to 64 bits on the wire
    Int32 = 5,
    /// Unsigned 64-bit fixed-width
    Fixed64 = 6,
    /// Unsigned 32-bit fixed-width
    Fixed32 = 7,
    /// Boolean varint
    Bool = 8,
    /// UTF-8 text, length-delimited
    String = 9,
    /// Deprecated group; has no wire type mapping
    Group = 10,
    /// Embedded message, length-delimited
    Message = 11,
    /// Raw bytes, length-delimited
    Bytes = 12,
    /// Unsigned 32-bit varint
    Uint32 = 13,
    /// Enum number as a plain varint
    Enum = 14,
    /// Signed 32-bit fixed-width
    Sfixed32 = 15,
    /// Signed 64-bit fixed-width
    Sfixed64 = 16,
    /// Zig-zag encoded signed 32-bit varint
    Sint32 = 17,
    /// Zig-zag encoded signed 64-bit varint
    Sint64 = 18,
}

impl ScalarType {
    /// Every scalar type, in descriptor numbering order
    pub const ALL: [ScalarType; 18] = [
        ScalarType::Double,
        ScalarType::Float,
        ScalarType::Int64,
        ScalarType::Uint64,
        ScalarType::Int32,
        ScalarType::Fixed64,
        ScalarType::Fixed32,
        ScalarType::Bool,
        ScalarType::String,
        ScalarType::Group,
        ScalarType::Message,
        ScalarType::Bytes,
        ScalarType::Uint32,
        ScalarType::Enum,
        ScalarType::Sfixed32,
        ScalarType::Sfixed64,
        ScalarType::Sint32,
        ScalarType::Sint64,
    ];

    /// The physical wire type this scalar type is stored as, or `None` for
    /// types the codec cannot represent
    pub const fn wire_type(self) -> Option<WireType> {
        match self {
            ScalarType::Int32
            | ScalarType::Int64
            | ScalarType::Uint32
            | ScalarType::Uint64
            | ScalarType::Sint32
            | ScalarType::Sint64
            | ScalarType::Bool
            | ScalarType::Enum => Some(WireType::Varint),
            ScalarType::Fixed64 | ScalarType::Sfixed64 | ScalarType::Double => {
                Some(WireType::I64)
            }
            ScalarType::String | ScalarType::Bytes | ScalarType::Message => Some(WireType::Len),
            ScalarType::Fixed32 | ScalarType::Sfixed32 | ScalarType::Float => {
                Some(WireType::I32)
            }
            ScalarType::Group => None,
        }
    }

    /// Returns true if the type has a wire type mapping
    pub const fn is_mapped(self) -> bool {
        self.wire_type().is_some()
    }

    /// The `.proto` keyword for this type
    pub const fn name(self) -> &'static str {
        match self {
            ScalarType::Double => "double",
            ScalarType::Float => "float",
            ScalarType::Int64 => "int64",
            ScalarType::Uint64 => "uint64",
            ScalarType::Int32 => "int32",
            ScalarType::Fixed64 => "fixed64",
            ScalarType::Fixed32 => "fixed32",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
            ScalarType::Group => "group",
            ScalarType::Message => "message",
            ScalarType::Bytes => "bytes",
            ScalarType::Uint32 => "uint32",
            ScalarType::Enum => "enum",
            ScalarType::Sfixed32 => "sfixed32",
            ScalarType::Sfixed64 => "sfixed64",
            ScalarType::Sint32 => "sint32",
            ScalarType::Sint64 => "sint64",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarType {
    type Err = Error;

    /// Looks up a type by its `.proto` keyword, e.g. `"int64"`
    fn from_str(s: &str) -> Result<Self> {
        ScalarType::ALL
            .into_iter()
            .find(|ty| ty.name() == s)
            .ok_or_else(|| Error::unknown_type(format!("unknown type name '{}'", s)))
    }
}

impl TryFrom<i32> for ScalarType {
    type Error = Error;

    /// Converts a raw `FieldDescriptorProto.Type` number
    fn try_from(value: i32) -> Result<Self> {
        DescriptorType::try_from(value)
            .map(ScalarType::from)
            .map_err(|_| Error::unknown_type(format!("unknown descriptor type number {}", value)))
    }
}

impl From<DescriptorType> for ScalarType {
    fn from(value: DescriptorType) -> Self {
        match value {
            DescriptorType::Double => ScalarType::Double,
            DescriptorType::Float => ScalarType::Float,
            DescriptorType::Int64 => ScalarType::Int64,
            DescriptorType::Uint64 => ScalarType::Uint64,
            DescriptorType::Int32 => ScalarType::Int32,
            DescriptorType::Fixed64 => ScalarType::Fixed64,
            DescriptorType::Fixed32 => ScalarType::Fixed32,
            DescriptorType::Bool => ScalarType::Bool,
            DescriptorType::String => ScalarType::String,
            DescriptorType::Group => ScalarType::Group,
            DescriptorType::Message => ScalarType::Message,
            DescriptorType::Bytes => ScalarType::Bytes,
            DescriptorType::Uint32 => ScalarType::Uint32,
            DescriptorType::Enum => ScalarType::Enum,
            DescriptorType::Sfixed32 => ScalarType::Sfixed32,
            DescriptorType::Sfixed64 => ScalarType::Sfixed64,
            DescriptorType::Sint32 => ScalarType::Sint32,
            DescriptorType::Sint64 => ScalarType::Sint64,
        }
    }
}

/// A dynamically typed field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `bool`
    Bool(bool),
    /// `int32`, `sint32`, `sfixed32`
    I32(i32),
    /// `int64`, `sint64`, `sfixed64`
    I64(i64),
    /// `uint32`, `fixed32`
    U32(u32),
    /// `uint64`, `fixed64`, `enum`
    U64(u64),
    /// `float`
    F32(f32),
    /// `double`
    F64(f64),
    /// `string`
    String(String),
    /// `bytes`
    Bytes(Bytes),
    /// Embedded message
    Message(WireMessage),
}

impl Value {
    /// Short name of the native type carried, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Message(_) => "message",
        }
    }

    /// The native value kind a scalar type decodes to and accepts on encode
    pub fn kind_for(scalar: ScalarType) -> Option<&'static str> {
        let kind = match scalar {
            ScalarType::Bool => "bool",
            ScalarType::Int32 | ScalarType::Sint32 | ScalarType::Sfixed32 => "i32",
            ScalarType::Int64 | ScalarType::Sint64 | ScalarType::Sfixed64 => "i64",
            ScalarType::Uint32 | ScalarType::Fixed32 => "u32",
            ScalarType::Uint64 | ScalarType::Fixed64 | ScalarType::Enum => "u64",
            ScalarType::Float => "f32",
            ScalarType::Double => "f64",
            ScalarType::String => "string",
            ScalarType::Bytes => "bytes",
            ScalarType::Message => "message",
            ScalarType::Group => return None,
        };
        Some(kind)
    }

    /// Returns the boolean, if this is a `Bool`
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the value widened to `i64`, if this is a signed integer
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I32(i) => Some(i64::from(i)),
            Value::I64(i) => Some(i),
            _ => None,
        }
    }

    /// Returns the value widened to `u64`, if this is an unsigned integer
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U32(i) => Some(u64::from(i)),
            Value::U64(i) => Some(i),
            _ => None,
        }
    }

    /// Returns the text, if this is a `String`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the raw bytes, if this is `Bytes`
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(&b[..]),
            _ => None,
        }
    }

    /// Returns the embedded message, if this is a `Message`
    pub fn as_message(&self) -> Option<&WireMessage> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::I32(i) => write!(f, "{}", i),
            Value::I64(i) => write!(f, "{}", i),
            Value::U32(i) => write!(f, "{}", i),
            Value::U64(i) => write!(f, "{}", i),
            Value::F32(x) => write!(f, "{}", x),
            Value::F64(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Bytes(b) => write!(f, "{:02x?}", &b[..]),
            Value::Message(m) => write!(f, "<message with {} fields>", m.field_count()),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i32 => I32,
    i64 => I64,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
    Bytes => Bytes,
    WireMessage => Message,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(v))
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(Bytes::copy_from_slice(v))
    }
}

/// A decoded field: its number and typed value
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    /// Field number
    pub field: FieldNum,
    /// Decoded value
    pub value: Value,
}

impl FieldValue {
    /// Creates a new field value
    pub fn new(field: FieldNum, value: impl Into<Value>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}
