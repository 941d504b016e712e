//! # dynwire-core
//!
//! Schema-less encoding and decoding of the Protocol Buffers wire format.
//!
//! This crate provides:
//! - Parsing an arbitrary protobuf buffer into its raw fields without a schema
//! - Reinterpreting raw fields as protobuf scalar types (integers, zig-zag
//!   integers, bools, floats, strings, bytes and nested messages)
//! - Serializing raw or typed fields back into wire bytes
//! - Bulk encoding and decoding against a schema supplied at runtime
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`wire`]: Wire types, varint codec and the value carriers
//! - [`message`]: The [`WireMessage`] container, parser and serializer
//! - [`scalar`]: Scalar type tags and dynamically typed values
//! - [`field_map`]: Runtime field-to-type associations
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```
//! use dynwire_core::{ScalarType, Value, WireMessage};
//!
//! let mut m = WireMessage::new();
//! m.encode_as(1, &Value::Bool(true), ScalarType::Bool)?;
//! m.encode_as(2, &Value::I64(10), ScalarType::Int64)?;
//! let bytes = m.marshal();
//!
//! let m = dynwire_core::unmarshal(&bytes)?;
//! assert_eq!(m.decode_as(1, ScalarType::Bool)?, Value::Bool(true));
//! assert_eq!(m.decode_as(2, ScalarType::Int64)?, Value::I64(10));
//! # Ok::<(), dynwire_core::Error>(())
//! ```
//!
//! ## Concurrency
//!
//! Every operation runs synchronously on the caller's thread. Messages and
//! field maps carry no internal locking; share them immutably or guard
//! mutation externally.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod error;
pub mod field_map;
pub mod message;
pub mod scalar;
pub mod wire;

// Re-export primary types for convenience
pub use error::{Error, Result};
pub use field_map::{Decoded, FieldMap};
pub use message::{ParseConfig, WireField, WireMessage};
pub use scalar::{FieldValue, ScalarType, Value};
pub use wire::{Fixed32, Fixed64, Varint, WireType, MAX_FIELD_NUMBER};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A protobuf field number
pub type FieldNum = u32;

/// Parses `buf` into a new [`WireMessage`]
pub fn unmarshal(buf: &[u8]) -> Result<WireMessage> {
    WireMessage::parse(buf)
}
