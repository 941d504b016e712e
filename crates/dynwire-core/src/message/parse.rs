//! Parsing raw buffers into a [`WireMessage`].
//!
//! ## Algorithm Overview
//!
//! 1. Read a varint tag; a buffer that ends exactly here ends the message
//! 2. Split the tag into field number (`tag >> 3`) and wire type (`tag & 7`)
//! 3. Read the payload the wire type calls for and store it in its bucket
//! 4. Count start/end group markers and require them to balance at the end
//!
//! Length-delimited payloads are kept opaque. Whether they hold a string,
//! bytes or an embedded message is only decided when the caller asks for a
//! type, so nested messages are parsed lazily.
//!
//! Unknown wire types (6 and 7) are skipped by default without consuming any
//! payload. A payload following such a tag is then read as the next tag,
//! which can desynchronise the rest of the parse;
//! [`ParseConfig::strict_wire_types`] turns the skip into an error instead.

use super::WireMessage;
use crate::error::{Error, Result};
use crate::wire::{
    decode_tag, Fixed32, Fixed64, Varint, WireReader, WireType, MAX_FIELD_NUMBER,
};
use bytes::Bytes;
use tracing::{debug, trace};

/// Configuration for parsing
#[derive(Debug, Clone, Default)]
pub struct ParseConfig {
    /// Fail on unknown wire types instead of skipping their tag
    pub strict_wire_types: bool,
}

impl ParseConfig {
    /// Creates a new parse config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether unknown wire types are an error
    pub fn strict_wire_types(mut self, strict: bool) -> Self {
        self.strict_wire_types = strict;
        self
    }
}

impl WireMessage {
    /// Parses `buf` into a new message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBuffer`] if a tag, length prefix or payload
    /// runs past the end of the buffer, or if start/end groups do not
    /// balance.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        Self::parse_with_config(buf, &ParseConfig::default())
    }

    /// Parses `buf` into a new message using `config`
    pub fn parse_with_config(buf: &[u8], config: &ParseConfig) -> Result<Self> {
        Self::parse_bytes_with_config(Bytes::copy_from_slice(buf), config)
    }

    /// Parses an owned buffer. Length-delimited fields share `buf`'s
    /// allocation instead of being copied.
    pub fn parse_bytes(buf: Bytes) -> Result<Self> {
        Self::parse_bytes_with_config(buf, &ParseConfig::default())
    }

    /// Parses an owned buffer using `config`
    pub fn parse_bytes_with_config(buf: Bytes, config: &ParseConfig) -> Result<Self> {
        let mut message = Self::new();
        message.read_fields(&buf, config)?;
        Ok(message)
    }

    /// Parses `buf` and merges its fields into `self`.
    ///
    /// On error `self` is left untouched.
    pub fn merge(&mut self, buf: &[u8]) -> Result<()> {
        self.merge_with_config(buf, &ParseConfig::default())
    }

    /// Parses `buf` using `config` and merges its fields into `self`
    pub fn merge_with_config(&mut self, buf: &[u8], config: &ParseConfig) -> Result<()> {
        let parsed = Self::parse_with_config(buf, config)?;
        self.merge_message(parsed);
        Ok(())
    }

    fn read_fields(&mut self, data: &Bytes, config: &ParseConfig) -> Result<()> {
        let mut reader = WireReader::new(data);
        let mut depth: i64 = 0;

        while !reader.is_empty() {
            let offset = reader.position();
            let tag = reader.read_varint()?;
            let (field, wire) = decode_tag(tag);
            if field == 0 || field > MAX_FIELD_NUMBER {
                debug!("Field number {} at offset {} is out of range", field, offset);
            }

            match WireType::try_from(wire) {
                Ok(WireType::Varint) => {
                    let value = reader.read_varint()?;
                    trace!("{}: field {} varint {}", offset, field, value);
                    self.set_varint(field, Varint(value));
                }
                Ok(WireType::I64) => {
                    let value = reader.read_fixed64()?;
                    trace!("{}: field {} fixed64 {}", offset, field, value);
                    self.set_fixed64(field, Fixed64(value));
                }
                Ok(WireType::Len) => {
                    let len = reader.read_length_delimited()?.len();
                    let end = reader.position();
                    trace!("{}: field {} bytes [{}]", offset, field, len);
                    self.set_bytes(field, data.slice(end - len..end));
                }
                Ok(WireType::I32) => {
                    let value = reader.read_fixed32()?;
                    trace!("{}: field {} fixed32 {}", offset, field, value);
                    self.set_fixed32(field, Fixed32(value));
                }
                Ok(WireType::StartGroup) => {
                    depth += 1;
                    trace!("{}: field {} start group (depth {})", offset, field, depth);
                }
                Ok(WireType::EndGroup) => {
                    depth -= 1;
                    trace!("{}: field {} end group (depth {})", offset, field, depth);
                }
                Err(_) if config.strict_wire_types => {
                    return Err(Error::malformed(
                        offset,
                        format!("unknown wire type {} for field {}", wire, field),
                    ));
                }
                Err(_) => {
                    debug!(
                        "Skipping unknown wire type {} for field {} at offset {}",
                        wire, field, offset
                    );
                }
            }
        }

        if depth != 0 {
            return Err(Error::malformed(
                reader.position(),
                format!("unbalanced start/end groups (depth {} at end of buffer)", depth),
            ));
        }

        debug!(
            "Parsed {} fields from {} bytes",
            self.field_count(),
            data.len()
        );
        Ok(())
    }
}
