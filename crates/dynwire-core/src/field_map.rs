//! Runtime field-number to scalar-type associations.
//!
//! A [`FieldMap`] stands in for a compiled schema: it tells the codec which
//! scalar type each field number holds, so whole messages can be decoded or
//! encoded without per-field call sites.
//!
//! Decoding is permissive. Fields without an association are skipped, and a
//! field that fails to decode does not stop the others; the first failure is
//! reported next to everything that did decode. Encoding is strict and stops
//! at the first failure, since half a buffer is not a usable result.
//!
//! ## Example
//!
//! ```
//! use dynwire_core::{FieldMap, FieldValue, ScalarType, Value};
//!
//! // message LightStatus {
//! //     bool  status    = 1;
//! //     int64 intensity = 2;
//! // }
//! let mut fm = FieldMap::new();
//! assert!(fm.add(1, ScalarType::Bool));
//! assert!(fm.add(2, ScalarType::Int64));
//!
//! let values = [FieldValue::new(1, true), FieldValue::new(2, 10i64)];
//! let bytes = fm.encode_buffer(&values)?;
//! assert_eq!(bytes, [0x08, 0x01, 0x10, 0x0a]);
//!
//! let decoded = fm.decode_buffer(&bytes)?.into_result()?;
//! assert_eq!(decoded[0].value, Value::Bool(true));
//! assert_eq!(decoded[1].value, Value::I64(10));
//! # Ok::<(), dynwire_core::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::message::{ParseConfig, WireMessage};
use crate::scalar::{FieldValue, ScalarType};
use crate::FieldNum;
use prost::Message;
use prost_types::DescriptorProto;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// The outcome of a bulk decode: every value that decoded, plus the first
/// per-field error if any field failed
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// Successfully decoded fields, in ascending field-number order
    pub values: Vec<FieldValue>,
    /// The first error encountered, if any
    pub first_error: Option<Error>,
}

impl Decoded {
    /// Returns true if every associated field decoded
    pub fn is_complete(&self) -> bool {
        self.first_error.is_none()
    }

    /// Converts into a `Result`, discarding partial values on error
    pub fn into_result(self) -> Result<Vec<FieldValue>> {
        match self.first_error {
            Some(err) => Err(err),
            None => Ok(self.values),
        }
    }
}

/// Association from field number to scalar type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    fields: BTreeMap<FieldNum, ScalarType>,
}

impl FieldMap {
    /// Creates an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from a message descriptor supplied at runtime.
    ///
    /// Fields whose type is unset, unknown or has no wire type mapping
    /// (groups) are left out.
    pub fn from_descriptor(descriptor: &DescriptorProto) -> Self {
        let mut map = Self::new();

        for field in &descriptor.field {
            let Ok(number) = FieldNum::try_from(field.number()) else {
                debug!("Skipping field '{}': negative number", field.name());
                continue;
            };

            match field.r#type.map(ScalarType::try_from) {
                Some(Ok(scalar)) => {
                    if !map.add(number, scalar) {
                        debug!(
                            "Skipping field '{}' ({}): {} is unmapped",
                            field.name(),
                            number,
                            scalar
                        );
                    }
                }
                Some(Err(e)) => {
                    debug!("Skipping field '{}' ({}): {}", field.name(), number, e);
                }
                None => {
                    debug!("Skipping field '{}' ({}): no type", field.name(), number);
                }
            }
        }

        map
    }

    /// Builds a map from an encoded `DescriptorProto`
    pub fn from_descriptor_bytes(buf: &[u8]) -> Result<Self> {
        let descriptor = DescriptorProto::decode(buf)?;
        Ok(Self::from_descriptor(&descriptor))
    }

    /// Associates `field` with `scalar`, replacing any previous association.
    ///
    /// Returns false and leaves the map unchanged if `scalar` has no wire
    /// type mapping.
    pub fn add(&mut self, field: FieldNum, scalar: ScalarType) -> bool {
        if !scalar.is_mapped() {
            return false;
        }
        self.fields.insert(field, scalar);
        true
    }

    /// Removes the association for `field`. Returns true if one existed.
    pub fn remove_by_field(&mut self, field: FieldNum) -> bool {
        self.fields.remove(&field).is_some()
    }

    /// Removes every association with `scalar`. Returns true if any existed.
    pub fn remove_by_type(&mut self, scalar: ScalarType) -> bool {
        let before = self.fields.len();
        self.fields.retain(|_, ty| *ty != scalar);
        self.fields.len() != before
    }

    /// The scalar type associated with `field`
    pub fn get(&self, field: FieldNum) -> Option<ScalarType> {
        self.fields.get(&field).copied()
    }

    /// Number of associations
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no associations
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the associations in ascending field-number order
    pub fn iter(&self) -> impl Iterator<Item = (FieldNum, ScalarType)> + '_ {
        self.fields.iter().map(|(&f, &ty)| (f, ty))
    }

    /// Decodes every associated field present in `message`.
    ///
    /// Fields without an association are skipped. A field that fails to
    /// decode is skipped too; the first such error is kept in
    /// [`Decoded::first_error`].
    pub fn decode_message(&self, message: &WireMessage) -> Decoded {
        self.decode_message_with_config(message, &ParseConfig::default())
    }

    /// Like [`decode_message`](Self::decode_message), parsing nested
    /// messages with `config`
    pub fn decode_message_with_config(
        &self,
        message: &WireMessage,
        config: &ParseConfig,
    ) -> Decoded {
        let mut values = Vec::new();
        let mut first_error = None;

        for field in message.field_nums() {
            let Some(scalar) = self.get(field) else {
                continue;
            };

            match message.decode_as_with_config(field, scalar, config) {
                Ok(value) => values.push(FieldValue { field, value }),
                Err(e) => {
                    if e.is_recoverable() {
                        debug!("Failed to decode field {} as {}: {}", field, scalar, e);
                    } else {
                        warn!("Malformed nested message in field {}: {}", field, e);
                    }
                    first_error.get_or_insert(e);
                }
            }
        }

        Decoded {
            values,
            first_error,
        }
    }

    /// Parses `buf` and decodes it with [`decode_message`](Self::decode_message).
    ///
    /// # Errors
    ///
    /// A buffer that fails to parse returns its error with no partial values.
    pub fn decode_buffer(&self, buf: &[u8]) -> Result<Decoded> {
        self.decode_buffer_with_config(buf, &ParseConfig::default())
    }

    /// Like [`decode_buffer`](Self::decode_buffer) with a custom parse config
    pub fn decode_buffer_with_config(&self, buf: &[u8], config: &ParseConfig) -> Result<Decoded> {
        let message = WireMessage::parse_with_config(buf, config)?;
        Ok(self.decode_message_with_config(&message, config))
    }

    /// Encodes `values` into a new message using the associated types.
    ///
    /// # Errors
    ///
    /// Fails on the first field without an association or whose value does
    /// not match its type.
    pub fn encode_message(&self, values: &[FieldValue]) -> Result<WireMessage> {
        let mut message = WireMessage::new();

        for FieldValue { field, value } in values {
            let scalar = self
                .get(*field)
                .ok_or_else(|| Error::invalid_type(*field, "no type association for field"))?;
            message.encode_as(*field, value, scalar)?;
        }

        Ok(message)
    }

    /// Encodes `values` into wire bytes using the associated types
    pub fn encode_buffer(&self, values: &[FieldValue]) -> Result<Vec<u8>> {
        self.encode_message(values).map(|m| m.marshal())
    }
}
