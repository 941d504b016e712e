//! Encoding and decoding fields "as" a scalar type chosen at runtime.

use super::{ParseConfig, WireMessage};
use crate::error::{Error, Result};
use crate::scalar::{ScalarType, Value};
use crate::FieldNum;

impl WireMessage {
    /// Decodes `field` as `scalar`.
    ///
    /// The field is looked up only in the bucket `scalar` maps to, so a
    /// varint field requested as `double` is missing rather than
    /// reinterpreted.
    ///
    /// # Errors
    ///
    /// - [`Error::FieldMissing`] if the bucket has no value for `field`
    /// - [`Error::InvalidType`] if `scalar` has no wire type mapping, or a
    ///   `string` field is not UTF-8
    /// - any parse error of the nested buffer when `scalar` is `message`
    pub fn decode_as(&self, field: FieldNum, scalar: ScalarType) -> Result<Value> {
        self.decode_as_with_config(field, scalar, &ParseConfig::default())
    }

    /// Like [`decode_as`](Self::decode_as), parsing nested messages with
    /// `config`
    pub fn decode_as_with_config(
        &self,
        field: FieldNum,
        scalar: ScalarType,
        config: &ParseConfig,
    ) -> Result<Value> {
        let missing = || Error::field_missing(field, scalar);

        let value = match scalar {
            ScalarType::Int32 => Value::I32(self.decode_int32(field).ok_or_else(missing)?),
            ScalarType::Int64 => Value::I64(self.decode_int64(field).ok_or_else(missing)?),
            ScalarType::Uint32 => Value::U32(self.decode_uint32(field).ok_or_else(missing)?),
            ScalarType::Uint64 => Value::U64(self.decode_uint64(field).ok_or_else(missing)?),
            ScalarType::Sint32 => Value::I32(self.decode_sint32(field).ok_or_else(missing)?),
            ScalarType::Sint64 => Value::I64(self.decode_sint64(field).ok_or_else(missing)?),
            ScalarType::Bool => Value::Bool(self.decode_bool(field).ok_or_else(missing)?),
            ScalarType::Enum => Value::U64(self.decode_enum(field).ok_or_else(missing)?),
            ScalarType::Fixed32 => Value::U32(self.decode_fixed32(field).ok_or_else(missing)?),
            ScalarType::Sfixed32 => Value::I32(self.decode_sfixed32(field).ok_or_else(missing)?),
            ScalarType::Float => Value::F32(self.decode_float(field).ok_or_else(missing)?),
            ScalarType::Fixed64 => Value::U64(self.decode_fixed64(field).ok_or_else(missing)?),
            ScalarType::Sfixed64 => Value::I64(self.decode_sfixed64(field).ok_or_else(missing)?),
            ScalarType::Double => Value::F64(self.decode_double(field).ok_or_else(missing)?),
            ScalarType::Bytes => Value::Bytes(self.decode_bytes(field).ok_or_else(missing)?),
            ScalarType::String => Value::String(self.decode_string(field)?),
            ScalarType::Message => {
                Value::Message(self.decode_message_with_config(field, config)?)
            }
            ScalarType::Group => return Err(unmapped(field, scalar)),
        };

        Ok(value)
    }

    /// Encodes `value` into `field` as `scalar`.
    ///
    /// The value's native type must be the one `scalar` decodes to (see
    /// [`Value::kind_for`]); no numeric conversion is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidType`] if `scalar` has no wire type mapping or
    /// `value` has the wrong native type. The message is unchanged on error.
    pub fn encode_as(&mut self, field: FieldNum, value: &Value, scalar: ScalarType) -> Result<()> {
        match (scalar, value) {
            (ScalarType::Int32, &Value::I32(v)) => self.encode_int32(field, v),
            (ScalarType::Int64, &Value::I64(v)) => self.encode_int64(field, v),
            (ScalarType::Uint32, &Value::U32(v)) => self.encode_uint32(field, v),
            (ScalarType::Uint64, &Value::U64(v)) => self.encode_uint64(field, v),
            (ScalarType::Sint32, &Value::I32(v)) => self.encode_sint32(field, v),
            (ScalarType::Sint64, &Value::I64(v)) => self.encode_sint64(field, v),
            (ScalarType::Bool, &Value::Bool(v)) => self.encode_bool(field, v),
            (ScalarType::Enum, &Value::U64(v)) => self.encode_enum(field, v),
            (ScalarType::Fixed32, &Value::U32(v)) => self.encode_fixed32(field, v),
            (ScalarType::Sfixed32, &Value::I32(v)) => self.encode_sfixed32(field, v),
            (ScalarType::Float, &Value::F32(v)) => self.encode_float(field, v),
            (ScalarType::Fixed64, &Value::U64(v)) => self.encode_fixed64(field, v),
            (ScalarType::Sfixed64, &Value::I64(v)) => self.encode_sfixed64(field, v),
            (ScalarType::Double, &Value::F64(v)) => self.encode_double(field, v),
            (ScalarType::Bytes, Value::Bytes(b)) => self.encode_bytes(field, b.clone()),
            (ScalarType::String, Value::String(s)) => self.encode_string(field, s.as_str()),
            (ScalarType::Message, Value::Message(m)) => self.encode_message(field, m),
            (ScalarType::Group, _) => return Err(unmapped(field, scalar)),
            (scalar, value) => {
                return Err(Error::invalid_type(
                    field,
                    format!(
                        "cannot encode {} value as {} (expected {})",
                        value.kind_name(),
                        scalar,
                        Value::kind_for(scalar).unwrap_or("nothing"),
                    ),
                ));
            }
        }

        Ok(())
    }
}

fn unmapped(field: FieldNum, scalar: ScalarType) -> Error {
    Error::invalid_type(field, format!("{} has no wire type mapping", scalar))
}
