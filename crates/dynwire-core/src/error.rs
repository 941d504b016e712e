//! Error types for the dynwire-core library.
//!
//! Three failure modes cover the codec itself: a buffer whose wire structure
//! cannot be walked, a field that is absent from the bucket a scalar type
//! implies, and a scalar type (or value) that cannot be used for the request.

use crate::scalar::ScalarType;
use crate::FieldNum;
use thiserror::Error;

/// Result type alias for dynwire operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all dynwire operations
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The tag/length/fixed-width structure of a buffer could not be parsed,
    /// or start/end group markers were unbalanced at end of input
    #[error("malformed protobuf buffer at offset {offset}: {details}")]
    MalformedBuffer {
        /// Byte offset where the error occurred
        offset: usize,
        /// Detailed description of the issue
        details: String,
    },

    /// The requested field has no value in the bucket implied by the scalar type
    #[error("field {field} not found as {scalar}")]
    FieldMissing {
        /// The field that was looked up
        field: FieldNum,
        /// The scalar type the field was requested as
        scalar: ScalarType,
    },

    /// A scalar type is not usable for the request, or a value does not
    /// match the scalar type it is encoded as
    #[error("{}", invalid_type_message(.field, .details))]
    InvalidType {
        /// The field involved, when the failure is tied to one
        field: Option<FieldNum>,
        /// Detailed description of the issue
        details: String,
    },

    /// Failed to parse a `DescriptorProto` supplied as a runtime schema
    #[error("failed to parse DescriptorProto: {0}")]
    DescriptorParse(#[from] prost::DecodeError),
}

fn invalid_type_message(field: &Option<FieldNum>, details: &str) -> String {
    match field {
        Some(field) => format!("invalid protobuf type for field {}: {}", field, details),
        None => format!("invalid protobuf type: {}", details),
    }
}

impl Error {
    /// Creates a new malformed buffer error
    pub fn malformed(offset: usize, details: impl Into<String>) -> Self {
        Self::MalformedBuffer {
            offset,
            details: details.into(),
        }
    }

    /// Creates a new missing field error
    pub fn field_missing(field: FieldNum, scalar: ScalarType) -> Self {
        Self::FieldMissing { field, scalar }
    }

    /// Creates a new invalid type error tied to a field
    pub fn invalid_type(field: FieldNum, details: impl Into<String>) -> Self {
        Self::InvalidType {
            field: Some(field),
            details: details.into(),
        }
    }

    /// Creates a new invalid type error not tied to any field
    pub fn unknown_type(details: impl Into<String>) -> Self {
        Self::InvalidType {
            field: None,
            details: details.into(),
        }
    }

    /// Returns the field number this error refers to, if any
    pub fn field(&self) -> Option<FieldNum> {
        match self {
            Self::FieldMissing { field, .. } => Some(*field),
            Self::InvalidType { field, .. } => *field,
            Self::MalformedBuffer { .. } | Self::DescriptorParse(_) => None,
        }
    }

    /// Returns true if this error concerns the presence or type of a single
    /// field rather than the structure of a buffer.
    ///
    /// Bulk decoding skips every failed field, including nested messages
    /// whose buffer is malformed, and logs the latter at a higher level.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::FieldMissing { .. } | Self::InvalidType { .. })
    }
}
