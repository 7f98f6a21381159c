//! Core error types for the EO protocol codec

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A read asked for more bytes than the buffer (or current chunk) holds
    #[error("Buffer underrun: needed {needed} bytes, {available} available")]
    BufferUnderrun { needed: usize, available: usize },

    /// A value does not fit the width it is being encoded into
    #[error("Value {value} exceeds maximum {max} for this width")]
    Overflow { value: u64, max: u64 },

    /// An expected 0xFF break byte was missing
    #[error("Malformed delimiter: {0}")]
    MalformedDelimiter(String),

    /// A variant payload does not belong to the discriminant being written
    #[error("Type mismatch: discriminant is {expected}, payload is {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// A fixed or padded string does not fit its declared length
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl ProtocolError {
    pub fn underrun(needed: usize, available: usize) -> Self {
        Self::BufferUnderrun { needed, available }
    }

    pub fn overflow(value: impl Into<u64>, max: impl Into<u64>) -> Self {
        Self::Overflow {
            value: value.into(),
            max: max.into(),
        }
    }

    pub fn type_mismatch(expected: impl std::fmt::Debug, actual: impl std::fmt::Debug) -> Self {
        Self::TypeMismatch {
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
