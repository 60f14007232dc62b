//! Error types for the repet crate.

use std::fmt;

/// Errors that can occur during separation or audio file handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepetError {
    /// File extension is not a recognized audio format.
    UnsupportedFormat(String),
    /// The input file could not be decoded.
    Decode(String),
    /// An output file could not be encoded.
    Encode(String),
    /// Invalid input data or parameters.
    InvalidInput(String),
    /// I/O error.
    Io(String),
}

impl fmt::Display for RepetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepetError::UnsupportedFormat(msg) => write!(f, "unsupported format: {}", msg),
            RepetError::Decode(msg) => write!(f, "decode error: {}", msg),
            RepetError::Encode(msg) => write!(f, "encode error: {}", msg),
            RepetError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            RepetError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for RepetError {}

impl From<std::io::Error> for RepetError {
    fn from(err: std::io::Error) -> Self {
        RepetError::Io(err.to_string())
    }
}
