//! Error types for the embedding engine.
//!
//! [`StegoError`] carries the details (sizes, offending values) for the
//! user-facing message; [`ErrorKind`] is the plain classification stored in
//! a failed job's status.

use thiserror::Error;

use crate::format::format_file_size;

/// Classification of a [`StegoError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Carrier or payload type not accepted by input validation.
    UnsupportedInputFormat,
    /// Payload does not fit in the carrier image.
    CapacityExceeded,
    /// Embedded header does not start with the expected signature.
    InvalidSignature,
    /// Declared payload length is zero or out of range.
    InvalidDeclaredSize,
    /// No archive signature found after every correction attempt.
    CorruptPayload,
    /// Underlying read, write or image codec failure.
    IoFailure,
    /// Job was cancelled at a slice boundary.
    Cancelled,
    /// Another job of the same kind is already running on this engine.
    Busy,
}

/// Errors that can occur while embedding or extracting a payload.
#[derive(Error, Debug)]
pub enum StegoError {
    #[error("Unsupported input format: {0}")]
    UnsupportedInputFormat(String),

    #[error(
        "Image too small: {width}x{height}px, minimum dimensions are {min}x{min}px"
    )]
    ImageTooSmall { width: u32, height: u32, min: u32 },

    #[error(
        "Payload too large for this image: required {}, available {}",
        human_size(.needed),
        human_size(.capacity)
    )]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("No hidden file found or invalid signature")]
    InvalidSignature,

    #[error("Invalid declared payload size: {size} bytes (accepted range 1..={max})")]
    InvalidDeclaredSize { size: u32, max: u32 },

    #[error("Payload is empty")]
    EmptyPayload,

    #[error(
        "Payload too large: {}, maximum is {}",
        human_size(.size),
        human_size(.max)
    )]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Extracted data does not contain a valid ZIP signature (leading bytes: {leading})")]
    CorruptPayload { leading: String },

    #[error("Image encode error: {0}")]
    ImageEncode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Another {0} job is already running")]
    Busy(&'static str),
}

fn human_size(bytes: &usize) -> String {
    format_file_size(*bytes as u64)
}

impl StegoError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedInputFormat(_) | Self::ImageTooSmall { .. } => {
                ErrorKind::UnsupportedInputFormat
            }
            Self::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            Self::InvalidSignature => ErrorKind::InvalidSignature,
            Self::InvalidDeclaredSize { .. } | Self::EmptyPayload | Self::PayloadTooLarge { .. } => {
                ErrorKind::InvalidDeclaredSize
            }
            Self::CorruptPayload { .. } => ErrorKind::CorruptPayload,
            Self::ImageEncode(_) | Self::Io(_) => ErrorKind::IoFailure,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Busy(_) => ErrorKind::Busy,
        }
    }
}
