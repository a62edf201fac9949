//! Custom error types for the supernote-reader crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
///
/// Every variant is fatal for the notebook being processed: parsing and
/// rendering are all-or-nothing.
#[derive(Debug, Error)]
pub enum NoteError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// The file is not a notebook (wrong extension, too short, unreadable signature, ...).
    #[error("Malformed notebook file: {0}")]
    MalformedFile(String),

    /// A block declares more payload bytes than the file still holds.
    #[error("Truncated block at {address}: declared {declared} bytes, but only {available} remain")]
    TruncatedBlock {
        address: u64,
        declared: u64,
        available: u64,
    },

    /// An address points outside the file.
    #[error("Invalid address {address}: outside of file bounds (file is {file_len} bytes)")]
    InvalidAddress { address: u64, file_len: u64 },

    /// A required tag is absent from a resolved block.
    #[error("Missing field '{key}' in block at {address}")]
    MissingField { key: &'static str, address: u64 },

    /// A layer bitmap decoded to a different number of pixels than the page holds.
    #[error("Decoded bitmap length {actual} is different from expected length {expected}")]
    DecodeLengthMismatch { expected: u64, actual: u64 },

    /// A page index past the end of the notebook was requested.
    #[error("Page index {index} out of bounds ({total} pages)")]
    PageOutOfRange { index: usize, total: usize },

    /// Building or encoding a raster image failed.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Serializing the metadata tree failed.
    #[error("Metadata serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenience `Result` type alias using the crate's `NoteError` type.
pub type Result<T> = std::result::Result<T, NoteError>;
