//! Error and Result types for Corsac codec operations.

use thiserror::Error;

/// A convenience `Result` type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// The error type for encode and decode operations.
///
/// Overflow is the only non-panic failure mode on the write path; the caller
/// is expected to discard the buffer and retry with a larger one. Decode
/// failures surface as [`CodecError::BadData`].
#[derive(Debug, Error)]
pub enum CodecError {
    /// The write buffer has no room for the requested append.
    #[error("Stream overflow: {requested} bytes requested, {available} available")]
    Overflow {
        /// Number of bytes the append needed.
        requested: usize,
        /// Number of bytes left in the buffer.
        available: usize,
    },

    /// The compressed stream is malformed or truncated.
    #[error("Bad data: {0}")]
    BadData(String),

    /// Parallel chunk columns have unequal lengths.
    #[error("Column length mismatch: {series_ids} ids, {timestamps} timestamps, {values} values")]
    LengthMismatch {
        /// Length of the series id column.
        series_ids: usize,
        /// Length of the timestamp column.
        timestamps: usize,
        /// Length of the value column.
        values: usize,
    },
}
