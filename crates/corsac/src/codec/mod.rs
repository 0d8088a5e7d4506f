//! Compression codecs for time series blocks.
//!
//! The write path batches (series id, timestamp, value) triples into
//! fixed-size chunks: timestamps go through the delta-run-length codec,
//! values through the FCM XOR codec, and both append to one forward-only
//! byte stream. The read path walks the same bytes strictly in order; the
//! predictor state machines make mid-stream decoding invalid.

pub mod block;
pub mod chunk;
pub mod delta_rle;
pub mod fcm;
pub mod predictor;
pub mod stream;

/// Timestamp in arbitrary units, typically nanoseconds since the epoch.
pub type Timestamp = u64;

/// Unique identifier for a time series.
pub type SeriesId = u64;

pub use block::{
    DataBlockReader, DataBlockWriter, BLOCK_FORMAT_VERSION, CHUNK_MASK, CHUNK_SIZE, HEADER_SIZE,
};
pub use chunk::{
    decode_chunk, encode_chunk, reorder_by_series, reorder_by_timestamp, ChunkSummary,
    UncompressedChunk,
};
pub use delta_rle::{DeltaRleReader, DeltaRleWriter};
pub use fcm::{FcmStreamReader, FcmStreamWriter};
pub use predictor::{DfcmPredictor, FcmPredictor, Predictor, PREDICTOR_TABLE_SIZE};
pub use stream::{ByteStreamReader, ByteStreamWriter, Scalar, Slot};
