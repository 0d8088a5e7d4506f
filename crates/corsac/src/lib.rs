//! Corsac - predictive compression core for time series storage.
//!
//! This crate provides the block-level compression primitives used by the
//! Corsac storage engine to encode (series id, timestamp, value) triples.
//!
//! # Components
//!
//! - [`FcmStreamWriter`] / [`FcmStreamReader`]: FCM XOR-predictor codec for
//!   IEEE 754 doubles
//! - [`DeltaRleWriter`] / [`DeltaRleReader`]: delta-run-length codec for
//!   series ids and monotone timestamps
//! - [`DataBlockWriter`] / [`DataBlockReader`]: fixed-size block layout with
//!   compressed chunks and an uncompressed tail
//! - [`encode_chunk`] / [`decode_chunk`]: standalone chunk framing with
//!   length-prefixed sub-streams
//!
//! # Example
//!
//! ```rust,ignore
//! use corsac::{DataBlockReader, DataBlockWriter};
//!
//! let mut buf = vec![0u8; 4096];
//! let mut writer = DataBlockWriter::new(42, &mut buf);
//! for i in 0..100u64 {
//!     writer.put(1_000 + i, i as f64 * 0.5)?;
//! }
//! let nbytes = writer.commit();
//!
//! let mut reader = DataBlockReader::new(&buf[..nbytes])?;
//! while let Some((ts, value)) = reader.next()? {
//!     println!("{ts} {value}");
//! }
//! ```

#![deny(missing_docs)]

pub mod codec;
pub mod error;

pub use codec::{
    decode_chunk, encode_chunk, reorder_by_series, reorder_by_timestamp, ByteStreamReader,
    ByteStreamWriter, ChunkSummary, DataBlockReader, DataBlockWriter, DeltaRleReader,
    DeltaRleWriter, DfcmPredictor, FcmPredictor, FcmStreamReader, FcmStreamWriter, SeriesId,
    Timestamp, UncompressedChunk,
};
pub use error::{CodecError, Result};
