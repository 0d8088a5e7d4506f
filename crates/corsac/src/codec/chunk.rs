//! Standalone chunk framing and reorder utilities.
//!
//! A chunk serializes three parallel columns into one byte stream:
//!
//! ```text
//! u32 ids_bytes      | delta-RLE bytes for series ids
//! u32 ts_bytes       | delta-RLE bytes for timestamps
//! u32 ncolumns (= 1)
//! u32 value count    | number of doubles, not a byte length
//! FCM bytes for values
//! ```
//!
//! The element count travels out-of-band with the caller. The doubles
//! prefix deliberately carries a value count where the id and timestamp
//! prefixes carry byte lengths; the decoder depends on that count, and the
//! id/timestamp byte lengths are informational only.

use crate::codec::delta_rle::{DeltaRleReader, DeltaRleWriter};
use crate::codec::fcm::{FcmStreamReader, FcmStreamWriter};
use crate::codec::stream::{ByteStreamReader, ByteStreamWriter};
use crate::codec::{SeriesId, Timestamp};
use crate::error::{CodecError, Result};

/// Parallel columns of one uncompressed chunk.
///
/// The three columns always have equal length; entries at the same index
/// form one (series id, timestamp, value) triple.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UncompressedChunk {
    /// Series id of each triple.
    pub series_ids: Vec<SeriesId>,
    /// Timestamp of each triple.
    pub timestamps: Vec<Timestamp>,
    /// Value of each triple.
    pub values: Vec<f64>,
}

/// Summary of an encoded chunk returned by [`encode_chunk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSummary {
    /// Number of triples written.
    pub n_elements: u32,
    /// Smallest timestamp in the chunk.
    pub ts_begin: Timestamp,
    /// Largest timestamp in the chunk.
    pub ts_end: Timestamp,
}

/// Encodes a chunk into the stream.
///
/// A chunk that does not fit aborts with [`CodecError::Overflow`]; partial
/// bytes remain in the buffer and the caller is expected to discard it.
pub fn encode_chunk(
    stream: &mut ByteStreamWriter<'_>,
    chunk: &UncompressedChunk,
) -> Result<ChunkSummary> {
    // Series id sub-stream, length prefix patched on close.
    let ids_size_slot = stream.allocate::<u32>()?;
    let ids_start = stream.size();
    let mut ids_writer = DeltaRleWriter::new();
    for &id in &chunk.series_ids {
        ids_writer.put(stream, id)?;
    }
    ids_writer.commit(stream)?;
    stream.patch(ids_size_slot, (stream.size() - ids_start) as u32);

    // Timestamp sub-stream; the traversal also collects the time range.
    let ts_size_slot = stream.allocate::<u32>()?;
    let ts_start = stream.size();
    let mut ts_writer = DeltaRleWriter::new();
    let mut ts_begin = Timestamp::MAX;
    let mut ts_end = Timestamp::MIN;
    for &ts in &chunk.timestamps {
        ts_begin = ts_begin.min(ts);
        ts_end = ts_end.max(ts);
        ts_writer.put(stream, ts)?;
    }
    ts_writer.commit(stream)?;
    stream.patch(ts_size_slot, (stream.size() - ts_start) as u32);

    // Number of columns stored, fixed at one.
    stream.put_raw(1u32)?;

    // Doubles sub-stream. The prefix stores how many values follow.
    let count_slot = stream.allocate::<u32>()?;
    let mut values_writer = FcmStreamWriter::new();
    values_writer.tput(stream, &chunk.values)?;
    stream.patch(count_slot, chunk.values.len() as u32);

    Ok(ChunkSummary {
        n_elements: chunk.series_ids.len() as u32,
        ts_begin,
        ts_end,
    })
}

/// Decodes a chunk of `nelements` triples from the stream.
///
/// Any truncation or inconsistency inside the chunk surfaces as
/// [`CodecError::BadData`].
pub fn decode_chunk(
    stream: &mut ByteStreamReader<'_>,
    nelements: u32,
) -> Result<UncompressedChunk> {
    let nelements = nelements as usize;

    let _ids_bytes = stream.read_raw::<u32>()?;
    let mut ids_reader = DeltaRleReader::new();
    let mut series_ids = Vec::with_capacity(nelements);
    for _ in 0..nelements {
        series_ids.push(ids_reader.next(stream)?);
    }

    let _ts_bytes = stream.read_raw::<u32>()?;
    let mut ts_reader = DeltaRleReader::new();
    let mut timestamps = Vec::with_capacity(nelements);
    for _ in 0..nelements {
        timestamps.push(ts_reader.next(stream)?);
    }

    let _ncolumns = stream.read_raw::<u32>()?;

    let nvalues = stream.read_raw::<u32>()? as usize;
    if nvalues > nelements {
        return Err(CodecError::BadData(format!(
            "chunk declares {} values for {} elements",
            nvalues, nelements
        )));
    }
    let mut values = vec![0.0f64; nelements];
    let mut values_reader = FcmStreamReader::new();
    for slot in values.iter_mut().take(nvalues) {
        *slot = values_reader.next(stream)?;
    }

    Ok(UncompressedChunk {
        series_ids,
        timestamps,
        values,
    })
}

fn reorder_by_key<K, F>(chunk: &UncompressedChunk, key: F) -> Result<UncompressedChunk>
where
    K: Ord,
    F: Fn(usize) -> K,
{
    let len = chunk.timestamps.len();
    if len != chunk.values.len() || len != chunk.series_ids.len() {
        return Err(CodecError::LengthMismatch {
            series_ids: chunk.series_ids.len(),
            timestamps: chunk.timestamps.len(),
            values: chunk.values.len(),
        });
    }

    let mut index: Vec<usize> = (0..len).collect();
    index.sort_by_key(|&ix| key(ix)); // stable, ties keep input order

    let mut out = UncompressedChunk {
        series_ids: Vec::with_capacity(len),
        timestamps: Vec::with_capacity(len),
        values: Vec::with_capacity(len),
    };
    for ix in index {
        out.series_ids.push(chunk.series_ids[ix]);
        out.timestamps.push(chunk.timestamps[ix]);
        out.values.push(chunk.values[ix]);
    }
    Ok(out)
}

/// Stably reorders the chunk by ascending timestamp.
pub fn reorder_by_timestamp(chunk: &UncompressedChunk) -> Result<UncompressedChunk> {
    reorder_by_key(chunk, |ix| chunk.timestamps[ix])
}

/// Stably reorders the chunk by ascending series id.
pub fn reorder_by_series(chunk: &UncompressedChunk) -> Result<UncompressedChunk> {
    reorder_by_key(chunk, |ix| chunk.series_ids[ix])
}
