//! Property-based round-trip tests for the compression codecs.
//!
//! Uses proptest to verify lossless round trips for arbitrary data. Double
//! comparisons are bit-exact (`to_bits`), so NaN payloads, infinities,
//! signed zero, and subnormals are all covered.

use corsac::{
    decode_chunk, encode_chunk, ByteStreamReader, ByteStreamWriter, DataBlockReader,
    DataBlockWriter, DeltaRleReader, DeltaRleWriter, FcmStreamReader, FcmStreamWriter,
    UncompressedChunk,
};
use proptest::prelude::*;

/// Strategy for arbitrary IEEE 754 bit patterns, special values included.
fn any_double() -> impl Strategy<Value = f64> {
    prop::num::u64::ANY.prop_map(f64::from_bits)
}

/// Strategy for monotone timestamps with bounded deltas.
fn timestamp_strategy() -> impl Strategy<Value = Vec<u64>> {
    (
        0u64..1_000_000_000_000,
        prop::collection::vec(1u64..1_000_000_000, 0..200),
    )
        .prop_map(|(base, deltas)| {
            let mut timestamps = Vec::with_capacity(deltas.len());
            let mut current = base;
            for delta in deltas {
                current = current.saturating_add(delta);
                timestamps.push(current);
            }
            timestamps
        })
}

fn encode_doubles(values: &[f64], buf: &mut [u8]) -> usize {
    let mut stream = ByteStreamWriter::new(buf);
    let mut writer = FcmStreamWriter::new();
    writer.tput(&mut stream, values).expect("buffer is sized for the input");
    stream.commit()
}

fn decode_doubles(buf: &[u8], count: usize) -> Vec<f64> {
    let mut stream = ByteStreamReader::new(buf);
    let mut reader = FcmStreamReader::new();
    (0..count)
        .map(|_| reader.next(&mut stream).expect("stream holds count values"))
        .collect()
}

proptest! {
    /// Arbitrary doubles survive the FCM codec bit-for-bit.
    #[test]
    fn prop_doubles_roundtrip_bit_exact(values in prop::collection::vec(any_double(), 0..200)) {
        let mut buf = vec![0u8; 16 + values.len() * 10];
        let size = encode_doubles(&values, &mut buf);
        let decoded = decode_doubles(&buf[..size], values.len());

        prop_assert_eq!(values.len(), decoded.len());
        for (original, decoded) in values.iter().zip(decoded.iter()) {
            prop_assert_eq!(original.to_bits(), decoded.to_bits());
        }
    }

    /// Encoding k doubles always yields a stream that decodes to exactly k.
    #[test]
    fn prop_pair_boundary(values in prop::collection::vec(-1e6f64..1e6, 0..65)) {
        let mut buf = vec![0u8; 16 + values.len() * 10];
        let size = encode_doubles(&values, &mut buf);

        let mut stream = ByteStreamReader::new(&buf[..size]);
        let mut reader = FcmStreamReader::new();
        for _ in 0..values.len() {
            reader.next(&mut stream).expect("value short of the declared count");
        }
        // An odd count leaves the one-byte synthetic diff of the final pair.
        prop_assert!(stream.remaining() <= 1);
    }

    /// Arbitrary u64 sequences survive the delta-RLE codec.
    #[test]
    fn prop_delta_rle_roundtrip(values in prop::collection::vec(prop::num::u64::ANY, 0..200)) {
        let mut buf = vec![0u8; 32 + values.len() * 11];
        let mut stream = ByteStreamWriter::new(&mut buf);
        let mut writer = DeltaRleWriter::new();
        writer.tput(&mut stream, &values).expect("buffer is sized for the input");
        let size = stream.commit();

        let mut stream = ByteStreamReader::new(&buf[..size]);
        let mut reader = DeltaRleReader::new();
        for &expected in &values {
            prop_assert_eq!(reader.next(&mut stream).expect("decode"), expected);
        }
        prop_assert_eq!(stream.remaining(), 0);
    }

    /// Chunks reproduce all three columns exactly.
    #[test]
    fn prop_chunk_roundtrip(
        ids in prop::collection::vec(prop::num::u64::ANY, 0..120),
        seed_ts in timestamp_strategy(),
        seed_values in prop::collection::vec(any_double(), 0..120),
    ) {
        // Trim the three columns to a common length.
        let len = ids.len().min(seed_ts.len()).min(seed_values.len());
        let chunk = UncompressedChunk {
            series_ids: ids[..len].to_vec(),
            timestamps: seed_ts[..len].to_vec(),
            values: seed_values[..len].to_vec(),
        };

        let mut buf = vec![0u8; 64 + len * 32];
        let mut stream = ByteStreamWriter::new(&mut buf);
        let summary = encode_chunk(&mut stream, &chunk).expect("buffer is sized for the input");
        let size = stream.commit();
        prop_assert_eq!(summary.n_elements as usize, len);

        let mut stream = ByteStreamReader::new(&buf[..size]);
        let decoded = decode_chunk(&mut stream, summary.n_elements).expect("decode");
        prop_assert_eq!(&decoded.series_ids, &chunk.series_ids);
        prop_assert_eq!(&decoded.timestamps, &chunk.timestamps);
        prop_assert_eq!(decoded.values.len(), chunk.values.len());
        for (a, b) in chunk.values.iter().zip(decoded.values.iter()) {
            prop_assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    /// Blocks yield every accepted pair in order, then run out.
    #[test]
    fn prop_block_roundtrip(
        id in prop::num::u64::ANY,
        timestamps in timestamp_strategy(),
        raw_values in prop::collection::vec(any_double(), 0..200),
    ) {
        let len = timestamps.len().min(raw_values.len());
        let pairs: Vec<(u64, f64)> = timestamps[..len]
            .iter()
            .copied()
            .zip(raw_values[..len].iter().copied())
            .collect();

        let mut buf = vec![0u8; 16 * 1024];
        let mut writer = DataBlockWriter::new(id, &mut buf);
        for &(ts, value) in &pairs {
            writer.put(ts, value).expect("buffer is sized for the input");
        }
        let size = writer.commit();

        let mut reader = DataBlockReader::new(&buf[..size]).expect("header is present");
        prop_assert_eq!(reader.id(), id);
        prop_assert_eq!(reader.nelements(), pairs.len());
        for &(ts, value) in &pairs {
            let (decoded_ts, decoded_value) =
                reader.next().expect("decode").expect("value present");
            prop_assert_eq!(decoded_ts, ts);
            prop_assert_eq!(decoded_value.to_bits(), value.to_bits());
        }
        prop_assert!(reader.next().expect("clean end").is_none());
    }
}
