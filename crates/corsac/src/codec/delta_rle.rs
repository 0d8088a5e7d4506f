//! Delta-run-length codec for series ids and timestamps.
//!
//! Values are reduced to wrapping deltas from their predecessor, and equal
//! consecutive deltas collapse into runs. Each run is emitted as two LEB128
//! varints, `(run_length, delta)`: monotone timestamps on a fixed interval
//! cost two bytes per chunk, while the wrapping delta keeps the codec
//! lossless over the full `u64` domain.
//!
//! `commit` flushes the open run, so runs never span a commit boundary. A
//! reader consuming exactly the number of values written between commits
//! therefore ends on a byte boundary shared with the writer.

use crate::codec::stream::{ByteStreamReader, ByteStreamWriter};
use crate::error::{CodecError, Result};

fn put_varint(stream: &mut ByteStreamWriter<'_>, mut value: u64) -> Result<()> {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        stream.put_raw(byte)?;
        if value == 0 {
            return Ok(());
        }
    }
}

fn read_varint(stream: &mut ByteStreamReader<'_>) -> Result<u64> {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        let byte = stream.read_raw::<u8>()?;
        value |= ((byte & 0x7F) as u64) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
        if shift >= 64 {
            return Err(CodecError::BadData("varint exceeds 64 bits".into()));
        }
    }
}

/// Streaming delta-run-length encoder for unsigned integers.
#[derive(Debug, Default)]
pub struct DeltaRleWriter {
    prev_value: u64,
    run_delta: u64,
    run_length: u64,
}

impl DeltaRleWriter {
    /// Creates an encoder with an implicit previous value of zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one value, extending or flushing the current run.
    pub fn put(&mut self, stream: &mut ByteStreamWriter<'_>, value: u64) -> Result<()> {
        let delta = value.wrapping_sub(self.prev_value);
        self.prev_value = value;
        if self.run_length > 0 && delta == self.run_delta {
            self.run_length += 1;
            return Ok(());
        }
        self.flush_run(stream)?;
        self.run_delta = delta;
        self.run_length = 1;
        Ok(())
    }

    /// Puts a batch of values and commits.
    pub fn tput(&mut self, stream: &mut ByteStreamWriter<'_>, values: &[u64]) -> Result<()> {
        for &value in values {
            self.put(stream, value)?;
        }
        self.commit(stream)
    }

    /// Flushes the open run.
    pub fn commit(&mut self, stream: &mut ByteStreamWriter<'_>) -> Result<()> {
        self.flush_run(stream)
    }

    fn flush_run(&mut self, stream: &mut ByteStreamWriter<'_>) -> Result<()> {
        if self.run_length > 0 {
            put_varint(stream, self.run_length)?;
            put_varint(stream, self.run_delta)?;
            self.run_length = 0;
        }
        Ok(())
    }
}

/// Streaming delta-run-length decoder.
#[derive(Debug, Default)]
pub struct DeltaRleReader {
    prev_value: u64,
    run_delta: u64,
    run_remaining: u64,
}

impl DeltaRleReader {
    /// Creates a decoder with an implicit previous value of zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes the next value.
    pub fn next(&mut self, stream: &mut ByteStreamReader<'_>) -> Result<u64> {
        if self.run_remaining == 0 {
            self.run_remaining = read_varint(stream)?;
            self.run_delta = read_varint(stream)?;
            if self.run_remaining == 0 {
                return Err(CodecError::BadData("zero-length run".into()));
            }
        }
        self.run_remaining -= 1;
        self.prev_value = self.prev_value.wrapping_add(self.run_delta);
        Ok(self.prev_value)
    }
}
