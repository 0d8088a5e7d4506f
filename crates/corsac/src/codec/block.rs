//! Fixed-size data blocks of compressed (timestamp, value) pairs.
//!
//! ## Binary layout
//!
//! ```text
//! Offset  Size    Field
//! ------  ----    -----
//! 0x00    2       version (u16 LE)
//! 0x02    2       nchunks (u16 LE), back-patched at commit
//! 0x04    2       ntail (u16 LE), back-patched while writing
//! 0x06    8       series_id (u64 LE)
//! 0x0E    *       nchunks x compressed chunk
//! *       *       ntail x (u64 ts, f64 value), uncompressed
//! ```
//!
//! Each compressed chunk holds [`CHUNK_SIZE`] timestamps (delta-RLE)
//! followed by [`CHUNK_SIZE`] values (FCM). There are no length prefixes
//! inside the block; the chunk count and the fixed chunk size are enough.
//! Both codecs keep one state machine per block, so chunks can only be
//! decoded in order.
//!
//! The writer batches pairs into a scratch buffer and compresses it one
//! full chunk at a time. Once the space guard reports that another chunk
//! might not fit, the remaining pairs are appended raw as the block tail;
//! the compressed path never resumes after that.

use crate::codec::delta_rle::{DeltaRleReader, DeltaRleWriter};
use crate::codec::fcm::{FcmStreamReader, FcmStreamWriter};
use crate::codec::stream::{ByteStreamReader, ByteStreamWriter, Scalar, Slot};
use crate::codec::{SeriesId, Timestamp};
use crate::error::{CodecError, Result};
use tracing::error;

/// Number of (timestamp, value) pairs per compressed chunk.
pub const CHUNK_SIZE: usize = 16;

/// Mask for positions within a chunk.
pub const CHUNK_MASK: usize = CHUNK_SIZE - 1;

/// Size of the block header in bytes.
pub const HEADER_SIZE: usize = 14;

/// Version tag written into every block header.
pub const BLOCK_FORMAT_VERSION: u16 = 1;

/// Space the guard reserves before another chunk may start: up to eleven
/// bytes per timestamp (a singleton run costs a one-byte length varint
/// plus a ten-byte delta varint) and nine per encoded value.
const CHUNK_MARGIN: usize = 11 * CHUNK_SIZE + 9 * CHUNK_SIZE;

/// Writer producing one data block over a caller-provided buffer.
pub struct DataBlockWriter<'a> {
    stream: ByteStreamWriter<'a>,
    ts_stream: DeltaRleWriter,
    val_stream: FcmStreamWriter,
    ts_writebuf: [Timestamp; CHUNK_SIZE],
    val_writebuf: [f64; CHUNK_SIZE],
    write_index: usize,
    nchunks_slot: Slot<u16>,
    ntail_slot: Slot<u16>,
    ntail: u16,
}

impl<'a> DataBlockWriter<'a> {
    /// Creates a writer and lays down the block header.
    ///
    /// # Panics
    ///
    /// Panics if `buf` cannot hold the 14-byte header.
    pub fn new(id: SeriesId, buf: &'a mut [u8]) -> Self {
        if buf.len() < HEADER_SIZE {
            error!(buf_len = buf.len(), "block buffer cannot hold the header");
            panic!(
                "buffer of {} bytes is too small for the {}-byte block header",
                buf.len(),
                HEADER_SIZE
            );
        }
        let mut stream = ByteStreamWriter::new(buf);
        stream
            .put_raw(BLOCK_FORMAT_VERSION)
            .expect("header write cannot overflow");
        let nchunks_slot = stream.allocate::<u16>().expect("header write cannot overflow");
        let ntail_slot = stream.allocate::<u16>().expect("header write cannot overflow");
        stream.put_raw(id).expect("header write cannot overflow");

        Self {
            stream,
            ts_stream: DeltaRleWriter::new(),
            val_stream: FcmStreamWriter::new(),
            ts_writebuf: [0; CHUNK_SIZE],
            val_writebuf: [0.0; CHUNK_SIZE],
            write_index: 0,
            nchunks_slot,
            ntail_slot,
            ntail: 0,
        }
    }

    /// Appends one (timestamp, value) pair.
    ///
    /// Pairs accumulate in the chunk scratch and are compressed one full
    /// chunk at a time while the space guard holds; after that they are
    /// stored raw in the block tail until the buffer overflows.
    pub fn put(&mut self, ts: Timestamp, value: f64) -> Result<()> {
        if self.room_for_chunk() {
            // The number of pairs in the scratch equals write_index % CHUNK_SIZE.
            self.ts_writebuf[self.write_index & CHUNK_MASK] = ts;
            self.val_writebuf[self.write_index & CHUNK_MASK] = value;
            self.write_index += 1;
            if self.write_index & CHUNK_MASK == 0 {
                let flushed = self
                    .ts_stream
                    .tput(&mut self.stream, &self.ts_writebuf)
                    .and_then(|_| self.val_stream.tput(&mut self.stream, &self.val_writebuf));
                if flushed.is_err() {
                    // The scratch content cannot be recovered once the
                    // codecs consumed it; the space guard must prevent this.
                    error!(
                        write_index = self.write_index,
                        space_left = self.stream.space_left(),
                        "chunk flush overflowed a buffer the space guard approved"
                    );
                    panic!("chunk flush overflowed the write buffer");
                }
            }
            Ok(())
        } else {
            // Raw tail entry. The scratch must be empty at this point or
            // its pairs would be silently dropped.
            assert!(
                self.write_index & CHUNK_MASK == 0,
                "uncompressed tail started while the chunk scratch holds data"
            );
            self.stream.put_raw(ts)?;
            self.stream.put_raw(value)?;
            self.ntail += 1;
            self.stream.patch(self.ntail_slot, self.ntail);
            Ok(())
        }
    }

    /// Spills any unflushed scratch pairs into the tail, back-patches the
    /// header counters, and returns the total bytes written.
    pub fn commit(mut self) -> usize {
        let nchunks = self.write_index / CHUNK_SIZE;
        let buftail = self.write_index % CHUNK_SIZE;
        if nchunks > u16::MAX as usize {
            error!(nchunks, "chunk count does not fit the u16 header field");
            panic!("chunk count does not fit the u16 header field");
        }
        if buftail > 0 {
            if self.ntail != 0 {
                error!(
                    ntail = self.ntail,
                    buftail, "chunk scratch is not empty but the block already has a tail"
                );
                panic!("chunk scratch is not empty but the block already has a tail");
            }
            for ix in 0..buftail {
                let spilled = self
                    .stream
                    .put_raw(self.ts_writebuf[ix])
                    .and_then(|_| self.stream.put_raw(self.val_writebuf[ix]));
                if spilled.is_err() {
                    // The guard kept this space free before any pair
                    // entered the scratch.
                    error!(space_left = self.stream.space_left(), "tail spill overflowed");
                    panic!("tail spill overflowed the write buffer");
                }
                self.ntail += 1;
            }
            self.stream.patch(self.ntail_slot, self.ntail);
        }
        self.stream.patch(self.nchunks_slot, nchunks as u16);
        self.stream.commit()
    }

    /// Reports whether the stream can absorb one worst-case chunk.
    pub fn room_for_chunk(&self) -> bool {
        self.stream.space_left() >= CHUNK_MARGIN
    }

    /// Returns the number of bytes written so far.
    pub fn size(&self) -> usize {
        self.stream.size()
    }
}

/// Forward reader over one data block.
pub struct DataBlockReader<'a> {
    buf: &'a [u8],
    stream: ByteStreamReader<'a>,
    ts_stream: DeltaRleReader,
    val_stream: FcmStreamReader,
    read_buffer: [Timestamp; CHUNK_SIZE],
    read_index: usize,
}

impl<'a> DataBlockReader<'a> {
    /// Opens a block for reading.
    pub fn new(buf: &'a [u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(CodecError::BadData(format!(
                "block of {} bytes is smaller than the {}-byte header",
                buf.len(),
                HEADER_SIZE
            )));
        }
        Ok(Self {
            buf,
            stream: ByteStreamReader::new(&buf[HEADER_SIZE..]),
            ts_stream: DeltaRleReader::new(),
            val_stream: FcmStreamReader::new(),
            read_buffer: [0; CHUNK_SIZE],
            read_index: 0,
        })
    }

    fn nchunks(&self) -> usize {
        u16::read_le(&self.buf[2..]) as usize
    }

    fn ntail(&self) -> usize {
        u16::read_le(&self.buf[4..]) as usize
    }

    fn main_size(&self) -> usize {
        self.nchunks() * CHUNK_SIZE
    }

    /// Yields the next (timestamp, value) pair, or `None` once the block
    /// is exhausted.
    pub fn next(&mut self) -> Result<Option<(Timestamp, f64)>> {
        if self.read_index < self.main_size() {
            let chunk_index = self.read_index & CHUNK_MASK;
            self.read_index += 1;
            if chunk_index == 0 {
                // Refill one chunk worth of timestamps.
                for slot in self.read_buffer.iter_mut() {
                    *slot = self.ts_stream.next(&mut self.stream)?;
                }
            }
            let value = self.val_stream.next(&mut self.stream)?;
            Ok(Some((self.read_buffer[chunk_index], value)))
        } else if self.read_index < self.main_size() + self.ntail() {
            self.read_index += 1;
            let ts = self.stream.read_raw::<Timestamp>()?;
            let value = self.stream.read_raw::<f64>()?;
            Ok(Some((ts, value)))
        } else {
            Ok(None)
        }
    }

    /// Returns the total number of pairs stored in the block.
    pub fn nelements(&self) -> usize {
        self.main_size() + self.ntail()
    }

    /// Returns the series id from the block header.
    pub fn id(&self) -> SeriesId {
        u64::read_le(&self.buf[6..])
    }

    /// Returns the format version from the block header.
    pub fn version(&self) -> u16 {
        u16::read_le(&self.buf[0..])
    }
}
