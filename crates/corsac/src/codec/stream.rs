//! Forward byte streams over caller-provided buffers.
//!
//! [`ByteStreamWriter`] appends fixed-width little-endian values to a
//! borrowed `&mut [u8]` and can reserve back-patchable slots for length
//! prefixes that are only known once a sub-stream closes. [`ByteStreamReader`]
//! is the matching forward cursor over a `&[u8]`.

use crate::error::{CodecError, Result};
use std::marker::PhantomData;

/// Fixed-width value with an explicit little-endian byte encoding.
pub trait Scalar: Copy {
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Writes the value into the first `WIDTH` bytes of `dst`.
    fn write_le(self, dst: &mut [u8]);

    /// Reads the value from the first `WIDTH` bytes of `src`.
    fn read_le(src: &[u8]) -> Self;
}

macro_rules! impl_scalar_int {
    ($($ty:ty),*) => {
        $(impl Scalar for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();

            fn write_le(self, dst: &mut [u8]) {
                dst[..Self::WIDTH].copy_from_slice(&self.to_le_bytes());
            }

            fn read_le(src: &[u8]) -> Self {
                <$ty>::from_le_bytes(src[..Self::WIDTH].try_into().unwrap())
            }
        })*
    };
}

impl_scalar_int!(u8, u16, u32, u64);

impl Scalar for f64 {
    const WIDTH: usize = 8;

    fn write_le(self, dst: &mut [u8]) {
        dst[..8].copy_from_slice(&self.to_bits().to_le_bytes());
    }

    fn read_le(src: &[u8]) -> Self {
        f64::from_bits(u64::from_le_bytes(src[..8].try_into().unwrap()))
    }
}

/// Handle to a reserved slot in a [`ByteStreamWriter`].
///
/// Obtained from [`ByteStreamWriter::allocate`] and redeemed with
/// [`ByteStreamWriter::patch`] once the final value is known.
#[derive(Debug, Clone, Copy)]
pub struct Slot<T: Scalar> {
    offset: usize,
    _marker: PhantomData<T>,
}

/// Append-only cursor into a fixed caller-owned buffer.
#[derive(Debug)]
pub struct ByteStreamWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> ByteStreamWriter<'a> {
    /// Creates a writer over the whole of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Appends a fixed-width little-endian value.
    pub fn put_raw<T: Scalar>(&mut self, value: T) -> Result<()> {
        if self.space_left() < T::WIDTH {
            return Err(CodecError::Overflow {
                requested: T::WIDTH,
                available: self.space_left(),
            });
        }
        value.write_le(&mut self.buf[self.pos..]);
        self.pos += T::WIDTH;
        Ok(())
    }

    /// Appends raw bytes. The append is all-or-nothing.
    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.space_left() < bytes.len() {
            return Err(CodecError::Overflow {
                requested: bytes.len(),
                available: self.space_left(),
            });
        }
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    /// Reserves a zero-initialized slot for a value patched in later.
    pub fn allocate<T: Scalar>(&mut self) -> Result<Slot<T>> {
        if self.space_left() < T::WIDTH {
            return Err(CodecError::Overflow {
                requested: T::WIDTH,
                available: self.space_left(),
            });
        }
        let offset = self.pos;
        self.buf[offset..offset + T::WIDTH].fill(0);
        self.pos += T::WIDTH;
        Ok(Slot {
            offset,
            _marker: PhantomData,
        })
    }

    /// Writes the final value into a previously reserved slot.
    pub fn patch<T: Scalar>(&mut self, slot: Slot<T>, value: T) {
        value.write_le(&mut self.buf[slot.offset..]);
    }

    /// Returns the number of bytes still available.
    pub fn space_left(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns the number of bytes written so far.
    pub fn size(&self) -> usize {
        self.pos
    }

    /// Finalizes the stream and returns the total byte count.
    pub fn commit(self) -> usize {
        self.pos
    }
}

/// Forward cursor over a borrowed byte slice.
#[derive(Debug)]
pub struct ByteStreamReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteStreamReader<'a> {
    /// Creates a reader over the whole of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Reads the next fixed-width little-endian value.
    pub fn read_raw<T: Scalar>(&mut self) -> Result<T> {
        if self.remaining() < T::WIDTH {
            return Err(CodecError::BadData(format!(
                "truncated stream: {} bytes requested, {} remaining",
                T::WIDTH,
                self.remaining()
            )));
        }
        let value = T::read_le(&self.buf[self.pos..]);
        self.pos += T::WIDTH;
        Ok(value)
    }

    /// Returns the read position in bytes from the start of the buffer.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}
