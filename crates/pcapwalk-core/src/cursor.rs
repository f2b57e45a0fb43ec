//! Bounds-checked positional reader over an immutable byte buffer.
//!
//! The cursor owns nothing but an offset. Every read states its width (by
//! method) and byte order (by argument), checks the bound, and only then
//! advances. A failed read leaves the position unchanged.

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Byte order of a multi-byte field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    Little,
    Big,
}

/// Positional reader over a borrowed buffer.
///
/// # Examples
/// ```
/// use pcapwalk_core::{ByteCursor, ByteOrder};
///
/// let bytes = [0x12, 0x34, 0x56];
/// let mut cursor = ByteCursor::new(&bytes);
/// assert_eq!(cursor.read_u16(ByteOrder::Big)?, 0x1234);
/// assert_eq!(cursor.remaining(), 1);
/// assert!(cursor.read_u16(ByteOrder::Big).is_err());
/// assert_eq!(cursor.position(), 2);
/// # Ok::<(), pcapwalk_core::DecodeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    pub fn is_at_end(&self) -> bool {
        self.offset == self.buf.len()
    }

    /// Fail with `TruncatedBuffer` unless `needed` bytes remain.
    pub fn require(&self, needed: usize) -> Result<(), DecodeError> {
        if self.remaining() < needed {
            return Err(DecodeError::TruncatedBuffer {
                offset: self.offset,
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn peek_u8(&self) -> Result<u8, DecodeError> {
        self.require(1)?;
        Ok(self.buf[self.offset])
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        self.require(len)?;
        let bytes = &self.buf[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), DecodeError> {
        self.read_bytes(len).map(|_| ())
    }

    /// Take the next `len` bytes as an independent cursor starting at 0.
    pub fn split_to(&mut self, len: usize) -> Result<ByteCursor<'a>, DecodeError> {
        self.read_bytes(len).map(ByteCursor::new)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    pub fn read_i8(&mut self) -> Result<i8, DecodeError> {
        self.read_array::<1>().map(i8::from_ne_bytes)
    }

    pub fn read_u16(&mut self, order: ByteOrder) -> Result<u16, DecodeError> {
        let bytes = self.read_array::<2>()?;
        Ok(match order {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        })
    }

    pub fn read_i16(&mut self, order: ByteOrder) -> Result<i16, DecodeError> {
        let bytes = self.read_array::<2>()?;
        Ok(match order {
            ByteOrder::Little => i16::from_le_bytes(bytes),
            ByteOrder::Big => i16::from_be_bytes(bytes),
        })
    }

    pub fn read_u32(&mut self, order: ByteOrder) -> Result<u32, DecodeError> {
        let bytes = self.read_array::<4>()?;
        Ok(match order {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        })
    }

    pub fn read_i32(&mut self, order: ByteOrder) -> Result<i32, DecodeError> {
        let bytes = self.read_array::<4>()?;
        Ok(match order {
            ByteOrder::Little => i32::from_le_bytes(bytes),
            ByteOrder::Big => i32::from_be_bytes(bytes),
        })
    }
}
