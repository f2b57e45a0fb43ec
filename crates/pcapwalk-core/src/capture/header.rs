use serde::{Deserialize, Serialize};

use super::layout;
use crate::cursor::{ByteCursor, ByteOrder};
use crate::error::DecodeError;

/// Resolution of the per-record fractional timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPrecision {
    Micros,
    Nanos,
}

/// One of the four recognized classic pcap magics, as read little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicKind {
    /// Little-endian file, microsecond timestamps.
    Micros,
    /// Little-endian file, nanosecond timestamps.
    Nanos,
    /// Big-endian file, microsecond timestamps.
    MicrosSwapped,
    /// Big-endian file, nanosecond timestamps.
    NanosSwapped,
}

impl MagicKind {
    pub fn from_raw(magic: u32) -> Option<Self> {
        match magic {
            layout::MAGIC_MICROS => Some(MagicKind::Micros),
            layout::MAGIC_NANOS => Some(MagicKind::Nanos),
            layout::MAGIC_MICROS_SWAPPED => Some(MagicKind::MicrosSwapped),
            layout::MAGIC_NANOS_SWAPPED => Some(MagicKind::NanosSwapped),
            _ => None,
        }
    }

    pub fn byte_order(self) -> ByteOrder {
        match self {
            MagicKind::Micros | MagicKind::Nanos => ByteOrder::Little,
            MagicKind::MicrosSwapped | MagicKind::NanosSwapped => ByteOrder::Big,
        }
    }

    pub fn precision(self) -> TimestampPrecision {
        match self {
            MagicKind::Micros | MagicKind::MicrosSwapped => TimestampPrecision::Micros,
            MagicKind::Nanos | MagicKind::NanosSwapped => TimestampPrecision::Nanos,
        }
    }
}

/// Global capture header, decoded once per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureHeader {
    pub magic: u32,
    pub version_major: u16,
    pub version_minor: u16,
    pub thiszone: i32,
    pub sigfigs: i32,
    pub snaplen: i32,
    pub linktype: i32,
}

impl CaptureHeader {
    /// Raw magic bits, read little-endian.
    pub fn magic(&self) -> u32 {
        self.magic
    }

    pub fn magic_kind(&self) -> Option<MagicKind> {
        MagicKind::from_raw(self.magic)
    }

    /// Byte order of every multi-byte metadata field in the file.
    ///
    /// Unrecognized magics fall back to little-endian.
    pub fn byte_order(&self) -> ByteOrder {
        self.magic_kind()
            .map(MagicKind::byte_order)
            .unwrap_or(ByteOrder::Little)
    }

    pub fn timestamp_precision(&self) -> TimestampPrecision {
        self.magic_kind()
            .map(MagicKind::precision)
            .unwrap_or(TimestampPrecision::Micros)
    }
}

/// Decode the 24-byte global header.
///
/// The magic is not validated here; an unknown magic decodes with
/// little-endian fields and `magic_kind() == None`.
///
/// # Errors
/// Returns `DecodeError::TruncatedBuffer` without consuming anything when
/// fewer than 24 bytes remain.
pub fn decode_capture_header(cursor: &mut ByteCursor<'_>) -> Result<CaptureHeader, DecodeError> {
    cursor.require(layout::CAPTURE_HEADER_LEN)?;

    let magic = cursor.read_u32(ByteOrder::Little)?;
    let order = MagicKind::from_raw(magic)
        .map(MagicKind::byte_order)
        .unwrap_or(ByteOrder::Little);

    Ok(CaptureHeader {
        magic,
        version_major: cursor.read_u16(order)?,
        version_minor: cursor.read_u16(order)?,
        thiszone: cursor.read_i32(order)?,
        sigfigs: cursor.read_i32(order)?,
        snaplen: cursor.read_i32(order)?,
        linktype: cursor.read_i32(order)?,
    })
}
