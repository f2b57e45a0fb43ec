use super::header::{CaptureHeader, TimestampPrecision};
use super::layout;
use crate::cursor::{ByteCursor, ByteOrder};
use crate::error::{DecodeError, LengthMismatch};

/// Per-record header preceding each captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub ts_sec: i32,
    /// Fractional part: microseconds, or nanoseconds for nanosecond captures.
    pub ts_usec: i32,
    /// Bytes of the frame stored in the file.
    pub caplen: u32,
    /// Bytes of the frame on the wire.
    pub len: u32,
}

impl RecordHeader {
    /// Timestamp as nanoseconds since the Unix epoch.
    pub fn timestamp_nanos(&self, precision: TimestampPrecision) -> i128 {
        let frac = match precision {
            TimestampPrecision::Micros => self.ts_usec as i128 * layout::NANOS_PER_MICRO,
            TimestampPrecision::Nanos => self.ts_usec as i128,
        };
        self.ts_sec as i128 * layout::NANOS_PER_SECOND + frac
    }

    /// True when the frame was cut short by the capture's snapshot length.
    pub fn is_truncated(&self) -> bool {
        self.caplen < self.len
    }
}

/// Decode the 16-byte record header in the capture's byte order.
///
/// Only parses; cross-field checks live in `validate_record_header`.
///
/// # Errors
/// Returns `DecodeError::TruncatedBuffer` without consuming anything when
/// fewer than 16 bytes remain.
pub fn decode_record_header(
    cursor: &mut ByteCursor<'_>,
    order: ByteOrder,
) -> Result<RecordHeader, DecodeError> {
    cursor.require(layout::RECORD_HEADER_LEN)?;
    Ok(RecordHeader {
        ts_sec: cursor.read_i32(order)?,
        ts_usec: cursor.read_i32(order)?,
        caplen: cursor.read_u32(order)?,
        len: cursor.read_u32(order)?,
    })
}

/// Check `caplen <= len` and `caplen <= snaplen`.
///
/// A non-positive snaplen carries no limit and skips the second check.
///
/// # Errors
/// Returns `DecodeError::InconsistentLength` naming the violated bound.
pub fn validate_record_header(
    record: &RecordHeader,
    capture: &CaptureHeader,
) -> Result<(), DecodeError> {
    if record.caplen > record.len {
        return Err(LengthMismatch::CaplenExceedsLen {
            caplen: record.caplen,
            len: record.len,
        }
        .into());
    }
    if capture.snaplen > 0 && u64::from(record.caplen) > capture.snaplen as u64 {
        return Err(LengthMismatch::CaplenExceedsSnaplen {
            caplen: record.caplen,
            snaplen: capture.snaplen,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{RecordHeader, decode_record_header, validate_record_header};
    use crate::capture::header::{CaptureHeader, TimestampPrecision};
    use crate::capture::layout;
    use crate::cursor::{ByteCursor, ByteOrder};
    use crate::error::{DecodeError, LengthMismatch};

    fn capture(snaplen: i32) -> CaptureHeader {
        CaptureHeader {
            magic: layout::MAGIC_MICROS,
            version_major: 2,
            version_minor: 4,
            thiszone: 0,
            sigfigs: 0,
            snaplen,
            linktype: layout::LINKTYPE_ETHERNET,
        }
    }

    fn record(caplen: u32, len: u32) -> RecordHeader {
        RecordHeader {
            ts_sec: 0,
            ts_usec: 0,
            caplen,
            len,
        }
    }

    #[test]
    fn decodes_record_header_le() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1_700_000_000i32.to_le_bytes());
        bytes.extend_from_slice(&250_000i32.to_le_bytes());
        bytes.extend_from_slice(&46u32.to_le_bytes());
        bytes.extend_from_slice(&60u32.to_le_bytes());

        let mut cursor = ByteCursor::new(&bytes);
        let header = decode_record_header(&mut cursor, ByteOrder::Little).unwrap();
        assert!(cursor.is_at_end());
        assert_eq!(header.ts_sec, 1_700_000_000);
        assert_eq!(header.ts_usec, 250_000);
        assert_eq!(header.caplen, 46);
        assert_eq!(header.len, 60);
        assert!(header.is_truncated());
    }

    #[test]
    fn decodes_record_header_be() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1i32.to_be_bytes());
        bytes.extend_from_slice(&2i32.to_be_bytes());
        bytes.extend_from_slice(&3u32.to_be_bytes());
        bytes.extend_from_slice(&4u32.to_be_bytes());

        let mut cursor = ByteCursor::new(&bytes);
        let header = decode_record_header(&mut cursor, ByteOrder::Big).unwrap();
        assert_eq!(header, RecordHeader { ts_sec: 1, ts_usec: 2, caplen: 3, len: 4 });
    }

    #[test]
    fn short_record_header_is_truncated() {
        let bytes = [0u8; 15];
        let mut cursor = ByteCursor::new(&bytes);
        let err = decode_record_header(&mut cursor, ByteOrder::Little).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedBuffer { needed: 16, .. }));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn timestamp_respects_precision() {
        let header = RecordHeader {
            ts_sec: 2,
            ts_usec: 500,
            caplen: 0,
            len: 0,
        };
        assert_eq!(header.timestamp_nanos(TimestampPrecision::Micros), 2_000_500_000);
        assert_eq!(header.timestamp_nanos(TimestampPrecision::Nanos), 2_000_000_500);
    }

    #[test]
    fn caplen_above_len_is_rejected() {
        let err = validate_record_header(&record(61, 60), &capture(65535)).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InconsistentLength(LengthMismatch::CaplenExceedsLen { caplen: 61, len: 60 })
        );
    }

    #[test]
    fn caplen_above_snaplen_is_rejected() {
        let err = validate_record_header(&record(100, 100), &capture(64)).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InconsistentLength(LengthMismatch::CaplenExceedsSnaplen { .. })
        ));
    }

    #[test]
    fn zero_snaplen_means_unbounded() {
        assert!(validate_record_header(&record(100, 100), &capture(0)).is_ok());
        assert!(validate_record_header(&record(64, 1500), &capture(64)).is_ok());
    }
}
